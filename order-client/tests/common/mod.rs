// order-client/tests/common/mod.rs
// Scripted in-process storefront shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use order_client::{
    CartChanged, CartListener, CartReply, CartService, ChatService, ClientError, ClientResult,
    Navigator, Route,
};
use parking_lot::Mutex;
use shared::{
    AddComboRequest, AddCustomizedItemRequest, AddItemRequest, Cart, CartLine, ChatRequest,
    ChatResponse, ComboComponent, Decimal, RemoveItemRequest, RemovedLine, Suggestion,
    SuggestionType,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

pub fn price(raw: &str) -> Decimal {
    raw.parse().unwrap()
}

/// What a scripted chat turn does to the server cart
#[derive(Debug, Clone)]
pub enum ChatEffect {
    None,
    Add(&'static str),
    Remove(&'static str),
}

#[derive(Debug, Default)]
struct ServerCart {
    lines: Vec<CartLine>,
    discount: Decimal,
}

impl ServerCart {
    fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum::<Decimal>() - self.discount
    }

    fn reply(&self) -> CartReply {
        CartReply::new(Cart::from_lines(self.lines.clone()), self.total())
    }
}

/// In-process storefront: a session cart plus a scripted assistant.
///
/// Mutations commit immediately and their responses can be held back with
/// [`FakeStorefront::delay_add`], which is how out-of-order arrival is staged.
pub struct FakeStorefront {
    catalog: HashMap<&'static str, (&'static str, Decimal)>,
    server: Mutex<ServerCart>,
    add_delays: Mutex<HashMap<String, Duration>>,
    chat_script: Mutex<VecDeque<(ChatResponse, ChatEffect)>>,
    pub chat_requests: Mutex<Vec<ChatRequest>>,
    pub get_calls: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_chat: AtomicBool,
}

impl FakeStorefront {
    pub fn new() -> Self {
        let catalog = HashMap::from([
            ("BURGER01", ("Cheeseburger", price("2.5"))),
            ("BIGMAC", ("Big Mac", price("5.69"))),
            ("FRIES-M", ("Medium Fries", price("2.79"))),
            ("COKE-M", ("Medium Coke", price("1.5"))),
            ("BACON", ("Bacon", price("1.0"))),
            ("PICKLES", ("Pickles", price("0"))),
        ]);
        Self {
            catalog,
            server: Mutex::new(ServerCart::default()),
            add_delays: Mutex::new(HashMap::new()),
            chat_script: Mutex::new(VecDeque::new()),
            chat_requests: Mutex::new(Vec::new()),
            get_calls: AtomicUsize::new(0),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            fail_chat: AtomicBool::new(false),
        }
    }

    /// Server cart already holding `quantity` of `item_id`
    pub fn with_line(self, item_id: &'static str, quantity: u32) -> Self {
        let (name, unit) = self.catalog[item_id];
        self.server
            .lock()
            .lines
            .push(CartLine::new(item_id, name, unit, quantity));
        self
    }

    /// Server-side discount so the reported total differs from the line sum
    pub fn with_discount(self, discount: Decimal) -> Self {
        self.server.lock().discount = discount;
        self
    }

    pub fn delay_add(&self, item_id: &str, delay: Duration) {
        self.add_delays.lock().insert(item_id.to_string(), delay);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_chat(&self, fail: bool) {
        self.fail_chat.store(fail, Ordering::SeqCst);
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    /// Out-of-band change, as if another channel edited the session cart
    pub fn server_add(&self, item_id: &str) {
        let (name, unit) = self.catalog[item_id];
        let mut server = self.server.lock();
        commit_add(&mut server.lines, item_id, name, unit);
    }

    pub fn server_cart(&self) -> Cart {
        Cart::from_lines(self.server.lock().lines.clone())
    }

    pub fn server_total(&self) -> Decimal {
        self.server.lock().total()
    }

    pub fn script_chat(&self, response: ChatResponse, effect: ChatEffect) {
        self.chat_script.lock().push_back((response, effect));
    }

    fn check_writes(&self) -> ClientResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ClientError::service("cart service unavailable"));
        }
        Ok(())
    }

    fn lookup(&self, item_id: &str) -> ClientResult<(&'static str, Decimal)> {
        self.catalog
            .get(item_id)
            .copied()
            .ok_or_else(|| ClientError::service("Item not found"))
    }
}

fn commit_add(lines: &mut Vec<CartLine>, item_id: &str, name: &str, unit: Decimal) {
    match lines
        .iter_mut()
        .find(|l| l.id == item_id && l.notes.is_none() && !l.is_combo)
    {
        Some(line) => line.quantity += 1,
        None => lines.push(CartLine::new(item_id, name, unit, 1)),
    }
}

fn commit_remove(
    lines: &mut Vec<CartLine>,
    item_id: &str,
    decrease_only: bool,
) -> ClientResult<RemovedLine> {
    let index = lines
        .iter()
        .position(|l| l.id == item_id)
        .ok_or_else(|| ClientError::NotFound(item_id.to_string()))?;

    if decrease_only && lines[index].quantity > 1 {
        lines[index].quantity -= 1;
        Ok(RemovedLine {
            id: item_id.to_string(),
            quantity: 1,
        })
    } else {
        let line = lines.remove(index);
        Ok(RemovedLine {
            id: item_id.to_string(),
            quantity: line.quantity,
        })
    }
}

#[async_trait]
impl CartService for FakeStorefront {
    async fn get_cart(&self) -> ClientResult<CartReply> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ClientError::service("cart service unavailable"));
        }
        Ok(self.server.lock().reply())
    }

    async fn add_item(&self, request: &AddItemRequest) -> ClientResult<CartReply> {
        self.check_writes()?;
        let (name, unit) = self.lookup(&request.item_id)?;
        let reply = {
            let mut server = self.server.lock();
            commit_add(&mut server.lines, &request.item_id, name, unit);
            let mut reply = server.reply();
            if request.item_id.starts_with("FRIES") {
                reply.suggestion = Some(Suggestion {
                    message: "Would you like any sauce with that?".into(),
                    kind: SuggestionType::Sauce,
                    item_id: request.item_id.clone(),
                });
            }
            reply
        };

        let delay = self.add_delays.lock().get(&request.item_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(reply)
    }

    async fn add_customized_item(
        &self,
        request: &AddCustomizedItemRequest,
    ) -> ClientResult<CartReply> {
        self.check_writes()?;
        let (name, mut unit) = self.lookup(&request.item_id)?;

        let mut notes = Vec::new();
        if !request.removed_ingredients.is_empty() {
            let names: Vec<&str> = request
                .removed_ingredients
                .iter()
                .map(|id| self.catalog.get(id.as_str()).map_or(id.as_str(), |(n, _)| *n))
                .collect();
            notes.push(format!("Removed: {}", names.join(", ")));
        }
        if !request.added_ingredients.is_empty() {
            let mut names = Vec::new();
            for id in &request.added_ingredients {
                let (ing_name, ing_price) = self.lookup(id)?;
                unit += ing_price;
                names.push(ing_name);
            }
            notes.push(format!("Added: {}", names.join(", ")));
        }

        let mut server = self.server.lock();
        server.lines.push(
            CartLine::new(
                request.item_id.clone(),
                format!("{} (Customized)", name),
                unit,
                1,
            )
            .with_notes(notes.join("; ")),
        );
        Ok(server.reply())
    }

    async fn add_combo(&self, request: &AddComboRequest) -> ClientResult<CartReply> {
        self.check_writes()?;
        let parts = [
            &request.base_item_id,
            &request.side_item_id,
            &request.drink_item_id,
        ];
        let mut components = Vec::new();
        let mut sum = Decimal::ZERO;
        for id in parts {
            let (name, unit) = self.lookup(id)?;
            sum += unit;
            components.push(ComboComponent {
                id: id.clone(),
                name: name.to_string(),
                is_premium_upcharge: false,
            });
        }
        let base_name = components[0].name.clone();

        let mut server = self.server.lock();
        server.lines.push(
            CartLine::new(
                format!("COMBO-{}", request.base_item_id),
                format!("{} Meal", base_name),
                request.combo_price.unwrap_or(sum),
                1,
            )
            .with_components(components),
        );
        Ok(server.reply())
    }

    async fn remove_item(&self, request: &RemoveItemRequest) -> ClientResult<CartReply> {
        self.check_writes()?;
        let mut server = self.server.lock();
        let removed = commit_remove(&mut server.lines, &request.item_id, request.decrease_only)?;
        let mut reply = server.reply();
        reply.removed = vec![removed];
        Ok(reply)
    }

    async fn clear_cart(&self) -> ClientResult<()> {
        self.check_writes()?;
        self.server.lock().lines.clear();
        Ok(())
    }
}

#[async_trait]
impl ChatService for FakeStorefront {
    async fn send_turn(&self, request: &ChatRequest) -> ClientResult<ChatResponse> {
        if self.fail_chat.load(Ordering::SeqCst) {
            return Err(ClientError::service(
                "I apologize, but I encountered an error. Please try again.",
            ));
        }
        self.chat_requests.lock().push(request.clone());

        let (response, effect) = self
            .chat_script
            .lock()
            .pop_front()
            .unwrap_or_else(|| (ChatResponse::default(), ChatEffect::None));

        match effect {
            ChatEffect::None => {}
            ChatEffect::Add(item_id) => self.server_add(item_id),
            ChatEffect::Remove(item_id) => {
                let mut server = self.server.lock();
                let _ = commit_remove(&mut server.lines, item_id, false);
            }
        }
        Ok(response)
    }
}

/// Listener that keeps every event it sees
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<CartChanged>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<CartChanged> {
        self.events.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.events.lock().len()
    }
}

impl CartListener for Recorder {
    fn on_cart_changed(&self, event: &CartChanged) {
        self.events.lock().push(event.clone());
    }
}

/// Navigator that remembers where it was sent
#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().push(route);
    }
}
