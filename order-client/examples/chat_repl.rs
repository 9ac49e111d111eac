// order-client/examples/chat_repl.rs
// Terminal ordering session against a running storefront
//
//   STOREFRONT_URL=http://localhost:5000 cargo run --example chat_repl

use order_client::logging::init_logger;
use order_client::{
    CartAction, CartChanged, CartController, ChatSession, ClientConfig, Navigator, Route,
};
use shared::money::format_price;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

struct StdoutNavigator;

impl Navigator for StdoutNavigator {
    fn navigate(&self, route: Route) {
        println!("-> navigating to {:?}", route);
    }
}

fn print_cart(event: &CartChanged) {
    let snapshot = &event.snapshot;
    println!("[cart via {:?}, seq {}]", event.source, event.seq);
    for (key, line) in snapshot.cart.iter() {
        println!(
            "  {:<16} {:>3} x {:<28} {}",
            key,
            line.quantity,
            line.name,
            format_price(line.line_total())
        );
        if let Some(notes) = &line.notes {
            println!("  {:<16}       {}", "", notes);
        }
    }
    println!("  total {}", snapshot.display_total());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _guard = init_logger("warn,order_client=info", false, None)?;

    let config = ClientConfig::from_env();
    let storefront = Arc::new(config.build_storefront()?);
    let controller = CartController::from_config(&config, storefront.clone());
    controller.subscribe(Arc::new(print_cart));

    controller.hydrate().await;

    let mut session = ChatSession::new(controller.clone(), storefront, Arc::new(StdoutNavigator))
        .with_history_limit(config.history_limit);

    println!(
        "Connected to {}. Type an order, /remove <id>, /clear, /done or /quit.",
        config.base_url
    );
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let result = match line.split_once(' ').unwrap_or((line, "")) {
            ("/quit", _) => break,
            ("/clear", _) => controller.mutate(CartAction::Clear).await.map(|_| ()),
            ("/remove", item_id) => controller
                .mutate(CartAction::remove(item_id.trim()))
                .await
                .map(|_| ()),
            ("/done", _) => controller.complete_order().await.map(|_| {
                StdoutNavigator.navigate(Route::Home);
            }),
            _ => session.send(line).await.map(|outcome| {
                println!("assistant: {}", outcome.reply);
                for notice in [outcome.added_notice(), outcome.removed_notice()]
                    .into_iter()
                    .flatten()
                {
                    println!("  ({})", notice);
                }
            }),
        };
        if let Err(e) = result {
            eprintln!("error: {}", e);
        }
    }

    controller.shutdown().await;
    Ok(())
}
