// order-client/src/storefront.rs
// Storefront HTTP API - cart and chat endpoints

use crate::service::{CartReply, CartService, ChatService};
use crate::{ClientError, ClientResult, HttpClient};
use async_trait::async_trait;
use shared::{
    AddComboRequest, AddCustomizedItemRequest, AddItemRequest, CartResponse, ChatRequest,
    ChatResponse, RemoveItemRequest,
};

/// Endpoint paths
pub mod paths {
    pub const GET_CART: &str = "/api/get_cart";
    pub const ADD_TO_CART: &str = "/api/add_to_cart";
    pub const ADD_CUSTOMIZED_ITEM: &str = "/api/add_customized_item";
    pub const ADD_COMBO: &str = "/api/add_combo";
    pub const REMOVE_FROM_CART: &str = "/api/remove_from_cart";
    pub const CLEAR_CART: &str = "/api/clear_cart";
    pub const CHAT: &str = "/api/chat";
}

/// Storefront API over HTTP
#[derive(Debug, Clone)]
pub struct HttpStorefront {
    http: HttpClient,
}

impl HttpStorefront {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl CartService for HttpStorefront {
    async fn get_cart(&self) -> ClientResult<CartReply> {
        CartReply::from_response(self.http.get::<CartResponse>(paths::GET_CART).await?)
    }

    async fn add_item(&self, request: &AddItemRequest) -> ClientResult<CartReply> {
        CartReply::from_response(
            self.http
                .post::<CartResponse, _>(paths::ADD_TO_CART, request)
                .await?,
        )
    }

    async fn add_customized_item(
        &self,
        request: &AddCustomizedItemRequest,
    ) -> ClientResult<CartReply> {
        CartReply::from_response(
            self.http
                .post::<CartResponse, _>(paths::ADD_CUSTOMIZED_ITEM, request)
                .await?,
        )
    }

    async fn add_combo(&self, request: &AddComboRequest) -> ClientResult<CartReply> {
        CartReply::from_response(
            self.http
                .post::<CartResponse, _>(paths::ADD_COMBO, request)
                .await?,
        )
    }

    async fn remove_item(&self, request: &RemoveItemRequest) -> ClientResult<CartReply> {
        let response = self
            .http
            .post::<CartResponse, _>(paths::REMOVE_FROM_CART, request)
            .await
            .map_err(|e| match e {
                // 404 here means the line is gone, not the endpoint
                ClientError::NotFound(_) => ClientError::NotFound(request.item_id.clone()),
                other => other,
            })?;
        CartReply::from_response(response)
    }

    async fn clear_cart(&self) -> ClientResult<()> {
        let response = self.http.post_empty::<CartResponse>(paths::CLEAR_CART).await?;
        if !response.success {
            return Err(ClientError::service(
                response
                    .message
                    .unwrap_or_else(|| "clear rejected".to_string()),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ChatService for HttpStorefront {
    async fn send_turn(&self, request: &ChatRequest) -> ClientResult<ChatResponse> {
        self.http.post(paths::CHAT, request).await
    }
}
