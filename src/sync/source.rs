use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::clients::OrderClient;
use crate::domain::{MenuItem, Order, OrderDraft, OrderStatus};
use crate::http::dto::{
    CreateOrderRequest, MenuItemsResponse, MessageResponse, OrderResponse, OrdersResponse, StatusUpdateRequest,
};

use super::SyncError;

/// Where a synchronizer gets orders from and sends changes to.
#[async_trait]
pub trait OrderSource: Send + Sync + 'static {
    async fn fetch_latest(&self) -> Result<Vec<Order>, SyncError>;
    async fn create_order(&self, draft: &OrderDraft) -> Result<Order, SyncError>;
    async fn update_status(&self, key: &str, status: OrderStatus) -> Result<Order, SyncError>;
}

/// Talks to a running server over its JSON API.
#[derive(Clone)]
pub struct HttpOrderSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpOrderSource {
    /// `request_timeout` bounds every call, including ones the caller does
    /// not wrap in its own timeout.
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, SyncError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<MessageResponse>(&body)
            .map(|m| m.message)
            .unwrap_or(body);
        Err(SyncError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    #[instrument(skip(self))]
    pub async fn menu(&self) -> Result<Vec<MenuItem>, SyncError> {
        let response = self.client.get(self.url("/api/menu/items")).send().await?;
        let body: MenuItemsResponse = Self::decode(response).await?;
        Ok(body.items)
    }
}

#[async_trait]
impl OrderSource for HttpOrderSource {
    #[instrument(skip(self))]
    async fn fetch_latest(&self) -> Result<Vec<Order>, SyncError> {
        let response = self.client.get(self.url("/api/orders")).send().await?;
        let body: OrdersResponse = Self::decode(response).await?;
        debug!(orders = body.orders.len(), "Fetched orders");
        Ok(body.orders)
    }

    #[instrument(skip(self, draft))]
    async fn create_order(&self, draft: &OrderDraft) -> Result<Order, SyncError> {
        let response = self
            .client
            .post(self.url("/api/orders"))
            .json(&CreateOrderRequest::from(draft))
            .send()
            .await?;
        let body: OrderResponse = Self::decode(response).await?;
        Ok(body.order)
    }

    #[instrument(skip(self))]
    async fn update_status(&self, key: &str, status: OrderStatus) -> Result<Order, SyncError> {
        let response = self
            .client
            .patch(self.url(&format!("/api/orders/{key}/status")))
            .json(&StatusUpdateRequest {
                status: status.as_str().to_string(),
            })
            .send()
            .await?;
        let body: OrderResponse = Self::decode(response).await?;
        Ok(body.order)
    }
}

/// In-process source, for a view running next to the actors.
#[async_trait]
impl OrderSource for OrderClient {
    async fn fetch_latest(&self) -> Result<Vec<Order>, SyncError> {
        Ok(self.list_orders().await?)
    }

    async fn create_order(&self, draft: &OrderDraft) -> Result<Order, SyncError> {
        Ok(OrderClient::create_order(self, draft.clone()).await?)
    }

    async fn update_status(&self, key: &str, status: OrderStatus) -> Result<Order, SyncError> {
        Ok(self.set_status(key.to_string(), status.as_str()).await?)
    }
}
