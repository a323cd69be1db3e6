//! Request bodies and `{ success, ... }` response envelopes. Both sides
//! derive `Serialize` and `Deserialize` so the HTTP source can reuse them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{LineItem, MenuItem, Order, OrderDraft, OrderType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(alias = "orderType")]
    pub order_type: OrderType,
    pub items: Vec<LineItem>,
    #[serde(default, alias = "totalAmount", skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Decimal>,
    #[serde(default, alias = "paymentMethod", skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

impl From<CreateOrderRequest> for OrderDraft {
    fn from(req: CreateOrderRequest) -> Self {
        OrderDraft {
            order_type: req.order_type,
            items: req.items,
            claimed_total: req.total_amount,
            payment_method: req.payment_method,
        }
    }
}

impl From<&OrderDraft> for CreateOrderRequest {
    fn from(draft: &OrderDraft) -> Self {
        CreateOrderRequest {
            order_type: draft.order_type,
            items: draft.items.clone(),
            total_amount: draft.claimed_total,
            payment_method: draft.payment_method.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct MenuQuery {
    pub category: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderResponse {
    pub success: bool,
    pub order: Order,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrdersResponse {
    pub success: bool,
    pub orders: Vec<Order>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BoardResponse {
    pub success: bool,
    pub preparing: Vec<Order>,
    pub serving: Vec<Order>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MenuItemResponse {
    pub success: bool,
    pub item: MenuItem,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MenuItemsResponse {
    pub success: bool,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
