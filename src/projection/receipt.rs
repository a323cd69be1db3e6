use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{LineItem, Order, OrderType};

/// Handoff from checkout to the receipt screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptData {
    pub order_number: String,
    pub priority_number: Option<u32>,
    #[serde(default)]
    pub order_type: OrderType,
    pub items: Vec<LineItem>,
    pub total: Decimal,
    pub payment_method: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&Order> for ReceiptData {
    fn from(order: &Order) -> Self {
        Self {
            order_number: order.order_number.clone(),
            priority_number: Some(order.priority_number),
            order_type: order.order_type,
            items: order.items.clone(),
            total: order.total_amount,
            payment_method: order.payment_method.clone(),
            timestamp: order.created_at,
        }
    }
}

impl ReceiptData {
    pub fn subtotal(&self) -> Decimal {
        crate::domain::items_total(&self.items)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewItem {
    pub name: String,
    pub quantity: u32,
}

/// The most recent checkout, as the order list shows it before the next poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderOverview {
    pub priority_number: u32,
    pub order_number: String,
    pub order_type: OrderType,
    pub items: Vec<OverviewItem>,
    pub total: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl From<&Order> for OrderOverview {
    fn from(order: &Order) -> Self {
        Self {
            priority_number: order.priority_number,
            order_number: order.order_number.clone(),
            order_type: order.order_type,
            items: order
                .items
                .iter()
                .map(|item| OverviewItem {
                    name: item.name.clone(),
                    quantity: item.quantity,
                })
                .collect(),
            total: order.total_amount,
            timestamp: order.created_at,
        }
    }
}

/// Receipt form of an order id: ids longer than eight characters are cut to
/// their first and last four.
pub fn shorten_order_id(id: &str) -> String {
    let chars: Vec<char> = id.chars().collect();
    if chars.len() <= 8 {
        return id.to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
