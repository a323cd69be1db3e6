use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{board, LineItem, Order, OrderStatus, OrderType, Queued};

use super::cart::Cart;
use super::receipt::{OrderOverview, ReceiptData};
use super::storage::{KeyValueStore, Subscription};
use super::ProjectionError;

/// Storage keys shared with every other context.
pub mod keys {
    pub const ORDERS: &str = "coffeeShopOrders";
    pub const BOARD: &str = "preparingServingOrders";
    pub const CART: &str = "orderList";
    pub const CART_TOTAL: &str = "totalPrice";
    pub const RECEIPT: &str = "receiptData";
    pub const OVERVIEW: &str = "latestOrderOverview";
}

/// One order as the projection keeps it. Everything but the items is
/// optional so entries written by older screens still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedOrder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    #[serde(default)]
    pub order_type: OrderType,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_number: Option<u32>,
    #[serde(default)]
    pub status: OrderStatus,
}

impl From<&Order> for CachedOrder {
    fn from(order: &Order) -> Self {
        Self {
            id: Some(order.id),
            order_number: Some(order.order_number.clone()),
            order_type: order.order_type,
            items: order.items.clone(),
            total: order.total_amount,
            timestamp: Some(order.created_at),
            priority_number: Some(order.priority_number),
            status: order.status,
        }
    }
}

impl Queued for CachedOrder {
    fn status(&self) -> OrderStatus {
        self.status
    }

    fn priority(&self) -> Option<u32> {
        self.priority_number
    }
}

/// Dedup key: the store id when known, else the order number. Entries with
/// neither all collapse into one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MergeKey {
    Id(u64),
    Number(String),
    Missing,
}

impl CachedOrder {
    pub fn merge_key(&self) -> MergeKey {
        match (self.id, &self.order_number) {
            (Some(id), _) => MergeKey::Id(id),
            (None, Some(number)) => MergeKey::Number(number.clone()),
            (None, None) => MergeKey::Missing,
        }
    }

    /// Same order by either key; used to apply a confirmed update.
    pub fn matches(&self, other: &CachedOrder) -> bool {
        (self.id.is_some() && self.id == other.id)
            || (self.order_number.is_some() && self.order_number == other.order_number)
    }

    /// Label used on screens: the order number, else the id.
    pub fn label(&self) -> String {
        match (&self.order_number, self.id) {
            (Some(number), _) => number.clone(),
            (None, Some(id)) => id.to_string(),
            (None, None) => "N/A".to_string(),
        }
    }
}

/// First-seen-wins union of `local` then `remote`. A local entry shadows a
/// remote one with the same key even when the remote one is newer.
pub fn merge(local: Vec<CachedOrder>, remote: Vec<CachedOrder>) -> Vec<CachedOrder> {
    let mut seen = HashSet::new();
    local
        .into_iter()
        .chain(remote)
        .filter(|order| seen.insert(order.merge_key()))
        .collect()
}

/// Typed access to the shared projection keys.
pub struct ProjectionCache<S> {
    store: S,
}

impl<S: KeyValueStore> ProjectionCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn subscribe(&self) -> Subscription {
        self.store.subscribe()
    }

    fn write<T: Serialize>(&self, key: &'static str, value: &T) -> Result<(), ProjectionError> {
        let json = serde_json::to_string(value).map_err(|source| ProjectionError::Encode { key, source })?;
        self.store.set(key, json);
        Ok(())
    }

    fn read<T: DeserializeOwned>(&self, key: &'static str) -> Option<T> {
        let raw = self.store.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Ignoring unreadable cache entry");
                None
            }
        }
    }

    /// Entries that do not parse (unknown status, bad numbers) are skipped
    /// one by one rather than discarding the whole list.
    fn read_orders(&self, key: &'static str) -> Vec<CachedOrder> {
        let entries: Vec<serde_json::Value> = self.read(key).unwrap_or_default();
        entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value(entry) {
                Ok(order) => Some(order),
                Err(e) => {
                    warn!(key, error = %e, "Skipping malformed cached order");
                    None
                }
            })
            .collect()
    }

    pub fn orders(&self) -> Vec<CachedOrder> {
        self.read_orders(keys::ORDERS)
    }

    /// The board as last derived, for screens that only show the board.
    pub fn board(&self) -> Vec<CachedOrder> {
        self.read_orders(keys::BOARD)
    }

    /// Replace the order history and re-derive the board from it.
    pub fn save_orders(&self, orders: &[CachedOrder]) -> Result<(), ProjectionError> {
        self.write(keys::ORDERS, &orders)?;
        self.write(keys::BOARD, &board(orders))?;
        debug!(orders = orders.len(), "Projection saved");
        Ok(())
    }

    /// Fold a fetch into the history, keeping local entries on conflict.
    pub fn merge_remote(&self, remote: &[Order]) -> Result<Vec<CachedOrder>, ProjectionError> {
        let remote = remote.iter().map(CachedOrder::from).collect();
        let merged = merge(self.orders(), remote);
        self.save_orders(&merged)?;
        Ok(merged)
    }

    /// Write back an order the store has confirmed, replacing any entry
    /// with the same id or order number, or appending it.
    pub fn apply_confirmed(&self, order: &Order) -> Result<(), ProjectionError> {
        let confirmed = CachedOrder::from(order);
        let mut orders = self.orders();
        let mut replaced = false;
        for entry in orders.iter_mut().filter(|entry| entry.matches(&confirmed)) {
            *entry = confirmed.clone();
            replaced = true;
        }
        if !replaced {
            orders.push(confirmed);
        }
        self.save_orders(&merge(orders, Vec::new()))
    }

    pub fn cart(&self) -> Cart {
        self.read(keys::CART).unwrap_or_default()
    }

    pub fn save_cart(&self, cart: &Cart) -> Result<(), ProjectionError> {
        self.write(keys::CART, cart)?;
        self.write(keys::CART_TOTAL, &cart.total())
    }

    pub fn cart_total(&self) -> Decimal {
        self.read(keys::CART_TOTAL).unwrap_or_default()
    }

    pub fn clear_cart(&self) {
        self.store.remove(keys::CART);
        self.store.remove(keys::CART_TOTAL);
    }

    pub fn receipt(&self) -> Option<ReceiptData> {
        self.read(keys::RECEIPT)
    }

    pub fn latest_overview(&self) -> Option<OrderOverview> {
        self.read(keys::OVERVIEW)
    }

    pub fn save_checkout(&self, receipt: &ReceiptData, overview: &OrderOverview) -> Result<(), ProjectionError> {
        self.write(keys::RECEIPT, receipt)?;
        self.write(keys::OVERVIEW, overview)
    }

    /// Forget the receipt handoff, as starting a new order does.
    pub fn clear_receipt(&self) {
        self.store.remove(keys::RECEIPT);
    }
}
