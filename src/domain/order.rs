use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{OrderStatus, ParseEnumError};

/// Amount by which a client-supplied total may differ from the recomputed one.
pub const TOTAL_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

pub const DEFAULT_PAYMENT_METHOD: &str = "Cash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum OrderType {
    #[default]
    DineIn,
    Takeout,
}

impl OrderType {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderType::DineIn => "Dine-in",
            OrderType::Takeout => "Takeout",
        }
    }

    /// First character of every type-prefixed order number.
    pub fn prefix(self) -> char {
        match self {
            OrderType::DineIn => 'D',
            OrderType::Takeout => 'T',
        }
    }

    /// Recover the type from a `D…`/`T…` order number. `ORD-` numbers carry no type.
    pub fn from_order_number(number: &str) -> Option<Self> {
        if number.starts_with("ORD-") {
            return None;
        }
        match number.chars().next()? {
            'D' => Some(OrderType::DineIn),
            'T' => Some(OrderType::Takeout),
            _ => None,
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dine-in" | "dinein" | "dine in" | "dine_in" => Ok(OrderType::DineIn),
            "takeout" | "take-out" | "take out" | "take_out" => Ok(OrderType::Takeout),
            _ => Err(ParseEnumError::new("order type", s)),
        }
    }
}

impl TryFrom<String> for OrderType {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OrderType> for &'static str {
    fn from(order_type: OrderType) -> Self {
        order_type.as_str()
    }
}

fn one() -> u32 {
    1
}

/// One product line within an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    /// Required: a line without a price is rejected, never priced at zero.
    pub price: Decimal,
    #[serde(default = "one")]
    pub quantity: u32,
}

impl LineItem {
    pub fn new(name: impl Into<String>, price: Decimal, quantity: u32) -> Self {
        Self {
            name: name.into(),
            price,
            quantity,
        }
    }

    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Sum of line subtotals, rounded to cents.
pub fn items_total(items: &[LineItem]) -> Decimal {
    items
        .iter()
        .map(LineItem::subtotal)
        .sum::<Decimal>()
        .round_dp(2)
}

/// What the till submits at checkout, before the store assigns identity.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub order_type: OrderType,
    pub items: Vec<LineItem>,
    /// Total as the client computed it. Checked, never trusted.
    pub claimed_total: Option<Decimal>,
    pub payment_method: Option<String>,
}

impl OrderDraft {
    pub fn new(order_type: OrderType, items: Vec<LineItem>) -> Self {
        Self {
            order_type,
            items,
            claimed_total: None,
            payment_method: None,
        }
    }

    pub fn with_claimed_total(mut self, total: Decimal) -> Self {
        self.claimed_total = Some(total);
        self
    }

    /// Validate the lines and return the recomputed total.
    pub fn checked_total(&self) -> Result<Decimal, String> {
        if self.items.is_empty() {
            return Err("Order must contain at least one item".to_string());
        }
        for item in &self.items {
            if item.name.trim().is_empty() {
                return Err("Item name is required".to_string());
            }
            if item.price.is_sign_negative() {
                return Err(format!("Price for {} must not be negative", item.name));
            }
            if item.quantity == 0 {
                return Err(format!("Quantity for {} must be at least 1", item.name));
            }
        }

        let total = items_total(&self.items);
        if let Some(claimed) = self.claimed_total {
            if (claimed - total).abs() > TOTAL_TOLERANCE {
                return Err(format!(
                    "total_amount {} does not match items total {}",
                    claimed, total
                ));
            }
        }
        Ok(total)
    }
}

/// Represents a customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub order_number: String,
    pub priority_number: u32,
    pub order_type: OrderType,
    pub items: Vec<LineItem>,
    pub total_amount: Decimal,
    pub payment_method: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_from_items() {
        let items = vec![
            LineItem::new("Americano", Decimal::from(50), 2),
            LineItem::new("Espresso", Decimal::from(30), 1),
        ];
        assert_eq!(items_total(&items), Decimal::new(13000, 2));
    }

    #[test]
    fn test_draft_rejects_disagreeing_total() {
        let draft = OrderDraft::new(
            OrderType::Takeout,
            vec![LineItem::new("Latte", Decimal::from(120), 1)],
        )
        .with_claimed_total(Decimal::from(100));

        let err = draft.checked_total().unwrap_err();
        assert!(err.contains("does not match"), "{err}");
    }

    #[test]
    fn test_draft_accepts_total_within_tolerance() {
        let draft = OrderDraft::new(
            OrderType::DineIn,
            vec![LineItem::new("Mocha", Decimal::new(9999, 2), 3)],
        )
        .with_claimed_total(Decimal::new(29998, 2));

        assert_eq!(draft.checked_total().unwrap(), Decimal::new(29997, 2));
    }

    #[test]
    fn test_draft_rejects_bad_lines() {
        let empty = OrderDraft::new(OrderType::DineIn, vec![]);
        assert!(empty.checked_total().is_err());

        let zero = OrderDraft::new(OrderType::DineIn, vec![LineItem::new("Latte", Decimal::ONE, 0)]);
        assert!(zero.checked_total().is_err());

        let negative = OrderDraft::new(OrderType::DineIn, vec![LineItem::new("Latte", -Decimal::ONE, 1)]);
        assert!(negative.checked_total().is_err());
    }

    #[test]
    fn test_order_type_spellings() {
        assert_eq!("Dine-In".parse::<OrderType>().unwrap(), OrderType::DineIn);
        assert_eq!("dinein".parse::<OrderType>().unwrap(), OrderType::DineIn);
        assert_eq!("TAKEOUT".parse::<OrderType>().unwrap(), OrderType::Takeout);
        assert!("delivery".parse::<OrderType>().is_err());
    }

    #[test]
    fn test_order_type_from_number() {
        assert_eq!(OrderType::from_order_number("D1234567"), Some(OrderType::DineIn));
        assert_eq!(OrderType::from_order_number("T7654321"), Some(OrderType::Takeout));
        assert_eq!(OrderType::from_order_number("ORD-20261019-001"), None);
        assert_eq!(OrderType::from_order_number(""), None);
    }

    #[test]
    fn test_line_item_quantity_defaults_to_one() {
        let item: LineItem = serde_json::from_str(r#"{"name":"Latte","price":120}"#).unwrap();
        assert_eq!(item.quantity, 1);
        assert_eq!(item.price, Decimal::from(120));
    }

    #[test]
    fn test_line_item_requires_price() {
        assert!(serde_json::from_str::<LineItem>(r#"{"name":"Latte","quantity":2}"#).is_err());
        assert!(serde_json::from_str::<LineItem>(r#"{"name":"Latte","price":"abc"}"#).is_err());
    }
}
