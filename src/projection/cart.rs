use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{items_total, LineItem, OrderDraft, OrderType};

/// Items picked before checkout. Unlike orders, the cart folds repeated
/// picks of the same drink into one line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add one of `name`. An existing line keeps its unit price.
    pub fn add(&mut self, name: &str, price: Decimal) {
        match self.items.iter_mut().find(|item| item.name == name) {
            Some(item) => item.quantity += 1,
            None => self.items.push(LineItem::new(name, price, 1)),
        }
    }

    /// Take one of `name` back out; the line goes away at zero.
    pub fn remove_one(&mut self, name: &str) -> bool {
        let Some(index) = self.items.iter().position(|item| item.name == name) else {
            return false;
        };
        if self.items[index].quantity > 1 {
            self.items[index].quantity -= 1;
        } else {
            self.items.remove(index);
        }
        true
    }

    pub fn total(&self) -> Decimal {
        items_total(&self.items)
    }

    pub fn to_draft(&self, order_type: OrderType, payment_method: Option<String>) -> OrderDraft {
        let mut draft = OrderDraft::new(order_type, self.items.clone()).with_claimed_total(self.total());
        draft.payment_method = payment_method;
        draft
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_merges_by_name() {
        let mut cart = Cart::new();
        cart.add("Americano", Decimal::from(50));
        cart.add("Espresso", Decimal::from(30));
        cart.add("Americano", Decimal::from(50));

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.total(), Decimal::new(13000, 2));
    }

    #[test]
    fn test_remove_one_decrements_then_drops() {
        let mut cart = Cart::new();
        cart.add("Latte", Decimal::from(55));
        cart.add("Latte", Decimal::from(55));

        assert!(cart.remove_one("Latte"));
        assert_eq!(cart.items()[0].quantity, 1);
        assert!(cart.remove_one("Latte"));
        assert!(cart.is_empty());
        assert!(!cart.remove_one("Latte"));
    }

    #[test]
    fn test_draft_carries_claimed_total() {
        let mut cart = Cart::new();
        cart.add("Mocha", Decimal::from(65));
        let draft = cart.to_draft(OrderType::Takeout, None);

        assert_eq!(draft.claimed_total, Some(Decimal::from(65)));
        assert_eq!(draft.checked_total().unwrap(), Decimal::from(65));
    }
}
