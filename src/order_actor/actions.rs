use crate::domain::{Order, OrderStatus, TransitionPolicy};

/// Custom actions for Order entities.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Move the order to `status`, checked against `policy`.
    SetStatus {
        status: OrderStatus,
        policy: TransitionPolicy,
    },
}

/// Results from OrderActions - variants match 1:1 with OrderAction
#[derive(Debug, Clone)]
pub enum OrderActionResult {
    /// The order as stored after the change, plus the status it left.
    SetStatus { order: Order, previous: OrderStatus },
}
