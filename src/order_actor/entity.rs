use chrono::{DateTime, Utc};

use crate::actor_framework::{Entity, Records};
use crate::domain::{Order, OrderDraft, OrderStatus, DEFAULT_PAYMENT_METHOD};

use super::actions::{OrderAction, OrderActionResult};
use super::numbering::{assign_order_number, next_priority_number, NumberingScheme, PrioritySession};
use super::OrderError;

/// Creation parameters: the checkout draft plus what the caller decided
/// about when and how it should be numbered.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub draft: OrderDraft,
    pub placed_at: DateTime<Utc>,
    pub scheme: NumberingScheme,
}

impl Entity for Order {
    type Id = u64;
    type CreateParams = OrderCreate;
    type Patch = (); // Orders only change through actions
    type Action = OrderAction;
    type ActionResult = OrderActionResult;
    type Error = OrderError;
    type Session = PrioritySession;

    fn id(&self) -> &u64 {
        &self.id
    }

    fn alt_key(&self) -> Option<&str> {
        Some(&self.order_number)
    }

    /// Creates a new Order from creation parameters.
    ///
    /// # Notes
    /// The total is recomputed from the lines, the priority number follows the
    /// session's high-water mark, the order number is checked against
    /// `existing`, and the order starts as Pending.
    ///
    /// # Errors
    /// `ValidationError` for an empty or malformed draft or a total that
    /// disagrees with the lines; `StoreError` when no number can be issued.
    fn from_create_params(
        id: u64,
        params: OrderCreate,
        existing: &Records<Self>,
        session: &PrioritySession,
    ) -> Result<Self, OrderError> {
        let OrderCreate { draft, placed_at, scheme } = params;

        let total_amount = draft.checked_total().map_err(OrderError::ValidationError)?;
        let priority_number = next_priority_number(session)?;
        let order_number = assign_order_number(
            scheme,
            draft.order_type,
            placed_at,
            id,
            existing,
            &mut rand::thread_rng(),
        )?;

        let payment_method = draft
            .payment_method
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string());

        Ok(Self {
            id,
            order_number,
            priority_number,
            order_type: draft.order_type,
            items: draft.items,
            total_amount,
            payment_method,
            status: OrderStatus::Pending,
            created_at: placed_at,
        })
    }

    fn observe(&self, session: &mut PrioritySession) {
        session.record(self.priority_number);
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), OrderError> {
        Ok(())
    }

    /// Handles order-specific actions.
    ///
    /// # Actions
    /// - `SetStatus`: moves the order if the policy allows the transition
    fn handle_action(&mut self, action: OrderAction) -> Result<OrderActionResult, OrderError> {
        match action {
            OrderAction::SetStatus { status, policy } => {
                let previous = self.status;
                if !policy.allows(previous, status) {
                    return Err(OrderError::InvalidTransition { from: previous, to: status });
                }
                self.status = status;
                Ok(OrderActionResult::SetStatus {
                    order: self.clone(),
                    previous,
                })
            }
        }
    }
}
