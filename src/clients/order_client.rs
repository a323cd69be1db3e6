use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::domain::{board_columns, Order, OrderDraft, OrderStatus, TransitionPolicy};
use crate::order_actor::{NumberingScheme, OrderAction, OrderActionResult, OrderCreate, OrderError};

/// Client for interacting with the Order actor.
///
/// Carries the shop's numbering scheme and transition policy so callers only
/// deal in drafts and status strings.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    policy: TransitionPolicy,
    scheme: NumberingScheme,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>, policy: TransitionPolicy, scheme: NumberingScheme) -> Self {
        Self { inner, policy, scheme }
    }

    #[instrument(skip(self, draft), fields(order_type = %draft.order_type, lines = draft.items.len()))]
    pub async fn create_order(&self, draft: OrderDraft) -> Result<Order, OrderError> {
        info!("Processing create_order request");
        let params = OrderCreate {
            draft,
            placed_at: Utc::now(),
            scheme: self.scheme,
        };

        let order = self.inner.create(params).await.inspect_err(|e| {
            warn!(error = %e, "Order rejected");
        })?;
        info!(
            order_number = %order.order_number,
            priority = order.priority_number,
            total = %order.total_amount,
            "Order created"
        );
        Ok(order)
    }

    /// Every order, active first: by status, then priority, then age.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, OrderError> {
        let mut orders = self.inner.list().await?;
        orders.sort_by(|a, b| {
            a.status
                .rank()
                .cmp(&b.status.rank())
                .then(a.priority_number.cmp(&b.priority_number))
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(orders)
    }

    #[instrument(skip(self))]
    pub async fn list_by_status(&self, status: &str) -> Result<Vec<Order>, OrderError> {
        let status: OrderStatus = status.parse()?;
        let orders = self.list_orders().await?;
        Ok(orders.into_iter().filter(|o| o.status == status).collect())
    }

    /// Preparing and Serving columns, each ascending by priority.
    #[instrument(skip(self))]
    pub async fn board(&self) -> Result<(Vec<Order>, Vec<Order>), OrderError> {
        let orders = self.inner.list().await?;
        Ok(board_columns(&orders))
    }

    /// Moves an order (by id or order number) to `status`.
    ///
    /// # Errors
    /// `InvalidStatus` for an unknown status string, `NotFound` for an
    /// unknown key and `InvalidTransition` when the policy refuses the move.
    #[instrument(skip(self))]
    pub async fn set_status(&self, key: String, status: &str) -> Result<Order, OrderError> {
        let status: OrderStatus = status.parse()?;
        let action = OrderAction::SetStatus {
            status,
            policy: self.policy,
        };

        match self.inner.perform_action(key, action).await? {
            OrderActionResult::SetStatus { order, previous } => {
                info!(
                    order_number = %order.order_number,
                    from = %previous,
                    to = %order.status,
                    "Status changed"
                );
                Ok(order)
            }
        }
    }

    /// Drops every order; priority numbers start again at 1.
    #[instrument(skip(self))]
    pub async fn reset_session(&self) -> Result<usize, OrderError> {
        let removed = self.inner.clear().await?;
        info!(removed, "Order session reset");
        Ok(removed)
    }
}

crate::impl_client_methods!(OrderClient, Order, OrderError, order);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LineItem, OrderType};
    use crate::mock_framework::{create_mock_client, expect_action, expect_create, expect_list};
    use rust_decimal::Decimal;

    fn stored(id: u64, priority: u32, status: OrderStatus) -> Order {
        Order {
            id,
            order_number: format!("D{:07}", id),
            priority_number: priority,
            order_type: OrderType::DineIn,
            items: vec![LineItem::new("Latte", Decimal::from(120), 1)],
            total_amount: Decimal::from(120),
            payment_method: "Cash".to_string(),
            status,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_order_stamps_scheme() {
        let (inner, mut rx) = create_mock_client::<Order>(10);
        let client = OrderClient::new(inner, TransitionPolicy::Permissive, NumberingScheme::DateSequential);

        let task = tokio::spawn(async move {
            let draft = OrderDraft::new(OrderType::Takeout, vec![LineItem::new("Mocha", Decimal::from(65), 2)]);
            client.create_order(draft).await
        });

        let (params, responder) = expect_create(&mut rx).await.expect("Expected Create request");
        assert_eq!(params.scheme, NumberingScheme::DateSequential);
        assert_eq!(params.draft.order_type, OrderType::Takeout);
        responder.send(Ok(stored(1, 1, OrderStatus::Pending))).unwrap();

        let order = task.await.unwrap().unwrap();
        assert_eq!(order.priority_number, 1);
    }

    #[tokio::test]
    async fn test_set_status_rejects_unknown_before_sending() {
        let (inner, mut rx) = create_mock_client::<Order>(10);
        let client = OrderClient::new(inner, TransitionPolicy::Permissive, NumberingScheme::Timestamp);

        let err = client.set_status("1".to_string(), "cancelled").await.unwrap_err();
        assert_eq!(err, OrderError::InvalidStatus("cancelled".to_string()));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_set_status_normalizes_and_forwards_policy() {
        let (inner, mut rx) = create_mock_client::<Order>(10);
        let client = OrderClient::new(inner, TransitionPolicy::ForwardOnly, NumberingScheme::Timestamp);

        let task = tokio::spawn(async move { client.set_status("D0000007".to_string(), "READY").await });

        let (key, action, responder) = expect_action(&mut rx).await.expect("Expected Action request");
        assert_eq!(key, "D0000007");
        let OrderAction::SetStatus { status, policy } = action;
        assert_eq!(status, OrderStatus::Serving);
        assert_eq!(policy, TransitionPolicy::ForwardOnly);

        let mut order = stored(7, 3, OrderStatus::Serving);
        order.status = status;
        responder
            .send(Ok(OrderActionResult::SetStatus {
                order,
                previous: OrderStatus::Preparing,
            }))
            .unwrap();

        let updated = task.await.unwrap().unwrap();
        assert_eq!(updated.status, OrderStatus::Serving);
    }

    #[tokio::test]
    async fn test_list_orders_sorted_by_status_then_priority() {
        let (inner, mut rx) = create_mock_client::<Order>(10);
        let client = OrderClient::new(inner, TransitionPolicy::Permissive, NumberingScheme::Timestamp);

        let task = tokio::spawn(async move { client.list_orders().await });

        let responder = expect_list(&mut rx).await.expect("Expected List request");
        responder
            .send(Ok(vec![
                stored(1, 1, OrderStatus::Completed),
                stored(2, 4, OrderStatus::Pending),
                stored(3, 3, OrderStatus::Serving),
                stored(4, 2, OrderStatus::Pending),
            ]))
            .unwrap();

        let ids: Vec<u64> = task.await.unwrap().unwrap().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![4, 2, 3, 1]);
    }
}
