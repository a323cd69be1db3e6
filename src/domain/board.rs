use super::{Order, OrderStatus};

/// Sort key for entries without a priority number; larger than any real one.
pub const MISSING_PRIORITY: u32 = u32::MAX;

/// Anything that can be queued on the preparing/serving board.
pub trait Queued {
    fn status(&self) -> OrderStatus;
    fn priority(&self) -> Option<u32>;
}

impl Queued for Order {
    fn status(&self) -> OrderStatus {
        self.status
    }

    fn priority(&self) -> Option<u32> {
        Some(self.priority_number)
    }
}

/// Orders in Preparing or Serving, ascending by priority. The sort is
/// stable, so ties keep their input order.
pub fn board<T: Queued + Clone>(orders: &[T]) -> Vec<T> {
    let mut on_board: Vec<T> = orders
        .iter()
        .filter(|o| o.status().on_board())
        .cloned()
        .collect();
    on_board.sort_by_key(|o| o.priority().unwrap_or(MISSING_PRIORITY));
    on_board
}

/// Board split into its two display columns.
pub fn board_columns<T: Queued + Clone>(orders: &[T]) -> (Vec<T>, Vec<T>) {
    board(orders)
        .into_iter()
        .partition(|o| o.status() == OrderStatus::Preparing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Ticket(OrderStatus, Option<u32>);

    impl Queued for Ticket {
        fn status(&self) -> OrderStatus {
            self.0
        }

        fn priority(&self) -> Option<u32> {
            self.1
        }
    }

    #[test]
    fn test_board_filters_and_sorts() {
        let orders = vec![
            Ticket(OrderStatus::Serving, Some(7)),
            Ticket(OrderStatus::Pending, Some(1)),
            Ticket(OrderStatus::Preparing, None),
            Ticket(OrderStatus::Preparing, Some(3)),
            Ticket(OrderStatus::Completed, Some(2)),
            Ticket(OrderStatus::Serving, Some(5000)),
        ];

        let board = board(&orders);
        assert_eq!(
            board,
            vec![
                Ticket(OrderStatus::Preparing, Some(3)),
                Ticket(OrderStatus::Serving, Some(7)),
                Ticket(OrderStatus::Serving, Some(5000)),
                Ticket(OrderStatus::Preparing, None),
            ]
        );
    }

    #[test]
    fn test_board_columns() {
        let orders = vec![
            Ticket(OrderStatus::Serving, Some(2)),
            Ticket(OrderStatus::Preparing, Some(4)),
            Ticket(OrderStatus::Preparing, Some(1)),
        ];

        let (preparing, serving) = board_columns(&orders);
        assert_eq!(preparing, vec![Ticket(OrderStatus::Preparing, Some(1)), Ticket(OrderStatus::Preparing, Some(4))]);
        assert_eq!(serving, vec![Ticket(OrderStatus::Serving, Some(2))]);
    }
}
