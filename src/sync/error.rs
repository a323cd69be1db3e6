use std::time::Duration;

use thiserror::Error;

use crate::order_actor::OrderError;
use crate::projection::ProjectionError;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("No response within {0:?}")]
    Timeout(Duration),
    #[error("Server rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    Projection(#[from] ProjectionError),
    #[error("Unknown menu item: {0}")]
    UnknownItem(String),
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Synchronizer stopped")]
    Stopped,
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::Network(err.to_string())
    }
}
