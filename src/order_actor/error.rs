use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::domain::{OrderStatus, ParseEnumError};

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),
    #[error("Order validation error: {0}")]
    ValidationError(String),
    #[error("Invalid status: {0}")]
    InvalidStatus(String),
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Order store error: {0}")]
    StoreError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for OrderError {
    fn from(err: FrameworkError) -> Self {
        match err {
            FrameworkError::NotFound(key) => OrderError::NotFound(key),
            FrameworkError::Storage(msg) => OrderError::StoreError(msg),
            FrameworkError::ActorClosed | FrameworkError::ActorDropped => {
                OrderError::ActorCommunicationError(err.to_string())
            }
        }
    }
}

impl From<ParseEnumError> for OrderError {
    fn from(err: ParseEnumError) -> Self {
        match err.kind {
            "status" => OrderError::InvalidStatus(err.value),
            _ => OrderError::ValidationError(err.to_string()),
        }
    }
}
