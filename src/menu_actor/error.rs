use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::domain::ParseEnumError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum MenuError {
    #[error("Menu item not found: {0}")]
    NotFound(String),
    #[error("Menu validation error: {0}")]
    ValidationError(String),
    #[error("Invalid category: {0}")]
    InvalidCategory(String),
    #[error("Menu store error: {0}")]
    StoreError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for MenuError {
    fn from(err: FrameworkError) -> Self {
        match err {
            FrameworkError::NotFound(key) => MenuError::NotFound(key),
            FrameworkError::Storage(msg) => MenuError::StoreError(msg),
            FrameworkError::ActorClosed | FrameworkError::ActorDropped => {
                MenuError::ActorCommunicationError(err.to_string())
            }
        }
    }
}

impl From<ParseEnumError> for MenuError {
    fn from(err: ParseEnumError) -> Self {
        MenuError::InvalidCategory(err.value)
    }
}
