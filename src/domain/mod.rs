pub mod board;
pub mod menu;
pub mod order;
pub mod status;

pub use board::*;
pub use menu::*;
pub use order::*;
pub use status::*;

use thiserror::Error;

/// A string that does not name any variant of one of the closed enums.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}
