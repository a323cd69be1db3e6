use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ParseEnumError;

/// Where an order is in the kitchen pipeline.
///
/// Every boundary (HTTP body, URL segment, local storage) goes through
/// [`FromStr`], which accepts any casing and treats `ready` as `serving`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum OrderStatus {
    #[default]
    Pending,
    Preparing,
    Serving,
    Completed,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Serving,
        OrderStatus::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::Serving => "Serving",
            OrderStatus::Completed => "Completed",
        }
    }

    /// Position in the canonical flow.
    pub fn rank(self) -> u8 {
        match self {
            OrderStatus::Pending => 0,
            OrderStatus::Preparing => 1,
            OrderStatus::Serving => 2,
            OrderStatus::Completed => 3,
        }
    }

    pub fn is_active(self) -> bool {
        self != OrderStatus::Completed
    }

    /// Shown on the preparing/serving board.
    pub fn on_board(self) -> bool {
        matches!(self, OrderStatus::Preparing | OrderStatus::Serving)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "preparing" => Ok(OrderStatus::Preparing),
            "serving" | "ready" => Ok(OrderStatus::Serving),
            "completed" => Ok(OrderStatus::Completed),
            _ => Err(ParseEnumError::new("status", s)),
        }
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OrderStatus> for &'static str {
    fn from(status: OrderStatus) -> Self {
        status.as_str()
    }
}

/// How strictly status changes are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TransitionPolicy {
    /// Any status may be set from any other, so staff can correct mistakes.
    #[default]
    Permissive,
    /// Only the next step in the canonical flow. Re-setting the current
    /// status is accepted as a no-op.
    ForwardOnly,
}

impl TransitionPolicy {
    pub fn allows(self, from: OrderStatus, to: OrderStatus) -> bool {
        match self {
            TransitionPolicy::Permissive => true,
            TransitionPolicy::ForwardOnly => from == to || to.rank() == from.rank() + 1,
        }
    }
}
