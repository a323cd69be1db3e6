//! System orchestration, startup, and shutdown logic.

pub mod coffee_system;
pub mod error;
pub mod tracing;

pub use self::tracing::*;
pub use coffee_system::*;
pub use error::*;
