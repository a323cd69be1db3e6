//! Typed, instrumented front doors to the resource actors.

mod macros;
pub mod menu_client;
pub mod order_client;

pub use menu_client::MenuClient;
pub use order_client::OrderClient;
