//! Order-specific domain logic: identity, numbering and the status machine.

mod actions;
pub mod entity;
pub mod error;
pub mod numbering;

pub use actions::*;
pub use entity::*;
pub use error::*;
pub use numbering::*;
