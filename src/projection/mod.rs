//! Client-side projection of the order store: a typed repository over a
//! shared key-value storage, plus the cart and receipt records it holds.

pub mod cache;
pub mod cart;
pub mod error;
pub mod receipt;
pub mod storage;

pub use cache::*;
pub use cart::Cart;
pub use error::ProjectionError;
pub use receipt::*;
pub use storage::*;
