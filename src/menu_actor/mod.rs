//! Menu items: validation, COALESCE-style patches and the default menu.

pub mod entity;
pub mod error;
pub mod seed;

pub use error::*;
pub use seed::default_menu;
