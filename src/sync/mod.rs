//! Keeping screens current: order sources, the per-view synchronizer,
//! checkout sequencing and text rendering.

pub mod checkout;
pub mod error;
pub mod source;
pub mod synchronizer;
pub mod views;

pub use checkout::checkout;
pub use error::SyncError;
pub use source::{HttpOrderSource, OrderSource};
pub use synchronizer::{SyncCommand, SyncConfig, SyncHandle, ViewSynchronizer};
pub use views::{render_receipt, Frame, FrameSink, StdoutSink, ViewKind, ViewState};
