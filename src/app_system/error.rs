use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::menu_actor::MenuError;

#[derive(Debug, Error)]
pub enum SystemError {
    #[error("Data directory {path}: {source}")]
    DataDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] FrameworkError),
    #[error("Menu seeding failed: {0}")]
    Seed(#[from] MenuError),
    #[error("Actor task failed: {0}")]
    TaskFailed(String),
}
