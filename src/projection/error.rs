use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("Could not encode {key}: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
