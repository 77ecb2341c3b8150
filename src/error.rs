use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoriesError {
    /// An action kind outside the four the reducer understands.
    #[error("unknown stories action: {0}")]
    UnknownAction(String),
    #[error("invalid payload for {kind}: {source}")]
    InvalidPayload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}
