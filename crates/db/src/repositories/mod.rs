use async_trait::async_trait;
use thiserror::Error;

use tripline_core::domain::trip::{ConversationId, TripContext};

pub mod file;
pub mod memory;
pub mod trip_context;

pub use file::FileTripContextRepository;
pub use memory::InMemoryTripContextRepository;
pub use trip_context::SqlTripContextRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("invalid conversation id: {0}")]
    InvalidId(String),
}

/// Storage for one trip-context document per conversation.
#[async_trait]
pub trait TripContextRepository: Send + Sync {
    async fn find(&self, id: &ConversationId) -> Result<Option<TripContext>, RepositoryError>;
    async fn save(&self, context: &TripContext) -> Result<(), RepositoryError>;
    /// Returns whether a stored context was removed.
    async fn delete(&self, id: &ConversationId) -> Result<bool, RepositoryError>;
    async fn list_ids(&self) -> Result<Vec<ConversationId>, RepositoryError>;
}

/// Rejects ids that are empty or could escape a storage directory.
pub fn validate_conversation_id(id: &ConversationId) -> Result<(), RepositoryError> {
    let raw = id.0.as_str();
    if raw.trim().is_empty() {
        return Err(RepositoryError::InvalidId("conversation id cannot be empty".to_string()));
    }
    if raw.contains('/') || raw.contains('\\') || raw.contains("..") || raw.contains('\0') {
        return Err(RepositoryError::InvalidId(format!(
            "conversation id contains invalid characters: {raw:?}"
        )));
    }
    if raw.chars().any(char::is_control) {
        return Err(RepositoryError::InvalidId(format!(
            "conversation id contains control characters: {raw:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tripline_core::domain::trip::ConversationId;

    use super::{validate_conversation_id, RepositoryError};

    #[test]
    fn path_like_ids_are_rejected() {
        for raw in ["", "  ", "../etc", "a/b", "a\\b", "nul\0byte", "line\nbreak"] {
            let result = validate_conversation_id(&ConversationId(raw.to_string()));
            assert!(matches!(result, Err(RepositoryError::InvalidId(_))), "{raw:?}");
        }
        assert!(validate_conversation_id(&ConversationId("slack-C123-1700000000.1".to_string()))
            .is_ok());
    }
}
