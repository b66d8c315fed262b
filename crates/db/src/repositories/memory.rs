use std::collections::HashMap;

use tokio::sync::RwLock;

use tripline_core::domain::trip::{ConversationId, TripContext};

use super::{validate_conversation_id, RepositoryError, TripContextRepository};

#[derive(Default)]
pub struct InMemoryTripContextRepository {
    contexts: RwLock<HashMap<String, TripContext>>,
}

#[async_trait::async_trait]
impl TripContextRepository for InMemoryTripContextRepository {
    async fn find(&self, id: &ConversationId) -> Result<Option<TripContext>, RepositoryError> {
        let contexts = self.contexts.read().await;
        Ok(contexts.get(&id.0).cloned())
    }

    async fn save(&self, context: &TripContext) -> Result<(), RepositoryError> {
        validate_conversation_id(&context.conversation_id)?;
        let mut contexts = self.contexts.write().await;
        contexts.insert(context.conversation_id.0.clone(), context.clone());
        Ok(())
    }

    async fn delete(&self, id: &ConversationId) -> Result<bool, RepositoryError> {
        let mut contexts = self.contexts.write().await;
        Ok(contexts.remove(&id.0).is_some())
    }

    async fn list_ids(&self) -> Result<Vec<ConversationId>, RepositoryError> {
        let contexts = self.contexts.read().await;
        let mut ids: Vec<ConversationId> = contexts.keys().cloned().map(ConversationId).collect();
        ids.sort_by(|left, right| left.0.cmp(&right.0));
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use tripline_core::domain::trip::{ConversationId, TripContext};

    use crate::repositories::{InMemoryTripContextRepository, TripContextRepository};

    #[tokio::test]
    async fn in_memory_repo_round_trip() {
        let repo = InMemoryTripContextRepository::default();
        let mut context = TripContext::new(ConversationId("conv-1".to_string()));
        context.summary.passengers.adults = 2;

        repo.save(&context).await.expect("save context");
        let found = repo.find(&context.conversation_id).await.expect("find context");

        assert_eq!(found, Some(context));
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_was_removed() {
        let repo = InMemoryTripContextRepository::default();
        let id = ConversationId("conv-2".to_string());
        repo.save(&TripContext::new(id.clone())).await.expect("save context");

        assert!(repo.delete(&id).await.expect("first delete"));
        assert!(!repo.delete(&id).await.expect("second delete"));
        assert_eq!(repo.find(&id).await.expect("find"), None);
        assert!(repo.list_ids().await.expect("list").is_empty());
    }
}
