use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::debug;
use tripline_core::domain::trip::{ConversationId, TripContext};

use super::{validate_conversation_id, RepositoryError, TripContextRepository};

/// One pretty-printed JSON document per conversation under `base_path`.
///
/// Writes go to a hidden temp file in the same directory and are renamed into place, so a
/// reader never sees a half-written document.
pub struct FileTripContextRepository {
    base_path: PathBuf,
}

impl FileTripContextRepository {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self { base_path: base_path.into() }
    }

    fn context_path(&self, id: &ConversationId) -> Result<PathBuf, RepositoryError> {
        validate_conversation_id(id)?;
        Ok(self.base_path.join(format!("{}.json", id.0)))
    }
}

#[async_trait::async_trait]
impl TripContextRepository for FileTripContextRepository {
    async fn find(&self, id: &ConversationId) -> Result<Option<TripContext>, RepositoryError> {
        let path = self.context_path(id)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn save(&self, context: &TripContext) -> Result<(), RepositoryError> {
        let path = self.context_path(&context.conversation_id)?;
        tokio::fs::create_dir_all(&self.base_path).await?;

        let content = serde_json::to_string_pretty(context)?;
        let tmp_path = self.base_path.join(format!(
            ".{}.{}.tmp",
            context.conversation_id.0,
            uuid::Uuid::new_v4().simple()
        ));

        let write_result = async {
            tokio::fs::write(&tmp_path, content.as_bytes()).await?;
            match tokio::fs::rename(&tmp_path, &path).await {
                Ok(()) => {}
                Err(error) if error.kind() == ErrorKind::AlreadyExists => {
                    tokio::fs::remove_file(&path).await?;
                    tokio::fs::rename(&tmp_path, &path).await?;
                }
                Err(error) => return Err(error),
            }
            Ok::<(), std::io::Error>(())
        }
        .await;

        if let Err(error) = write_result {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(error.into());
        }

        debug!(
            event_name = "trip_context.saved",
            conversation_id = %context.conversation_id,
            path = %path.display(),
            "trip context written"
        );
        Ok(())
    }

    async fn delete(&self, id: &ConversationId) -> Result<bool, RepositoryError> {
        let path = self.context_path(id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(false),
            Err(error) => Err(error.into()),
        }
    }

    async fn list_ids(&self) -> Result<Vec<ConversationId>, RepositoryError> {
        let mut entries = match tokio::fs::read_dir(&self.base_path).await {
            Ok(entries) => entries,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(error.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    if !stem.starts_with('.') {
                        ids.push(ConversationId(stem.to_string()));
                    }
                }
            }
        }
        ids.sort_by(|left, right| left.0.cmp(&right.0));
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;
    use tripline_core::domain::flight::BookingStatus;
    use tripline_core::domain::summary::Place;
    use tripline_core::domain::trip::{ConversationId, TripContext};

    use crate::repositories::{FileTripContextRepository, RepositoryError, TripContextRepository};

    fn context(id: &str) -> TripContext {
        let mut context = TripContext::new(ConversationId(id.to_string()));
        context.summary.origin = Some(Place::named("Mumbai"));
        context.flight.booking_status = BookingStatus::ResultsShown;
        context
    }

    #[tokio::test]
    async fn save_then_find_round_trips_the_document() {
        let dir = TempDir::new().expect("temp dir");
        let repo = FileTripContextRepository::new(dir.path().join("conversations"));
        let context = context("conv-file");

        repo.save(&context).await.expect("save");
        let found = repo.find(&context.conversation_id).await.expect("find");

        assert_eq!(found, Some(context));
        assert!(dir.path().join("conversations/conv-file.json").exists());
    }

    #[tokio::test]
    async fn overwrite_leaves_no_temp_files_behind() {
        let dir = TempDir::new().expect("temp dir");
        let repo = FileTripContextRepository::new(dir.path());
        let mut context = context("conv-overwrite");

        repo.save(&context).await.expect("first save");
        context.summary.passengers.adults = 4;
        repo.save(&context).await.expect("second save");

        let found = repo.find(&context.conversation_id).await.expect("find").expect("stored");
        assert_eq!(found.summary.passengers.adults, 4);

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .expect("read dir")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["conv-overwrite.json".to_string()]);
    }

    #[tokio::test]
    async fn missing_directory_reads_as_empty() {
        let dir = TempDir::new().expect("temp dir");
        let repo = FileTripContextRepository::new(dir.path().join("never-created"));
        let id = ConversationId("conv-none".to_string());

        assert_eq!(repo.find(&id).await.expect("find"), None);
        assert!(!repo.delete(&id).await.expect("delete"));
        assert!(repo.list_ids().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn traversal_ids_never_touch_the_filesystem() {
        let dir = TempDir::new().expect("temp dir");
        let repo = FileTripContextRepository::new(dir.path());

        let error = repo
            .find(&ConversationId("../../etc/passwd".to_string()))
            .await
            .expect_err("traversal rejected");
        assert!(matches!(error, RepositoryError::InvalidId(_)));
    }

    #[tokio::test]
    async fn list_and_delete_by_conversation() {
        let dir = TempDir::new().expect("temp dir");
        let repo = FileTripContextRepository::new(dir.path());
        repo.save(&context("conv-b")).await.expect("save b");
        repo.save(&context("conv-a")).await.expect("save a");

        let ids = repo.list_ids().await.expect("list");
        assert_eq!(
            ids,
            vec![ConversationId("conv-a".to_string()), ConversationId("conv-b".to_string())]
        );

        assert!(repo.delete(&ConversationId("conv-a".to_string())).await.expect("delete"));
        assert_eq!(repo.list_ids().await.expect("list").len(), 1);
    }
}
