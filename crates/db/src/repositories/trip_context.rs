use sqlx::Row;
use tripline_core::domain::trip::{ConversationId, TripContext};

use super::{validate_conversation_id, RepositoryError, TripContextRepository};
use crate::DbPool;

pub struct SqlTripContextRepository {
    pool: DbPool,
}

impl SqlTripContextRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl TripContextRepository for SqlTripContextRepository {
    async fn find(&self, id: &ConversationId) -> Result<Option<TripContext>, RepositoryError> {
        let row = sqlx::query("SELECT document FROM trip_context WHERE conversation_id = ?")
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let document: String = row.try_get("document")?;
        let context = serde_json::from_str::<TripContext>(&document).map_err(|error| {
            RepositoryError::Decode(format!("trip_context `{}`: {error}", id.0))
        })?;
        Ok(Some(context))
    }

    async fn save(&self, context: &TripContext) -> Result<(), RepositoryError> {
        validate_conversation_id(&context.conversation_id)?;
        let document = serde_json::to_string(context)?;

        sqlx::query(
            r#"
            INSERT INTO trip_context (
                conversation_id, document, booking_status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(conversation_id) DO UPDATE SET
                document = excluded.document,
                booking_status = excluded.booking_status,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&context.conversation_id.0)
        .bind(document)
        .bind(context.flight.booking_status.as_str())
        .bind(context.created_at.to_rfc3339())
        .bind(context.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: &ConversationId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM trip_context WHERE conversation_id = ?")
            .bind(&id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_ids(&self) -> Result<Vec<ConversationId>, RepositoryError> {
        let rows = sqlx::query("SELECT conversation_id FROM trip_context ORDER BY conversation_id")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                row.try_get::<String, _>("conversation_id")
                    .map(ConversationId)
                    .map_err(RepositoryError::from)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use sqlx::Row;
    use tripline_core::domain::flight::BookingStatus;
    use tripline_core::domain::summary::Place;
    use tripline_core::domain::trip::{ConversationId, TripContext};

    use super::SqlTripContextRepository;
    use crate::repositories::{RepositoryError, TripContextRepository};
    use crate::{connect_with_settings, migrations, DbPool};

    async fn pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    #[tokio::test]
    async fn save_find_and_upsert() {
        let pool = pool().await;
        let repo = SqlTripContextRepository::new(pool.clone());
        let mut context = TripContext::new(ConversationId("conv-sql".to_string()));
        context.summary.destination = Some(Place::named("Singapore"));

        repo.save(&context).await.expect("insert");
        context.flight.booking_status = BookingStatus::ResultsShown;
        repo.save(&context).await.expect("upsert");

        let found = repo.find(&context.conversation_id).await.expect("find");
        assert_eq!(found, Some(context));

        let status = sqlx::query("SELECT booking_status FROM trip_context WHERE conversation_id = ?")
            .bind("conv-sql")
            .fetch_one(&pool)
            .await
            .expect("status row")
            .get::<String, _>("booking_status");
        assert_eq!(status, "results_shown");
        assert_eq!(repo.list_ids().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn delete_and_missing_rows() {
        let repo = SqlTripContextRepository::new(pool().await);
        let id = ConversationId("conv-gone".to_string());

        assert_eq!(repo.find(&id).await.expect("find"), None);
        repo.save(&TripContext::new(id.clone())).await.expect("save");
        assert!(repo.delete(&id).await.expect("delete"));
        assert!(!repo.delete(&id).await.expect("delete again"));
    }

    #[tokio::test]
    async fn corrupt_documents_surface_as_decode_errors() {
        let pool = pool().await;
        sqlx::query(
            "INSERT INTO trip_context (conversation_id, document, created_at, updated_at)
             VALUES ('conv-bad', '{not json', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
        )
        .execute(&pool)
        .await
        .expect("insert corrupt row");

        let repo = SqlTripContextRepository::new(pool);
        let error = repo
            .find(&ConversationId("conv-bad".to_string()))
            .await
            .expect_err("decode failure");
        assert!(matches!(error, RepositoryError::Decode(ref message) if message.contains("conv-bad")));
    }
}
