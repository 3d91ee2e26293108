//! REST implementation of JournalRepository

use async_trait::async_trait;
use tracing::instrument;

use alpaca_core::entities::{JournalDraft, JournalEntry};
use alpaca_core::traits::{JournalRepository, RepoResult};
use alpaca_core::value_objects::RecordId;

use crate::client::{first_row, Order, Query, RestClient};
use crate::models::WITH_AUTHOR_SELECT;

const TABLE: &str = "journals";

/// REST implementation of JournalRepository
#[derive(Debug, Clone)]
pub struct RestJournalRepository {
    client: RestClient,
}

impl RestJournalRepository {
    /// Create a new RestJournalRepository
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JournalRepository for RestJournalRepository {
    #[instrument(skip(self))]
    async fn list(&self) -> RepoResult<Vec<JournalEntry>> {
        let query = Query::new()
            .select(WITH_AUTHOR_SELECT)
            .order("created_at", Order::Desc);
        self.client.select(TABLE, &query).await
    }

    #[instrument(skip(self))]
    async fn find(&self, id: RecordId) -> RepoResult<Option<JournalEntry>> {
        let query = Query::new().select(WITH_AUTHOR_SELECT).eq("id", id);
        self.client.select_one(TABLE, &query).await
    }

    #[instrument(skip(self, draft), fields(title = %draft.title))]
    async fn create(&self, draft: &JournalDraft) -> RepoResult<JournalEntry> {
        let rows = self
            .client
            .insert_returning(TABLE, &[draft], &Query::new().select(WITH_AUTHOR_SELECT))
            .await?;
        first_row(rows, "journal", &draft.title)
    }

    #[instrument(skip(self, draft))]
    async fn update(&self, id: RecordId, draft: &JournalDraft) -> RepoResult<JournalEntry> {
        let query = Query::new().eq("id", id).select(WITH_AUTHOR_SELECT);
        let rows = self.client.update_returning(TABLE, &query, draft).await?;
        first_row(rows, "journal", id)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: RecordId) -> RepoResult<()> {
        self.client.delete(TABLE, &Query::new().eq("id", id)).await
    }
}
