//! REST implementation of MessageRepository

use async_trait::async_trait;
use tracing::instrument;

use alpaca_core::entities::{Message, MessagePatch, NewMessage, Profile};
use alpaca_core::traits::{MessageRepository, RepoResult};
use alpaca_core::value_objects::RecordId;

use crate::client::{first_row, Order, Query, RestClient};
use crate::models::{AuthorRow, AUTHOR_SELECT, MESSAGE_SELECT};

const TABLE: &str = "messages";

/// REST implementation of MessageRepository
#[derive(Debug, Clone)]
pub struct RestMessageRepository {
    client: RestClient,
}

impl RestMessageRepository {
    /// Create a new RestMessageRepository
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MessageRepository for RestMessageRepository {
    #[instrument(skip(self))]
    async fn list_by_channel(&self, channel_id: RecordId) -> RepoResult<Vec<Message>> {
        let query = Query::new()
            .select(MESSAGE_SELECT)
            .eq("channel_id", channel_id)
            .order("created_at", Order::Asc);
        self.client.select(TABLE, &query).await
    }

    #[instrument(skip(self, message), fields(channel_id = %message.channel_id))]
    async fn insert(&self, message: &NewMessage) -> RepoResult<()> {
        self.client.insert(TABLE, &[message]).await
    }

    #[instrument(skip(self, patch))]
    async fn update_content(&self, id: RecordId, patch: &MessagePatch) -> RepoResult<Message> {
        let query = Query::new().eq("id", id).select(MESSAGE_SELECT);
        let rows = self.client.update_returning(TABLE, &query, patch).await?;
        // No row back means the update matched nothing the caller may change
        first_row(rows, "message", id)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: RecordId) -> RepoResult<()> {
        self.client.delete(TABLE, &Query::new().eq("id", id)).await
    }

    #[instrument(skip(self))]
    async fn list_authors(&self, channel_id: RecordId) -> RepoResult<Vec<Profile>> {
        let query = Query::new()
            .select(AUTHOR_SELECT)
            .eq("channel_id", channel_id)
            .order("created_at", Order::Asc);
        let rows: Vec<AuthorRow> = self.client.select(TABLE, &query).await?;
        Ok(rows.into_iter().filter_map(AuthorRow::into_profile).collect())
    }
}
