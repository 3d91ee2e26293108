//! REST implementation of NoteRepository

use async_trait::async_trait;
use tracing::instrument;

use alpaca_core::entities::{NewNote, Note};
use alpaca_core::traits::{NoteRepository, RepoResult};

use crate::client::{first_row, Order, Query, RestClient};

const TABLE: &str = "notes";

/// REST implementation of NoteRepository
#[derive(Debug, Clone)]
pub struct RestNoteRepository {
    client: RestClient,
}

impl RestNoteRepository {
    /// Create a new RestNoteRepository
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NoteRepository for RestNoteRepository {
    #[instrument(skip(self))]
    async fn list(&self) -> RepoResult<Vec<Note>> {
        let query = Query::new().select("*").order("created_at", Order::Desc);
        self.client.select(TABLE, &query).await
    }

    #[instrument(skip(self, note), fields(title = %note.title))]
    async fn create(&self, note: &NewNote) -> RepoResult<Note> {
        let rows = self
            .client
            .insert_returning(TABLE, &[note], &Query::new().select("*"))
            .await?;
        first_row(rows, "note", &note.title)
    }
}
