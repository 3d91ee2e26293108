//! REST implementation of CommentRepository

use async_trait::async_trait;
use tracing::instrument;

use alpaca_core::entities::{Comment, CommentParent, NewComment};
use alpaca_core::traits::{CommentRepository, RepoResult};

use crate::client::{first_row, Order, Query, RestClient};
use crate::models::WITH_AUTHOR_SELECT;

const TABLE: &str = "comments";

/// REST implementation of CommentRepository
#[derive(Debug, Clone)]
pub struct RestCommentRepository {
    client: RestClient,
}

impl RestCommentRepository {
    /// Create a new RestCommentRepository
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CommentRepository for RestCommentRepository {
    #[instrument(skip(self), fields(parent = %parent))]
    async fn list_by_parent(&self, parent: CommentParent) -> RepoResult<Vec<Comment>> {
        let query = Query::new()
            .select(WITH_AUTHOR_SELECT)
            .eq(parent.column(), parent.id())
            .order("created_at", Order::Asc);
        self.client.select(TABLE, &query).await
    }

    #[instrument(skip(self, comment))]
    async fn create(&self, comment: &NewComment) -> RepoResult<Comment> {
        let rows = self
            .client
            .insert_returning(TABLE, &[comment], &Query::new().select(WITH_AUTHOR_SELECT))
            .await?;
        first_row(rows, "comment", comment.user_id)
    }
}
