//! Comment service

use alpaca_cache::QueryKey;
use alpaca_core::{Comment, CommentParent, NewComment};
use tracing::{info, instrument};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Comment service
pub struct CommentService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CommentService<'a> {
    /// Create a new CommentService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Thread under a journal entry or blog post
    #[instrument(skip(self))]
    pub async fn list(&self, parent: CommentParent) -> ServiceResult<Vec<Comment>> {
        let key = QueryKey::Comments(parent);
        if let Some(comments) = self.ctx.fresh(&key) {
            return Ok(comments);
        }
        let comments = self.ctx.comment_repo().list_by_parent(parent).await?;
        self.ctx.cache().write(key, comments.clone());
        Ok(comments)
    }

    /// Post a comment as the signed-in user
    #[instrument(skip(self, content))]
    pub async fn post(&self, parent: CommentParent, content: &str) -> ServiceResult<Comment> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ServiceError::validation("Please write something before posting."));
        }
        let user_id = self.ctx.require_user()?;

        let comment = self
            .ctx
            .comment_repo()
            .create(&NewComment::for_parent(parent, user_id, content))
            .await?;
        self.ctx.cache().invalidate(&QueryKey::Comments(parent));

        info!(comment_id = %comment.id, parent = %parent, "Comment posted");
        Ok(comment)
    }
}
