//! Blog service
//!
//! Posts with tags. Tags live in their own table and are linked to posts
//! through a join table.

use alpaca_cache::{QueryKey, BLOG_POSTS};
use alpaca_core::{BlogPost, BlogPostUpdate, NewBlogPost, RecordId, Tag};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::dto::{CreateBlogPostRequest, UpdateBlogPostRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Blog service
pub struct BlogService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> BlogService<'a> {
    /// Create a new BlogService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Posts, optionally limited to those carrying any of `tags`
    #[instrument(skip(self))]
    pub async fn list_posts(&self, tags: &[String]) -> ServiceResult<Vec<BlogPost>> {
        let key = QueryKey::blog_posts(tags);
        if let Some(posts) = self.ctx.fresh(&key) {
            return Ok(posts);
        }
        let posts = self.fetch_posts(tags).await?;
        self.ctx.cache().write(key, posts.clone());
        Ok(posts)
    }

    async fn fetch_posts(&self, tags: &[String]) -> ServiceResult<Vec<BlogPost>> {
        let repo = self.ctx.blog_repo();
        if tags.is_empty() {
            return Ok(repo.list_posts(None).await?);
        }

        let tag_ids: Vec<RecordId> = repo
            .find_tags_by_names(tags)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();
        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }
        let post_ids = repo.post_ids_with_tags(&tag_ids).await?;
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(repo.list_posts(Some(&post_ids)).await?)
    }

    /// All tags
    #[instrument(skip(self))]
    pub async fn tags(&self) -> ServiceResult<Vec<Tag>> {
        if let Some(tags) = self.ctx.fresh(&QueryKey::Tags) {
            return Ok(tags);
        }
        let tags = self.ctx.blog_repo().list_tags().await?;
        self.ctx.cache().write(QueryKey::Tags, tags.clone());
        Ok(tags)
    }

    /// Get one post
    #[instrument(skip(self))]
    pub async fn get(&self, post_id: RecordId) -> ServiceResult<BlogPost> {
        let key = QueryKey::BlogPost(post_id);
        if let Some(post) = self.ctx.fresh(&key) {
            return Ok(post);
        }
        let post = self
            .ctx
            .blog_repo()
            .find_post(post_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("BlogPost", post_id))?;
        self.ctx.cache().write(key, post.clone());
        Ok(post)
    }

    /// Publish a post as the signed-in user
    #[instrument(skip(self, request))]
    pub async fn create(&self, request: CreateBlogPostRequest) -> ServiceResult<BlogPost> {
        request.validate()?;
        let user_id = self.ctx.require_user()?;

        let post = self
            .ctx
            .blog_repo()
            .create_post(&NewBlogPost {
                user_id,
                title: request.title.trim().to_string(),
                content: request.content.clone(),
            })
            .await?;

        let names = request.tag_names();
        if !names.is_empty() {
            self.attach_tags(post.id, &names).await;
        }
        self.invalidate_lists();

        info!(post_id = %post.id, tags = names.len(), "Blog post created");
        self.reload(post).await
    }

    /// Edit a post; tags are replaced only when the request carries them
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        post_id: RecordId,
        request: UpdateBlogPostRequest,
    ) -> ServiceResult<BlogPost> {
        request.validate()?;
        self.ctx.require_user()?;

        let update = BlogPostUpdate {
            title: request.title.as_deref().map(|t| t.trim().to_string()),
            content: request.content.clone(),
        };
        let post = if update.is_empty() {
            self.get(post_id).await?
        } else {
            self.ctx.blog_repo().update_post(post_id, &update).await?
        };

        if let Some(names) = request.tag_names() {
            self.ctx.blog_repo().unlink_all_tags(post_id).await?;
            if !names.is_empty() {
                self.attach_tags(post_id, &names).await;
            }
        }
        self.ctx.cache().remove(&QueryKey::BlogPost(post_id));
        self.invalidate_lists();

        info!(post_id = %post_id, "Blog post updated");
        self.reload(post).await
    }

    /// Delete a post
    #[instrument(skip(self))]
    pub async fn delete(&self, post_id: RecordId) -> ServiceResult<()> {
        self.ctx.require_user()?;
        self.ctx.blog_repo().delete_post(post_id).await?;

        self.ctx.cache().remove(&QueryKey::BlogPost(post_id));
        self.invalidate_lists();
        info!(post_id = %post_id, "Blog post deleted");
        Ok(())
    }

    /// Find or create every named tag, then link them all to the post
    ///
    /// Failures are logged; the post itself is already saved.
    async fn attach_tags(&self, post_id: RecordId, names: &[String]) {
        let tags = match self.ensure_tags(names).await {
            Ok(tags) => tags,
            Err(e) => {
                warn!(post_id = %post_id, error = %e, "Failed to resolve tags");
                return;
            }
        };
        let tag_ids: Vec<RecordId> = tags.iter().map(|t| t.id).collect();
        if let Err(e) = self.ctx.blog_repo().link_tags(post_id, &tag_ids).await {
            warn!(post_id = %post_id, error = %e, "Failed to link tags");
        }
    }

    async fn ensure_tags(&self, names: &[String]) -> ServiceResult<Vec<Tag>> {
        let repo = self.ctx.blog_repo();
        let mut tags = repo.find_tags_by_names(names).await?;
        let missing: Vec<String> = names
            .iter()
            .filter(|name| !tags.iter().any(|t| &t.name == *name))
            .cloned()
            .collect();
        if !missing.is_empty() {
            tags.extend(repo.create_tags(&missing).await?);
            self.ctx.cache().invalidate(&QueryKey::Tags);
        }
        Ok(tags)
    }

    /// Re-read a saved post so its tags are current
    async fn reload(&self, saved: BlogPost) -> ServiceResult<BlogPost> {
        Ok(self
            .ctx
            .blog_repo()
            .find_post(saved.id)
            .await?
            .unwrap_or(saved))
    }

    fn invalidate_lists(&self) {
        self.ctx.cache().invalidate_resource(BLOG_POSTS);
    }
}
