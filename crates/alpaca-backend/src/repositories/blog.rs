//! REST implementation of BlogRepository

use async_trait::async_trait;
use tracing::instrument;

use alpaca_core::entities::{BlogPost, BlogPostUpdate, NewBlogPost, Tag};
use alpaca_core::traits::{BlogRepository, RepoResult};
use alpaca_core::value_objects::RecordId;

use crate::client::{first_row, Order, Query, RestClient};
use crate::models::{BlogPostRow, PostIdRow, TagInsert, TagLinkInsert, BLOG_POST_SELECT};

const POSTS: &str = "blog_posts";
const TAGS: &str = "tags";
const POST_TAGS: &str = "blog_post_tags";

/// REST implementation of BlogRepository
#[derive(Debug, Clone)]
pub struct RestBlogRepository {
    client: RestClient,
}

impl RestBlogRepository {
    /// Create a new RestBlogRepository
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BlogRepository for RestBlogRepository {
    #[instrument(skip(self))]
    async fn list_posts(&self, ids: Option<&[RecordId]>) -> RepoResult<Vec<BlogPost>> {
        let mut query = Query::new()
            .select(BLOG_POST_SELECT)
            .order("created_at", Order::Desc);
        if let Some(ids) = ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            query = query.in_list("id", ids);
        }
        let rows: Vec<BlogPostRow> = self.client.select(POSTS, &query).await?;
        Ok(rows.into_iter().map(BlogPost::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_post(&self, id: RecordId) -> RepoResult<Option<BlogPost>> {
        let query = Query::new().select(BLOG_POST_SELECT).eq("id", id);
        let row: Option<BlogPostRow> = self.client.select_one(POSTS, &query).await?;
        Ok(row.map(BlogPost::from))
    }

    #[instrument(skip(self, post), fields(title = %post.title))]
    async fn create_post(&self, post: &NewBlogPost) -> RepoResult<BlogPost> {
        let rows: Vec<BlogPostRow> = self
            .client
            .insert_returning(POSTS, &[post], &Query::new().select(BLOG_POST_SELECT))
            .await?;
        first_row(rows, "blog post", &post.title).map(BlogPost::from)
    }

    #[instrument(skip(self, update))]
    async fn update_post(&self, id: RecordId, update: &BlogPostUpdate) -> RepoResult<BlogPost> {
        let query = Query::new().eq("id", id).select(BLOG_POST_SELECT);
        let rows: Vec<BlogPostRow> = self.client.update_returning(POSTS, &query, update).await?;
        first_row(rows, "blog post", id).map(BlogPost::from)
    }

    #[instrument(skip(self))]
    async fn delete_post(&self, id: RecordId) -> RepoResult<()> {
        self.client.delete(POSTS, &Query::new().eq("id", id)).await
    }

    #[instrument(skip(self))]
    async fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        let query = Query::new().select("*").order("name", Order::Asc);
        self.client.select(TAGS, &query).await
    }

    #[instrument(skip(self))]
    async fn find_tags_by_names(&self, names: &[String]) -> RepoResult<Vec<Tag>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let query = Query::new().select("id,name").in_list("name", names);
        self.client.select(TAGS, &query).await
    }

    #[instrument(skip(self))]
    async fn create_tags(&self, names: &[String]) -> RepoResult<Vec<Tag>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<TagInsert<'_>> = names.iter().map(|name| TagInsert { name }).collect();
        self.client
            .insert_returning(TAGS, &rows, &Query::new().select("id,name"))
            .await
    }

    #[instrument(skip(self))]
    async fn post_ids_with_tags(&self, tag_ids: &[RecordId]) -> RepoResult<Vec<RecordId>> {
        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = Query::new()
            .select("blog_post_id")
            .in_list("tag_id", tag_ids);
        let rows: Vec<PostIdRow> = self.client.select(POST_TAGS, &query).await?;

        let mut ids: Vec<RecordId> = Vec::with_capacity(rows.len());
        for row in rows {
            if !ids.contains(&row.blog_post_id) {
                ids.push(row.blog_post_id);
            }
        }
        Ok(ids)
    }

    #[instrument(skip(self))]
    async fn link_tags(&self, post_id: RecordId, tag_ids: &[RecordId]) -> RepoResult<()> {
        if tag_ids.is_empty() {
            return Ok(());
        }
        let links: Vec<TagLinkInsert> = tag_ids
            .iter()
            .map(|tag_id| TagLinkInsert {
                blog_post_id: post_id,
                tag_id: *tag_id,
            })
            .collect();
        self.client.insert(POST_TAGS, &links).await
    }

    #[instrument(skip(self))]
    async fn unlink_all_tags(&self, post_id: RecordId) -> RepoResult<()> {
        self.client
            .delete(POST_TAGS, &Query::new().eq("blog_post_id", post_id))
            .await
    }
}
