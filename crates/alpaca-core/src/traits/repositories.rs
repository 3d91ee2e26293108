//! Repository traits (ports) - define the interface for backend access
//!
//! The domain layer defines what it needs, and the backend crate provides
//! the REST implementation. Tests swap in in-memory doubles.

use async_trait::async_trait;

use crate::entities::{
    BlogPost, BlogPostUpdate, Channel, Comment, CommentParent, JournalDraft, JournalEntry,
    Message, MessagePatch, NewBlogPost, NewChannel, NewComment, NewMessage, NewNote, Note,
    Profile, Tag,
};
use crate::error::DomainError;
use crate::value_objects::RecordId;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Channel Repository
// ============================================================================

#[async_trait]
pub trait ChannelRepository: Send + Sync {
    /// List all channels
    async fn list(&self) -> RepoResult<Vec<Channel>>;

    /// Create a new channel and return the stored row
    async fn create(&self, channel: &NewChannel) -> RepoResult<Channel>;
}

// ============================================================================
// Message Repository
// ============================================================================

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// List a channel's messages oldest first, author profile joined
    async fn list_by_channel(&self, channel_id: RecordId) -> RepoResult<Vec<Message>>;

    /// Insert a message; the stored row is observed through the feed
    async fn insert(&self, message: &NewMessage) -> RepoResult<()>;

    /// Replace a message's content and return the updated row
    async fn update_content(&self, id: RecordId, patch: &MessagePatch) -> RepoResult<Message>;

    /// Delete a message
    async fn delete(&self, id: RecordId) -> RepoResult<()>;

    /// Profiles of the channel's message authors in posting order
    ///
    /// One entry per message whose author has a profile, so an author may
    /// appear more than once.
    async fn list_authors(&self, channel_id: RecordId) -> RepoResult<Vec<Profile>>;
}

// ============================================================================
// Blog Repository
// ============================================================================

#[async_trait]
pub trait BlogRepository: Send + Sync {
    /// List posts newest first with tags; `ids` restricts to those posts
    async fn list_posts(&self, ids: Option<&[RecordId]>) -> RepoResult<Vec<BlogPost>>;

    /// Find a post with its tags
    async fn find_post(&self, id: RecordId) -> RepoResult<Option<BlogPost>>;

    /// Create a post (without tags)
    async fn create_post(&self, post: &NewBlogPost) -> RepoResult<BlogPost>;

    /// Update title and/or content
    async fn update_post(&self, id: RecordId, update: &BlogPostUpdate) -> RepoResult<BlogPost>;

    /// Delete a post
    async fn delete_post(&self, id: RecordId) -> RepoResult<()>;

    /// List all tags ordered by name
    async fn list_tags(&self) -> RepoResult<Vec<Tag>>;

    /// Tags whose names are in `names`
    async fn find_tags_by_names(&self, names: &[String]) -> RepoResult<Vec<Tag>>;

    /// Create tags and return the stored rows
    async fn create_tags(&self, names: &[String]) -> RepoResult<Vec<Tag>>;

    /// Ids of posts linked to any of `tag_ids`
    async fn post_ids_with_tags(&self, tag_ids: &[RecordId]) -> RepoResult<Vec<RecordId>>;

    /// Link a post to tags
    async fn link_tags(&self, post_id: RecordId, tag_ids: &[RecordId]) -> RepoResult<()>;

    /// Remove every tag link of a post
    async fn unlink_all_tags(&self, post_id: RecordId) -> RepoResult<()>;
}

// ============================================================================
// Journal Repository
// ============================================================================

#[async_trait]
pub trait JournalRepository: Send + Sync {
    /// List entries newest first with author usernames
    async fn list(&self) -> RepoResult<Vec<JournalEntry>>;

    /// Find an entry by ID
    async fn find(&self, id: RecordId) -> RepoResult<Option<JournalEntry>>;

    /// Create an entry
    async fn create(&self, draft: &JournalDraft) -> RepoResult<JournalEntry>;

    /// Update an entry
    async fn update(&self, id: RecordId, draft: &JournalDraft) -> RepoResult<JournalEntry>;

    /// Delete an entry
    async fn delete(&self, id: RecordId) -> RepoResult<()>;
}

// ============================================================================
// Comment Repository
// ============================================================================

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// List comments under a parent oldest first
    async fn list_by_parent(&self, parent: CommentParent) -> RepoResult<Vec<Comment>>;

    /// Create a comment
    async fn create(&self, comment: &NewComment) -> RepoResult<Comment>;
}

// ============================================================================
// Note Repository
// ============================================================================

#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// List notes newest first
    async fn list(&self) -> RepoResult<Vec<Note>>;

    /// Create a note
    async fn create(&self, note: &NewNote) -> RepoResult<Note>;
}
