//! In-memory backend for service tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use tokio::sync::mpsc;

use alpaca_core::{
    AuthGateway, BlogPost, BlogPostUpdate, BlogRepository, Channel, ChannelRepository, Comment,
    CommentParent, CommentRepository, DomainError, FileStorage, JournalDraft, JournalEntry,
    JournalRepository, Message, MessageFeed, MessagePatch, MessageRepository, MessageStream,
    NewBlogPost, NewChannel, NewComment, NewMessage, NewNote, Note, NoteRepository, Profile,
    RecordId, RepoResult, Session, StreamHandle, Tag,
};

use super::context::{ServiceContext, ServiceContextBuilder};

pub(crate) fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

pub(crate) fn message(n: u128, channel_id: RecordId, secs: i64) -> Message {
    Message::new(
        RecordId::from_u128(n),
        channel_id,
        RecordId::from_u128(200),
        format!("message {n}"),
        at(secs),
    )
}

pub(crate) fn session_for(user_id: RecordId) -> Session {
    Session {
        access_token: "token".to_string(),
        refresh_token: Some("refresh".to_string()),
        user_id,
        email: Some("trader@example.com".to_string()),
        expires_at: None,
    }
}

fn unavailable() -> DomainError {
    DomainError::transport(503, "backend unavailable")
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    messages: Mutex<Vec<Message>>,
    channels: Mutex<Vec<Channel>>,
    posts: Mutex<Vec<BlogPost>>,
    tags: Mutex<Vec<Tag>>,
    post_tags: Mutex<Vec<(RecordId, RecordId)>>,
    journals: Mutex<Vec<JournalEntry>>,
    comments: Mutex<Vec<Comment>>,
    notes: Mutex<Vec<Note>>,
    files: Mutex<HashMap<String, (Vec<u8>, String)>>,
    session: Mutex<Option<Session>>,
    calls: Mutex<Vec<&'static str>>,
    streams: Mutex<HashMap<u64, (RecordId, mpsc::Sender<Message>)>>,
    closed: Mutex<Vec<StreamHandle>>,
    next_stream: AtomicU64,
    next_id: AtomicU64,
    fail_fetch: AtomicBool,
    fail_open: AtomicBool,
    fail_link: AtomicBool,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicU64::new(1000),
            ..Self::default()
        })
    }

    pub fn context(self: &Arc<Self>) -> ServiceContext {
        ServiceContextBuilder::new()
            .channel_repo(self.clone())
            .message_repo(self.clone())
            .blog_repo(self.clone())
            .journal_repo(self.clone())
            .comment_repo(self.clone())
            .note_repo(self.clone())
            .feed(self.clone())
            .storage(self.clone())
            .auth(self.clone())
            .build()
            .unwrap()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().push(call);
    }

    fn fresh_id(&self) -> RecordId {
        RecordId::from_u128(u128::from(self.next_id.fetch_add(1, Ordering::Relaxed)))
    }

    pub fn calls(&self, call: &str) -> usize {
        self.calls.lock().iter().filter(|c| **c == call).count()
    }

    pub fn sign_in_as(&self, user_id: RecordId) {
        *self.session.lock() = Some(session_for(user_id));
    }

    pub fn seed_messages(&self, messages: Vec<Message>) {
        self.messages.lock().extend(messages);
    }

    pub fn seed_channel(&self, channel: Channel) {
        self.channels.lock().push(channel);
    }

    pub fn seed_note(&self, note: Note) {
        self.notes.lock().push(note);
    }

    pub fn seed_file(&self, path: &str, bytes: &[u8]) {
        self.files
            .lock()
            .insert(path.to_string(), (bytes.to_vec(), "application/octet-stream".to_string()));
    }

    pub fn file(&self, path: &str) -> Option<(Vec<u8>, String)> {
        self.files.lock().get(path).cloned()
    }

    pub fn file_paths(&self) -> Vec<String> {
        self.files.lock().keys().cloned().collect()
    }

    pub fn notes(&self) -> Vec<Note> {
        self.notes.lock().clone()
    }

    pub fn tags(&self) -> Vec<Tag> {
        self.tags.lock().clone()
    }

    pub fn linked_tags(&self, post_id: RecordId) -> Vec<RecordId> {
        self.post_tags
            .lock()
            .iter()
            .filter(|(post, _)| *post == post_id)
            .map(|(_, tag)| *tag)
            .collect()
    }

    pub fn fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn fail_open(&self, fail: bool) {
        self.fail_open.store(fail, Ordering::SeqCst);
    }

    pub fn fail_link(&self, fail: bool) {
        self.fail_link.store(fail, Ordering::SeqCst);
    }

    /// Deliver an insert to every stream open on the message's channel
    pub async fn push(&self, message: Message) {
        let senders: Vec<_> = self
            .streams
            .lock()
            .values()
            .filter(|(channel, _)| *channel == message.channel_id)
            .map(|(_, tx)| tx.clone())
            .collect();
        for tx in senders {
            let _ = tx.send(message.clone()).await;
        }
    }

    /// End every open stream from the server side
    pub fn end_streams(&self) {
        self.streams.lock().clear();
    }

    pub fn open_streams(&self) -> usize {
        self.streams.lock().len()
    }

    pub fn closed_streams(&self) -> Vec<StreamHandle> {
        self.closed.lock().clone()
    }

    fn with_tags(&self, mut post: BlogPost) -> BlogPost {
        let linked = self.linked_tags(post.id);
        post.tags = self
            .tags
            .lock()
            .iter()
            .filter(|t| linked.contains(&t.id))
            .cloned()
            .collect();
        post
    }
}

#[async_trait]
impl ChannelRepository for FakeBackend {
    async fn list(&self) -> RepoResult<Vec<Channel>> {
        self.record("channels.list");
        Ok(self.channels.lock().clone())
    }

    async fn create(&self, channel: &NewChannel) -> RepoResult<Channel> {
        self.record("channels.create");
        let created = Channel::new(self.fresh_id(), channel.name.clone());
        self.channels.lock().push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl MessageRepository for FakeBackend {
    async fn list_by_channel(&self, channel_id: RecordId) -> RepoResult<Vec<Message>> {
        self.record("messages.list");
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self
            .messages
            .lock()
            .iter()
            .filter(|m| m.channel_id == channel_id)
            .cloned()
            .collect())
    }

    async fn insert(&self, message: &NewMessage) -> RepoResult<()> {
        self.record("messages.insert");
        let created = Message::new(
            self.fresh_id(),
            message.channel_id,
            message.user_id,
            message.content.clone(),
            Utc::now(),
        );
        self.messages.lock().push(created);
        Ok(())
    }

    async fn update_content(&self, id: RecordId, patch: &MessagePatch) -> RepoResult<Message> {
        self.record("messages.update");
        let mut messages = self.messages.lock();
        let message = messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| DomainError::not_found("Message", id))?;
        message.content.clone_from(&patch.content);
        let mut updated = message.clone();
        updated.profile = None;
        Ok(updated)
    }

    async fn delete(&self, id: RecordId) -> RepoResult<()> {
        self.record("messages.delete");
        self.messages.lock().retain(|m| m.id != id);
        Ok(())
    }

    async fn list_authors(&self, channel_id: RecordId) -> RepoResult<Vec<Profile>> {
        self.record("messages.authors");
        Ok(self
            .messages
            .lock()
            .iter()
            .filter(|m| m.channel_id == channel_id)
            .filter_map(Profile::from_message)
            .collect())
    }
}

#[async_trait]
impl BlogRepository for FakeBackend {
    async fn list_posts(&self, ids: Option<&[RecordId]>) -> RepoResult<Vec<BlogPost>> {
        self.record("blog.list");
        let posts: Vec<BlogPost> = self
            .posts
            .lock()
            .iter()
            .filter(|p| ids.is_none_or(|ids| ids.contains(&p.id)))
            .cloned()
            .collect();
        Ok(posts.into_iter().map(|p| self.with_tags(p)).collect())
    }

    async fn find_post(&self, id: RecordId) -> RepoResult<Option<BlogPost>> {
        let post = self.posts.lock().iter().find(|p| p.id == id).cloned();
        Ok(post.map(|p| self.with_tags(p)))
    }

    async fn create_post(&self, post: &NewBlogPost) -> RepoResult<BlogPost> {
        self.record("blog.create");
        let created = BlogPost {
            id: self.fresh_id(),
            user_id: post.user_id,
            title: post.title.clone(),
            content: post.content.clone(),
            created_at: Utc::now(),
            updated_at: None,
            tags: Vec::new(),
        };
        self.posts.lock().push(created.clone());
        Ok(created)
    }

    async fn update_post(&self, id: RecordId, update: &BlogPostUpdate) -> RepoResult<BlogPost> {
        self.record("blog.update");
        let mut posts = self.posts.lock();
        let post = posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| DomainError::not_found("BlogPost", id))?;
        if let Some(title) = &update.title {
            post.title.clone_from(title);
        }
        if let Some(content) = &update.content {
            post.content.clone_from(content);
        }
        post.updated_at = Some(Utc::now());
        Ok(post.clone())
    }

    async fn delete_post(&self, id: RecordId) -> RepoResult<()> {
        self.record("blog.delete");
        self.posts.lock().retain(|p| p.id != id);
        self.post_tags.lock().retain(|(post, _)| *post != id);
        Ok(())
    }

    async fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        self.record("tags.list");
        Ok(self.tags())
    }

    async fn find_tags_by_names(&self, names: &[String]) -> RepoResult<Vec<Tag>> {
        Ok(self
            .tags
            .lock()
            .iter()
            .filter(|t| names.contains(&t.name))
            .cloned()
            .collect())
    }

    async fn create_tags(&self, names: &[String]) -> RepoResult<Vec<Tag>> {
        self.record("tags.create");
        let created: Vec<Tag> = names
            .iter()
            .map(|name| Tag {
                id: self.fresh_id(),
                name: name.clone(),
            })
            .collect();
        self.tags.lock().extend(created.iter().cloned());
        Ok(created)
    }

    async fn post_ids_with_tags(&self, tag_ids: &[RecordId]) -> RepoResult<Vec<RecordId>> {
        let mut ids: Vec<RecordId> = self
            .post_tags
            .lock()
            .iter()
            .filter(|(_, tag)| tag_ids.contains(tag))
            .map(|(post, _)| *post)
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    async fn link_tags(&self, post_id: RecordId, tag_ids: &[RecordId]) -> RepoResult<()> {
        self.record("tags.link");
        if self.fail_link.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.post_tags
            .lock()
            .extend(tag_ids.iter().map(|tag| (post_id, *tag)));
        Ok(())
    }

    async fn unlink_all_tags(&self, post_id: RecordId) -> RepoResult<()> {
        self.record("tags.unlink");
        self.post_tags.lock().retain(|(post, _)| *post != post_id);
        Ok(())
    }
}

#[async_trait]
impl JournalRepository for FakeBackend {
    async fn list(&self) -> RepoResult<Vec<JournalEntry>> {
        Ok(self.journals.lock().clone())
    }

    async fn find(&self, id: RecordId) -> RepoResult<Option<JournalEntry>> {
        Ok(self.journals.lock().iter().find(|j| j.id == id).cloned())
    }

    async fn create(&self, draft: &JournalDraft) -> RepoResult<JournalEntry> {
        self.record("journals.create");
        let entry = JournalEntry {
            id: self.fresh_id(),
            user_id: draft.user_id,
            title: draft.title.clone(),
            content: Some(draft.content.clone()),
            created_at: Utc::now(),
            updated_at: None,
            author: None,
        };
        self.journals.lock().push(entry.clone());
        Ok(entry)
    }

    async fn update(&self, id: RecordId, draft: &JournalDraft) -> RepoResult<JournalEntry> {
        self.record("journals.update");
        let mut journals = self.journals.lock();
        let entry = journals
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or_else(|| DomainError::not_found("JournalEntry", id))?;
        entry.title.clone_from(&draft.title);
        entry.content = Some(draft.content.clone());
        entry.updated_at = Some(Utc::now());
        Ok(entry.clone())
    }

    async fn delete(&self, id: RecordId) -> RepoResult<()> {
        self.record("journals.delete");
        self.journals.lock().retain(|j| j.id != id);
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for FakeBackend {
    async fn list_by_parent(&self, parent: CommentParent) -> RepoResult<Vec<Comment>> {
        self.record("comments.list");
        Ok(self
            .comments
            .lock()
            .iter()
            .filter(|c| c.parent() == Some(parent))
            .cloned()
            .collect())
    }

    async fn create(&self, comment: &NewComment) -> RepoResult<Comment> {
        self.record("comments.create");
        let created = Comment {
            id: self.fresh_id(),
            user_id: comment.user_id,
            content: comment.content.clone(),
            created_at: Utc::now(),
            journal_id: comment.journal_id,
            blog_post_id: comment.blog_post_id,
            parent_comment_id: comment.parent_comment_id,
            author: None,
        };
        self.comments.lock().push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl NoteRepository for FakeBackend {
    async fn list(&self) -> RepoResult<Vec<Note>> {
        self.record("notes.list");
        Ok(self.notes())
    }

    async fn create(&self, note: &NewNote) -> RepoResult<Note> {
        self.record("notes.create");
        let created = Note {
            id: self.fresh_id(),
            title: note.title.clone(),
            author: note.author.clone(),
            description: note.description.clone(),
            file_name: note.file_name.clone(),
            file_path: note.file_path.clone(),
            external_link: note.external_link.clone(),
            created_at: Utc::now(),
        };
        self.notes.lock().push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl FileStorage for FakeBackend {
    async fn upload(
        &self,
        _bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> RepoResult<String> {
        self.record("storage.upload");
        self.files
            .lock()
            .insert(path.to_string(), (bytes, content_type.to_string()));
        Ok(path.to_string())
    }

    async fn download(&self, bucket: &str, path: &str) -> RepoResult<Vec<u8>> {
        self.files
            .lock()
            .get(path)
            .map(|(bytes, _)| bytes.clone())
            .ok_or_else(|| DomainError::not_found("Object", format!("{bucket}/{path}")))
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("https://files.test/{bucket}/{path}")
    }
}

#[async_trait]
impl AuthGateway for FakeBackend {
    async fn sign_in(&self, _email: &str, _password: &str) -> RepoResult<Session> {
        self.record("auth.sign_in");
        let session = session_for(RecordId::from_u128(200));
        *self.session.lock() = Some(session.clone());
        Ok(session)
    }

    async fn sign_up(
        &self,
        _email: &str,
        _password: &str,
        _username: Option<&str>,
    ) -> RepoResult<Option<Session>> {
        self.record("auth.sign_up");
        Ok(None)
    }

    async fn refresh(&self) -> RepoResult<Session> {
        self.current_session().ok_or(DomainError::NotAuthenticated)
    }

    async fn sign_out(&self) -> RepoResult<()> {
        self.record("auth.sign_out");
        *self.session.lock() = None;
        Ok(())
    }

    fn current_session(&self) -> Option<Session> {
        self.session.lock().clone()
    }
}

#[async_trait]
impl MessageFeed for FakeBackend {
    async fn open(&self, channel_id: RecordId) -> RepoResult<MessageStream> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(DomainError::Realtime("join rejected".to_string()));
        }
        let id = self.next_stream.fetch_add(1, Ordering::Relaxed);
        let (tx, events) = mpsc::channel(16);
        self.streams.lock().insert(id, (channel_id, tx));
        Ok(MessageStream {
            handle: StreamHandle { id, channel_id },
            events,
        })
    }

    async fn close(&self, handle: &StreamHandle) -> RepoResult<()> {
        if self.streams.lock().remove(&handle.id).is_some() {
            self.closed.lock().push(*handle);
        }
        Ok(())
    }
}
