//! Message service
//!
//! Send, edit and delete. Sends are confirmed by the realtime stream; edits
//! and deletes patch every cached list holding the message.

use alpaca_cache::{QueryKey, MESSAGES};
use alpaca_core::{Message, MessagePatch, NewMessage, RecordId};
use tracing::{debug, info, instrument};

use crate::dto::edited_content;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Message service
pub struct MessageService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessageService<'a> {
    /// Create a new MessageService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Post a message as the signed-in user
    ///
    /// The message shows up once it arrives on the channel's stream. Without a
    /// live stream the channel's cached list is marked stale instead.
    #[instrument(skip(self, content))]
    pub async fn send(&self, channel_id: RecordId, content: &str) -> ServiceResult<()> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ServiceError::validation("Message cannot be empty"));
        }
        let user_id = self.ctx.require_user()?;

        self.ctx
            .message_repo()
            .insert(&NewMessage {
                channel_id,
                content: content.to_string(),
                user_id,
            })
            .await?;

        if !self.ctx.has_live_stream(channel_id) {
            self.ctx.cache().invalidate(&QueryKey::messages(channel_id));
        }
        info!(channel_id = %channel_id, "Message sent");
        Ok(())
    }

    /// Save an edited draft
    ///
    /// Returns `None` without calling the backend when the trimmed draft is
    /// empty or matches the current content.
    #[instrument(skip(self, message, draft), fields(message_id = %message.id))]
    pub async fn update(&self, message: &Message, draft: &str) -> ServiceResult<Option<Message>> {
        let Some(content) = edited_content(&message.content, draft) else {
            debug!("Edit unchanged, skipped");
            return Ok(None);
        };

        let mut updated = self
            .ctx
            .message_repo()
            .update_content(message.id, &MessagePatch { content })
            .await?;
        if updated.profile.is_none() {
            updated.profile.clone_from(&message.profile);
        }

        let changed = self
            .ctx
            .cache()
            .update_resource(MESSAGES, |list: &mut Vec<Message>| {
                let Some(cached) = list.iter_mut().find(|m| m.id == updated.id) else {
                    return false;
                };
                cached.content.clone_from(&updated.content);
                true
            });
        info!(patched = changed.len(), "Message updated");
        Ok(Some(updated))
    }

    /// Delete a message
    #[instrument(skip(self))]
    pub async fn delete(&self, message_id: RecordId) -> ServiceResult<()> {
        self.ctx.message_repo().delete(message_id).await?;

        let changed = self
            .ctx
            .cache()
            .update_resource(MESSAGES, |list: &mut Vec<Message>| {
                let before = list.len();
                list.retain(|m| m.id != message_id);
                list.len() != before
            });
        info!(patched = changed.len(), "Message deleted");
        Ok(())
    }
}
