//! Channel service
//!
//! Channel list, lookup and creation, plus the derived member list.

use alpaca_cache::QueryKey;
use alpaca_core::{Channel, NewChannel, Profile, RecordId};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{CreateChannelRequest, MemberListView};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Channel service
pub struct ChannelService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ChannelService<'a> {
    /// Create a new ChannelService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// All channels, cached under `Channels`
    #[instrument(skip(self))]
    pub async fn list(&self) -> ServiceResult<Vec<Channel>> {
        if let Some(channels) = self.ctx.fresh(&QueryKey::Channels) {
            return Ok(channels);
        }
        let channels = self.ctx.channel_repo().list().await?;
        self.ctx.cache().write(QueryKey::Channels, channels.clone());
        Ok(channels)
    }

    /// Get one channel
    #[instrument(skip(self))]
    pub async fn get(&self, channel_id: RecordId) -> ServiceResult<Channel> {
        let key = QueryKey::Channel(channel_id);
        if let Some(channel) = self.ctx.fresh(&key) {
            return Ok(channel);
        }
        let channel = self
            .list()
            .await?
            .into_iter()
            .find(|c| c.id == channel_id)
            .ok_or_else(|| ServiceError::not_found("Channel", channel_id))?;
        self.ctx.cache().write(key, channel.clone());
        Ok(channel)
    }

    /// Create a channel
    #[instrument(skip(self, request))]
    pub async fn create(&self, request: CreateChannelRequest) -> ServiceResult<Channel> {
        request.validate()?;
        self.ctx.require_user()?;

        let channel = self
            .ctx
            .channel_repo()
            .create(&NewChannel {
                name: request.name.trim().to_string(),
            })
            .await?;
        self.ctx.cache().invalidate(&QueryKey::Channels);

        info!(channel_id = %channel.id, name = %channel.name, "Channel created");
        Ok(channel)
    }

    /// Distinct authors of a channel in first-post order
    #[instrument(skip(self))]
    pub async fn members(&self, channel_id: RecordId) -> ServiceResult<Vec<Profile>> {
        let key = QueryKey::channel_members(channel_id);
        if let Some(members) = self.ctx.fresh(&key) {
            return Ok(members);
        }
        let authors = self.ctx.message_repo().list_authors(channel_id).await?;
        let members = derive_members(authors);
        self.ctx.cache().write(key, members.clone());
        Ok(members)
    }

    /// Member panel for a channel selection
    pub async fn members_view(
        &self,
        channel_id: Option<RecordId>,
        current_user: Option<RecordId>,
    ) -> MemberListView {
        let Some(channel_id) = channel_id else {
            return MemberListView::NoChannel;
        };
        match self.members(channel_id).await {
            Ok(members) => MemberListView::from_members(&members, current_user),
            Err(e) => MemberListView::Error(e.to_string()),
        }
    }
}

/// Drop repeat authors, keeping the first occurrence
pub fn derive_members(authors: Vec<Profile>) -> Vec<Profile> {
    let mut members: Vec<Profile> = Vec::with_capacity(authors.len());
    for author in authors {
        if !members.iter().any(|m| m.id == author.id) {
            members.push(author);
        }
    }
    members
}
