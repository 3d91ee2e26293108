//! View models
//!
//! Plain data the UI renders. Built from sync state and cached query results;
//! nothing here talks to the backend.

use chrono::{DateTime, Utc};
use serde::Serialize;

use alpaca_core::{Message, Profile, RecordId};

// ============================================================================
// Message List
// ============================================================================

/// One rendered message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageRow {
    pub id: RecordId,
    pub author_label: String,
    pub avatar_url: Option<String>,
    pub avatar_initial: char,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Written by the signed-in user; shows the edit and delete controls
    pub is_own: bool,
}

impl MessageRow {
    pub fn from_message(message: &Message, current_user: Option<RecordId>) -> Self {
        Self {
            id: message.id,
            author_label: message.author_label().to_string(),
            avatar_url: message.avatar_url().map(str::to_string),
            avatar_initial: message.avatar_initial(),
            content: message.content.clone(),
            created_at: message.created_at,
            is_own: current_user.is_some_and(|user| message.is_authored_by(user)),
        }
    }

    /// Edit and delete are offered on own messages only; the backend enforces it
    pub fn can_edit(&self) -> bool {
        self.is_own
    }

    pub fn can_delete(&self) -> bool {
        self.is_own
    }

    /// `HH:MM` timestamp label
    pub fn time_label(&self) -> String {
        self.created_at.format("%H:%M").to_string()
    }
}

/// What the message panel shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum MessageListView {
    /// No channel selected
    NoChannel,
    Loading,
    /// Bulk fetch failed; the user reselects to retry
    Error(String),
    /// Channel has no messages yet
    Empty,
    Messages(Vec<MessageRow>),
}

impl MessageListView {
    /// View of a fetched list
    pub fn from_messages(messages: &[Message], current_user: Option<RecordId>) -> Self {
        if messages.is_empty() {
            return Self::Empty;
        }
        Self::Messages(
            messages
                .iter()
                .map(|m| MessageRow::from_message(m, current_user))
                .collect(),
        )
    }

    /// Placeholder text for non-list states
    pub fn status_text(&self) -> Option<String> {
        match self {
            Self::NoChannel => Some("Select a channel to start chatting.".to_string()),
            Self::Loading => Some("Loading messages...".to_string()),
            Self::Error(message) => Some(format!("Error loading messages: {message}")),
            Self::Empty => Some("No messages yet.".to_string()),
            Self::Messages(_) => None,
        }
    }

    pub fn rows(&self) -> &[MessageRow] {
        match self {
            Self::Messages(rows) => rows,
            _ => &[],
        }
    }
}

// ============================================================================
// Member List
// ============================================================================

/// One rendered channel member
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberRow {
    pub id: RecordId,
    pub label: String,
    pub avatar_url: Option<String>,
    pub avatar_initial: char,
    pub is_current_user: bool,
}

impl MemberRow {
    pub fn from_profile(profile: &Profile, current_user: Option<RecordId>) -> Self {
        let initial = profile
            .username
            .as_deref()
            .map(str::trim)
            .and_then(|name| name.chars().next())
            .map_or('U', |c| c.to_uppercase().next().unwrap_or(c));
        Self {
            id: profile.id,
            label: profile.display_name().to_string(),
            avatar_url: profile.avatar_url.clone(),
            avatar_initial: initial,
            is_current_user: current_user == Some(profile.id),
        }
    }
}

/// What the member panel shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum MemberListView {
    NoChannel,
    Loading,
    Error(String),
    Empty,
    Members(Vec<MemberRow>),
}

impl MemberListView {
    pub fn from_members(members: &[Profile], current_user: Option<RecordId>) -> Self {
        if members.is_empty() {
            return Self::Empty;
        }
        Self::Members(
            members
                .iter()
                .map(|p| MemberRow::from_profile(p, current_user))
                .collect(),
        )
    }

    pub fn status_text(&self) -> Option<String> {
        match self {
            Self::NoChannel => Some("Select a channel to view members.".to_string()),
            Self::Loading => Some("Loading members...".to_string()),
            Self::Error(message) => Some(format!("Error loading members: {message}")),
            Self::Empty => Some("No members in this channel yet.".to_string()),
            Self::Members(_) => None,
        }
    }
}

// ============================================================================
// Message Editor
// ============================================================================

/// Outcome of saving the inline editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAction {
    /// Nothing to send (blank or unchanged draft)
    None,
    /// Send this content
    Save { id: RecordId, content: String },
}

/// Inline edit state of one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEditor {
    message_id: RecordId,
    original: String,
    draft: String,
    editing: bool,
}

impl MessageEditor {
    pub fn new(message: &Message) -> Self {
        Self {
            message_id: message.id,
            original: message.content.clone(),
            draft: message.content.clone(),
            editing: false,
        }
    }

    pub fn begin(&mut self) {
        self.editing = true;
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    /// Leave edit mode and restore the original content
    pub fn cancel(&mut self) {
        self.editing = false;
        self.draft.clone_from(&self.original);
    }

    /// Leave edit mode; returns what to send, if anything
    pub fn save(&mut self) -> EditAction {
        self.editing = false;
        match edited_content(&self.original, &self.draft) {
            Some(content) => EditAction::Save {
                id: self.message_id,
                content,
            },
            None => EditAction::None,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }
}

/// Trimmed draft when it is non-blank and differs from the current content
///
/// Edits that only add or remove surrounding whitespace are not sent, and
/// the saved content never carries leading or trailing whitespace.
pub fn edited_content(current: &str, draft: &str) -> Option<String> {
    let next = draft.trim();
    if next.is_empty() || next == current.trim() {
        None
    } else {
        Some(next.to_string())
    }
}
