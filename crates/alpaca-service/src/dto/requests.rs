//! Form DTOs
//!
//! All forms implement `Validate`; services validate before touching the backend.

use serde::Deserialize;
use validator::{Validate, ValidationError};

use alpaca_core::{parse_tag_list, RecordId};

/// Reject empty and whitespace-only values
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

// ============================================================================
// Auth Forms
// ============================================================================

/// Sign-in form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(custom(function = "not_blank", message = "Please fill in all required fields"))]
    pub email: String,

    #[validate(length(min = 1, message = "Please fill in all required fields"))]
    pub password: String,
}

/// Sign-up form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(custom(function = "not_blank", message = "Please fill in all required fields"))]
    pub email: String,

    #[validate(length(min = 1, message = "Please fill in all required fields"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Please ensure your passwords match"))]
    pub confirm_password: String,

    #[serde(default)]
    pub username: Option<String>,
}

// ============================================================================
// Channel Forms
// ============================================================================

/// New channel form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateChannelRequest {
    #[validate(custom(function = "not_blank", message = "Channel name is required."))]
    pub name: String,
}

// ============================================================================
// Journal Forms
// ============================================================================

/// Journal entry form; `id` present means edit
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct JournalRequest {
    #[serde(default)]
    pub id: Option<RecordId>,

    #[validate(custom(function = "not_blank", message = "Title is required"))]
    pub title: String,

    #[validate(custom(function = "not_blank", message = "Content is required"))]
    pub content: String,
}

// ============================================================================
// Blog Forms
// ============================================================================

/// New post form; `tags` is the comma-separated tag field
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBlogPostRequest {
    #[validate(
        custom(function = "not_blank", message = "Title is required"),
        length(max = 255, message = "Title must be at most 255 characters")
    )]
    pub title: String,

    #[validate(custom(function = "not_blank", message = "Content is required"))]
    pub content: String,

    #[serde(default)]
    pub tags: String,
}

impl CreateBlogPostRequest {
    pub fn tag_names(&self) -> Vec<String> {
        parse_tag_list(&self.tags)
    }
}

/// Post edit; `None` fields are left unchanged
///
/// `tags: Some("")` removes every tag, `tags: None` keeps them.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateBlogPostRequest {
    #[validate(
        custom(function = "not_blank", message = "Title is required"),
        length(max = 255, message = "Title must be at most 255 characters")
    )]
    pub title: Option<String>,

    #[validate(custom(function = "not_blank", message = "Content is required"))]
    pub content: Option<String>,

    pub tags: Option<String>,
}

impl UpdateBlogPostRequest {
    pub fn tag_names(&self) -> Option<Vec<String>> {
        self.tags.as_deref().map(parse_tag_list)
    }
}

// ============================================================================
// Note Forms
// ============================================================================

/// Which source the note form submits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    #[default]
    File,
    Link,
}

/// A file picked in the note form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Note upload form
#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "validate_note_source"))]
pub struct UploadNoteRequest {
    #[validate(custom(function = "not_blank", message = "Please fill all required fields"))]
    pub title: String,

    #[validate(custom(function = "not_blank", message = "Please fill all required fields"))]
    pub author: String,

    #[validate(custom(function = "not_blank", message = "Please fill all required fields"))]
    pub description: String,

    pub mode: UploadMode,
    pub file: Option<NoteFile>,
    pub external_link: Option<String>,
}

impl UploadNoteRequest {
    /// Trimmed link, if one was entered
    pub fn link(&self) -> Option<&str> {
        self.external_link
            .as_deref()
            .map(str::trim)
            .filter(|link| !link.is_empty())
    }
}

fn validate_note_source(request: &UploadNoteRequest) -> Result<(), ValidationError> {
    match request.mode {
        UploadMode::File if request.file.is_none() && request.link().is_none() => Err(
            ValidationError::new("missing_file").with_message("Please select a file to upload".into()),
        ),
        UploadMode::Link if request.link().is_none() => Err(ValidationError::new("missing_link")
            .with_message("Please provide a link to your HTML page".into())),
        _ => Ok(()),
    }
}
