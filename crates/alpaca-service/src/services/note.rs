//! Note service
//!
//! Notes are either a stored file or an external link. HTML uploads are
//! served from their public URL, which is kept as the note's link.

use alpaca_cache::QueryKey;
use alpaca_core::{is_html_upload, stored_file_name, NewNote, Note, RecordId, HTML_CONTENT_TYPE};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{NoteFile, UploadMode, UploadNoteRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Note service
pub struct NoteService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> NoteService<'a> {
    /// Create a new NoteService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> ServiceResult<Vec<Note>> {
        if let Some(notes) = self.ctx.fresh(&QueryKey::Notes) {
            return Ok(notes);
        }
        let notes = self.ctx.note_repo().list().await?;
        self.ctx.cache().write(QueryKey::Notes, notes.clone());
        Ok(notes)
    }

    /// Notes whose title, description or author contain `term` (any case)
    pub async fn search(&self, term: &str) -> ServiceResult<Vec<Note>> {
        let mut notes = self.list().await?;
        notes.retain(|note| note.matches(term));
        Ok(notes)
    }

    /// Store a note from the upload form
    #[instrument(skip(self, request), fields(title = %request.title, mode = ?request.mode))]
    pub async fn upload(&self, request: UploadNoteRequest) -> ServiceResult<Note> {
        request.validate()?;

        let link = request.link().map(str::to_string);
        let mut note = NewNote {
            title: request.title.trim().to_string(),
            author: request.author.trim().to_string(),
            description: request.description.trim().to_string(),
            file_name: None,
            file_path: None,
            external_link: link,
        };

        if let (UploadMode::File, Some(file)) = (request.mode, request.file) {
            let name = file.name.clone();
            let (path, public_link) = self.store_file(file).await?;
            note.file_name = Some(name);
            note.file_path = Some(path);
            note.external_link = public_link;
        }

        let created = self.ctx.note_repo().create(&note).await?;
        self.ctx.cache().invalidate(&QueryKey::Notes);

        info!(note_id = %created.id, link = created.is_link(), "Note uploaded");
        Ok(created)
    }

    /// Upload the file; HTML pages also get their public URL back
    async fn store_file(&self, file: NoteFile) -> ServiceResult<(String, Option<String>)> {
        let bucket = self.ctx.notes_bucket();
        let path = stored_file_name(RecordId::random(), &file.name);
        let html = is_html_upload(&file.name, file.content_type.as_deref());
        let content_type = if html {
            HTML_CONTENT_TYPE.to_string()
        } else {
            file.content_type
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
        };

        let stored = self
            .ctx
            .storage()
            .upload(bucket, &path, file.bytes, &content_type)
            .await?;
        let public_link = html.then(|| self.ctx.storage().public_url(bucket, &stored));
        Ok((stored, public_link))
    }

    /// Raw bytes of a note's stored file
    #[instrument(skip(self, note), fields(note_id = %note.id))]
    pub async fn download(&self, note: &Note) -> ServiceResult<Vec<u8>> {
        let path = note
            .file_path
            .as_deref()
            .ok_or_else(|| ServiceError::validation("This note has no stored file"))?;
        Ok(self
            .ctx
            .storage()
            .download(self.ctx.notes_bucket(), path)
            .await?)
    }

    /// Stored file read as HTML text
    pub async fn view_html(&self, note: &Note) -> ServiceResult<String> {
        let bytes = self.download(note).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
