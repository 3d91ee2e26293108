//! Journal service

use alpaca_cache::QueryKey;
use alpaca_core::{JournalDraft, JournalEntry, RecordId};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::JournalRequest;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Journal service
pub struct JournalService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> JournalService<'a> {
    /// Create a new JournalService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> ServiceResult<Vec<JournalEntry>> {
        if let Some(entries) = self.ctx.fresh(&QueryKey::Journals) {
            return Ok(entries);
        }
        let entries = self.ctx.journal_repo().list().await?;
        self.ctx.cache().write(QueryKey::Journals, entries.clone());
        Ok(entries)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, journal_id: RecordId) -> ServiceResult<JournalEntry> {
        let key = QueryKey::Journal(journal_id);
        if let Some(entry) = self.ctx.fresh(&key) {
            return Ok(entry);
        }
        let entry = self
            .ctx
            .journal_repo()
            .find(journal_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("JournalEntry", journal_id))?;
        self.ctx.cache().write(key, entry.clone());
        Ok(entry)
    }

    /// Create the entry, or update it when the form carries an id
    #[instrument(skip(self, request), fields(journal_id = ?request.id))]
    pub async fn save(&self, request: JournalRequest) -> ServiceResult<JournalEntry> {
        request.validate()?;
        let user_id = self.ctx.require_user()?;

        let draft = JournalDraft {
            title: request.title.trim().to_string(),
            content: request.content,
            user_id,
        };
        let entry = match request.id {
            Some(id) => self.ctx.journal_repo().update(id, &draft).await?,
            None => self.ctx.journal_repo().create(&draft).await?,
        };

        self.ctx.cache().invalidate(&QueryKey::Journals);
        self.ctx.cache().write(QueryKey::Journal(entry.id), entry.clone());
        info!(journal_id = %entry.id, "Journal entry saved");
        Ok(entry)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, journal_id: RecordId) -> ServiceResult<()> {
        self.ctx.require_user()?;
        self.ctx.journal_repo().delete(journal_id).await?;

        self.ctx.cache().remove(&QueryKey::Journal(journal_id));
        self.ctx.cache().invalidate(&QueryKey::Journals);
        info!(journal_id = %journal_id, "Journal entry deleted");
        Ok(())
    }
}
