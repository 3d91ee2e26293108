//! Auth service
//!
//! Validates the sign-in and sign-up forms before calling the auth gateway.

use alpaca_cache::{COMMENTS, JOURNAL, JOURNALS};
use alpaca_core::Session;
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{SignInRequest, SignUpRequest};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Result of a sign-up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// Signed in right away
    SignedIn(Session),
    /// The backend sent a confirmation email first
    ConfirmationPending,
}

/// Auth service
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, request))]
    pub async fn sign_in(&self, request: SignInRequest) -> ServiceResult<Session> {
        request.validate()?;

        let session = self
            .ctx
            .auth()
            .sign_in(request.email.trim(), &request.password)
            .await?;

        info!(user_id = %session.user_id, "User signed in");
        Ok(session)
    }

    #[instrument(skip(self, request))]
    pub async fn sign_up(&self, request: SignUpRequest) -> ServiceResult<SignUpOutcome> {
        request.validate()?;

        let username = request
            .username
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());
        let session = self
            .ctx
            .auth()
            .sign_up(request.email.trim(), &request.password, username)
            .await?;

        Ok(match session {
            Some(session) => {
                info!(user_id = %session.user_id, "User signed up");
                SignUpOutcome::SignedIn(session)
            }
            None => {
                info!("Sign-up awaiting email confirmation");
                SignUpOutcome::ConfirmationPending
            }
        })
    }

    /// Sign out and drop cached per-user data
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> ServiceResult<()> {
        self.ctx.auth().sign_out().await?;

        let cache = self.ctx.cache();
        for resource in [JOURNALS, JOURNAL, COMMENTS] {
            for key in cache.keys_for_resource(resource) {
                cache.remove(&key);
            }
        }
        info!("User signed out");
        Ok(())
    }
}
