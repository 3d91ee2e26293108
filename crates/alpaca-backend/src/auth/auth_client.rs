//! Auth service client
//!
//! Exchanges credentials for a session and installs it into the shared
//! [`SessionToken`] read by every other client.

use async_trait::async_trait;
use tracing::instrument;

use alpaca_common::{session_from_tokens, AppError, BackendConfig, SessionToken};
use alpaca_core::entities::Session;
use alpaca_core::error::DomainError;
use alpaca_core::traits::{AuthGateway, RepoResult};

use crate::client::{check_response, map_http_error, read_json};
use crate::models::{PasswordCredentials, RefreshGrant, SignUpData, TokenResponse};

/// Client for the auth endpoint
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    session: SessionToken,
}

impl AuthClient {
    /// Create a new AuthClient
    pub fn new(http: reqwest::Client, backend: &BackendConfig, session: SessionToken) -> Self {
        Self {
            http,
            base_url: backend.auth_url(),
            anon_key: backend.anon_key.clone(),
            session,
        }
    }

    /// Session holder this client writes to
    pub fn session(&self) -> &SessionToken {
        &self.session
    }

    async fn token_grant<B: serde::Serialize + ?Sized>(
        &self,
        grant_type: &str,
        body: &B,
    ) -> RepoResult<TokenResponse> {
        let response = self
            .http
            .post(format!("{}/token", self.base_url))
            .query(&[("grant_type", grant_type)])
            .header("apikey", &self.anon_key)
            .json(body)
            .send()
            .await
            .map_err(map_http_error)?;
        read_json(response).await
    }

    /// Turn a token response into the installed session
    fn install(&self, tokens: TokenResponse) -> RepoResult<Option<Session>> {
        let Some(access_token) = tokens.access_token else {
            return Ok(None);
        };
        let session = session_from_tokens(&access_token, tokens.refresh_token)
            .map_err(|e: AppError| DomainError::Decode(format!("access token: {e}")))?;
        self.session.set(session.clone());
        tracing::info!(user_id = %session.user_id, "Session installed");
        Ok(Some(session))
    }
}

#[async_trait]
impl AuthGateway for AuthClient {
    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> RepoResult<Session> {
        let credentials = PasswordCredentials {
            email,
            password,
            data: None,
        };
        let tokens = self.token_grant("password", &credentials).await?;
        self.install(tokens)?
            .ok_or_else(|| DomainError::Decode("sign-in response without access token".to_string()))
    }

    #[instrument(skip(self, password))]
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: Option<&str>,
    ) -> RepoResult<Option<Session>> {
        let credentials = PasswordCredentials {
            email,
            password,
            data: username.map(|username| SignUpData { username }),
        };
        let response = self
            .http
            .post(format!("{}/signup", self.base_url))
            .header("apikey", &self.anon_key)
            .json(&credentials)
            .send()
            .await
            .map_err(map_http_error)?;
        let tokens: TokenResponse = read_json(response).await?;
        let session = self.install(tokens)?;
        if session.is_none() {
            tracing::info!("Sign-up pending email confirmation");
        }
        Ok(session)
    }

    #[instrument(skip(self))]
    async fn refresh(&self) -> RepoResult<Session> {
        let refresh_token = self
            .session
            .refresh_token()
            .ok_or(DomainError::NotAuthenticated)?;
        let tokens = self
            .token_grant(
                "refresh_token",
                &RefreshGrant {
                    refresh_token: &refresh_token,
                },
            )
            .await?;
        self.install(tokens)?
            .ok_or_else(|| DomainError::Decode("refresh response without access token".to_string()))
    }

    #[instrument(skip(self))]
    async fn sign_out(&self) -> RepoResult<()> {
        // Local session is dropped even if the server call fails
        let Some(session) = self.session.clear() else {
            return Ok(());
        };
        let response = self
            .http
            .post(format!("{}/logout", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(map_http_error)?;
        check_response(response).await?;
        tracing::info!(user_id = %session.user_id, "Signed out");
        Ok(())
    }

    fn current_session(&self) -> Option<Session> {
        self.session.get()
    }
}
