//! REST client for backend tables

use alpaca_common::{BackendConfig, SessionToken};
use alpaca_core::{DomainError, RepoResult};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::instrument;

use super::error::{check_response, map_http_error, read_json};
use super::query::Query;

const PREFER: &str = "Prefer";
const RETURN_REPRESENTATION: &str = "return=representation";
const RETURN_MINIMAL: &str = "return=minimal";

/// Authenticated client for the table endpoint
///
/// Every request carries the public API key; the bearer token is the
/// signed-in user's access token, or the API key when signed out.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    session: SessionToken,
}

impl RestClient {
    /// Create a new RestClient
    pub fn new(http: reqwest::Client, backend: &BackendConfig, session: SessionToken) -> Self {
        Self {
            http,
            base_url: backend.rest_url(),
            anon_key: backend.anon_key.clone(),
            session,
        }
    }

    /// Session holder used for the bearer token
    pub fn session(&self) -> &SessionToken {
        &self.session
    }

    fn request(&self, method: Method, table: &str, query: &Query) -> RequestBuilder {
        let token = self
            .session
            .access_token()
            .unwrap_or_else(|| self.anon_key.clone());
        self.http
            .request(method, format!("{}/{table}", self.base_url))
            .query(query.params())
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
    }

    async fn send(request: RequestBuilder) -> RepoResult<reqwest::Response> {
        request.send().await.map_err(map_http_error)
    }

    /// Fetch rows
    #[instrument(skip(self, query))]
    pub async fn select<T: DeserializeOwned>(&self, table: &str, query: &Query) -> RepoResult<Vec<T>> {
        let response = Self::send(self.request(Method::GET, table, query)).await?;
        read_json(response).await
    }

    /// Fetch the first matching row
    pub async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
    ) -> RepoResult<Option<T>> {
        let rows = self.select(table, &query.clone().limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    /// Insert rows without reading them back
    #[instrument(skip(self, rows))]
    pub async fn insert<B: Serialize + ?Sized>(&self, table: &str, rows: &B) -> RepoResult<()> {
        let request = self
            .request(Method::POST, table, &Query::new())
            .header(PREFER, RETURN_MINIMAL)
            .json(rows);
        check_response(Self::send(request).await?).await?;
        Ok(())
    }

    /// Insert rows and return them as stored, shaped by `query`'s select
    #[instrument(skip(self, rows, query))]
    pub async fn insert_returning<B, T>(&self, table: &str, rows: &B, query: &Query) -> RepoResult<Vec<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .request(Method::POST, table, query)
            .header(PREFER, RETURN_REPRESENTATION)
            .json(rows);
        read_json(Self::send(request).await?).await
    }

    /// Update the rows matching `query` and return them
    #[instrument(skip(self, query, patch))]
    pub async fn update_returning<B, T>(&self, table: &str, query: &Query, patch: &B) -> RepoResult<Vec<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .request(Method::PATCH, table, query)
            .header(PREFER, RETURN_REPRESENTATION)
            .json(patch);
        read_json(Self::send(request).await?).await
    }

    /// Delete the rows matching `query`
    #[instrument(skip(self, query))]
    pub async fn delete(&self, table: &str, query: &Query) -> RepoResult<()> {
        let request = self
            .request(Method::DELETE, table, query)
            .header(PREFER, RETURN_MINIMAL);
        check_response(Self::send(request).await?).await?;
        Ok(())
    }
}

/// First returned row, or a not-found error naming the resource
pub(crate) fn first_row<T>(rows: Vec<T>, resource: &'static str, id: impl ToString) -> RepoResult<T> {
    rows.into_iter()
        .next()
        .ok_or_else(|| DomainError::not_found(resource, id))
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url)
            .field("signed_in", &self.session.is_signed_in())
            .finish()
    }
}
