//! Auth service payloads

use serde::{Deserialize, Serialize};

/// Credentials for the password grant and sign-up
#[derive(Debug, Serialize)]
pub struct PasswordCredentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<SignUpData<'a>>,
}

/// Profile metadata attached at sign-up
#[derive(Debug, Serialize)]
pub struct SignUpData<'a> {
    pub username: &'a str,
}

/// Body of the refresh-token grant
#[derive(Debug, Serialize)]
pub struct RefreshGrant<'a> {
    pub refresh_token: &'a str,
}

/// Token response; sign-up omits the tokens while email confirmation is pending
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}
