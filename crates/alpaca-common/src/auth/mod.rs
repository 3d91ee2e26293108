//! Access-token and session utilities

mod claims;
mod session_token;

pub use claims::{session_from_tokens, AccessClaims};
pub use session_token::SessionToken;
