//! HTTP plumbing shared by repositories, storage and auth

pub mod error;
mod http;
mod query;
mod rest_client;

pub use error::{check_response, error_from_body, map_http_error, read_json, ErrorBody};
pub use http::build_http_client;
pub use query::{Order, Query};
pub(crate) use rest_client::first_row;
pub use rest_client::RestClient;
