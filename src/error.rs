//! Error taxonomy shared by the resolver, the store and the config loader.
//!
//! HTTP-side variants ([`Error::Transport`], [`Error::FailedRequest`],
//! [`Error::MalformedResponse`]) never leave [`MarineResolver`](crate::api::MarineResolver)
//! or the default-location lookup; they are logged there and collapse to an
//! empty result or the configured fallback. The rest surface to callers.

use reqwest::StatusCode;
use snafu::Snafu;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("HTTP request failed to send: {source}"))]
    Transport { source: reqwest::Error },

    #[snafu(display("HTTP request failed, status: '{status}', url: '{url}', body: '{body}'"))]
    FailedRequest {
        status: StatusCode,
        url: String,
        body: String,
    },

    #[snafu(display("Malformed response: {reason}"))]
    MalformedResponse { reason: String },

    #[snafu(display("Reference catalog is empty, no ocean point to fall back to"))]
    NoReferencePoints,

    #[snafu(display("Database error: {source}"))]
    Database { source: rusqlite::Error },

    #[snafu(display("{entity} {id} not found"))]
    NotFound { entity: &'static str, id: i64 },

    #[snafu(display("Email '{email}' is already registered"))]
    EmailTaken { email: String },

    #[snafu(display("Invalid input: {reason}"))]
    InvalidInput { reason: String },

    #[snafu(display("Failed to parse config at '{}': {source}", path.display()))]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl From<rusqlite::Error> for Error {
    fn from(source: rusqlite::Error) -> Self {
        Error::Database { source }
    }
}
