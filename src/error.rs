//! Schema fetch and configuration error types

use thiserror::Error;

/// Errors produced while fetching or assembling a schema snapshot.
///
/// An incompatible snapshot version is deliberately not represented here:
/// rejecting a stale snapshot is an expected steady-state condition and is
/// handled as a silent discard, never as an error.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// No Steam Web API key was configured.
    ///
    /// The overview and item endpoints require a key; construct the manager
    /// with an API key, or seed a snapshot and use it without refreshing.
    #[error("missing Steam Web API key")]
    MissingApiKey,

    /// The Steam Web API rejected the request, typically an invalid or
    /// revoked API key.
    #[error("Steam Web API rejected the request with HTTP {status}: check the API key")]
    Auth { status: u16 },

    /// The HTTP client could not be constructed.
    #[error("failed to build the HTTP client")]
    Client(#[source] reqwest::Error),

    /// The request could not be completed (DNS, connect, timeout, or a
    /// malformed response body).
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The upstream returned a non-success status that is not an
    /// authentication failure.
    #[error("unexpected HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// A SteamDatabase game-tracking file could not be parsed as Valve
    /// KeyValues text.
    #[error("failed to parse KeyValues data from {url}")]
    Vdf {
        url: String,
        #[source]
        source: keyvalues_parser::error::Error,
    },
}

pub type Result<T> = std::result::Result<T, SchemaError>;
