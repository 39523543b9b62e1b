//! Client-side error types.

use shared::InvalidParams;
use thiserror::Error;

/// Failures surfaced by [`crate::network::Client`] operations.
///
/// A timeout is its own variant so callers can tell "the server is silent"
/// apart from local misuse or socket failures; timed-out requests never
/// return partial data.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The operation requires an open local endpoint.
    #[error("not connected to the server")]
    NotConnected,
    /// The operation requires a successfully authenticated session.
    #[error("not authenticated")]
    NotAuthenticated,
    /// The parameters were rejected locally, before any network I/O.
    #[error("invalid parameters: {0}")]
    InvalidParams(#[from] InvalidParams),
    /// The server host did not resolve to any address.
    #[error("cannot resolve server address '{0}'")]
    Resolve(String),
    /// The server did not reply within the request timeout.
    #[error("timeout: no reply from the server")]
    Timeout,
    /// Socket-level failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
