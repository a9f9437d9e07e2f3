use thiserror::Error;

/// Failure taxonomy for trip API calls. `Display` of a variant is the one
/// user-visible message a workflow surfaces; `NotFound` is the single kind
/// callers branch on.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The requested trip does not exist (404 on trip lookup).
    #[error("Trip not found.")]
    NotFound,
    /// The request completed with a non-success status. The message carries
    /// the operation label, the numeric status and, for endpoints that opt
    /// in, the response body.
    #[error("{0}")]
    Status(String),
    /// The request never completed: connect failure, timeout, or an
    /// unreadable response body.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}
