//! Error types for MediaWiki uploads.

use std::path::PathBuf;

/// Error from MediaWiki API operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum MediaWikiError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// The API answered with an `error` object.
    #[error("API error {code}: {info}")]
    Api {
        /// Machine-readable error code.
        code: String,
        /// Human-readable description.
        info: String,
    },

    /// A token request returned no token of the requested type.
    #[error("no {0} token in response")]
    MissingToken(&'static str),

    /// Login was refused.
    #[error("login failed ({result}): {reason}")]
    LoginFailed {
        /// Value of `login.result`.
        result: String,
        /// Reason given by the server.
        reason: String,
    },

    /// The response had neither a result nor an error.
    #[error("unexpected {action} response: {detail}")]
    UnexpectedResponse {
        /// API action that was called.
        action: &'static str,
        /// What was wrong with the response.
        detail: String,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error from a batch upload.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// A local file or directory could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Uploading a page failed.
    #[error("failed to upload page {title:?}: {source}")]
    Page {
        /// Page title.
        title: String,
        /// Underlying error.
        #[source]
        source: MediaWikiError,
    },
}
