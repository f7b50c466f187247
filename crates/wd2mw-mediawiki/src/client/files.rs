//! File upload operations for the MediaWiki API.

use rand::RngExt;
use tracing::info;

use super::MediaWikiClient;
use crate::error::MediaWikiError;
use crate::types::{UploadOutcome, UploadResponse};

impl MediaWikiClient {
    /// Upload a file under `filename`, replacing any existing version.
    ///
    /// An upload identical to the current version is reported as
    /// [`UploadOutcome::Unchanged`].
    ///
    /// # Errors
    ///
    /// Returns [`MediaWikiError::Api`] for any other API error, or a
    /// transport error.
    pub fn upload_file(&self, filename: &str, data: &[u8]) -> Result<UploadOutcome, MediaWikiError> {
        let token = self.csrf_token()?;

        info!(file = %filename, bytes = data.len(), "Uploading file");

        let boundary = format!("----Wd2mwFormBoundary{:016x}", rand::rng().random::<u64>());
        let fields = [
            ("action", "upload"),
            ("filename", filename),
            ("ignorewarnings", "1"),
            ("format", "json"),
            ("formatversion", "2"),
            ("token", token.as_str()),
        ];
        let body = multipart_body(&boundary, &fields, filename, data);

        let response: UploadResponse = self.post_multipart(&boundary, &body)?;
        response.into_outcome()
    }
}

/// Build a `multipart/form-data` body: text `fields` then one `file` part.
fn multipart_body(
    boundary: &str,
    fields: &[(&str, &str)],
    filename: &str,
    data: &[u8],
) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + 512);

    for (name, value) in fields {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    let quoted = filename
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A");
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{quoted}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}
