//! Page operations for the MediaWiki API.

use tracing::info;

use super::MediaWikiClient;
use crate::error::MediaWikiError;
use crate::types::{EditOutcome, EditResponse};

impl MediaWikiClient {
    /// Create or replace a page.
    ///
    /// # Errors
    ///
    /// Returns [`MediaWikiError::Api`] if the reply carries an `error` object,
    /// or a transport error.
    pub fn edit_page(&self, title: &str, text: &str) -> Result<EditOutcome, MediaWikiError> {
        let token = self.csrf_token()?;

        info!(page = %title, bytes = text.len(), "Editing page");

        let response: EditResponse = self.post_form(&edit_params(title, text, &token))?;
        response.into_outcome()
    }
}

fn edit_params<'a>(title: &'a str, text: &'a str, token: &'a str) -> [(&'a str, &'a str); 5] {
    [
        ("action", "edit"),
        ("title", title),
        ("text", text),
        ("bot", "1"),
        // Token must be the last field.
        ("token", token),
    ]
}
