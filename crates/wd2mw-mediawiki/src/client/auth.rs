//! Token and login operations.

use tracing::info;

use super::MediaWikiClient;
use crate::error::MediaWikiError;
use crate::types::{LoginResponse, TokenKind, TokensResponse};

impl MediaWikiClient {
    fn fetch_token(&self, kind: TokenKind) -> Result<String, MediaWikiError> {
        let response: TokensResponse = self.get(&[
            ("action", "query"),
            ("meta", "tokens"),
            ("type", kind.as_str()),
        ])?;
        response.into_token(kind)
    }

    /// Log in with a bot password.
    ///
    /// # Errors
    ///
    /// Returns [`MediaWikiError::LoginFailed`] unless the server answers
    /// `Success`, or a transport error.
    pub fn login(&self, username: &str, password: &str) -> Result<(), MediaWikiError> {
        let token = self.fetch_token(TokenKind::Login)?;

        info!(endpoint = %self.endpoint, user = %username, "Logging in");

        let response: LoginResponse = self.post_form(&[
            ("action", "login"),
            ("lgname", username),
            ("lgpassword", password),
            ("lgtoken", &token),
        ])?;
        response.into_result()
    }

    /// CSRF token for write actions, fetched once per session.
    pub(crate) fn csrf_token(&self) -> Result<String, MediaWikiError> {
        if let Some(token) = self.csrf_token.get() {
            return Ok(token.clone());
        }
        let token = self.fetch_token(TokenKind::Csrf)?;
        let _ = self.csrf_token.set(token.clone());
        Ok(token)
    }
}
