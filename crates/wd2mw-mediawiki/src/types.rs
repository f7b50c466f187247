//! MediaWiki action API response types.
//!
//! All requests use `format=json&formatversion=2`. Only the fields that are
//! actually used are declared; serde ignores the rest.

use serde::Deserialize;

use crate::error::MediaWikiError;

/// Error code returned when an identical file is uploaded again.
const UPLOAD_NO_CHANGE: &str = "fileexists-no-change";

/// `error` object of an API response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiError {
    pub code: String,
    #[serde(default)]
    pub info: String,
}

impl From<ApiError> for MediaWikiError {
    fn from(e: ApiError) -> Self {
        Self::Api {
            code: e.code,
            info: e.info,
        }
    }
}

/// `action=query&meta=tokens` response.
#[derive(Debug, Deserialize)]
pub(crate) struct TokensResponse {
    pub query: Option<TokensQuery>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokensQuery {
    pub tokens: Tokens,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Tokens {
    pub logintoken: Option<String>,
    pub csrftoken: Option<String>,
}

/// Token types requested from `meta=tokens`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Login,
    Csrf,
}

impl TokenKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Csrf => "csrf",
        }
    }
}

impl TokensResponse {
    /// Extract the requested token.
    pub(crate) fn into_token(self, kind: TokenKind) -> Result<String, MediaWikiError> {
        if let Some(error) = self.error {
            return Err(error.into());
        }
        let tokens = self.query.map(|q| q.tokens).unwrap_or_default();
        let token = match kind {
            TokenKind::Login => tokens.logintoken,
            TokenKind::Csrf => tokens.csrftoken,
        };
        token.ok_or(MediaWikiError::MissingToken(kind.as_str()))
    }
}

/// `action=login` response.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub login: Option<LoginResult>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResult {
    pub result: String,
    #[serde(default)]
    pub reason: Option<String>,
}

impl LoginResponse {
    /// Succeed only on `login.result == "Success"`.
    pub(crate) fn into_result(self) -> Result<(), MediaWikiError> {
        if let Some(error) = self.error {
            return Err(error.into());
        }
        let login = self.login.ok_or_else(|| MediaWikiError::UnexpectedResponse {
            action: "login",
            detail: "missing login object".to_owned(),
        })?;
        if login.result == "Success" {
            return Ok(());
        }
        Err(MediaWikiError::LoginFailed {
            result: login.result,
            reason: login.reason.unwrap_or_default(),
        })
    }
}

/// What an edit did to the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    /// The page did not exist and was created.
    Created,
    /// The page text changed.
    Updated,
    /// The page already had this text.
    Unchanged,
}

/// `action=edit` response.
#[derive(Debug, Deserialize)]
pub(crate) struct EditResponse {
    pub edit: Option<EditResult>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EditResult {
    pub result: String,
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub nochange: bool,
}

impl EditResponse {
    /// Any `error` object is a failure, as is a non-`Success` result.
    pub(crate) fn into_outcome(self) -> Result<EditOutcome, MediaWikiError> {
        if let Some(error) = self.error {
            return Err(error.into());
        }
        let edit = self.edit.ok_or_else(|| MediaWikiError::UnexpectedResponse {
            action: "edit",
            detail: "missing edit object".to_owned(),
        })?;
        if edit.result != "Success" {
            return Err(MediaWikiError::UnexpectedResponse {
                action: "edit",
                detail: format!("result {}", edit.result),
            });
        }
        Ok(if edit.new {
            EditOutcome::Created
        } else if edit.nochange {
            EditOutcome::Unchanged
        } else {
            EditOutcome::Updated
        })
    }
}

/// What an upload did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The file was stored.
    Uploaded,
    /// The wiki already had an identical file.
    Unchanged,
}

/// `action=upload` response.
#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    pub upload: Option<UploadResult>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadResult {
    pub result: String,
    #[serde(default)]
    pub warnings: Option<serde_json::Value>,
}

impl UploadResponse {
    /// `fileexists-no-change` counts as success.
    pub(crate) fn into_outcome(self) -> Result<UploadOutcome, MediaWikiError> {
        if let Some(error) = self.error {
            if error.code == UPLOAD_NO_CHANGE {
                return Ok(UploadOutcome::Unchanged);
            }
            return Err(error.into());
        }
        let upload = self.upload.ok_or_else(|| MediaWikiError::UnexpectedResponse {
            action: "upload",
            detail: "missing upload object".to_owned(),
        })?;
        match upload.result.as_str() {
            "Success" => Ok(UploadOutcome::Uploaded),
            other => Err(MediaWikiError::UnexpectedResponse {
                action: "upload",
                detail: match upload.warnings {
                    Some(warnings) => format!("result {other}, warnings {warnings}"),
                    None => format!("result {other}"),
                },
            }),
        }
    }
}
