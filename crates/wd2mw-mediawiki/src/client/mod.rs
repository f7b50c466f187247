//! MediaWiki action API client.
//!
//! Provides a sync HTTP client for `api.php`. Authentication uses a bot
//! password: the session cookie set by `action=login` is kept by the agent's
//! cookie store and sent with every later request.

mod auth;
mod files;
mod pages;

use std::sync::OnceLock;
use std::time::Duration;

use serde::de::DeserializeOwned;
use ureq::Agent;
use ureq::tls::TlsConfig;

use crate::error::MediaWikiError;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Parameters sent with every request.
const FORMAT_PARAMS: [(&str, &str); 2] = [("format", "json"), ("formatversion", "2")];

/// MediaWiki action API client.
pub struct MediaWikiClient {
    agent: Agent,
    endpoint: String,
    csrf_token: OnceLock<String>,
}

impl MediaWikiClient {
    /// Create a client for the `api.php` URL `endpoint`.
    ///
    /// With `verify_tls` false, server certificates are not checked.
    #[must_use]
    pub fn new(endpoint: &str, verify_tls: bool) -> Self {
        let mut builder =
            Agent::config_builder().timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)));
        if !verify_tls {
            builder = builder.tls_config(TlsConfig::builder().disable_verification(true).build());
        }
        let agent = builder.http_status_as_error(false).build().into();

        Self {
            agent,
            endpoint: endpoint.to_owned(),
            csrf_token: OnceLock::new(),
        }
    }

    /// API endpoint this client talks to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// GET with query parameters.
    fn get<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T, MediaWikiError> {
        let response = self
            .agent
            .get(&self.endpoint)
            .query_pairs(params.iter().chain(FORMAT_PARAMS.iter()).copied())
            .header("Accept", "application/json")
            .call()?;
        read_response(response)
    }

    /// POST an urlencoded form.
    fn post_form<T: DeserializeOwned>(
        &self,
        params: &[(&str, &str)],
    ) -> Result<T, MediaWikiError> {
        let response = self
            .agent
            .post(&self.endpoint)
            .header("Accept", "application/json")
            .send_form(params.iter().chain(FORMAT_PARAMS.iter()).copied())?;
        read_response(response)
    }

    /// POST a prebuilt `multipart/form-data` body.
    fn post_multipart<T: DeserializeOwned>(
        &self,
        boundary: &str,
        body: &[u8],
    ) -> Result<T, MediaWikiError> {
        let response = self
            .agent
            .post(&self.endpoint)
            .header(
                "Content-Type",
                &format!("multipart/form-data; boundary={boundary}"),
            )
            .header("Accept", "application/json")
            .send(body)?;
        read_response(response)
    }
}

/// Map an error status to [`MediaWikiError::HttpResponse`], otherwise parse JSON.
fn read_response<T: DeserializeOwned>(
    response: ureq::http::Response<ureq::Body>,
) -> Result<T, MediaWikiError> {
    let status = response.status().as_u16();
    let mut body_reader = response.into_body();

    if status >= 400 {
        let error_body = body_reader
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        return Err(MediaWikiError::HttpResponse {
            status,
            body: error_body,
        });
    }

    Ok(body_reader.read_json()?)
}
