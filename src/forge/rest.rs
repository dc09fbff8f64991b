//! forge::rest
//!
//! Minimal REST client shared by the adapters' REST tiers.
//!
//! # Design
//!
//! Only `GET` is needed: every lookup is one request with a bounded timeout.
//! There is no retry, pagination or rate-limit backoff. HTTP status codes
//! are mapped onto [`ForgeError`] so the tier chain can rank failures:
//!
//! | status | error |
//! |---|---|
//! | 401, 403 | `Unauthenticated` |
//! | 404 | `NotFound` |
//! | other non-2xx | `Api` |
//! | transport / timeout | `Unreachable` |

use std::time::Duration;

use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::traits::ForgeError;

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = concat!("forgekit/", env!("CARGO_PKG_VERSION"));

/// Credential attached to a REST request.
#[derive(Clone, PartialEq, Eq)]
pub enum RestAuth {
    /// Anonymous request.
    None,
    /// `Authorization: Bearer <token>`
    Bearer(String),
    /// `Authorization: token <token>` (Gitea, Forgejo)
    Token(String),
    /// A provider-specific header such as GitLab's `PRIVATE-TOKEN`.
    Header { name: &'static str, value: String },
    /// HTTP basic auth (Bitbucket app passwords, Azure DevOps PATs).
    Basic { user: String, password: String },
}

// Custom Debug to avoid exposing credentials
impl std::fmt::Debug for RestAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RestAuth::None => write!(f, "None"),
            RestAuth::Bearer(_) => write!(f, "Bearer(<redacted>)"),
            RestAuth::Token(_) => write!(f, "Token(<redacted>)"),
            RestAuth::Header { name, .. } => write!(f, "Header({}: <redacted>)", name),
            RestAuth::Basic { user, .. } => write!(f, "Basic({}:<redacted>)", user),
        }
    }
}

impl RestAuth {
    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            RestAuth::None => request,
            RestAuth::Bearer(token) => request.bearer_auth(token),
            RestAuth::Token(token) => match HeaderValue::from_str(&format!("token {}", token)) {
                Ok(value) => request.header(AUTHORIZATION, value),
                Err(_) => request,
            },
            RestAuth::Header { name, value } => request.header(*name, value.as_str()),
            RestAuth::Basic { user, password } => request.basic_auth(user, Some(password)),
        }
    }
}

/// HTTP client with per-request timeouts.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    timeout: Duration,
    probe_timeout: Duration,
}

impl RestClient {
    /// Create a client.
    ///
    /// * `timeout` - bound for PR/issue lookups
    /// * `probe_timeout` - bound for version-endpoint probes
    pub fn new(timeout: Duration, probe_timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT_VALUE)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            timeout,
            probe_timeout,
        }
    }

    /// `GET` a URL and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        auth: &RestAuth,
    ) -> Result<T, ForgeError> {
        debug!(url, ?auth, "GET");
        let request = auth.apply(
            self.client
                .get(url)
                .header(ACCEPT, "application/json")
                .timeout(self.timeout),
        );
        let response = request
            .send()
            .await
            .map_err(|e| ForgeError::Unreachable(e.to_string()))?;
        self.handle_response(response).await
    }

    /// `GET` a URL and report whether it answered with a 2xx status.
    ///
    /// Any transport error or timeout is `false`.
    pub async fn probe(&self, url: &str) -> bool {
        let result = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .timeout(self.probe_timeout)
            .send()
            .await;
        match result {
            Ok(response) => {
                debug!(url, status = %response.status(), "probe answered");
                response.status().is_success()
            }
            Err(err) => {
                debug!(url, error = %err, "probe failed");
                false
            }
        }
    }

    /// Map the response onto a decoded body or a [`ForgeError`].
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T, ForgeError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| ForgeError::Parse(e.to_string()));
        }

        let message = match response.json::<serde_json::Value>().await {
            Ok(body) => error_message(&body),
            Err(_) => None,
        }
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ForgeError::Unauthenticated(format!("{}: {}", status.as_u16(), message))
            }
            StatusCode::NOT_FOUND => ForgeError::NotFound(message),
            _ => ForgeError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }
}

/// Build an API URL from a base and path segments.
///
/// Segments are percent-encoded individually, so `group/sub/repo` passed as
/// one segment becomes `group%2Fsub%2Frepo` (GitLab project ids).
pub fn endpoint(base: &str, segments: &[&str]) -> Result<Url, ForgeError> {
    let mut url = Url::parse(base)
        .map_err(|e| ForgeError::Unavailable(format!("invalid base URL '{}': {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| ForgeError::Unavailable(format!("invalid base URL '{}'", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Pull an error message out of the error bodies the providers use:
/// `{"message": ...}` (GitHub, GitLab, Gitea, Azure) and
/// `{"error": {"message": ...}}` (Bitbucket).
fn error_message(body: &serde_json::Value) -> Option<String> {
    body.get("message")
        .or_else(|| body.get("error").and_then(|e| e.get("message")))
        .or_else(|| body.get("error"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}
