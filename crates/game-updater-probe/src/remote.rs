//! Remote up-to-date check.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use game_updater_core::{Error, Result, UpdateCheck};

/// Envelope returned by the `UpToDateCheck` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpToDateCheckResponse {
    /// Payload; absent on malformed replies
    #[serde(default)]
    pub response: Option<UpToDateCheck>,
}

/// Body of an up-to-date check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpToDateCheck {
    /// The service understood the request
    pub success: bool,
    /// The queried version is current
    pub up_to_date: bool,
    /// The queried version may still list on the master server
    pub version_is_listable: bool,
    /// Version servers must run
    pub required_version: i64,
    /// Human readable note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl UpToDateCheckResponse {
    /// Interpret the reply.
    ///
    /// An update is available when the check succeeded and the version is not
    /// up to date. A reply without a `response` object is treated as a failed
    /// check.
    pub fn into_update_check(self) -> Result<UpdateCheck> {
        let body = self.response.ok_or_else(|| {
            Error::RemoteUnavailable("reply has no response object".to_string())
        })?;

        debug!(
            "Up-to-date check: success={}, up_to_date={}, listable={}, required={}, message={:?}",
            body.success, body.up_to_date, body.version_is_listable, body.required_version, body.message
        );

        Ok(UpdateCheck {
            available: body.success && !body.up_to_date,
            required_version: body.required_version,
        })
    }
}

/// HTTP client for the version-check service.
#[derive(Debug, Clone)]
pub struct RemoteVersionClient {
    client: reqwest::Client,
    url_template: String,
}

impl RemoteVersionClient {
    /// Create a client for a URL template containing `{version}`.
    pub fn new(url_template: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::RemoteUnavailable(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url_template: url_template.into(),
        })
    }

    /// Concrete URL for an installed version.
    pub fn url_for(&self, version: &str) -> String {
        self.url_template.replace("{version}", version)
    }

    /// Ask the service whether `version` is current.
    ///
    /// Transport failures, non-success statuses and undecodable bodies all
    /// surface as [`Error::RemoteUnavailable`].
    pub async fn check(&self, version: &str) -> Result<UpdateCheck> {
        let url = self.url_for(version);
        debug!("Requesting {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::RemoteUnavailable(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::RemoteUnavailable(format!(
                "HTTP request failed with status code: {status}"
            )));
        }

        let reply: UpToDateCheckResponse = response
            .json()
            .await
            .map_err(|e| Error::RemoteUnavailable(format!("malformed reply: {e}")))?;

        reply.into_update_check()
    }
}
