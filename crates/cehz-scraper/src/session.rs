//! Session-authenticated access to the portal.
//!
//! The portal requires a form login before the report page is readable; the
//! session lives in cookies, so the client keeps a cookie store and performs
//! login and fetch strictly in that order.

use std::time::Duration;

use chrono::Utc;
use reqwest::{header, Client, StatusCode};

use cehz_core::{PortalConfig, Record, RUN_TIMESTAMP_FORMAT};

use crate::encoding;
use crate::error::ScrapeError;
use crate::extract;

/// HTTP client that logs into the portal and fetches the summary report
/// within one authenticated session.
pub struct SessionClient {
    client: Client,
    portal: PortalConfig,
}

impl SessionClient {
    /// Creates a client with a cookie store, configured timeouts, and the
    /// portal's browser `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(portal: PortalConfig, timeout_secs: u64) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&portal.user_agent)
            .build()?;
        Ok(Self { client, portal })
    }

    /// Runs the full pipeline once: login, fetch, normalize, extract.
    /// The run timestamp is captured here so every record of the run
    /// carries the identical value.
    ///
    /// # Errors
    ///
    /// Propagates any fatal pipeline error; see [`Self::fetch_summary_at`].
    pub async fn fetch_summary(&self) -> Result<Vec<Record>, ScrapeError> {
        let timestamp = Utc::now().format(RUN_TIMESTAMP_FORMAT).to_string();
        self.fetch_summary_at(&timestamp).await
    }

    /// Like [`Self::fetch_summary`] but with an explicit run timestamp.
    ///
    /// # Errors
    ///
    /// - [`ScrapeError::LoginFailed`]: non-200 login status; the report is
    ///   not fetched.
    /// - [`ScrapeError::Http`]: transport failure at either step.
    /// - [`ScrapeError::UnexpectedStatus`]: non-200 report status.
    /// - [`ScrapeError::Encoding`]: undecodable report body.
    /// - [`ScrapeError::Selector`]: misconfigured extraction selector.
    pub async fn fetch_summary_at(&self, timestamp: &str) -> Result<Vec<Record>, ScrapeError> {
        self.login().await?;
        let (body, content_type) = self.fetch_report().await?;
        let text = encoding::normalize(&body, content_type.as_deref())?;
        let records = extract::extract_records(&text, timestamp, &self.portal)?;
        tracing::info!(records = records.len(), "summary extraction complete");
        Ok(records)
    }

    /// POST the login form. Any non-200 response is fatal; stale
    /// anti-automation tokens surface here as a silent non-200, which is
    /// indistinguishable from bad credentials.
    async fn login(&self) -> Result<(), ScrapeError> {
        let mut request = self
            .client
            .post(&self.portal.login_url)
            .form(&self.portal.login_form())
            .build()?;
        // `.form()` already sets a Content-Type; insert (not append) so the
        // request carries exactly one charset-qualified value.
        request.headers_mut().insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/x-www-form-urlencoded; charset=utf-8"),
        );
        let response = self.client.execute(request).await?;

        let status = response.status();
        tracing::info!(status = %status, "portal login response");
        if status != StatusCode::OK {
            return Err(ScrapeError::LoginFailed {
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    /// GET the report page with the authenticated session. Returns the raw
    /// body bytes and the `Content-Type` header for charset resolution.
    async fn fetch_report(&self) -> Result<(Vec<u8>, Option<String>), ScrapeError> {
        let response = self.client.get(&self.portal.report_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.portal.report_url.clone(),
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let body = response.bytes().await?.to_vec();
        tracing::debug!(bytes = body.len(), "fetched report page");
        Ok((body, content_type))
    }
}
