//! HTTP client for the DAC import/export service

use super::classify::WireFailure;
use super::models::{parse_request_guid, parse_status_list, redact_payload, request_body};
use super::traits::{RequestSubmitter, StatusPoller, Submission};
use crate::config::ServiceConfig;
use crate::domain::{
    OperationHandle, OperationKind, OperationRequest, PollError, SqlPortError,
    StatusCredentials, StatusSnapshot, SubmissionError,
};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use std::time::Duration;
use url::Url;

/// Client for one regional import/export endpoint
///
/// Holds a single `reqwest::Client`, so connections are reused across the
/// submission and every status query of a run.
///
/// # Example
///
/// ```no_run
/// use sqlport::adapters::dac::{DacClient, RequestSubmitter, Submission};
/// use sqlport::config::load_config;
/// use sqlport::domain::OperationKind;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config("sqlport.toml")?;
/// let client = DacClient::new(&config.service)?;
/// let request = config.operation_request(OperationKind::Export, None);
///
/// if let Submission::Submitted(handle) = client.submit(&request, false).await? {
///     println!("Request id: {handle}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DacClient {
    client: Client,
    endpoint: Url,
    export_url: Url,
    import_url: Url,
    status_url: Url,
}

impl DacClient {
    /// Creates a client from the service configuration
    ///
    /// # Errors
    ///
    /// Returns [`SqlPortError::Configuration`] if the endpoint is not a usable
    /// base URL, or [`SqlPortError::Connection`] if the HTTP client cannot be
    /// built.
    pub fn new(config: &ServiceConfig) -> crate::domain::Result<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            SqlPortError::Configuration(format!(
                "Invalid service.endpoint '{}': {e}",
                config.endpoint
            ))
        })?;

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SqlPortError::Connection(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            export_url: endpoint_url(&endpoint, OperationKind::Export.endpoint())?,
            import_url: endpoint_url(&endpoint, OperationKind::Import.endpoint())?,
            status_url: endpoint_url(&endpoint, "Status")?,
            endpoint,
            client,
        })
    }

    /// Base endpoint URL
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    fn submission_url(&self, request: &OperationRequest) -> &Url {
        match request.kind() {
            OperationKind::Export => &self.export_url,
            OperationKind::Import => &self.import_url,
        }
    }

    /// Status query URL; every parameter is form-urlencoded
    fn status_query(&self, handle: &OperationHandle, credentials: &StatusCredentials) -> Url {
        let mut url = self.status_url.clone();
        url.query_pairs_mut()
            .append_pair("servername", &credentials.server_name)
            .append_pair("username", &credentials.username)
            .append_pair("password", credentials.password.expose_secret().as_str())
            .append_pair("reqId", handle.as_str());
        url
    }
}

/// Appends a path segment to the service endpoint
fn endpoint_url(base: &Url, segment: &str) -> crate::domain::Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| {
            SqlPortError::Configuration(format!(
                "service.endpoint cannot be used as a base URL: {base}"
            ))
        })?
        .pop_if_empty()
        .push(segment);
    Ok(url)
}

#[async_trait]
impl RequestSubmitter for DacClient {
    async fn submit(
        &self,
        request: &OperationRequest,
        dry_run: bool,
    ) -> Result<Submission, SubmissionError> {
        let url = self.submission_url(request);
        let body = request_body(request);

        tracing::info!(
            kind = %request.kind(),
            database = %request.connection().database_name,
            url = %url,
            "http POST"
        );

        if dry_run {
            tracing::info!(body = %redact_payload(&body), "Dry run, request would have been sent");
            return Ok(Submission::Preview(body));
        }

        tracing::debug!(body = %redact_payload(&body), "Sending request");

        let response = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/xml")
            .body(body)
            .send()
            .await
            .map_err(|e| WireFailure::from_reqwest(&e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| WireFailure::from_reqwest(&e))?;

        if !status.is_success() {
            let failure = WireFailure::from_status(status, &text);
            tracing::error!(
                kind = %request.kind(),
                status_code = status.as_u16(),
                "Request rejected by service"
            );
            return Err(failure.into());
        }

        let request_id = parse_request_guid(&text).map_err(WireFailure::Body)?;
        let handle =
            OperationHandle::new(request_id, request.kind()).map_err(WireFailure::Body)?;

        tracing::info!(request_id = %handle, kind = %request.kind(), "Request submitted");
        Ok(Submission::Submitted(handle))
    }
}

#[async_trait]
impl StatusPoller for DacClient {
    async fn poll(
        &self,
        handle: &OperationHandle,
        credentials: &StatusCredentials,
    ) -> Result<StatusSnapshot, PollError> {
        // The query string carries the password; log the request id only
        tracing::debug!(request_id = %handle, "Checking request status");

        let response = self
            .client
            .get(self.status_query(handle, credentials))
            .header(CONTENT_TYPE, "application/xml")
            .send()
            .await
            .map_err(|e| WireFailure::from_reqwest(&e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| WireFailure::from_reqwest(&e))?;

        if !status.is_success() {
            return Err(WireFailure::from_status(status, &text).into());
        }

        let first = parse_status_list(&text)
            .map_err(WireFailure::Body)?
            .into_iter()
            .next()
            .ok_or_else(|| WireFailure::Body("Status list is empty".to_string()))?;

        Ok(first
            .into_snapshot(handle.kind())
            .map_err(WireFailure::Body)?)
    }
}
