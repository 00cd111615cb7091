//! HTTP client for the articulation service.
//!
//! Thin JSON wrapper over reqwest. Every request races the pipeline's
//! cancellation token and retries transient failures (5xx, transport
//! errors) with bounded exponential backoff.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api::error::ApiError;
use crate::cancel::CancelToken;
use crate::models::{Institution, MajorReportsResponse, RawAgreement};

/// User-Agent string for upstream requests.
const USER_AGENT: &str = concat!("majormap/", env!("CARGO_PKG_VERSION"));

/// Client for the upstream articulation API.
#[derive(Debug, Clone)]
pub struct ArticulationClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl ArticulationClient {
    /// Create a client for the given base URL.
    ///
    /// `timeout_seconds` bounds each individual request; `max_retries`
    /// bounds re-attempts on transient failures.
    pub fn new(base_url: &str, timeout_seconds: u64, max_retries: u32) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries,
        })
    }

    /// Fetch the full institution catalog. Done once per session.
    pub async fn institutions(&self, cancel: &CancelToken) -> Result<Vec<Institution>, ApiError> {
        let url = format!("{}/api/institutions", self.base_url);
        self.get_json(&url, cancel).await
    }

    /// Fetch the raw agreement list for a receiving institution.
    pub async fn agreements(
        &self,
        receiving_institution_id: i64,
        cancel: &CancelToken,
    ) -> Result<Vec<RawAgreement>, ApiError> {
        let url = format!(
            "{}/api/institutions/{}/agreements",
            self.base_url, receiving_institution_id
        );
        self.get_json(&url, cancel).await
    }

    /// Fetch major-category reports for one (receiving, sending, year)
    /// triple.
    pub async fn major_reports(
        &self,
        receiving_institution_id: i64,
        sending_institution_id: i64,
        academic_year_id: i64,
        cancel: &CancelToken,
    ) -> Result<MajorReportsResponse, ApiError> {
        let url = format!(
            "{}/api/agreements?receivingInstitutionId={}&sendingInstitutionId={}&academicYearId={}&categoryCode=major",
            self.base_url, receiving_institution_id, sending_institution_id, academic_year_id
        );
        self.get_json(&url, cancel).await
    }

    /// GET a JSON document, racing the cancellation token.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        cancel: &CancelToken,
    ) -> Result<T, ApiError> {
        if cancel.is_cancelled() {
            return Err(ApiError::Cancelled);
        }

        tokio::select! {
            _ = cancel.cancelled() => Err(ApiError::Cancelled),
            result = self.get_with_retry(url) => result,
        }
    }

    /// Single GET with retry on 5xx and transport errors.
    async fn get_with_retry<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let mut retries = 0u32;

        loop {
            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_server_error() && retries < self.max_retries {
                        retries += 1;
                        let delay = backoff_delay(retries);
                        debug!(%url, %status, retry = retries, "retrying after server error");
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    if !status.is_success() {
                        return Err(ApiError::Status {
                            status,
                            url: url.to_string(),
                        });
                    }

                    return Ok(response.json::<T>().await?);
                }
                Err(e) => {
                    if retries < self.max_retries {
                        retries += 1;
                        let delay = backoff_delay(retries);
                        warn!(%url, error = %e, retry = retries, "retrying after transport error");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }
}

fn backoff_delay(retry: u32) -> Duration {
    Duration::from_millis(250 * 2u64.pow(retry.saturating_sub(1)))
}
