use std::collections::{HashMap, HashSet};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Response, Url};
use serde::Serialize;
use tracker_core::RawCarrierPayload;
use tracker_logging::{tracker_debug, tracker_warn};

use crate::{FailureKind, FetchError};

pub const DEFAULT_BACKEND_BASE: &str = "http://localhost:3000/api";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Service root; `track/...` is appended to its path.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_BASE.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Status lookups against the remote tracking service.
#[async_trait::async_trait]
pub trait TrackingClient: Send + Sync {
    async fn fetch_single(&self, code: &str) -> Result<RawCarrierPayload, FetchError>;

    /// Returns `code -> payload`; codes the service omits are simply absent.
    async fn fetch_bulk(
        &self,
        codes: &[String],
    ) -> Result<HashMap<String, RawCarrierPayload>, FetchError>;
}

#[derive(Serialize)]
struct BulkRequest<'a> {
    codes: Vec<&'a str>,
}

#[derive(Debug, Clone)]
pub struct ReqwestTrackingClient {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestTrackingClient {
    pub fn new(settings: ClientSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = Url::parse(&self.settings.base_url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| FetchError::new(FailureKind::InvalidUrl, "base url cannot have a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read_body(&self, response: Response) -> Result<Vec<u8>, FetchError> {
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, content_len));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl TrackingClient for ReqwestTrackingClient {
    async fn fetch_single(&self, code: &str) -> Result<RawCarrierPayload, FetchError> {
        let url = self.endpoint(&["track", code])?;
        tracker_debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = self.read_body(response).await?;

        let value: serde_json::Value = serde_json::from_slice(&body)
            .map_err(|err| FetchError::new(FailureKind::InvalidBody, err.to_string()))?;
        let payload = RawCarrierPayload::from_value(value);
        if let RawCarrierPayload::Error(error) = &payload {
            tracker_warn!(
                "Tracking service reported an error for {}: {}",
                code,
                error.error.as_deref().unwrap_or("<none>")
            );
        }
        Ok(payload)
    }

    async fn fetch_bulk(
        &self,
        codes: &[String],
    ) -> Result<HashMap<String, RawCarrierPayload>, FetchError> {
        let mut seen = HashSet::new();
        let request = BulkRequest {
            codes: codes
                .iter()
                .map(String::as_str)
                .filter(|code| seen.insert(*code))
                .collect(),
        };
        let body = serde_json::to_vec(&request)
            .map_err(|err| FetchError::new(FailureKind::InvalidBody, err.to_string()))?;

        let url = self.endpoint(&["track", "bulk"])?;
        tracker_debug!("POST {} codes={}", url, request.codes.len());

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = self.read_body(response).await?;

        serde_json::from_slice::<HashMap<String, RawCarrierPayload>>(&body)
            .map_err(|err| FetchError::new(FailureKind::InvalidBody, err.to_string()))
    }
}

fn too_large(max_bytes: u64, actual: u64) -> FetchError {
    FetchError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
