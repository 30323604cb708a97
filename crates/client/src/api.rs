// crates/client/src/api.rs
//! HTTP access to the status API.

use std::time::Duration;

use async_trait::async_trait;
use focus_guard_core::{
    CheckinRequest, CompleteInterventionRequest, OutcomeResponse, StatusResponse,
    ViolationRequest,
};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ClientError;

/// The calls the focus monitor makes against the server.
#[async_trait]
pub trait StatusApi: Send + Sync + 'static {
    async fn fetch_status(&self, student_id: &str) -> Result<StatusResponse, ClientError>;

    async fn submit_checkin(
        &self,
        student_id: &str,
        quiz_score: i64,
        focus_minutes: i64,
    ) -> Result<OutcomeResponse, ClientError>;

    /// `focus_duration` is the timer display, `MM:SS`.
    async fn report_violation(
        &self,
        student_id: &str,
        focus_duration: &str,
        reason: &str,
    ) -> Result<OutcomeResponse, ClientError>;

    async fn complete_intervention(
        &self,
        student_id: &str,
        intervention_id: i64,
    ) -> Result<(), ClientError>;
}

/// Error body shape returned by the server.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    details: Option<String>,
}

pub struct HttpStatusApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpStatusApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// Append path segments to the base URL; segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let url = self.endpoint(&[path])?;
        debug!(%url, "POST");
        let response = self.client.post(url).json(body).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(ErrorBody {
            error,
            details: Some(details),
        }) => format!("{error}: {details}"),
        Ok(ErrorBody { error, .. }) => error,
        Err(_) if !text.trim().is_empty() => text.trim().to_string(),
        Err(_) => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    };
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl StatusApi for HttpStatusApi {
    async fn fetch_status(&self, student_id: &str) -> Result<StatusResponse, ClientError> {
        let url = self.endpoint(&["student", student_id, "status"])?;
        debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        decode(response).await
    }

    async fn submit_checkin(
        &self,
        student_id: &str,
        quiz_score: i64,
        focus_minutes: i64,
    ) -> Result<OutcomeResponse, ClientError> {
        let body = CheckinRequest {
            student_id: Some(student_id.to_string()),
            quiz_score: Some(quiz_score),
            focus_minutes: Some(focus_minutes),
            focus_duration: None,
        };
        self.post("daily-checkin", &body).await
    }

    async fn report_violation(
        &self,
        student_id: &str,
        focus_duration: &str,
        reason: &str,
    ) -> Result<OutcomeResponse, ClientError> {
        let body = ViolationRequest {
            student_id: Some(student_id.to_string()),
            focus_minutes: None,
            focus_duration: Some(focus_duration.to_string()),
            reason: Some(reason.to_string()),
        };
        self.post("report-cheat", &body).await
    }

    async fn complete_intervention(
        &self,
        student_id: &str,
        intervention_id: i64,
    ) -> Result<(), ClientError> {
        let body = CompleteInterventionRequest {
            student_id: Some(student_id.to_string()),
            intervention_id: Some(intervention_id),
        };
        let _: serde_json::Value = self.post("complete-intervention", &body).await?;
        Ok(())
    }
}
