// crates/server/src/notifier.rs
//! Best-effort mentor notification through an outbound webhook.
//!
//! Callers treat every outcome other than [`NotifyOutcome::Sent`] as a
//! warning; nothing here may fail the status write that triggered it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

/// Host used by the sample configuration; treated as "not configured".
const PLACEHOLDER_HOST: &str = "your-n8n-instance.com";

/// Webhook request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MentorAlert {
    pub student_id: String,
    pub quiz_score: i64,
    pub focus_minutes: i64,
    /// RFC 3339, UTC.
    pub timestamp: String,
}

impl MentorAlert {
    pub fn new(student_id: impl Into<String>, quiz_score: i64, focus_minutes: i64) -> Self {
        Self {
            student_id: student_id.into(),
            quiz_score,
            focus_minutes,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    /// Not delivered, but not an error: webhook unconfigured or it answered 4xx.
    Skipped {
        status: Option<u16>,
        message: String,
    },
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Webhook request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Webhook responded with {status}: {message}")]
    Server { status: u16, message: String },
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_mentor(&self, alert: &MentorAlert) -> Result<NotifyOutcome, NotifyError>;
}

/// POSTs [`MentorAlert`]s to a configured URL.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: Option<String>,
    missing_url_warned: AtomicBool,
}

impl WebhookNotifier {
    pub fn new(url: Option<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let url = url.filter(|u| !u.trim().is_empty() && !u.contains(PLACEHOLDER_HOST));
        Ok(Self {
            client,
            url,
            missing_url_warned: AtomicBool::new(false),
        })
    }

    /// A notifier that skips every alert.
    pub fn disabled() -> Self {
        Self {
            client: reqwest::Client::new(),
            url: None,
            missing_url_warned: AtomicBool::new(false),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify_mentor(&self, alert: &MentorAlert) -> Result<NotifyOutcome, NotifyError> {
        let Some(url) = self.url.as_deref() else {
            if !self.missing_url_warned.swap(true, Ordering::Relaxed) {
                warn!("Skipping mentor webhook: set N8N_WEBHOOK_URL to a reachable webhook to enable");
            }
            return Ok(NotifyOutcome::Skipped {
                status: None,
                message: "Webhook URL is not configured".to_string(),
            });
        };

        let response = self.client.post(url).json(alert).send().await.map_err(|e| {
            error!(student_id = %alert.student_id, error = %e, "Failed to trigger mentor notification");
            NotifyError::Request(e)
        })?;

        let status = response.status();
        if status.is_success() {
            info!(student_id = %alert.student_id, "Mentor notification triggered");
            return Ok(NotifyOutcome::Sent);
        }

        let body = response.text().await.unwrap_or_default();
        let message = response_message(&body)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

        if status.is_client_error() {
            warn!(
                student_id = %alert.student_id,
                status = status.as_u16(),
                message = %message,
                "Mentor webhook rejected the alert; continuing without notification"
            );
            return Ok(NotifyOutcome::Skipped {
                status: Some(status.as_u16()),
                message,
            });
        }

        error!(
            student_id = %alert.student_id,
            status = status.as_u16(),
            message = %message,
            "Mentor webhook failed"
        );
        Err(NotifyError::Server {
            status: status.as_u16(),
            message,
        })
    }
}

/// Pull a human-readable reason out of a webhook error body: JSON `hint`,
/// then JSON `message`, then the raw text.
fn response_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(trimmed) {
        for key in ["hint", "message"] {
            if let Some(text) = json.get(key).and_then(|v| v.as_str()) {
                return Some(text.to_string());
            }
        }
        return None;
    }
    Some(trimmed.to_string())
}
