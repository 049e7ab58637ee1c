//! Webhook notification dispatcher.
//!
//! Status change events are POSTed as JSON to a configured endpoint (an
//! SMS/e-mail/calendar gateway). Dispatch is fire-and-forget: the HTTP call
//! runs on a spawned task, failures are logged and never block or reverse
//! the transition. Without a configured URL, events are only logged.

use std::time::Duration;

use monteo_core::service::notify::Notifier;
use monteo_types::event::StatusChangeEvent;

/// Fire-and-forget dispatcher for status change events.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: Option<String>,
}

impl WebhookNotifier {
    /// Create a dispatcher posting to `url`, or a log-only dispatcher when
    /// no URL is configured.
    pub fn new(url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self { client, url }
    }
}

impl Notifier for WebhookNotifier {
    async fn notify(&self, event: StatusChangeEvent) {
        let Some(url) = self.url.clone() else {
            tracing::info!(
                job_id = %event.job_id,
                from = %event.from,
                to = %event.to,
                "status change (no notification endpoint configured)"
            );
            return;
        };

        let client = self.client.clone();
        tokio::spawn(async move {
            match client.post(&url).json(&event).send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::debug!(job_id = %event.job_id, "notification delivered");
                }
                Ok(response) => {
                    tracing::warn!(
                        job_id = %event.job_id,
                        status = %response.status(),
                        "notification endpoint rejected event"
                    );
                }
                Err(err) => {
                    tracing::warn!(job_id = %event.job_id, error = %err, "notification failed");
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use monteo_types::job::{JobId, JobStatus};
    use monteo_types::process::{Actor, StageId};

    #[tokio::test]
    async fn notify_without_url_does_not_panic() {
        let notifier = WebhookNotifier::new(None);
        notifier
            .notify(StatusChangeEvent {
                job_id: JobId::new(),
                from: JobStatus::Stage(StageId::Lead),
                to: JobStatus::Stage(StageId::BeforeMeasurement),
                actor: Actor::Office,
                occurred_at: Utc::now(),
            })
            .await;
    }

    #[tokio::test]
    async fn notify_with_unreachable_url_returns_immediately() {
        let notifier = WebhookNotifier::new(Some("http://127.0.0.1:1/hook".to_string()));
        // The send happens on a spawned task; the call itself must not error.
        notifier
            .notify(StatusChangeEvent {
                job_id: JobId::new(),
                from: JobStatus::Stage(StageId::Lead),
                to: JobStatus::Cancelled,
                actor: Actor::Office,
                occurred_at: Utc::now(),
            })
            .await;
    }
}
