//! Slack webhook sink.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt::Write;
use tracing::debug;

use super::LeadSink;
use crate::error::SinkError;
use crate::source::Lead;

/// Environment variable for Slack webhook URL.
const ENV_SLACK_WEBHOOK_URL: &str = "SLACK_WEBHOOK_URL";

#[derive(Debug, Serialize)]
struct WebhookPayload {
    text: String,
}

/// Posts one message per run to a Slack incoming webhook.
pub struct SlackSink {
    webhook_url: String,
    client: reqwest::Client,
}

impl SlackSink {
    /// Create a Slack sink with a specific webhook URL.
    #[must_use]
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create from `SLACK_WEBHOOK_URL`.
    pub fn from_env() -> Result<Self, SinkError> {
        let webhook_url = std::env::var(ENV_SLACK_WEBHOOK_URL)
            .map_err(|_| SinkError::NotConfigured(format!("{ENV_SLACK_WEBHOOK_URL} not set")))?;
        Ok(Self::new(webhook_url))
    }

    /// Format leads as Slack mrkdwn.
    fn format_text(leads: &[Lead]) -> String {
        let mut text = format!(
            "*{} new lead{}*",
            leads.len(),
            if leads.len() == 1 { "" } else { "s" }
        );
        for lead in leads {
            let title = lead
                .title
                .replace('&', "&amp;")
                .replace('<', "&lt;")
                .replace('>', "&gt;");
            let _ = write!(text, "\n• r/{}: <{}|{}>", lead.source, lead.url, title);
        }
        text
    }
}

#[async_trait]
impl LeadSink for SlackSink {
    fn name(&self) -> &'static str {
        "slack"
    }

    async fn deliver(&self, leads: &[Lead]) -> Result<(), SinkError> {
        if leads.is_empty() {
            debug!("No leads, skipping Slack message");
            return Ok(());
        }

        let payload = WebhookPayload {
            text: Self::format_text(leads),
        };

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Status { status, body });
        }

        debug!(count = leads.len(), "Slack message sent");
        Ok(())
    }
}
