//! Email sink using SMTP (STARTTLS).

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::fmt::Write;

use super::LeadSink;
use crate::error::SinkError;
use crate::source::Lead;

/// Default SMTP host.
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Default SMTP port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// SMTP settings for the email sink.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port.
    pub smtp_port: u16,
    /// SMTP username.
    pub smtp_username: String,
    /// SMTP password (app password for Gmail).
    pub smtp_password: String,
    /// Recipient email address.
    pub to_email: String,
    /// Sender email address (usually same as username).
    pub from_email: String,
}

impl EmailConfig {
    /// Create configuration from environment variables.
    ///
    /// # Required Environment Variables
    /// - `SMTP_USERNAME`
    /// - `SMTP_PASSWORD`
    ///
    /// # Optional Environment Variables
    /// - `LEADWATCH_TO_EMAIL`: Recipient (default: `SMTP_USERNAME`)
    /// - `SMTP_HOST`: default smtp.gmail.com
    /// - `SMTP_PORT`: default 587
    pub fn from_env() -> Result<Self, SinkError> {
        let smtp_username = std::env::var("SMTP_USERNAME")
            .map_err(|_| SinkError::NotConfigured("SMTP_USERNAME not set".to_string()))?;
        let smtp_password = std::env::var("SMTP_PASSWORD")
            .map_err(|_| SinkError::NotConfigured("SMTP_PASSWORD not set".to_string()))?;

        let to_email = std::env::var("LEADWATCH_TO_EMAIL").unwrap_or_else(|_| smtp_username.clone());
        let smtp_host = std::env::var("SMTP_HOST").unwrap_or_else(|_| DEFAULT_SMTP_HOST.to_string());
        let smtp_port = std::env::var("SMTP_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SMTP_PORT);

        Ok(Self {
            smtp_host,
            smtp_port,
            smtp_username: smtp_username.clone(),
            smtp_password,
            to_email,
            from_email: smtp_username,
        })
    }
}

/// Emails one summary per run.
pub struct EmailSink {
    config: EmailConfig,
}

impl EmailSink {
    #[must_use]
    pub const fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self, SinkError> {
        Ok(Self::new(EmailConfig::from_env()?))
    }

    fn subject(leads: &[Lead]) -> String {
        format!(
            "leadwatch: {} new lead{} ({})",
            leads.len(),
            if leads.len() == 1 { "" } else { "s" },
            chrono::Utc::now().format("%Y-%m-%d")
        )
    }

    fn render_text(leads: &[Lead]) -> String {
        let mut text = String::from("New matches found:\n\n");
        for lead in leads {
            let _ = writeln!(text, "[r/{}] {}\n{}\n", lead.source, lead.title, lead.url);
        }
        text
    }

    fn render_html(leads: &[Lead]) -> String {
        let mut html = String::from(
            "<!DOCTYPE html>\n<html>\n<body style=\"font-family: sans-serif;\">\n<h2>New matches found</h2>\n<ul>\n",
        );
        for lead in leads {
            let _ = writeln!(
                html,
                "<li><strong>r/{}</strong>: <a href=\"{}\">{}</a></li>",
                escape_html(&lead.source),
                escape_html(&lead.url),
                escape_html(&lead.title)
            );
        }
        html.push_str("</ul>\n</body>\n</html>\n");
        html
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[async_trait]
impl LeadSink for EmailSink {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn deliver(&self, leads: &[Lead]) -> Result<(), SinkError> {
        if leads.is_empty() {
            tracing::debug!("No leads, skipping email");
            return Ok(());
        }

        let from: Mailbox = self
            .config
            .from_email
            .parse()
            .map_err(|e| SinkError::Email(format!("invalid from address: {e}")))?;
        let to: Mailbox = self
            .config
            .to_email
            .parse()
            .map_err(|e| SinkError::Email(format!("invalid to address: {e}")))?;

        let subject = Self::subject(leads);
        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(subject.as_str())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(Self::render_text(leads)),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(Self::render_html(leads)),
                    ),
            )
            .map_err(|e| SinkError::Email(format!("failed to build message: {e}")))?;

        let creds = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        );

        let mailer: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)
                .map_err(|e| SinkError::Email(format!("failed to create SMTP transport: {e}")))?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build();

        mailer
            .send(email)
            .await
            .map_err(|e| SinkError::Email(format!("SMTP send failed: {e}")))?;

        tracing::info!(to = %self.config.to_email, subject = %subject, "Email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leads() -> Vec<Lead> {
        vec![Lead {
            source: "irvine".to_string(),
            title: "Buying a \"starter\" home <2025>".to_string(),
            url: "https://reddit.com/r/irvine/p1".to_string(),
        }]
    }

    #[test]
    fn test_subject_counts_leads() {
        assert!(EmailSink::subject(&leads()).starts_with("leadwatch: 1 new lead ("));
    }

    #[test]
    fn test_render_text() {
        let text = EmailSink::render_text(&leads());
        assert!(text.contains("[r/irvine] Buying a \"starter\" home <2025>"));
        assert!(text.contains("https://reddit.com/r/irvine/p1"));
    }

    #[test]
    fn test_render_html_escapes_titles() {
        let html = EmailSink::render_html(&leads());
        assert!(html.contains("Buying a &quot;starter&quot; home &lt;2025&gt;"));
        assert!(html.contains("href=\"https://reddit.com/r/irvine/p1\""));
    }
}
