//! Lead reporting sinks.
//!
//! The scan hands its leads to every configured [`LeadSink`]. Delivery
//! happens after the seen set is saved, so a failing sink never causes a lead
//! to be reported twice.

mod console;
mod email;
mod slack;

pub use console::ConsoleSink;
pub use email::{EmailConfig, EmailSink};
pub use slack::SlackSink;

use async_trait::async_trait;

use crate::error::SinkError;
use crate::source::Lead;

/// Trait for lead sinks (console, Slack, email).
#[async_trait]
pub trait LeadSink: Send + Sync {
    /// Get the name of this sink.
    fn name(&self) -> &'static str;

    /// Deliver the leads of one run.
    async fn deliver(&self, leads: &[Lead]) -> Result<(), SinkError>;
}
