//! Console sink.

use async_trait::async_trait;
use colored::Colorize;
use std::fmt::Write as _;
use std::io;

use super::LeadSink;
use crate::error::SinkError;
use crate::source::Lead;

/// Prints leads to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ConsoleSink {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Render the report block for `leads`.
    #[must_use]
    pub fn render(leads: &[Lead]) -> String {
        if leads.is_empty() {
            return "No new matches.".to_string();
        }

        let mut out = String::new();
        let _ = writeln!(out, "{}", "New matches found:".green().bold());
        for lead in leads {
            let _ = writeln!(
                out,
                "  {} {}\n    {}",
                format!("[r/{}]", lead.source).cyan(),
                lead.title.bold(),
                lead.url.dimmed()
            );
        }
        out.truncate(out.trim_end().len());
        out
    }

    /// Write the report block for `leads` to `out`.
    pub fn write_to(out: &mut impl io::Write, leads: &[Lead]) -> Result<(), SinkError> {
        writeln!(out, "{}", Self::render(leads))?;
        out.flush()?;
        Ok(())
    }
}

#[async_trait]
impl LeadSink for ConsoleSink {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn deliver(&self, leads: &[Lead]) -> Result<(), SinkError> {
        Self::write_to(&mut io::stdout().lock(), leads)
    }
}
