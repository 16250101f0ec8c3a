//! Lead sinks and append-with-retry.
//!
//! The CRM is a row-append store. [`safe_append`] retries a failed append a
//! fixed number of times with a fixed pause; [`export_leads`] paces rows so a
//! batch does not trip the store's write quota.

use std::io::Write;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::lead::BusinessLead;

pub const DEFAULT_APPEND_ATTEMPTS: u32 = 3;
pub const DEFAULT_APPEND_RETRY_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_ROW_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write lead row: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize lead row: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Destination for finished leads, one row per call.
pub trait LeadSink {
    /// Appends one lead, tagged with the team member it is assigned to.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the row could not be written.
    fn append(&mut self, lead: &BusinessLead, assigned_to: Option<&str>) -> Result<(), SinkError>;
}

#[derive(Serialize)]
struct LeadRow<'a> {
    #[serde(flatten)]
    lead: &'a BusinessLead,
    #[serde(skip_serializing_if = "Option::is_none")]
    assigned_to: Option<&'a str>,
}

/// Writes each lead as one JSON object per line.
///
/// A row is serialized in full before anything is written and reaches the
/// writer as a single `write_all`, so a serialization failure writes nothing.
/// If the final flush fails the row may already sit in the writer's buffer,
/// and a retried append can then emit it twice.
pub struct JsonlSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonlSink<W> {
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> LeadSink for JsonlSink<W> {
    fn append(&mut self, lead: &BusinessLead, assigned_to: Option<&str>) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(&LeadRow { lead, assigned_to })?;
        line.push(b'\n');
        self.writer.write_all(&line)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendPolicy {
    pub attempts: u32,
    pub retry_delay: Duration,
    /// Pause after every row.
    pub row_delay: Duration,
}

impl Default for AppendPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_APPEND_ATTEMPTS,
            retry_delay: DEFAULT_APPEND_RETRY_DELAY,
            row_delay: DEFAULT_ROW_DELAY,
        }
    }
}

/// Appends `lead`, retrying up to `policy.attempts` times.
///
/// Returns `false` once every attempt has failed; the caller decides whether
/// to carry on with the next row.
pub async fn safe_append<S: LeadSink>(
    sink: &mut S,
    lead: &BusinessLead,
    assigned_to: Option<&str>,
    policy: &AppendPolicy,
) -> bool {
    let attempts = policy.attempts.max(1);
    for attempt in 1..=attempts {
        match sink.append(lead, assigned_to) {
            Ok(()) => return true,
            Err(e) => {
                tracing::warn!(
                    place_id = %lead.place_id,
                    attempt,
                    attempts,
                    error = %e,
                    "lead append failed"
                );
                if attempt < attempts {
                    tokio::time::sleep(policy.retry_delay).await;
                }
            }
        }
    }
    tracing::error!(
        place_id = %lead.place_id,
        name = %lead.name,
        "giving up on lead after repeated append failures"
    );
    false
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub appended: usize,
    pub failed: usize,
}

/// Appends every lead in order, pausing `policy.row_delay` after each row.
pub async fn export_leads<S: LeadSink>(
    sink: &mut S,
    leads: &[BusinessLead],
    assigned_to: Option<&str>,
    policy: &AppendPolicy,
) -> ExportSummary {
    let mut summary = ExportSummary::default();
    for lead in leads {
        if safe_append(sink, lead, assigned_to, policy).await {
            summary.appended += 1;
            tracing::info!(name = %lead.name, address = %lead.address, "lead appended");
        } else {
            summary.failed += 1;
        }
        tokio::time::sleep(policy.row_delay).await;
    }
    summary
}
