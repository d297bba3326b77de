//! Event records handed off to the event store.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use super::outcome::Outcome;

/// Ordered event severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Information,
    Warning,
    Exception,
}

impl Severity {
    pub fn as_i64(&self) -> i64 {
        *self as i64
    }
}

/// Closed set of event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventName {
    Ok,
    Degraded,
    Malformed,
    Unreachable,
    Fault,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::Ok => "ok",
            EventName::Degraded => "degraded",
            EventName::Malformed => "malformed",
            EventName::Unreachable => "unreachable",
            EventName::Fault => "fault",
        }
    }
}

/// A normalized event record, immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub host_id: i64,
    pub name: EventName,
    pub severity: Severity,
    /// Capture time of the batch run, shared by every event in the batch.
    pub date: DateTime<Utc>,
    /// JSON-serialized metrics or failure detail.
    pub content: String,
}

/// Build the event for an outcome, or None when policy suppresses it.
///
/// Only true Healthy (zero-loss) outcomes are ever suppressed; Degraded and
/// all failures always emit.
pub fn build_event(
    host_id: i64,
    outcome: &Outcome,
    captured_at: DateTime<Utc>,
    suppress_healthy: bool,
) -> Option<Event> {
    let (name, severity, content) = match outcome {
        Outcome::Healthy(metrics) => {
            if suppress_healthy {
                return None;
            }
            let content =
                serde_json::to_string(metrics).unwrap_or_else(|_| "{}".to_string());
            (EventName::Ok, Severity::Information, content)
        }
        Outcome::Degraded(metrics) => {
            let content =
                serde_json::to_string(metrics).unwrap_or_else(|_| "{}".to_string());
            (EventName::Degraded, Severity::Information, content)
        }
        Outcome::MalformedOutput { exit_code, stderr } => {
            let content = json!({
                "exit_code": exit_code,
                "error": stderr,
            })
            .to_string();
            (EventName::Malformed, Severity::Warning, content)
        }
        Outcome::Unreachable {
            exit_code,
            stderr,
            timed_out,
        } => {
            let content = json!({
                "exit_code": exit_code,
                "error": stderr,
                "timed_out": timed_out,
            })
            .to_string();
            (EventName::Unreachable, Severity::Exception, content)
        }
        Outcome::LaunchFailure { error } => {
            let content = json!({ "error": error }).to_string();
            (EventName::Fault, Severity::Exception, content)
        }
    };

    Some(Event {
        host_id,
        name,
        severity,
        date: captured_at,
        content,
    })
}
