//! Classification of raw probe results.

use super::parser::{parse_ping_output, ParsedMetrics};
use super::runner::RawProbe;

/// The classified result of a single probe.
///
/// Exactly one outcome exists per probed target per batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Check succeeded with zero packet loss.
    Healthy(ParsedMetrics),
    /// Check succeeded but reported nonzero loss.
    Degraded(ParsedMetrics),
    /// Check exited zero but its output did not match the expected grammar.
    /// A sensor fault, not a network fault.
    MalformedOutput { exit_code: i32, stderr: String },
    /// Check reported the target did not respond, or the deadline expired.
    Unreachable {
        exit_code: i32,
        stderr: String,
        timed_out: bool,
    },
    /// The OS could not start the check process. Never conflated with
    /// Unreachable.
    LaunchFailure { error: String },
}

/// Map a raw probe result to its outcome.
///
/// The exit status is authoritative: text is only inspected on a zero exit.
pub fn classify(raw: &RawProbe) -> Outcome {
    match raw {
        RawProbe::LaunchFailed { error } => Outcome::LaunchFailure {
            error: error.clone(),
        },
        RawProbe::TimedOut { after } => Outcome::Unreachable {
            exit_code: -1,
            stderr: format!("check timed out after {}s", after.as_secs()),
            timed_out: true,
        },
        RawProbe::Completed {
            exit_code,
            stdout,
            stderr,
        } => {
            if *exit_code != 0 {
                return Outcome::Unreachable {
                    exit_code: *exit_code,
                    stderr: stderr.clone(),
                    timed_out: false,
                };
            }

            match parse_ping_output(stdout) {
                Ok(metrics) if metrics.percent_loss > 0.0 => Outcome::Degraded(metrics),
                Ok(metrics) => Outcome::Healthy(metrics),
                Err(e) => {
                    tracing::warn!("Malformed check output: {}", e);
                    Outcome::MalformedOutput {
                        exit_code: *exit_code,
                        stderr: stderr.clone(),
                    }
                }
            }
        }
    }
}
