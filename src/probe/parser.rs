//! Parser for ping command output.
//!
//! Extracts loss percentage and round-trip timing from the summary section
//! that iputils-style ping prints on a zero exit.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

/// Parse error types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("missing packet loss clause")]
    MissingLoss,
    #[error("missing rtt clause")]
    MissingRtt,
    #[error("invalid numeric field: {0}")]
    InvalidNumber(String),
}

/// Metrics extracted from a successful probe.
///
/// All five fields come from the same output or none do; a partially
/// populated value is never constructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParsedMetrics {
    pub percent_loss: f64,
    /// Round-trip min/avg/max/mdev, in milliseconds.
    pub min: f64,
    pub avg: f64,
    pub max: f64,
    pub mdev: f64,
}

/// Parse ping stdout into metrics.
///
/// Pure function: the same text always yields the same result. The caller is
/// responsible for checking the exit status first; this only inspects text.
pub fn parse_ping_output(stdout: &str) -> Result<ParsedMetrics, ParseError> {
    // Loss clause: "... received, 0% packet loss ..."
    static LOSS_RE: OnceLock<Regex> = OnceLock::new();
    let loss_re = LOSS_RE.get_or_init(|| Regex::new(r"received,(?P<loss>.*?)packet").unwrap());

    let caps = loss_re.captures(stdout).ok_or(ParseError::MissingLoss)?;
    let loss_text = caps["loss"].replace('%', "");
    let loss_text = loss_text.trim();
    let percent_loss: f64 = loss_text
        .parse()
        .map_err(|_| ParseError::InvalidNumber(loss_text.to_string()))?;
    if !(0.0..=100.0).contains(&percent_loss) {
        return Err(ParseError::InvalidNumber(loss_text.to_string()));
    }

    // Timing clause: "rtt min/avg/max/mdev = 1.1/2.2/3.3/0.4 ms"
    static RTT_RE: OnceLock<Regex> = OnceLock::new();
    let rtt_re = RTT_RE.get_or_init(|| Regex::new(r"rtt.*?=(?P<vals>.*?)ms").unwrap());

    let caps = rtt_re.captures(stdout).ok_or(ParseError::MissingRtt)?;
    let vals_text = caps["vals"].trim().to_string();
    let parts: Vec<&str> = vals_text.split('/').collect();
    if parts.len() != 4 {
        return Err(ParseError::InvalidNumber(vals_text));
    }

    let mut vals = [0.0f64; 4];
    for (slot, part) in vals.iter_mut().zip(&parts) {
        *slot = part
            .trim()
            .parse()
            .map_err(|_| ParseError::InvalidNumber(part.to_string()))?;
    }

    Ok(ParsedMetrics {
        percent_loss,
        min: vals[0],
        avg: vals[1],
        max: vals[2],
        mdev: vals[3],
    })
}
