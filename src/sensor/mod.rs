//! Batch coordination: resolve hosts, run probes, emit events.

use std::collections::HashMap;

use chrono::Utc;
use thiserror::Error;

use crate::config::ServerConfig;
use crate::db::{DbError, Host, Resolvable, Store};
use crate::probe::{build_event, classify, run_probes, Event, ProbeRequest, RunnerConfig};

/// Why a target could not be probed at all.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    #[error("host record not found")]
    NotFound,
    #[error("no usable address")]
    NoAddress,
}

/// A target that never reached the runner.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionFailure {
    pub host_id: i64,
    pub reason: ResolutionError,
}

/// The complete result of one batch run.
///
/// Every submitted host id lands in exactly one bucket: an emitted event, the
/// suppressed count, or a resolution failure.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub events: Vec<Event>,
    pub suppressed: usize,
    pub failures: Vec<ResolutionFailure>,
}

impl BatchReport {
    /// Targets that actually ran a check.
    pub fn probed(&self) -> usize {
        self.events.len() + self.suppressed
    }

    /// Total targets accounted for; always equals the submitted batch size.
    pub fn accounted(&self) -> usize {
        self.probed() + self.failures.len()
    }
}

/// Pick the probe address for a host record.
///
/// Name first when preferred and present, then the first non-empty configured
/// IP in listed order.
pub fn resolve_address<R: Resolvable>(record: &R, prefer_name: bool) -> Option<String> {
    if prefer_name {
        if let Some(name) = record.display_name() {
            return Some(name.to_string());
        }
    }

    record
        .ip_addresses()
        .iter()
        .find(|ip| !ip.is_empty())
        .cloned()
}

/// Probe a batch of hosts and return the resulting events.
///
/// Resolution failures are collected up front and never scheduled; everything
/// that resolves is probed concurrently and routed through
/// parse -> classify -> build. One clock read covers the whole batch.
pub async fn run_batch(
    store: &Store,
    cfg: &ServerConfig,
    host_ids: &[i64],
) -> Result<BatchReport, DbError> {
    let captured_at = Utc::now();

    let mut report = BatchReport::default();
    let mut hosts: HashMap<i64, Host> = HashMap::new();
    let mut requests = Vec::new();

    for &host_id in host_ids {
        let host = match store.get_host(host_id)? {
            Some(h) => h,
            None => {
                report.failures.push(ResolutionFailure {
                    host_id,
                    reason: ResolutionError::NotFound,
                });
                continue;
            }
        };

        let address = match resolve_address(&host, host.options.prefer_name_over_ip) {
            Some(a) => a,
            None => {
                report.failures.push(ResolutionFailure {
                    host_id,
                    reason: ResolutionError::NoAddress,
                });
                continue;
            }
        };

        let count = if host.options.probe_count > 0 {
            host.options.probe_count
        } else {
            cfg.probe_count
        };
        requests.push(ProbeRequest {
            host_id,
            address,
            count,
        });
        hosts.insert(host_id, host);
    }

    tracing::info!(
        "Batch: {} targets submitted, {} resolved, {} resolution failures",
        host_ids.len(),
        requests.len(),
        report.failures.len()
    );

    let runner_cfg = RunnerConfig {
        ping_path: cfg.ping_path.clone(),
        timeout: cfg.probe_timeout,
        max_concurrent: cfg.max_concurrent_probes,
    };
    let results = run_probes(&runner_cfg, requests).await;

    for (host_id, raw) in &results {
        let host = match hosts.get(host_id) {
            Some(h) => h,
            None => continue,
        };

        let outcome = classify(raw);
        match build_event(
            *host_id,
            &outcome,
            captured_at,
            host.options.suppress_healthy_events,
        ) {
            Some(event) => report.events.push(event),
            None => report.suppressed += 1,
        }
    }

    tracing::info!(
        "Batch: {} probed, {} emitted, {} suppressed",
        report.probed(),
        report.events.len(),
        report.suppressed
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::HostOptions;
    use crate::probe::EventName;
    use std::time::Duration;

    struct FakeRecord {
        name: Option<&'static str>,
        ips: Vec<String>,
    }

    impl Resolvable for FakeRecord {
        fn display_name(&self) -> Option<&str> {
            self.name
        }

        fn ip_addresses(&self) -> &[String] {
            &self.ips
        }
    }

    #[test]
    fn test_resolve_prefers_name() {
        let record = FakeRecord {
            name: Some("db1.example.net"),
            ips: vec!["10.0.0.9".to_string()],
        };
        assert_eq!(
            resolve_address(&record, true),
            Some("db1.example.net".to_string())
        );
    }

    #[test]
    fn test_resolve_ip_fallback() {
        let record = FakeRecord {
            name: Some("db1.example.net"),
            ips: vec![String::new(), "10.0.0.9".to_string()],
        };
        // Name disabled: first non-empty IP in listed order wins
        assert_eq!(resolve_address(&record, false), Some("10.0.0.9".to_string()));

        let nameless = FakeRecord {
            name: None,
            ips: vec!["10.0.0.9".to_string()],
        };
        assert_eq!(resolve_address(&nameless, true), Some("10.0.0.9".to_string()));
    }

    #[test]
    fn test_resolve_nothing_usable() {
        let record = FakeRecord {
            name: None,
            ips: vec![String::new()],
        };
        assert_eq!(resolve_address(&record, true), None);
        assert_eq!(resolve_address(&record, false), None);
    }

    fn test_env() -> (tempfile::TempDir, Store, ServerConfig) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("test.db")).unwrap();
        // `echo` stands in for the check binary: exit 0, unparseable output,
        // so every resolved target classifies as MalformedOutput.
        let cfg = ServerConfig {
            db_path: String::new(),
            ping_path: "echo".to_string(),
            probe_count: 1,
            probe_timeout: Duration::from_secs(5),
            max_concurrent_probes: 4,
        };
        (dir, store, cfg)
    }

    #[tokio::test]
    async fn test_batch_completeness() {
        let (_dir, store, cfg) = test_env();

        let mut a = Host {
            name: "a.example.net".to_string(),
            ..Default::default()
        };
        let mut b = Host {
            name: "b.example.net".to_string(),
            ..Default::default()
        };
        let a_id = store.add_host(&mut a).unwrap();
        let b_id = store.add_host(&mut b).unwrap();

        let ids = vec![a_id, b_id, 9999];
        let report = run_batch(&store, &cfg, &ids).await.unwrap();

        // 2 resolvable + 1 unresolvable: everything accounted for
        assert_eq!(report.accounted(), 3);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].host_id, 9999);
        assert_eq!(report.failures[0].reason, ResolutionError::NotFound);

        // echo output never matches the grammar
        assert_eq!(report.events.len(), 2);
        assert_eq!(report.suppressed, 0);
        for event in &report.events {
            assert_eq!(event.name, EventName::Malformed);
        }
    }

    #[tokio::test]
    async fn test_batch_no_address_is_resolution_failure() {
        let (_dir, store, cfg) = test_env();

        let mut host = Host {
            name: String::new(),
            ip_addresses: vec![],
            ..Default::default()
        };
        let id = store.add_host(&mut host).unwrap();

        let report = run_batch(&store, &cfg, &[id]).await.unwrap();
        assert_eq!(report.probed(), 0);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].reason, ResolutionError::NoAddress);
    }

    #[tokio::test]
    async fn test_batch_events_share_timestamp() {
        let (_dir, store, cfg) = test_env();

        let mut a = Host {
            name: "a.example.net".to_string(),
            ..Default::default()
        };
        let mut b = Host {
            name: "b.example.net".to_string(),
            ..Default::default()
        };
        let a_id = store.add_host(&mut a).unwrap();
        let b_id = store.add_host(&mut b).unwrap();

        let report = run_batch(&store, &cfg, &[a_id, b_id]).await.unwrap();
        assert_eq!(report.events.len(), 2);
        assert_eq!(report.events[0].date, report.events[1].date);
    }

    #[tokio::test]
    async fn test_batch_launch_failure_still_accounted() {
        let (_dir, store, mut cfg) = test_env();
        cfg.ping_path = "/nonexistent/definitely-not-ping".to_string();

        let mut host = Host {
            name: "a.example.net".to_string(),
            ..Default::default()
        };
        let id = store.add_host(&mut host).unwrap();

        let report = run_batch(&store, &cfg, &[id]).await.unwrap();
        assert_eq!(report.accounted(), 1);
        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].name, EventName::Fault);
    }

    /// Write an executable that prints well-formed ping output and exits 0.
    #[cfg(unix)]
    fn fake_ping(dir: &tempfile::TempDir) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.path().join("fake-ping");
        std::fs::write(
            &path,
            "#!/bin/sh\n\
             echo '5 packets transmitted, 5 received, 0% packet loss, time 42ms'\n\
             echo 'rtt min/avg/max/mdev = 1.1/2.2/3.3/0.4 ms'\n",
        )
        .unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_healthy_suppression_policy() {
        let (dir, store, mut cfg) = test_env();
        cfg.ping_path = fake_ping(&dir);

        let mut suppressing = Host {
            name: "a.example.net".to_string(),
            ..Default::default()
        };
        let mut emitting = Host {
            name: "b.example.net".to_string(),
            options: HostOptions {
                suppress_healthy_events: false,
                ..Default::default()
            },
            ..Default::default()
        };
        let a_id = store.add_host(&mut suppressing).unwrap();
        let b_id = store.add_host(&mut emitting).unwrap();

        let report = run_batch(&store, &cfg, &[a_id, b_id]).await.unwrap();

        // Both probed, one suppressed by the default policy
        assert_eq!(report.probed(), 2);
        assert_eq!(report.suppressed, 1);
        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].host_id, b_id);
        assert_eq!(report.events[0].name, EventName::Ok);
    }
}
