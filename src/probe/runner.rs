//! Concurrent execution of the external reachability check.
//!
//! One ping process per target, fanned out together and joined as a batch.

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::process::Command;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// A single probe to run: which host, against which address, how many echoes.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub host_id: i64,
    pub address: String,
    pub count: u32,
}

/// Raw result of one probe process.
#[derive(Debug, Clone)]
pub enum RawProbe {
    /// The process ran to completion, successfully or not.
    Completed {
        exit_code: i32,
        stdout: String,
        stderr: String,
    },
    /// The process did not terminate within the deadline and was killed.
    TimedOut { after: Duration },
    /// The OS could not start the process at all.
    LaunchFailed { error: String },
}

/// Runner configuration.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Path to the ping executable.
    pub ping_path: String,
    /// Deadline per probe process.
    pub timeout: Duration,
    /// Cap on concurrently running processes.
    pub max_concurrent: usize,
}

/// Run all requested probes concurrently and collect their raw results.
///
/// Each task writes only its own key, so the fan-in needs no locking beyond
/// the join itself. Requests with an empty address are skipped and absent
/// from the returned map. Dropping the returned future kills any ping
/// processes still running.
pub async fn run_probes(
    cfg: &RunnerConfig,
    requests: Vec<ProbeRequest>,
) -> HashMap<i64, RawProbe> {
    let semaphore = Arc::new(Semaphore::new(cfg.max_concurrent.max(1)));
    let mut join_set = JoinSet::new();

    for request in requests {
        if request.address.is_empty() {
            tracing::warn!("Skipping probe for host {}: empty address", request.host_id);
            continue;
        }

        let semaphore = semaphore.clone();
        let ping_path = cfg.ping_path.clone();
        let timeout = cfg.timeout;

        join_set.spawn(async move {
            // Permit acquisition only fails if the semaphore is closed,
            // which never happens here.
            let _permit = semaphore.acquire_owned().await.ok();

            // Jitter to avoid spawning the whole batch in the same tick
            let jitter = rand::random::<u64>() % 100;
            tokio::time::sleep(Duration::from_millis(jitter)).await;

            let raw = run_one_probe(&ping_path, &request, timeout).await;
            (request.host_id, raw)
        });
    }

    let mut results = HashMap::new();
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((host_id, raw)) => {
                results.insert(host_id, raw);
            }
            Err(e) => {
                tracing::error!("Probe task panicked: {}", e);
            }
        }
    }

    results
}

/// Invoke the check once: `ping -c <count> <address>`, bounded by the deadline.
async fn run_one_probe(ping_path: &str, request: &ProbeRequest, timeout: Duration) -> RawProbe {
    let child = Command::new(ping_path)
        .arg("-c")
        .arg(request.count.to_string())
        .arg(&request.address)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    let output = match tokio::time::timeout(timeout, child).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            tracing::error!(
                "Failed to launch check for host {} ({}): {}",
                request.host_id,
                request.address,
                e
            );
            return RawProbe::LaunchFailed {
                error: e.to_string(),
            };
        }
        Err(_) => {
            tracing::warn!(
                "Check for host {} ({}) exceeded {:?}, killed",
                request.host_id,
                request.address,
                timeout
            );
            return RawProbe::TimedOut { after: timeout };
        }
    };

    // A signal-terminated process has no exit code; fold it into -1 so the
    // classifier still sees a nonzero status.
    RawProbe::Completed {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}
