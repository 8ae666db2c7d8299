use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::metrics::{inc_outcome, observe_check};

pub mod tcp_connect;

#[cfg(test)]
mod test_support;

/// Ports probed when none are configured.
pub const COMMON_PORTS: [u16; 21] = [
    21, 22, 23, 25, 53, 80, 110, 111, 135, 139, 143, 389, 443, 445, 993, 995, 1723, 3306, 3389,
    5900, 8080,
];

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Ports and per-attempt timeout, with defaults resolved at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    ports: Vec<u16>,
    timeout: Duration,
}

impl ProbeConfig {
    pub fn new(ports: impl Into<Vec<u16>>, timeout: Duration) -> Self {
        let mut ports = ports.into();
        if ports.contains(&0) {
            warn!("ignoring port 0 in probe list");
            ports.retain(|&p| p != 0);
        }
        if ports.is_empty() {
            ports = COMMON_PORTS.to_vec();
        }
        let timeout = if timeout.is_zero() { DEFAULT_TIMEOUT } else { timeout };
        Self { ports, timeout }
    }

    pub fn ports(&self) -> &[u16] {
        &self.ports
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self::new(Vec::new(), Duration::ZERO)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeOutcome {
    Reachable,
    Refused,
    TimedOut,
    OtherError,
}

impl ProbeOutcome {
    /// Reachable and Refused both mean the host answered.
    pub fn is_positive(self) -> bool {
        matches!(self, ProbeOutcome::Reachable | ProbeOutcome::Refused)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProbeOutcome::Reachable => "reachable",
            ProbeOutcome::Refused => "refused",
            ProbeOutcome::TimedOut => "timed_out",
            ProbeOutcome::OtherError => "other_error",
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Prober {
    config: Arc<ProbeConfig>,
}

impl Prober {
    pub fn new(config: ProbeConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Reports whether `target` answers on any configured port.
    ///
    /// Every port is dialed concurrently. The first SYN/ACK or RST settles the
    /// verdict and tells the remaining attempts to give up; the call still
    /// waits for all of them so no task or socket outlives it.
    pub async fn check_host(&self, target: &str) -> bool {
        let start = Instant::now();
        let target: Arc<str> = Arc::from(target);
        let limit = self.config.timeout();
        let (settled_tx, settled_rx) = watch::channel(false);

        let mut probes = JoinSet::new();
        for &port in self.config.ports() {
            let target = target.clone();
            let settled = settled_rx.clone();
            probes.spawn(async move {
                let outcome = tcp_connect::probe_tcp(&target, port, limit, settled).await;
                (port, outcome)
            });
        }
        drop(settled_rx);

        let mut host_up = false;
        while let Some(joined) = probes.join_next().await {
            match joined {
                Ok((port, outcome)) => {
                    debug!("probe {}:{} -> {}", target, port, outcome);
                    inc_outcome(outcome);
                    if outcome.is_positive() && !host_up {
                        host_up = true;
                        settled_tx.send_replace(true);
                    }
                }
                Err(e) => warn!("probe task for {} did not finish: {}", target, e),
            }
        }

        let elapsed = start.elapsed();
        observe_check(host_up, elapsed);
        info!(
            "{} is {} ({} ports, {:?})",
            target,
            if host_up { "up" } else { "down" },
            self.config.ports().len(),
            elapsed
        );
        host_up
    }
}
