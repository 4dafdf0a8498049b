use std::{
    future::Future,
    time::{Duration, Instant},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ProbeError;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;
pub const DEFAULT_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessPolicy {
    pub max_attempts: u32,
    pub interval_ms: u64,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self { max_attempts: DEFAULT_MAX_ATTEMPTS, interval_ms: DEFAULT_INTERVAL_MS }
    }
}

impl ReadinessPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self { max_attempts, interval_ms: interval.as_millis() as u64 }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready { attempts: u32, elapsed: Duration },
    TimedOut { attempts: u32, elapsed: Duration },
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Readiness::Ready { attempts, .. } | Readiness::TimedOut { attempts, .. } => *attempts,
        }
    }
}

/// Bounded polling of a single readiness check.
#[derive(Debug, Clone)]
pub struct ReadinessProbe {
    name: String,
    policy: ReadinessPolicy,
    quiet: bool,
}

impl ReadinessProbe {
    pub fn new(name: impl Into<String>, policy: ReadinessPolicy) -> Self {
        Self { name: name.into(), policy, quiet: false }
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Calls `check` until it returns `Ok(true)` or the attempt budget is spent.
    ///
    /// The probe sleeps only between attempts, so a check that never passes
    /// costs `(max_attempts - 1) * interval` plus the time spent in `check`.
    /// A check error counts as "not ready yet".
    pub async fn wait_until_ready<F, Fut>(&self, mut check: F) -> Readiness
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool, ProbeError>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let started = Instant::now();

        for attempt in 1..=max_attempts {
            match check().await {
                Ok(true) => {
                    if !self.quiet {
                        info!("{} is ready", self.name);
                    }
                    return Readiness::Ready { attempts: attempt, elapsed: started.elapsed() };
                }
                Ok(false) => {}
                Err(e) => debug!("{} check {}/{} failed: {}", self.name, attempt, max_attempts, e),
            }

            if attempt < max_attempts {
                if !self.quiet {
                    info!("Waiting for {}... ({}/{})", self.name, attempt, max_attempts);
                }
                tokio::time::sleep(self.policy.interval()).await;
            }
        }

        Readiness::TimedOut { attempts: max_attempts, elapsed: started.elapsed() }
    }
}
