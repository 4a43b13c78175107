//! Host metrics sampling with lifetime peak tracking.
//!
//! Raw counters come from a [`HostMetricsProvider`]; the platform-specific
//! part stops there. [`HostMetrics`] turns consecutive samples into a
//! [`MetricsSnapshot`]: CPU utilization is the busy share of the time that
//! elapsed between two samples, and the peak CPU and memory values are
//! carried for as long as the registry lives.
//!
//! The registry is owned by the server, not by the listener, so restarting
//! the HTTP listener does not reset peaks.

mod portable;
mod procfs;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use portable::SysinfoProvider;
pub use procfs::{ProcfsProvider, parse_cpu_times, parse_meminfo, parse_uptime};

/// Errors raised while sampling host counters.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// A counter source could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A counter source had unexpected contents.
    #[error("failed to parse {what}: {reason}")]
    Parse {
        /// Which counter source was being parsed.
        what: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}

/// Cumulative CPU time-in-state counters, in provider-defined ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuTimes {
    /// Ticks spent idle (including I/O wait).
    pub idle: u64,
    /// Ticks spent in any state.
    pub total: u64,
}

/// CPU reading as reported by a provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CpuReading {
    /// Raw cumulative counters; utilization is derived from the delta
    /// against the previous sample.
    Times(CpuTimes),
    /// Utilization percentage already computed by the provider.
    Usage(f64),
}

/// One raw sample of host counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostCounters {
    /// OS-reported uptime in seconds.
    pub uptime_seconds: u64,
    /// Total memory visible to this host or container, in bytes.
    pub total_mem: u64,
    /// Memory currently available for new allocations, in bytes.
    pub available_mem: u64,
    /// CPU reading.
    pub cpu: CpuReading,
}

/// A source of raw host counters.
pub trait HostMetricsProvider: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Read the current counters.
    fn sample(&self) -> Result<HostCounters, MetricsError>;
}

/// Which provider to use for host metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricsBackend {
    /// `procfs` on Linux, `sysinfo` elsewhere.
    #[default]
    Auto,
    /// Read `/proc` directly.
    Procfs,
    /// Use the portable `sysinfo` crate.
    Sysinfo,
}

/// Host metrics as served by `GET /api/host`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    /// OS uptime in seconds.
    pub uptime_seconds: u64,
    /// Total memory in bytes.
    pub total_mem: u64,
    /// CPU utilization since the previous sample, in percent.
    pub current_cpu: f64,
    /// Highest CPU utilization observed by this registry.
    pub max_cpu: f64,
    /// Memory in use, in bytes.
    pub current_mem: u64,
    /// Highest memory use observed by this registry.
    pub max_mem: u64,
    /// Unix time of the sample.
    pub timestamp: i64,
}

#[derive(Debug, Default)]
struct SamplerState {
    /// Set once the first sample has been taken.
    primed: bool,
    previous: Option<CpuTimes>,
    peak_cpu: f64,
    peak_mem: u64,
}

/// Process-scoped metrics registry.
///
/// Holds the provider together with the previous CPU counters and the
/// running peaks. All mutable state sits behind one mutex so concurrent
/// `/api/host` requests see a consistent delta and peak pair.
pub struct HostMetrics {
    provider: Box<dyn HostMetricsProvider>,
    state: Mutex<SamplerState>,
}

impl core::fmt::Debug for HostMetrics {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HostMetrics")
            .field("provider", &self.provider.name())
            .finish_non_exhaustive()
    }
}

impl HostMetrics {
    /// Create a registry around an explicit provider.
    pub fn new(provider: Box<dyn HostMetricsProvider>) -> Self {
        Self {
            provider,
            state: Mutex::new(SamplerState::default()),
        }
    }

    /// Create a registry for the configured backend.
    pub fn from_backend(backend: MetricsBackend, procfs_root: &Path) -> Self {
        let provider: Box<dyn HostMetricsProvider> = match backend {
            MetricsBackend::Procfs => Box::new(ProcfsProvider::new(procfs_root)),
            MetricsBackend::Sysinfo => Box::new(SysinfoProvider::new()),
            MetricsBackend::Auto if cfg!(target_os = "linux") => {
                Box::new(ProcfsProvider::new(procfs_root))
            }
            MetricsBackend::Auto => Box::new(SysinfoProvider::new()),
        };
        debug!(provider = provider.name(), "host metrics provider selected");
        Self::new(provider)
    }

    /// Name of the active provider.
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Take a sample and fold it into the running peaks.
    ///
    /// The first sample only records the CPU baseline and reports 0%.
    pub fn sample(&self) -> Result<MetricsSnapshot, MetricsError> {
        let counters = self.provider.sample()?;
        let current_mem = counters.total_mem.saturating_sub(counters.available_mem);

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let first = !state.primed;
        state.primed = true;

        let current_cpu = match counters.cpu {
            CpuReading::Times(now) => {
                let usage = state
                    .previous
                    .map_or(0.0, |previous| cpu_utilization(previous, now));
                state.previous = Some(now);
                usage
            }
            // A provider-side percentage covers the interval since the
            // provider was built, not since a sample of ours.
            CpuReading::Usage(_) if first => 0.0,
            CpuReading::Usage(percent) => round_percent(percent.clamp(0.0, 100.0)),
        };

        state.peak_cpu = state.peak_cpu.max(current_cpu);
        state.peak_mem = state.peak_mem.max(current_mem);

        Ok(MetricsSnapshot {
            uptime_seconds: counters.uptime_seconds,
            total_mem: counters.total_mem,
            current_cpu,
            max_cpu: state.peak_cpu,
            current_mem,
            max_mem: state.peak_mem,
            timestamp: chrono::Utc::now().timestamp(),
        })
    }
}

/// Busy share of the interval between two counter samples, in percent,
/// rounded to two decimals.
///
/// Returns 0 when no time elapsed or the counters went backwards (counter
/// reset, provider swap).
#[allow(clippy::cast_precision_loss)]
pub fn cpu_utilization(previous: CpuTimes, now: CpuTimes) -> f64 {
    let (Some(total), Some(idle)) = (
        now.total.checked_sub(previous.total),
        now.idle.checked_sub(previous.idle),
    ) else {
        return 0.0;
    };
    if total == 0 {
        return 0.0;
    }

    // u64 -> f64 loses precision only past 2^53 ticks of delta.
    let idle_share = idle.min(total) as f64 / total as f64;
    round_percent((1.0 - idle_share) * 100.0)
}

fn round_percent(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    struct ScriptedProvider {
        samples: Mutex<VecDeque<HostCounters>>,
    }

    impl ScriptedProvider {
        fn new(samples: Vec<HostCounters>) -> Self {
            Self {
                samples: Mutex::new(samples.into()),
            }
        }
    }

    impl HostMetricsProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn sample(&self) -> Result<HostCounters, MetricsError> {
            self.samples
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| MetricsError::Parse {
                    what: "script",
                    reason: "exhausted".to_owned(),
                })
        }
    }

    fn counters(idle: u64, total: u64, used: u64) -> HostCounters {
        HostCounters {
            uptime_seconds: 100,
            total_mem: 1000,
            available_mem: 1000 - used,
            cpu: CpuReading::Times(CpuTimes { idle, total }),
        }
    }

    #[test]
    fn utilization_is_busy_share_of_delta() {
        let prev = CpuTimes { idle: 100, total: 200 };
        let now = CpuTimes { idle: 175, total: 300 };
        assert_eq!(cpu_utilization(prev, now), 25.0);
    }

    #[test]
    fn utilization_rounds_to_two_decimals() {
        let prev = CpuTimes::default();
        let now = CpuTimes { idle: 2, total: 3 };
        assert_eq!(cpu_utilization(prev, now), 33.33);
    }

    #[test]
    fn utilization_is_zero_without_elapsed_time() {
        let t = CpuTimes { idle: 10, total: 20 };
        assert_eq!(cpu_utilization(t, t), 0.0);
    }

    #[test]
    fn utilization_is_zero_when_counters_go_backwards() {
        let prev = CpuTimes { idle: 500, total: 1000 };
        let now = CpuTimes { idle: 10, total: 20 };
        assert_eq!(cpu_utilization(prev, now), 0.0);
    }

    #[test]
    fn first_sample_is_zero_baseline() {
        let metrics = HostMetrics::new(Box::new(ScriptedProvider::new(vec![counters(
            50, 100, 300,
        )])));
        let snap = metrics.sample().unwrap();
        assert_eq!(snap.current_cpu, 0.0);
        assert_eq!(snap.max_cpu, 0.0);
        assert_eq!(snap.current_mem, 300);
        assert_eq!(snap.max_mem, 300);
        assert_eq!(snap.total_mem, 1000);
    }

    #[test]
    fn peaks_never_decrease() {
        let metrics = HostMetrics::new(Box::new(ScriptedProvider::new(vec![
            counters(0, 0, 200),
            counters(20, 100, 600),  // 80% busy
            counters(110, 200, 100), // 10% busy
            counters(160, 300, 400), // 50% busy
        ])));

        let snaps: Vec<MetricsSnapshot> = (0..4).map(|_| metrics.sample().unwrap()).collect();
        let currents: Vec<f64> = snaps.iter().map(|s| s.current_cpu).collect();
        assert_eq!(currents, vec![0.0, 80.0, 10.0, 50.0]);

        let max_cpu: Vec<f64> = snaps.iter().map(|s| s.max_cpu).collect();
        assert_eq!(max_cpu, vec![0.0, 80.0, 80.0, 80.0]);

        let max_mem: Vec<u64> = snaps.iter().map(|s| s.max_mem).collect();
        assert_eq!(max_mem, vec![200, 600, 600, 600]);
    }

    #[test]
    fn provider_usage_is_clamped_and_rounded() {
        let mut baseline = counters(0, 0, 0);
        baseline.cpu = CpuReading::Usage(10.0);
        let mut high = counters(0, 0, 0);
        high.cpu = CpuReading::Usage(123.456);
        let mut fractional = counters(0, 0, 0);
        fractional.cpu = CpuReading::Usage(33.336);
        let metrics = HostMetrics::new(Box::new(ScriptedProvider::new(vec![
            baseline, high, fractional,
        ])));
        metrics.sample().unwrap();
        assert_eq!(metrics.sample().unwrap().current_cpu, 100.0);
        assert_eq!(metrics.sample().unwrap().current_cpu, 33.34);
    }

    #[test]
    fn first_provider_usage_is_zero_baseline() {
        let mut first = counters(0, 0, 0);
        first.cpu = CpuReading::Usage(50.0);
        let mut second = counters(0, 0, 0);
        second.cpu = CpuReading::Usage(40.0);
        let metrics = HostMetrics::new(Box::new(ScriptedProvider::new(vec![first, second])));

        let baseline = metrics.sample().unwrap();
        assert_eq!(baseline.current_cpu, 0.0);
        assert_eq!(baseline.max_cpu, 0.0);

        let next = metrics.sample().unwrap();
        assert_eq!(next.current_cpu, 40.0);
        assert_eq!(next.max_cpu, 40.0);
    }

    #[test]
    fn provider_failure_propagates() {
        let metrics = HostMetrics::new(Box::new(ScriptedProvider::new(Vec::new())));
        assert!(matches!(metrics.sample(), Err(MetricsError::Parse { .. })));
    }

    #[test]
    fn backend_names_deserialize_lowercase() {
        let backend: MetricsBackend = serde_yml::from_str("sysinfo").unwrap();
        assert_eq!(backend, MetricsBackend::Sysinfo);
        let backend: MetricsBackend = serde_yml::from_str("procfs").unwrap();
        assert_eq!(backend, MetricsBackend::Procfs);
    }

    #[test]
    fn explicit_backends_pick_their_provider() {
        let procfs = HostMetrics::from_backend(MetricsBackend::Procfs, Path::new("/proc"));
        assert_eq!(procfs.provider_name(), "procfs");
        let portable = HostMetrics::from_backend(MetricsBackend::Sysinfo, Path::new("/proc"));
        assert_eq!(portable.provider_name(), "sysinfo");
    }
}
