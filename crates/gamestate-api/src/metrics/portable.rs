//! Portable sampler built on the `sysinfo` crate.

use std::sync::{Mutex, PoisonError};

use sysinfo::System;

use super::{CpuReading, HostCounters, HostMetricsProvider, MetricsError};

/// Provider for hosts without procfs.
///
/// `sysinfo` keeps its own previous CPU counters and reports utilization
/// since the last refresh, so this provider hands back a ready-made
/// percentage instead of raw counters.
pub struct SysinfoProvider {
    system: Mutex<System>,
}

impl SysinfoProvider {
    /// Create the provider and take the initial CPU baseline.
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_usage();
        Self {
            system: Mutex::new(system),
        }
    }
}

impl Default for SysinfoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl HostMetricsProvider for SysinfoProvider {
    fn name(&self) -> &'static str {
        "sysinfo"
    }

    fn sample(&self) -> Result<HostCounters, MetricsError> {
        let mut system = self.system.lock().unwrap_or_else(PoisonError::into_inner);
        system.refresh_memory();
        system.refresh_cpu_usage();

        Ok(HostCounters {
            uptime_seconds: System::uptime(),
            total_mem: system.total_memory(),
            available_mem: system.available_memory(),
            cpu: CpuReading::Usage(f64::from(system.global_cpu_usage())),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn reports_memory_and_bounded_usage() {
        let provider = SysinfoProvider::new();
        let sample = provider.sample().unwrap();
        assert!(sample.total_mem > 0);
        let CpuReading::Usage(usage) = sample.cpu else {
            panic!("sysinfo provider must report a percentage");
        };
        assert!(usage >= 0.0);
    }
}
