//! Linux counters read straight from `/proc`.
//!
//! Memory comes from `/proc/meminfo` rather than the installed-RAM figure
//! so the numbers stay correct inside containers and LXC guests, where
//! `meminfo` reflects the cgroup's view.

use std::path::{Path, PathBuf};

use super::{CpuReading, CpuTimes, HostCounters, HostMetricsProvider, MetricsError};

const KIB: u64 = 1024;

/// Provider reading `uptime`, `meminfo` and `stat` under a procfs root.
#[derive(Debug, Clone)]
pub struct ProcfsProvider {
    root: PathBuf,
}

impl ProcfsProvider {
    /// Create a provider rooted at `root` (normally `/proc`).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The procfs root this provider reads from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, file: &str) -> Result<String, MetricsError> {
        let path = self.root.join(file);
        std::fs::read_to_string(&path).map_err(|source| MetricsError::Io { path, source })
    }
}

impl HostMetricsProvider for ProcfsProvider {
    fn name(&self) -> &'static str {
        "procfs"
    }

    fn sample(&self) -> Result<HostCounters, MetricsError> {
        let uptime_seconds = parse_uptime(&self.read("uptime")?)?;
        let (total_mem, available_mem) = parse_meminfo(&self.read("meminfo")?)?;
        let cpu = parse_cpu_times(&self.read("stat")?)?;

        Ok(HostCounters {
            uptime_seconds,
            total_mem,
            available_mem,
            cpu: CpuReading::Times(cpu),
        })
    }
}

/// Whole seconds from the first field of `/proc/uptime` (`"350735.47 234388.90"`).
pub fn parse_uptime(contents: &str) -> Result<u64, MetricsError> {
    let field = contents
        .split_whitespace()
        .next()
        .ok_or_else(|| parse_error("uptime", "empty file"))?;
    let whole = field.split('.').next().unwrap_or(field);
    whole
        .parse()
        .map_err(|e| parse_error("uptime", format!("{field:?}: {e}")))
}

/// `(total, available)` bytes from `/proc/meminfo`.
///
/// Kernels older than 3.14 have no `MemAvailable`; for those the estimate
/// is `MemFree + Buffers + Cached`.
pub fn parse_meminfo(contents: &str) -> Result<(u64, u64), MetricsError> {
    let mut total = None;
    let mut available = None;
    let mut free_estimate: Option<u64> = None;

    for line in contents.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        let slot = match key.trim() {
            "MemTotal" => &mut total,
            "MemAvailable" => &mut available,
            "MemFree" | "Buffers" | "Cached" => {
                let kib = parse_kib(key, rest)?;
                free_estimate = Some(free_estimate.unwrap_or(0).saturating_add(kib));
                continue;
            }
            _ => continue,
        };
        *slot = Some(parse_kib(key, rest)?);
    }

    let total = total.ok_or_else(|| parse_error("meminfo", "missing MemTotal"))?;
    let available = available
        .or(free_estimate)
        .ok_or_else(|| parse_error("meminfo", "missing MemAvailable"))?;

    Ok((
        total.saturating_mul(KIB),
        available.min(total).saturating_mul(KIB),
    ))
}

/// Aggregate CPU counters from the `cpu ` line of `/proc/stat`.
///
/// Idle time includes `iowait`. Total covers user, nice, system, idle,
/// iowait, irq, softirq and steal; guest time is already folded into user
/// by the kernel. At least the first four fields must be present.
pub fn parse_cpu_times(contents: &str) -> Result<CpuTimes, MetricsError> {
    let line = contents
        .lines()
        .find(|l| l.starts_with("cpu "))
        .ok_or_else(|| parse_error("stat", "no aggregate cpu line"))?;

    let fields = line
        .split_whitespace()
        .skip(1)
        .take(8)
        .map(|f| {
            f.parse::<u64>()
                .map_err(|e| parse_error("stat", format!("{f:?}: {e}")))
        })
        .collect::<Result<Vec<u64>, _>>()?;

    let [user, nice, system, idle, rest @ ..] = fields.as_slice() else {
        return Err(parse_error(
            "stat",
            format!("expected at least 4 cpu fields, got {}", fields.len()),
        ));
    };
    let iowait = rest.first().copied().unwrap_or(0);

    let total = [*user, *nice, *system, *idle]
        .iter()
        .chain(rest.iter())
        .fold(0u64, |acc, v| acc.saturating_add(*v));

    Ok(CpuTimes {
        idle: idle.saturating_add(iowait),
        total,
    })
}

fn parse_kib(key: &str, rest: &str) -> Result<u64, MetricsError> {
    let value = rest.trim().trim_end_matches("kB").trim();
    value
        .parse()
        .map_err(|e| parse_error("meminfo", format!("{key}: {value:?}: {e}")))
}

fn parse_error(what: &'static str, reason: impl Into<String>) -> MetricsError {
    MetricsError::Parse {
        what,
        reason: reason.into(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const MEMINFO: &str = "\
MemTotal:        8048164 kB
MemFree:          512000 kB
MemAvailable:    4024082 kB
Buffers:          100000 kB
Cached:          2000000 kB
SwapTotal:             0 kB
";

    const STAT: &str = "\
cpu  4705 356 584 3699176 23060 0 277 0 0 0
cpu0 1393 280 283 925207 5672 0 181 0 0 0
intr 1462898 0 0
";

    #[test]
    fn uptime_truncates_fraction() {
        assert_eq!(parse_uptime("350735.47 234388.90\n").unwrap(), 350_735);
    }

    #[test]
    fn uptime_rejects_empty() {
        assert!(parse_uptime("").is_err());
    }

    #[test]
    fn meminfo_reports_bytes() {
        let (total, available) = parse_meminfo(MEMINFO).unwrap();
        assert_eq!(total, 8_048_164 * 1024);
        assert_eq!(available, 4_024_082 * 1024);
    }

    #[test]
    fn meminfo_estimates_available_on_old_kernels() {
        let old = "MemTotal: 1000 kB\nMemFree: 100 kB\nBuffers: 20 kB\nCached: 30 kB\n";
        let (total, available) = parse_meminfo(old).unwrap();
        assert_eq!(total, 1000 * 1024);
        assert_eq!(available, 150 * 1024);
    }

    #[test]
    fn meminfo_requires_total() {
        assert!(parse_meminfo("MemAvailable: 10 kB\n").is_err());
    }

    #[test]
    fn stat_sums_first_eight_fields() {
        let times = parse_cpu_times(STAT).unwrap();
        assert_eq!(times.idle, 3_699_176 + 23_060);
        assert_eq!(times.total, 4705 + 356 + 584 + 3_699_176 + 23_060 + 277);
    }

    #[test]
    fn stat_accepts_four_fields() {
        let times = parse_cpu_times("cpu 10 0 10 80\n").unwrap();
        assert_eq!(times, CpuTimes { idle: 80, total: 100 });
    }

    #[test]
    fn stat_rejects_short_line() {
        assert!(parse_cpu_times("cpu 1 2 3\n").is_err());
        assert!(parse_cpu_times("intr 1 2 3 4\n").is_err());
    }

    #[test]
    fn missing_root_is_an_io_error() {
        let provider = ProcfsProvider::new("/nonexistent/procfs/root");
        assert!(matches!(provider.sample(), Err(MetricsError::Io { .. })));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn live_proc_is_readable() {
        let sample = ProcfsProvider::new("/proc").sample().unwrap();
        assert!(sample.total_mem > 0);
        assert!(sample.available_mem <= sample.total_mem);
    }
}
