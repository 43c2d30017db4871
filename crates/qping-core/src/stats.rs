use crate::probe::RunResult;
use itertools::Itertools;

/// The minimum, maximum and average of a derived quantity, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricTriple {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

impl MetricTriple {
    /// Aggregate a set of samples, `None` if no samples exist.
    fn of(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let sum: f64 = samples.iter().sum();
        Some(Self {
            min: samples.iter().copied().fold(f64::INFINITY, f64::min),
            max: samples.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            avg: sum / samples.len() as f64,
        })
    }
}

/// Aggregate quality metrics derived from a completed run.
///
/// Latency and jitter are aggregated over answered probes only and are absent
/// when no samples exist.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    /// The percentage of probes which were lost.
    pub loss_pct: f64,
    /// Round trip latency over answered probes.
    pub latency: Option<MetricTriple>,
    /// Latency variation between consecutively answered probes.
    pub jitter: Option<MetricTriple>,
}

impl Stats {
    #[must_use]
    pub fn of(result: &RunResult) -> Self {
        let rtts = result
            .outcomes()
            .iter()
            .filter_map(|o| o.rtt())
            .map(|rtt| rtt.as_secs_f64() * 1e3)
            .collect::<Vec<_>>();
        let jitter = jitter_samples(result);
        let loss_pct = if result.count() == 0 {
            100.0
        } else {
            100.0 * result.lost() as f64 / result.count() as f64
        };
        Self {
            loss_pct,
            latency: MetricTriple::of(&rtts),
            jitter: MetricTriple::of(&jitter),
        }
    }
}

/// The absolute RTT deltas between answered probes with adjacent sequence
/// numbers.
///
/// A lost probe breaks adjacency and so contributes no sample on either side
/// of the gap. Fewer than two answered probes yield no samples at all.
fn jitter_samples(result: &RunResult) -> Vec<f64> {
    result
        .outcomes()
        .iter()
        .tuple_windows()
        .filter_map(|(a, b)| match (a.rtt(), b.rtt()) {
            (Some(x), Some(y)) => Some((x.as_secs_f64() - y.as_secs_f64()).abs() * 1e3),
            _ => None,
        })
        .collect()
}
