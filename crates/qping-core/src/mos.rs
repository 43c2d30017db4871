//! Mean Opinion Score estimation.
//!
//! Implements the widely published E-model style approximation for scoring
//! call quality from latency, jitter and loss, as used by `PingPlotter`:
//! <https://www.pingman.com/kb/article/how-is-mos-calculated-in-pingplotter-pro-50.html>

use crate::stats::Stats;

/// The floor value, reported when no probes are answered.
pub const MOS_MIN: f64 = 1.0;

/// The ceiling value.
pub const MOS_MAX: f64 = 4.5;

/// The fixed per-packet protocol handling delay, in milliseconds.
const CODEC_DELAY_MS: f64 = 10.0;

/// Estimate a Mean Opinion Score from aggregate run metrics.
///
/// Jitter is weighted at twice its face value when computing the effective
/// latency. The R-factor curve deducts gently below 160 ms of effective
/// latency and aggressively above it, then loses 2.5 points per percent of
/// packet loss. The resulting score is clamped to [[`MOS_MIN`], [`MOS_MAX`]].
#[must_use]
pub fn estimate(stats: &Stats) -> f64 {
    let Some(latency) = stats.latency else {
        return MOS_MIN;
    };
    let jitter_avg = stats.jitter.map_or(0.0, |j| j.avg);
    let effective_latency = latency.avg + jitter_avg * 2.0 + CODEC_DELAY_MS;
    let mut r = if effective_latency < 160.0 {
        93.2 - effective_latency / 40.0
    } else {
        93.2 - (effective_latency - 120.0) / 10.0
    };
    r = (r - stats.loss_pct * 2.5).clamp(0.0, 100.0);
    let mos = 1.0 + 0.035 * r + 0.000_007 * r * (r - 60.0) * (100.0 - r);
    mos.clamp(MOS_MIN, MOS_MAX)
}
