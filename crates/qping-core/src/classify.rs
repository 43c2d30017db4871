use crate::mos;
use crate::stats::{MetricTriple, Stats};

/// The severity of a classified run.
///
/// Ordered so that the worst severity compares greatest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Ord, PartialOrd)]
pub enum Severity {
    Ok,
    Warning,
    Critical,
}

impl Severity {
    /// The monitoring-system exit code for this severity.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::Warning => 1,
            Self::Critical => 2,
        }
    }
}

/// A warning/critical threshold pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    pub warning: f64,
    pub critical: f64,
}

impl Threshold {
    #[must_use]
    pub const fn new(warning: f64, critical: f64) -> Self {
        Self { warning, critical }
    }

    /// Classify a metric where larger values are worse.
    #[must_use]
    pub fn classify_high(self, value: f64) -> Severity {
        if value >= self.critical {
            Severity::Critical
        } else if value >= self.warning {
            Severity::Warning
        } else {
            Severity::Ok
        }
    }

    /// Classify a metric where smaller values are worse.
    #[must_use]
    pub fn classify_low(self, value: f64) -> Severity {
        if value <= self.critical {
            Severity::Critical
        } else if value <= self.warning {
            Severity::Warning
        } else {
            Severity::Ok
        }
    }
}

/// The configured threshold pairs, each optional.
///
/// Latency and jitter are classified against their run averages. The MOS
/// thresholds are inverted, lower scores are worse.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Thresholds {
    pub loss: Option<Threshold>,
    pub rtt: Option<Threshold>,
    pub jitter: Option<Threshold>,
    pub mos: Option<Threshold>,
}

/// The classified verdict for a completed run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub loss_pct: f64,
    pub latency: Option<MetricTriple>,
    pub jitter: Option<MetricTriple>,
    pub mos: f64,
    pub severity: Severity,
}

impl Verdict {
    /// Classify aggregate metrics against the configured thresholds.
    ///
    /// Each metric is classified independently. An unconfigured threshold or
    /// an undefined metric contributes `Ok`. The overall severity is the
    /// worst of the per-metric severities.
    #[must_use]
    pub fn classify(stats: &Stats, thresholds: &Thresholds) -> Self {
        let mos = mos::estimate(stats);
        let loss = thresholds
            .loss
            .map_or(Severity::Ok, |t| t.classify_high(stats.loss_pct));
        let rtt = match (thresholds.rtt, stats.latency) {
            (Some(t), Some(latency)) => t.classify_high(latency.avg),
            _ => Severity::Ok,
        };
        let jitter = match (thresholds.jitter, stats.jitter) {
            (Some(t), Some(jitter)) => t.classify_high(jitter.avg),
            _ => Severity::Ok,
        };
        let mos_severity = thresholds
            .mos
            .map_or(Severity::Ok, |t| t.classify_low(mos));
        let severity = [loss, rtt, jitter, mos_severity]
            .into_iter()
            .max()
            .unwrap_or(Severity::Ok);
        Self {
            loss_pct: stats.loss_pct,
            latency: stats.latency,
            jitter: stats.jitter,
            mos,
            severity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn make_stats(loss_pct: f64, latency_avg: Option<f64>, jitter_avg: Option<f64>) -> Stats {
        let triple = |avg: f64| MetricTriple {
            min: avg,
            max: avg,
            avg,
        };
        Stats {
            loss_pct,
            latency: latency_avg.map(triple),
            jitter: jitter_avg.map(triple),
        }
    }

    #[test_case(5.0, Severity::Ok; "below warning")]
    #[test_case(10.0, Severity::Warning; "at warning")]
    #[test_case(15.0, Severity::Warning; "between warning and critical")]
    #[test_case(20.0, Severity::Critical; "at critical")]
    #[test_case(100.0, Severity::Critical; "above critical")]
    fn test_classify_high(value: f64, expected: Severity) {
        let threshold = Threshold::new(10.0, 20.0);
        assert_eq!(expected, threshold.classify_high(value));
    }

    #[test_case(4.4, Severity::Ok; "above warning")]
    #[test_case(4.0, Severity::Warning; "at warning")]
    #[test_case(3.6, Severity::Warning; "between warning and critical")]
    #[test_case(3.5, Severity::Critical; "at critical")]
    #[test_case(1.0, Severity::Critical; "below critical")]
    fn test_classify_low(value: f64, expected: Severity) {
        let threshold = Threshold::new(4.0, 3.5);
        assert_eq!(expected, threshold.classify_low(value));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::Warning);
        assert!(Severity::Warning > Severity::Ok);
        assert_eq!(0, Severity::Ok.exit_code());
        assert_eq!(1, Severity::Warning.exit_code());
        assert_eq!(2, Severity::Critical.exit_code());
    }

    #[test]
    fn test_overall_severity_is_worst() {
        let stats = make_stats(15.0, Some(45.0), Some(2.0));
        let thresholds = Thresholds {
            loss: Some(Threshold::new(10.0, 20.0)),
            rtt: Some(Threshold::new(75.0, 100.0)),
            jitter: Some(Threshold::new(20.0, 30.0)),
            mos: None,
        };
        let verdict = Verdict::classify(&stats, &thresholds);
        assert_eq!(Severity::Warning, verdict.severity);
    }

    #[test]
    fn test_unconfigured_thresholds_are_ok() {
        let stats = make_stats(100.0, None, None);
        let verdict = Verdict::classify(&stats, &Thresholds::default());
        assert_eq!(Severity::Ok, verdict.severity);
    }

    #[test]
    fn test_undefined_metric_is_ok() {
        // All probes lost: latency and jitter are undefined and contribute
        // Ok even with thresholds configured, loss still classifies.
        let stats = make_stats(100.0, None, None);
        let thresholds = Thresholds {
            loss: Some(Threshold::new(10.0, 20.0)),
            rtt: Some(Threshold::new(75.0, 100.0)),
            jitter: Some(Threshold::new(20.0, 30.0)),
            mos: None,
        };
        let verdict = Verdict::classify(&stats, &thresholds);
        assert_eq!(Severity::Critical, verdict.severity);
    }

    #[test]
    fn test_mos_inversion_prefers_warning() {
        // MOS ~3.6 with thresholds (4.0, 3.5) is a warning, not critical.
        let stats = make_stats(0.0, Some(330.0), Some(6.0));
        let thresholds = Thresholds {
            mos: Some(Threshold::new(4.0, 3.5)),
            ..Default::default()
        };
        let verdict = Verdict::classify(&stats, &thresholds);
        assert!(verdict.mos > 3.5 && verdict.mos < 4.0, "mos was {}", verdict.mos);
        assert_eq!(Severity::Warning, verdict.severity);
    }

    #[test]
    fn test_reference_scenario_is_ok() {
        let stats = make_stats(0.0, Some(45.272), Some(0.3178));
        let thresholds = Thresholds {
            loss: Some(Threshold::new(10.0, 20.0)),
            rtt: Some(Threshold::new(50.0, 100.0)),
            jitter: Some(Threshold::new(20.0, 30.0)),
            mos: Some(Threshold::new(4.0, 3.0)),
        };
        let verdict = Verdict::classify(&stats, &thresholds);
        assert_eq!(Severity::Ok, verdict.severity);
    }
}
