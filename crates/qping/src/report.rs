use crate::config::OutputMode;
use qping_core::{MetricTriple, Protocol, Severity, Threshold, Thresholds, Verdict};
use std::time::Duration;

const NAN_TRIPLE: MetricTriple = MetricTriple {
    min: f64::NAN,
    max: f64::NAN,
    avg: f64::NAN,
};

/// Renders a classified [`Verdict`] in one of the supported output modes.
pub struct Report<'a> {
    a_side: &'a str,
    z_side: &'a str,
    destination: &'a str,
    protocol: Protocol,
    count: u16,
    lost: usize,
    timeout: Duration,
    thresholds: Thresholds,
    verdict: &'a Verdict,
}

impl<'a> Report<'a> {
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        a_side: &'a str,
        z_side: &'a str,
        destination: &'a str,
        protocol: Protocol,
        count: u16,
        lost: usize,
        timeout: Duration,
        thresholds: Thresholds,
        verdict: &'a Verdict,
    ) -> Self {
        Self {
            a_side,
            z_side,
            destination,
            protocol,
            count,
            lost,
            timeout,
            thresholds,
            verdict,
        }
    }

    #[must_use]
    pub fn render(&self, mode: OutputMode) -> String {
        match mode {
            OutputMode::Normal => self.render_normal(),
            OutputMode::Nagios => self.render_nagios(),
            OutputMode::Checkmk => self.render_checkmk(),
        }
    }

    fn render_normal(&self) -> String {
        let mut out = format!(
            "Statistics for {} to {}:\n - packet loss: {}/{} ({:.2}%)\n",
            self.a_side, self.z_side, self.lost, self.count, self.verdict.loss_pct
        );
        if let Some(latency) = self.verdict.latency {
            let jitter = self.verdict.jitter.unwrap_or(NAN_TRIPLE);
            out.push_str(&format!(
                " - latency (MIN/MAX/AVG): {:.2}/{:.2}/{:.2} ms\n",
                latency.min, latency.max, latency.avg
            ));
            out.push_str(&format!(
                " - jitter (MIN/MAX/AVG): {:.2}/{:.2}/{:.2} ms\n",
                jitter.min, jitter.max, jitter.avg
            ));
            out.push_str(&format!(" - MOS: {:.1}\n", self.verdict.mos));
        }
        out
    }

    fn render_nagios(&self) -> String {
        let (a, z, dest) = (self.a_side, self.z_side, self.destination);
        if self.verdict.latency.is_none() {
            return format!(
                "2 {a}_to_{z}_loss loss={:.2} {dest} - no reply\n\
                 2 {a}_to_{z}_delay - no reply\n\
                 2 {a}_to_{z}_jitter - no reply\n\
                 2 {a}_to_{z}_mos - no reply\n",
                self.verdict.loss_pct
            );
        }
        let latency = self.verdict.latency.unwrap_or(NAN_TRIPLE);
        let jitter = self.verdict.jitter.unwrap_or(NAN_TRIPLE);
        let timeout_ms = self.timeout.as_millis();
        let loss = self
            .thresholds
            .loss
            .map_or(Severity::Ok, |t| t.classify_high(self.verdict.loss_pct));
        let rtt = self
            .thresholds
            .rtt
            .map_or(Severity::Ok, |t| t.classify_high(latency.avg));
        let jit = self
            .thresholds
            .jitter
            .map_or(Severity::Ok, |t| t.classify_high(jitter.avg));
        let mos = self
            .thresholds
            .mos
            .map_or(Severity::Ok, |t| t.classify_low(self.verdict.mos));
        let (loss_warn, loss_crit) = warn_crit(self.thresholds.loss);
        let (rtt_warn, rtt_crit) = warn_crit(self.thresholds.rtt);
        let (jitter_warn, jitter_crit) = warn_crit(self.thresholds.jitter);
        let (mos_warn, mos_crit) = warn_crit(self.thresholds.mos);
        format!(
            "{} {a}_to_{z}_loss loss={:.2};{loss_warn:.2};{loss_crit:.2};0;100 {dest} - {:.2}% packets lost\n\
             {} {a}_to_{z}_delay delay={:.2};{rtt_warn:.2};{rtt_crit:.2};0;{timeout_ms} {dest} - {:.2} ms delay\n\
             {} {a}_to_{z}_jitter jitter={:.2};{jitter_warn:.2};{jitter_crit:.2};0;{timeout_ms} {dest} - {:.2} ms jitter\n\
             {} {a}_to_{z}_mos mos={:.1};{mos_warn:.1};{mos_crit:.1};0.0;5.0 {dest} - {:.1} mos score\n",
            loss.exit_code(),
            self.verdict.loss_pct,
            self.verdict.loss_pct,
            rtt.exit_code(),
            latency.avg,
            latency.avg,
            jit.exit_code(),
            jitter.avg,
            jitter.avg,
            mos.exit_code(),
            self.verdict.mos,
            self.verdict.mos,
        )
    }

    fn render_checkmk(&self) -> String {
        let proto = match self.protocol {
            Protocol::Icmp => "icmp",
            Protocol::Udp => "udp",
        };
        let latency = self.verdict.latency.unwrap_or(NAN_TRIPLE);
        let jitter = self.verdict.jitter.unwrap_or(NAN_TRIPLE);
        let mos = if self.verdict.latency.is_some() {
            self.verdict.mos
        } else {
            f64::NAN
        };
        format!(
            "<<<qping>>>\n{}_to_{} {} {proto} {:.2} {:.2} {:.2} {:.2} {:.2} {:.2} {:.2} {:.2}\n",
            self.a_side,
            self.z_side,
            self.destination,
            self.verdict.loss_pct,
            latency.min,
            latency.max,
            latency.avg,
            jitter.min,
            jitter.max,
            jitter.avg,
            mos,
        )
    }
}

fn warn_crit(threshold: Option<Threshold>) -> (f64, f64) {
    threshold.map_or((f64::NAN, f64::NAN), |t| (t.warning, t.critical))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> Thresholds {
        Thresholds {
            loss: Some(Threshold::new(10.0, 20.0)),
            rtt: Some(Threshold::new(75.0, 100.0)),
            jitter: Some(Threshold::new(20.0, 30.0)),
            mos: Some(Threshold::new(4.0, 3.0)),
        }
    }

    fn verdict() -> Verdict {
        Verdict {
            loss_pct: 10.0,
            latency: Some(MetricTriple {
                min: 40.0,
                max: 60.0,
                avg: 45.25,
            }),
            jitter: Some(MetricTriple {
                min: 0.1,
                max: 2.5,
                avg: 0.5,
            }),
            mos: 4.38,
            severity: Severity::Warning,
        }
    }

    fn all_lost_verdict() -> Verdict {
        Verdict {
            loss_pct: 100.0,
            latency: None,
            jitter: None,
            mos: 1.0,
            severity: Severity::Critical,
        }
    }

    fn report<'a>(verdict: &'a Verdict, lost: usize) -> Report<'a> {
        Report::new(
            "sfo",
            "nyc",
            "192.0.2.1",
            Protocol::Icmp,
            10,
            lost,
            Duration::from_millis(3000),
            thresholds(),
            verdict,
        )
    }

    #[test]
    fn test_normal() {
        let verdict = verdict();
        let expected = "\
            Statistics for sfo to nyc:\n \
            - packet loss: 1/10 (10.00%)\n \
            - latency (MIN/MAX/AVG): 40.00/60.00/45.25 ms\n \
            - jitter (MIN/MAX/AVG): 0.10/2.50/0.50 ms\n \
            - MOS: 4.4\n";
        assert_eq!(expected, report(&verdict, 1).render(OutputMode::Normal));
    }

    #[test]
    fn test_normal_all_lost() {
        let verdict = all_lost_verdict();
        let expected = "\
            Statistics for sfo to nyc:\n \
            - packet loss: 10/10 (100.00%)\n";
        assert_eq!(expected, report(&verdict, 10).render(OutputMode::Normal));
    }

    #[test]
    fn test_nagios() {
        let verdict = verdict();
        let expected = "\
            1 sfo_to_nyc_loss loss=10.00;10.00;20.00;0;100 192.0.2.1 - 10.00% packets lost\n\
            0 sfo_to_nyc_delay delay=45.25;75.00;100.00;0;3000 192.0.2.1 - 45.25 ms delay\n\
            0 sfo_to_nyc_jitter jitter=0.50;20.00;30.00;0;3000 192.0.2.1 - 0.50 ms jitter\n\
            0 sfo_to_nyc_mos mos=4.4;4.0;3.0;0.0;5.0 192.0.2.1 - 4.4 mos score\n";
        assert_eq!(expected, report(&verdict, 1).render(OutputMode::Nagios));
    }

    #[test]
    fn test_nagios_all_lost() {
        let verdict = all_lost_verdict();
        let expected = "\
            2 sfo_to_nyc_loss loss=100.00 192.0.2.1 - no reply\n\
            2 sfo_to_nyc_delay - no reply\n\
            2 sfo_to_nyc_jitter - no reply\n\
            2 sfo_to_nyc_mos - no reply\n";
        assert_eq!(expected, report(&verdict, 10).render(OutputMode::Nagios));
    }

    #[test]
    fn test_checkmk() {
        let verdict = verdict();
        let expected = "<<<qping>>>\n\
            sfo_to_nyc 192.0.2.1 icmp 10.00 40.00 60.00 45.25 0.10 2.50 0.50 4.38\n";
        assert_eq!(expected, report(&verdict, 1).render(OutputMode::Checkmk));
    }

    #[test]
    fn test_checkmk_all_lost() {
        let verdict = all_lost_verdict();
        let expected = "<<<qping>>>\n\
            sfo_to_nyc 192.0.2.1 icmp 100.00 NaN NaN NaN NaN NaN NaN NaN\n";
        assert_eq!(expected, report(&verdict, 10).render(OutputMode::Checkmk));
    }
}
