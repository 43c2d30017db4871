use crate::config::RunConfig;
use crate::error::Result;
use crate::net::Network;
use crate::probe::{Probe, ProbeOutcome, ProbeStatus, RunResult};
use crate::types::{ProbeId, Sequence};
use std::time::SystemTime;
use tracing::instrument;

/// Run a bounded sequence of probes against a target.
#[derive(Debug, Clone)]
pub struct Runner<F> {
    config: RunConfig,
    identifier: ProbeId,
    publish: F,
}

impl<F: Fn(&ProbeOutcome)> Runner<F> {
    #[instrument(skip_all, level = "trace")]
    pub fn new(config: &RunConfig, identifier: ProbeId, publish: F) -> Self {
        tracing::debug!(?config);
        Self {
            config: *config,
            identifier,
            publish,
        }
    }

    /// Run the probe sequence and collect the outcome of every probe.
    ///
    /// Probes are strictly serial: each probe waits for its matching reply or
    /// its timeout before the next probe is sent. Lost probes are never
    /// retransmitted. Each outcome is published as it resolves.
    #[instrument(skip(self, network), level = "trace")]
    pub fn run<N: Network>(self, mut network: N) -> Result<RunResult> {
        let count = self.config.count.0;
        let mut outcomes = Vec::with_capacity(usize::from(count));
        for seq in 0..count {
            let sequence = Sequence(seq);
            let sent = SystemTime::now();
            network.send_probe(Probe::new(sequence, self.identifier, sent))?;
            let status = self.recv_until(&mut network, sequence, sent)?;
            let outcome = ProbeOutcome::new(sequence, status);
            (self.publish)(&outcome);
            outcomes.push(outcome);
        }
        Ok(RunResult::new(outcomes))
    }

    /// Wait for the reply matching `sequence` within the probe timeout.
    ///
    /// A reply for an earlier sequence number is a late arrival of a probe
    /// already recorded as lost and is discarded without consuming the
    /// remaining budget.
    fn recv_until<N: Network>(
        &self,
        network: &mut N,
        sequence: Sequence,
        sent: SystemTime,
    ) -> Result<ProbeStatus> {
        let deadline = sent + self.config.timeout;
        while SystemTime::now() < deadline {
            if let Some(resp) = network.recv_probe()? {
                if resp.sequence == sequence {
                    let rtt = resp.received.duration_since(sent).unwrap_or_default();
                    return Ok(ProbeStatus::Answered(rtt));
                }
                tracing::debug!(?resp, "discarded stale response");
            }
        }
        Ok(ProbeStatus::Lost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::MockNetwork;
    use crate::probe::Response;
    use std::cell::RefCell;
    use std::time::Duration;

    fn make_config(count: u16, timeout: Duration) -> RunConfig {
        RunConfig {
            count: crate::types::ProbeCount(count),
            timeout,
        }
    }

    #[test]
    fn test_all_answered() -> anyhow::Result<()> {
        let mut network = MockNetwork::new();
        network.expect_send_probe().times(3).returning(|_| Ok(()));
        let mut next_seq = 0_u16;
        network.expect_recv_probe().returning(move || {
            let resp = Response::new(Sequence(next_seq), SystemTime::now());
            next_seq += 1;
            Ok(Some(resp))
        });
        let config = make_config(3, Duration::from_millis(100));
        let runner = Runner::new(&config, ProbeId(1), |_| {});
        let result = runner.run(network)?;
        assert_eq!(3, result.count());
        assert_eq!(3, result.answered());
        assert!(result
            .outcomes()
            .iter()
            .enumerate()
            .all(|(i, o)| usize::from(o.sequence) == i));
        Ok(())
    }

    #[test]
    fn test_all_lost() -> anyhow::Result<()> {
        let mut network = MockNetwork::new();
        network.expect_send_probe().times(2).returning(|_| Ok(()));
        network.expect_recv_probe().returning(|| Ok(None));
        let config = make_config(2, Duration::from_millis(10));
        let runner = Runner::new(&config, ProbeId(1), |_| {});
        let result = runner.run(network)?;
        assert_eq!(2, result.count());
        assert_eq!(2, result.lost());
        assert_eq!(
            vec![Sequence(0), Sequence(1)],
            result
                .outcomes()
                .iter()
                .map(|o| o.sequence)
                .collect::<Vec<_>>()
        );
        Ok(())
    }

    #[test]
    fn test_stale_response_discarded() -> anyhow::Result<()> {
        let mut network = MockNetwork::new();
        network.expect_send_probe().times(2).returning(|_| Ok(()));
        network
            .expect_recv_probe()
            .times(1)
            .returning(|| Ok(Some(Response::new(Sequence(0), SystemTime::now()))));
        // A late duplicate of the first reply arrives while we wait for the
        // second probe and must not be taken as its answer.
        network
            .expect_recv_probe()
            .times(1)
            .returning(|| Ok(Some(Response::new(Sequence(0), SystemTime::now()))));
        network.expect_recv_probe().returning(|| Ok(None));
        let config = make_config(2, Duration::from_millis(10));
        let runner = Runner::new(&config, ProbeId(1), |_| {});
        let result = runner.run(network)?;
        assert!(result.outcomes()[0].is_answered());
        assert_eq!(ProbeStatus::Lost, result.outcomes()[1].status);
        Ok(())
    }

    #[test]
    fn test_publishes_each_outcome() -> anyhow::Result<()> {
        let mut network = MockNetwork::new();
        network.expect_send_probe().times(2).returning(|_| Ok(()));
        let mut next_seq = 0_u16;
        network.expect_recv_probe().returning(move || {
            let resp = Response::new(Sequence(next_seq), SystemTime::now());
            next_seq += 1;
            Ok(Some(resp))
        });
        let published = RefCell::new(Vec::new());
        let config = make_config(2, Duration::from_millis(100));
        let runner = Runner::new(&config, ProbeId(1), |outcome: &ProbeOutcome| {
            published.borrow_mut().push(*outcome);
        });
        let result = runner.run(network)?;
        assert_eq!(result.outcomes(), published.borrow().as_slice());
        Ok(())
    }
}
