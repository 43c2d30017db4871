use crate::types::{ProbeId, Sequence};
use std::time::{Duration, SystemTime};

/// A network quality probe.
///
/// A `Probe` is a single echo packet sent to the target host. It is immutable
/// once sent and is resolved to exactly one [`ProbeOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    /// The sequence of the probe.
    pub sequence: Sequence,
    /// The run identifier.
    pub identifier: ProbeId,
    /// Timestamp when the probe was sent.
    pub sent: SystemTime,
}

impl Probe {
    #[must_use]
    pub const fn new(sequence: Sequence, identifier: ProbeId, sent: SystemTime) -> Self {
        Self {
            sequence,
            identifier,
            sent,
        }
    }
}

/// A reply which matched a probe sent from this run.
///
/// Replies which do not carry our identity are discarded by the channel and
/// never surface as a `Response`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    /// The sequence of the probe this reply answers.
    pub sequence: Sequence,
    /// Timestamp when the reply was received.
    pub received: SystemTime,
}

impl Response {
    #[must_use]
    pub const fn new(sequence: Sequence, received: SystemTime) -> Self {
        Self { sequence, received }
    }
}

/// The resolved status of a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    /// The matching reply arrived within the timeout.
    Answered(Duration),
    /// No matching reply arrived within the timeout.
    Lost,
}

/// The outcome of a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// The sequence of the probe.
    pub sequence: Sequence,
    /// The resolved status of the probe.
    pub status: ProbeStatus,
}

impl ProbeOutcome {
    #[must_use]
    pub const fn new(sequence: Sequence, status: ProbeStatus) -> Self {
        Self { sequence, status }
    }

    /// The round trip time, if the probe was answered.
    #[must_use]
    pub const fn rtt(&self) -> Option<Duration> {
        match self.status {
            ProbeStatus::Answered(rtt) => Some(rtt),
            ProbeStatus::Lost => None,
        }
    }

    #[must_use]
    pub const fn is_answered(&self) -> bool {
        matches!(self.status, ProbeStatus::Answered(_))
    }
}

/// The ordered outcomes of a completed probe run.
///
/// Holds exactly one outcome per configured probe, in ascending sequence
/// order, padded with [`ProbeStatus::Lost`] for probes which were never
/// answered. Immutable once the run completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    outcomes: Vec<ProbeOutcome>,
}

impl RunResult {
    #[must_use]
    pub fn new(outcomes: Vec<ProbeOutcome>) -> Self {
        debug_assert!(outcomes
            .iter()
            .enumerate()
            .all(|(i, outcome)| usize::from(outcome.sequence) == i));
        Self { outcomes }
    }

    /// All probe outcomes in sequence order.
    #[must_use]
    pub fn outcomes(&self) -> &[ProbeOutcome] {
        &self.outcomes
    }

    /// The number of probes sent.
    #[must_use]
    pub fn count(&self) -> usize {
        self.outcomes.len()
    }

    /// The number of probes which were answered.
    #[must_use]
    pub fn answered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_answered()).count()
    }

    /// The number of probes which were lost.
    #[must_use]
    pub fn lost(&self) -> usize {
        self.count() - self.answered()
    }
}
