/// `Sequence` number newtype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct Sequence(pub u16);

/// `ProbeId` newtype.
///
/// A process-scoped identifier carried in the ICMP echo identifier field and
/// used to match replies against probes from this run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd)]
pub struct ProbeId(pub u16);

/// `PacketSize` newtype.
///
/// The size of the probe payload in bytes, excluding IP and transport headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd)]
pub struct PacketSize(pub u16);

/// `PayloadPattern` newtype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd)]
pub struct PayloadPattern(pub u8);

/// Port newtype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd)]
pub struct Port(pub u16);

/// `ProbeCount` newtype.
///
/// The number of probes to send in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Ord, PartialOrd)]
pub struct ProbeCount(pub u16);

impl From<Sequence> for usize {
    fn from(sequence: Sequence) -> Self {
        Self::from(sequence.0)
    }
}
