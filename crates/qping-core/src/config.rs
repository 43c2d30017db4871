use crate::types::{PacketSize, PayloadPattern, Port, ProbeCount, ProbeId};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// Default values for configuration.
pub mod defaults {
    use crate::Protocol;
    use std::time::Duration;

    /// The default value for `protocol`.
    pub const DEFAULT_PROTOCOL: Protocol = Protocol::Icmp;

    /// The default value for `count`.
    pub const DEFAULT_PROBE_COUNT: u16 = 4;

    /// The default value for `timeout`.
    pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(3000);

    /// The default value for `length`.
    pub const DEFAULT_PACKET_SIZE: u16 = 64;

    /// The default value for `payload-pattern`.
    pub const DEFAULT_PAYLOAD_PATTERN: u8 = 0;

    /// The default value for `port` in UDP mode.
    pub const DEFAULT_UDP_PORT: u16 = 5001;

    /// The default value for `read-timeout`.
    pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(10);
}

/// The probe transport protocol.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Protocol {
    /// Internet Control Message Protocol echo request/reply.
    Icmp,
    /// User Datagram Protocol echo against a cooperating responder.
    Udp,
}

/// The probe channel configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    pub protocol: Protocol,
    pub source_addr: Option<IpAddr>,
    pub target_addr: IpAddr,
    pub udp_port: Port,
    pub packet_size: PacketSize,
    pub payload_pattern: PayloadPattern,
    pub identifier: ProbeId,
    pub read_timeout: Duration,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            protocol: defaults::DEFAULT_PROTOCOL,
            source_addr: None,
            target_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            udp_port: Port(defaults::DEFAULT_UDP_PORT),
            packet_size: PacketSize(defaults::DEFAULT_PACKET_SIZE),
            payload_pattern: PayloadPattern(defaults::DEFAULT_PAYLOAD_PATTERN),
            identifier: ProbeId(0),
            read_timeout: defaults::DEFAULT_READ_TIMEOUT,
        }
    }
}

/// The probe run configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub count: ProbeCount,
    pub timeout: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            count: ProbeCount(defaults::DEFAULT_PROBE_COUNT),
            timeout: defaults::DEFAULT_PROBE_TIMEOUT,
        }
    }
}
