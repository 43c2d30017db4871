use crate::config::{ChannelConfig, RunConfig};
use crate::error::{Error, Result};
use crate::prober::Prober;
use crate::types::{PacketSize, PayloadPattern, Port, ProbeCount, ProbeId};
use crate::Protocol;
use std::net::IpAddr;
use std::time::Duration;

/// Build a prober.
///
/// This is a convenience builder to simplify the creation and execution of a
/// probe run.
///
/// # Examples
///
/// ```no_run
/// # fn main() -> anyhow::Result<()> {
/// use qping_core::{Builder, Port, Protocol};
///
/// let addr = std::net::IpAddr::from([1, 2, 3, 4]);
/// let prober = Builder::new(addr)
///     .protocol(Protocol::Udp)
///     .udp_port(Port(5001))
///     .count(10)
///     .build()?;
/// # Ok(())
/// # }
/// ```
///
/// # See Also
///
/// - [`Prober`] - Run probes and collect outcomes.
#[derive(Debug)]
pub struct Builder {
    target_addr: IpAddr,
    protocol: Protocol,
    source_addr: Option<IpAddr>,
    udp_port: Port,
    packet_size: PacketSize,
    payload_pattern: PayloadPattern,
    identifier: ProbeId,
    read_timeout: Duration,
    count: ProbeCount,
    timeout: Duration,
}

impl Builder {
    /// Build a prober builder for a given target.
    #[must_use]
    pub fn new(target_addr: IpAddr) -> Self {
        let channel_defaults = ChannelConfig::default();
        let run_defaults = RunConfig::default();
        Self {
            target_addr,
            protocol: channel_defaults.protocol,
            source_addr: None,
            udp_port: channel_defaults.udp_port,
            packet_size: channel_defaults.packet_size,
            payload_pattern: channel_defaults.payload_pattern,
            identifier: ProbeId(std::process::id() as u16),
            read_timeout: channel_defaults.read_timeout,
            count: run_defaults.count,
            timeout: run_defaults.timeout,
        }
    }

    /// Set the probe transport protocol.
    #[must_use]
    pub const fn protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Set the source address to bind to.
    #[must_use]
    pub const fn source_addr(mut self, source_addr: Option<IpAddr>) -> Self {
        self.source_addr = source_addr;
        self
    }

    /// Set the responder port for UDP probes.
    #[must_use]
    pub const fn udp_port(mut self, udp_port: Port) -> Self {
        self.udp_port = udp_port;
        self
    }

    /// Set the probe payload size in bytes.
    #[must_use]
    pub const fn packet_size(mut self, packet_size: PacketSize) -> Self {
        self.packet_size = packet_size;
        self
    }

    /// Set the payload padding pattern.
    #[must_use]
    pub const fn payload_pattern(mut self, payload_pattern: PayloadPattern) -> Self {
        self.payload_pattern = payload_pattern;
        self
    }

    /// Set the run identifier carried by ICMP probes.
    #[must_use]
    pub const fn identifier(mut self, identifier: ProbeId) -> Self {
        self.identifier = identifier;
        self
    }

    /// Set the socket read timeout.
    #[must_use]
    pub const fn read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Set the number of probes to send.
    #[must_use]
    pub const fn count(mut self, count: u16) -> Self {
        self.count = ProbeCount(count);
        self
    }

    /// Set the per-probe timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the prober.
    pub fn build(&self) -> Result<Prober> {
        if self.count.0 == 0 {
            return Err(Error::BadConfig(String::from(
                "count must be greater than zero",
            )));
        }
        if self.timeout.is_zero() {
            return Err(Error::BadConfig(String::from(
                "timeout must be greater than zero",
            )));
        }
        let channel_config = ChannelConfig {
            protocol: self.protocol,
            source_addr: self.source_addr,
            target_addr: self.target_addr,
            udp_port: self.udp_port,
            packet_size: self.packet_size,
            payload_pattern: self.payload_pattern,
            identifier: self.identifier,
            read_timeout: self.read_timeout,
        };
        let run_config = RunConfig {
            count: self.count,
            timeout: self.timeout,
        };
        Ok(Prober::new(channel_config, run_config))
    }
}
