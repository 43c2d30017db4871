use crate::config::ChannelConfig;
use crate::error::{Error, Result};
use crate::net::socket::Socket;
use crate::net::Network;
use crate::probe::{Probe, Response};
use crate::types::{PacketSize, PayloadPattern, Port, ProbeId, Sequence};
use crate::Protocol;
use qping_packet::icmp::echo_reply::EchoReplyPacket;
use qping_packet::icmp::echo_request::EchoRequestPacket;
use qping_packet::icmp::{IcmpCode, IcmpType};
use qping_packet::ipv4::Ipv4Packet;
use qping_packet::payload::ProbePayload;
use qping_packet::{checksum, IpProtocol};
use std::io::ErrorKind;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, SystemTime};
use tracing::instrument;

/// The maximum size of the probe payload we allow.
pub const MAX_PACKET_SIZE: usize = 1024;

/// The maximum size of an inbound IPv4 header.
const MAX_IPV4_HEADER_SIZE: usize = 60;

/// The size of the buffer for outbound ICMP packets.
const ICMP_SEND_BUF: usize = EchoRequestPacket::minimum_packet_size() + MAX_PACKET_SIZE;

/// The size of the buffer for inbound packets.
const RECV_BUF: usize = MAX_IPV4_HEADER_SIZE + ICMP_SEND_BUF;

/// A channel for sending and receiving `Probe` packets.
///
/// The channel owns a single socket for the lifetime of a run. For ICMP this
/// is a raw socket, which requires elevated privileges, and for UDP a plain
/// datagram socket.
pub struct Channel<S: Socket> {
    protocol: Protocol,
    socket: S,
    target_addr: IpAddr,
    udp_port: Port,
    packet_size: PacketSize,
    payload_pattern: PayloadPattern,
    identifier: ProbeId,
    read_timeout: Duration,
}

impl<S: Socket> Channel<S> {
    /// Create a `Channel`.
    ///
    /// For ICMP this operation requires the `CAP_NET_RAW` capability on Linux
    /// and fails with [`Error::RequiresPrivilege`] without it.
    #[instrument(skip_all, level = "trace")]
    pub fn connect(config: &ChannelConfig) -> Result<Self> {
        tracing::debug!(?config);
        let packet_size = usize::from(config.packet_size.0);
        if !(ProbePayload::minimum_packet_size()..=MAX_PACKET_SIZE).contains(&packet_size) {
            return Err(Error::InvalidPacketSize(packet_size));
        }
        let mut socket = match config.protocol {
            Protocol::Icmp => S::new_icmp_socket_ipv4().map_err(|err| {
                if err.kind() == ErrorKind::PermissionDenied {
                    Error::RequiresPrivilege
                } else {
                    Error::IoError(err)
                }
            })?,
            Protocol::Udp => S::new_udp_dgram_socket_ipv4()?,
        };
        if let Some(source_addr) = config.source_addr {
            socket
                .bind(SocketAddr::new(source_addr, 0))
                .map_err(|_| Error::InvalidSourceAddr(source_addr))?;
        }
        Ok(Self {
            protocol: config.protocol,
            socket,
            target_addr: config.target_addr,
            udp_port: config.udp_port,
            packet_size: config.packet_size,
            payload_pattern: config.payload_pattern,
            identifier: config.identifier,
            read_timeout: config.read_timeout,
        })
    }
}

impl<S: Socket> Network for Channel<S> {
    #[instrument(skip(self), level = "trace")]
    fn send_probe(&mut self, probe: Probe) -> Result<()> {
        tracing::debug!(?probe);
        match self.protocol {
            Protocol::Icmp => self.dispatch_icmp_probe(&probe),
            Protocol::Udp => self.dispatch_udp_probe(&probe),
        }
    }
    #[instrument(skip_all, level = "trace")]
    fn recv_probe(&mut self) -> Result<Option<Response>> {
        if !self.socket.is_readable(self.read_timeout)? {
            return Ok(None);
        }
        let response = match self.protocol {
            Protocol::Icmp => self.recv_icmp_probe(),
            Protocol::Udp => self.recv_udp_probe(),
        }?;
        if let Some(resp) = &response {
            tracing::debug!(?resp);
        }
        Ok(response)
    }
}

impl<S: Socket> Channel<S> {
    /// Dispatch an ICMP echo request.
    #[instrument(skip_all, level = "trace")]
    fn dispatch_icmp_probe(&mut self, probe: &Probe) -> Result<()> {
        let mut icmp_buf = [0_u8; ICMP_SEND_BUF];
        let packet_size = usize::from(self.packet_size.0);
        let payload = [self.payload_pattern.0; MAX_PACKET_SIZE];
        let packet_length = EchoRequestPacket::minimum_packet_size() + packet_size;
        let mut icmp = EchoRequestPacket::new(&mut icmp_buf[..packet_length])?;
        icmp.set_icmp_type(IcmpType::EchoRequest);
        icmp.set_icmp_code(IcmpCode(0));
        icmp.set_identifier(self.identifier.0);
        icmp.set_sequence(probe.sequence.0);
        icmp.set_payload(&payload[..packet_size]);
        icmp.set_checksum(checksum::icmp_ipv4_checksum(icmp.packet()));
        let remote_addr = SocketAddr::new(self.target_addr, 0);
        self.socket
            .send_to(icmp.packet(), remote_addr)
            .map_err(Error::ProbeFailed)?;
        Ok(())
    }

    /// Dispatch a UDP probe datagram.
    #[instrument(skip_all, level = "trace")]
    fn dispatch_udp_probe(&mut self, probe: &Probe) -> Result<()> {
        let mut udp_buf = [0_u8; MAX_PACKET_SIZE];
        let packet_size = usize::from(self.packet_size.0);
        let mut payload = ProbePayload::new(&mut udp_buf[..packet_size])?;
        payload.set_magic();
        payload.set_sequence(probe.sequence.0);
        payload.set_padding(self.payload_pattern.0);
        let remote_addr = SocketAddr::new(self.target_addr, self.udp_port.0);
        self.socket
            .send_to(payload.packet(), remote_addr)
            .map_err(Error::ProbeFailed)?;
        Ok(())
    }

    /// Receive an ICMP echo reply and match it against our identity.
    ///
    /// A raw ICMP socket delivers the full IPv4 datagram so the IP header,
    /// including any options, is stepped over to reach the ICMP packet. Any
    /// packet which is not an echo reply carrying our identifier is silently
    /// discarded.
    #[instrument(skip_all, level = "trace")]
    fn recv_icmp_probe(&mut self) -> Result<Option<Response>> {
        let mut buf = [0_u8; RECV_BUF];
        let bytes_read = match self.socket.recv_from(&mut buf) {
            Ok((bytes_read, _)) => bytes_read,
            Err(err) if err.kind() == ErrorKind::WouldBlock => return Ok(None),
            Err(err) => return Err(Error::IoError(err)),
        };
        let Ok(ipv4) = Ipv4Packet::new_view(&buf[..bytes_read]) else {
            return Ok(None);
        };
        if ipv4.get_protocol() != IpProtocol::Icmp {
            return Ok(None);
        }
        let Ok(reply) = EchoReplyPacket::new_view(ipv4.payload()) else {
            return Ok(None);
        };
        if reply.get_icmp_type() != IcmpType::EchoReply
            || reply.get_identifier() != self.identifier.0
        {
            return Ok(None);
        }
        Ok(Some(Response::new(
            Sequence(reply.get_sequence()),
            SystemTime::now(),
        )))
    }

    /// Receive an echoed UDP datagram and match it against our payload marker.
    #[instrument(skip_all, level = "trace")]
    fn recv_udp_probe(&mut self) -> Result<Option<Response>> {
        let mut buf = [0_u8; MAX_PACKET_SIZE];
        let bytes_read = match self.socket.recv_from(&mut buf) {
            Ok((bytes_read, _)) => bytes_read,
            Err(err) if err.kind() == ErrorKind::WouldBlock => return Ok(None),
            Err(err) => return Err(Error::IoError(err)),
        };
        let Ok(payload) = ProbePayload::new_view(&buf[..bytes_read]) else {
            return Ok(None);
        };
        if !payload.has_magic() {
            return Ok(None);
        }
        Ok(Some(Response::new(
            Sequence(payload.get_sequence()),
            SystemTime::now(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IoResult;
    use crate::mocket_recv_from;
    use crate::net::socket::MockSocket;
    use mockall::predicate;
    use std::net::Ipv4Addr;

    const TARGET: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));

    fn make_channel(protocol: Protocol, socket: MockSocket, packet_size: u16) -> Channel<MockSocket> {
        Channel {
            protocol,
            socket,
            target_addr: TARGET,
            udp_port: Port(5001),
            packet_size: PacketSize(packet_size),
            payload_pattern: PayloadPattern(0xaa),
            identifier: ProbeId(1234),
            read_timeout: Duration::from_millis(10),
        }
    }

    fn make_probe(sequence: u16) -> Probe {
        Probe::new(Sequence(sequence), ProbeId(1234), SystemTime::now())
    }

    #[test]
    fn test_dispatch_icmp_probe() -> anyhow::Result<()> {
        let expected_send_to_buf = hex_literal::hex!("08 00 9d d6 04 d2 00 02 aa aa aa aa");
        let expected_send_to_addr = SocketAddr::new(TARGET, 0);
        let mut mocket = MockSocket::new();
        mocket
            .expect_send_to()
            .with(
                predicate::eq(expected_send_to_buf),
                predicate::eq(expected_send_to_addr),
            )
            .times(1)
            .returning(|_, _| Ok(()));
        let mut channel = make_channel(Protocol::Icmp, mocket, 4);
        channel.dispatch_icmp_probe(&make_probe(2))?;
        Ok(())
    }

    #[test]
    fn test_dispatch_udp_probe() -> anyhow::Result<()> {
        let expected_send_to_buf = hex_literal::hex!("71 70 00 05 aa aa");
        let expected_send_to_addr = SocketAddr::new(TARGET, 5001);
        let mut mocket = MockSocket::new();
        mocket
            .expect_send_to()
            .with(
                predicate::eq(expected_send_to_buf),
                predicate::eq(expected_send_to_addr),
            )
            .times(1)
            .returning(|_, _| Ok(()));
        let mut channel = make_channel(Protocol::Udp, mocket, 6);
        channel.dispatch_udp_probe(&make_probe(5))?;
        Ok(())
    }

    #[test]
    fn test_recv_icmp_probe_echo_reply() -> anyhow::Result<()> {
        // IPv4 header followed by an ICMP echo reply with identifier 1234
        // and sequence 7.
        let packet = hex_literal::hex!(
            "45 00 00 20 5e 88 00 00 40 01 1c 32 0a 00 00 01 c0 a8 01 64
             00 00 a5 d1 04 d2 00 07 aa aa aa aa"
        );
        let mut mocket = MockSocket::new();
        mocket
            .expect_recv_from()
            .times(1)
            .returning(mocket_recv_from!(packet, SocketAddr::new(TARGET, 0)));
        let mut channel = make_channel(Protocol::Icmp, mocket, 4);
        let resp = channel.recv_icmp_probe()?.expect("response");
        assert_eq!(Sequence(7), resp.sequence);
        Ok(())
    }

    #[test]
    fn test_recv_icmp_probe_foreign_identifier_discarded() -> anyhow::Result<()> {
        // An echo reply for identifier 9999.
        let packet = hex_literal::hex!(
            "45 00 00 20 5e 88 00 00 40 01 1c 32 0a 00 00 01 c0 a8 01 64
             00 00 00 00 27 0f 00 07 aa aa aa aa"
        );
        let mut mocket = MockSocket::new();
        mocket
            .expect_recv_from()
            .times(1)
            .returning(mocket_recv_from!(packet, SocketAddr::new(TARGET, 0)));
        let mut channel = make_channel(Protocol::Icmp, mocket, 4);
        assert!(channel.recv_icmp_probe()?.is_none());
        Ok(())
    }

    #[test]
    fn test_recv_icmp_probe_echo_request_discarded() -> anyhow::Result<()> {
        // Our own outbound echo request looped back by the raw socket.
        let packet = hex_literal::hex!(
            "45 00 00 20 5e 88 00 00 40 01 1c 32 0a 00 00 01 c0 a8 01 64
             08 00 9d d1 04 d2 00 07 aa aa aa aa"
        );
        let mut mocket = MockSocket::new();
        mocket
            .expect_recv_from()
            .times(1)
            .returning(mocket_recv_from!(packet, SocketAddr::new(TARGET, 0)));
        let mut channel = make_channel(Protocol::Icmp, mocket, 4);
        assert!(channel.recv_icmp_probe()?.is_none());
        Ok(())
    }

    #[test]
    fn test_recv_icmp_probe_truncated_discarded() -> anyhow::Result<()> {
        let packet = hex_literal::hex!("45 00 00 20 5e 88");
        let mut mocket = MockSocket::new();
        mocket
            .expect_recv_from()
            .times(1)
            .returning(mocket_recv_from!(packet, SocketAddr::new(TARGET, 0)));
        let mut channel = make_channel(Protocol::Icmp, mocket, 4);
        assert!(channel.recv_icmp_probe()?.is_none());
        Ok(())
    }

    #[test]
    fn test_recv_udp_probe() -> anyhow::Result<()> {
        let packet = hex_literal::hex!("71 70 00 03 aa aa");
        let mut mocket = MockSocket::new();
        mocket
            .expect_recv_from()
            .times(1)
            .returning(mocket_recv_from!(packet, SocketAddr::new(TARGET, 5001)));
        let mut channel = make_channel(Protocol::Udp, mocket, 6);
        let resp = channel.recv_udp_probe()?.expect("response");
        assert_eq!(Sequence(3), resp.sequence);
        Ok(())
    }

    #[test]
    fn test_recv_udp_probe_foreign_payload_discarded() -> anyhow::Result<()> {
        let packet = hex_literal::hex!("de ad 00 03 aa aa");
        let mut mocket = MockSocket::new();
        mocket
            .expect_recv_from()
            .times(1)
            .returning(mocket_recv_from!(packet, SocketAddr::new(TARGET, 5001)));
        let mut channel = make_channel(Protocol::Udp, mocket, 6);
        assert!(channel.recv_udp_probe()?.is_none());
        Ok(())
    }

    #[test]
    fn test_recv_probe_timeout() -> anyhow::Result<()> {
        let mut mocket = MockSocket::new();
        mocket
            .expect_is_readable()
            .with(predicate::eq(Duration::from_millis(10)))
            .times(1)
            .returning(|_| Ok(false));
        let mut channel = make_channel(Protocol::Udp, mocket, 6);
        assert!(channel.recv_probe()?.is_none());
        Ok(())
    }
}
