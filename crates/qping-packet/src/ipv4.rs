use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::IpProtocol;
use std::fmt::{Debug, Formatter};
use std::net::Ipv4Addr;

const VERSION_OFFSET: usize = 0;
const IHL_OFFSET: usize = 0;
const TOTAL_LENGTH_OFFSET: usize = 2;
const TIME_TO_LIVE_OFFSET: usize = 8;
const PROTOCOL_OFFSET: usize = 9;
const SOURCE_OFFSET: usize = 12;
const DESTINATION_OFFSET: usize = 16;

/// A read-only view over an IPv4 packet.
///
/// Raw ICMP sockets deliver the full IPv4 datagram, so the receive path must
/// step over the IP header (including any options) to reach the ICMP payload.
///
/// The internal representation is held in network byte order (big-endian) and all accessor methods
/// return data in host byte order, converting as necessary for the given architecture.
pub struct Ipv4Packet<'a> {
    buf: Buffer<'a>,
}

impl<'a> Ipv4Packet<'a> {
    pub fn new_view(packet: &'a [u8]) -> Result<Self> {
        if packet.len() >= Self::minimum_packet_size() {
            Ok(Self {
                buf: Buffer::Immutable(packet),
            })
        } else {
            Err(Error::InsufficientPacketBuffer(
                String::from("Ipv4Packet"),
                Self::minimum_packet_size(),
                packet.len(),
            ))
        }
    }

    #[must_use]
    pub const fn minimum_packet_size() -> usize {
        20
    }

    #[must_use]
    pub fn get_version(&self) -> u8 {
        (self.buf.read(VERSION_OFFSET) & 0xf0) >> 4
    }

    #[must_use]
    pub fn get_header_length(&self) -> u8 {
        self.buf.read(IHL_OFFSET) & 0xf
    }

    #[must_use]
    pub fn get_total_length(&self) -> u16 {
        u16::from_be_bytes(self.buf.get_bytes(TOTAL_LENGTH_OFFSET))
    }

    #[must_use]
    pub fn get_time_to_live(&self) -> u8 {
        self.buf.read(TIME_TO_LIVE_OFFSET)
    }

    #[must_use]
    pub fn get_protocol(&self) -> IpProtocol {
        IpProtocol::from(self.buf.read(PROTOCOL_OFFSET))
    }

    #[must_use]
    pub fn get_source(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.buf.get_bytes::<4>(SOURCE_OFFSET))
    }

    #[must_use]
    pub fn get_destination(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.buf.get_bytes::<4>(DESTINATION_OFFSET))
    }

    #[must_use]
    pub fn packet(&self) -> &[u8] {
        self.buf.as_slice()
    }

    #[must_use]
    pub fn payload(&self) -> &[u8] {
        let start = Ipv4Packet::minimum_packet_size() + ipv4_options_length(self);
        &self.buf.as_slice()[start..]
    }
}

fn ipv4_options_length(ipv4: &Ipv4Packet<'_>) -> usize {
    (ipv4.get_header_length() as usize * 4).saturating_sub(Ipv4Packet::minimum_packet_size())
}

impl Debug for Ipv4Packet<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ipv4Packet")
            .field("version", &self.get_version())
            .field("header_length", &self.get_header_length())
            .field("total_length", &self.get_total_length())
            .field("time_to_live", &self.get_time_to_live())
            .field("protocol", &self.get_protocol())
            .field("source", &self.get_source())
            .field("destination", &self.get_destination())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view() {
        let buf = hex_literal::hex!(
            "45 00 00 20 5e 88 00 00 40 01 1c 32 c0 a8 01 64 08 08 08 08
             00 00 fb 23 04 d2 00 0a de ad be ef"
        );
        let packet = Ipv4Packet::new_view(&buf).unwrap();
        assert_eq!(4, packet.get_version());
        assert_eq!(5, packet.get_header_length());
        assert_eq!(32, packet.get_total_length());
        assert_eq!(64, packet.get_time_to_live());
        assert_eq!(IpProtocol::Icmp, packet.get_protocol());
        assert_eq!(Ipv4Addr::new(192, 168, 1, 100), packet.get_source());
        assert_eq!(Ipv4Addr::new(8, 8, 8, 8), packet.get_destination());
        assert_eq!(
            &hex_literal::hex!("00 00 fb 23 04 d2 00 0a de ad be ef"),
            packet.payload()
        );
    }

    #[test]
    fn test_view_with_options() {
        let buf = hex_literal::hex!(
            "46 00 00 20 00 00 00 00 40 01 00 00 0a 00 00 01 0a 00 00 02
             01 01 01 01
             00 00 00 00 00 00 00 00"
        );
        let packet = Ipv4Packet::new_view(&buf).unwrap();
        assert_eq!(6, packet.get_header_length());
        assert_eq!(8, packet.payload().len());
    }

    #[test]
    fn test_new_view_insufficient_buffer() {
        const SIZE: usize = Ipv4Packet::minimum_packet_size();
        let buf = [0_u8; SIZE - 1];
        let err = Ipv4Packet::new_view(&buf).unwrap_err();
        assert_eq!(
            Error::InsufficientPacketBuffer(String::from("Ipv4Packet"), SIZE, SIZE - 1),
            err
        );
    }
}
