use crate::buffer::Buffer;
use crate::error::{Error, Result};
use std::fmt::{Debug, Formatter};

/// The magic marker carried at the start of every UDP probe payload.
///
/// UDP has no kernel-level echo identifier and the responder copies payloads
/// back verbatim, so the probe embeds its own marker and sequence number to
/// allow replies to be matched and foreign datagrams to be rejected.
pub const MAGIC: [u8; 2] = *b"qp";

const MAGIC_OFFSET: usize = 0;
const SEQUENCE_OFFSET: usize = 2;

/// The qping UDP probe payload.
///
/// Wire format: 2 bytes of [`MAGIC`], the big-endian probe sequence number,
/// then padding bytes of the configured pattern up to the requested payload
/// length.
pub struct ProbePayload<'a> {
    buf: Buffer<'a>,
}

impl<'a> ProbePayload<'a> {
    pub fn new(packet: &'a mut [u8]) -> Result<Self> {
        if packet.len() >= Self::minimum_packet_size() {
            Ok(Self {
                buf: Buffer::Mutable(packet),
            })
        } else {
            Err(Error::InsufficientPacketBuffer(
                String::from("ProbePayload"),
                Self::minimum_packet_size(),
                packet.len(),
            ))
        }
    }

    pub fn new_view(packet: &'a [u8]) -> Result<Self> {
        if packet.len() >= Self::minimum_packet_size() {
            Ok(Self {
                buf: Buffer::Immutable(packet),
            })
        } else {
            Err(Error::InsufficientPacketBuffer(
                String::from("ProbePayload"),
                Self::minimum_packet_size(),
                packet.len(),
            ))
        }
    }

    #[must_use]
    pub const fn minimum_packet_size() -> usize {
        4
    }

    #[must_use]
    pub fn has_magic(&self) -> bool {
        self.buf.get_bytes::<2>(MAGIC_OFFSET) == MAGIC
    }

    #[must_use]
    pub fn get_sequence(&self) -> u16 {
        u16::from_be_bytes(self.buf.get_bytes(SEQUENCE_OFFSET))
    }

    pub fn set_magic(&mut self) {
        self.buf.set_bytes(MAGIC_OFFSET, MAGIC);
    }

    pub fn set_sequence(&mut self, val: u16) {
        self.buf.set_bytes(SEQUENCE_OFFSET, val.to_be_bytes());
    }

    pub fn set_padding(&mut self, pattern: u8) {
        self.buf.as_slice_mut()[Self::minimum_packet_size()..].fill(pattern);
    }

    #[must_use]
    pub fn packet(&self) -> &[u8] {
        self.buf.as_slice()
    }

    #[must_use]
    pub fn padding(&self) -> &[u8] {
        &self.buf.as_slice()[Self::minimum_packet_size()..]
    }
}

impl Debug for ProbePayload<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbePayload")
            .field("has_magic", &self.has_magic())
            .field("sequence", &self.get_sequence())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_payload() {
        let mut buf = [0_u8; 8];
        let mut payload = ProbePayload::new(&mut buf).unwrap();
        payload.set_magic();
        payload.set_sequence(7);
        payload.set_padding(0xab);
        assert_eq!(
            &hex_literal::hex!("71 70 00 07 ab ab ab ab"),
            payload.packet()
        );
    }

    #[test]
    fn test_parse_payload() {
        let buf = hex_literal::hex!("71 70 01 02 00 00");
        let payload = ProbePayload::new_view(&buf).unwrap();
        assert!(payload.has_magic());
        assert_eq!(258, payload.get_sequence());
        assert_eq!(2, payload.padding().len());
    }

    #[test]
    fn test_foreign_payload_rejected() {
        let buf = hex_literal::hex!("de ad 00 07");
        let payload = ProbePayload::new_view(&buf).unwrap();
        assert!(!payload.has_magic());
    }

    #[test]
    fn test_minimum_size_payload() {
        let mut buf = [0_u8; ProbePayload::minimum_packet_size()];
        let mut payload = ProbePayload::new(&mut buf).unwrap();
        payload.set_magic();
        payload.set_sequence(u16::MAX);
        payload.set_padding(0xff);
        assert_eq!(&hex_literal::hex!("71 70 ff ff"), payload.packet());
        assert!(payload.padding().is_empty());
    }

    #[test]
    fn test_new_insufficient_buffer() {
        const SIZE: usize = ProbePayload::minimum_packet_size();
        let mut buf = [0_u8; SIZE - 1];
        let err = ProbePayload::new(&mut buf).unwrap_err();
        assert_eq!(
            Error::InsufficientPacketBuffer(String::from("ProbePayload"), SIZE, SIZE - 1),
            err
        );
    }
}
