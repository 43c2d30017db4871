//! Checksum implementation for ICMP over IPv4.
//!
//! This code is derived from [`libpnet`] which is available under the Apache 2.0 license.
//!
//! [`libpnet`]: https://github.com/libpnet/libpnet

/// Calculate the checksum for an `IPv4` `ICMP` packet.
#[must_use]
pub fn icmp_ipv4_checksum(data: &[u8]) -> u16 {
    checksum(data, 1)
}

fn checksum(data: &[u8], ignore_word: usize) -> u16 {
    if data.is_empty() {
        return 0;
    }
    let sum = sum_be_words(data, ignore_word);
    finalize_checksum(sum)
}

fn sum_be_words(data: &[u8], ignore_word: usize) -> u32 {
    if data.is_empty() {
        return 0;
    }
    let len = data.len();
    let mut cur_data = data;
    let mut sum = 0u32;
    let mut i = 0;
    while cur_data.len() >= 2 {
        if i != ignore_word {
            sum += u32::from(u16::from_be_bytes(cur_data[0..2].try_into().expect("2 bytes")));
        }
        cur_data = &cur_data[2..];
        i += 1;
    }
    if i != ignore_word && len & 1 != 0 {
        sum += u32::from(data[len - 1]) << 8;
    }
    sum
}

const fn finalize_checksum(mut sum: u32) -> u16 {
    while sum >> 16 != 0 {
        sum = (sum >> 16) + (sum & 0xFFFF);
    }
    !sum as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icmp_echo_request_checksum() {
        let packet = hex_literal::hex!("08 00 00 00 04 d2 00 0a");
        assert_eq!(0xf323, icmp_ipv4_checksum(&packet));
    }

    #[test]
    fn test_icmp_checksum_ignores_checksum_word() {
        let without = hex_literal::hex!("08 00 00 00 04 d2 00 0a");
        let with = hex_literal::hex!("08 00 f3 23 04 d2 00 0a");
        assert_eq!(icmp_ipv4_checksum(&without), icmp_ipv4_checksum(&with));
    }

    #[test]
    fn test_icmp_checksum_odd_length() {
        let packet = hex_literal::hex!("08 00 00 00 04 d2 00 0a ff");
        assert_eq!(0xf422, icmp_ipv4_checksum(&packet));
    }

    #[test]
    fn test_empty() {
        assert_eq!(0, icmp_ipv4_checksum(&[]));
    }
}
