use crate::error::IoResult as Result;
use std::net::SocketAddr;
use std::time::Duration;

#[cfg_attr(test, mockall::automock)]
pub trait Socket
where
    Self: Sized,
{
    /// Create an IPv4 socket for sending and receiving ICMP echo packets.
    fn new_icmp_socket_ipv4() -> Result<Self>;
    /// Create a (non-raw) IPv4/UDP socket.
    fn new_udp_dgram_socket_ipv4() -> Result<Self>;
    fn bind(&mut self, address: SocketAddr) -> Result<()>;
    fn send_to(&mut self, buf: &[u8], addr: SocketAddr) -> Result<()>;
    /// Returns true if the socket becomes readable before the timeout, false otherwise.
    fn is_readable(&mut self, timeout: Duration) -> Result<bool>;
    fn recv_from(&mut self, buf: &mut [u8]) -> Result<(usize, Option<SocketAddr>)>;
}
