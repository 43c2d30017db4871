use crate::error::{Error, Result};
use crate::net::channel::MAX_PACKET_SIZE;
use crate::net::Socket;
use rand::Rng;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::instrument;

/// How long to wait for a datagram before rechecking for shutdown signals.
const READ_TIMEOUT: Duration = Duration::from_millis(1000);

/// A stateless UDP echo responder.
///
/// Copies each received datagram back to its sender verbatim. A configurable
/// percentage of datagrams is dropped at random to simulate packet loss.
pub struct Responder<S: Socket> {
    socket: S,
    drop_pct: u8,
}

impl<S: Socket> Responder<S> {
    /// Bind the responder to the given address.
    #[instrument(skip_all, level = "trace")]
    pub fn bind(addr: SocketAddr, drop_pct: u8) -> Result<Self> {
        if drop_pct > 100 {
            return Err(Error::BadConfig(String::from(
                "drop percentage must be between 0 and 100",
            )));
        }
        let mut socket = S::new_udp_dgram_socket_ipv4()?;
        socket.bind(addr)?;
        tracing::debug!(?addr, drop_pct);
        Ok(Self { socket, drop_pct })
    }

    /// Serve echo requests until an error occurs.
    pub fn run(&mut self) -> Result<()> {
        let mut rng = rand::thread_rng();
        loop {
            self.serve_once(&mut rng)?;
        }
    }

    /// Wait for one datagram and echo it back to the sender, unless it is
    /// chosen for dropping.
    #[instrument(skip_all, level = "trace")]
    fn serve_once<R: Rng>(&mut self, rng: &mut R) -> Result<()> {
        if !self.socket.is_readable(READ_TIMEOUT)? {
            return Ok(());
        }
        let mut buf = [0_u8; MAX_PACKET_SIZE];
        let (bytes_read, addr) = match self.socket.recv_from(&mut buf) {
            Ok((bytes_read, addr)) => (bytes_read, addr),
            Err(err) if err.kind() == ErrorKind::WouldBlock => return Ok(()),
            Err(err) => return Err(Error::IoError(err)),
        };
        let Some(addr) = addr else {
            return Ok(());
        };
        if should_drop(rng.gen_range(0..100), self.drop_pct) {
            tracing::debug!(?addr, bytes_read, "dropped datagram");
            return Ok(());
        }
        self.socket.send_to(&buf[..bytes_read], addr)?;
        Ok(())
    }
}

/// True if a roll in `0..100` falls within the configured drop percentage.
const fn should_drop(roll: u8, drop_pct: u8) -> bool {
    roll < drop_pct
}
