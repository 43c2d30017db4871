use crate::error::Result;
use crate::probe::{Probe, Response};

/// Platform specific network code.
mod platform;

/// A network socket.
pub(crate) mod socket;

/// A channel for sending and receiving probes.
pub mod channel;

/// The platform specific socket type.
pub use platform::SocketImpl;

pub use socket::Socket;

/// An abstraction over a network interface for probing.
#[cfg_attr(test, mockall::automock)]
pub trait Network {
    /// Send a `Probe`.
    fn send_probe(&mut self, probe: Probe) -> Result<()>;

    /// Receive the next matching reply and return a `Response`.
    ///
    /// Returns `None` if the read times out or the packet read is not a reply
    /// to a probe sent from this run.
    fn recv_probe(&mut self) -> Result<Option<Response>>;
}
