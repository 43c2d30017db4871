//! Qping - A network quality probing library.
//!
//! This crate provides the probe engine and statistics subsystem used by the
//! standalone `qping` application. It sends a bounded sequence of echo probes
//! (ICMP or UDP) to a remote host, measures the round trip time of each
//! probe, and derives aggregate quality metrics: packet loss, latency,
//! jitter and an estimated Mean Opinion Score. The metrics can then be
//! classified against warning and critical thresholds for consumption by
//! monitoring systems.
//!
//! # Example
//!
//! The following example builds and runs a prober with default configuration
//! and classifies the result:
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! # use std::net::IpAddr;
//! # use std::str::FromStr;
//! use qping_core::{Builder, Stats, Thresholds, Verdict};
//!
//! let addr = IpAddr::from_str("1.1.1.1")?;
//! let result = Builder::new(addr).build()?.run()?;
//! let verdict = Verdict::classify(&Stats::of(&result), &Thresholds::default());
//! println!("{verdict:?}");
//! # Ok(())
//! # }
//! ```
//!
//! # See Also
//!
//! - [`Builder`] - Build a [`Prober`].
//! - [`Prober::run`] - Run the probe sequence on the current thread.
//! - [`Prober::run_with`] - Run with a per-probe outcome handler.
//! - [`Responder`] - The cooperating UDP echo responder.
#![warn(clippy::all, clippy::pedantic, clippy::nursery, rust_2018_idioms)]
#![allow(
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::use_self,
    clippy::option_if_let_else,
    clippy::missing_const_for_fn,
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss
)]
#![deny(unsafe_code)]

mod builder;
mod classify;
mod config;
mod error;
mod net;
mod probe;
mod prober;
mod responder;
mod runner;
mod stats;
mod types;

pub mod mos;

use net::SocketImpl;

pub use builder::Builder;
pub use classify::{Severity, Threshold, Thresholds, Verdict};
pub use config::{defaults, ChannelConfig, Protocol, RunConfig};
pub use error::Error;
pub use net::channel::MAX_PACKET_SIZE;
pub use probe::{Probe, ProbeOutcome, ProbeStatus, Response, RunResult};
pub use prober::Prober;
pub use responder::Responder;
pub use stats::{MetricTriple, Stats};
pub use types::{PacketSize, PayloadPattern, Port, ProbeCount, ProbeId, Sequence};

/// A [`Responder`] backed by the platform socket.
pub type UdpResponder = Responder<SocketImpl>;
