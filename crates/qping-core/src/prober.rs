use crate::config::{ChannelConfig, RunConfig};
use crate::error::Result;
use crate::net::channel::Channel;
use crate::net::SocketImpl;
use crate::probe::{ProbeOutcome, RunResult};
use crate::runner::Runner;

/// A network quality prober.
///
/// Sends a bounded sequence of probes to a target and collects the outcome of
/// every probe. Construct via [`crate::Builder`].
///
/// # Examples
///
/// ```no_run
/// # fn main() -> anyhow::Result<()> {
/// use qping_core::Builder;
///
/// let addr = std::net::IpAddr::from([1, 1, 1, 1]);
/// let result = Builder::new(addr).build()?.run()?;
/// println!("lost {} of {}", result.lost(), result.count());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Prober {
    channel_config: ChannelConfig,
    run_config: RunConfig,
}

impl Prober {
    pub(crate) const fn new(channel_config: ChannelConfig, run_config: RunConfig) -> Self {
        Self {
            channel_config,
            run_config,
        }
    }

    /// Run the probe sequence to completion.
    ///
    /// The socket is created at the start of the run and released on every
    /// exit path when the channel is dropped.
    pub fn run(&self) -> Result<RunResult> {
        self.run_with(|_| {})
    }

    /// Run the probe sequence, publishing each outcome as it resolves.
    pub fn run_with<F: Fn(&ProbeOutcome)>(&self, publish: F) -> Result<RunResult> {
        let channel = Channel::<SocketImpl>::connect(&self.channel_config)?;
        Runner::new(&self.run_config, self.channel_config.identifier, publish).run(channel)
    }

    /// The channel configuration.
    #[must_use]
    pub const fn channel_config(&self) -> &ChannelConfig {
        &self.channel_config
    }

    /// The run configuration.
    #[must_use]
    pub const fn run_config(&self) -> &RunConfig {
        &self.run_config
    }
}
