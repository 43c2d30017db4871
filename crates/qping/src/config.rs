use anyhow::anyhow;
use clap::{Parser, ValueEnum};
use qping_core::{defaults, PacketSize, Port, Protocol, Threshold, Thresholds};
use std::net::IpAddr;
use std::time::Duration;

/// The report output mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human readable statistics.
    Normal,
    /// One Nagios status line per metric with perfdata.
    Nagios,
    /// A single Check_MK agent section line.
    Checkmk,
}

/// Probe a host and report network quality statistics
#[derive(Parser, Debug)]
#[command(name = "qping", author, version, about, long_about = None, arg_required_else_help(true))]
pub struct Args {
    /// The hostname or IP to probe
    pub destination: String,

    /// The number of probes to send
    #[arg(short = 'c', long, default_value_t = defaults::DEFAULT_PROBE_COUNT)]
    pub count: u16,

    /// The per-probe timeout in milliseconds
    #[arg(short = 't', long, default_value_t = 3000)]
    pub timeout: u64,

    /// The probe payload length in bytes
    #[arg(short = 'l', long, default_value_t = defaults::DEFAULT_PACKET_SIZE)]
    pub length: u16,

    /// The A side name used in reports
    #[arg(short = 'a', long = "a-side", default_value = "A")]
    pub a_side: String,

    /// The Z side name used in reports
    #[arg(short = 'z', long = "z-side", default_value = "Z")]
    pub z_side: String,

    /// The source IP address [default: auto]
    #[arg(short = 's', long)]
    pub source: Option<IpAddr>,

    /// Probe using UDP echo instead of ICMP
    #[arg(short = 'u', long)]
    pub udp: bool,

    /// The UDP echo responder port
    #[arg(short = 'U', long, default_value_t = defaults::DEFAULT_UDP_PORT)]
    pub udp_port: u16,

    /// Output mode
    #[arg(value_enum, short = 'o', long, default_value_t = OutputMode::Normal)]
    pub output: OutputMode,

    /// Packet loss warning threshold in percent
    #[arg(short = 'p', long, default_value_t = 10.0)]
    pub loss_warn: f64,

    /// Packet loss critical threshold in percent
    #[arg(short = 'P', long, default_value_t = 20.0)]
    pub loss_crit: f64,

    /// Average RTT warning threshold in milliseconds
    #[arg(short = 'r', long, default_value_t = 75.0)]
    pub rtt_warn: f64,

    /// Average RTT critical threshold in milliseconds
    #[arg(short = 'R', long, default_value_t = 100.0)]
    pub rtt_crit: f64,

    /// Average jitter warning threshold in milliseconds
    #[arg(short = 'j', long, default_value_t = 20.0)]
    pub jitter_warn: f64,

    /// Average jitter critical threshold in milliseconds
    #[arg(short = 'J', long, default_value_t = 30.0)]
    pub jitter_crit: f64,

    /// MOS warning threshold, lower is worse
    #[arg(short = 'm', long, default_value_t = 4.0)]
    pub mos_warn: f64,

    /// MOS critical threshold, lower is worse
    #[arg(short = 'M', long, default_value_t = 3.0)]
    pub mos_crit: f64,

    /// Print each probe outcome as it resolves
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// The fully validated application configuration.
#[derive(Debug)]
pub struct QpingConfig {
    pub destination: String,
    pub a_side: String,
    pub z_side: String,
    pub source_addr: Option<IpAddr>,
    pub protocol: Protocol,
    pub udp_port: Port,
    pub count: u16,
    pub timeout: Duration,
    pub packet_size: PacketSize,
    pub output: OutputMode,
    pub thresholds: Thresholds,
    pub verbose: bool,
}

impl TryFrom<Args> for QpingConfig {
    type Error = anyhow::Error;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let threshold = |name: &str, warning: f64, critical: f64| {
            if warning <= 0.0 || critical <= 0.0 {
                Err(anyhow!("{name} thresholds must be positive"))
            } else {
                Ok(Threshold::new(warning, critical))
            }
        };
        let thresholds = Thresholds {
            loss: Some(threshold("loss", args.loss_warn, args.loss_crit)?),
            rtt: Some(threshold("rtt", args.rtt_warn, args.rtt_crit)?),
            jitter: Some(threshold("jitter", args.jitter_warn, args.jitter_crit)?),
            mos: Some(threshold("mos", args.mos_warn, args.mos_crit)?),
        };
        if args.count == 0 {
            return Err(anyhow!("count must be greater than zero"));
        }
        if args.timeout == 0 {
            return Err(anyhow!("timeout must be greater than zero"));
        }
        let protocol = if args.udp {
            Protocol::Udp
        } else {
            Protocol::Icmp
        };
        Ok(Self {
            destination: args.destination,
            a_side: args.a_side,
            z_side: args.z_side,
            source_addr: args.source,
            protocol,
            udp_port: Port(args.udp_port),
            count: args.count,
            timeout: Duration::from_millis(args.timeout),
            packet_size: PacketSize(args.length),
            output: args.output,
            thresholds,
            verbose: args.verbose,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(cmd: &str) -> anyhow::Result<QpingConfig> {
        QpingConfig::try_from(Args::try_parse_from(cmd.split_whitespace())?)
    }

    #[test]
    fn test_defaults() -> anyhow::Result<()> {
        let cfg = parse("qping 1.1.1.1")?;
        assert_eq!("1.1.1.1", cfg.destination);
        assert_eq!(Protocol::Icmp, cfg.protocol);
        assert_eq!(4, cfg.count);
        assert_eq!(Duration::from_millis(3000), cfg.timeout);
        assert_eq!(PacketSize(64), cfg.packet_size);
        assert_eq!(Port(5001), cfg.udp_port);
        assert_eq!(OutputMode::Normal, cfg.output);
        assert_eq!(Some(Threshold::new(10.0, 20.0)), cfg.thresholds.loss);
        assert_eq!(Some(Threshold::new(75.0, 100.0)), cfg.thresholds.rtt);
        assert_eq!(Some(Threshold::new(20.0, 30.0)), cfg.thresholds.jitter);
        assert_eq!(Some(Threshold::new(4.0, 3.0)), cfg.thresholds.mos);
        Ok(())
    }

    #[test]
    fn test_udp_mode() -> anyhow::Result<()> {
        let cfg = parse("qping -u -U 7001 10.0.0.1")?;
        assert_eq!(Protocol::Udp, cfg.protocol);
        assert_eq!(Port(7001), cfg.udp_port);
        Ok(())
    }

    #[test]
    fn test_output_modes() -> anyhow::Result<()> {
        assert_eq!(OutputMode::Nagios, parse("qping -o nagios 1.1.1.1")?.output);
        assert_eq!(
            OutputMode::Checkmk,
            parse("qping -o checkmk 1.1.1.1")?.output
        );
        Ok(())
    }

    #[test]
    fn test_rejects_zero_count() {
        assert!(parse("qping -c 0 1.1.1.1").is_err());
    }

    #[test]
    fn test_rejects_non_positive_threshold() {
        assert!(parse("qping -p 0 1.1.1.1").is_err());
    }
}
