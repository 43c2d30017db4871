use anyhow::Result;
use clap::Parser;
use qping_core::{defaults, UdpResponder};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// A UDP echo responder for qping probes
#[derive(Parser, Debug)]
#[command(name = "qping-responder", author, version, about, long_about = None)]
struct Args {
    /// The address to listen on
    #[arg(short = 'a', long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    address: IpAddr,

    /// The port to listen on
    #[arg(short = 'p', long, default_value_t = defaults::DEFAULT_UDP_PORT)]
    port: u16,

    /// The percentage of datagrams to drop at random
    #[arg(short = 'l', long, default_value_t = 0)]
    loss_rate: u8,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("qping_core=debug")),
            )
            .compact()
            .init();
    }
    let addr = SocketAddr::new(args.address, args.port);
    let mut responder = UdpResponder::bind(addr, args.loss_rate)?;
    tracing::debug!(%addr, loss_rate = args.loss_rate);
    responder.run()?;
    Ok(())
}
