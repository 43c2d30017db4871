use anyhow::{anyhow, Context, Result};
use clap::Parser;
use config::{Args, QpingConfig};
use qping_core::{Builder, ProbeStatus, Protocol, Stats, Verdict};
use qping_privilege::Privilege;
use report::Report;
use std::net::IpAddr;
use std::process;

mod config;
mod report;

/// The exit code for a failed run, distinct from all severity codes.
const EXIT_UNKNOWN: i32 = 3;

fn main() {
    let args = Args::parse();
    process::exit(match run(args) {
        Ok(exit_code) => exit_code,
        Err(err) => {
            eprintln!("qping: {err:#}");
            EXIT_UNKNOWN
        }
    });
}

fn run(args: Args) -> Result<i32> {
    if args.verbose {
        init_tracing();
    }
    let cfg = QpingConfig::try_from(args)?;
    let privilege = Privilege::acquire_privileges()?;
    if cfg.protocol == Protocol::Icmp && !privilege.has_privileges() {
        return Err(anyhow!(
            "ICMP probes require CAP_NET_RAW or root, retry with UDP mode (-u)"
        ));
    }
    let target_addr = resolve(&cfg.destination)?;
    tracing::debug!(%target_addr, ?cfg.protocol);
    let prober = Builder::new(target_addr)
        .protocol(cfg.protocol)
        .source_addr(cfg.source_addr)
        .udp_port(cfg.udp_port)
        .packet_size(cfg.packet_size)
        .count(cfg.count)
        .timeout(cfg.timeout)
        .build()?;
    let verbose = cfg.verbose;
    let result = prober.run_with(|outcome| {
        if verbose {
            match outcome.status {
                ProbeStatus::Answered(rtt) => {
                    eprintln!(
                        "seq={}: reply in {:.2} ms",
                        outcome.sequence.0,
                        rtt.as_secs_f64() * 1000.0
                    );
                }
                ProbeStatus::Lost => eprintln!("seq={}: no reply", outcome.sequence.0),
            }
        }
    })?;
    Privilege::drop_privileges()?;
    let stats = Stats::of(&result);
    let verdict = Verdict::classify(&stats, &cfg.thresholds);
    let report = Report::new(
        &cfg.a_side,
        &cfg.z_side,
        &cfg.destination,
        cfg.protocol,
        cfg.count,
        result.lost(),
        cfg.timeout,
        cfg.thresholds,
        &verdict,
    );
    print!("{}", report.render(cfg.output));
    Ok(verdict.severity.exit_code())
}

/// Resolve a destination to an IPv4 address.
///
/// Accepts an IP literal or a hostname. Hostnames resolving to only IPv6
/// addresses are rejected.
fn resolve(destination: &str) -> Result<IpAddr> {
    if let Ok(addr) = destination.parse::<IpAddr>() {
        if addr.is_ipv6() {
            return Err(anyhow!("IPv6 targets are not supported: {destination}"));
        }
        return Ok(addr);
    }
    let addrs = dns_lookup::lookup_host(destination)
        .with_context(|| format!("failed to resolve {destination}"))?;
    addrs
        .into_iter()
        .find(IpAddr::is_ipv4)
        .ok_or_else(|| anyhow!("no IPv4 address found for {destination}"))
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("qping=debug")),
        )
        .compact()
        .init();
}
