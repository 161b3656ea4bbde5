//! `sentinel-gateway` - the ingest daemon.
//!
//! Listens for telemetry datagrams (or replays a recording), hosts the TCP
//! control node, and prints final statistics on exit. In replay mode the
//! process terminates when the recording is exhausted.

use anyhow::Context;
use clap::Parser;
use sentinel::{ControlServer, ControlState, Gateway, GatewayConfig, Severity};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "sentinel-gateway", version, about = "Telemetry ingestion gateway")]
struct Cli {
    /// UDP port to listen on
    #[arg(long, default_value_t = 5000)]
    port: u16,

    /// Enable CRC validation (the default)
    #[arg(long, overrides_with = "no_crc")]
    crc: bool,

    /// Disable CRC validation
    #[arg(long)]
    no_crc: bool,

    /// Record received frames to this file
    #[arg(long)]
    record: Option<PathBuf>,

    /// Replay frames from this file instead of listening on UDP
    #[arg(long)]
    replay: Option<PathBuf>,

    /// TCP port for the operator control channel
    #[arg(long, default_value_t = 5050)]
    control_port: u16,

    /// Journal level: DEBUG, INFO, WARN, ALARM, ERROR, FATAL
    #[arg(long, default_value = "INFO")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let log_level = Severity::parse(&cli.log_level)
        .with_context(|| format!("invalid log level: {}", cli.log_level))?;

    let config = GatewayConfig {
        udp_port: cli.port,
        crc_enabled: !cli.no_crc,
        record_path: cli.record.clone(),
        replay_path: cli.replay.clone(),
        log_level,
    };

    eprintln!("starting gateway on UDP port {}", config.udp_port);
    if let Some(path) = &config.record_path {
        eprintln!("recording to: {}", path.display());
    }
    if let Some(path) = &config.replay_path {
        eprintln!("replaying from: {}", path.display());
    }
    eprintln!(
        "CRC validation: {}",
        if config.crc_enabled { "enabled" } else { "disabled" }
    );

    let journal = Arc::new(sentinel::Journal::new());
    let mut gateway = Gateway::new(config, journal);

    let control_state = Arc::new(ControlState::new(
        gateway.stats(),
        gateway.journal(),
        gateway.crc_policy(),
    ));
    let mut control = ControlServer::new(cli.control_port, control_state);
    control.start().context("failed to start control node")?;

    gateway.run().context("gateway terminated abnormally")?;

    control.stop();

    let stats = gateway.stats().global();
    eprintln!("\n=== Final Statistics ===");
    eprintln!("Frames received: {}", stats.rx_total);
    eprintln!("Malformed:       {}", stats.malformed_total);
    eprintln!("CRC failures:    {}", stats.crc_fail_total);
    eprintln!("Sequence gaps:   {}", stats.gap_total);
    eprintln!("Reorders:        {}", stats.reorder_total);
    eprintln!("Duplicates:      {}", stats.duplicate_total);

    Ok(())
}
