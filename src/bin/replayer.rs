//! `sentinel-replay` - plays a recorded session back onto the wire.
//!
//! Reads the append-only record format and resends each frame over UDP at
//! the configured speed, or prints frame summaries with `--dry-run`.

use anyhow::Context;
use clap::Parser;
use sentinel::protocol::{FrameHeader, MsgType};
use sentinel::{FrameSink, FrameSource, ReplayFrameSource, UdpFrameSink};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "sentinel-replay", version, about = "Recorded session replayer")]
struct Cli {
    /// Recorded file to replay
    #[arg(long)]
    file: PathBuf,

    /// Playback speed (1.0 = real-time, 0.0 = as fast as possible)
    #[arg(long, default_value_t = 1.0)]
    speed: f64,

    /// Target host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Target UDP port
    #[arg(long, default_value_t = 5000)]
    port: u16,

    /// Print frame summaries without sending
    #[arg(long)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut replay = ReplayFrameSource::open(&cli.file)
        .with_context(|| format!("could not open file: {}", cli.file.display()))?;
    replay.set_speed(cli.speed);

    let mut sink = if cli.dry_run {
        None
    } else {
        Some(
            UdpFrameSink::connect(&cli.host, cli.port)
                .with_context(|| format!("could not connect to {}:{}", cli.host, cli.port))?,
        )
    };

    let start = Instant::now();
    let mut buf = Vec::new();

    while replay.receive(&mut buf) {
        match &mut sink {
            Some(sink) => {
                sink.send(&buf);
            }
            None => match FrameHeader::decode(&buf) {
                Some(header) => {
                    let type_name = MsgType::from_u8(header.msg_type)
                        .map_or("UNKNOWN", MsgType::name);
                    println!(
                        "Frame {}: src_id={} seq={} type={} len={}",
                        replay.frames_replayed(),
                        header.src_id,
                        header.seq,
                        type_name,
                        buf.len()
                    );
                }
                None => {
                    println!(
                        "Frame {}: len={} (too short for header)",
                        replay.frames_replayed(),
                        buf.len()
                    );
                }
            },
        }
    }

    let elapsed = start.elapsed();
    println!("\n=== Replay Summary ===");
    println!("Frames replayed: {}", replay.frames_replayed());
    println!("Duration: {} ms", elapsed.as_millis());
    if !elapsed.is_zero() && replay.frames_replayed() > 0 {
        println!(
            "Effective rate: {:.0} frames/sec",
            replay.frames_replayed() as f64 / elapsed.as_secs_f64()
        );
    }

    Ok(())
}
