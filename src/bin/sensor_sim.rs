//! `sentinel-sim` - synthetic sensor traffic generator.
//!
//! Populates a seeded world under a scenario profile, ticks it at the
//! configured rate, turns the population into telemetry frames, pushes them
//! through the fault injector and sends the survivors at the gateway.

use anyhow::{bail, Context};
use clap::Parser;
use sentinel::sim::{
    FaultConfig, FaultInjector, MeasurementGenerator, ObjectGenerator, ScenarioProfile, WorldModel,
};
use sentinel::{FrameSink, UdpFrameSink};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(name = "sentinel-sim", version, about = "Synthetic sensor simulator")]
struct Cli {
    /// Scenario profile: idle, patrol, raid, stress
    #[arg(long, default_value = "patrol")]
    profile: String,

    /// Load the scenario profile from a JSON file instead
    #[arg(long)]
    profile_file: Option<PathBuf>,

    /// Target host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Target UDP port
    #[arg(long, default_value_t = 5000)]
    port: u16,

    /// World tick rate in Hz
    #[arg(long, default_value_t = 50.0)]
    rate: f64,

    /// Duration in seconds
    #[arg(long, default_value_t = 10.0)]
    duration: f64,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Source id stamped into every frame
    #[arg(long, default_value_t = 1)]
    src_id: u16,

    /// Append a CRC-32 to every frame
    #[arg(long)]
    crc: bool,

    /// Packet loss percentage
    #[arg(long, default_value_t = 0.0)]
    loss: f64,

    /// Reorder percentage
    #[arg(long, default_value_t = 0.0)]
    reorder: f64,

    /// Duplicate percentage
    #[arg(long, default_value_t = 0.0)]
    duplicate: f64,

    /// Corruption percentage
    #[arg(long, default_value_t = 0.0)]
    corrupt: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if cli.rate <= 0.0 {
        bail!("tick rate must be positive");
    }

    let profile = match &cli.profile_file {
        Some(path) => ScenarioProfile::load(path)
            .with_context(|| format!("failed to load profile from {}", path.display()))?,
        None => ScenarioProfile::by_name(&cli.profile)
            .with_context(|| format!("unknown profile: {}", cli.profile))?,
    };

    println!("=== Sensor Simulator ===");
    println!("Profile:   {}", profile.name);
    println!("Target:    {}:{}", cli.host, cli.port);
    println!("Rate:      {} Hz", cli.rate);
    println!("Duration:  {} s", cli.duration);
    println!("Seed:      {}", cli.seed);
    println!(
        "Faults:    loss={}% reorder={}% dup={}% corrupt={}%",
        cli.loss, cli.reorder, cli.duplicate, cli.corrupt
    );

    let mut generator = ObjectGenerator::new(profile, cli.seed);
    let mut world = WorldModel::new();
    let mut measurer = MeasurementGenerator::new(cli.src_id, cli.seed + 100);
    measurer.set_crc(cli.crc);

    let fault_config = FaultConfig {
        loss_pct: cli.loss,
        reorder_pct: cli.reorder,
        duplicate_pct: cli.duplicate,
        corrupt_pct: cli.corrupt,
    };
    let mut injector = FaultInjector::new(fault_config, cli.seed + 200);

    let mut sink = UdpFrameSink::connect(&cli.host, cli.port)
        .with_context(|| format!("failed to connect to {}:{}", cli.host, cli.port))?;

    for obj in generator.generate_initial() {
        world.add_object(obj);
    }
    println!("Initial objects: {}", world.active_count());
    println!("Starting simulation...\n");

    let dt = 1.0 / cli.rate;
    let total_ticks = (cli.duration * cli.rate) as u64;

    let mut frames_sent: u64 = 0;
    let mut frames_dropped: u64 = 0;
    let mut frames_reordered: u64 = 0;
    let mut frames_duplicated: u64 = 0;
    let mut frames_corrupted: u64 = 0;

    let start = Instant::now();
    let mut next_tick = start;

    for tick in 0..total_ticks {
        let current_time_s = tick as f64 * dt;
        let timestamp_ns = (current_time_s * 1e9) as u64;

        if let Some(obj) = generator.maybe_spawn(current_time_s) {
            world.add_object(obj);
        }
        world.tick(dt, current_time_s);

        let mut frames = measurer.generate_tracks(world.objects(), timestamp_ns);
        frames.extend(measurer.generate_plots(world.objects(), timestamp_ns));

        if tick % 50 == 0 {
            frames.push(measurer.generate_heartbeat(timestamp_ns));
        }

        injector.apply(&mut frames);
        let fault_stats = injector.last_stats();
        frames_dropped += u64::from(fault_stats.dropped);
        frames_reordered += u64::from(fault_stats.reordered);
        frames_duplicated += u64::from(fault_stats.duplicated);
        frames_corrupted += u64::from(fault_stats.corrupted);

        for frame in &frames {
            if sink.send(frame) {
                frames_sent += 1;
            }
        }

        next_tick += Duration::from_secs_f64(dt);
        let now = Instant::now();
        if next_tick > now {
            std::thread::sleep(next_tick - now);
        }

        if (tick + 1) % (cli.rate as u64).max(1) == 0 {
            print!("Progress: {}/{} ticks, {} frames sent\r", tick + 1, total_ticks, frames_sent);
            use std::io::Write;
            let _ = std::io::stdout().flush();
        }
    }

    let elapsed = start.elapsed();

    println!("\n\n=== Summary ===");
    println!("Ticks:            {total_ticks}");
    println!("Frames sent:      {frames_sent}");
    println!("Frames dropped:   {frames_dropped}");
    println!("Frames reordered: {frames_reordered}");
    println!("Frames duped:     {frames_duplicated}");
    println!("Frames corrupted: {frames_corrupted}");
    println!("Duration:         {} ms", elapsed.as_millis());
    if !elapsed.is_zero() && frames_sent > 0 {
        println!("Effective rate:   {:.0} frames/sec", frames_sent as f64 / elapsed.as_secs_f64());
    }

    Ok(())
}
