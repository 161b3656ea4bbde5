//! `sentinelctl` - one-shot operator commands against a control node.
//!
//! ```text
//! sentinelctl --port 5050 GET STATS
//! sentinelctl SET CRC=OFF
//! ```

use anyhow::Context;
use clap::Parser;
use sentinel::ControlClient;

#[derive(Parser, Debug)]
#[command(name = "sentinelctl", version, about = "Gateway control client")]
struct Cli {
    /// Control node host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Control node TCP port
    #[arg(long, default_value_t = 5050)]
    port: u16,

    /// Command words, e.g. GET HEALTH or SET CRC=OFF
    #[arg(required = true, trailing_var_arg = true)]
    command: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut client = ControlClient::connect(&cli.host, cli.port)
        .with_context(|| format!("could not connect to {}:{}", cli.host, cli.port))?;

    let command = cli.command.join(" ");
    let reply = client.send_command(&command).context("command failed")?;
    println!("{reply}");

    Ok(())
}
