use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use match_protocol::console::StdConsole;
use match_protocol::GameClient;

/// Joins a match hosted by the server.
#[derive(Parser)]
struct Args {
    /// Server host to connect to.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port.
    #[arg(long, default_value_t = 5000)]
    port: u16,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut client = GameClient::connect((args.host.as_str(), args.port))?;
    client.run(&mut StdConsole)?;
    Ok(())
}
