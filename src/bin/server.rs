use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use match_protocol::console::StdConsole;
use match_protocol::GameServer;

/// Hosts a single two-player match.
#[derive(Parser)]
struct Args {
    /// Port to listen on.
    #[arg(long, default_value_t = 5000)]
    port: u16,

    /// Optional bound, in seconds, on waiting for a player's reply.
    /// Unset means waiting forever.
    #[arg(long)]
    move_timeout_secs: Option<u64>,
}

fn main() -> Result<()> {
    // Logs go to stderr so operator prompts on stdout stay clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let server = GameServer::bind(args.port)?
        .with_move_timeout(args.move_timeout_secs.map(Duration::from_secs));

    let outcome = server.run(&mut StdConsole)?;
    println!("Game over: {outcome}");
    Ok(())
}
