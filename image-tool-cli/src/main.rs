//! # Image Tool CLI
//!
//! Replays host sessions against a headless image tool widget.

use clap::Parser;
use image_tool_cli::{describe_source, run_replay, step_size, CliArgs, Command, ReplayConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,image_tool_cli=info,image_tool_core=info"));

    // Logs go to stderr so stdout stays machine-readable
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    // Use JSON format in production (RUST_LOG_FORMAT=json)
    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    match args.command {
        Command::Replay(replay_args) => {
            let config = ReplayConfig::from(replay_args);
            tracing::debug!(script = %config.script.display(), format = ?config.format, "replay");
            println!("{}", run_replay(&config)?);
        }
        Command::Resolve { url } => {
            println!("{}", describe_source(&url)?);
        }
        Command::Adjust {
            width,
            height,
            direction,
        } => match step_size(&width, &height, direction) {
            Some(size) => println!("{size}"),
            None => tracing::warn!(%width, %height, "width and height must both be set"),
        },
    }
    Ok(())
}
