//! audience: probe host manifests and deliver content through the pipeline.

use anyhow::Context;
use audience_core::AudienceConfig;
use clap::Parser;

mod cli;
mod cmd_probe;
mod cmd_send;

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    let config = match &args.config {
        Some(path) => AudienceConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AudienceConfig::default(),
    };
    init_tracing(&config);

    match args.command {
        cli::Command::Probe(opts) => cmd_probe::cmd_probe(&config, &opts.manifest)?,
        cli::Command::Send(opts) => cmd_send::cmd_send(&config, &opts.manifest, opts.content)?,
    }

    Ok(())
}

/// `AUDIENCE_LOG`, then `RUST_LOG`, then the config file, then `info`.
/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing(config: &AudienceConfig) {
    let filter = std::env::var("AUDIENCE_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()
        .or_else(|| config.log.filter.clone())
        .unwrap_or_else(|| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}
