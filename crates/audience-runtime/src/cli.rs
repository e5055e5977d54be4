//! CLI definition using clap derive.

use std::path::PathBuf;

use audience_core::Times;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "audience", about = "Deliver chat, action-bar and title content to host recipients")]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(long, short = 'c', global = true, env = "AUDIENCE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Probe a host and print what was bound (JSON)
    Probe(ProbeOpts),
    /// Deliver content to every recipient a host declares
    Send(SendOpts),
}

#[derive(Args)]
pub struct ProbeOpts {
    /// Host manifest (TOML)
    #[arg(long, short = 'm')]
    pub manifest: PathBuf,
}

#[derive(Args)]
pub struct SendOpts {
    /// Host manifest (TOML)
    #[arg(long, short = 'm')]
    pub manifest: PathBuf,

    #[command(subcommand)]
    pub content: Content,
}

#[derive(Subcommand)]
pub enum Content {
    /// Chat message
    Message { text: String },
    /// Action-bar overlay
    ActionBar { text: String },
    /// Titled screen overlay
    Title(TitleOpts),
}

#[derive(Args, Default)]
pub struct TitleOpts {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub subtitle: Option<String>,

    #[arg(long)]
    pub action_bar: Option<String>,

    /// Fade in, stay and fade out in ticks, e.g. `10,60,10`
    #[arg(long, value_parser = parse_times)]
    pub times: Option<Times>,

    /// Clear the current title first
    #[arg(long)]
    pub clear: bool,

    /// Reset title timings first
    #[arg(long)]
    pub reset: bool,
}

pub fn parse_times(raw: &str) -> Result<Times, String> {
    let parts = raw
        .split(',')
        .map(|p| p.trim().parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid tick count in {raw:?}: {e}"))?;
    match parts.as_slice() {
        [fade_in, stay, fade_out] => Ok(Times::new(*fade_in, *stay, *fade_out)),
        _ => Err(format!("expected three values like 10,60,10, got {raw:?}")),
    }
}
