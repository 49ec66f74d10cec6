//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// blogprobe: browser-driven acceptance tests for the blog application
#[derive(Parser, Debug)]
#[command(name = "blogprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run acceptance scenarios
    Run(RunArgs),

    /// List scenarios without running them
    List(ListArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunArgs {
    /// Run against the in-process mock blog application
    #[arg(long)]
    pub mock: bool,

    /// YAML scenario file (defaults to the built-in blog suite)
    #[arg(short, long, env = "BLOGPROBE_SCENARIOS")]
    pub scenarios: Option<PathBuf>,

    /// Harness configuration file (YAML)
    #[arg(short, long, env = "BLOGPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write the JSON report to this path
    #[arg(short, long)]
    pub report: Option<PathBuf>,

    /// Only run scenarios whose full name contains this text
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Stop after the first failed scenario
    #[arg(long)]
    pub fail_fast: bool,

    /// Frontend URL
    #[arg(long, env = "BLOGPROBE_FRONTEND_URL")]
    pub frontend_url: Option<String>,

    /// Backend URL (testing API)
    #[arg(long, env = "BLOGPROBE_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Ceiling for every wait, in milliseconds
    #[arg(long, env = "BLOGPROBE_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Poll interval for waits, in milliseconds
    #[arg(long, env = "BLOGPROBE_POLL_INTERVAL_MS")]
    pub poll_interval_ms: Option<u64>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Chromium executable
    #[arg(long, env = "BLOGPROBE_CHROMIUM")]
    pub chromium: Option<PathBuf>,

    /// Launch Chromium without its sandbox (containers)
    #[arg(long)]
    pub no_sandbox: bool,
}

/// Arguments for the list command
#[derive(Parser, Debug, Default)]
pub struct ListArgs {
    /// YAML scenario file (defaults to the built-in blog suite)
    #[arg(short, long, env = "BLOGPROBE_SCENARIOS")]
    pub scenarios: Option<PathBuf>,

    /// Only list scenarios whose full name contains this text
    #[arg(short, long)]
    pub filter: Option<String>,
}

/// Color argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
