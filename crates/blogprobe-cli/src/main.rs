//! blogprobe: acceptance tests for the blog application
//!
//! ## Usage
//!
//! ```bash
//! blogprobe run                          # Built-in suite against the live app
//! blogprobe run --mock                   # Built-in suite against the mock app
//! blogprobe run --scenarios blog.yaml    # Custom scenarios
//! blogprobe run --report report.json     # Write a JSON report
//! blogprobe list --filter Login          # Show scenario names
//! ```

use blogprobe_cli::{
    list_scenarios, outcome, Cli, CliConfig, CliError, CliResult, ColorChoice, Commands,
    SuiteRunner, Verbosity,
};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_tracing(config.verbosity);

    match cli.command {
        Commands::Run(args) => {
            let rt = tokio::runtime::Runtime::new().map_err(|e| {
                CliError::config(format!("failed to start async runtime: {e}"))
            })?;
            let runner = SuiteRunner::new(&config);
            let report = rt.block_on(runner.run(&args))?;
            outcome(&report)
        }
        Commands::List(args) => {
            for name in list_scenarios(&args)? {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    let color: ColorChoice = cli.color.clone().into();
    CliConfig::new().with_verbosity(verbosity).with_color(color)
}

/// `RUST_LOG` wins over `-v`/`-q`
fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_directive()));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
