//! CLI configuration

use crate::commands::RunArgs;
use crate::error::CliResult;
use blogprobe::HarnessConfig;
use serde::{Deserialize, Serialize};

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Quiet - minimal output
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - extra output
    Verbose,
    /// Debug - maximum output
    Debug,
}

impl Verbosity {
    /// From the `-q` flag and the `-v` count
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Check if verbose or higher
    #[must_use]
    pub const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose | Self::Debug)
    }

    /// Log filter used when `RUST_LOG` is unset
    #[must_use]
    pub const fn log_directive(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "blogprobe=info,warn",
            Self::Debug => "blogprobe=debug,info",
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => console::Term::stderr().features().colors_supported(),
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Color output choice
    pub color: ColorChoice,
}

impl CliConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set color choice
    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }
}

/// Harness configuration for a run: the config file (or defaults), then
/// flags and `BLOGPROBE_*` variables on top.
pub fn harness_config(args: &RunArgs) -> CliResult<HarnessConfig> {
    let mut config = match &args.config {
        Some(path) => HarnessConfig::from_yaml_file(path)?,
        None => HarnessConfig::default(),
    };
    if let Some(url) = &args.frontend_url {
        config = config.with_frontend_url(url.clone());
    }
    if let Some(url) = &args.backend_url {
        config = config.with_backend_url(url.clone());
    }
    if let Some(ms) = args.timeout_ms {
        config = config.with_timeout_ms(ms);
    }
    if let Some(ms) = args.poll_interval_ms {
        config = config.with_poll_interval_ms(ms);
    }
    if let Some(filter) = &args.filter {
        config = config.with_filter(filter.clone());
    }
    if args.fail_fast {
        config = config.with_fail_fast(true);
    }
    if args.headed {
        config = config.with_headless(false);
    }
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(true, 3), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, 0), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(false, 1), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(false, 5), Verbosity::Debug);
    }

    #[test]
    fn test_verbosity_checks() {
        assert!(Verbosity::Quiet.is_quiet());
        assert!(!Verbosity::Normal.is_verbose());
        assert!(Verbosity::Debug.is_verbose());
        assert!(Verbosity::Debug.log_directive().contains("blogprobe=debug"));
    }

    #[test]
    fn test_color_choice() {
        assert!(ColorChoice::Always.should_color());
        assert!(!ColorChoice::Never.should_color());
    }

    #[test]
    fn test_cli_config_builder() {
        let config = CliConfig::new()
            .with_verbosity(Verbosity::Verbose)
            .with_color(ColorChoice::Never);
        assert_eq!(config.verbosity, Verbosity::Verbose);
        assert_eq!(config.color, ColorChoice::Never);
    }

    #[test]
    fn test_harness_config_defaults() {
        let config = harness_config(&RunArgs::default()).unwrap();
        assert_eq!(config, HarnessConfig::default());
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "frontend_url: http://localhost:8080\ntimeout_ms: 3000\nfail_fast: false"
        )
        .unwrap();
        let args = RunArgs {
            config: Some(file.path().to_path_buf()),
            timeout_ms: Some(500),
            fail_fast: true,
            headed: true,
            ..RunArgs::default()
        };
        let config = harness_config(&args).unwrap();
        assert_eq!(config.frontend_url, "http://localhost:8080");
        assert_eq!(config.timeout_ms, 500);
        assert!(config.fail_fast);
        assert!(!config.headless);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let args = RunArgs {
            timeout_ms: Some(0),
            ..RunArgs::default()
        };
        assert!(harness_config(&args).is_err());
    }
}
