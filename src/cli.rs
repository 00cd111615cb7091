//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// MajorMap - discover transferable majors via articulation agreements
///
/// Given a receiving institution, MajorMap finds every partner
/// institution with an active articulation agreement, fetches each
/// partner's major reports for the most recent shared academic year,
/// and prints one deduplicated, sorted list of majors.
///
/// Examples:
///   majormap --institution 117
///   majormap --institution "State University" --format json
///   majormap --list-institutions
///   majormap --institution 117 --dry-run
///   majormap --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Receiving institution to query, by upstream id or by name
    ///
    /// A numeric value is treated as an id; anything else is matched
    /// against catalog display names (case-insensitive substring).
    #[arg(
        short,
        long,
        value_name = "ID_OR_NAME",
        required_unless_present_any = ["init_config", "list_institutions"]
    )]
    pub institution: Option<String>,

    /// Base URL of the articulation service
    ///
    /// Can also be set via MAJORMAP_BASE_URL or .majormap.toml.
    #[arg(short, long, value_name = "URL", env = "MAJORMAP_BASE_URL")]
    pub base_url: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .majormap.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Display-only substring filter over the final major list
    #[arg(long, value_name = "TEXT")]
    pub filter: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Retries on transient upstream failures
    #[arg(long, value_name = "COUNT")]
    pub retries: Option<u32>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// List receiving institutions from the catalog and exit
    #[arg(long)]
    pub list_institutions: bool,

    /// Resolve agreements and show per-partner resolution without
    /// fetching any major reports
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .majormap.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the major list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default)
    #[default]
    Text,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref base_url) = self.base_url {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err("Base URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref institution) = self.institution {
            if institution.trim().is_empty() {
                return Err("Institution must not be empty".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
