//! Command-line interface for textsift
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Stability filtering and ranked flushing for noisy text streams
#[derive(Parser, Debug)]
#[command(
    name = "textsift",
    version,
    about = "Stability filtering and ranked flushing for noisy text streams"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: pipeline summary, -vv: per-frame diagnostics)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// HTTP endpoint to POST flushed candidates to
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Flush interval (default: 20s). Examples: 30s, 5m, 1h30m
    #[arg(long, short = 'i', value_name = "DURATION", value_parser = parse_interval_secs)]
    pub interval: Option<u64>,

    /// Stability window size in frames
    #[arg(long, short = 'w', value_name = "N")]
    pub window: Option<usize>,

    /// Sightings within the window required to call a string stable
    #[arg(long, short = 't', value_name = "N")]
    pub threshold: Option<usize>,

    /// Substring marking a candidate as interesting
    #[arg(long, value_name = "STR")]
    pub marker: Option<String>,

    /// Read frames as tab-separated plain lines instead of JSON arrays
    #[arg(long)]
    pub plain: bool,
}

/// Parse a flush interval string into seconds.
///
/// Supports any duration format accepted by `humantime`: bare numbers (seconds),
/// single-unit (`30s`, `5m`, `2h`), and compound (`1h30m`, `2m30s`).
fn parse_interval_secs(s: &str) -> Result<u64, String> {
    let s = s.trim();
    // Bare number → seconds
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(secs);
    }
    humantime::parse_duration(s)
        .map(|d| d.as_secs())
        .map_err(|e| e.to_string())
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch a frame stream on stdin (default when no subcommand is given)
    Watch,

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,

    /// Print the configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_args_means_watch() {
        let cli = Cli::parse_from(["textsift"]);
        assert!(cli.command.is_none());
        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn parses_watch_flags() {
        let cli = Cli::parse_from([
            "textsift",
            "--endpoint",
            "http://localhost:5000/api/rawtext",
            "-i",
            "30s",
            "-w",
            "5",
            "-t",
            "3",
            "--marker",
            "#",
            "--plain",
        ]);
        assert_eq!(
            cli.endpoint.as_deref(),
            Some("http://localhost:5000/api/rawtext")
        );
        assert_eq!(cli.interval, Some(30));
        assert_eq!(cli.window, Some(5));
        assert_eq!(cli.threshold, Some(3));
        assert_eq!(cli.marker.as_deref(), Some("#"));
        assert!(cli.plain);
    }

    #[test]
    fn interval_accepts_bare_seconds_and_compound_durations() {
        assert_eq!(parse_interval_secs("20"), Ok(20));
        assert_eq!(parse_interval_secs("90s"), Ok(90));
        assert_eq!(parse_interval_secs("1m30s"), Ok(90));
        assert_eq!(parse_interval_secs("2h"), Ok(7200));
        assert!(parse_interval_secs("soon").is_err());
    }

    #[test]
    fn verbose_flag_counts() {
        let cli = Cli::parse_from(["textsift", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn config_subcommands_parse() {
        let cli = Cli::parse_from(["textsift", "config", "show"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigAction::Show
            })
        ));

        let cli = Cli::parse_from(["textsift", "config", "path"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigAction::Path
            })
        ));
    }

    #[test]
    fn global_config_flag_works_after_subcommand() {
        let cli = Cli::parse_from(["textsift", "config", "show", "--config", "/tmp/t.toml"]);
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/tmp/t.toml")));
    }
}
