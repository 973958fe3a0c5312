//! CLI module
//!
//! This module defines the command-line interface using clap and implements
//! the command execution logic.

use crate::{Config, Result};
use clap::{CommandFactory, Parser, ValueEnum};
use std::path::PathBuf;

pub mod commands;
pub mod output;

/// Hierarchical state machine diagram generator
#[derive(Parser, Debug)]
#[command(name = "hsm-viz")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// C++ sources declaring the state machine, parsed into one graph
    pub files: Vec<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, env = "HSM_VIZ_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "dot")]
    pub format: OutputFormat,

    /// Only print states whose name contains this (case-insensitive, repeatable)
    #[arg(long)]
    pub allow: Vec<String>,

    /// Never print states whose name contains this (case-insensitive, repeatable)
    #[arg(long)]
    pub deny: Vec<String>,

    /// Lay the diagram out left to right
    #[arg(long)]
    pub left_to_right: bool,

    /// Disable node coloring
    #[arg(long)]
    pub no_color: bool,

    /// Log level (overrides config; RUST_LOG overrides both)
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Output format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// DOT format (Graphviz)
    Dot,
    /// JSON dump of the finalized graph
    Json,
    /// Plain text table
    Table,
}

impl Cli {
    /// Fold command-line flags into the loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        config.filter.allow.extend(self.allow.iter().cloned());
        config.filter.deny.extend(self.deny.iter().cloned());
        if self.left_to_right {
            config.render.left_to_right = true;
        }
        if self.no_color {
            config.render.use_color = false;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}

/// Execute the CLI command
pub fn execute(args: Cli, config: Config) -> Result<()> {
    if args.files.is_empty() {
        Cli::command().print_help()?;
        return Ok(());
    }
    commands::render::execute(&args.files, args.format, &config, &mut std::io::stdout())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "hsm-viz",
            "Player.cpp",
            "Enemy.cpp",
            "--format",
            "json",
            "--deny",
            "Alive",
            "--deny",
            "Grounded",
            "--no-color",
        ])
        .unwrap();

        assert_eq!(cli.files.len(), 2);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.deny, vec!["Alive", "Grounded"]);
        assert!(cli.no_color);
        assert!(!cli.left_to_right);
    }

    #[test]
    fn test_no_files_is_accepted() {
        let cli = Cli::try_parse_from(["hsm-viz"]).unwrap();
        assert!(cli.files.is_empty());
        assert_eq!(cli.format, OutputFormat::Dot);
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["hsm-viz", "--format", "svg", "a.cpp"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "hsm-viz",
            "--allow",
            "Gatling",
            "--left-to-right",
            "--no-color",
            "--log-level",
            "debug",
            "Player.cpp",
        ])
        .unwrap();

        let mut config = Config::default();
        config.filter.allow.push("Fighting".to_string());
        cli.apply_overrides(&mut config);

        assert_eq!(config.filter.allow, vec!["Fighting", "Gatling"]);
        assert!(config.render.left_to_right);
        assert!(!config.render.use_color);
        assert_eq!(config.logging.level, "debug");
    }
}
