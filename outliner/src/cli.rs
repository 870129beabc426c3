//! Command-line interface definitions for outliner

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// What to print for a parsed outline
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Outline tree as JSON
    Json,
    /// Flattened drag-and-drop items as JSON
    Items,
    /// Outline markdown
    Markdown,
    /// One line per chapter with its section count
    Summary,
}

/// CLI structure for the outliner application
#[derive(Parser)]
#[command(name = "outliner")]
#[command(version)]
#[command(about = "Incremental outline parser for streamed LLM output", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./outliner.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for outliner
#[derive(Subcommand)]
pub enum Commands {
    /// Stream a markdown outline through the parser in chunks
    Parse {
        /// Outline markdown file
        input: PathBuf,

        /// Characters per simulated chunk (defaults to the configured replay size)
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replay recorded .sse transcripts and .md model outputs
    Replay {
        /// Transcript file or directory (defaults to current directory)
        #[arg(value_name = "PATH", default_value = ".")]
        path: PathBuf,

        /// Characters per simulated chunk (defaults to the configured replay size)
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "summary")]
        format: OutputFormat,

        /// Use `{file stem}-{n}` identifiers so output is reproducible
        #[arg(long)]
        stable_ids: bool,
    },

    /// Report what the streaming parse dropped from an outline
    Check {
        /// Outline markdown file
        input: PathBuf,

        /// Exit with an error when any finding is reported
        #[arg(long)]
        strict: bool,
    },

    /// Build the paper request string from an outline
    Prompt {
        /// Outline markdown file
        input: PathBuf,

        /// Move an item before sending, as FROM:TO list indices (repeatable)
        #[arg(long = "move", value_name = "FROM:TO", value_parser = parse_move)]
        moves: Vec<(usize, usize)>,

        /// Request prefix (defaults to the configured prefix)
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Write a default outliner.toml
    InitConfig {
        /// Target file (defaults to ./outliner.toml)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

fn parse_move(value: &str) -> Result<(usize, usize), String> {
    let (from, to) = value
        .split_once(':')
        .ok_or_else(|| format!("expected FROM:TO, got '{}'", value))?;
    let from = from
        .trim()
        .parse()
        .map_err(|_| format!("invalid source index '{}'", from))?;
    let to = to
        .trim()
        .parse()
        .map_err(|_| format!("invalid destination index '{}'", to))?;
    Ok((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_move() {
        assert_eq!(parse_move("2:0"), Ok((2, 0)));
        assert!(parse_move("2").is_err());
        assert!(parse_move("a:1").is_err());
    }

    #[test]
    fn test_cli_parses_prompt_moves() {
        let cli = Cli::parse_from([
            "outliner", "prompt", "plan.md", "--move", "2:0", "--move", "1:3",
        ]);
        match cli.command {
            Commands::Prompt { moves, prefix, .. } => {
                assert_eq!(moves, vec![(2, 0), (1, 3)]);
                assert_eq!(prefix, None);
            }
            _ => panic!("expected prompt"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["outliner", "check", "plan.md", "--strict", "-v"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Check { strict: true, .. }));
    }
}
