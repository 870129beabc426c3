mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, OutputFormat};
use outliner::markdown_exporter;
use outliner::outline_audit;
use outliner::outline_config::{OutlinerConfig, CONFIG_FILE_NAME};
use outliner::outline_model::{Document, UuidIds};
use outliner::pipeline::{self, ReplayOptions};
use outliner::projection::OutlineList;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Main entry point for the outliner CLI application
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

/// Run the CLI application
fn run() -> Result<()> {
    let cli = Cli::parse();

    // Warnings about dropped content are always shown; --verbose adds progress
    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            log::LevelFilter::Info
        } else {
            log::LevelFilter::Warn
        })
        .init();

    let config = || {
        OutlinerConfig::discover(cli.config.as_deref())
            .context("Failed to load outliner configuration")
    };

    match cli.command {
        Commands::Parse {
            input,
            chunk_size,
            format,
            output,
        } => {
            handle_parse_command(&config()?, &input, chunk_size, format, output)?;
        }

        Commands::Replay {
            path,
            chunk_size,
            format,
            stable_ids,
        } => {
            handle_replay_command(&config()?, &path, chunk_size, format, stable_ids)?;
        }

        Commands::Check { input, strict } => {
            handle_check_command(&config()?, &input, strict)?;
        }

        Commands::Prompt {
            input,
            moves,
            prefix,
        } => {
            handle_prompt_command(&config()?, &input, &moves, prefix)?;
        }

        Commands::InitConfig { path, force } => {
            handle_init_config_command(path, force)?;
        }
    }

    Ok(())
}

/// Handle the parse command
fn handle_parse_command(
    config: &OutlinerConfig,
    input: &Path,
    chunk_size: Option<usize>,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let text = read_outline(input)?;
    let chunk_size = resolve_chunk_size(config, chunk_size)?;

    let (parser, fragments) = pipeline::replay_text(&text, config, Box::new(UuidIds), chunk_size);
    log::info!(
        "Parsed {} in {} chunks, {} tokens",
        input.display(),
        fragments,
        parser.tokens_seen()
    );

    let rendered = render(&parser.document(), format)?;
    match output {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✓ Successfully wrote: {}", path.display());
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

/// Handle the replay command
fn handle_replay_command(
    config: &OutlinerConfig,
    path: &Path,
    chunk_size: Option<usize>,
    format: OutputFormat,
    stable_ids: bool,
) -> Result<()> {
    let options = ReplayOptions {
        chunk_size: resolve_chunk_size(config, chunk_size)?,
        deterministic_ids: stable_ids,
    };

    let paths = pipeline::discover_transcripts(path)
        .with_context(|| format!("Failed to find transcripts in {}", path.display()))?;
    if paths.is_empty() {
        anyhow::bail!("No .sse or .md transcripts found in {}", path.display());
    }

    let mut failed = 0;
    for result in pipeline::replay_all(&paths, config, &options) {
        match result {
            Ok(report) => {
                println!(
                    "{} [{:?}, {} chunks, {:?}]",
                    report.source.display(),
                    report.kind,
                    report.fragments,
                    report.state
                );
                print!("{}", render(&report.document, format)?);
                for finding in &report.findings {
                    println!("  ! {}", finding);
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("✗ {}", e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} transcripts could not be replayed", failed, paths.len());
    }
    println!("\n✓ Replayed {} transcripts", paths.len());

    Ok(())
}

/// Handle the check command
fn handle_check_command(config: &OutlinerConfig, input: &Path, strict: bool) -> Result<()> {
    let text = read_outline(input)?;
    let (parser, _) = pipeline::replay_text(&text, config, Box::new(UuidIds), text.len().max(1));
    let document = parser.document();
    let findings = outline_audit::audit(&text, parser.cursor(), &document);

    println!(
        "{}: {} chapters, {} sections",
        input.display(),
        document.chapters.len(),
        document.section_count()
    );
    for finding in &findings {
        println!("  ! {}", finding);
    }

    if findings.is_empty() {
        println!("✓ Outline is clean");
    } else if strict {
        anyhow::bail!("{} audit findings in {}", findings.len(), input.display());
    }

    Ok(())
}

/// Handle the prompt command
fn handle_prompt_command(
    config: &OutlinerConfig,
    input: &Path,
    moves: &[(usize, usize)],
    prefix: Option<String>,
) -> Result<()> {
    let text = read_outline(input)?;
    let (parser, _) = pipeline::replay_text(&text, config, Box::new(UuidIds), text.len().max(1));

    let mut list = OutlineList::from_document(&parser.document());
    for &(from, to) in moves {
        list.move_item(from, Some(to))
            .with_context(|| format!("Failed to move item {} to {}", from, to))?;
    }

    let prefix = prefix.unwrap_or_else(|| config.paper.request_prefix.clone());
    println!("{}", list.paper_request(&prefix));

    Ok(())
}

/// Handle the init-config command
fn handle_init_config_command(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite it",
            path.display()
        );
    }

    OutlinerConfig::default()
        .save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("✓ Successfully wrote: {}", path.display());

    Ok(())
}

fn read_outline(input: &Path) -> Result<String> {
    std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input.display()))
}

fn resolve_chunk_size(config: &OutlinerConfig, chunk_size: Option<usize>) -> Result<usize> {
    match chunk_size.unwrap_or(config.stream.replay_chunk_size) {
        0 => anyhow::bail!("Chunk size must be at least 1"),
        size => Ok(size),
    }
}

fn render(document: &Arc<Document>, format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(document.as_ref())?;
            json.push('\n');
            json
        }
        OutputFormat::Items => {
            let list = OutlineList::from_document(document);
            let mut json = serde_json::to_string_pretty(&list)?;
            json.push('\n');
            json
        }
        OutputFormat::Markdown => markdown_exporter::render_document(document),
        OutputFormat::Summary => {
            let mut summary = format!("  title: {}\n", document.title);
            for chapter in &document.chapters {
                summary.push_str(&format!(
                    "  - {} ({} sections)\n",
                    chapter.title,
                    chapter.sections.len()
                ));
            }
            summary
        }
    };
    Ok(rendered)
}
