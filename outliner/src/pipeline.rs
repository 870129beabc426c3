//! Transcript replay pipeline
//!
//! Replays recorded outline streams from disk in three stages:
//! 1. **Discovery**: find `.sse` transcripts and `.md` model outputs
//! 2. **Replay**: push each file through its own session in small chunks,
//!    exactly as a live stream would arrive
//! 3. **Audit**: compare the final text with the tree that was built

use crate::outline_audit::{audit, AuditFinding};
use crate::outline_config::OutlinerConfig;
use crate::outline_model::{Document, IdSource, SequentialIds, UuidIds};
use crate::session::{OutlineSession, SessionState};
use crate::stream_parser::OutlineParser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use walkdir::WalkDir;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// How a transcript file is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptKind {
    /// Raw `text/event-stream` response body
    Sse,
    /// Raw model output, streamed as cumulative text
    Text,
}

impl TranscriptKind {
    /// Pick the kind from the file extension
    pub fn of(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("sse") => TranscriptKind::Sse,
            _ => TranscriptKind::Text,
        }
    }
}

/// Settings for one replay run
#[derive(Debug, Clone)]
pub struct ReplayOptions {
    /// Characters per simulated network chunk
    pub chunk_size: usize,
    /// Use `{file stem}-{n}` identifiers instead of random UUIDs
    pub deterministic_ids: bool,
}

impl ReplayOptions {
    pub fn from_config(config: &OutlinerConfig) -> Self {
        Self {
            chunk_size: config.stream.replay_chunk_size,
            deterministic_ids: false,
        }
    }
}

/// Outcome of replaying one transcript
#[derive(Debug, Clone)]
pub struct ReplayReport {
    /// Transcript file
    pub source: PathBuf,
    pub kind: TranscriptKind,
    /// Final outline
    pub document: Arc<Document>,
    /// Chunks fed
    pub fragments: usize,
    /// Cumulative outline text
    pub text: String,
    /// Scanner cursor after the last chunk
    pub cursor: usize,
    pub state: SessionState,
    pub findings: Vec<AuditFinding>,
}

/// Replay errors
#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("IO error reading {path}: {source}", path = .0.display(), source = .1)]
    IoError(PathBuf, #[source] std::io::Error),

    #[error("Error walking {path}: {source}", path = .0.display(), source = .1)]
    WalkError(PathBuf, #[source] walkdir::Error),

    #[error("Chunk size must be at least 1")]
    InvalidChunkSize,
}

/// Stage 1: find transcripts under `root`
///
/// # Parameters
/// * `root` - A transcript file, or a directory searched recursively
///
/// # Returns
/// * `Ok(Vec<PathBuf>)` - `.sse` and `.md` files sorted by path
/// * `Err(ReplayError)` - Error reading the directory tree
pub fn discover_transcripts(root: &Path) -> Result<Vec<PathBuf>, ReplayError> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| ReplayError::WalkError(root.to_path_buf(), e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("sse") | Some("md")
        ) {
            paths.push(path.to_path_buf());
        }
    }
    paths.sort();

    log::info!("Found {} transcripts under {}", paths.len(), root.display());
    Ok(paths)
}

/// Stages 2 and 3 for a single file
pub fn replay_path(
    path: &Path,
    config: &OutlinerConfig,
    options: &ReplayOptions,
) -> Result<ReplayReport, ReplayError> {
    if options.chunk_size == 0 {
        return Err(ReplayError::InvalidChunkSize);
    }
    let content =
        std::fs::read_to_string(path).map_err(|e| ReplayError::IoError(path.to_path_buf(), e))?;
    let ids = id_source(path, options);
    let kind = TranscriptKind::of(path);

    let (document, fragments, text, cursor, state) = match kind {
        TranscriptKind::Sse => {
            let (session, fragments) = replay_sse(&content, config, ids, options.chunk_size);
            (
                session.document(),
                fragments,
                session.text().to_string(),
                session.parser().cursor(),
                session.state().clone(),
            )
        }
        TranscriptKind::Text => {
            let (parser, fragments) = replay_text(&content, config, ids, options.chunk_size);
            (
                parser.document(),
                fragments,
                content,
                parser.cursor(),
                SessionState::Closed,
            )
        }
    };

    let findings = audit(&text, cursor, &document);
    log::info!(
        "Replayed {} in {} chunks: {} chapters, {} findings",
        path.display(),
        fragments,
        document.chapters.len(),
        findings.len()
    );

    Ok(ReplayReport {
        source: path.to_path_buf(),
        kind,
        document,
        fragments,
        text,
        cursor,
        state,
        findings,
    })
}

/// Replay many files, each in isolation (in parallel with the `parallel` feature)
pub fn replay_all(
    paths: &[PathBuf],
    config: &OutlinerConfig,
    options: &ReplayOptions,
) -> Vec<Result<ReplayReport, ReplayError>> {
    #[cfg(feature = "parallel")]
    let reports = paths
        .par_iter()
        .map(|path| replay_path(path, config, options))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let reports = paths
        .iter()
        .map(|path| replay_path(path, config, options))
        .collect();

    reports
}

/// Stream `text` into a fresh parser as cumulative prefixes of `chunk_size` chars
pub fn replay_text(
    text: &str,
    config: &OutlinerConfig,
    ids: Box<dyn IdSource>,
    chunk_size: usize,
) -> (OutlineParser, usize) {
    let mut parser = OutlineParser::with_ids(config, ids);
    let ends = chunk_ends(text, chunk_size);
    for &end in &ends {
        parser.feed(&text[..end]);
    }
    (parser, ends.len())
}

/// Push a raw SSE body into a fresh session in `chunk_size` char pieces, then close it
pub fn replay_sse(
    body: &str,
    config: &OutlinerConfig,
    ids: Box<dyn IdSource>,
    chunk_size: usize,
) -> (OutlineSession, usize) {
    let mut session = OutlineSession::with_ids(config, ids);
    let ends = chunk_ends(body, chunk_size);
    let mut start = 0;
    for &end in &ends {
        if session.is_finished() {
            break;
        }
        // failures are recorded in the session state
        let _ = session.push(&body[start..end]);
        start = end;
    }
    session.close();
    (session, ends.len())
}

/// Byte offsets ending each chunk of `size` characters; the last is `text.len()`
fn chunk_ends(text: &str, size: usize) -> Vec<usize> {
    let mut ends: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .step_by(size.max(1))
        .skip(1)
        .collect();
    ends.push(text.len());
    ends
}

fn id_source(path: &Path, options: &ReplayOptions) -> Box<dyn IdSource> {
    if options.deterministic_ids {
        let seed = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("outline");
        Box::new(SequentialIds::new(seed))
    } else {
        Box::new(UuidIds)
    }
}
