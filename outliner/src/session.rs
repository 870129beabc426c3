//! Outline generation session
//!
//! Drives one outline request end to end: decodes the SSE body, accumulates
//! the delta `content` of each frame into the cumulative outline text, feeds
//! that text to the parser and fans the resulting snapshots out to observers.
//! End of outline is only ever signalled from outside through [`OutlineSession::close`].

use crate::outline_config::OutlinerConfig;
use crate::outline_model::{Document, IdSource};
use crate::sse::{SseDecoder, SseEvent, StreamMessage};
use crate::stream_parser::OutlineParser;
use std::sync::Arc;
use thiserror::Error;

/// Event name the server uses for unrecoverable stream failures
pub const FATAL_EVENT: &str = "FatalError";

/// Lifecycle of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Frames are still being accepted
    Streaming,
    /// The stream closed normally; the outline is final
    Closed,
    /// The stream broke off; the outline holds whatever arrived before
    Failed(String),
}

/// Errors from the stream feeding a session
///
/// None of these come from the parser itself, which never fails.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Stream reported a fatal error: {0}")]
    Fatal(String),

    #[error("Server reported an error: {0}")]
    Server(String),

    #[error("Malformed stream payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("Session is no longer streaming ({0:?})")]
    NotStreaming(SessionState),
}

/// Receives every new outline snapshot, read-only
pub trait SnapshotObserver: Send {
    fn on_snapshot(&mut self, document: &Arc<Document>);
}

impl<F> SnapshotObserver for F
where
    F: FnMut(&Arc<Document>) + Send,
{
    fn on_snapshot(&mut self, document: &Arc<Document>) {
        self(document)
    }
}

/// State of one outline-generation request
pub struct OutlineSession {
    decoder: SseDecoder,
    parser: OutlineParser,
    /// Cumulative outline text built from content deltas
    text: String,
    state: SessionState,
    error_notice: String,
    published: Arc<Document>,
    observers: Vec<Box<dyn SnapshotObserver>>,
    frames: usize,
}

impl OutlineSession {
    /// Create a session with random identifiers
    pub fn new(config: &OutlinerConfig) -> Self {
        Self::with_parser(config, OutlineParser::from_config(config))
    }

    /// Create a session with an explicit identifier source
    pub fn with_ids(config: &OutlinerConfig, ids: Box<dyn IdSource>) -> Self {
        Self::with_parser(config, OutlineParser::with_ids(config, ids))
    }

    fn with_parser(config: &OutlinerConfig, parser: OutlineParser) -> Self {
        let published = parser.document();
        Self {
            decoder: SseDecoder::new(),
            parser,
            text: String::new(),
            state: SessionState::Streaming,
            error_notice: config.stream.error_notice.clone(),
            published,
            observers: Vec::new(),
            frames: 0,
        }
    }

    /// Register an observer for future snapshots
    pub fn subscribe(&mut self, observer: impl SnapshotObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Decode a chunk of the raw SSE body and apply every completed event
    ///
    /// All events in the chunk are handled even when one of them fails; the
    /// first failure is returned.
    ///
    /// # Returns
    /// * `Ok(Arc<Document>)` - Snapshot after the chunk
    /// * `Err(SessionError)` - A frame was malformed or reported a failure
    pub fn push(&mut self, raw: &str) -> Result<Arc<Document>, SessionError> {
        let mut first_error = None;
        for event in self.decoder.push(raw) {
            if let Err(e) = self.handle_event(&event) {
                log::warn!("{}", e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(self.document()),
        }
    }

    /// Apply one decoded event
    pub fn handle_event(&mut self, event: &SseEvent) -> Result<(), SessionError> {
        self.ensure_streaming()?;
        self.frames += 1;

        if event.event.as_deref() == Some(FATAL_EVENT) {
            self.fail(&event.data);
            return Err(SessionError::Fatal(event.data.clone()));
        }

        let message: StreamMessage = serde_json::from_str(&event.data)?;
        if message.is_last_message {
            return Ok(());
        }
        if let Some(error) = message.error {
            self.fail(&error);
            return Err(SessionError::Server(error));
        }
        if let Some(content) = message.content {
            self.append_content(&content);
        }
        Ok(())
    }

    /// Append a content delta and reparse from the cursor
    pub fn append_content(&mut self, delta: &str) -> Arc<Document> {
        self.text.push_str(delta);
        self.refresh()
    }

    /// Mark the outline final; the external end-of-stream signal
    pub fn close(&mut self) -> Arc<Document> {
        if let Some(event) = self.decoder.finish() {
            if let Err(e) = self.handle_event(&event) {
                log::warn!("Final frame rejected: {}", e);
            }
        }
        if self.state == SessionState::Streaming {
            log::info!(
                "Outline stream closed after {} frames: {} chapters, {} sections",
                self.frames,
                self.published.chapters.len(),
                self.published.section_count()
            );
            self.state = SessionState::Closed;
        }
        self.document()
    }

    /// Record a broken connection
    pub fn transport_error(&mut self, reason: &str) {
        if self.state == SessionState::Streaming {
            self.fail(reason);
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// True once the stream closed or failed
    pub fn is_finished(&self) -> bool {
        self.state != SessionState::Streaming
    }

    /// Latest snapshot
    pub fn document(&self) -> Arc<Document> {
        Arc::clone(&self.published)
    }

    /// Cumulative outline text
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parser(&self) -> &OutlineParser {
        &self.parser
    }

    /// Number of events handled
    pub fn frames(&self) -> usize {
        self.frames
    }

    fn ensure_streaming(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Streaming => Ok(()),
            ref other => Err(SessionError::NotStreaming(other.clone())),
        }
    }

    fn fail(&mut self, reason: &str) {
        log::warn!("Outline stream failed: {}", reason);
        self.text.push_str(&self.error_notice);
        self.refresh();
        self.state = SessionState::Failed(reason.to_string());
    }

    fn refresh(&mut self) -> Arc<Document> {
        let snapshot = self.parser.feed(&self.text);
        if !Arc::ptr_eq(&snapshot, &self.published) {
            self.published = Arc::clone(&snapshot);
            for observer in &mut self.observers {
                observer.on_snapshot(&snapshot);
            }
        }
        snapshot
    }
}
