//! Identifier sources for outline nodes

use uuid::Uuid;

/// Produces the opaque identifiers given to documents, chapters and sections
pub trait IdSource: Send {
    /// Return a fresh identifier, never repeated by this source
    fn next_id(&mut self) -> String;
}

/// Random v4 UUIDs
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdSource for UuidIds {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic `{seed}-{n}` identifiers, used by tests and reproducible replays
#[derive(Debug, Clone)]
pub struct SequentialIds {
    seed: String,
    count: u64,
}

impl SequentialIds {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: 0,
        }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }
}
