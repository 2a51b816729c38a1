//! Ordered collection of diagram requests awaiting export.

use std::fmt;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::board::{Color, Position};
use crate::errors::FormatError;
use crate::fen;

/// Opaque request identifier. The empty id means "not assigned yet".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// A fresh id: timestamp plus random bits, so ids sort by creation time.
    pub fn generate() -> Self {
        RequestId(Uuid::now_v7().to_string())
    }

    pub fn is_unassigned(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId(s.to_string())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Typed or pasted FEN
    Fen,
    /// One move of an imported game
    Pgn,
    /// A board arranged by hand
    Editor,
    /// Bulk-inserted sample position
    Template,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramRequest {
    pub id: RequestId,
    /// Always the full six-field form
    pub fen: String,
    pub instruction: String,
    pub active_color: Color,
    pub source: SourceKind,
}

impl DiagramRequest {
    /// Validate and normalize a possibly partial FEN. Missing trailing fields
    /// default to `w - - 0 1`.
    pub fn from_fen(
        fen: &str,
        instruction: impl Into<String>,
        source: SourceKind,
    ) -> Result<Self, FormatError> {
        let position = fen::parse_lenient(fen)?;
        Ok(Self::from_position(&position, instruction, source))
    }

    pub fn from_position(position: &Position, instruction: impl Into<String>, source: SourceKind) -> Self {
        DiagramRequest {
            id: RequestId::default(),
            fen: position.to_fen(),
            instruction: instruction.into(),
            active_color: position.active,
            source,
        }
    }

    pub fn position(&self) -> Result<Position, FormatError> {
        fen::parse(&self.fen)
    }
}

/// Thread-safe, insertion-ordered registry.
#[derive(Debug, Default)]
pub struct PositionRegistry {
    entries: RwLock<Vec<DiagramRequest>>,
}

impl PositionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a request. An unassigned or already-used id is replaced with a
    /// fresh one; the id actually stored is returned.
    pub fn add(&self, request: DiagramRequest) -> RequestId {
        let mut entries = self.entries.write();
        push_unique(&mut entries, request)
    }

    /// Append several requests under one lock, so a concurrent `list` sees
    /// either none or all of them.
    pub fn add_many(&self, requests: impl IntoIterator<Item = DiagramRequest>) -> Vec<RequestId> {
        let mut entries = self.entries.write();
        requests
            .into_iter()
            .map(|request| push_unique(&mut entries, request))
            .collect()
    }

    /// Remove by id. Returns whether anything was removed.
    pub fn remove(&self, id: &RequestId) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|entry| &entry.id != id);
        entries.len() != before
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Snapshot in insertion order.
    pub fn list(&self) -> Vec<DiagramRequest> {
        self.entries.read().clone()
    }

    pub fn get(&self, id: &RequestId) -> Option<DiagramRequest> {
        self.entries.read().iter().find(|entry| &entry.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

fn push_unique(entries: &mut Vec<DiagramRequest>, mut request: DiagramRequest) -> RequestId {
    if request.id.is_unassigned() || entries.iter().any(|entry| entry.id == request.id) {
        request.id = RequestId::generate();
    }
    let id = request.id.clone();
    entries.push(request);
    id
}
