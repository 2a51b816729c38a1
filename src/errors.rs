//! Error types with rich diagnostics using miette
//!
//! Parse errors carry source spans so a bad FEN or PGN is shown with the
//! offending part labelled.

use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::types::NumericError;

/// Source context for error reporting
#[derive(Debug, Clone)]
pub struct SourceContext {
    /// Name of the source (filename, "<fen>" or "<pgn>")
    pub name: String,
    /// The full source text
    pub source: String,
}

impl SourceContext {
    /// Create a new source context
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Create a NamedSource for miette
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.name, self.source.clone())
    }

    /// Span covering the whole source
    pub fn full_span(&self) -> SourceSpan {
        (0, self.source.len()).into()
    }
}

// ============================================================================
// Format Errors
// ============================================================================

/// Malformed FEN or PGN input. Always recoverable: only the offending
/// operation is rejected.
#[derive(Error, Diagnostic, Debug)]
pub enum FormatError {
    #[error("malformed FEN: {message}")]
    #[diagnostic(code(boardprint::fen::syntax))]
    FenSyntax {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("expected 8 ranks, found {found}")]
    #[diagnostic(
        code(boardprint::fen::rank_count),
        help("ranks are separated by '/' and listed from the eighth rank down")
    )]
    RankCount {
        found: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("board field")]
        span: SourceSpan,
    },

    #[error("rank {rank} covers {files} files, expected 8")]
    #[diagnostic(code(boardprint::fen::rank_width))]
    RankWidth {
        rank: u8,
        files: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("this rank")]
        span: SourceSpan,
    },

    #[error("expected 6 fields, found {found}")]
    #[diagnostic(
        code(boardprint::fen::field_count),
        help("a full FEN is: placement, side to move, castling, en passant, halfmove clock, fullmove number")
    )]
    FieldCount {
        found: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("in this FEN")]
        span: SourceSpan,
    },

    #[error("malformed PGN header")]
    #[diagnostic(
        code(boardprint::pgn::header),
        help(r#"headers look like [Event "Club championship"]"#)
    )]
    PgnHeader {
        #[source_code]
        src: NamedSource<String>,
        #[label("cannot read this tag")]
        span: SourceSpan,
    },

    #[error("malformed PGN move text: {message}")]
    #[diagnostic(code(boardprint::pgn::syntax))]
    PgnSyntax {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("not a move: {token}")]
    #[diagnostic(
        code(boardprint::pgn::invalid_move),
        help("moves are written in standard algebraic notation, e.g. e4, Nf3, exd5, O-O, e8=Q")
    )]
    InvalidMove {
        token: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("not algebraic notation")]
        span: SourceSpan,
    },

    #[error("{san} is not playable in {fen}")]
    #[diagnostic(code(boardprint::pgn::illegal_move))]
    IllegalMove { san: String, fen: String },
}

// ============================================================================
// Asset Errors
// ============================================================================

/// Glyph sources that could not be loaded. Recovered by the textual fallback.
#[derive(Error, Diagnostic, Debug)]
pub enum AssetLoadError {
    #[error("cannot read glyph source {}", path.display())]
    #[diagnostic(code(boardprint::assets::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("glyph source {} timed out after {millis} ms", path.display())]
    #[diagnostic(code(boardprint::assets::timeout))]
    Timeout { path: PathBuf, millis: u64 },

    #[error("glyph source {} contains no piece glyphs", path.display())]
    #[diagnostic(
        code(boardprint::assets::empty),
        help("expected files named like wK.svg, bN.svg")
    )]
    Empty { path: PathBuf },
}

// ============================================================================
// Render Errors
// ============================================================================

/// Errors that occur while rendering a single diagram
#[derive(Error, Diagnostic, Debug)]
pub enum RenderError {
    #[error("invalid scale: {value}")]
    #[diagnostic(code(boardprint::render::invalid_scale))]
    InvalidScale {
        value: f64,
        #[source]
        source: NumericError,
    },

    #[error("invalid border width: {value}")]
    #[diagnostic(code(boardprint::render::invalid_border))]
    InvalidBorder { value: f64 },

    #[error("diagram would be {size}px wide, the limit is {max}px")]
    #[diagnostic(
        code(boardprint::render::too_large),
        help("lower the scale or the border width")
    )]
    TooLarge { size: u32, max: u32 },

    #[error("rasterization failed: {message}")]
    #[diagnostic(code(boardprint::render::rasterize))]
    Rasterize { message: String },

    #[error("image encoding failed: {message}")]
    #[diagnostic(code(boardprint::render::encode))]
    Encode { message: String },
}

// ============================================================================
// Serialization Errors
// ============================================================================

/// The final document assembly failed. Terminal for an export.
#[derive(Error, Diagnostic, Debug)]
pub enum SerializationError {
    #[error("PDF assembly failed: {message}")]
    #[diagnostic(code(boardprint::serialize::pdf))]
    Pdf { message: String },

    #[error("document has no pages")]
    #[diagnostic(code(boardprint::serialize::empty))]
    NoPages,
}

// ============================================================================
// Configuration and Preferences
// ============================================================================

/// Errors loading an export configuration file
#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("cannot read config {}", path.display())]
    #[diagnostic(code(boardprint::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {message}")]
    #[diagnostic(code(boardprint::config::toml))]
    Toml {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: Option<SourceSpan>,
    },

    #[error("invalid value for {field}: {reason}")]
    #[diagnostic(code(boardprint::config::invalid))]
    Invalid { field: &'static str, reason: String },
}

/// Errors reading or writing persisted preferences
#[derive(Error, Diagnostic, Debug)]
pub enum PrefsError {
    #[error("no configuration directory on this platform")]
    #[diagnostic(code(boardprint::prefs::no_dir))]
    NoConfigDir,

    #[error("cannot access preferences at {}", path.display())]
    #[diagnostic(code(boardprint::prefs::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("preferences file {} is corrupt", path.display())]
    #[diagnostic(code(boardprint::prefs::json))]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

// ============================================================================
// Puzzles
// ============================================================================

/// Errors driving a puzzle controller
#[derive(Error, Diagnostic, Debug)]
pub enum PuzzleError {
    #[error("the puzzle is already solved")]
    #[diagnostic(code(boardprint::puzzle::solved), help("call reset() to start a new puzzle"))]
    AlreadyWon,

    #[error("generated position is invalid")]
    #[diagnostic(code(boardprint::puzzle::position))]
    Position(#[from] FormatError),
}

// ============================================================================
// Export
// ============================================================================

/// Errors from a whole export run
#[derive(Error, Diagnostic, Debug)]
pub enum ExportError {
    #[error("nothing to export")]
    #[diagnostic(code(boardprint::export::empty), help("add at least one position first"))]
    Empty,

    #[error("export cancelled")]
    #[diagnostic(code(boardprint::export::cancelled))]
    Cancelled,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Serialization(#[from] SerializationError),

    #[error("render task failed: {message}")]
    #[diagnostic(code(boardprint::export::task))]
    Task { message: String },

    #[error("cannot write {}", path.display())]
    #[diagnostic(code(boardprint::export::write))]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ============================================================================
// Top level
// ============================================================================

/// Any error this crate produces
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Asset(#[from] AssetLoadError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Serialization(#[from] SerializationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Prefs(#[from] PrefsError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Puzzle(#[from] PuzzleError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Export(#[from] ExportError),
}
