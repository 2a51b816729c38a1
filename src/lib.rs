//! Chess diagram worksheets.
//!
//! FEN and PGN text go in; rendered board diagrams laid out on printable
//! PDF or HTML pages come out. The pieces:
//!
//! - [`fen`] and [`pgn`] read (and write) positions and games,
//! - [`registry`] holds the ordered list of diagrams to print,
//! - [`render`] draws one board as SVG or pixels,
//! - [`compose`] paginates diagrams and serializes documents,
//! - [`export`] runs the whole pipeline from a registry snapshot,
//! - [`puzzle`] drives the single-player puzzle presets.
//!
//! Chess rules sit behind the [`oracle::RulesOracle`] trait;
//! [`oracle::StandardRules`] answers it with `shakmaty`.

pub mod board;
pub mod compose;
pub mod config;
pub mod errors;
pub mod export;
pub mod fen;
pub mod log;
pub mod oracle;
pub mod pgn;
pub mod prefs;
pub mod puzzle;
pub mod registry;
pub mod render;
pub mod samples;
pub mod types;

pub use board::{Color, Piece, PieceKind, Position, Square};
pub use config::ExportConfig;
pub use errors::Error;
pub use export::{CancelFlag, ExportArtifact, ExportFormat, Exporter};
pub use registry::{DiagramRequest, PositionRegistry, RequestId, SourceKind};
pub use render::{Artifact, DiagramRenderer, GlyphSet, Renderer, RendererKind, StyleOptions};

/// Render a FEN (trailing fields optional) to SVG with the default style.
///
/// Returns the SVG string on success, or an error with diagnostics.
pub fn diagram_svg(fen: &str) -> Result<String, miette::Report> {
    let renderer = render::VectorRenderer::default();
    match render::render_fen(&renderer, fen, &GlyphSet::unicode())? {
        Artifact::Vector { svg, .. } => Ok(svg),
        Artifact::Raster(_) => Err(miette::miette!("vector renderer produced pixels")),
    }
}
