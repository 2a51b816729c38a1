//! Piece glyph sources.
//!
//! A glyph set maps each of the twelve pieces to either an SVG document or a
//! Unicode chess symbol. Loading never fails from the caller's point of view:
//! anything that cannot be read falls back to the symbol.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::board::Piece;
use crate::errors::AssetLoadError;
use crate::log::{debug, warn};

/// Where piece glyphs come from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlyphSource {
    /// Unicode chess symbols drawn as text
    #[default]
    Unicode,
    /// A directory of `wK.svg`, `bQ.svg`, ... files
    Directory(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Glyph {
    Text(char),
    Svg(Arc<str>),
}

impl Glyph {
    /// `data:` URI embedding an SVG glyph document.
    pub fn data_uri(markup: &str) -> String {
        format!("data:image/svg+xml;base64,{}", BASE64.encode(markup.as_bytes()))
    }
}

/// The twelve piece glyphs.
#[derive(Debug, Clone, Default)]
pub struct GlyphSet {
    svg: HashMap<Piece, Arc<str>>,
}

impl GlyphSet {
    /// Every piece drawn as a Unicode symbol.
    pub fn unicode() -> Self {
        Self::default()
    }

    pub fn with_glyph(mut self, piece: Piece, glyph: Glyph) -> Self {
        match glyph {
            Glyph::Svg(markup) => {
                self.svg.insert(piece, markup);
            }
            Glyph::Text(_) => {
                self.svg.remove(&piece);
            }
        }
        self
    }

    pub fn get(&self, piece: Piece) -> Glyph {
        match self.svg.get(&piece) {
            Some(markup) => Glyph::Svg(Arc::clone(markup)),
            None => Glyph::Text(piece.symbol()),
        }
    }

    /// Number of pieces with a vector glyph.
    pub fn vector_count(&self) -> usize {
        self.svg.len()
    }

    pub fn is_textual(&self) -> bool {
        self.svg.is_empty()
    }

    /// Load a glyph set, surfacing failures. Pieces whose file is missing or
    /// unreadable fall back individually; only an unreadable directory or one
    /// with no usable glyph at all is an error.
    pub async fn try_load(source: &GlyphSource) -> Result<Self, AssetLoadError> {
        let dir = match source {
            GlyphSource::Unicode => return Ok(Self::unicode()),
            GlyphSource::Directory(dir) => dir,
        };

        let meta = tokio::fs::metadata(dir).await.map_err(|source| AssetLoadError::Io {
            path: dir.clone(),
            source,
        })?;
        if !meta.is_dir() {
            return Err(AssetLoadError::Io {
                path: dir.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
            });
        }

        let mut set = Self::unicode();
        for piece in Piece::all() {
            let path = dir.join(format!("{}.svg", piece.glyph_name()));
            match read_glyph(&path).await {
                Some(markup) => {
                    set.svg.insert(piece, markup.into());
                }
                None => debug!(path = %path.display(), "glyph missing, using text symbol"),
            }
        }

        if set.is_textual() {
            return Err(AssetLoadError::Empty { path: dir.clone() });
        }
        Ok(set)
    }

    /// Load a glyph set within `timeout`, falling back to text glyphs on any
    /// failure.
    pub async fn load(source: &GlyphSource, timeout: Duration) -> Self {
        let outcome = match tokio::time::timeout(timeout, Self::try_load(source)).await {
            Ok(result) => result,
            Err(_) => Err(AssetLoadError::Timeout {
                path: source_path(source),
                millis: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        };
        match outcome {
            Ok(set) => set,
            Err(error) => {
                warn!(%error, "glyph set unavailable, falling back to text glyphs");
                Self::unicode()
            }
        }
    }
}

fn source_path(source: &GlyphSource) -> PathBuf {
    match source {
        GlyphSource::Unicode => PathBuf::new(),
        GlyphSource::Directory(dir) => dir.clone(),
    }
}

/// Read one glyph file and check that it parses as SVG.
async fn read_glyph(path: &Path) -> Option<String> {
    let markup = tokio::fs::read_to_string(path).await.ok()?;
    match usvg::Tree::from_str(&markup, &usvg::Options::default()) {
        Ok(_) => Some(markup),
        Err(error) => {
            debug!(path = %path.display(), %error, "glyph is not valid SVG");
            None
        }
    }
}
