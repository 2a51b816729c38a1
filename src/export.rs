//! Export orchestration.
//!
//! An [`Exporter`] turns the registry's current contents into one PDF or
//! HTML document: snapshot, glyph loading, rendering on a blocking task,
//! layout, serialization. A diagram that fails to render becomes a
//! placeholder; only serialization failures and cancellation end the run.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::compose::{self, Slot, SlotContent};
use crate::config::ExportConfig;
use crate::errors::{Error, ExportError, FormatError};
use crate::log::{info, warn};
use crate::oracle::RulesOracle;
use crate::pgn;
use crate::registry::{DiagramRequest, PositionRegistry, RequestId};
use crate::render::{DiagramRenderer, GlyphSet, Renderer};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Pdf,
    Html,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Html => "html",
        }
    }
}

/// Shared cancellation signal. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), ExportError> {
        if self.is_cancelled() {
            Err(ExportError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// A finished document.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
    /// Pages including the title page
    pub pages: usize,
    pub diagrams: usize,
    /// Diagrams drawn as placeholders
    pub placeholders: usize,
}

impl ExportArtifact {
    /// Write next to `path` first, then rename over it, so a failed write
    /// never leaves a truncated document behind.
    pub async fn write_to(&self, path: &Path) -> Result<(), ExportError> {
        let write_err = |source| ExportError::Write {
            path: path.to_path_buf(),
            source,
        };
        let tmp = temp_sibling(path);
        if let Err(source) = tokio::fs::write(&tmp, &self.bytes).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(write_err(source));
        }
        if let Err(source) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(write_err(source));
        }
        Ok(())
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "export".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

pub struct Exporter {
    registry: Arc<PositionRegistry>,
    config: ExportConfig,
}

impl Exporter {
    pub fn new(registry: Arc<PositionRegistry>, config: ExportConfig) -> Self {
        Exporter { registry, config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<PositionRegistry> {
        &self.registry
    }

    /// Add one diagram request per move of every game in `text`, positions
    /// derived per the configured `pgn_positions` mode. Nothing is added
    /// unless every game parses.
    pub fn add_pgn<O: RulesOracle>(&self, text: &str, oracle: &O) -> Result<Vec<RequestId>, FormatError> {
        let mut requests: Vec<DiagramRequest> = Vec::new();
        for game in pgn::parse_games(text) {
            requests.extend(game?.diagram_requests(self.config.pgn_positions, oracle)?);
        }
        Ok(self.registry.add_many(requests))
    }

    /// Build a document from a snapshot of the registry. The registry is
    /// only read.
    pub async fn export(&self, format: ExportFormat, cancel: &CancelFlag) -> Result<ExportArtifact, ExportError> {
        let requests = self.registry.list();
        if requests.is_empty() {
            return Err(ExportError::Empty);
        }
        info!(diagrams = requests.len(), format = format.extension(), "export started");

        let glyphs = GlyphSet::load(&self.config.style.glyph_source, self.config.glyph_timeout()).await;
        cancel.check()?;

        let renderer = Renderer::new(self.config.renderer, self.config.style.clone());
        let flag = cancel.clone();
        let slots = tokio::task::spawn_blocking(move || render_slots(&renderer, &glyphs, &requests, &flag))
            .await
            .map_err(|e| ExportError::Task { message: e.to_string() })??;
        let placeholders = slots
            .iter()
            .filter(|slot| matches!(slot.content, SlotContent::Placeholder { .. }))
            .count();
        let diagrams = slots.len();

        let layout = self.config.layout.clone();
        let title = self.config.title.clone();
        let document = compose::layout(slots, &layout, title.as_ref());
        cancel.check()?;

        let pages = document.pages.len();
        let bytes = tokio::task::spawn_blocking(move || match format {
            ExportFormat::Pdf => compose::to_pdf(&document),
            ExportFormat::Html => compose::to_html(&document).map(String::into_bytes),
        })
        .await
        .map_err(|e| ExportError::Task { message: e.to_string() })??;

        info!(pages, diagrams, placeholders, bytes = bytes.len(), "export finished");
        Ok(ExportArtifact {
            format,
            bytes,
            pages,
            diagrams,
            placeholders,
        })
    }
}

fn render_slots(
    renderer: &Renderer,
    glyphs: &GlyphSet,
    requests: &[DiagramRequest],
    cancel: &CancelFlag,
) -> Result<Vec<Slot>, ExportError> {
    let mut slots = Vec::with_capacity(requests.len());
    for request in requests {
        cancel.check()?;
        let rendered = request
            .position()
            .map_err(Error::from)
            .and_then(|position| renderer.render(&position, glyphs).map_err(Error::from));
        let content = match rendered {
            Ok(artifact) => SlotContent::Rendered(artifact),
            Err(error) => {
                warn!(request = %request.id, %error, "diagram replaced by placeholder");
                SlotContent::Placeholder {
                    reason: error.to_string(),
                }
            }
        };
        slots.push(Slot {
            caption: request.instruction.clone(),
            active_color: request.active_color,
            content,
        });
    }
    Ok(slots)
}
