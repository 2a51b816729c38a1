use std::path::PathBuf;
use std::sync::Arc;

use boardprint::compose::TitlePage;
use boardprint::errors::ExportError;
use boardprint::fen::START_FEN;
use boardprint::render::GlyphSource;
use boardprint::{
    CancelFlag, DiagramRequest, ExportConfig, ExportFormat, Exporter, PositionRegistry, RendererKind, SourceKind,
    samples,
};

fn registry_of(fens: &[&str]) -> Arc<PositionRegistry> {
    let registry = Arc::new(PositionRegistry::new());
    for (i, fen) in fens.iter().enumerate() {
        registry.add(DiagramRequest::from_fen(fen, format!("Exercise {}", i + 1), SourceKind::Fen).unwrap());
    }
    registry
}

/// Shows the pipeline's warnings when run with `RUST_LOG=debug` and the
/// `tracing` feature.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn html(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).expect("html export is utf-8")
}

#[tokio::test]
async fn seven_diagrams_make_two_pages() {
    let exporter = Exporter::new(registry_of(&[START_FEN; 7]), ExportConfig::default());
    let artifact = exporter.export(ExportFormat::Html, &CancelFlag::new()).await.unwrap();
    assert_eq!(artifact.pages, 2);
    let page = html(artifact.bytes);
    let second = page.split("<section class=\"page\"").nth(2).expect("second page");
    assert_eq!(second.matches("<svg").count(), 1);
    assert!(second.contains("Exercise 7"));
}

#[tokio::test]
async fn title_page_comes_first() {
    let config = ExportConfig {
        title: Some(TitlePage {
            title: "Endgame drills".into(),
            ..TitlePage::default()
        }),
        ..ExportConfig::default()
    };
    let exporter = Exporter::new(registry_of(&[START_FEN; 6]), config);
    let artifact = exporter.export(ExportFormat::Html, &CancelFlag::new()).await.unwrap();
    assert_eq!(artifact.pages, 2);
    let page = html(artifact.bytes);
    let title = page.find("Endgame drills").unwrap();
    let first_board = page.find("<svg").unwrap();
    assert!(title < first_board);
}

#[tokio::test]
async fn both_renderers_produce_pdf() {
    let registry = Arc::new(PositionRegistry::new());
    samples::insert_samples(&registry);
    for renderer in [RendererKind::Vector, RendererKind::Raster] {
        let config = ExportConfig {
            renderer,
            ..ExportConfig::default()
        };
        let exporter = Exporter::new(Arc::clone(&registry), config);
        let artifact = exporter.export(ExportFormat::Pdf, &CancelFlag::new()).await.unwrap();
        assert!(artifact.bytes.starts_with(b"%PDF"), "{renderer:?}");
        assert_eq!(artifact.diagrams, samples::SAMPLES.len());
        assert_eq!(artifact.placeholders, 0);
    }
}

#[tokio::test]
async fn raster_html_embeds_png() {
    let config = ExportConfig {
        renderer: RendererKind::Raster,
        ..ExportConfig::default()
    };
    let exporter = Exporter::new(registry_of(&[START_FEN]), config);
    let artifact = exporter.export(ExportFormat::Html, &CancelFlag::new()).await.unwrap();
    assert!(html(artifact.bytes).contains("data:image/png;base64,"));
}

#[tokio::test]
async fn unrenderable_diagrams_become_placeholders() {
    init_tracing();
    let mut config = ExportConfig::default();
    config.style.scale = 0.0;
    let exporter = Exporter::new(registry_of(&[START_FEN, START_FEN]), config);

    let artifact = exporter.export(ExportFormat::Html, &CancelFlag::new()).await.unwrap();
    assert_eq!(artifact.diagrams, 2);
    assert_eq!(artifact.placeholders, 2);
    assert_eq!(html(artifact.bytes).matches("diagram placeholder").count(), 2);

    let pdf = exporter.export(ExportFormat::Pdf, &CancelFlag::new()).await.unwrap();
    assert!(pdf.bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn missing_glyph_directory_falls_back_to_text() {
    init_tracing();
    let mut config = ExportConfig::default();
    config.style.glyph_source = GlyphSource::Directory(PathBuf::from("/nonexistent/boardprint/glyphs"));
    let exporter = Exporter::new(registry_of(&[START_FEN]), config);
    let artifact = exporter.export(ExportFormat::Html, &CancelFlag::new()).await.unwrap();
    assert_eq!(artifact.placeholders, 0);
    // Kings drawn as the Unicode symbol
    assert_eq!(html(artifact.bytes).matches('\u{265A}').count(), 2);
}

#[tokio::test]
async fn glyph_load_timeout_still_exports_every_diagram() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    for piece in boardprint::Piece::all() {
        let glyph = r#"<svg xmlns="http://www.w3.org/2000/svg" width="45" height="45"><rect width="45" height="45"/></svg>"#;
        std::fs::write(dir.path().join(format!("{}.svg", piece.glyph_name())), glyph).unwrap();
    }
    let registry = registry_of(&[START_FEN, START_FEN, START_FEN]);

    let mut config = ExportConfig::default();
    config.style.glyph_source = GlyphSource::Directory(dir.path().to_path_buf());
    let loaded = Exporter::new(Arc::clone(&registry), config.clone());
    let artifact = loaded.export(ExportFormat::Html, &CancelFlag::new()).await.unwrap();
    assert!(html(artifact.bytes).contains("data:image/svg+xml;base64,"));

    config.glyph_timeout_ms = 0;
    let timed_out = Exporter::new(registry, config);
    let artifact = timed_out.export(ExportFormat::Html, &CancelFlag::new()).await.unwrap();
    assert_eq!(artifact.diagrams, 3);
    assert_eq!(artifact.placeholders, 0);
    let page = html(artifact.bytes);
    assert!(!page.contains("data:image/svg+xml"));
    assert_eq!(page.matches('\u{265A}').count(), 6);
}

#[tokio::test]
async fn cancellation_leaves_registry_alone() {
    let registry = registry_of(&[START_FEN; 4]);
    let before = registry.list();
    let exporter = Exporter::new(Arc::clone(&registry), ExportConfig::default());

    let cancel = CancelFlag::new();
    cancel.cancel();
    let result = exporter.export(ExportFormat::Pdf, &cancel).await;
    assert!(matches!(result, Err(ExportError::Cancelled)));
    assert_eq!(registry.list(), before);
}

#[tokio::test]
async fn empty_registry_has_nothing_to_export() {
    let exporter = Exporter::new(Arc::new(PositionRegistry::new()), ExportConfig::default());
    let result = exporter.export(ExportFormat::Html, &CancelFlag::new()).await;
    assert!(matches!(result, Err(ExportError::Empty)));
}

#[tokio::test]
async fn written_artifact_replaces_the_target() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drills.html");
    std::fs::write(&path, "stale").unwrap();

    let exporter = Exporter::new(registry_of(&[START_FEN]), ExportConfig::default());
    let artifact = exporter.export(ExportFormat::Html, &CancelFlag::new()).await.unwrap();
    artifact.write_to(&path).await.unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), artifact.bytes);
    let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(leftovers.len(), 1);
}

#[tokio::test]
async fn write_into_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("drills.pdf");
    let exporter = Exporter::new(registry_of(&[START_FEN]), ExportConfig::default());
    let artifact = exporter.export(ExportFormat::Pdf, &CancelFlag::new()).await.unwrap();
    assert!(matches!(artifact.write_to(&path).await, Err(ExportError::Write { .. })));
    assert!(!path.exists());
}
