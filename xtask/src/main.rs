use boardprint::oracle::StandardRules;
use boardprint::{CancelFlag, ExportConfig, ExportFormat, Exporter, PositionRegistry, RendererKind, samples};
use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: cargo xtask <command>");
        eprintln!("Commands:");
        eprintln!("  samples [config.toml]           Export the built-in samples as PDF and HTML");
        eprintln!("  pgn <game.pgn> [config.toml]    Export one diagram per move of a PGN file");
        std::process::exit(1);
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Cannot start runtime: {e}");
            std::process::exit(1);
        }
    };

    let result = match args[1].as_str() {
        "samples" => runtime.block_on(export_samples(args.get(2).map(PathBuf::from))),
        "pgn" if args.len() >= 3 => runtime.block_on(export_pgn(Path::new(&args[2]), args.get(3).map(PathBuf::from))),
        _ => {
            eprintln!("Unknown command: {}", args[1..].join(" "));
            std::process::exit(1);
        }
    };

    if let Err(report) = result {
        eprintln!("{report:?}");
        std::process::exit(1);
    }
}

fn output_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../target/boardprint")
}

fn load_config(path: Option<PathBuf>) -> Result<ExportConfig> {
    Ok(match path {
        Some(path) => ExportConfig::load(&path)?,
        None => ExportConfig::default(),
    })
}

/// Both formats, both renderers, so the outputs can be compared by eye.
async fn export_samples(config: Option<PathBuf>) -> Result<()> {
    let base = load_config(config)?;
    let registry = Arc::new(PositionRegistry::new());
    samples::insert_samples(&registry);

    let out = output_dir();
    tokio::fs::create_dir_all(&out).await.into_diagnostic()?;

    for renderer in [RendererKind::Vector, RendererKind::Raster] {
        let config = ExportConfig {
            renderer,
            ..base.clone()
        };
        let exporter = Exporter::new(Arc::clone(&registry), config);
        for format in [ExportFormat::Pdf, ExportFormat::Html] {
            let artifact = exporter.export(format, &CancelFlag::new()).await?;
            let name = format!("samples-{}.{}", renderer_name(renderer), format.extension());
            let path = out.join(name);
            artifact.write_to(&path).await?;
            eprintln!(
                "{} ({} pages, {} diagrams, {} placeholders)",
                path.display(),
                artifact.pages,
                artifact.diagrams,
                artifact.placeholders
            );
        }
    }
    Ok(())
}

async fn export_pgn(pgn: &Path, config: Option<PathBuf>) -> Result<()> {
    let text = tokio::fs::read_to_string(pgn).await.into_diagnostic()?;
    let exporter = Exporter::new(Arc::new(PositionRegistry::new()), load_config(config)?);
    let ids = exporter.add_pgn(&text, &StandardRules)?;
    eprintln!("{} positions from {}", ids.len(), pgn.display());

    let out = output_dir();
    tokio::fs::create_dir_all(&out).await.into_diagnostic()?;
    let stem = pgn.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_else(|| "game".into());
    let path = out.join(format!("{stem}.pdf"));
    exporter
        .export(ExportFormat::Pdf, &CancelFlag::new())
        .await?
        .write_to(&path)
        .await?;
    eprintln!("{}", path.display());
    Ok(())
}

fn renderer_name(kind: RendererKind) -> &'static str {
    match kind {
        RendererKind::Vector => "vector",
        RendererKind::Raster => "raster",
    }
}
