//! # Print Canvas CLI
//!
//! Command-line front end over design document JSON files.
//!
//! ## Usage
//!
//! ```bash
//! print-canvas import logo.svg --width 72 --height 36 -o banner.json
//! print-canvas layers banner.json
//! print-canvas layers banner.json --index 0 --op back
//! print-canvas print banner.json --order 1001 --item 0 --dpi 150 --out-dir out/
//! ```
//!
//! `PRINT_CANVAS_DPI` and `PRINT_CANVAS_OUT_DIR` provide defaults for the
//! print command.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};

use canvas_core::layers::display_order;
use canvas_core::{Canvas, DesignDocument, LayerOp};
use canvas_import::{apply_import, import_source, HttpSourceFetcher, ImportOptions, ImportReport, SvgSource};
use canvas_print::{generate, HttpImageFetcher, PrintArtifact, PrintConfig, PrintJob, DEFAULT_DPI};

/// Command-line arguments for print-canvas.
#[derive(Debug, Clone, Parser)]
#[command(name = "print-canvas")]
#[command(about = "Print shop design canvas tools")]
#[command(version)]
pub struct CliArgs {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Import an SVG file, URL or data URI into a design document
    Import(ImportArgs),
    /// Generate a print artifact from a design document
    Print(PrintArgs),
    /// List layers top-first, optionally reordering one
    Layers(LayersArgs),
}

/// Arguments for `import`.
#[derive(Debug, Clone, Args)]
pub struct ImportArgs {
    /// SVG file path, http(s) URL or data URI
    pub source: String,

    /// Target canvas width in inches
    #[arg(long, required_unless_present = "into")]
    pub width: Option<f64>,

    /// Target canvas height in inches
    #[arg(long, required_unless_present = "into")]
    pub height: Option<f64>,

    /// Append into an existing document instead of creating one
    #[arg(long)]
    pub into: Option<PathBuf>,

    /// Output document path (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Maximum container nesting depth
    #[arg(long, default_value_t = canvas_import::DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Maximum number of SVG elements visited, `<use>` expansions included
    #[arg(long, default_value_t = canvas_import::DEFAULT_MAX_NODES)]
    pub max_nodes: usize,

    /// Keep the drawing at the top-left instead of centring it
    #[arg(long)]
    pub no_center: bool,
}

/// Arguments for `print`.
#[derive(Debug, Clone, Args)]
pub struct PrintArgs {
    /// Design document JSON
    pub document: PathBuf,

    /// Order number
    #[arg(long)]
    pub order: String,

    /// Line item index within the order
    #[arg(long, default_value_t = 0)]
    pub item: usize,

    /// Output resolution in dots per inch
    #[arg(long, env = "PRINT_CANVAS_DPI", default_value_t = DEFAULT_DPI)]
    pub dpi: u32,

    /// Directory for generated files
    #[arg(long, env = "PRINT_CANVAS_OUT_DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Omit the white background
    #[arg(long)]
    pub transparent: bool,

    /// Keep remote image references instead of inlining them
    #[arg(long)]
    pub no_embed: bool,

    /// Also write a downscaled PNG proof with this longest edge
    #[cfg(feature = "raster")]
    #[arg(long)]
    pub proof: Option<u32>,
}

/// Arguments for `layers`.
#[derive(Debug, Clone, Args)]
pub struct LayersArgs {
    /// Design document JSON
    pub document: PathBuf,

    /// Top-first layer index to move
    #[arg(long, requires = "op")]
    pub index: Option<usize>,

    /// How to move the layer
    #[arg(long, requires = "index")]
    pub op: Option<LayerMove>,
}

/// Layer moves offered on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LayerMove {
    /// One step towards the top
    Up,
    /// One step towards the bottom
    Down,
    /// To the top
    Front,
    /// To the bottom
    Back,
}

impl From<LayerMove> for LayerOp {
    fn from(m: LayerMove) -> Self {
        match m {
            LayerMove::Up => Self::MoveUp,
            LayerMove::Down => Self::MoveDown,
            LayerMove::Front => Self::BringToFront,
            LayerMove::Back => Self::SendToBack,
        }
    }
}

/// Read a design document.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid document.
pub fn read_document(path: &Path) -> anyhow::Result<DesignDocument> {
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    DesignDocument::from_json(&json).with_context(|| format!("parsing {}", path.display()))
}

/// Write a design document to `path`, or stdout when `None`.
///
/// # Errors
///
/// Returns an error if serialisation or the write fails.
pub fn write_document(doc: &DesignDocument, path: Option<&Path>) -> anyhow::Result<()> {
    let json = doc.to_json()?;
    match path {
        Some(path) => std::fs::write(path, json).with_context(|| format!("writing {}", path.display())),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

fn resolve_source(source: &str) -> anyhow::Result<SvgSource> {
    let path = Path::new(source);
    if path.is_file() {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        return Ok(SvgSource::Inline(text));
    }
    Ok(SvgSource::from_reference(source))
}

/// Run `import` and return the resulting document with the import report.
///
/// # Errors
///
/// Returns an error if the source or target document cannot be loaded or
/// the import is rejected.
pub async fn run_import(args: &ImportArgs) -> anyhow::Result<(DesignDocument, ImportReport)> {
    let mut doc = match &args.into {
        Some(path) => read_document(path)?,
        None => DesignDocument::new(Canvas::new(
            args.width.context("--width is required")?,
            args.height.context("--height is required")?,
        )),
    };

    let source = resolve_source(&args.source)?;
    let options = ImportOptions {
        max_depth: args.max_depth,
        max_nodes: args.max_nodes,
        center: !args.no_center,
        ..ImportOptions::default()
    };
    let outcome = import_source(&source, &HttpSourceFetcher::new(), doc.canvas, &options)
        .await
        .with_context(|| format!("importing {}", args.source))?;

    let report = outcome.report.clone();
    for skipped in &report.skipped {
        tracing::warn!(element = %skipped.element, reason = %skipped.reason, "skipped");
    }
    apply_import(&mut doc, outcome)?;
    Ok((doc, report))
}

/// Run `print` and return the written artifact and its path.
///
/// # Errors
///
/// Returns an error if the document cannot be loaded or generation fails.
pub async fn run_print(args: &PrintArgs) -> anyhow::Result<(PrintArtifact, PathBuf)> {
    let doc = read_document(&args.document)?;
    let config = PrintConfig {
        dpi: args.dpi,
        background: (!args.transparent).then(|| "#ffffff".to_string()),
        embed_images: !args.no_embed,
    };
    let job = PrintJob::new(args.order.clone(), args.item, doc);
    let artifact = generate(&job, &config, &HttpImageFetcher::new())
        .await
        .with_context(|| format!("generating {}", job.artifact_name(&config)))?;
    let path = artifact.write_to(&args.out_dir)?;

    #[cfg(feature = "raster")]
    if let Some(edge) = args.proof {
        let png = canvas_print::render_proof_png(&artifact.svg, edge)?;
        let proof_path = args.out_dir.join(format!("{}_proof.png", artifact.name));
        std::fs::write(&proof_path, png).with_context(|| format!("writing {}", proof_path.display()))?;
        tracing::info!(path = %proof_path.display(), "proof written");
    }

    Ok((artifact, path))
}

/// One line per layer, top-first: `display_index kind id [flags]`.
#[must_use]
pub fn layer_listing(doc: &DesignDocument) -> Vec<String> {
    display_order(doc.elements())
        .enumerate()
        .map(|(display, (_, el))| {
            let mut line = format!("{display:>3}  {:<7}  {}", el.kind.name(), el.id);
            if !el.visible {
                line.push_str("  hidden");
            }
            if el.locked {
                line.push_str("  locked");
            }
            line
        })
        .collect()
}

/// Run `layers`, saving the document back when a move was requested.
///
/// # Errors
///
/// Returns an error if the document cannot be loaded or saved, or the
/// index is out of range.
pub fn run_layers(args: &LayersArgs) -> anyhow::Result<Vec<String>> {
    let mut doc = read_document(&args.document)?;
    if let (Some(index), Some(op)) = (args.index, args.op) {
        doc.reorder_display(index, op.into())?;
        write_document(&doc, Some(&args.document))?;
    }
    Ok(layer_listing(&doc))
}
