//! # print-canvas
//!
//! Import vector art, inspect layers and generate print files.

use canvas_cli::{run_import, run_layers, run_print, write_document, CliArgs, Command};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels. Set `RUST_LOG_FORMAT=json` for
/// JSON output. Logs go to stderr so documents can be piped from stdout.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,canvas_core=debug,canvas_import=debug,canvas_print=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = CliArgs::parse();

    match args.command {
        Command::Import(import) => {
            let (doc, report) = run_import(&import).await?;
            tracing::info!(
                elements = doc.len(),
                skipped = report.skipped.len(),
                fallback = report.fallback,
                "import complete"
            );
            write_document(&doc, import.output.as_deref())?;
        }
        Command::Print(print) => {
            let (artifact, path) = run_print(&print).await?;
            tracing::info!(path = %path.display(), "print complete");
            println!("{}", serde_json::to_string_pretty(&artifact)?);
        }
        Command::Layers(layers) => {
            for line in run_layers(&layers)? {
                println!("{line}");
            }
        }
    }
    Ok(())
}
