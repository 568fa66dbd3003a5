//! # codepress CLI
//!
//! Usage:
//!   codepress src/ -o listing.pdf
//!   codepress main.rs lib.rs --config theme.json --title "My Project"
//!   codepress src/ --dump-markers
//!   codepress src/ --layout-json > layout.json

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use codepress::layout::prepare_blocks;
use codepress::markup::lines_to_marker_text;
use codepress::source::{collect, format_size};
use codepress::{RenderConfig, SyntectHighlighter};

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "codepress", version, about = "Print source code to a paginated, highlighted PDF")]
struct Args {
    /// Files or directories. Directories are walked for code files.
    #[arg(required = true)]
    paths: Vec<PathBuf>,
    /// Output PDF path.
    #[arg(short, long, default_value = "code_documentation.pdf")]
    output: PathBuf,
    /// JSON render configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Document title for the PDF metadata.
    #[arg(long)]
    title: Option<String>,
    /// Print the marker-encoded text of every file instead of rendering.
    #[arg(long)]
    dump_markers: bool,
    /// Print the laid-out pages as JSON instead of rendering.
    #[arg(long)]
    layout_json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .try_init();

    let mut config = match &args.config {
        Some(path) => RenderConfig::from_path(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => RenderConfig::default(),
    };
    if args.title.is_some() {
        config.title = args.title.clone();
    }

    let files = collect(&args.paths).context("collecting source files")?;
    let total_size: u64 = files.iter().map(|f| f.size()).sum();
    tracing::info!(files = files.len(), bytes = total_size, "sources_collected");
    let highlighter = SyntectHighlighter::new();

    if args.dump_markers {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for block in prepare_blocks(&files, &highlighter, &config) {
            writeln!(out, "==> {} <==", block.label)?;
            if let Some(err) = &block.error {
                writeln!(out, "!! {}", err)?;
            }
            writeln!(out, "{}", lines_to_marker_text(&block.lines))?;
        }
        return Ok(());
    }

    if args.layout_json {
        let document = codepress::layout(&files, &highlighter, &config)?;
        serde_json::to_writer_pretty(io::stdout().lock(), &document)
            .context("writing layout JSON")?;
        println!();
        return Ok(());
    }

    let rendered = codepress::render(&files, &highlighter, &config)?;
    fs::write(&args.output, &rendered.pdf)
        .with_context(|| format!("writing {}", args.output.display()))?;

    for report in rendered.document.failed_blocks() {
        if let Some(err) = &report.error {
            eprintln!("✗ {}: {}", report.label, err);
        }
    }
    eprintln!(
        "✓ Processed {} files ({}) into {} pages, {} written to {}",
        files.len(),
        format_size(total_size),
        rendered.document.page_count(),
        format_size(rendered.pdf.len() as u64),
        args.output.display()
    );
    Ok(())
}
