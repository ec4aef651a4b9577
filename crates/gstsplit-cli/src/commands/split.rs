//! Split command - split local PDF and ZIP bundles.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{error, warn};

use gstsplit_core::{split_upload, GstinFilter, InvoiceSplitter, SplitFile, UploadKind};

use super::config::load_config;

/// Arguments for the split command.
#[derive(Args)]
pub struct SplitArgs {
    /// Input files or glob pattern (.pdf or .zip)
    #[arg(required = true)]
    input: String,

    /// Only keep invoices addressed to this GSTIN (case-insensitive)
    #[arg(short, long)]
    gstin: Option<String>,

    /// Output directory (default: storage.output_dir from config)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Also write summary.csv into the output directory
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single input.
struct SourceResult {
    path: PathBuf,
    files: Vec<SplitFile>,
    error: Option<String>,
}

/// One row of summary.csv.
#[derive(Serialize)]
struct SummaryRow<'a> {
    source: &'a str,
    filename: &'a str,
    document_id: &'a str,
    gstin: &'a str,
    pages: String,
}

pub async fn run(args: SplitArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    // Expand glob pattern
    let inputs: Vec<(PathBuf, UploadKind)> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter_map(|p| {
            let kind = p.file_name().and_then(|n| n.to_str()).and_then(UploadKind::from_filename)?;
            Some((p, kind))
        })
        .collect();

    if inputs.is_empty() {
        anyhow::bail!("No .pdf or .zip files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to split",
        style("ℹ").blue(),
        inputs.len()
    );

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.storage.output_dir.clone());
    fs::create_dir_all(&output_dir)?;
    fs::create_dir_all(&config.storage.upload_dir)?;

    let splitter = InvoiceSplitter::new(&output_dir)
        .with_filter(GstinFilter::new(args.gstin.as_deref()))
        .with_text_backend(config.extraction.text_backend);

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files",
            )?
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(inputs.len());

    for (path, kind) in inputs {
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        match split_upload(&path, kind, &source, &splitter, &config.storage.upload_dir) {
            Ok(files) => results.push(SourceResult {
                path,
                files,
                error: None,
            }),
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to split {}: {}", path.display(), error_msg);
                    results.push(SourceResult {
                        path,
                        files: Vec::new(),
                        error: Some(error_msg),
                    });
                } else {
                    error!("Failed to split {}: {}", path.display(), error_msg);
                    pb.abandon();
                    anyhow::bail!("Splitting failed: {}", error_msg);
                }
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    if args.summary {
        let summary_path = output_dir.join("summary.csv");
        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let written: usize = results.iter().map(|r| r.files.len()).sum();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    println!();
    println!(
        "{} Split {} files into {} invoices in {:?}",
        style("✓").green(),
        results.len(),
        style(written).green(),
        start.elapsed()
    );
    for result in &results {
        for file in &result.files {
            println!("   {}", output_dir.join(&file.filename).display());
        }
    }

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn write_summary(path: &Path, results: &[SourceResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    for file in results.iter().flat_map(|r| r.files.iter()) {
        // 1-based, as printed by PDF viewers
        let pages: Vec<String> = file.pages.iter().map(|p| (p + 1).to_string()).collect();
        wtr.serialize(SummaryRow {
            source: &file.source,
            filename: &file.filename,
            document_id: &file.document_id,
            gstin: &file.gstin,
            pages: pages.join(" "),
        })?;
    }

    wtr.flush()?;
    Ok(())
}
