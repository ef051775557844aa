//! # menuforge-cli: A CLI for `menuforge`
//!
//! Runs the extraction pipeline over local files and Google Sheets links and
//! prints the JSON report.

mod provider;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use menuforge::types::{DocumentRef, MediaType};
use menuforge::{Pipeline, PipelineConfig, SamplerSet};
use menuforge_pdf::PdfSampler;
use menuforge_sheets::SpreadsheetSampler;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract a structured menu catalog from documents
    Extract(ExtractArgs),
}

#[derive(Parser, Debug)]
struct ExtractArgs {
    /// Paths to menu documents (PDF, spreadsheet, or image files)
    #[arg(required_unless_present = "sheet_url")]
    files: Vec<PathBuf>,
    /// Google Sheets share URLs to process alongside the files
    #[arg(long = "sheet-url")]
    sheet_url: Vec<String>,
    /// Write the JSON report here instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
    /// Worker pool size
    #[arg(long, default_value_t = 4)]
    concurrency: usize,
    /// Per-task item ceiling driving split decisions
    #[arg(long, default_value_t = 75)]
    max_items_per_task: u32,
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so the JSON report stays clean on stdout.
    let subscriber = fmt::Subscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    match &cli.command {
        Commands::Extract(args) => handle_extract(args).await,
    }
}

// --- Command Handlers ---

async fn handle_extract(args: &ExtractArgs) -> Result<()> {
    let documents = collect_documents(&args.files, &args.sheet_url).await?;
    if documents.is_empty() {
        bail!("No input documents given.");
    }
    info!("Extracting from {} documents", documents.len());

    let (fast, expert) = provider::build_oracles()?;
    let mut samplers = SamplerSet::with_defaults();
    samplers.register(Arc::new(PdfSampler));
    samplers.register(Arc::new(SpreadsheetSampler::default()));

    let config = PipelineConfig {
        concurrency: args.concurrency,
        max_items_per_task: args.max_items_per_task,
        ..PipelineConfig::default()
    };
    let pipeline = Pipeline::new(fast, expert, samplers).with_config(config);

    let output = pipeline.run(documents).await;
    let report = serde_json::to_string_pretty(&output)?;

    match &args.out {
        Some(path) => {
            tokio::fs::write(path, &report)
                .await
                .with_context(|| format!("Failed to write report to '{}'", path.display()))?;
            println!(
                "✅ Extracted {} items ({} task failures). Report written to '{}'.",
                output.enriched_items.len(),
                output.failures.len(),
                path.display()
            );
        }
        None => println!("{report}"),
    }

    if !output.failures.is_empty() {
        for failure in &output.failures {
            eprintln!("⚠️  Task '{}' failed: {}", failure.label, failure.error);
        }
    }
    Ok(())
}

fn media_for(path: &Path) -> Result<MediaType> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    MediaType::from_extension(ext)
        .with_context(|| format!("Unsupported file type: '{}'", path.display()))
}

async fn collect_documents(files: &[PathBuf], sheet_urls: &[String]) -> Result<Vec<DocumentRef>> {
    let mut documents = Vec::new();
    for path in files {
        let media = media_for(path)?;
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read '{}'", path.display()))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();
        documents.push(DocumentRef::inline(
            Uuid::new_v4().to_string(),
            name,
            media,
            bytes,
        ));
    }
    for url in sheet_urls {
        documents.push(DocumentRef::remote(
            Uuid::new_v4().to_string(),
            url.clone(),
            MediaType::Spreadsheet,
            url.clone(),
        ));
    }
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_inference_follows_the_extension() {
        assert!(matches!(
            media_for(Path::new("menu.pdf")).unwrap(),
            MediaType::Pdf
        ));
        assert!(matches!(
            media_for(Path::new("MENU.XLSX")).unwrap(),
            MediaType::Spreadsheet
        ));
        assert!(matches!(
            media_for(Path::new("photo.jpeg")).unwrap(),
            MediaType::Image
        ));
        assert!(media_for(Path::new("notes.txt")).is_err());
    }
}
