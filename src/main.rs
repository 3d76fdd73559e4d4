mod diff;
mod extract;
mod fetch;
mod normalize;
mod recipe;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use extract::Extraction;

#[derive(Parser)]
#[command(name = "recipe_ingest", about = "Recipe page extraction and normalization")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a recipe page and extract it
    Url {
        url: String,
        /// CORS-bypass proxy prefix (default: RECIPE_PROXY_URL env var)
        #[arg(long)]
        proxy: Option<String>,
    },
    /// Extract a saved HTML file
    File {
        path: PathBuf,
        /// Page URL the file was saved from, for resolving relative images
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Canonicalize a raw recipe JSON document (AI output, form state)
    Normalize { path: PathBuf },
    /// Change set between an original and a candidate recipe JSON
    Diff {
        original: PathBuf,
        candidate: PathBuf,
    },
    /// Extract every .html file in a directory
    Batch {
        dir: PathBuf,
        /// Output directory for the .json results (default: alongside input)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Max files to process
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
}

/// Everything a page yields: the extraction outcome plus ranked photo
/// candidates, the shape the capture flow consumes.
#[derive(Serialize)]
struct PageResult {
    extraction: Extraction,
    images: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Url { url, proxy } => {
            let html = fetch::fetch_page(&url, proxy.as_deref()).await?;
            print_page_result(&html, &url)
        }
        Commands::File { path, base_url } => {
            let html = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            print_page_result(&html, base_url.as_deref().unwrap_or(""))
        }
        Commands::Normalize { path } => {
            let raw = read_json(&path)?;
            let recipe = normalize::normalize(&raw);
            println!("{}", serde_json::to_string_pretty(&recipe)?);
            Ok(())
        }
        Commands::Diff {
            original,
            candidate,
        } => {
            let original = normalize::normalize(&read_json(&original)?);
            let candidate = normalize::normalize(&read_json(&candidate)?);
            let changes = diff::diff(&original, &candidate);
            println!("{}", serde_json::to_string_pretty(&changes)?);
            println!(
                "\n{} added, {} modified, {} structured",
                changes.added.len(),
                changes.modified.len(),
                changes.structured.len()
            );
            Ok(())
        }
        Commands::Batch { dir, out, limit } => batch(&dir, out.as_deref(), limit),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn print_page_result(html: &str, base_url: &str) -> Result<()> {
    let result = PageResult {
        extraction: extract::process_for_extraction(html),
        images: extract::images::extract_image_candidates(html, base_url),
    };
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn batch(dir: &Path, out: Option<&Path>, limit: Option<usize>) -> Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "html"))
        .collect();
    files.sort();
    if let Some(n) = limit {
        files.truncate(n);
    }
    if files.is_empty() {
        println!("No .html files in {}", dir.display());
        return Ok(());
    }

    let out_dir = out.unwrap_or(dir);
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    println!("Processing {} pages...", files.len());
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut schema_count = 0usize;
    let mut text_count = 0usize;
    let mut errors = 0usize;

    for chunk in files.chunks(100) {
        let results: Vec<(PathBuf, Result<PageResult>)> = chunk
            .par_iter()
            .map(|path| {
                let result = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))
                    .map(|html| PageResult {
                        extraction: extract::process_for_extraction(&html),
                        images: extract::images::extract_image_candidates(&html, ""),
                    });
                (path.clone(), result)
            })
            .collect();

        for (path, result) in results {
            match result {
                Ok(page) => {
                    match page.extraction {
                        Extraction::Schema { .. } => schema_count += 1,
                        Extraction::Text { .. } => text_count += 1,
                    }
                    let target = out_dir
                        .join(path.file_stem().unwrap_or_default())
                        .with_extension("json");
                    std::fs::write(&target, serde_json::to_string_pretty(&page)?)
                        .with_context(|| format!("Failed to write {}", target.display()))?;
                }
                Err(e) => {
                    tracing::warn!("{:#}", e);
                    errors += 1;
                }
            }
            pb.inc(1);
        }
    }

    pb.finish_and_clear();
    println!(
        "Done: {} structured, {} text fallback, {} errors.",
        schema_count, text_count, errors
    );
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
