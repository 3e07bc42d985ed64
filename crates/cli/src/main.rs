//! CLI tool for extracting text and images from Office documents.

use anyhow::{Context, Result};
use clap::Parser;
use office_core::{persist, DocumentKind, ExtractOptions, Extraction, ImageScope};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Extract slide text, sheet rows, and embedded images from PPTX/XLSX files.
#[derive(Parser, Debug)]
#[command(name = "office-extract")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input document(s) (.pptx or .xlsx)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Directory for extracted images
    #[arg(short, long, default_value = "images")]
    output: PathBuf,

    /// Directory for data_<seed>.json results
    #[arg(short, long, default_value = ".")]
    data_dir: PathBuf,

    /// Seed for generated file names (default: current time in milliseconds).
    /// With several inputs, each input uses seed + its position.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Declared document kind (presentation, spreadsheet, pptx, xlsx);
    /// defaults to the file extension
    #[arg(short, long)]
    kind: Option<String>,

    /// Attach presentation images only to the slides that reference them
    #[arg(long)]
    per_slide_images: bool,

    /// Print the JSON result to stdout instead of writing data files
    #[arg(short, long)]
    print: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let base_seed = args
        .seed
        .unwrap_or_else(|| chrono::Utc::now().timestamp_millis().max(0) as u64);

    let mut failures = 0;
    for (index, input_path) in args.input.iter().enumerate() {
        let seed = seed_for(base_seed, index);

        if args.verbose {
            eprintln!("Processing: {} (seed {})", input_path.display(), seed);
        }

        match process_file(input_path, &args, seed) {
            Ok(extraction) => {
                if args.print {
                    println!("{}", persist::to_json(&extraction.result)?);
                } else {
                    let path = persist::write_result(&args.data_dir, seed, &extraction.result)
                        .with_context(|| {
                            format!("Failed to write result for {}", input_path.display())
                        })?;
                    if args.verbose {
                        eprintln!("Written to: {}", path.display());
                    }
                }
            }
            Err(e) => {
                eprintln!("Error processing {}: {:#}", input_path.display(), e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} file(s) failed", failures, args.input.len());
    }

    Ok(())
}

/// Extract a single document.
fn process_file(input_path: &Path, args: &Args, seed: u64) -> Result<Extraction> {
    let kind = resolve_kind(input_path, args.kind.as_deref())?;

    let filename = input_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown");

    let file = File::open(input_path)
        .with_context(|| format!("Failed to open {}", input_path.display()))?;
    let reader = BufReader::new(file);

    let scope = if args.per_slide_images {
        ImageScope::PerSlide
    } else {
        ImageScope::SharedGallery
    };
    let options = ExtractOptions::new(&args.output, seed).with_image_scope(scope);

    log::debug!("Parsing {} as {}", filename, kind);
    let extraction = office_extractor::extract(reader, kind, filename, &options)?;

    if args.verbose {
        match (extraction.result.slides(), extraction.result.sheets()) {
            (Some(slides), _) => eprintln!("  Found {} slides", slides.len()),
            (_, Some(sheets)) => eprintln!("  Found {} sheets", sheets.len()),
            _ => {}
        }
        eprintln!("  Extracted {} images", extraction.images.len());
        for warning in &extraction.warnings {
            eprintln!("  Skipped {}", warning);
        }
    }

    Ok(extraction)
}

/// The declared kind: an explicit `--kind`, else the file extension.
fn resolve_kind(input_path: &Path, declared: Option<&str>) -> Result<DocumentKind> {
    match declared {
        Some(kind) => Ok(kind.parse()?),
        None => DocumentKind::from_path(input_path).ok_or_else(|| {
            anyhow::anyhow!(
                "Unsupported document kind for {} (expected .pptx or .xlsx)",
                input_path.display()
            )
        }),
    }
}

/// Seed for the input at `index`, distinct for every input of one run.
fn seed_for(base: u64, index: usize) -> u64 {
    base.wrapping_add(index as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_kind_prefers_declaration() {
        let path = Path::new("upload.bin");
        assert_eq!(
            resolve_kind(path, Some("spreadsheet")).unwrap(),
            DocumentKind::Spreadsheet
        );
        assert!(resolve_kind(path, None).is_err());
        assert!(resolve_kind(path, Some("pdf")).is_err());
        assert_eq!(
            resolve_kind(Path::new("daily.PPTX"), None).unwrap(),
            DocumentKind::Presentation
        );
    }

    #[test]
    fn test_seed_for_is_distinct_per_input() {
        assert_eq!(seed_for(100, 0), 100);
        assert_eq!(seed_for(100, 2), 102);
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "office-extract",
            "-o",
            "public/images",
            "--seed",
            "7",
            "--per-slide-images",
            "deck.pptx",
        ])
        .unwrap();

        assert_eq!(args.output, PathBuf::from("public/images"));
        assert_eq!(args.seed, Some(7));
        assert!(args.per_slide_images);
        assert_eq!(args.data_dir, PathBuf::from("."));
        assert_eq!(args.input, vec![PathBuf::from("deck.pptx")]);
    }
}
