//! regiment: reorder C# type members and fold them into regions.
#![allow(clippy::multiple_crate_versions)]

use clap::Parser;
use log::{debug, error, info, LevelFilter};
use regiment::buffer::{Document, TextBuffer};
use regiment::cache::CodeModelCache;
use regiment::cleanup::CleanUpManager;
use regiment::edit_plan::{Edit, EditPlan};
use regiment::formats::csharp::CSharpFormat;
use regiment::undo::UndoTransaction;
use regiment::{config, input};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(name = "regiment")]
#[command(about = "Reorder class members and fold them into regions", long_about = None)]
struct Args {
    /// Files or directories to clean up
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// File extensions to match
    #[arg(long, short = 'e', value_name = "EXT")]
    ext: Vec<String>,

    /// Read settings from this file instead of ./regiment.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the edit plan as JSON instead of writing files
    #[arg(long)]
    dry_run: bool,

    /// Reorder only, without writing regions
    #[arg(long)]
    no_regions: bool,

    /// Apply an edit plan saved from an earlier dry run
    #[arg(long, value_name = "FILE")]
    load_plan: Option<PathBuf>,

    /// Log level: off, error, warn, info, debug or trace
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    debug!(args:?; "Parsed arguments");

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Runs the requested work, returning whether every document was cleaned up.
fn run(args: Args) -> io::Result<bool> {
    if let Some(load_path) = args.load_plan {
        let file_content = fs::read_to_string(&load_path)?;
        let plan: EditPlan = serde_json::from_str(&file_content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        plan.apply().map_err(io::Error::other)?;
        info!(edits = plan.edits.len(); "Applied saved edit plan");
        return Ok(true);
    }

    let mut cfg = match &args.config {
        Some(path) => config::Config::load_from(path),
        None => config::Config::load(),
    };

    // Override config with command line args
    if !args.ext.is_empty() {
        cfg.file_extensions = args.ext;
    }
    if args.no_regions {
        cfg.add_regions = false;
    }

    let documents = input::find_documents(args.paths, &cfg.file_extensions)?;

    if documents.is_empty() {
        eprintln!("No matching files found");
        return Ok(true);
    }

    let format = CSharpFormat;
    let cache = CodeModelCache::new();
    let manager = CleanUpManager::new(&format, cfg.order_policy(), cfg.cleanup_options())
        .with_cache(&cache);

    let mut plan = EditPlan::default();
    let mut all_clean = true;

    for path in &documents {
        let name = path.to_string_lossy().to_string();
        let before = fs::read_to_string(path)?;
        let mut document = Document::new(before.as_str());

        match manager.execute(&name, &mut document) {
            Ok(report) => {
                let description = format!(
                    "{} moves, {} regions removed, {} regions added",
                    report.moves, report.regions_removed, report.regions_added
                );
                if let Some(edit) = Edit::between(&name, &before, document.text(), description) {
                    plan.edits.push(edit);
                }
            }
            Err(err) => {
                eprintln!(
                    "{}",
                    UndoTransaction::new(format!("Clean up {name}")).status_message(&err)
                );
                all_clean = false;
            }
        }
    }

    if args.dry_run {
        let json = serde_json::to_string_pretty(&plan).map_err(io::Error::other)?;
        println!("{json}");
    } else if !plan.is_empty() {
        plan.apply().map_err(io::Error::other)?;
        info!(files = plan.edits.len(); "Wrote cleaned up documents");
    }

    Ok(all_clean)
}
