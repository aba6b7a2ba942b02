// src/main.rs

use anyhow::Result;
use clap::Parser;
use fsbundle::aggregate::{AggregateLimits, AggregateParams, Instructions};
use fsbundle::cli::{parse_selection, Cli};
use fsbundle::errors::Error;
use fsbundle::scanner::ScanLimits;
use fsbundle::signal::setup_signal_handler;
use fsbundle::{aggregate, scan, set_workspace_roots};
use std::io::Write;
use std::path::PathBuf;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let args = Cli::parse();
    log::debug!("Raw arguments: {:?}", args);

    // The scan root is the sole authorized workspace for this invocation.
    let root = std::fs::canonicalize(&args.root)
        .map_err(|e| anyhow::anyhow!("Cannot resolve root '{}': {}", args.root, e))?;
    set_workspace_roots(&[&root]);

    let token = setup_signal_handler()?;

    let result = if args.list {
        run_list(&root, &args, &token)
    } else {
        run_bundle(&root, &args, &token)
    };

    if let Err(e) = result {
        match e {
            Error::Cancelled => {
                eprintln!("\nOperation cancelled.");
                std::process::exit(130);
            }
            other => {
                eprintln!("fsbundle: {}", other);
                std::process::exit(1);
            }
        }
    }
    Ok(())
}

/// Streams scan batches as a plain listing of relative paths.
fn run_list(root: &PathBuf, args: &Cli, token: &fsbundle::CancellationToken) -> fsbundle::Result<()> {
    let handle = scan(root, &args.ignore, ScanLimits::default(), token)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for batch in handle.batches().iter() {
        for record in &batch.files {
            let display = record
                .path
                .strip_prefix(root)
                .unwrap_or(&record.path)
                .to_string_lossy()
                .replace('\\', "/");
            let _ = writeln!(out, "{}", display);
        }
        if batch.is_complete {
            break;
        }
    }

    if token.is_cancelled() {
        return Err(Error::Cancelled);
    }
    Ok(())
}

/// Aggregates the selection and prints the bundle to stdout.
fn run_bundle(
    root: &PathBuf,
    args: &Cli,
    token: &fsbundle::CancellationToken,
) -> fsbundle::Result<()> {
    let selection = args
        .select
        .iter()
        .map(|raw| {
            let mut entry = parse_selection(raw);
            // Relative selections are taken relative to the root.
            if entry.path.is_relative() {
                entry.path = root.join(&entry.path);
            }
            entry
        })
        .collect();

    let params = AggregateParams {
        root: root.clone(),
        selection,
        file_tree_mode: args.tree_mode.into(),
        limits: AggregateLimits {
            max_files: args.max_files,
            max_bytes: args.max_bytes,
        },
        extra_ignore_patterns: args.ignore.clone(),
        tree_root_override: None,
        instructions: Instructions {
            prefix: args.prefix.clone(),
            suffix: args.suffix.clone(),
        },
    };

    let result = aggregate(&params, token)?;
    print!("{}", result.content);
    log::info!("Bundled {} file(s)", result.file_count);
    Ok(())
}
