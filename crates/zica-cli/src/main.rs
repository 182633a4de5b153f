//! zica - annotated hex dumps of Protocol Buffers wire data
//!
//! Reads wire bytes from a file (or standard input) and prints the
//! heuristic inspection: a hex dump annotated with the field structure the
//! scanner could recognize.

use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;
use zica_core::inspect::{scan, RenderConfig, Renderer, ScanMode};
use zica_core::MAX_SERIALIZED_SIZE;

/// Annotated hex dumps of Protocol Buffers wire data
#[derive(Parser, Debug)]
#[command(name = "zica")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input file (reads standard input if absent)
    input: Option<PathBuf>,

    /// Bytes rendered per row of the hex dump
    #[arg(long, default_value = "16")]
    bytes_per_line: usize,

    /// Abort on the first unrecognizable byte instead of reporting it
    #[arg(long)]
    strict: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let data = read_input(cli.input.as_deref())?;
    debug!("read {} bytes", data.len());

    let mode = if cli.strict {
        ScanMode::Strict
    } else {
        ScanMode::Permissive
    };
    let spans = scan(&data, mode);

    let renderer = Renderer::with_config(
        &data,
        RenderConfig::new().bytes_per_line(cli.bytes_per_line),
    );
    print!("{}", renderer.render(&spans));

    Ok(())
}

/// Reads up to `MAX_SERIALIZED_SIZE` bytes from the given path, or from
/// standard input when no path was given.
fn read_input(path: Option<&std::path::Path>) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open file: {}", path.display()))?;
            file.take(u64::from(MAX_SERIALIZED_SIZE))
                .read_to_end(&mut data)
                .with_context(|| format!("failed to read file: {}", path.display()))?;
        }
        None => {
            io::stdin()
                .lock()
                .take(u64::from(MAX_SERIALIZED_SIZE))
                .read_to_end(&mut data)
                .context("failed to read standard input")?;
        }
    }
    Ok(data)
}
