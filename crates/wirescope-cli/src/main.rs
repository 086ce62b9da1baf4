//! wirescope - inspect protobuf wire-format data without a schema
//!
//! Reads a raw byte stream from a file or stdin, optionally strips SLIP
//! framing and snappy compression, then prints an annotated hex dump and an
//! indented field tree for each message it finds.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;
use wirescope_core::{printable_lossy, DecodeOptions, Decoder};

/// Inspect protobuf wire-format data without a schema
#[derive(Parser, Debug)]
#[command(name = "wirescope")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a file containing raw wire data; reads stdin when omitted
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Snappy-decompress the input (or each SLIP frame) before parsing
    #[arg(long)]
    snappy: bool,

    /// Treat the input as a SLIP-framed byte stream
    #[arg(long)]
    slip: bool,

    /// Reject malformed SLIP escape sequences instead of applying the
    /// permissive fallback
    #[arg(long, requires = "slip")]
    strict_slip: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print only the annotated hex dump
    #[arg(long, conflicts_with = "tree_only")]
    hex_only: bool,

    /// Print only the field tree
    #[arg(long)]
    tree_only: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let data = read_input(cli.file.as_deref())?;
    debug!(bytes = data.len(), "input read");

    println!("==== Protobuf Decode ====\n");
    println!("raw ({} bytes):", data.len());
    println!("{}", printable_lossy(&data));

    let options = DecodeOptions {
        verbose: cli.verbose > 0,
        snappy: cli.snappy,
        slip: cli.slip,
        strict_slip: cli.strict_slip,
    };
    let report = Decoder::new(options)
        .decode(&data)
        .context("failed to decode input")?;

    if cli.slip {
        let count = report.messages.len();
        println!(
            "\nFound {} message{}",
            count,
            if count == 1 { "" } else { "s" }
        );
    }

    for message in &report.messages {
        println!("\nMessage {} ({} bytes):", message.index + 1, message.data.len());
        println!("{}", message.preview());

        if !cli.tree_only {
            println!("\n[{} ]", message.hex_dump);
        }
        if !cli.hex_only {
            println!("\n{}", message.tree);
        }
    }

    Ok(())
}

/// Read the input bytes from a file, or stdin when no path was given
fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => fs::read(path)
            .with_context(|| format!("failed to read input file: {}", path.display())),
        None => {
            let mut buffer = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buffer)
                .context("failed to read stdin")?;
            Ok(buffer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
