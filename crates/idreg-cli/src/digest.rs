//! # Hash Subcommand
//!
//! Computes the SHA-256 evidence hash of a local document, in the form
//! `create` and `update` expect under the default hash format.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use idreg_core::sha256_document;

/// Arguments for `idreg hash`.
#[derive(Args, Debug)]
pub struct HashArgs {
    /// Document to hash.
    pub file: PathBuf,
}

/// Execute `idreg hash`.
pub fn run_hash(args: &HashArgs) -> Result<u8> {
    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    println!("{}", sha256_document(&bytes));
    Ok(0)
}
