//! # Init Subcommand
//!
//! Creates a new, empty registry state file. The verifier and hash format
//! are fixed here and cannot be changed later.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use idreg_core::{HashFormat, Principal};
use idreg_state::{Registry, RegistryConfig};

use crate::state_file;

/// Arguments for `idreg init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Principal allowed to verify identities.
    #[arg(long, required_unless_present = "config")]
    pub verifier: Option<String>,

    /// Required hex length of document hashes (default 64).
    #[arg(long, conflicts_with = "config")]
    pub hash_length: Option<usize>,

    /// YAML registry config (verifier and hash format).
    #[arg(long, conflicts_with = "verifier")]
    pub config: Option<PathBuf>,

    /// Overwrite an existing state file.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    fn registry_config(&self) -> Result<RegistryConfig> {
        if let Some(path) = &self.config {
            return RegistryConfig::load(path).context("failed to load registry config");
        }
        let Some(raw) = &self.verifier else {
            bail!("either --verifier or --config is required");
        };
        let verifier = Principal::new(raw.as_str()).context("invalid --verifier")?;
        let mut config = RegistryConfig::new(verifier);
        if let Some(length) = self.hash_length {
            config = config.with_hash_format(HashFormat::Hex { length });
        }
        Ok(config)
    }
}

/// Execute `idreg init`.
pub fn run_init(args: &InitArgs, state: &Path) -> Result<u8> {
    if state.exists() && !args.force {
        bail!(
            "state file {} already exists (use --force to replace it)",
            state.display()
        );
    }
    let config = args.registry_config()?;
    let registry = Registry::new(config);
    state_file::save(state, &registry)?;

    println!(
        "OK: initialized registry at {} (verifier {}, hashes: {})",
        state.display(),
        registry.verifier(),
        registry.config().hash_format
    );
    Ok(0)
}
