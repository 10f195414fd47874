//! # Registry State File
//!
//! The CLI keeps one registry per JSON file in the snapshot format of
//! `idreg-state`. Loading restores through `Registry::restore`, so a
//! hand-edited file that breaks an invariant is refused. Saving writes a
//! sibling temporary file and renames it over the original, so a crash
//! leaves either the old state or the new one.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use idreg_state::{Registry, RegistrySnapshot};

/// State file used when `--state` is not given.
pub const DEFAULT_STATE_FILE: &str = "idreg-state.json";

/// Load and validate the registry stored at `path`.
pub fn load(path: &Path) -> Result<Registry> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read state file {}", path.display()))?;
    let snapshot = RegistrySnapshot::from_json(&json)
        .with_context(|| format!("failed to parse state file {}", path.display()))?;
    let registry = Registry::restore(snapshot)
        .with_context(|| format!("state file {} is inconsistent", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        identities = registry.store().len(),
        "state loaded"
    );
    Ok(registry)
}

/// Atomically replace the state at `path` with `registry`.
pub fn save(path: &Path, registry: &Registry) -> Result<()> {
    let json = registry
        .snapshot()
        .to_json()
        .context("failed to serialize registry")?;
    let tmp = temp_path(path);
    std::fs::write(&tmp, json)
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("failed to move {} into place", tmp.display()))?;
    tracing::debug!(path = %path.display(), "state saved");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
