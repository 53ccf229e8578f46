use crate::core::config::AppConfig;
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;
use tracing::debug;

const EXAMPLE_CONFIG: &str = include_str!("../../docs/example_config.yaml");

pub fn setup() -> Result<()> {
    let path = AppConfig::default_config_path()?;
    write_example_config(&path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Writes the bundled `example_config.yaml` to `path`, creating missing parent
/// directories. An existing file is never replaced.
pub fn write_example_config(path: &Path) -> Result<()> {
    if path.exists() {
        bail!(
            "{} already exists, remove it first to regenerate",
            path.display()
        );
    }
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("Could not create {}", dir.display()))?;
    }
    fs::write(path, EXAMPLE_CONFIG)
        .with_context(|| format!("Could not write {}", path.display()))?;
    debug!(path = %path.display(), "Wrote example config");
    Ok(())
}
