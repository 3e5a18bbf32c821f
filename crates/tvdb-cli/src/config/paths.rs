//! Config file resolution.

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Resolves the config file path.
///
/// - If `path` is `Some`, returns it unchanged.
/// - Otherwise returns `~/.config/tvdb/config.toml`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined (when `path` is `None`).
pub fn resolve_config_path(path: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(p) = path {
        return Ok(p.clone());
    }

    let home = std::env::var("HOME").context("HOME environment variable is not set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("tvdb")
        .join("config.toml"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_resolve_with_explicit_path() {
        // Arrange
        let path = PathBuf::from("/tmp/tvdb-test/custom.toml");

        // Act
        let resolved = resolve_config_path(Some(&path)).unwrap();

        // Assert
        assert_eq!(resolved, path);
    }

    #[test]
    fn test_resolve_default() {
        // Arrange & Act
        let path = resolve_config_path(None).unwrap();

        // Assert
        assert!(path.ends_with(".config/tvdb/config.toml"));
    }
}
