use std::path::Path;

use crate::error::ConfigError;
use crate::types::{ComponentKind, TestConfig};

/// Reads and parses `<dir>/test.config.json`.
///
/// Returns `Ok(None)` (not an error) when the file simply doesn't exist —
/// that's a normal "not a component directory" case for discovery. Returns
/// `Err` on read or parse failure; callers log and skip per spec.md §4.1's
/// "fail softly" contract, they do not propagate the error upward.
pub fn load_test_config(dir: &Path) -> Result<Option<TestConfig>, ConfigError> {
    let path = dir.join("test.config.json");
    if !path.exists() {
        return Ok(None);
    }
    let path_str = path.display().to_string();

    let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path_str.clone(),
        source,
    })?;

    let config: TestConfig =
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path_str,
            source,
        })?;

    Ok(Some(config))
}

/// Loads a config and verifies its declared `kind` matches the directory
/// it was found under (`servers/` ⇒ `server`, etc).
pub fn load_test_config_of_kind(
    dir: &Path,
    expected: ComponentKind,
) -> Result<Option<TestConfig>, ConfigError> {
    let Some(config) = load_test_config(dir)? else {
        return Ok(None);
    };
    if config.kind != expected {
        return Err(ConfigError::KindMismatch {
            path: dir.join("test.config.json").display().to_string(),
            expected: expected.to_string(),
            found: config.kind.to_string(),
        });
    }
    Ok(Some(config))
}
