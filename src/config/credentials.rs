//! API key lookup in the `~/.gem/credentials` file.
//!
//! The file is YAML. The default registry key is stored under
//! `:rubygems_api_key:`; keys for other hosts are stored under the host URL:
//!
//! ```yaml
//! ---
//! :rubygems_api_key: rubygems_0123456789abcdef
//! https://gems.example.com: 4f2a...
//! ```

use super::DEFAULT_HOST;
use crate::{Error, Result};
use secrecy::SecretString;
use serde_yaml_ng::{Mapping, Value};
use std::path::{Path, PathBuf};

const DEFAULT_KEY_NAMES: [&str; 2] = [":rubygems_api_key", "rubygems_api_key"];

/// Returns `~/.gem/credentials`, if a home directory exists.
#[must_use]
pub fn default_credentials_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.home_dir().join(".gem").join("credentials"))
}

/// Reads the API key for `host` from a credentials file.
///
/// A host-scoped entry takes precedence. The default registry key is used
/// only when `host` is the default registry. A missing file yields `None`.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or is not a YAML
/// mapping.
pub fn read_api_key(path: &Path, host: &str) -> Result<Option<SecretString>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
        operation: "read_credentials".to_string(),
        cause: format!("{}: {e}", path.display()),
    })?;

    if contents.trim().is_empty() {
        return Ok(None);
    }

    let entries: Mapping =
        serde_yaml_ng::from_str(&contents).map_err(|e| Error::OperationFailed {
            operation: "parse_credentials".to_string(),
            cause: e.to_string(),
        })?;

    let host = host.trim_end_matches('/');
    if let Some(key) = lookup(&entries, host).or_else(|| lookup(&entries, &format!("{host}/"))) {
        return Ok(Some(key));
    }

    if host != DEFAULT_HOST {
        return Ok(None);
    }

    Ok(DEFAULT_KEY_NAMES
        .iter()
        .find_map(|name| lookup(&entries, name)))
}

fn lookup(entries: &Mapping, name: &str) -> Option<SecretString> {
    entries
        .get(name)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(|key| SecretString::from(key.to_string()))
}
