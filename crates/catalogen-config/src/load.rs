use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::errors::ConfigError;
use crate::validate::{ValidatedConfig, validate_document};

/// Read, parse and validate the configuration at `path`.
pub fn load_config(path: &Path) -> Result<ValidatedConfig, ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::Missing);
    }
    if !path.is_file() {
        return Err(ConfigError::NotAFile(path.to_path_buf()));
    }

    let contents = fs::read_to_string(path)?;
    let document = parse_config_document(&contents, is_toml(path))?;
    validate_document(document)
}

/// Parse configuration text into a JSON document; TOML is converted on the way.
pub fn parse_config_document(contents: &str, toml: bool) -> Result<Value, ConfigError> {
    if toml {
        let value: toml::Value = toml::from_str(contents)?;
        Ok(serde_json::to_value(value)?)
    } else {
        Ok(serde_json::from_str(contents)?)
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}
