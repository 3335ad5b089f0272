//! Mapping loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::{MappingFile, MappingTable};
use crate::config::validation::ValidationError;

/// Error type for mapping loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read mapping file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("mapping file is not valid UTF-8")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl ConfigError {
    /// True when the document was read but could not be deserialized.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            ConfigError::Yaml(_) | ConfigError::Toml(_) | ConfigError::Json(_) | ConfigError::Encoding(_)
        )
    }
}

/// Serialization format of a mapping document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MappingFormat {
    #[default]
    Yaml,
    Toml,
    Json,
}

impl MappingFormat {
    /// Pick the format from the file extension, YAML unless told otherwise.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("toml") => MappingFormat::Toml,
            Some("json") => MappingFormat::Json,
            _ => MappingFormat::Yaml,
        }
    }
}

/// Parse and validate a mapping document.
pub fn parse_mapping(data: &[u8], format: MappingFormat) -> Result<MappingTable, ConfigError> {
    let file: MappingFile = match format {
        MappingFormat::Yaml => {
            if is_blank_yaml(data) {
                MappingFile::default()
            } else {
                serde_yaml::from_slice(data)?
            }
        }
        MappingFormat::Toml => toml::from_str(std::str::from_utf8(data)?)?,
        MappingFormat::Json => serde_json::from_slice(data)?,
    };

    let table = MappingTable::new(file.mapping.unwrap_or_default())?;
    Ok(table)
}

/// Load, parse and validate the mapping file at `path`.
pub fn load_mapping(path: &Path) -> Result<MappingTable, ConfigError> {
    let data = fs::read(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), bytes = data.len(), "Read mapping file");
    parse_mapping(&data, MappingFormat::from_path(path))
}

// A document holding only markers and comments carries no mapping at all.
fn is_blank_yaml(data: &[u8]) -> bool {
    String::from_utf8_lossy(data).lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}
