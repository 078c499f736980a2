//! Configuration loading and validation.
//!
//! The reporter is configured once from an [`Options`](model::Options)
//! value. Options can be built in code or loaded from a YAML, JSON, or
//! TOML file with [`load`]; the format is picked from the file extension
//! and gated by the matching feature flag.

pub mod model;
pub mod validation;

use std::path::Path;

use crate::error::PanicsError;
use model::Options;

/// Read and parse an options file. Does not validate; see [`validation::validate`].
pub async fn load(path: &Path) -> Result<Options, PanicsError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PanicsError::ConfigFileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            PanicsError::Io(e)
        }
    })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    parse_config_str(ext, &content, &path.display().to_string())
}

/// Parse an options string based on file extension.
pub fn parse_config_str(
    ext: &str,
    content: &str,
    path_display: &str,
) -> Result<Options, PanicsError> {
    match ext {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => serde_yml::from_str(content).map_err(|e| PanicsError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "json")]
        "json" => serde_json::from_str(content).map_err(|e| PanicsError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "toml")]
        "toml" => toml::from_str(content).map_err(|e| PanicsError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        other => Err(PanicsError::UnsupportedFormat(other.to_string())),
    }
}

/// Parse a `KEY=VALUE` tag argument.
pub fn parse_tag(raw: &str) -> Result<(String, String), PanicsError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(PanicsError::InvalidTag(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_splits_on_first_equals() {
        assert_eq!(
            parse_tag("query=a=b").unwrap(),
            ("query".to_string(), "a=b".to_string())
        );
    }

    #[test]
    fn tag_without_key_is_rejected() {
        assert!(matches!(parse_tag("=gold"), Err(PanicsError::InvalidTag(_))));
        assert!(matches!(parse_tag("gold"), Err(PanicsError::InvalidTag(_))));
    }

    #[tokio::test]
    async fn missing_file_is_reported_by_path() {
        let err = load(Path::new("does-not-exist.yaml")).await.unwrap_err();
        assert!(matches!(err, PanicsError::ConfigFileNotFound { .. }));
    }
}
