//! Configuration structures for the splitter service.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SplitError};

/// Main configuration for gstsplit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GstsplitConfig {
    /// HTTP server configuration.
    pub server: ServerConfig,

    /// Upload and output directories.
    pub storage: StorageConfig,

    /// Page text extraction configuration.
    pub extraction: ExtractionConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to.
    pub host: String,

    /// Port to listen on.
    pub port: u16,

    /// Largest accepted request body in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_upload_bytes: 64 * 1024 * 1024,
        }
    }
}

/// Filesystem locations used by the splitter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for saved uploads and extracted archive members.
    pub upload_dir: PathBuf,

    /// Directory split invoices are written to and served from.
    pub output_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            output_dir: PathBuf::from("split_invoices"),
        }
    }
}

/// Which library reads page text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextBackend {
    /// Per-page extraction through lopdf.
    #[default]
    Lopdf,
    /// Whole-document extraction through pdf-extract, split by page.
    PdfExtract,
}

/// Page text extraction configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Text extraction backend.
    pub text_backend: TextBackend,
}

impl GstsplitConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| SplitError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| SplitError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Create the upload and output directories if they are missing.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.storage.upload_dir)?;
        std::fs::create_dir_all(&self.storage.output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = GstsplitConfig::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.storage.output_dir, PathBuf::from("split_invoices"));
        assert_eq!(config.extraction.text_backend, TextBackend::Lopdf);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{"server": {"port": 8080}, "extraction": {"text_backend": "pdf-extract"}}"#;
        let config: GstsplitConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.storage.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.extraction.text_backend, TextBackend::PdfExtract);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = GstsplitConfig::default();
        config.storage.output_dir = PathBuf::from("/srv/invoices");
        config.save(&path).unwrap();

        let loaded = GstsplitConfig::from_file(&path).unwrap();
        assert_eq!(loaded.storage.output_dir, PathBuf::from("/srv/invoices"));
    }

    #[test]
    fn test_from_file_reports_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"server": {"port": "not a number"}}"#).unwrap();

        let err = GstsplitConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, SplitError::Config(_)));
        assert!(err.to_string().contains("config.json"));
    }

    #[test]
    fn test_from_file_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = GstsplitConfig::from_file(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(SplitError::Io(_))));
    }
}
