//! Application state for the gstsplit HTTP service

use std::path::Path;

use gstsplit_core::{GstinFilter, GstsplitConfig, InvoiceSplitter};

pub struct AppState {
    pub config: GstsplitConfig,
}

impl AppState {
    /// Build state from configuration, creating the upload and output
    /// directories if needed.
    pub fn new(config: GstsplitConfig) -> std::io::Result<Self> {
        config.ensure_dirs()?;
        tracing::info!(
            "Uploads in {}, split invoices in {}",
            config.storage.upload_dir.display(),
            config.storage.output_dir.display()
        );
        Ok(Self { config })
    }

    pub fn upload_dir(&self) -> &Path {
        &self.config.storage.upload_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.storage.output_dir
    }

    /// Splitter for one request.
    pub fn splitter(&self, filter: GstinFilter) -> InvoiceSplitter {
        InvoiceSplitter::new(self.output_dir())
            .with_filter(filter)
            .with_text_backend(self.config.extraction.text_backend)
    }
}
