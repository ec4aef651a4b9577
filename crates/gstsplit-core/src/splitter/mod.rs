//! Invoice splitting.
//!
//! Pages are scanned in order. A page carrying both the `Document No.` and the
//! recipient GSTIN labels opens a new invoice; following pages belong to it
//! until the next such page. Each closed invoice is written to its own PDF
//! unless the GSTIN filter rejects it.

mod filename;
mod filter;
mod grouping;
pub mod markers;

pub use filename::secure_filename;
pub use filter::GstinFilter;
pub use grouping::InvoiceGrouper;

use filename::invoice_filename;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::Result;
use crate::models::config::TextBackend;
use crate::models::invoice::{InvoiceSpan, SplitFile};
use crate::pdf::{PdfExtractor, PdfProcessor};

/// Splits invoice bundles into one PDF per invoice.
#[derive(Debug, Clone)]
pub struct InvoiceSplitter {
    output_dir: PathBuf,
    filter: GstinFilter,
    text_backend: TextBackend,
}

impl InvoiceSplitter {
    /// Create a splitter writing into `output_dir`, with no GSTIN filter.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            filter: GstinFilter::any(),
            text_backend: TextBackend::default(),
        }
    }

    /// Only write invoices addressed to this GSTIN.
    pub fn with_filter(mut self, filter: GstinFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the page text backend.
    pub fn with_text_backend(mut self, backend: TextBackend) -> Self {
        self.text_backend = backend;
        self
    }

    /// Split a PDF on disk. The file name is used as the source label.
    pub fn split_file(&self, path: &Path) -> Result<Vec<SplitFile>> {
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.split_file_as(path, &source)
    }

    /// Split a PDF on disk, labelling outputs with `source`.
    pub fn split_file_as(&self, path: &Path, source: &str) -> Result<Vec<SplitFile>> {
        let data = fs::read(path)?;
        self.split_bytes(&data, source)
    }

    /// Split an in-memory PDF.
    pub fn split_bytes(&self, data: &[u8], source: &str) -> Result<Vec<SplitFile>> {
        let mut pdf = PdfExtractor::with_backend(self.text_backend);
        pdf.load(data)?;
        self.split_document(&pdf, source)
    }

    /// Split an already loaded document.
    ///
    /// Invoices are written as soon as they close, so a failure part-way
    /// through leaves the earlier invoices on disk.
    pub fn split_document<P: PdfProcessor>(&self, pdf: &P, source: &str) -> Result<Vec<SplitFile>> {
        let page_count = pdf.page_count();
        let mut grouper = InvoiceGrouper::new();
        let mut written = Vec::new();

        for page in 0..page_count {
            debug!("Processing page {} of {}", page + 1, page_count);
            let text = pdf.extract_page_text(page)?;

            if let Some(span) = grouper.push_page(page, &text) {
                written.extend(self.finalize(pdf, span, source)?);
            }
        }

        if let Some(span) = grouper.finish() {
            written.extend(self.finalize(pdf, span, source)?);
        }

        if grouper.dropped_pages() > 0 {
            debug!(
                "{}: {} page(s) before the first invoice were skipped",
                source,
                grouper.dropped_pages()
            );
        }
        info!("{}: split into {} file(s)", source, written.len());
        Ok(written)
    }

    fn finalize<P: PdfProcessor>(
        &self,
        pdf: &P,
        span: InvoiceSpan,
        source: &str,
    ) -> Result<Option<SplitFile>> {
        if !self.filter.matches(&span.marker.gstin) {
            debug!(
                "Skipping invoice {} for GSTIN {}",
                span.marker.document_id, span.marker.gstin
            );
            return Ok(None);
        }

        let filename = invoice_filename(&span.marker);
        let bytes = pdf.extract_pages(&span.pages)?;
        fs::write(self.output_dir.join(&filename), bytes)?;
        debug!("Saved split PDF: {} ({} page(s))", filename, span.page_count());

        Ok(Some(SplitFile {
            filename,
            source: source.to_string(),
            document_id: span.marker.document_id,
            gstin: span.marker.gstin,
            pages: span.pages,
        }))
    }
}
