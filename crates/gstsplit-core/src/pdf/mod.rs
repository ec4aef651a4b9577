//! PDF processing module.

mod extractor;

pub use extractor::PdfExtractor;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Capabilities the splitter needs from a PDF library.
///
/// Page indices are 0-indexed throughout.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from a specific page.
    fn extract_page_text(&self, page: u32) -> Result<String>;

    /// Build a new document holding exactly `pages`, in order, and serialize it.
    fn extract_pages(&self, pages: &[u32]) -> Result<Vec<u8>>;
}
