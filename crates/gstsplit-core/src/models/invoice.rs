//! Invoice boundary and split output models.

use serde::{Deserialize, Serialize};

/// Identity captured from the page that opens an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceMarker {
    /// Token following `Document No. :`.
    pub document_id: String,

    /// Recipient GSTIN token.
    pub gstin: String,
}

impl InvoiceMarker {
    pub fn new(document_id: impl Into<String>, gstin: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            gstin: gstin.into(),
        }
    }
}

/// A contiguous run of pages belonging to one invoice.
///
/// The first page is always the marker page that opened the span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceSpan {
    /// Identity captured from the opening page.
    pub marker: InvoiceMarker,

    /// Source page indices (0-indexed), ascending and contiguous.
    pub pages: Vec<u32>,
}

impl InvoiceSpan {
    /// Open a span at a marker page.
    pub fn open(marker: InvoiceMarker, page: u32) -> Self {
        Self {
            marker,
            pages: vec![page],
        }
    }

    /// Append a continuation page.
    pub fn push(&mut self, page: u32) {
        self.pages.push(page);
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// One written output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitFile {
    /// Name of the file inside the output directory.
    pub filename: String,

    /// Display name of the source document.
    pub source: String,

    /// Captured document id.
    pub document_id: String,

    /// Captured recipient GSTIN.
    pub gstin: String,

    /// Source page indices (0-indexed) copied into the file.
    pub pages: Vec<u32>,
}
