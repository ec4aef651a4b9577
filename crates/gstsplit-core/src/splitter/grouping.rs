//! Page-to-invoice grouping.

use tracing::trace;

use super::markers::detect_marker;
use crate::models::invoice::InvoiceSpan;

/// Streaming page grouper.
///
/// Feed pages in order with [`InvoiceGrouper::push_page`]; a completed span is
/// handed back whenever a marker page closes the previous one. Call
/// [`InvoiceGrouper::finish`] after the last page.
#[derive(Debug, Default)]
pub struct InvoiceGrouper {
    open: Option<InvoiceSpan>,
    dropped: u32,
}

impl InvoiceGrouper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one page. Returns the span it closed, if any.
    pub fn push_page(&mut self, page: u32, text: &str) -> Option<InvoiceSpan> {
        if let Some(marker) = detect_marker(text) {
            trace!("Page {} opens invoice {}", page, marker.document_id);
            return self.open.replace(InvoiceSpan::open(marker, page));
        }

        match self.open.as_mut() {
            Some(span) => span.push(page),
            None => {
                trace!("Page {} precedes the first marker, dropped", page);
                self.dropped += 1;
            }
        }
        None
    }

    /// Close the trailing span.
    pub fn finish(&mut self) -> Option<InvoiceSpan> {
        self.open.take()
    }

    /// Pages seen before any marker page.
    pub fn dropped_pages(&self) -> u32 {
        self.dropped
    }
}
