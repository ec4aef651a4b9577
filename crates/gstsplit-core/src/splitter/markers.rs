//! Marker page detection.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::invoice::InvoiceMarker;

lazy_static! {
    /// Document number label; captures the id token.
    pub static ref DOCUMENT_NO: Regex = Regex::new(
        r"Document No\. : (\S+)"
    ).unwrap();

    /// Recipient GSTIN label; captures the GSTIN token.
    pub static ref RECIPIENT_GSTIN: Regex = Regex::new(
        r"Recipient\s+:\s+GSTIN\s+:\s+(\S+)"
    ).unwrap();
}

/// Extract the document id, if the label is present.
pub fn extract_document_id(text: &str) -> Option<&str> {
    DOCUMENT_NO
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Extract the recipient GSTIN, if the label is present.
pub fn extract_recipient_gstin(text: &str) -> Option<&str> {
    RECIPIENT_GSTIN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Detect a marker page: both labels must be present. The first occurrence
/// of each label wins.
pub fn detect_marker(text: &str) -> Option<InvoiceMarker> {
    let document_id = extract_document_id(text)?;
    let gstin = extract_recipient_gstin(text)?;
    Some(InvoiceMarker::new(document_id, gstin))
}
