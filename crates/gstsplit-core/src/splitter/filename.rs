//! Filesystem-safe output names.

use unicode_normalization::UnicodeNormalization;

use crate::models::invoice::InvoiceMarker;

/// Reduce `name` to a flat, ASCII-only filename.
///
/// Accented letters are decomposed (NFKD) and lose their marks, path
/// separators become spaces, whitespace runs become `_`, every character
/// outside `[A-Za-z0-9._-]` is removed, and leading/trailing `.` and `_` are
/// stripped. The result may be empty.
pub fn secure_filename(name: &str) -> String {
    let ascii: String = name.nfkd().filter(char::is_ascii).collect();
    let flattened = ascii.replace(['/', '\\'], " ");
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Output filename for an invoice: `{document_id}_{gstin}.pdf`, sanitized.
///
/// Never empty: the `pdf` extension always survives sanitization.
pub fn invoice_filename(marker: &InvoiceMarker) -> String {
    secure_filename(&format!("{}_{}.pdf", marker.document_id, marker.gstin))
}
