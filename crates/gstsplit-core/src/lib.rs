//! Core library for splitting GST invoice bundles.
//!
//! This crate provides:
//! - PDF loading, per-page text extraction and page-subset assembly
//! - Invoice boundary detection from the `Document No.` and recipient GSTIN labels
//! - The invoice splitter with optional GSTIN filtering
//! - Upload classification and ZIP fan-out with scoped temporary files

pub mod bundle;
pub mod error;
pub mod models;
pub mod pdf;
pub mod splitter;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

pub use bundle::{split_upload, split_upload_bytes, split_zip, UploadKind};
pub use error::{PdfError, Result, SplitError, UploadError};
pub use models::config::{GstsplitConfig, TextBackend};
pub use models::invoice::{InvoiceMarker, InvoiceSpan, SplitFile};
pub use pdf::{PdfExtractor, PdfProcessor};
pub use splitter::{secure_filename, GstinFilter, InvoiceSplitter};
