//! Error types for the gstsplit-core library.

use thiserror::Error;

/// Main error type for the gstsplit library.
#[derive(Error, Debug)]
pub enum SplitError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Rejected upload.
    #[error("upload error: {0}")]
    Upload(#[from] UploadError),

    /// ZIP archive could not be read.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from a page.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// Invalid page index requested.
    #[error("invalid page index: {0}")]
    InvalidPage(u32),

    /// Failed to assemble or serialize an output document.
    #[error("failed to write PDF: {0}")]
    Write(String),
}

/// Reasons an uploaded file is refused before any processing happens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// The form had no `file` part.
    #[error("No file part")]
    NoFilePart,

    /// The `file` part had an empty filename.
    #[error("No selected file")]
    NoSelectedFile,

    /// The filename does not end in an allowed extension.
    #[error("Invalid file type. Only PDF and ZIP files are allowed.")]
    InvalidFileType,
}

/// Result type for the gstsplit library.
pub type Result<T> = std::result::Result<T, SplitError>;
