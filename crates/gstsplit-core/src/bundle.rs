//! Upload handling: file-type checks and ZIP fan-out.
//!
//! Every file written here is a [`NamedTempFile`], so saved uploads and
//! extracted archive members are removed when processing ends, whether it
//! succeeded or not.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::error::{Result, UploadError};
use crate::models::invoice::SplitFile;
use crate::splitter::{secure_filename, InvoiceSplitter};

/// Accepted upload types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Pdf,
    Zip,
}

impl UploadKind {
    /// Classify by extension (case-insensitive). The name must contain a `.`.
    pub fn from_filename(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "zip" => Some(Self::Zip),
            _ => None,
        }
    }

    /// Validate an uploaded filename.
    pub fn for_upload(name: &str) -> std::result::Result<Self, UploadError> {
        if name.is_empty() {
            return Err(UploadError::NoSelectedFile);
        }
        Self::from_filename(name).ok_or(UploadError::InvalidFileType)
    }

    fn suffix(self) -> &'static str {
        match self {
            Self::Pdf => ".pdf",
            Self::Zip => ".zip",
        }
    }
}

/// Save an uploaded file into `scratch_dir` and split it.
///
/// `filename` is the client-supplied name; it decides the upload kind and
/// labels the outputs.
pub fn split_upload_bytes(
    data: &[u8],
    filename: &str,
    splitter: &InvoiceSplitter,
    scratch_dir: &Path,
) -> Result<Vec<SplitFile>> {
    let kind = UploadKind::for_upload(filename)?;
    let source = secure_filename(filename);

    let mut saved = scratch_file(&source, kind, scratch_dir)?;
    saved.write_all(data)?;
    saved.flush()?;
    debug!("Upload {} saved to {}", source, saved.path().display());

    split_upload(saved.path(), kind, &source, splitter, scratch_dir)
}

/// Split a PDF or every PDF inside a ZIP archive.
pub fn split_upload(
    path: &Path,
    kind: UploadKind,
    source: &str,
    splitter: &InvoiceSplitter,
    scratch_dir: &Path,
) -> Result<Vec<SplitFile>> {
    match kind {
        UploadKind::Pdf => splitter.split_file_as(path, source),
        UploadKind::Zip => split_zip(path, splitter, scratch_dir),
    }
}

/// Extract each `.pdf` member of the archive at `path` into `scratch_dir` and
/// split it. Members are processed in archive order; other members are skipped.
pub fn split_zip(
    path: &Path,
    splitter: &InvoiceSplitter,
    scratch_dir: &Path,
) -> Result<Vec<SplitFile>> {
    let mut archive = ZipArchive::new(File::open(path)?)?;
    let mut written = Vec::new();

    for index in 0..archive.len() {
        let (member_name, extracted) = {
            let mut entry = archive.by_index(index)?;
            let name = entry.name().to_string();

            if entry.is_dir() {
                continue;
            }
            if !name.to_lowercase().ends_with(".pdf") {
                warn!("Skipping non-PDF archive member {}", name);
                continue;
            }

            let mut extracted =
                scratch_file(&secure_filename(&name), UploadKind::Pdf, scratch_dir)?;
            io::copy(&mut entry, &mut extracted)?;
            extracted.flush()?;
            (name, extracted)
        };

        info!("Processing archive member {}", member_name);
        written.extend(splitter.split_file_as(extracted.path(), &member_name)?);
    }

    Ok(written)
}

fn scratch_file(source: &str, kind: UploadKind, scratch_dir: &Path) -> io::Result<NamedTempFile> {
    let stem = source
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(source);
    tempfile::Builder::new()
        .prefix(&format!("{}-", stem))
        .suffix(kind.suffix())
        .tempfile_in(scratch_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PdfError, SplitError};
    use crate::fixtures::invoice_bundle;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::io::Cursor;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn invoice_pdf(id: &str, gstin: &str) -> Vec<u8> {
        invoice_bundle(&[(id, gstin, 1)])
    }

    fn build_zip(members: &[(&str, Vec<u8>)]) -> Vec<u8> {
        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            let options = SimpleFileOptions::default();
            for (name, data) in members {
                if name.ends_with('/') {
                    zip.add_directory(*name, options).unwrap();
                } else {
                    zip.start_file(*name, options).unwrap();
                    zip.write_all(data).unwrap();
                }
            }
            zip.finish().unwrap();
        }
        buffer
    }

    fn dir_is_empty(path: &Path) -> bool {
        fs::read_dir(path).unwrap().next().is_none()
    }

    #[test]
    fn test_upload_kind_from_filename() {
        assert_eq!(UploadKind::from_filename("bundle.pdf"), Some(UploadKind::Pdf));
        assert_eq!(UploadKind::from_filename("BUNDLE.PDF"), Some(UploadKind::Pdf));
        assert_eq!(UploadKind::from_filename("march.tar.Zip"), Some(UploadKind::Zip));
        assert_eq!(UploadKind::from_filename("pdf"), None);
        assert_eq!(UploadKind::from_filename("notes.txt"), None);
        assert_eq!(UploadKind::from_filename("bundle.pdf.exe"), None);
    }

    #[test]
    fn test_for_upload_errors() {
        assert_eq!(UploadKind::for_upload(""), Err(UploadError::NoSelectedFile));
        assert_eq!(UploadKind::for_upload("x.docx"), Err(UploadError::InvalidFileType));
        assert_eq!(UploadKind::for_upload("x.zip"), Ok(UploadKind::Zip));
    }

    #[test]
    fn test_split_upload_bytes_pdf() {
        let scratch = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let splitter = InvoiceSplitter::new(out.path());

        let files = split_upload_bytes(
            &invoice_pdf("INV-1", "29ABCDE1234F1Z5"),
            "March Bundle.pdf",
            &splitter,
            scratch.path(),
        )
        .unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].filename, "INV-1_29ABCDE1234F1Z5.pdf");
        assert_eq!(files[0].source, "March_Bundle.pdf");
        assert_eq!(files[0].pages, vec![0, 1]);
        assert!(dir_is_empty(scratch.path()));
    }

    #[test]
    fn test_split_upload_bytes_rejects_bad_type() {
        let scratch = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let splitter = InvoiceSplitter::new(out.path());

        let result = split_upload_bytes(b"hello", "notes.txt", &splitter, scratch.path());

        assert!(matches!(
            result,
            Err(SplitError::Upload(UploadError::InvalidFileType))
        ));
        assert!(dir_is_empty(scratch.path()));
    }

    #[test]
    fn test_split_zip_fans_out_over_pdf_members() {
        let scratch = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let splitter = InvoiceSplitter::new(out.path());

        let archive = build_zip(&[
            ("readme.txt", b"not a pdf".to_vec()),
            ("march/", Vec::new()),
            ("march/a.pdf", invoice_pdf("INV-1", "29ABCDE1234F1Z5")),
            ("B.PDF", invoice_pdf("INV-2", "27AAACB1234C1Z9")),
        ]);

        let files = split_upload_bytes(&archive, "bundle.zip", &splitter, scratch.path()).unwrap();

        let names: Vec<&str> = files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(
            names,
            vec!["INV-1_29ABCDE1234F1Z5.pdf", "INV-2_27AAACB1234C1Z9.pdf"]
        );
        assert_eq!(files[0].source, "march/a.pdf");
        assert!(out.path().join("INV-2_27AAACB1234C1Z9.pdf").exists());
        assert!(dir_is_empty(scratch.path()));
    }

    #[test]
    fn test_split_zip_applies_filter_per_member() {
        let scratch = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let splitter = InvoiceSplitter::new(out.path())
            .with_filter(crate::splitter::GstinFilter::new(Some("27aaacb1234c1z9")));

        let archive = build_zip(&[
            ("a.pdf", invoice_pdf("INV-1", "29ABCDE1234F1Z5")),
            ("b.pdf", invoice_pdf("INV-2", "27AAACB1234C1Z9")),
        ]);

        let files = split_upload_bytes(&archive, "bundle.zip", &splitter, scratch.path()).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].document_id, "INV-2");
    }

    #[test]
    fn test_split_zip_cleans_up_after_failure() {
        let scratch = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let splitter = InvoiceSplitter::new(out.path());

        let archive = build_zip(&[
            ("good.pdf", invoice_pdf("INV-1", "29ABCDE1234F1Z5")),
            ("broken.pdf", b"%PDF-1.4 truncated".to_vec()),
        ]);

        let result = split_upload_bytes(&archive, "bundle.zip", &splitter, scratch.path());

        assert!(matches!(result, Err(SplitError::Pdf(PdfError::Parse(_)))));
        assert!(out.path().join("INV-1_29ABCDE1234F1Z5.pdf").exists());
        assert!(dir_is_empty(scratch.path()));
    }

    #[test]
    fn test_split_zip_rejects_corrupt_archive() {
        let scratch = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let splitter = InvoiceSplitter::new(out.path());

        let result = split_upload_bytes(b"PK not really", "bundle.zip", &splitter, scratch.path());

        assert!(matches!(result, Err(SplitError::Archive(_))));
        assert!(dir_is_empty(scratch.path()));
    }
}
