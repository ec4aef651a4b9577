//! Page text extraction and page-subset assembly using lopdf and pdf-extract.

use std::cell::OnceCell;

use lopdf::{Document, Object, ObjectId};
use tracing::{debug, trace, warn};

use super::{PdfProcessor, Result};
use crate::error::PdfError;
use crate::models::config::TextBackend;

/// PDF reader/writer backed by lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
    backend: TextBackend,
    /// pdf-extract output, computed on first use. `None` inside means it was
    /// unusable and lopdf is used instead.
    pdf_extract_pages: OnceCell<Option<Vec<String>>>,
}

impl PdfExtractor {
    /// Create a new PDF extractor using the lopdf text backend.
    pub fn new() -> Self {
        Self::with_backend(TextBackend::default())
    }

    /// Create a new PDF extractor with the given text backend.
    pub fn with_backend(backend: TextBackend) -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
            backend,
            pdf_extract_pages: OnceCell::new(),
        }
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))
    }

    fn check_page(&self, page: u32) -> Result<()> {
        if page >= self.page_count() {
            return Err(PdfError::InvalidPage(page));
        }
        Ok(())
    }

    fn lopdf_page_text(&self, page: u32) -> Result<String> {
        let doc = self.document()?;
        // lopdf numbers pages from 1
        doc.extract_text(&[page + 1])
            .map_err(|e| PdfError::TextExtraction(format!("page {}: {}", page, e)))
    }

    fn pdf_extract_page_texts(&self) -> Option<&[String]> {
        self.pdf_extract_pages
            .get_or_init(|| {
                let expected = self.page_count() as usize;
                match pdf_extract::extract_text_from_mem_by_pages(&self.raw_data) {
                    Ok(pages) if pages.len() == expected => Some(pages),
                    Ok(pages) => {
                        warn!(
                            "pdf-extract returned {} pages, expected {}; using lopdf",
                            pages.len(),
                            expected
                        );
                        None
                    }
                    Err(e) => {
                        warn!("pdf-extract failed ({}); using lopdf", e);
                        None
                    }
                }
            })
            .as_deref()
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract reads raw bytes, so keep the decrypted form
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        debug!("Loaded PDF with {} pages", doc.get_pages().len());
        self.document = Some(doc);
        self.pdf_extract_pages = OnceCell::new();
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        self.check_page(page)?;

        let text = match self.backend {
            TextBackend::Lopdf => self.lopdf_page_text(page)?,
            TextBackend::PdfExtract => match self.pdf_extract_page_texts() {
                Some(pages) => pages[page as usize].clone(),
                None => self.lopdf_page_text(page)?,
            },
        };

        trace!("Page {} text: {} chars", page, text.len());
        Ok(text)
    }

    fn extract_pages(&self, pages: &[u32]) -> Result<Vec<u8>> {
        if pages.is_empty() {
            return Err(PdfError::Write("No pages specified".to_string()));
        }

        let source = self.document()?;
        let page_ids = source.get_pages();
        let kept = pages
            .iter()
            .map(|&page| {
                page_ids
                    .get(&(page + 1))
                    .copied()
                    .ok_or(PdfError::InvalidPage(page))
            })
            .collect::<Result<Vec<ObjectId>>>()?;

        // Point the root page node at the kept pages only and let pruning drop
        // everything else in a single pass.
        let mut new_doc = source.clone();
        let root_pages = new_doc
            .catalog()
            .and_then(|catalog| catalog.get(b"Pages"))
            .and_then(Object::as_reference)
            .map_err(write_error)?;

        for &page_id in &kept {
            let inherited = inherited_attributes(source, page_id);
            let page = new_doc
                .get_object_mut(page_id)
                .and_then(Object::as_dict_mut)
                .map_err(write_error)?;
            for (key, value) in inherited {
                page.set(key, value);
            }
            page.set("Parent", root_pages);
        }

        let root = new_doc
            .get_object_mut(root_pages)
            .and_then(Object::as_dict_mut)
            .map_err(write_error)?;
        root.set(
            "Kids",
            kept.iter().map(|&id| Object::Reference(id)).collect::<Vec<_>>(),
        );
        root.set("Count", kept.len() as i64);

        // Bundle bookmarks point at pages outside this subset
        if let Ok(catalog) = new_doc.catalog_mut() {
            catalog.remove(b"Outlines");
        }

        new_doc.prune_objects();
        new_doc.compress();

        let mut buffer = Vec::new();
        new_doc
            .save_to(&mut buffer)
            .map_err(|e| PdfError::Write(format!("Save failed: {}", e)))?;

        debug!("Assembled {} page(s) into {} bytes", pages.len(), buffer.len());
        Ok(buffer)
    }
}

/// Attributes a page can inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Collect inheritable attributes the page does not set itself, so it keeps
/// them once it is attached directly to the root page node.
fn inherited_attributes(doc: &Document, page_id: ObjectId) -> Vec<(&'static [u8], Object)> {
    let Ok(page) = doc.get_dictionary(page_id) else {
        return Vec::new();
    };

    let mut found = Vec::new();
    for key in INHERITABLE {
        if page.has(key) {
            continue;
        }
        let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
        let mut depth = 0;
        while let Some(id) = parent {
            let Ok(node) = doc.get_dictionary(id) else {
                break;
            };
            if let Ok(value) = node.get(key) {
                found.push((key, value.clone()));
                break;
            }
            depth += 1;
            if depth > MAX_TREE_DEPTH {
                break;
            }
            parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        }
    }
    found
}

/// Guards the parent walk against cyclic page trees.
const MAX_TREE_DEPTH: usize = 64;

fn write_error(e: lopdf::Error) -> PdfError {
    PdfError::Write(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{build_encrypted_pdf, build_pdf};
    use lopdf::dictionary;

    fn loaded(pages: &[&[&str]]) -> PdfExtractor {
        let mut extractor = PdfExtractor::new();
        extractor.load(&build_pdf(pages)).unwrap();
        extractor
    }

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let mut extractor = PdfExtractor::new();
        let result = extractor.load(b"definitely not a pdf");
        assert!(matches!(result, Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_extract_page_text_per_page() {
        let extractor = loaded(&[&["first page"], &["second page"]]);
        assert_eq!(extractor.page_count(), 2);
        assert!(extractor.extract_page_text(0).unwrap().contains("first page"));
        assert!(extractor.extract_page_text(1).unwrap().contains("second page"));
        assert!(!extractor.extract_page_text(1).unwrap().contains("first page"));
    }

    #[test]
    fn test_extract_page_text_out_of_range() {
        let extractor = loaded(&[&["only"]]);
        assert!(matches!(
            extractor.extract_page_text(1),
            Err(PdfError::InvalidPage(1))
        ));
    }

    #[test]
    fn test_extract_pages_keeps_subset_in_order() {
        let extractor = loaded(&[&["p0"], &["p1"], &["p2"], &["p3"]]);
        let bytes = extractor.extract_pages(&[1, 2]).unwrap();

        let mut subset = PdfExtractor::new();
        subset.load(&bytes).unwrap();
        assert_eq!(subset.page_count(), 2);
        assert!(subset.extract_page_text(0).unwrap().contains("p1"));
        assert!(subset.extract_page_text(1).unwrap().contains("p2"));
    }

    #[test]
    fn test_extract_pages_rejects_empty_and_invalid() {
        let extractor = loaded(&[&["p0"]]);
        assert!(matches!(extractor.extract_pages(&[]), Err(PdfError::Write(_))));
        assert!(matches!(
            extractor.extract_pages(&[5]),
            Err(PdfError::InvalidPage(5))
        ));
    }

    #[test]
    fn test_extract_pages_keeps_inherited_attributes() {
        // Resources and MediaBox live on an intermediate page tree node
        let mut doc = Document::load_mem(&build_pdf(&[&["p0"], &["p1"], &["p2"]])).unwrap();
        let root_pages = doc
            .catalog()
            .unwrap()
            .get(b"Pages")
            .unwrap()
            .as_reference()
            .unwrap();
        let page_ids: Vec<ObjectId> = doc.get_pages().values().copied().collect();
        let resources = doc
            .get_dictionary(page_ids[0])
            .unwrap()
            .get(b"Resources")
            .unwrap()
            .clone();

        let middle = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Parent" => root_pages,
            "Kids" => vec![Object::Reference(page_ids[1]), Object::Reference(page_ids[2])],
            "Count" => 2,
            "Resources" => resources,
            "MediaBox" => vec![0.into(), 0.into(), 300.into(), 400.into()],
        });
        for &id in &page_ids[1..] {
            let page = doc.get_object_mut(id).unwrap().as_dict_mut().unwrap();
            page.remove(b"Resources");
            page.remove(b"MediaBox");
            page.set("Parent", middle);
        }
        let root = doc.get_object_mut(root_pages).unwrap().as_dict_mut().unwrap();
        root.set("Kids", vec![Object::Reference(page_ids[0]), Object::Reference(middle)]);

        let mut nested = Vec::new();
        doc.save_to(&mut nested).unwrap();

        let mut extractor = PdfExtractor::new();
        extractor.load(&nested).unwrap();
        assert_eq!(extractor.page_count(), 3);

        let mut subset = PdfExtractor::new();
        subset.load(&extractor.extract_pages(&[2]).unwrap()).unwrap();
        assert_eq!(subset.page_count(), 1);
        assert!(subset.extract_page_text(0).unwrap().contains("p2"));

        let subset_doc = subset.document().unwrap();
        let page = subset_doc
            .get_dictionary(*subset_doc.get_pages().get(&1).unwrap())
            .unwrap();
        assert!(page.has(b"Resources"));
        assert_eq!(
            page.get(b"MediaBox").unwrap().as_array().unwrap()[3].as_i64().unwrap(),
            400
        );
    }

    #[test]
    fn test_extract_pages_drops_other_pages() {
        let pages: Vec<String> = (0..20).map(|i| format!("page number {}", i)).collect();
        let lines: Vec<[&str; 1]> = pages.iter().map(|p| [p.as_str()]).collect();
        let refs: Vec<&[&str]> = lines.iter().map(|l| l.as_slice()).collect();
        let extractor = loaded(&refs);

        let single = extractor.extract_pages(&[7]).unwrap();
        let doc = Document::load_mem(&single).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
        // Catalog, page tree, page, contents, resources, font
        assert!(doc.objects.len() <= 6, "{} objects kept", doc.objects.len());
    }

    #[test]
    fn test_pdf_extract_backend_reads_pages() {
        let data = build_pdf(&[
            &["Document No. : INV-001", "Recipient : GSTIN : 29ABCDE1234F1Z5"],
            &["continued"],
        ]);
        let mut extractor = PdfExtractor::with_backend(TextBackend::PdfExtract);
        extractor.load(&data).unwrap();

        let first = extractor.extract_page_text(0).unwrap();
        assert!(first.contains("Document No. : INV-001"));
        assert!(first.contains("29ABCDE1234F1Z5"));
        assert!(extractor.extract_page_text(1).unwrap().contains("continued"));
        assert!(matches!(extractor.pdf_extract_pages.get(), Some(Some(_))));
    }

    #[test]
    fn test_pdf_extract_page_count_mismatch_falls_back_to_lopdf() {
        let mut extractor = PdfExtractor::with_backend(TextBackend::PdfExtract);
        extractor.load(&build_pdf(&[&["first page"], &["second page"]])).unwrap();
        // pdf-extract now sees a one-page document
        extractor.raw_data = build_pdf(&[&["other"]]);

        assert!(extractor.extract_page_text(1).unwrap().contains("second page"));
        assert!(matches!(extractor.pdf_extract_pages.get(), Some(None)));
    }

    #[test]
    fn test_pdf_extract_failure_falls_back_to_lopdf() {
        let mut extractor = PdfExtractor::with_backend(TextBackend::PdfExtract);
        extractor.load(&build_pdf(&[&["first page"]])).unwrap();
        extractor.raw_data = b"not a pdf".to_vec();

        assert!(extractor.extract_page_text(0).unwrap().contains("first page"));
        assert!(matches!(extractor.pdf_extract_pages.get(), Some(None)));
    }

    #[test]
    fn test_load_decrypts_empty_password() {
        let data = build_encrypted_pdf(&[&["secret invoice"], &["page two"]], true);
        assert!(Document::load_mem(&data).unwrap().is_encrypted());

        let mut extractor = PdfExtractor::new();
        extractor.load(&data).unwrap();
        assert_eq!(extractor.page_count(), 2);
        assert!(extractor.extract_page_text(0).unwrap().contains("secret invoice"));

        // Assembled subsets are written unencrypted
        let subset = Document::load_mem(&extractor.extract_pages(&[1]).unwrap()).unwrap();
        assert!(!subset.is_encrypted());
    }

    #[test]
    fn test_load_rejects_password_protected() {
        let data = build_encrypted_pdf(&[&["secret invoice"]], false);
        let mut extractor = PdfExtractor::new();
        assert!(matches!(extractor.load(&data), Err(PdfError::Encrypted)));
    }
}
