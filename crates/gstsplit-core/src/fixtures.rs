//! PDF fixtures for tests in this workspace.
//!
//! Enabled for the crate's own tests and, through the `test-fixtures`
//! feature, for the server and CLI test suites.

use std::cell::RefCell;

use lopdf::content::{Content, Operation};
use lopdf::encryption::{decrypt_object, get_encryption_key};
use lopdf::{dictionary, Document, Object, Stream};

use crate::error::PdfError;
use crate::pdf::{PdfProcessor, Result};

/// Build a PDF with one page per entry; each entry's lines are drawn as
/// separate text objects so lopdf reports them on separate lines.
pub fn build_pdf(pages: &[&[&str]]) -> Vec<u8> {
    let mut buffer = Vec::new();
    build_document(pages).save_to(&mut buffer).unwrap();
    buffer
}

/// A bundle of invoices: each `(document_id, gstin, extra_pages)` becomes a
/// marker page followed by `extra_pages` continuation pages.
pub fn invoice_bundle(invoices: &[(&str, &str, usize)]) -> Vec<u8> {
    let mut pages: Vec<Vec<String>> = Vec::new();
    for (document_id, gstin, extra_pages) in invoices {
        pages.push(vec![
            "TAX INVOICE".to_string(),
            format!("Document No. : {}", document_id),
            format!("Recipient : GSTIN : {}", gstin),
        ]);
        for n in 0..*extra_pages {
            pages.push(vec![format!("{} continued {}", document_id, n + 2)]);
        }
    }

    let lines: Vec<Vec<&str>> = pages
        .iter()
        .map(|page| page.iter().map(String::as_str).collect())
        .collect();
    let refs: Vec<&[&str]> = lines.iter().map(Vec::as_slice).collect();
    build_pdf(&refs)
}

/// Same as [`build_pdf`], encrypted with the standard RC4 handler.
///
/// With `empty_password` the user password is empty and the file opens
/// without prompting; otherwise the stored user hash matches no password
/// a reader would try.
pub fn build_encrypted_pdf(pages: &[&[&str]], empty_password: bool) -> Vec<u8> {
    let mut doc = build_document(pages);

    let file_id = Object::string_literal(b"gstsplit-fixture".to_vec());
    doc.trailer.set("ID", vec![file_id.clone(), file_id]);

    let mut encrypt = dictionary! {
        "Filter" => "Standard",
        "V" => 2,
        "R" => 2,
        "Length" => 40,
        "O" => Object::string_literal(vec![0x5a_u8; 32]),
        "P" => -4,
        "CF" => dictionary! { "StdCF" => dictionary! { "CFM" => "V2" } },
    };
    // Without /U any password, the empty one included, passes the check
    if !empty_password {
        encrypt.set("U", Object::string_literal(vec![0_u8; 32]));
    }
    let encrypt_id = doc.add_object(encrypt);
    doc.trailer.set("Encrypt", encrypt_id);

    // RC4 is symmetric, so decrypting plaintext encrypts it
    let key = get_encryption_key(&doc, "", false).unwrap();
    for (&id, object) in doc.objects.iter_mut() {
        if id == encrypt_id {
            continue;
        }
        let Ok(encrypted) = decrypt_object(&key, id, &*object, false) else {
            continue;
        };
        match object {
            Object::Stream(stream) => stream.set_content(encrypted),
            Object::String(content, _) => *content = encrypted,
            _ => {}
        }
    }

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Marker page text as the extractor reports it.
pub fn marker_text(document_id: &str, gstin: &str) -> String {
    format!("Document No. : {}\nRecipient : GSTIN : {}\n", document_id, gstin)
}

fn build_document(pages: &[&[&str]]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for lines in pages {
        let mut operations = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 11.into()]));
            operations.push(Operation::new(
                "Td",
                vec![50.into(), (750 - 20 * i as i64).into()],
            ));
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages.len() as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// In-memory document: pages are plain strings and "assembled" output is the
/// page list rendered as text, e.g. `pages:1,2`.
#[derive(Default)]
pub struct FakePdf {
    pub pages: Vec<String>,
    pub fail_on_page: Option<u32>,
    pub assembled: RefCell<Vec<Vec<u32>>>,
}

impl FakePdf {
    pub fn new<S: Into<String>>(pages: impl IntoIterator<Item = S>) -> Self {
        Self {
            pages: pages.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

impl PdfProcessor for FakePdf {
    fn load(&mut self, _data: &[u8]) -> Result<()> {
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        if self.fail_on_page == Some(page) {
            return Err(PdfError::TextExtraction(format!("page {} unreadable", page)));
        }
        self.pages
            .get(page as usize)
            .cloned()
            .ok_or(PdfError::InvalidPage(page))
    }

    fn extract_pages(&self, pages: &[u32]) -> Result<Vec<u8>> {
        self.assembled.borrow_mut().push(pages.to_vec());
        let list: Vec<String> = pages.iter().map(|p| p.to_string()).collect();
        Ok(format!("pages:{}", list.join(",")).into_bytes())
    }
}
