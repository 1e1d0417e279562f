// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open an existing document with `lopdf` and answer the page
// questions the stamping interpreter asks: how many pages, which object is
// page N, and how large it is.

use lopdf::{Dictionary, Document, Object, ObjectId};
use pdfstamp_core::error::{Result, StampError};
use tracing::{debug, instrument, warn};

/// US Letter, used when a page tree carries no MediaBox at all.
const FALLBACK_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// Guard against malformed, cyclic `/Parent` chains.
const MAX_TREE_DEPTH: usize = 64;

/// Read-only view of an existing PDF.
pub struct PdfReader {
    document: Document,
}

impl PdfReader {
    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            StampError::Pdf(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self { document })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Object id of a page (1-indexed).
    pub fn page_id(&self, page_number: u32) -> Result<ObjectId> {
        let pages = self.document.get_pages();
        pages.get(&page_number).copied().ok_or_else(|| {
            StampError::Pdf(format!(
                "page {} not found (document has {} pages)",
                page_number,
                pages.len()
            ))
        })
    }

    /// Width and height of a page in points, from its effective MediaBox.
    pub fn page_size(&self, page_number: u32) -> Result<(f64, f64)> {
        let page_id = self.page_id(page_number)?;
        let [llx, lly, urx, ury] = media_box(&self.document, page_id).unwrap_or_else(|| {
            warn!(page_number, "page has no MediaBox, assuming US Letter");
            FALLBACK_MEDIA_BOX
        });
        Ok(((urx - llx).abs(), (ury - lly).abs()))
    }

    /// Decoded content of a page, concatenated across its content streams.
    pub fn page_content(&self, page_number: u32) -> Result<Vec<u8>> {
        let page_id = self.page_id(page_number)?;
        self.document.get_page_content(page_id).map_err(|err| {
            StampError::Pdf(format!("cannot read content of page {}: {}", page_number, err))
        })
    }

    /// Borrow the underlying document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Consume the reader, handing the document to a writer.
    pub fn into_document(self) -> Document {
        self.document
    }
}

// -- Page tree helpers --------------------------------------------------------

/// Follow a reference to the object it names; other objects pass through.
pub(crate) fn resolve<'a>(document: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => document.get_object(*id).unwrap_or(object),
        other => other,
    }
}

/// Look `key` up on a page, walking `/Parent` for inheritable attributes.
pub(crate) fn inherited<'a>(
    document: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current = document.get_object(page_id).ok()?.as_dict().ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = current.get(key) {
            return Some(resolve(document, value));
        }
        match current.get(b"Parent") {
            Ok(Object::Reference(parent)) => {
                current = document.get_object(*parent).ok()?.as_dict().ok()?;
            }
            _ => return None,
        }
    }
    None
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

fn media_box(document: &Document, page_id: ObjectId) -> Option<[f64; 4]> {
    let array = inherited(document, page_id, b"MediaBox")?.as_array().ok()?;
    if array.len() != 4 {
        return None;
    }
    let mut out = [0.0; 4];
    for (slot, item) in out.iter_mut().zip(array) {
        *slot = number(resolve(document, item))?;
    }
    Some(out)
}

/// Owned copy of the page's effective `/Resources`, with a referenced
/// dictionary resolved.
pub(crate) fn effective_resources(document: &Document, page_id: ObjectId) -> Dictionary {
    inherited(document, page_id, b"Resources")
        .and_then(|object| object.as_dict().ok())
        .cloned()
        .unwrap_or_else(Dictionary::new)
}

/// The page's content stream references, in drawing order.
pub(crate) fn content_refs(document: &Document, page_id: ObjectId) -> Vec<Object> {
    let Some(page) = document
        .get_object(page_id)
        .ok()
        .and_then(|object| object.as_dict().ok())
    else {
        return Vec::new();
    };
    match page.get(b"Contents") {
        Ok(Object::Array(items)) => items.clone(),
        Ok(reference @ Object::Reference(_)) => match resolve(document, reference) {
            Object::Array(items) => items.clone(),
            _ => vec![reference.clone()],
        },
        _ => Vec::new(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::dictionary;
    use printpdf::{
        BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt,
        TextItem,
    };

    /// A small PDF with one line of Helvetica text on each page.
    pub(crate) fn fixture_pdf(pages: usize, width: Mm, height: Mm) -> Vec<u8> {
        let mut doc = PdfDocument::new("pdfstamp fixture");
        let pages = (1..=pages)
            .map(|number| {
                let ops = vec![
                    Op::StartTextSection,
                    Op::SetTextCursor {
                        pos: Point {
                            x: Pt(72.0),
                            y: Pt(72.0),
                        },
                    },
                    Op::SetFontSizeBuiltinFont {
                        size: Pt(12.0),
                        font: BuiltinFont::Helvetica,
                    },
                    Op::WriteTextBuiltinFont {
                        items: vec![TextItem::Text(format!("Page {number}"))],
                        font: BuiltinFont::Helvetica,
                    },
                    Op::EndTextSection,
                ];
                PdfPage::new(width, height, ops)
            })
            .collect();
        doc.with_pages(pages);
        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        doc.save(&PdfSaveOptions::default(), &mut warnings)
    }

    #[test]
    fn counts_pages_and_reads_sizes() {
        let bytes = fixture_pdf(3, Mm(210.0), Mm(297.0));
        let reader = PdfReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.page_count(), 3);

        let (width, height) = reader.page_size(2).unwrap();
        assert!((width - 595.3).abs() < 1.0, "width {width}");
        assert!((height - 841.9).abs() < 1.0, "height {height}");
    }

    #[test]
    fn missing_pages_are_reported() {
        let bytes = fixture_pdf(1, Mm(100.0), Mm(100.0));
        let reader = PdfReader::from_bytes(&bytes).unwrap();
        assert!(reader.page_id(1).is_ok());
        assert!(matches!(reader.page_id(2), Err(StampError::Pdf(_))));
    }

    #[test]
    fn garbage_is_not_a_pdf() {
        assert!(PdfReader::from_bytes(b"%PDF-nothing here").is_err());
    }

    #[test]
    fn media_box_is_inherited_from_the_page_tree() {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        let page_id = document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(300),
                    Object::Real(400.5),
                ],
            }),
        );

        let [_, _, urx, ury] = media_box(&document, page_id).unwrap();
        assert_eq!(urx, 300.0);
        assert_eq!(ury, 400.5);
    }
}
