// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — attaches stamp content streams to existing pages, registers
// the fonts and images they use, and serialises the document once every page
// has been processed.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pdfstamp_core::StampLayer;
use pdfstamp_core::error::{Result, StampError};
use tracing::{debug, info, instrument, warn};

use super::fonts::{self, GlyphUse};
use super::images;
use super::reader::{self, PdfReader};
use crate::assets::{FontAsset, FontHandle, ImageAsset, StandardFont};

/// Everything one page's stamp needs: its operators and the resources they
/// reference by name.
#[derive(Debug, Clone, Default)]
pub struct PageStamp {
    pub operations: Vec<Operation>,
    pub fonts: BTreeMap<String, ObjectId>,
    pub xobjects: BTreeMap<String, ObjectId>,
}

enum FontProgram {
    Standard(StandardFont),
    Embedded {
        asset: Arc<FontAsset>,
        glyphs: BTreeMap<u16, GlyphUse>,
    },
}

struct FontEntry {
    name: String,
    id: ObjectId,
    program: FontProgram,
}

/// Owns the document being stamped.
///
/// Fonts and images are document-wide: each is written once and shared by
/// every page that uses it. Embedded fonts are finalised in
/// [`PdfWriter::finish`], after all text has been encoded, so their width
/// and ToUnicode tables cover exactly the glyphs used.
pub struct PdfWriter {
    document: Document,
    layer: StampLayer,
    fonts: BTreeMap<String, FontEntry>,
    images: BTreeMap<PathBuf, (String, ObjectId)>,
    /// Shared `q` / `Q` streams bracketing existing content in `over` mode.
    wrappers: Option<(ObjectId, ObjectId)>,
}

impl PdfWriter {
    pub fn new(document: Document, layer: StampLayer) -> Self {
        Self {
            document,
            layer,
            fonts: BTreeMap::new(),
            images: BTreeMap::new(),
            wrappers: None,
        }
    }

    pub fn from_reader(reader: PdfReader, layer: StampLayer) -> Self {
        Self::new(reader.into_document(), layer)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    // -- Resources ------------------------------------------------------------

    /// Resource name and object of `font`, registering it on first use.
    pub fn font_resource(&mut self, font: &FontHandle) -> (String, ObjectId) {
        let key = font.key();
        if let Some(entry) = self.fonts.get(&key) {
            return (entry.name.clone(), entry.id);
        }

        let name = format!("PdfStampF{}", self.fonts.len() + 1);
        let (id, program) = match font {
            FontHandle::Standard(standard) => {
                let id = self
                    .document
                    .add_object(fonts::standard_font_dictionary(*standard));
                (id, FontProgram::Standard(*standard))
            }
            FontHandle::Embedded(asset) => (
                // Written in `finish`, once the glyph set is known.
                self.document.new_object_id(),
                FontProgram::Embedded {
                    asset: Arc::clone(asset),
                    glyphs: BTreeMap::new(),
                },
            ),
        };
        debug!(font = font.name(), resource = %name, "font registered");
        self.fonts.insert(
            key,
            FontEntry {
                name: name.clone(),
                id,
                program,
            },
        );
        (name, id)
    }

    /// Encode `text` as a string operand for `font`.
    pub fn encode_text(&mut self, font: &FontHandle, text: &str) -> Result<Object> {
        self.font_resource(font);
        let entry = self
            .fonts
            .get_mut(&font.key())
            .ok_or_else(|| StampError::Font(format!("font {} was not registered", font.name())))?;
        match &mut entry.program {
            FontProgram::Standard(standard) => Ok(fonts::encode_standard(*standard, text)),
            FontProgram::Embedded { asset, glyphs } => {
                let asset = Arc::clone(asset);
                let face = asset.face()?;
                Ok(fonts::encode_identity(&asset, &face, text, glyphs))
            }
        }
    }

    /// Resource name and object of `image`, adding the XObject on first use.
    pub fn image_resource(&mut self, image: &ImageAsset) -> (String, ObjectId) {
        if let Some((name, id)) = self.images.get(image.path()) {
            return (name.clone(), *id);
        }
        let name = format!("PdfStampI{}", self.images.len() + 1);
        let id = images::add_image_xobject(&mut self.document, image);
        debug!(path = %image.path().display(), resource = %name, "image registered");
        self.images
            .insert(image.path().to_path_buf(), (name.clone(), id));
        (name, id)
    }

    // -- Pages ----------------------------------------------------------------

    /// Add `stamp` to the page `page_id`, layered according to the
    /// configured [`StampLayer`].
    #[instrument(skip(self, stamp), fields(operations = stamp.operations.len()))]
    pub fn attach(&mut self, page_id: ObjectId, stamp: PageStamp) -> Result<()> {
        let bytes = encode_operations(stamp.operations)?;
        let stamp_id = self.add_content_stream(bytes);

        let mut resources = reader::effective_resources(&self.document, page_id);
        merge_names(&self.document, &mut resources, b"Font", &stamp.fonts);
        merge_names(&self.document, &mut resources, b"XObject", &stamp.xobjects);

        let existing = reader::content_refs(&self.document, page_id);
        let mut contents = Vec::with_capacity(existing.len() + 3);
        match self.layer {
            StampLayer::Under => {
                contents.push(Object::Reference(stamp_id));
                contents.extend(existing);
            }
            StampLayer::Over => {
                if !existing.is_empty() {
                    let (save, restore) = self.wrappers();
                    contents.push(Object::Reference(save));
                    contents.extend(existing);
                    contents.push(Object::Reference(restore));
                }
                contents.push(Object::Reference(stamp_id));
            }
        }

        let page = self
            .document
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(|err| StampError::Pdf(format!("cannot update page {:?}: {}", page_id, err)))?;
        page.set("Resources", Object::Dictionary(resources));
        page.set("Contents", Object::Array(contents));
        Ok(())
    }

    fn add_content_stream(&mut self, bytes: Vec<u8>) -> ObjectId {
        let mut stream = Stream::new(Dictionary::new(), bytes);
        if let Err(err) = stream.compress() {
            warn!(%err, "content stream left uncompressed");
        }
        self.document.add_object(stream)
    }

    fn wrappers(&mut self) -> (ObjectId, ObjectId) {
        if let Some(ids) = self.wrappers {
            return ids;
        }
        let save = self.add_content_stream(b"q\n".to_vec());
        // Existing content may end without a separator.
        let restore = self.add_content_stream(b"\nQ\n".to_vec());
        self.wrappers = Some((save, restore));
        (save, restore)
    }

    // -- Output ---------------------------------------------------------------

    /// Write pending font programs and serialise the whole document.
    #[instrument(skip(self), fields(fonts = self.fonts.len(), images = self.images.len()))]
    pub fn finish(mut self) -> Result<Vec<u8>> {
        for entry in self.fonts.values() {
            if let FontProgram::Embedded { asset, glyphs } = &entry.program {
                fonts::write_type0(&mut self.document, entry.id, asset, glyphs);
            }
        }

        let mut output = Vec::new();
        self.document
            .save_to(&mut output)
            .map_err(|err| StampError::Pdf(format!("failed to serialise PDF: {}", err)))?;

        info!(output_bytes = output.len(), "Stamped PDF serialised");
        Ok(output)
    }
}

/// Serialise stamp operations as a content stream body. The body always ends
/// in a newline so it never runs into the stream that follows it.
pub(crate) fn encode_operations(operations: Vec<Operation>) -> Result<Vec<u8>> {
    let mut bytes = Content { operations }
        .encode()
        .map_err(|err| StampError::Pdf(format!("failed to encode stamp content: {}", err)))?;
    if bytes.last() != Some(&b'\n') {
        bytes.push(b'\n');
    }
    Ok(bytes)
}

/// Add `names` to the `key` subdictionary of `resources`, resolving a
/// referenced subdictionary into an owned copy first.
fn merge_names(
    document: &Document,
    resources: &mut Dictionary,
    key: &[u8],
    names: &BTreeMap<String, ObjectId>,
) {
    if names.is_empty() {
        return;
    }
    let mut sub = resources
        .get(key)
        .ok()
        .map(|object| reader::resolve(document, object))
        .and_then(|object| object.as_dict().ok())
        .cloned()
        .unwrap_or_else(Dictionary::new);
    for (name, id) in names {
        sub.set(name.as_bytes().to_vec(), Object::Reference(*id));
    }
    resources.set(key.to_vec(), Object::Dictionary(sub));
}
