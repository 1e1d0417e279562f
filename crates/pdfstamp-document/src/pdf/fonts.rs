// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Font objects — standard Type 1 dictionaries with WinAnsi text encoding,
// and Type0/Identity-H composite fonts for embedded TrueType/OpenType
// programs.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use tracing::{debug, warn};

use crate::assets::{FontAsset, StandardFont};

/// Glyph usage recorded while encoding text with an embedded font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphUse {
    pub ch: char,
    pub width: u32,
}

/// Simple font dictionary for one of the standard fonts.
pub fn standard_font_dictionary(font: StandardFont) -> Dictionary {
    let mut dict = dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_font(),
    };
    if font.uses_win_ansi() {
        dict.set("Encoding", "WinAnsiEncoding");
    }
    dict
}

/// Encode `text` for a standard font. Characters outside WinAnsi become `?`.
pub fn encode_standard(font: StandardFont, text: &str) -> Object {
    let mut missing = 0usize;
    let bytes: Vec<u8> = text
        .chars()
        .map(|ch| {
            let code = if font.uses_win_ansi() {
                win_ansi_code(ch)
            } else {
                u8::try_from(u32::from(ch)).ok()
            };
            code.unwrap_or_else(|| {
                missing += 1;
                b'?'
            })
        })
        .collect();
    if missing > 0 {
        warn!(font = %font, missing, "characters not representable in standard font");
    }
    Object::String(bytes, StringFormat::Literal)
}

/// Encode `text` as two-byte glyph ids, recording each glyph in `used`.
pub fn encode_identity(
    asset: &FontAsset,
    face: &ttf_parser::Face<'_>,
    text: &str,
    used: &mut BTreeMap<u16, GlyphUse>,
) -> Object {
    let mut bytes = Vec::with_capacity(text.len() * 2);
    let mut missing = 0usize;
    for ch in text.chars() {
        let (glyph, width) = asset.glyph(face, ch);
        if glyph == 0 {
            missing += 1;
        }
        used.entry(glyph).or_insert(GlyphUse { ch, width });
        bytes.extend_from_slice(&glyph.to_be_bytes());
    }
    if missing > 0 {
        warn!(font = asset.postscript_name(), missing, "glyphs missing from font");
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Write the composite font for `asset` under the reserved `font_id`.
pub fn write_type0(
    document: &mut Document,
    font_id: ObjectId,
    asset: &FontAsset,
    used: &BTreeMap<u16, GlyphUse>,
) {
    let name = asset.postscript_name();
    let metrics = asset.metrics();
    let cff = asset.has_cff_outlines();

    let mut program = if cff {
        Stream::new(dictionary! { "Subtype" => "OpenType" }, asset.data().to_vec())
    } else {
        Stream::new(
            dictionary! { "Length1" => asset.data().len() as i64 },
            asset.data().to_vec(),
        )
    };
    if let Err(err) = program.compress() {
        warn!(%err, "font program left uncompressed");
    }
    let program_id = document.add_object(program);

    let mut flags = 32i64;
    if metrics.fixed_pitch {
        flags |= 1;
    }
    let program_key = if cff { "FontFile3" } else { "FontFile2" };
    let descriptor = dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => Object::Name(name.as_bytes().to_vec()),
        "Flags" => flags,
        "FontBBox" => metrics.bbox.iter().map(|&v| Object::Integer(i64::from(v))).collect::<Vec<_>>(),
        "ItalicAngle" => metrics.italic_angle,
        "Ascent" => i64::from(metrics.ascent),
        "Descent" => i64::from(metrics.descent),
        "CapHeight" => i64::from(metrics.cap_height),
        "StemV" => 80,
        program_key => program_id,
    };
    let descriptor_id = document.add_object(descriptor);

    let widths: Vec<Object> = used
        .iter()
        .flat_map(|(glyph, usage)| {
            [
                Object::Integer(i64::from(*glyph)),
                Object::Array(vec![Object::Integer(i64::from(usage.width))]),
            ]
        })
        .collect();

    let subtype = if cff { "CIDFontType0" } else { "CIDFontType2" };
    let mut descendant = dictionary! {
        "Type" => "Font",
        "Subtype" => subtype,
        "BaseFont" => Object::Name(name.as_bytes().to_vec()),
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0,
        },
        "FontDescriptor" => descriptor_id,
        "W" => widths,
    };
    if !cff {
        descendant.set("CIDToGIDMap", "Identity");
    }
    let descendant_id = document.add_object(descendant);

    let mut cmap = Stream::new(Dictionary::new(), to_unicode_cmap(used).into_bytes());
    if let Err(err) = cmap.compress() {
        warn!(%err, "ToUnicode CMap left uncompressed");
    }
    let cmap_id = document.add_object(cmap);

    let type0 = dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => Object::Name(name.as_bytes().to_vec()),
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![Object::Reference(descendant_id)],
        "ToUnicode" => cmap_id,
    };
    document.objects.insert(font_id, Object::Dictionary(type0));
    debug!(font = name, glyphs = used.len(), "composite font written");
}

/// ToUnicode CMap mapping each used glyph back to its character.
pub fn to_unicode_cmap(used: &BTreeMap<u16, GlyphUse>) -> String {
    let mut out = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (Identity) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
    );

    let entries: Vec<(&u16, &GlyphUse)> = used.iter().filter(|(glyph, _)| **glyph != 0).collect();
    for chunk in entries.chunks(100) {
        out.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for (glyph, usage) in chunk {
            let mut units = [0u16; 2];
            let hex: String = usage
                .ch
                .encode_utf16(&mut units)
                .iter()
                .map(|unit| format!("{unit:04X}"))
                .collect();
            out.push_str(&format!("<{glyph:04X}> <{hex}>\n"));
        }
        out.push_str("endbfchar\n");
    }

    out.push_str(
        "endcmap\n\
         CMapName currentdict /CMap defineresource pop\n\
         end\nend\n",
    );
    out
}

/// WinAnsiEncoding code for `ch`, if it has one.
pub fn win_ansi_code(ch: char) -> Option<u8> {
    let code = u32::from(ch);
    match code {
        0x20..=0x7E | 0xA0..=0xFF => u8::try_from(code).ok(),
        _ => {
            let byte = match ch {
                '€' => 0x80,
                '‚' => 0x82,
                'ƒ' => 0x83,
                '„' => 0x84,
                '…' => 0x85,
                '†' => 0x86,
                '‡' => 0x87,
                'ˆ' => 0x88,
                '‰' => 0x89,
                'Š' => 0x8A,
                '‹' => 0x8B,
                'Œ' => 0x8C,
                'Ž' => 0x8E,
                '‘' => 0x91,
                '’' => 0x92,
                '“' => 0x93,
                '”' => 0x94,
                '•' => 0x95,
                '–' => 0x96,
                '—' => 0x97,
                '˜' => 0x98,
                '™' => 0x99,
                'š' => 0x9A,
                '›' => 0x9B,
                'œ' => 0x9C,
                'ž' => 0x9E,
                'Ÿ' => 0x9F,
                _ => return None,
            };
            Some(byte)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_ansi_covers_latin1_and_typographic_quotes() {
        assert_eq!(win_ansi_code('A'), Some(b'A'));
        assert_eq!(win_ansi_code('é'), Some(0xE9));
        assert_eq!(win_ansi_code('€'), Some(0x80));
        assert_eq!(win_ansi_code('“'), Some(0x93));
        assert_eq!(win_ansi_code('ж'), None);
        assert_eq!(win_ansi_code('\u{81}'), None);
    }

    #[test]
    fn standard_text_replaces_unencodable_characters() {
        let encoded = encode_standard(StandardFont::Helvetica, "Cost: 5€ ж");
        assert_eq!(
            encoded,
            Object::String(b"Cost: 5\x80 ?".to_vec(), StringFormat::Literal)
        );
    }

    #[test]
    fn standard_dictionary_omits_encoding_for_symbol_fonts() {
        let helvetica = standard_font_dictionary(StandardFont::Helvetica);
        assert!(helvetica.has(b"Encoding"));
        let symbol = standard_font_dictionary(StandardFont::Symbol);
        assert!(!symbol.has(b"Encoding"));
    }

    #[test]
    fn cmap_lists_glyphs_in_chunks_and_skips_notdef() {
        let mut used = BTreeMap::new();
        used.insert(0, GlyphUse { ch: '?', width: 0 });
        for glyph in 1..=150u16 {
            used.insert(glyph, GlyphUse { ch: 'a', width: 500 });
        }
        used.insert(151, GlyphUse { ch: '😀', width: 1000 });

        let cmap = to_unicode_cmap(&used);
        assert!(cmap.contains("100 beginbfchar"));
        assert!(cmap.contains("51 beginbfchar"));
        assert!(cmap.contains("<0001> <0061>"));
        assert!(cmap.contains("<0097> <D83DDE00>"));
        assert!(!cmap.contains("<0000> <003F>"));
    }
}
