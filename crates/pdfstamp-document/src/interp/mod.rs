// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stamping interpreter — partitions a command script by page, preloads its
// resources, then replays each page's queue onto that page.

pub mod coords;
pub mod executor;
pub mod pages;
pub mod preload;
pub mod shapes;
pub mod state;
pub mod surface;

use std::path::Path;

use pdfstamp_core::error::{Result, StampError};
use pdfstamp_core::{Command, StampConfig};
use tracing::{info, instrument};

pub use coords::{Corner, PageBox};
pub use executor::{PageContext, PageExecutor};
pub use pages::{PageQueues, PageSelection};
pub use preload::ResourceCache;
pub use state::{RenderState, TextOverlay};
pub use surface::{DrawingSurface, Paint};

use crate::assets::{AssetLoader, FsLoader};
use crate::pdf::{PageCanvas, PdfReader, PdfWriter};

/// Runs stamping scripts against documents.
#[derive(Debug, Clone, Default)]
pub struct Stamper {
    config: StampConfig,
}

impl Stamper {
    pub fn new(config: StampConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StampConfig {
        &self.config
    }

    /// Stamp the PDF in `source` and return the new document.
    ///
    /// `pathname` is the input path as the user gave it; it only feeds the
    /// `{pathname}` and `{filename}` text templates. Nothing is produced
    /// unless every page succeeds.
    #[instrument(skip(self, commands, source, loader), fields(commands = commands.len(), input_bytes = source.len()))]
    pub fn stamp(
        &self,
        commands: &[Command],
        source: &[u8],
        pathname: &str,
        loader: &dyn AssetLoader,
    ) -> Result<Vec<u8>> {
        let reader = PdfReader::from_bytes(source)?;
        let page_count = reader.page_count();

        // Pass 1: page queues and resources.
        let queues = PageQueues::partition(commands, page_count)?;
        let cache = ResourceCache::preload(commands, loader, self.config.default_font.as_deref())?;

        let mut targets = Vec::new();
        for (page_number, queue) in queues.non_empty() {
            let number = u32::try_from(page_number)
                .map_err(|_| StampError::PageRange(format!("page {page_number} out of range")))?;
            let (width, height) = reader.page_size(number)?;
            targets.push((page_number, queue, reader.page_id(number)?, PageBox::new(width, height)));
        }
        info!(pages = page_count, stamped = targets.len(), "Pass 1 complete");

        // Pass 2: draw.
        let mut writer = PdfWriter::from_reader(reader, self.config.layer);
        for (page_number, queue, page_id, page) in targets {
            let mut canvas = PageCanvas::new(&mut writer);
            let context = PageContext {
                page_number,
                page_count,
                page,
                pathname,
            };
            PageExecutor::new(&mut canvas, &cache, context, &self.config.defaults)?.run(queue)?;
            let stamp = canvas.finish();
            writer.attach(page_id, stamp)?;
        }

        writer.finish()
    }

    /// Stamp `input` into `output` using assets from the filesystem.
    pub fn stamp_file(
        &self,
        commands: &[Command],
        input: &Path,
        output: &Path,
        pathname: &str,
    ) -> Result<()> {
        let source = std::fs::read(input).map_err(|err| StampError::resource(input, err))?;
        let stamped = self.stamp(commands, &source, pathname, &FsLoader)?;
        std::fs::write(output, &stamped)?;
        info!(output = %output.display(), bytes = stamped.len(), "Stamped PDF written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::reader::tests::fixture_pdf;
    use lopdf::content::Content;
    use lopdf::{Document, Object};
    use pdfstamp_core::Grammar;
    use super::preload::tests::CountingLoader;
    use printpdf::Mm;

    fn script(args: &[&str]) -> Vec<Command> {
        Grammar::stamp().parse(args).unwrap().commands
    }

    /// Operations of the last content stream of `page_number`, which is
    /// the stamp under the default layering.
    fn stamp_operations(pdf: &[u8], page_number: u32) -> Vec<(String, Vec<f64>)> {
        let document = Document::load_mem(pdf).unwrap();
        let page_id = document.get_pages()[&page_number];
        let stream_id = *document.get_page_contents(page_id).last().unwrap();
        let stream = document.get_object(stream_id).unwrap().as_stream().unwrap();
        let bytes = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        Content::decode(&bytes)
            .unwrap()
            .operations
            .into_iter()
            .map(|op| {
                let operands = op
                    .operands
                    .iter()
                    .filter_map(|o| o.as_float().ok().map(f64::from))
                    .collect();
                (op.operator, operands)
            })
            .collect()
    }

    #[test]
    fn rectangle_lands_on_the_selected_page_only() {
        let source = fixture_pdf(2, Mm(100.0), Mm(100.0));
        let commands = script(&["-p", "2", "-re", "10:10:50:50", "-f", "in.pdf"]);
        let before = PdfReader::from_bytes(&source).unwrap().page_content(1).unwrap();

        let output = Stamper::default()
            .stamp(&commands, &source, "in.pdf", &CountingLoader::default())
            .unwrap();

        let ops = stamp_operations(&output, 2);
        let re = ops.iter().position(|(op, _)| op == "re").unwrap();
        assert_eq!(ops[re].1, [10.0, 10.0, 50.0, 50.0]);
        assert_eq!(ops[re + 1].0, "f");
        assert_eq!(ops.first().map(|(op, _)| op.as_str()), Some("q"));
        assert_eq!(ops.last().map(|(op, _)| op.as_str()), Some("Q"));

        let after = PdfReader::from_bytes(&output).unwrap().page_content(1).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn stamp_is_layered_over_the_page_content_by_default() {
        let source = fixture_pdf(1, Mm(100.0), Mm(100.0));
        let original = PdfReader::from_bytes(&source).unwrap().page_content(1).unwrap();
        let commands = script(&["-re", "0:0:50:50", "-f", "in.pdf"]);
        let output = Stamper::default()
            .stamp(&commands, &source, "in.pdf", &CountingLoader::default())
            .unwrap();

        let document = Document::load_mem(&output).unwrap();
        let page_id = document.get_pages()[&1];
        let content = document.get_page_content(page_id).unwrap();
        assert!(content.starts_with(b"q\n"));
        let stamp_at = content
            .windows(b"0 0 50 50 re".len())
            .position(|w| w == b"0 0 50 50 re")
            .unwrap();
        assert!(stamp_at > original.len());
        assert!(content.ends_with(b"Q\n"));
        assert!(Content::decode(&content).is_ok());
    }

    #[test]
    fn page_state_does_not_leak_between_pages() {
        let source = fixture_pdf(2, Mm(100.0), Mm(100.0));
        let commands = script(&[
            "-p", "1", "-fc", "red", "-re", "0:0:10:10", "-f", "-p", "2", "-re", "0:0:10:10", "-f",
            "in.pdf",
        ]);
        let output = Stamper::default()
            .stamp(&commands, &source, "in.pdf", &CountingLoader::default())
            .unwrap();

        let fill_before_rectangle = |page| {
            let ops = stamp_operations(&output, page);
            let re = ops.iter().position(|(op, _)| op == "re").unwrap();
            ops[..re]
                .iter()
                .rev()
                .find(|(op, _)| op == "rg")
                .map(|(_, operands)| operands.clone())
                .unwrap()
        };
        assert_eq!(fill_before_rectangle(1), [1.0, 0.0, 0.0]);
        assert_eq!(fill_before_rectangle(2), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn reversed_range_fails_before_any_output() {
        let source = fixture_pdf(10, Mm(50.0), Mm(50.0));
        let commands = script(&["-p", "5-3", "-f", "in.pdf"]);
        let err = Stamper::default()
            .stamp(&commands, &source, "in.pdf", &CountingLoader::default())
            .unwrap_err();
        assert!(matches!(err, StampError::PageRange(_)));

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        let output = dir.path().join("out.pdf");
        std::fs::write(&input, &source).unwrap();
        assert!(
            Stamper::default()
                .stamp_file(&commands, &input, &output, "in.pdf")
                .is_err()
        );
        assert!(!output.exists());
    }

    #[test]
    fn shared_images_are_loaded_and_embedded_once() {
        let source = fixture_pdf(3, Mm(100.0), Mm(100.0));
        let commands = script(&[
            "-p", "1-2", "-i", "logo.png:10:10", "-p", "3", "-i", "logo.png:-0:-0:c=ur", "in.pdf",
        ]);
        let loader = CountingLoader::default();
        let output = Stamper::default()
            .stamp(&commands, &source, "in.pdf", &loader)
            .unwrap();
        assert_eq!(loader.image_loads.borrow()["logo.png"], 1);

        let document = Document::load_mem(&output).unwrap();
        let mut targets = Vec::new();
        for page_id in document.get_pages().values() {
            let resources = document
                .get_object(*page_id)
                .and_then(Object::as_dict)
                .and_then(|page| page.get(b"Resources"))
                .and_then(Object::as_dict)
                .and_then(|resources| resources.get(b"XObject"))
                .and_then(Object::as_dict)
                .unwrap();
            targets.push(resources.get(b"PdfStampI1").and_then(Object::as_reference).unwrap());
        }
        assert_eq!(targets.len(), 3);
        assert!(targets.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn text_is_shown_with_a_registered_font() {
        let source = fixture_pdf(1, Mm(100.0), Mm(100.0));
        let commands = script(&["-t", "Page {page} of {pages}:20:-20", "in.pdf"]);
        let output = Stamper::default()
            .stamp(&commands, &source, "in.pdf", &CountingLoader::default())
            .unwrap();

        let ops = stamp_operations(&output, 1);
        let operators: Vec<&str> = ops.iter().map(|(op, _)| op.as_str()).collect();
        let bt = operators.iter().position(|op| *op == "BT").unwrap();
        let et = operators.iter().position(|op| *op == "ET").unwrap();
        assert!(bt < et);
        assert!(operators[bt..et].contains(&"Tf"));
        assert!(operators[bt..et].contains(&"Tj"));
        let tm = operators.iter().position(|op| *op == "Tm").unwrap();
        assert_eq!(ops[tm].1[4], 20.0);
        assert!((ops[tm].1[5] - (283.46 - 20.0)).abs() < 0.5);
    }

    #[test]
    fn missing_resources_abort_the_run() {
        let source = fixture_pdf(1, Mm(100.0), Mm(100.0));
        let commands = script(&["-i", "missing.png:0:0", "in.pdf"]);
        let err = Stamper::default()
            .stamp(&commands, &source, "in.pdf", &CountingLoader::default())
            .unwrap_err();
        assert!(matches!(err, StampError::Resource { .. }));
    }
}
