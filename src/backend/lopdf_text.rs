//! Native text layer backed by `lopdf`.

use std::path::Path;

use lopdf::Document as LopdfDocument;

use crate::convert::{TextLayer, TextLayerReader};
use crate::error::{Error, Result};

/// A loaded PDF exposing per-page text.
pub struct LopdfTextLayer {
    doc: LopdfDocument,
    pages: Vec<u32>,
}

impl LopdfTextLayer {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let doc = LopdfDocument::load(path)?;
        Ok(Self::from_document(doc))
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data)?;
        Ok(Self::from_document(doc))
    }

    fn from_document(doc: LopdfDocument) -> Self {
        let pages = doc.get_pages().keys().copied().collect();
        Self { doc, pages }
    }

    /// Check if the document is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }
}

impl TextLayer for LopdfTextLayer {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> Result<String> {
        let number = *self.pages.get(index).ok_or_else(|| {
            Error::TextLayer(format!("page index {} out of range", index))
        })?;
        Ok(self.doc.extract_text(&[number])?)
    }
}

/// Opens PDFs with [`LopdfTextLayer`].
#[derive(Debug, Clone, Default)]
pub struct LopdfTextReader;

impl LopdfTextReader {
    /// Create a reader.
    pub fn new() -> Self {
        Self
    }
}

impl TextLayerReader for LopdfTextReader {
    fn open(&self, path: &Path) -> Result<Box<dyn TextLayer>> {
        let layer = LopdfTextLayer::load_file(path)?;
        if layer.is_encrypted() {
            return Err(Error::TextLayer("document is encrypted".into()));
        }
        log::debug!("lopdf: {} pages in {}", layer.page_count(), path.display());
        Ok(Box::new(layer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    fn hello_pdf() -> Vec<u8> {
        let mut doc = LopdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 48.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal("Hello World!")]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_reads_page_text() {
        let layer = LopdfTextLayer::load_bytes(&hello_pdf()).unwrap();
        assert_eq!(layer.page_count(), 1);
        assert!(layer.page_text(0).unwrap().contains("Hello World!"));
        assert!(layer.page_text(1).is_err());
    }

    #[test]
    fn test_garbage_is_text_layer_error() {
        let err = LopdfTextLayer::load_bytes(b"not a pdf").err().unwrap();
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_reader_missing_file() {
        let err = LopdfTextReader::new()
            .open(Path::new("/nonexistent/doc.pdf"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::Io(_) | Error::TextLayer(_)));
    }
}
