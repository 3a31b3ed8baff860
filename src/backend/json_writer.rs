//! JSON layout description writer.

use std::fs;
use std::path::Path;

use serde_json::{json, Value};

use crate::convert::DocumentWriter;
use crate::error::{Error, Result};
use crate::model::{CanvasSize, OutputPage};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert reconstructed pages to a JSON layout description.
///
/// Image pages are referenced by number, size and byte length; the image
/// data itself is not inlined.
pub fn to_layout_json(pages: &[OutputPage], canvas: CanvasSize, format: JsonFormat) -> Result<String> {
    let entries = pages
        .iter()
        .map(|page| {
            let mut value = serde_json::to_value(page)?;
            if let (OutputPage::Image { image }, Value::Object(map)) = (page, &mut value) {
                map.insert("bytes".to_string(), json!(image.data.len()));
            }
            Ok(value)
        })
        .collect::<std::result::Result<Vec<Value>, serde_json::Error>>()?;

    let document = json!({
        "canvas": canvas,
        "page_count": pages.len(),
        "pages": entries,
    });

    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(&document),
        JsonFormat::Compact => serde_json::to_string(&document),
    };
    Ok(result?)
}

/// Writes [`to_layout_json`] output to disk.
#[derive(Debug, Clone, Default)]
pub struct JsonLayoutWriter {
    format: JsonFormat,
}

impl JsonLayoutWriter {
    /// Create a writer with the given format.
    pub fn new(format: JsonFormat) -> Self {
        Self { format }
    }

    /// Pretty-printed output.
    pub fn pretty() -> Self {
        Self::new(JsonFormat::Pretty)
    }

    /// Compact output.
    pub fn compact() -> Self {
        Self::new(JsonFormat::Compact)
    }
}

impl DocumentWriter for JsonLayoutWriter {
    fn extension(&self) -> &str {
        "json"
    }

    fn write(&self, pages: &[OutputPage], canvas: CanvasSize, output: &Path) -> Result<()> {
        let write_error = |detail: String| Error::Write {
            path: output.to_path_buf(),
            detail,
        };
        let json = to_layout_json(pages, canvas, self.format)?;
        fs::write(output, json).map_err(|e| write_error(e.to_string()))?;
        log::debug!("wrote {} pages to {}", pages.len(), output.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ImageFormat, PositionedRegion, RasterPage, Rect, RegionRole};

    fn pages() -> Vec<OutputPage> {
        vec![
            OutputPage::Text {
                number: 1,
                title: "회의 안내.".into(),
                body: vec!["일정은 월요일입니다.".into()],
            },
            OutputPage::Regions {
                number: 2,
                regions: vec![PositionedRegion {
                    text: "안내 문서".into(),
                    rect: Rect::new(10.0, 20.0, 100.0, 30.0),
                    role: RegionRole::Title,
                    font_size: 18,
                    bold: true,
                    confidence: 92.0,
                }],
            },
            OutputPage::Image {
                image: RasterPage::new(3, 850, 1100, vec![0; 42], ImageFormat::Png),
            },
        ]
    }

    #[test]
    fn test_layout_json_structure() {
        let json = to_layout_json(&pages(), CanvasSize::slide(), JsonFormat::Compact).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["page_count"], 3);
        assert_eq!(value["canvas"]["width"], 720.0);
        assert_eq!(value["pages"][0]["kind"], "text");
        assert_eq!(value["pages"][1]["regions"][0]["role"], "title");
        assert_eq!(value["pages"][1]["regions"][0]["x"], 10.0);
        assert_eq!(value["pages"][2]["kind"], "image");
        assert_eq!(value["pages"][2]["bytes"], 42);
        assert!(value["pages"][2].get("data").is_none());
    }

    #[test]
    fn test_pretty_vs_compact() {
        let pretty = to_layout_json(&pages(), CanvasSize::slide(), JsonFormat::Pretty).unwrap();
        let compact = to_layout_json(&pages(), CanvasSize::slide(), JsonFormat::Compact).unwrap();
        assert!(pretty.contains('\n'));
        assert!(!compact.contains('\n'));
    }

    #[test]
    fn test_writer_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        JsonLayoutWriter::compact()
            .write(&pages(), CanvasSize::slide(), &path)
            .unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("안내 문서"));
    }

    #[test]
    fn test_writer_reports_path_on_failure() {
        let path = Path::new("/nonexistent/dir/out.json");
        let err = JsonLayoutWriter::compact()
            .write(&pages(), CanvasSize::slide(), path)
            .unwrap_err();
        assert!(matches!(err, Error::Write { .. }));
    }
}
