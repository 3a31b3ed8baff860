//! Page rasterization through an external `pdftoppm` process.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::Command;

use image::ImageReader;

use crate::convert::Rasterizer;
use crate::error::{Error, Result};
use crate::model::{ImageFormat, RasterPage};

/// Renders every page with `pdftoppm` into a scratch directory.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    binary: PathBuf,
}

impl PdftoppmRasterizer {
    /// Use `pdftoppm` from `PATH`.
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("pdftoppm"),
        }
    }

    /// Use a specific binary.
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer for PdftoppmRasterizer {
    fn name(&self) -> &str {
        "pdftoppm"
    }

    fn render(&self, path: &Path, dpi: u32, format: ImageFormat) -> Result<Vec<RasterPage>> {
        let render_error = |detail: String| Error::Render {
            path: path.to_path_buf(),
            detail,
        };

        let scratch = tempfile::tempdir()?;
        let prefix = scratch.path().join("page");
        let format_flag = match format {
            ImageFormat::Png => "-png",
            ImageFormat::Jpeg => "-jpeg",
        };

        let output = Command::new(&self.binary)
            .arg(format_flag)
            .arg("-r")
            .arg(dpi.to_string())
            .arg(path)
            .arg(&prefix)
            .output()
            .map_err(|e| render_error(format!("failed to invoke pdftoppm: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(render_error(format!(
                "pdftoppm exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let mut files: Vec<(u32, PathBuf)> = fs::read_dir(scratch.path())?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter_map(|file| page_number(&file).map(|n| (n, file)))
            .collect();
        files.sort_by_key(|(number, _)| *number);

        let mut pages = Vec::with_capacity(files.len());
        for (number, file) in files {
            let data = fs::read(&file)?;
            let (width, height) = image_size(&data).ok_or_else(|| {
                render_error(format!("page {}: unreadable image header", number))
            })?;
            pages.push(RasterPage::new(number, width, height, data, format));
        }

        log::debug!(
            "pdftoppm: {} pages at {} dpi from {}",
            pages.len(),
            dpi,
            path.display()
        );
        Ok(pages)
    }
}

/// Page number from a `page-<n>.<ext>` file name.
fn page_number(file: &Path) -> Option<u32> {
    let stem = file.file_stem()?.to_str()?;
    let (_, number) = stem.rsplit_once('-')?;
    number.parse().ok()
}

/// Pixel size read from the encoded image.
pub fn image_size(data: &[u8]) -> Option<(u32, u32)> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(width: u32, height: u32, format: image::ImageFormat) -> Vec<u8> {
        let mut data = Cursor::new(Vec::new());
        image::RgbImage::new(width, height)
            .write_to(&mut data, format)
            .unwrap();
        data.into_inner()
    }

    #[test]
    fn test_png_size() {
        let data = encoded(170, 220, image::ImageFormat::Png);
        assert_eq!(image_size(&data), Some((170, 220)));
        assert_eq!(image_size(&data[..10]), None);
    }

    #[test]
    fn test_jpeg_size() {
        let data = encoded(200, 300, image::ImageFormat::Jpeg);
        assert_eq!(image_size(&data), Some((200, 300)));
        assert_eq!(image_size(&[0x00]), None);
    }

    #[test]
    fn test_page_number_from_file_name() {
        assert_eq!(page_number(Path::new("/tmp/x/page-1.png")), Some(1));
        assert_eq!(page_number(Path::new("/tmp/x/page-012.png")), Some(12));
        assert_eq!(page_number(Path::new("/tmp/x/other.png")), None);
    }

    #[test]
    fn test_missing_binary_is_render_error() {
        let rasterizer = PdftoppmRasterizer::new().with_binary("/nonexistent/pdftoppm");
        let err = rasterizer
            .render(Path::new("missing.pdf"), 200, ImageFormat::Png)
            .unwrap_err();
        assert!(err.is_fatal());
    }
}
