//! OCR through an external `tesseract` process.

use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use crate::convert::OcrEngine;
use crate::error::{Error, Result};
use crate::model::{RasterPage, Token};
use crate::ocr::PsmConfig;

/// Word-level rows in tesseract's TSV output.
const WORD_LEVEL: u32 = 5;

/// Runs `tesseract <image> stdout ... tsv` once per configuration.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    binary: PathBuf,
}

impl TesseractCli {
    /// Use `tesseract` from `PATH`.
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
        }
    }

    /// Use a specific binary.
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    fn command_args(language: &str, config: &PsmConfig) -> Vec<String> {
        let mut args = vec![
            "--oem".to_string(),
            config.oem.to_string(),
            "--psm".to_string(),
            config.psm.to_string(),
            "-l".to_string(),
            language.to_string(),
        ];
        for (key, value) in &config.variables {
            args.push("-c".to_string());
            args.push(format!("{}={}", key, value));
        }
        args.push("tsv".to_string());
        args
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrEngine for TesseractCli {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(
        &self,
        image: &RasterPage,
        language: &str,
        config: &PsmConfig,
    ) -> Result<Vec<Token>> {
        let recognition_error = |detail: String| Error::Recognition {
            page: image.number,
            detail,
        };

        let mut file = tempfile::Builder::new()
            .prefix("docrecon-page-")
            .suffix(&format!(".{}", image.format.extension()))
            .tempfile()?;
        file.write_all(&image.data)?;
        file.flush()?;

        let output = Command::new(&self.binary)
            .arg(file.path())
            .arg("stdout")
            .args(Self::command_args(language, config))
            .output()
            .map_err(|e| recognition_error(format!("failed to invoke tesseract: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(recognition_error(format!(
                "tesseract ({}) exited with {}: {}",
                config.name,
                output.status,
                stderr.trim()
            )));
        }

        parse_tsv(&String::from_utf8_lossy(&output.stdout))
            .map_err(|e| recognition_error(e.to_string()))
    }
}

/// Parse tesseract TSV into word tokens.
///
/// Only word-level rows are kept. Rows without text are skipped; rows with a
/// negative confidence keep it, so the token filter rejects them.
pub fn parse_tsv(tsv: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();

    for (line_no, line) in tsv.lines().enumerate() {
        if line.trim().is_empty() || line.starts_with("level") {
            continue;
        }
        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() < 11 {
            return Err(Error::Other(format!(
                "tsv line {}: expected at least 11 columns, found {}",
                line_no + 1,
                cols.len()
            )));
        }

        let level: u32 = parse_col(cols[0], "level", line_no)?;
        if level != WORD_LEVEL {
            continue;
        }
        let text = cols.get(11).copied().unwrap_or("");
        if text.trim().is_empty() {
            continue;
        }

        tokens.push(Token::new(
            text,
            parse_col(cols[6], "left", line_no)?,
            parse_col(cols[7], "top", line_no)?,
            parse_col(cols[8], "width", line_no)?,
            parse_col(cols[9], "height", line_no)?,
            parse_col(cols[10], "conf", line_no)?,
        ));
    }

    Ok(tokens)
}

fn parse_col<T: std::str::FromStr>(value: &str, name: &str, line_no: usize) -> Result<T> {
    value.trim().parse().map_err(|_| {
        Error::Other(format!(
            "tsv line {}: invalid {} '{}'",
            line_no + 1,
            name,
            value
        ))
    })
}
