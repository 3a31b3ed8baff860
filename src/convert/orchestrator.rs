//! Three-tier fallback: native text, then OCR, then whole-page images.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;

use super::{ConvertOptions, DocumentWriter, OcrEngine, Rasterizer, RecordStore, TextLayerReader};
use crate::error::{Error, PageError, PageStage, Result};
use crate::model::{ConversionMethod, ConversionRecord, OutputPage, RasterPage};
use crate::ocr::{reconstruct_page, select_best_recognition, SuppressionState};
use crate::text::{
    merge_missing, split_title_body, structured_name, ExtractabilityClassifier, FieldExtractor,
    TextNormalizer,
};

/// Upper bound on `_<n>` suffixes tried for a structured name.
const MAX_NAME_SUFFIX: usize = 1000;

/// Orchestrator states. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Nothing attempted yet
    Init,
    /// Native text layer
    TryNative,
    /// OCR reconstruction
    TryOcr,
    /// Whole-page images
    TryImageOnly,
    /// A tier succeeded
    Done(ConversionMethod),
    /// Every tier failed, or the source could not be rendered
    Failed,
}

impl Stage {
    /// The tier tried after this one fails softly.
    fn fallback(self) -> Stage {
        match self {
            Stage::Init => Stage::TryNative,
            Stage::TryNative => Stage::TryOcr,
            Stage::TryOcr => Stage::TryImageOnly,
            Stage::TryImageOnly | Stage::Done(_) | Stage::Failed => Stage::Failed,
        }
    }
}

/// What a successful tier reports.
struct TierReport {
    method: ConversionMethod,
    pages_total: usize,
    pages_converted: usize,
    page_errors: Vec<PageError>,
}

/// Typed result of one tier.
enum TierOutcome {
    /// Output written
    Success(TierReport),
    /// Try the next tier
    SoftFailure(Error),
    /// Abort the conversion
    FatalFailure(Error),
}

impl TierOutcome {
    /// Failure outcome for `error`, fatal or soft per [`Error::is_fatal`].
    fn failure(error: Error) -> Self {
        if error.is_fatal() {
            TierOutcome::FatalFailure(error)
        } else {
            TierOutcome::SoftFailure(error)
        }
    }
}

/// Result of converting one document.
#[derive(Debug)]
pub struct Conversion {
    /// Provenance record, also handed to the record store
    pub record: ConversionRecord,
    /// Id assigned by the record store, if it succeeded
    pub record_id: Option<u64>,
    /// States visited, in order
    pub stages: Vec<Stage>,
    /// Error behind a failed conversion
    pub error: Option<Error>,
}

impl Conversion {
    /// Whether a tier succeeded.
    pub fn is_success(&self) -> bool {
        self.record.success
    }

    /// Final state.
    pub fn final_stage(&self) -> Stage {
        self.stages.last().copied().unwrap_or(Stage::Init)
    }

    /// Convert into a `Result`, surfacing the failure diagnostic.
    pub fn into_result(self) -> Result<ConversionRecord> {
        if self.record.success {
            return Ok(self.record);
        }
        Err(self.error.unwrap_or_else(|| Error::AllTiersFailed {
            diagnostic: self.record.diagnostic.unwrap_or_default(),
        }))
    }
}

/// Drives the tier state machine for one document at a time.
///
/// Holds no per-document state, so one orchestrator can convert many
/// documents concurrently.
pub struct Orchestrator {
    rasterizer: Arc<dyn Rasterizer>,
    ocr: Arc<dyn OcrEngine>,
    text_layer: Arc<dyn TextLayerReader>,
    writer: Arc<dyn DocumentWriter>,
    store: Option<Arc<dyn RecordStore>>,
    options: ConvertOptions,
    normalizer: TextNormalizer,
    fields: FieldExtractor,
    classifier: ExtractabilityClassifier,
}

impl Orchestrator {
    /// Create an orchestrator. Fails only if a built-in rule table does not
    /// compile.
    pub fn new(
        rasterizer: Arc<dyn Rasterizer>,
        ocr: Arc<dyn OcrEngine>,
        text_layer: Arc<dyn TextLayerReader>,
        writer: Arc<dyn DocumentWriter>,
        options: ConvertOptions,
    ) -> Result<Self> {
        Ok(Self {
            normalizer: TextNormalizer::new(options.normalize.clone())?,
            fields: FieldExtractor::new()?,
            classifier: ExtractabilityClassifier::new(),
            rasterizer,
            ocr,
            text_layer,
            writer,
            store: None,
            options,
        })
    }

    /// Persist every record to `store`.
    pub fn with_record_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the extractability classifier.
    pub fn with_classifier(mut self, classifier: ExtractabilityClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Get the options.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert `source`, writing the artifact to `output`.
    ///
    /// The artifact may end up renamed after extracted fields; the record
    /// holds the final path. On failure no artifact is left at `output`.
    pub fn convert(&self, source: &Path, output: &Path) -> Conversion {
        let start = Instant::now();
        let mut stages = vec![Stage::Init];
        let mut fields = BTreeMap::new();
        let mut diagnostic = None;
        let mut fatal = None;
        let mut report = None;

        log::info!("converting {}", source.display());
        discard_artifact(output);

        let mut stage = Stage::Init.fallback();
        loop {
            stages.push(stage);
            let outcome = match stage {
                Stage::TryNative => self.try_native(source, output, &mut fields),
                Stage::TryOcr => self.try_ocr(source, output, &mut fields),
                Stage::TryImageOnly => self.try_image(source, output),
                Stage::Init | Stage::Done(_) | Stage::Failed => break,
            };

            stage = match outcome {
                TierOutcome::Success(tier) => {
                    log::info!("{:?} succeeded for {}", stage, source.display());
                    let done = Stage::Done(tier.method);
                    report = Some(tier);
                    done
                }
                TierOutcome::SoftFailure(e) => {
                    log::info!("{:?} failed for {}: {}", stage, source.display(), e);
                    discard_artifact(output);
                    diagnostic = Some(e.to_string());
                    stage.fallback()
                }
                TierOutcome::FatalFailure(e) => {
                    log::warn!("{:?} aborted {}: {}", stage, source.display(), e);
                    discard_artifact(output);
                    diagnostic = Some(e.to_string());
                    fatal = Some(e);
                    Stage::Failed
                }
            };
        }

        let elapsed = start.elapsed().as_millis() as u64;
        let (record, error) = match report {
            Some(tier) => {
                let final_output = self.finalize_output(output, &fields);
                let record = ConversionRecord::succeeded(
                    tier.method,
                    source.to_path_buf(),
                    final_output,
                    fields,
                    tier.pages_total,
                    tier.pages_converted,
                    tier.page_errors,
                    elapsed,
                );
                (record, None)
            }
            None => {
                discard_artifact(output);
                let diagnostic = diagnostic.unwrap_or_else(|| "no tier attempted".to_string());
                let error = fatal.unwrap_or_else(|| Error::AllTiersFailed {
                    diagnostic: diagnostic.clone(),
                });
                let record = ConversionRecord::failed(source.to_path_buf(), diagnostic, elapsed);
                (record, Some(error))
            }
        };

        let record_id = self.persist(&record);
        Conversion {
            record,
            record_id,
            stages,
            error,
        }
    }

    /// Convert independent documents, in parallel when enabled.
    pub fn convert_batch(&self, jobs: &[(PathBuf, PathBuf)]) -> Vec<Conversion> {
        if self.options.parallel {
            jobs.par_iter()
                .map(|(source, output)| self.convert(source, output))
                .collect()
        } else {
            jobs.iter()
                .map(|(source, output)| self.convert(source, output))
                .collect()
        }
    }

    fn try_native(
        &self,
        source: &Path,
        output: &Path,
        fields: &mut BTreeMap<String, String>,
    ) -> TierOutcome {
        let layer = match self.text_layer.open(source) {
            Ok(layer) => layer,
            Err(e) => return TierOutcome::failure(e),
        };

        let verdict = self.classifier.classify(layer.as_ref());
        if !verdict.extractable {
            return TierOutcome::SoftFailure(Error::TextLayer(format!(
                "text layer not extractable (avg {:.0} chars, {:.0}% meaningful pages)",
                verdict.avg_text_length,
                verdict.meaningful_page_ratio * 100.0
            )));
        }

        let total = layer.page_count();
        let mut seen = HashSet::new();
        let mut pages = Vec::new();
        let mut page_errors = Vec::new();

        for index in 0..total {
            let number = index as u32 + 1;
            let raw = match layer.page_text(index) {
                Ok(raw) => raw,
                Err(e) => {
                    log::warn!("page {}: text layer read failed: {}", number, e);
                    page_errors.push(PageError::new(number, PageStage::TextLayer, e.to_string()));
                    continue;
                }
            };
            if raw.trim().is_empty() {
                log::debug!("page {}: empty", number);
                continue;
            }

            let key = raw.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
            if seen.contains(&key) {
                log::debug!("page {}: duplicate of an earlier page", number);
                continue;
            }

            merge_missing(fields, self.fields.extract(&raw));

            let cleaned = match self.normalizer.try_normalize(&raw) {
                Ok(cleaned) => cleaned,
                Err(e) => {
                    log::debug!("page {}: {}", number, e);
                    page_errors.push(PageError::new(number, PageStage::Normalize, e.to_string()));
                    continue;
                }
            };
            seen.insert(key);

            if let Some((title, body)) = split_title_body(&cleaned) {
                pages.push(OutputPage::Text {
                    number,
                    title,
                    body,
                });
            }
        }

        if pages.is_empty() {
            return TierOutcome::SoftFailure(Error::NormalizationEmpty);
        }

        if let Err(e) = self.writer.write(&pages, self.options.destination, output) {
            return TierOutcome::SoftFailure(e);
        }

        TierOutcome::Success(TierReport {
            method: ConversionMethod::Native,
            pages_total: total,
            pages_converted: pages.len(),
            page_errors,
        })
    }

    fn try_ocr(
        &self,
        source: &Path,
        output: &Path,
        fields: &mut BTreeMap<String, String>,
    ) -> TierOutcome {
        let images = match self.render(source, self.options.quality.ocr_dpi()) {
            Ok(images) => images,
            Err(e) => return TierOutcome::failure(e),
        };
        if images.is_empty() {
            return TierOutcome::SoftFailure(Error::Other("rasterizer returned no pages".into()));
        }

        let ocr = &self.options.ocr;
        let dest = self.options.destination;
        let mut state = SuppressionState::new();
        let mut pages = Vec::with_capacity(images.len());
        let mut page_errors = Vec::new();
        let mut converted = 0;

        for image in &images {
            let number = image.number;
            let recognized = select_best_recognition(number, ocr, |config| {
                self.ocr
                    .recognize(image, config.language_or(&ocr.language_hint), config)
            });

            let regions = match recognized {
                Ok(tokens) => reconstruct_page(&tokens, image.size(), dest, ocr, &mut state),
                Err(e) => {
                    log::warn!("page {}: {}", number, e);
                    page_errors.push(PageError::new(number, PageStage::Recognition, e.to_string()));
                    Vec::new()
                }
            };

            let page = OutputPage::Regions { number, regions };
            if page.has_content() {
                converted += 1;
                merge_missing(fields, self.fields.extract(&page.plain_text()));
            } else if !page_errors.iter().any(|pe| pe.page == number) {
                page_errors.push(PageError::new(
                    number,
                    PageStage::Layout,
                    "no legible regions",
                ));
            }
            pages.push(page);
        }

        if converted == 0 {
            return TierOutcome::SoftFailure(Error::Other(format!(
                "OCR produced no text on {} pages",
                images.len()
            )));
        }

        if let Err(e) = self.writer.write(&pages, dest, output) {
            return TierOutcome::SoftFailure(e);
        }

        TierOutcome::Success(TierReport {
            method: ConversionMethod::Ocr,
            pages_total: images.len(),
            pages_converted: converted,
            page_errors,
        })
    }

    fn try_image(&self, source: &Path, output: &Path) -> TierOutcome {
        let images = match self.render(source, self.options.quality.image_dpi()) {
            Ok(images) => images,
            Err(e) => return TierOutcome::failure(e),
        };
        if images.is_empty() {
            return TierOutcome::SoftFailure(Error::Other("rasterizer returned no pages".into()));
        }

        let total = images.len();
        let pages: Vec<OutputPage> = images
            .into_iter()
            .map(|image| OutputPage::Image { image })
            .collect();
        let converted = pages.iter().filter(|p| p.has_content()).count();

        if let Err(e) = self.writer.write(&pages, self.options.destination, output) {
            return TierOutcome::SoftFailure(e);
        }

        TierOutcome::Success(TierReport {
            method: ConversionMethod::Image,
            pages_total: total,
            pages_converted: converted,
            page_errors: Vec::new(),
        })
    }

    /// Render once at `dpi`, then once more at the fallback DPI.
    ///
    /// Every error returned here is an [`Error::Render`].
    fn render(&self, source: &Path, dpi: u32) -> Result<Vec<RasterPage>> {
        let format = self.options.image_format;
        match self.rasterizer.render(source, dpi, format) {
            Ok(pages) => Ok(pages),
            Err(first) => {
                let retry_dpi = self.options.fallback_dpi;
                log::warn!(
                    "{}: render at {} dpi failed ({}), retrying at {} dpi",
                    self.rasterizer.name(),
                    dpi,
                    first,
                    retry_dpi
                );
                self.rasterizer
                    .render(source, retry_dpi, format)
                    .map_err(|e| match e {
                        Error::Render { .. } => e,
                        other => Error::Render {
                            path: source.to_path_buf(),
                            detail: other.to_string(),
                        },
                    })
            }
        }
    }

    /// Rename the artifact after extracted fields when enabled.
    fn finalize_output(&self, output: &Path, fields: &BTreeMap<String, String>) -> PathBuf {
        if !self.options.rename_by_fields {
            return output.to_path_buf();
        }
        let extension = output
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_else(|| self.writer.extension());
        let Some(name) = structured_name(fields, extension) else {
            return output.to_path_buf();
        };

        let target = output.with_file_name(&name);
        if target == output {
            return target;
        }
        let Some(target) = claim_unused(&target) else {
            log::warn!("no free name for {}, keeping {}", name, output.display());
            return output.to_path_buf();
        };
        match fs::rename(output, &target) {
            Ok(()) => {
                log::info!("renamed output to {}", target.display());
                target
            }
            Err(e) => {
                log::warn!("could not rename {}: {}", output.display(), e);
                discard_artifact(&target);
                output.to_path_buf()
            }
        }
    }

    fn persist(&self, record: &ConversionRecord) -> Option<u64> {
        let store = self.store.as_ref()?;
        match store.save_record(record) {
            Ok(id) => Some(id),
            Err(e) => {
                log::warn!("conversion record not saved: {}", e);
                None
            }
        }
    }
}

/// Atomically reserve `target`, or `<stem>_<n>.<ext>` when it is taken.
///
/// The reserved file is empty; the caller renames the artifact over it.
fn claim_unused(target: &Path) -> Option<PathBuf> {
    let stem = target.file_stem()?.to_string_lossy().into_owned();
    let extension = target.extension().map(|e| e.to_string_lossy().into_owned());

    for n in 1..=MAX_NAME_SUFFIX {
        let candidate = if n == 1 {
            target.to_path_buf()
        } else {
            let name = match &extension {
                Some(ext) => format!("{}_{}.{}", stem, n, ext),
                None => format!("{}_{}", stem, n),
            };
            target.with_file_name(name)
        };
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(_) => return Some(candidate),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => {
                log::warn!("could not reserve {}: {}", candidate.display(), e);
                return None;
            }
        }
    }
    None
}

/// Remove a (possibly partial) artifact; a missing file is fine.
fn discard_artifact(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => log::debug!("removed {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("could not remove {}: {}", path.display(), e),
    }
}
