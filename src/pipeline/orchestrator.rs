use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use super::analysis::narrate;
use super::extraction::{ExtractedData, Extractor};
use super::matching::compare;
use super::rasterize::PdfRasterizer;
use super::registry::{config_for_type, resolve_document_type, DocumentTypeConfig, RegistryError};
use super::types::{UserAssertedData, VerificationResult};
use super::verdict::decide;
use crate::models::{PipelineState, VerificationStatus};

/// Default upper bound on an uploaded PDF (20 MiB).
pub const DEFAULT_MAX_PDF_BYTES: usize = 20 * 1024 * 1024;

/// Leading bytes of every PDF file.
const PDF_MAGIC: &[u8] = b"%PDF-";

const FAKE_REASON: &str = "One or more fields did not match the data extracted from the document. \
    Please review the mismatches highlighted above.";

/// Input rejected before any rendering or network work.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please upload a PDF document")]
    MissingDocument,

    #[error("Please select a document type")]
    MissingDocumentType,

    #[error("Uploaded file is not a PDF")]
    NotAPdf,

    #[error("Uploaded file is {size} bytes, the limit is {max} bytes")]
    TooLarge { size: usize, max: usize },
}

/// Why a submission never reached the pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    UnsupportedDocumentType(#[from] RegistryError),
}

/// One verification request as the caller hands it over.
///
/// Fields are optional so that "no file" and "no type" are reported as
/// validation failures rather than being unrepresentable.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub document_type: Option<String>,
    pub pdf_bytes: Option<Vec<u8>>,
    pub asserted: UserAssertedData,
}

impl Submission {
    pub fn new(document_type: &str, pdf_bytes: Vec<u8>, asserted: UserAssertedData) -> Self {
        Self {
            document_type: Some(document_type.to_string()),
            pdf_bytes: Some(pdf_bytes),
            asserted,
        }
    }
}

/// Source of verification identifiers.
pub trait IdGenerator {
    fn next_id(&self) -> String;
}

/// Random v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic ids (`verification-1`, `verification-2`, ...) for tests.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("verification-{n}")
    }
}

/// The result of one run plus every state the run passed through.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub result: VerificationResult,
    pub transitions: Vec<PipelineState>,
}

impl PipelineRun {
    pub fn final_state(&self) -> PipelineState {
        self.transitions.last().copied().unwrap_or(PipelineState::Idle)
    }
}

/// Explicit state value carried through a single run.
struct StateTrace {
    transitions: Vec<PipelineState>,
}

impl StateTrace {
    fn new() -> Self {
        Self {
            transitions: vec![PipelineState::Idle],
        }
    }

    fn current(&self) -> PipelineState {
        self.transitions.last().copied().unwrap_or(PipelineState::Idle)
    }

    fn advance(&mut self, next: PipelineState) {
        let current = self.current();
        debug_assert!(
            current.can_transition_to(next),
            "illegal pipeline transition {current} -> {next}"
        );
        tracing::debug!(from = %current, to = %next, "Pipeline state change");
        self.transitions.push(next);
    }
}

/// Orchestrates one verification:
/// validate → rasterize → extract → compare → verdict → analysis → result
pub struct VerificationPipeline {
    rasterizer: PdfRasterizer,
    extractor: Box<dyn Extractor + Send + Sync>,
    ids: Box<dyn IdGenerator + Send + Sync>,
    max_pdf_bytes: usize,
}

impl VerificationPipeline {
    pub fn new(
        rasterizer: PdfRasterizer,
        extractor: Box<dyn Extractor + Send + Sync>,
        ids: Box<dyn IdGenerator + Send + Sync>,
    ) -> Self {
        Self {
            rasterizer,
            extractor,
            ids,
            max_pdf_bytes: DEFAULT_MAX_PDF_BYTES,
        }
    }

    pub fn with_max_pdf_bytes(mut self, max_pdf_bytes: usize) -> Self {
        self.max_pdf_bytes = max_pdf_bytes;
        self
    }

    pub fn max_pdf_bytes(&self) -> usize {
        self.max_pdf_bytes
    }

    /// Check a submission without doing any work on it.
    pub fn validate<'a>(
        &self,
        submission: &'a Submission,
    ) -> Result<(&'static DocumentTypeConfig, &'a [u8]), SubmissionError> {
        let pdf = submission
            .pdf_bytes
            .as_deref()
            .filter(|bytes| !bytes.is_empty())
            .ok_or(ValidationError::MissingDocument)?;
        let type_input = submission
            .document_type
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(ValidationError::MissingDocumentType)?;

        if pdf.len() > self.max_pdf_bytes {
            return Err(ValidationError::TooLarge {
                size: pdf.len(),
                max: self.max_pdf_bytes,
            }
            .into());
        }
        if !pdf.starts_with(PDF_MAGIC) {
            return Err(ValidationError::NotAPdf.into());
        }

        let document_type = resolve_document_type(type_input)?;
        Ok((config_for_type(document_type), pdf))
    }

    /// Run a submission and return only its result.
    pub fn verify(&self, submission: &Submission) -> Result<VerificationResult, SubmissionError> {
        self.run(submission).map(|run| run.result)
    }

    /// Run a submission end to end.
    ///
    /// Rendering failures only shorten the preview list. An extraction
    /// failure still produces a result, with `Error` status and no
    /// comparisons.
    pub fn run(&self, submission: &Submission) -> Result<PipelineRun, SubmissionError> {
        let (config, pdf) = self.validate(submission)?;
        let verification_id = self.ids.next_id();
        let _span = tracing::info_span!(
            "verify_document",
            verification_id = %verification_id,
            doc_type = %config.document_type
        )
        .entered();

        let mut trace = StateTrace::new();

        trace.advance(PipelineState::Rasterizing);
        let raster = self.rasterizer.render(pdf);
        let preview_images = dedupe_images(raster.images);

        trace.advance(PipelineState::Extracting);
        let result = match self.extractor.extract(pdf, config) {
            Ok(extracted) => {
                trace.advance(PipelineState::Comparing);
                log_summary_gap(raster.page_count, &extracted);

                let comparisons = compare(config, &submission.asserted, &extracted);
                let status = decide(&comparisons);
                let analysis_text = narrate(config.key(), &comparisons);
                let verdict_reason =
                    (status == VerificationStatus::Fake).then(|| FAKE_REASON.to_string());

                info!(
                    status = %status,
                    fields = comparisons.len(),
                    mismatches = comparisons.iter().filter(|c| !c.is_match()).count(),
                    previews = preview_images.len(),
                    "Verification complete"
                );
                trace.advance(PipelineState::Done);

                VerificationResult {
                    status,
                    comparisons,
                    verification_id,
                    preview_images,
                    page_summaries: extracted.page_summaries,
                    analysis_text,
                    document_type_key: config.document_type,
                    verdict_reason,
                    verified_at: Utc::now(),
                }
            }
            Err(e) => {
                warn!(error = %e, "Extraction failed, reporting error verdict");
                trace.advance(PipelineState::Error);

                VerificationResult {
                    status: VerificationStatus::Error,
                    comparisons: Vec::new(),
                    verification_id,
                    preview_images,
                    page_summaries: Vec::new(),
                    analysis_text: narrate(config.key(), &[]),
                    document_type_key: config.document_type,
                    verdict_reason: Some(e.client_message().to_string()),
                    verified_at: Utc::now(),
                }
            }
        };

        debug_assert!(trace.current().is_terminal());
        Ok(PipelineRun {
            result,
            transitions: trace.transitions,
        })
    }
}

/// Remove byte-identical previews, keeping first occurrences in order.
fn dedupe_images(images: Vec<Vec<u8>>) -> Vec<Vec<u8>> {
    let keep: Vec<bool> = {
        let mut seen: HashSet<&[u8]> = HashSet::with_capacity(images.len());
        images.iter().map(|image| seen.insert(image.as_slice())).collect()
    };
    images
        .into_iter()
        .zip(keep)
        .filter_map(|(image, first)| first.then_some(image))
        .collect()
}

/// Summaries are produced by the service and need not line up with pages.
fn log_summary_gap(page_count: Option<usize>, extracted: &ExtractedData) {
    if let Some(pages) = page_count {
        let summaries = extracted.page_summaries.len();
        if summaries != pages {
            warn!(pages, summaries, "Page summary count differs from page count");
        }
    }
}
