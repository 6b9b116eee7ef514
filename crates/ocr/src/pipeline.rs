use billshield_core::{Money, PipelineConfig};
use thiserror::Error;

use crate::amounts::AmountExtractor;
use crate::hash;
use crate::image_redact::ImageRedactor;
use crate::pii::PiiDetector;
use crate::preprocess::{self, PreprocessError};
use crate::recognizer::RecognitionAdapter;
use crate::redact::TextRedactor;
use crate::shock;
use crate::source::{FetchError, ImageFetcher};
use crate::types::{
    FailureKind, ImageFailure, ProcessedImage, ProcessingResult, RawDocument, StoryRecord,
};

/// Separator between per-image texts in a story's merged OCR text.
pub const TEXT_SEPARATOR: &str = "\n\n---\n\n";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Image fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("Image decode failed: {0}")]
    Decode(#[from] PreprocessError),
}

impl PipelineError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PipelineError::Fetch(_) => FailureKind::Fetch,
            PipelineError::Decode(_) => FailureKind::Decode,
        }
    }
}

/// Runs recognition → detection → extraction → redaction → classification
/// for one image. Holds no per-call state.
pub struct BillProcessor {
    recognizer: RecognitionAdapter,
    detector: PiiDetector,
    image_redactor: ImageRedactor,
}

impl BillProcessor {
    pub fn new(recognizer: RecognitionAdapter, config: &PipelineConfig) -> Self {
        Self {
            recognizer,
            detector: PiiDetector::new(),
            image_redactor: ImageRedactor::new(&config.redaction),
        }
    }

    pub fn ocr_available(&self) -> bool {
        self.recognizer.is_available()
    }

    pub fn process_document(&self, doc: &RawDocument) -> Result<ProcessingResult, PipelineError> {
        let image = preprocess::decode(&doc.bytes)?;

        let raw_text = self.recognizer.extract_text(&image);
        let findings = self.detector.detect(&raw_text);
        let amounts = AmountExtractor::extract(&raw_text);
        let redacted_text = TextRedactor::new(&self.detector).redact(&raw_text, &findings);

        let words = self.recognizer.extract_words(&image);
        let redacted_image =
            self.image_redactor.redact(&image, &words, &findings, &self.detector);

        let result = ProcessingResult {
            source: doc.source.clone(),
            content_hash: hash::content_hash(&doc.bytes),
            raw_text,
            redacted_text,
            shock_value: shock::shock_value(&amounts),
            summary: shock::summarize(&amounts, &findings),
            pii_found: findings.categories(),
            amounts,
            redacted_image,
        };

        tracing::debug!(
            source = %result.source,
            amounts = result.amounts.len(),
            pii = ?result.pii_found,
            words = words.len(),
            "processed image"
        );
        Ok(result)
    }
}

// ── Batch ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub results: Vec<ProcessingResult>,
    pub failures: Vec<ImageFailure>,
}

/// Merged view over every processed image of one story.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoryAggregate {
    pub ocr_text: String,
    /// Descending, deduplicated union of per-image amounts.
    pub ocr_amounts: Vec<Money>,
    /// Representative cost; `None` when the story already had one or no
    /// amount was found.
    pub cost_us: Option<Money>,
    pub processed_images: Vec<ProcessedImage>,
    pub failures: Vec<ImageFailure>,
}

impl StoryAggregate {
    pub fn from_outcome(outcome: BatchOutcome, existing_cost: Option<Money>) -> Self {
        let mut ocr_amounts: Vec<Money> =
            outcome.results.iter().flat_map(|r| r.amounts.iter().copied()).collect();
        ocr_amounts.sort_unstable_by(|a, b| b.cmp(a));
        ocr_amounts.dedup();

        let ocr_text = outcome
            .results
            .iter()
            .map(|r| r.redacted_text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(TEXT_SEPARATOR);

        let cost_unset = existing_cost.map_or(true, Money::is_zero);
        let cost_us = if cost_unset { ocr_amounts.first().copied() } else { None };

        Self {
            ocr_text,
            ocr_amounts,
            cost_us,
            processed_images: outcome.results.iter().map(ProcessedImage::from).collect(),
            failures: outcome.failures,
        }
    }

    pub fn error_count(&self) -> usize {
        self.failures.len()
    }

    /// Write the OCR fields into `story`; `cost_us` only when it was unset.
    pub fn apply_to(&self, story: &mut StoryRecord) {
        story.ocr_text = Some(self.ocr_text.clone());
        story.ocr_amounts = Some(self.ocr_amounts.clone());
        story.processed_images = self.processed_images.clone();
        if let Some(cost) = self.cost_us {
            story.cost_us = Some(cost);
        }
    }
}

/// Fetches and processes every image of a record, tallying per-image faults
/// instead of aborting.
pub struct BatchCoordinator<'a> {
    processor: &'a BillProcessor,
    fetcher: &'a ImageFetcher,
}

impl<'a> BatchCoordinator<'a> {
    pub fn new(processor: &'a BillProcessor, fetcher: &'a ImageFetcher) -> Self {
        Self { processor, fetcher }
    }

    pub async fn process_one(&self, reference: &str) -> Result<ProcessingResult, PipelineError> {
        let doc = self.fetcher.fetch(reference).await?;
        self.processor.process_document(&doc)
    }

    pub async fn process_images(&self, references: &[String]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for reference in references {
            match self.process_one(reference).await {
                Ok(result) => outcome.results.push(result),
                Err(e) => {
                    tracing::warn!("Error processing image {reference}: {e}");
                    outcome.failures.push(ImageFailure {
                        source: reference.clone(),
                        kind: e.kind(),
                        message: e.to_string(),
                    });
                }
            }
        }
        outcome
    }

    /// Process all of `story.images` and write the aggregate back. A story
    /// without images is returned untouched with an empty aggregate.
    pub async fn process_story(&self, story: &mut StoryRecord) -> StoryAggregate {
        if story.images.is_empty() {
            return StoryAggregate::default();
        }

        let outcome = self.process_images(&story.images).await;
        let aggregate = StoryAggregate::from_outcome(outcome, story.cost_us);
        aggregate.apply_to(story);

        tracing::info!(
            story = %story.id,
            images = story.images.len(),
            errors = aggregate.error_count(),
            amounts = aggregate.ocr_amounts.len(),
            "story OCR complete"
        );
        aggregate
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
