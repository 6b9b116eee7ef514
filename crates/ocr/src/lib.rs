pub mod amounts;
pub mod hash;
pub mod image_redact;
pub mod pii;
pub mod pipeline;
pub mod preprocess;
pub mod recognizer;
pub mod redact;
pub mod shock;
pub mod source;
pub mod types;

pub use amounts::AmountExtractor;
pub use hash::content_hash;
pub use image_redact::ImageRedactor;
pub use pii::PiiDetector;
pub use pipeline::{
    BatchCoordinator, BatchOutcome, BillProcessor, PipelineError, StoryAggregate, TEXT_SEPARATOR,
};
pub use preprocess::PreprocessError;
pub use recognizer::{MockRecognizer, OcrBackend, OcrError, RecognitionAdapter};
pub use redact::TextRedactor;
pub use shock::ShockTier;
pub use source::{FetchError, ImageFetcher};
pub use types::{
    BoundingBox, FailureKind, ImageFailure, ProcessedImage, ProcessingResult, RawDocument,
    RecognizedWord, RedactedImage, StoryRecord,
};
