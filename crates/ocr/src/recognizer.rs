use billshield_core::RecognitionConfig;
use image::DynamicImage;
use thiserror::Error;

use crate::preprocess;
use crate::types::{BoundingBox, RecognizedWord};

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("Tesseract not available; build with `tesseract` feature")]
    NotAvailable,
}

/// Abstraction over an OCR backend.
/// Implementations accept PNG image bytes.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError>;

    fn recognize_words(&self, image_bytes: &[u8]) -> Result<Vec<RecognizedWord>, OcrError>;

    /// Checks that the engine can actually run on this machine.
    fn probe(&self) -> Result<(), OcrError> {
        Ok(())
    }
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns preset text and words regardless of the image.
#[derive(Debug, Clone, Default)]
pub struct MockRecognizer {
    pub text: String,
    pub words: Vec<RecognizedWord>,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), words: Vec::new() }
    }

    pub fn with_words(mut self, words: Vec<RecognizedWord>) -> Self {
        self.words = words;
        self
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
        Ok(self.text.clone())
    }

    fn recognize_words(&self, _image_bytes: &[u8]) -> Result<Vec<RecognizedWord>, OcrError> {
        Ok(self.words.clone())
    }
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ─────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{parse_tsv_words, OcrBackend, OcrError};
    use crate::types::RecognizedWord;
    use leptess::{LepTess, Variable};

    /// Single uniform block of text; bills are mostly columnar lines.
    const PAGE_SEG_MODE: &str = "6";

    pub struct TesseractRecognizer {
        data_path: Option<String>,
        lang: String,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<String>, lang: &str) -> Self {
            Self { data_path, lang: lang.to_string() }
        }

        fn engine(&self, image_bytes: &[u8]) -> Result<LepTess, OcrError> {
            let mut lt = LepTess::new(self.data_path.as_deref(), &self.lang)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            lt.set_variable(Variable::TesseditPagesegMode, PAGE_SEG_MODE)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            lt.set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            Ok(lt)
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
            let mut lt = self.engine(image_bytes)?;
            lt.get_utf8_text().map_err(|e| OcrError::Engine(e.to_string()))
        }

        fn recognize_words(&self, image_bytes: &[u8]) -> Result<Vec<RecognizedWord>, OcrError> {
            let mut lt = self.engine(image_bytes)?;
            let tsv = lt.get_tsv_text(0).map_err(|e| OcrError::Engine(e.to_string()))?;
            Ok(parse_tsv_words(&tsv))
        }

        fn probe(&self) -> Result<(), OcrError> {
            LepTess::new(self.data_path.as_deref(), &self.lang)
                .map(|_| ())
                .map_err(|e| OcrError::Engine(e.to_string()))
        }
    }
}

/// Tesseract TSV word level.
const TSV_WORD_LEVEL: &str = "5";

/// Parse Tesseract TSV output into word boxes, skipping header, non-word rows
/// and blank tokens.
pub fn parse_tsv_words(tsv: &str) -> Vec<RecognizedWord> {
    tsv.lines()
        .filter_map(|line| {
            let cols: Vec<&str> = line.split('\t').collect();
            if cols.len() < 12 || cols[0] != TSV_WORD_LEVEL {
                return None;
            }
            let text = cols[11].trim();
            if text.is_empty() {
                return None;
            }
            let left: u32 = cols[6].parse().ok()?;
            let top: u32 = cols[7].parse().ok()?;
            let width: u32 = cols[8].parse().ok()?;
            let height: u32 = cols[9].parse().ok()?;
            let confidence: f32 = cols[10].parse().unwrap_or(-1.0);
            Some(RecognizedWord::new(
                text,
                BoundingBox::new(left, top, width, height),
                confidence,
            ))
        })
        .collect()
}

// ── Adapter ───────────────────────────────────────────────────────────────────

/// Recognition as seen by the rest of the pipeline.
///
/// An adapter without a backend is the "unavailable" state: both extraction
/// calls return empty results, as they do on any engine fault.
pub struct RecognitionAdapter {
    backend: Option<Box<dyn OcrBackend>>,
    contrast_factor: f32,
    max_dimension: u32,
}

impl RecognitionAdapter {
    pub fn new(backend: impl OcrBackend + 'static, config: &RecognitionConfig) -> Self {
        Self {
            backend: Some(Box::new(backend)),
            contrast_factor: config.contrast_factor,
            max_dimension: config.max_dimension,
        }
    }

    pub fn unavailable() -> Self {
        let defaults = RecognitionConfig::default();
        Self {
            backend: None,
            contrast_factor: defaults.contrast_factor,
            max_dimension: defaults.max_dimension,
        }
    }

    /// Use Tesseract when it is compiled in and initializes; otherwise
    /// return the unavailable adapter.
    pub fn detect(config: &RecognitionConfig) -> Self {
        #[cfg(feature = "tesseract")]
        {
            let backend = tesseract_backend::TesseractRecognizer::new(
                config.data_path.clone(),
                &config.language,
            );
            match backend.probe() {
                Ok(()) => return Self::new(backend, config),
                Err(e) => tracing::warn!("Tesseract unavailable, running without OCR: {e}"),
            }
        }
        #[cfg(not(feature = "tesseract"))]
        tracing::warn!(
            "{}; language '{}' ignored, running without OCR",
            OcrError::NotAvailable,
            config.language
        );
        Self::unavailable()
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    pub fn extract_text(&self, image: &DynamicImage) -> String {
        let Some(backend) = &self.backend else {
            return String::new();
        };
        let result = preprocess::prepare_for_text(image, self.contrast_factor, self.max_dimension)
            .map_err(|e| OcrError::ImageDecode(e.to_string()))
            .and_then(|png| backend.recognize(&png));
        match result {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("OCR error: {e}");
                String::new()
            }
        }
    }

    pub fn extract_words(&self, image: &DynamicImage) -> Vec<RecognizedWord> {
        let Some(backend) = &self.backend else {
            return Vec::new();
        };
        let result = preprocess::prepare_for_words(image, self.contrast_factor)
            .map_err(|e| OcrError::ImageDecode(e.to_string()))
            .and_then(|png| backend.recognize_words(&png));
        match result {
            Ok(words) => words.into_iter().filter(|w| !w.text.trim().is_empty()).collect(),
            Err(e) => {
                tracing::warn!("OCR with boxes error: {e}");
                Vec::new()
            }
        }
    }
}
