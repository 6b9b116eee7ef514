use billshield_core::{Money, PiiCategory};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// Undecoded image bytes and where they came from.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub source: String,
    pub bytes: Vec<u8>,
}

impl RawDocument {
    pub fn new(source: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { source: source.into(), bytes }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Grows the box by `padding` on every side, clipped to `bounds` (w, h).
    pub fn expand_clipped(&self, padding: u32, bounds: (u32, u32)) -> BoundingBox {
        let x0 = self.x.saturating_sub(padding).min(bounds.0);
        let y0 = self.y.saturating_sub(padding).min(bounds.1);
        let x1 = self.x.saturating_add(self.width).saturating_add(padding).min(bounds.0);
        let y1 = self.y.saturating_add(self.height).saturating_add(padding).min(bounds.1);
        BoundingBox::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// One word reported by the recognition engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedWord {
    pub text: String,
    pub bbox: BoundingBox,
    /// Engine confidence, 0–100 for Tesseract.
    pub confidence: f32,
}

impl RecognizedWord {
    pub fn new(text: impl Into<String>, bbox: BoundingBox, confidence: f32) -> Self {
        Self { text: text.into(), bbox, confidence }
    }
}

/// The source image with sensitive regions occluded.
#[derive(Debug, Clone)]
pub struct RedactedImage {
    pub image: RgbImage,
    /// Padded, clipped regions that were occluded.
    pub regions: Vec<BoundingBox>,
}

impl RedactedImage {
    pub fn to_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut buf = Vec::new();
        self.image.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
        Ok(buf)
    }
}

/// Everything the pipeline derives from a single image.
///
/// Raw text and the redacted pixels are skipped during serialization so a
/// serialized result never carries a detected literal.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingResult {
    pub source: String,
    /// SHA-256 hex digest of the original image bytes.
    pub content_hash: String,
    #[serde(skip)]
    pub raw_text: String,
    pub redacted_text: String,
    /// Descending, deduplicated, strictly positive.
    pub amounts: Vec<Money>,
    pub shock_value: Money,
    pub pii_found: Vec<PiiCategory>,
    #[serde(skip)]
    pub redacted_image: Option<RedactedImage>,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Fetch,
    Decode,
}

/// A per-image fault recorded by the batch coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageFailure {
    pub source: String,
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedImage {
    pub source: String,
    pub summary: String,
    pub shock_value: Money,
    pub pii_found: Vec<PiiCategory>,
}

impl From<&ProcessingResult> for ProcessedImage {
    fn from(r: &ProcessingResult) -> Self {
        Self {
            source: r.source.clone(),
            summary: r.summary.clone(),
            shock_value: r.shock_value,
            pii_found: r.pii_found.clone(),
        }
    }
}

/// A story as exchanged with the storage layer. Only the `ocr_*`,
/// `processed_images` and (when unset) `cost_us` fields are written here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryRecord {
    pub id: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_us: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_amounts: Option<Vec<Money>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub processed_images: Vec<ProcessedImage>,
}
