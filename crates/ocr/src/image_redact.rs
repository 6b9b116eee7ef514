use std::collections::HashSet;

use billshield_core::{PiiFindings, RedactionConfig};
use image::{imageops, DynamicImage, Rgb, RgbImage};

use crate::pii::PiiDetector;
use crate::types::{BoundingBox, RecognizedWord, RedactedImage};

const FILL: Rgb<u8> = Rgb([0, 0, 0]);

/// Occludes word regions that look sensitive.
pub struct ImageRedactor {
    padding: u32,
    blur_sigma: f32,
    min_digit_run: usize,
}

impl ImageRedactor {
    pub fn new(config: &RedactionConfig) -> Self {
        Self {
            padding: config.padding,
            blur_sigma: config.blur_sigma,
            min_digit_run: config.min_digit_run,
        }
    }

    /// `None` when there are no word boxes to work from.
    ///
    /// A word is occluded when it is one of the tokens of a literal in
    /// `findings`, when it matches a PII pattern on its own, or when it is a
    /// long digit run.
    pub fn redact(
        &self,
        image: &DynamicImage,
        words: &[RecognizedWord],
        findings: &PiiFindings,
        detector: &PiiDetector,
    ) -> Option<RedactedImage> {
        if words.is_empty() {
            return None;
        }

        let tokens = finding_tokens(findings);
        let mut canvas = image.to_rgb8();
        let bounds = canvas.dimensions();
        let mut regions = Vec::new();

        for word in words.iter().filter(|w| self.is_sensitive(&w.text, &tokens, detector)) {
            let region = word.bbox.expand_clipped(self.padding, bounds);
            if region.is_empty() {
                continue;
            }
            self.occlude(&mut canvas, region);
            regions.push(region);
        }

        tracing::debug!(words = words.len(), regions = regions.len(), "image redaction");
        Some(RedactedImage { image: canvas, regions })
    }

    fn is_sensitive(&self, text: &str, tokens: &HashSet<String>, detector: &PiiDetector) -> bool {
        let core = word_core(text);
        (!core.is_empty() && tokens.contains(&core.to_lowercase()))
            || detector.matches_any(text)
            || self.is_digit_run(core)
    }

    /// Unlabeled identifiers: a run of digits at least `min_digit_run` long.
    fn is_digit_run(&self, core: &str) -> bool {
        core.len() >= self.min_digit_run && core.chars().all(|c| c.is_ascii_digit())
    }

    /// Blur the region, then paint it opaque; blur alone can be reversed.
    fn occlude(&self, canvas: &mut RgbImage, region: BoundingBox) {
        let patch = imageops::crop_imm(&*canvas, region.x, region.y, region.width, region.height)
            .to_image();
        let blurred = imageops::blur(&patch, self.blur_sigma);
        imageops::replace(canvas, &blurred, i64::from(region.x), i64::from(region.y));

        for y in region.y..region.y + region.height {
            for x in region.x..region.x + region.width {
                canvas.put_pixel(x, y, FILL);
            }
        }
    }
}

/// Strips punctuation the engine glued on (`#12345678`, `(555)`, `Smith,`).
fn word_core(text: &str) -> &str {
    text.trim_matches(|c: char| !c.is_ascii_alphanumeric())
}

/// Lowercased whitespace-separated pieces of every finding literal, so a
/// multi-word match (`John Smith`, `(555) 123-4567`) maps onto single words.
fn finding_tokens(findings: &PiiFindings) -> HashSet<String> {
    findings
        .iter()
        .flat_map(|(_, literals)| literals.iter())
        .flat_map(|literal| literal.split_whitespace())
        .map(word_core)
        .filter(|core| !core.is_empty())
        .map(str::to_lowercase)
        .collect()
}

impl Default for ImageRedactor {
    fn default() -> Self {
        Self::new(&RedactionConfig::default())
    }
}
