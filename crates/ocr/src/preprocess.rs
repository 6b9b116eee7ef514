use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to load image: {0}")]
    Load(#[from] image::ImageError),
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
}

/// Decode raw image bytes (JPEG / PNG / WEBP / …).
pub fn decode(data: &[u8]) -> Result<DynamicImage, PreprocessError> {
    Ok(image::load_from_memory(data)?)
}

/// Grayscale + contrast boost + downscale, encoded as PNG for the text pass.
pub fn prepare_for_text(
    img: &DynamicImage,
    contrast_factor: f32,
    max_dimension: u32,
) -> Result<Vec<u8>, PreprocessError> {
    let img = if img.width() > max_dimension || img.height() > max_dimension {
        img.resize(max_dimension, max_dimension, image::imageops::FilterType::Lanczos3)
    } else {
        img.clone()
    };
    encode_as_png(enhance(&img, contrast_factor))
}

/// Grayscale + contrast boost at the original size, so word boxes line up
/// with the source image.
pub fn prepare_for_words(
    img: &DynamicImage,
    contrast_factor: f32,
) -> Result<Vec<u8>, PreprocessError> {
    encode_as_png(enhance(img, contrast_factor))
}

/// Scale each pixel's distance from the mean luminance by `factor`.
fn enhance(img: &DynamicImage, factor: f32) -> DynamicImage {
    let gray: GrayImage = img.to_luma8();
    let count = u64::from(gray.width()) * u64::from(gray.height());
    if count == 0 {
        return DynamicImage::ImageLuma8(gray);
    }

    let sum: u64 = gray.pixels().map(|p| u64::from(p[0])).sum();
    let mean = (sum as f64 / count as f64) as f32;

    let boosted: GrayImage = ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        let p = gray.get_pixel(x, y)[0] as f32;
        let v = mean + (p - mean) * factor;
        Luma([v.round().clamp(0.0, 255.0) as u8])
    });

    DynamicImage::ImageLuma8(boosted)
}

fn encode_as_png(img: DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}
