use std::path::{Path, PathBuf};

use anyhow::Context;
use billshield_ocr::{BatchCoordinator, ProcessingResult, StoryRecord};

/// Longest slice of redacted text echoed to the terminal.
const TEXT_PREVIEW_CHARS: usize = 2000;

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// Process one image and print a report.
    Image { source: String, output: Option<PathBuf> },
    /// Process every image of a story record and print the updated record.
    Story { path: PathBuf },
}

impl Command {
    /// `None` for anything that is not exactly one of the two usage forms.
    pub fn parse(args: &[String]) -> Option<Self> {
        match args {
            [flag, ..] if flag == "--story" => match args {
                [_, path] => Some(Command::Story { path: PathBuf::from(path) }),
                _ => None,
            },
            [source] => Some(Command::Image { source: source.clone(), output: None }),
            [source, output] => Some(Command::Image {
                source: source.clone(),
                output: Some(PathBuf::from(output)),
            }),
            _ => None,
        }
    }
}

pub async fn run_image(
    batch: &BatchCoordinator<'_>,
    source: &str,
    output: Option<&Path>,
) -> anyhow::Result<String> {
    let result = batch
        .process_one(source)
        .await
        .with_context(|| format!("processing {source}"))?;

    if let Some(path) = output {
        match &result.redacted_image {
            Some(redacted) => {
                let png = redacted.to_png().context("encoding redacted image")?;
                tokio::fs::write(path, png)
                    .await
                    .with_context(|| format!("writing {}", path.display()))?;
                tracing::info!("Redacted image written: {}", path.display());
            }
            None => tracing::warn!("No word boxes recognized; redacted image not written"),
        }
    }

    Ok(render_report(&result))
}

pub async fn run_story(batch: &BatchCoordinator<'_>, path: &Path) -> anyhow::Result<String> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let mut story: StoryRecord =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;

    let aggregate = batch.process_story(&mut story).await;
    for failure in &aggregate.failures {
        tracing::warn!("{}: {}", failure.source, failure.message);
    }

    let mut json = serde_json::to_string_pretty(&story)?;
    json.push('\n');
    Ok(json)
}

pub fn render_report(result: &ProcessingResult) -> String {
    let rule = "=".repeat(60);
    let thin = "-".repeat(60);
    let amounts: Vec<String> = result.amounts.iter().map(|m| m.to_grouped_string(2)).collect();
    let categories: Vec<&str> = result.pii_found.iter().map(|c| c.as_str()).collect();

    let shock = if result.shock_value.is_zero() {
        "No amounts found".to_string()
    } else {
        format!("Shock value: {}", result.shock_value.to_grouped_string(2))
    };
    let text = if result.redacted_text.is_empty() {
        "No text extracted".to_string()
    } else {
        result.redacted_text.chars().take(TEXT_PREVIEW_CHARS).collect()
    };

    format!(
        "\n{rule}\nOCR + REDACTION RESULTS\n{rule}\n\
         \nAmounts found: [{amounts}]\n\
         {shock}\n\
         PII types found: [{categories}]\n\
         \nSummary: {summary}\n\
         \n{thin}\nREDACTED TEXT:\n{thin}\n\
         {text}\n",
        amounts = amounts.join(", "),
        categories = categories.join(", "),
        summary = result.summary,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use billshield_core::{Money, PiiCategory, PipelineConfig};
    use billshield_ocr::{BillProcessor, ImageFetcher, MockRecognizer, RecognitionAdapter};
    use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
    use std::io::Cursor;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn tiny_png() -> Vec<u8> {
        let img: GrayImage = ImageBuffer::from_fn(16, 16, |_, _| Luma([230u8]));
        let mut buf = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    fn processor(text: &str) -> BillProcessor {
        let cfg = PipelineConfig::default();
        let recognizer = RecognitionAdapter::new(MockRecognizer::new(text), &cfg.recognition);
        BillProcessor::new(recognizer, &cfg)
    }

    #[test]
    fn parse_requires_an_argument() {
        assert_eq!(Command::parse(&[]), None);
        assert_eq!(Command::parse(&args(&["--story"])), None);
    }

    #[test]
    fn parse_image_forms() {
        assert_eq!(
            Command::parse(&args(&["bill.jpg"])),
            Some(Command::Image { source: "bill.jpg".into(), output: None })
        );
        assert_eq!(
            Command::parse(&args(&["https://x/bill.jpg", "out.png"])),
            Some(Command::Image {
                source: "https://x/bill.jpg".into(),
                output: Some(PathBuf::from("out.png")),
            })
        );
    }

    #[test]
    fn parse_story_form() {
        assert_eq!(
            Command::parse(&args(&["--story", "s.json"])),
            Some(Command::Story { path: PathBuf::from("s.json") })
        );
    }

    #[test]
    fn parse_rejects_extra_arguments() {
        assert_eq!(Command::parse(&args(&["a.png", "out.png", "extra"])), None);
        assert_eq!(Command::parse(&args(&["--story", "s.json", "extra"])), None);
    }

    #[test]
    fn report_layout() {
        let result = ProcessingResult {
            source: "x.png".into(),
            content_hash: String::new(),
            raw_text: String::new(),
            redacted_text: "Total: $40.00".into(),
            amounts: vec![Money::from_dollars(40)],
            shock_value: Money::from_dollars(40),
            pii_found: vec![PiiCategory::Ssn, PiiCategory::Email],
            redacted_image: None,
            summary: "$40 medical bill".into(),
        };
        let rule = "=".repeat(60);
        let thin = "-".repeat(60);
        let expected = format!(
            "\n{rule}\nOCR + REDACTION RESULTS\n{rule}\n\nAmounts found: [$40.00]\n\
             Shock value: $40.00\nPII types found: [ssn, email]\n\nSummary: $40 medical bill\n\
             \n{thin}\nREDACTED TEXT:\n{thin}\nTotal: $40.00\n"
        );
        assert_eq!(render_report(&result), expected);
    }

    #[tokio::test]
    async fn image_report_shows_redacted_text_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bill.png");
        std::fs::write(&path, tiny_png()).unwrap();

        let p = processor("Patient: John Smith\nAccount #12345678\nTotal: $87,500.00");
        let fetcher = ImageFetcher::new(&PipelineConfig::default().fetch).unwrap();
        let batch = BatchCoordinator::new(&p, &fetcher);

        let report = run_image(&batch, path.to_str().unwrap(), None).await.unwrap();
        assert!(report.contains("Amounts found: [$87,500.00]"));
        assert!(report.contains("Shock value: $87,500.00"));
        assert!(report.contains("PII types found: [account, name]"));
        assert!(report.contains("Summary: DEVASTATING: $87,500 medical bill"));
        assert!(report.contains("[NAME_REDACTED]"));
        assert!(!report.contains("John Smith"));
        assert!(!report.contains("12345678"));
    }

    #[tokio::test]
    async fn story_mode_prints_updated_record() {
        let dir = tempfile::tempdir().unwrap();
        let img = dir.path().join("a.png");
        std::fs::write(&img, tiny_png()).unwrap();
        let story_path = dir.path().join("story.json");
        let story = StoryRecord {
            id: "story-1".into(),
            images: vec![img.to_str().unwrap().into(), "/nonexistent/b.png".into()],
            ..StoryRecord::default()
        };
        std::fs::write(&story_path, serde_json::to_string(&story).unwrap()).unwrap();

        let p = processor("Balance Due: $2,400.00");
        let fetcher = ImageFetcher::new(&PipelineConfig::default().fetch).unwrap();
        let batch = BatchCoordinator::new(&p, &fetcher);

        let json = run_story(&batch, &story_path).await.unwrap();
        let updated: StoryRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(updated.cost_us, Some(Money::from_dollars(2_400)));
        assert_eq!(updated.processed_images.len(), 1);
    }

    #[test]
    fn report_for_empty_result() {
        let result = ProcessingResult {
            source: "x.png".into(),
            content_hash: String::new(),
            raw_text: String::new(),
            redacted_text: String::new(),
            amounts: vec![],
            shock_value: Money::zero(),
            pii_found: vec![],
            redacted_image: None,
            summary: "Medical bill - amount unclear".into(),
        };
        let report = render_report(&result);
        assert!(report.contains("No amounts found"));
        assert!(report.contains("No text extracted"));
    }

    #[test]
    fn report_truncates_long_text() {
        let result = ProcessingResult {
            source: "x.png".into(),
            content_hash: String::new(),
            raw_text: String::new(),
            redacted_text: "a".repeat(5000),
            amounts: vec![Money::from_dollars(10)],
            shock_value: Money::from_dollars(10),
            pii_found: vec![PiiCategory::Email],
            redacted_image: None,
            summary: "$10 medical bill".into(),
        };
        let report = render_report(&result);
        assert!(report.contains(&"a".repeat(2000)));
        assert!(!report.contains(&"a".repeat(2001)));
    }
}
