use billshield_core::{PiiCategory, PiiFindings};
use regex::{Regex, RegexBuilder};

/// A compiled pattern plus the capture group holding the sensitive literal
/// (0 = whole match).
struct Matcher {
    regex: Regex,
    group: usize,
}

impl Matcher {
    fn new(pattern: &str, group: usize) -> Self {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .expect("invalid PII pattern");
        Self { regex, group }
    }

    fn find_all<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        // Non-overlapping matches only; a capture group narrows the literal.
        let group = self.group;
        self.regex
            .captures_iter(text)
            .filter_map(move |c| c.get(group))
            .map(|m| m.as_str().to_string())
            .filter(|s| !s.is_empty())
    }
}

const STREET_SUFFIXES: &str =
    "Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Lane|Ln|Drive|Dr|Court|Ct|Way|Place|Pl";

fn matchers_for(category: PiiCategory) -> Vec<Matcher> {
    match category {
        PiiCategory::Ssn => vec![
            Matcher::new(r"\bSSN[:\s#]*\d{3}[- ]?\d{2}[- ]?\d{4}\b", 0),
            Matcher::new(r"\b\d{3}[- ]?\d{2}[- ]?\d{4}\b", 0),
        ],
        PiiCategory::Dob => vec![
            Matcher::new(
                r"\b(?:DOB|Date of Birth|Birth Date)[:\s]*\d{1,2}[-/]\d{1,2}[-/]\d{2,4}\b",
                0,
            ),
            // Any full-year date; catches unlabeled birth dates at the cost of
            // also hiding service dates.
            Matcher::new(r"\b\d{1,2}[-/]\d{1,2}[-/](?:19|20)\d{2}\b", 0),
        ],
        PiiCategory::Address => vec![Matcher::new(
            &format!(r"\b\d{{1,5}}[ \t]+[\w \t]+?\b(?:{STREET_SUFFIXES})\b[,.]?"),
            0,
        )],
        PiiCategory::Phone => vec![Matcher::new(
            r"(?:\+?\b1[-. ]?)?(?:\(\d{3}\)|\b\d{3})[-. ]?\d{3}[-. ]?\d{4}\b",
            0,
        )],
        PiiCategory::Account => vec![
            Matcher::new(r"\b(?:Account|Acct)[:\s#]*\d{6,20}\b", 0),
            Matcher::new(r"\b(?:Member|Patient|ID)[:\s#]*\d{6,20}\b", 0),
            Matcher::new(r"\b(?:Policy|Group)[:\s#]*[A-Z0-9]{6,20}\b", 0),
        ],
        PiiCategory::Mrn => vec![Matcher::new(r"\b(?:MRN|Medical Record)[:\s#]*\d{5,15}\b", 0)],
        PiiCategory::Name => vec![Matcher::new(
            // The capitalization check stays case-sensitive inside (?-i:).
            r"\b(?:Patient|Name|Member)[ \t]*:?[ \t]*((?-i:[A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+){1,2}))\b",
            1,
        )],
        PiiCategory::Email => vec![Matcher::new(
            r"\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b",
            0,
        )],
    }
}

/// Pattern-based classifier over the fixed PII categories.
///
/// Heuristic by nature: the `name` rule in particular both misses names and
/// flags label-adjacent capitalized phrases. Treat results as best-effort.
pub struct PiiDetector {
    table: Vec<(PiiCategory, Vec<Matcher>)>,
}

impl PiiDetector {
    pub fn new() -> Self {
        let table = PiiCategory::ALL.into_iter().map(|c| (c, matchers_for(c))).collect();
        Self { table }
    }

    /// All matched literals, grouped by category.
    pub fn detect(&self, text: &str) -> PiiFindings {
        let mut findings = PiiFindings::new();
        for (category, _) in &self.table {
            findings.insert(*category, self.detect_category(*category, text));
        }
        findings
    }

    /// Matches for one category, in matcher order.
    pub fn detect_category(&self, category: PiiCategory, text: &str) -> Vec<String> {
        self.table
            .iter()
            .filter(|(c, _)| *c == category)
            .flat_map(|(_, matchers)| matchers.iter())
            .flat_map(|m| m.find_all(text))
            .collect()
    }

    /// Whether any matcher of any category hits somewhere in `token`.
    pub fn matches_any(&self, token: &str) -> bool {
        self.table
            .iter()
            .flat_map(|(_, matchers)| matchers.iter())
            .any(|m| m.regex.is_match(token))
    }
}

impl Default for PiiDetector {
    fn default() -> Self {
        Self::new()
    }
}
