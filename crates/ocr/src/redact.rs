use billshield_core::{PiiCategory, PiiFindings};

use crate::pii::PiiDetector;

/// Upper bound on verify-and-redact passes after the first substitution.
const MAX_RESCAN_PASSES: usize = 8;

/// Replaces detected literals with `[<CATEGORY>_REDACTED]` markers.
///
/// After substituting the given findings, the output is re-scanned for the
/// same categories and any residue is substituted again, so overlapping
/// literals cannot survive regardless of replacement order.
pub struct TextRedactor<'a> {
    detector: &'a PiiDetector,
}

impl<'a> TextRedactor<'a> {
    pub fn new(detector: &'a PiiDetector) -> Self {
        Self { detector }
    }

    pub fn redact(&self, text: &str, findings: &PiiFindings) -> String {
        let mut redacted = substitute(text, findings);
        let categories = findings.categories();

        for _ in 0..MAX_RESCAN_PASSES {
            let mut residue = self.detector.detect(&redacted);
            residue.retain_categories(&categories);
            if residue.is_empty() {
                return redacted;
            }
            tracing::debug!(categories = ?residue.categories(), "redacting residual matches");
            redacted = substitute(&redacted, &residue);
        }

        redacted
    }
}

/// Replace every occurrence of every literal, longest literal first.
fn substitute(text: &str, findings: &PiiFindings) -> String {
    let mut literals: Vec<(PiiCategory, &str)> = findings
        .iter()
        .flat_map(|(category, values)| values.iter().map(move |v| (category, v.as_str())))
        .filter(|(_, v)| !v.is_empty())
        .collect();
    literals.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

    literals.into_iter().fold(text.to_string(), |acc, (category, literal)| {
        if acc.contains(literal) {
            acc.replace(literal, &category.placeholder())
        } else {
            acc
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BILL: &str = "Patient: John Smith\nAccount #12345678\nTotal: $87,500.00";

    #[test]
    fn end_to_end_bill_text() {
        let detector = PiiDetector::new();
        let findings = detector.detect(BILL);
        let out = TextRedactor::new(&detector).redact(BILL, &findings);
        assert_eq!(out, "Patient: [NAME_REDACTED]\n[ACCOUNT_REDACTED]\nTotal: $87,500.00");
    }

    #[test]
    fn replaces_every_occurrence() {
        let detector = PiiDetector::new();
        let text = "Call 555-123-4567 or 555-123-4567";
        let findings = detector.detect(text);
        let out = TextRedactor::new(&detector).redact(text, &findings);
        assert_eq!(out, "Call [PHONE_REDACTED] or [PHONE_REDACTED]");
    }

    #[test]
    fn overlapping_literals_leave_no_residue() {
        let detector = PiiDetector::new();
        let text = "SSN: 123-45-6789 DOB: 01/02/1980 seen 01/02/1980";
        let findings = detector.detect(text);
        let out = TextRedactor::new(&detector).redact(text, &findings);

        assert!(!out.contains("123-45-6789"));
        assert!(!out.contains("01/02/1980"));
        let again = detector.detect(&out);
        for category in findings.categories() {
            assert!(!again.contains(category), "{category} survived in {out:?}");
        }
    }

    #[test]
    fn rescan_catches_literals_missing_from_findings() {
        let detector = PiiDetector::new();
        let text = "SSN 123-45-6789 and 987-65-4321";
        let mut partial = PiiFindings::new();
        partial.insert(PiiCategory::Ssn, vec!["123-45-6789".into()]);

        let out = TextRedactor::new(&detector).redact(text, &partial);
        assert!(!out.contains("987-65-4321"));
    }

    #[test]
    fn categories_outside_findings_are_untouched() {
        let detector = PiiDetector::new();
        let text = "Name: Jane Roe  mail jane@example.com";
        let mut only_name = PiiFindings::new();
        only_name.insert(PiiCategory::Name, vec!["Jane Roe".into()]);

        let out = TextRedactor::new(&detector).redact(text, &only_name);
        assert_eq!(out, "Name: [NAME_REDACTED]  mail jane@example.com");
    }

    #[test]
    fn idempotent() {
        let detector = PiiDetector::new();
        let findings = detector.detect(BILL);
        let redactor = TextRedactor::new(&detector);
        assert_eq!(redactor.redact(BILL, &findings), redactor.redact(BILL, &findings));
    }

    #[test]
    fn empty_literal_is_ignored() {
        let detector = PiiDetector::new();
        let mut findings = PiiFindings::new();
        findings.insert(PiiCategory::Email, vec![String::new()]);
        assert_eq!(TextRedactor::new(&detector).redact("abc", &findings), "abc");
    }

    #[test]
    fn no_findings_is_identity() {
        let detector = PiiDetector::new();
        let text = "Total: $12.00";
        assert_eq!(TextRedactor::new(&detector).redact(text, &PiiFindings::new()), text);
    }
}
