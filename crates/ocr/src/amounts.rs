use std::str::FromStr;
use std::sync::OnceLock;

use billshield_core::Money;
use regex::Regex;
use rust_decimal::Decimal;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_currency,
    r"\$[\d,]+(?:\.\d{2})?");
re!(re_labeled,
    r"(?i)\b(?:total|amount|due|charge|balance|cost|price)[:\s]*\$?[\d,]+(?:\.\d{2})?");

// ── Public extraction API ─────────────────────────────────────────────────────

pub struct AmountExtractor;

impl AmountExtractor {
    /// Every positive dollar amount in `text`, deduplicated by value and
    /// sorted largest first.
    pub fn extract(text: &str) -> Vec<Money> {
        let mut amounts: Vec<Money> = [re_currency(), re_labeled()]
            .into_iter()
            .flat_map(|re| re.find_iter(text))
            .filter_map(|m| parse_amount_str(m.as_str()))
            .filter(|m| m.is_positive())
            .collect();

        amounts.sort_unstable_by(|a, b| b.cmp(a));
        amounts.dedup();
        amounts
    }
}

// ── Amount parsing ────────────────────────────────────────────────────────────

/// Keep digits and the decimal point, drop labels, `$` and grouping commas.
fn parse_amount_str(s: &str) -> Option<Money> {
    let clean: String = s.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    let dec = Decimal::from_str(&clean).ok()?;
    Some(Money::from_decimal(dec))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_and_label_forms_collapse() {
        let amounts = AmountExtractor::extract("Charges $100,000\nTotal: 100000");
        assert_eq!(amounts, vec![Money::from_dollars(100_000)]);
    }

    #[test]
    fn cents_and_whole_dollars_are_equal() {
        let amounts = AmountExtractor::extract("Total: $87,500.00\nBalance 87500");
        assert_eq!(amounts, vec![Money::from_dollars(87_500)]);
    }

    #[test]
    fn sorted_descending() {
        let amounts = AmountExtractor::extract("$5.00 then $1,250.50 and $40");
        assert_eq!(
            amounts,
            vec![Money::from_cents(125_050), Money::from_dollars(40), Money::from_dollars(5)]
        );
    }

    #[test]
    fn labels_are_case_insensitive() {
        let amounts = AmountExtractor::extract("AMOUNT DUE: 310.25\nprice 12");
        assert_eq!(amounts, vec![Money::from_cents(31_025), Money::from_dollars(12)]);
    }

    #[test]
    fn zero_and_garbage_are_dropped() {
        assert!(AmountExtractor::extract("Balance: $0.00").is_empty());
        assert!(AmountExtractor::extract("$,, and Total: ,").is_empty());
    }

    #[test]
    fn unlabeled_numbers_are_ignored() {
        assert!(AmountExtractor::extract("Account 12345678\nPage 2").is_empty());
        assert!(AmountExtractor::extract("").is_empty());
    }

    #[test]
    fn parse_amount_str_strips_formatting() {
        assert_eq!(parse_amount_str("Total: $1,234.56"), Some(Money::from_cents(123_456)));
        assert_eq!(parse_amount_str("$"), None);
    }
}
