use billshield_core::{Money, PiiCategory, PiiFindings};
use std::fmt;

/// Severity bucket for the largest amount on a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ShockTier {
    Standard,
    Significant,
    Severe,
    Devastating,
    Catastrophic,
}

impl ShockTier {
    pub fn classify(amount: Money) -> Self {
        let thresholds = [
            (100_000, ShockTier::Catastrophic),
            (50_000, ShockTier::Devastating),
            (20_000, ShockTier::Severe),
            (5_000, ShockTier::Significant),
        ];
        thresholds
            .into_iter()
            .find(|(floor, _)| amount >= Money::from_dollars(*floor))
            .map(|(_, tier)| tier)
            .unwrap_or(ShockTier::Standard)
    }
}

impl fmt::Display for ShockTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShockTier::Catastrophic => write!(f, "CATASTROPHIC"),
            ShockTier::Devastating => write!(f, "DEVASTATING"),
            ShockTier::Severe => write!(f, "SEVERE"),
            ShockTier::Significant => write!(f, "SIGNIFICANT"),
            ShockTier::Standard => write!(f, "Standard"),
        }
    }
}

pub const UNCLEAR_SUMMARY: &str = "Medical bill - amount unclear";

/// Largest amount, or zero for an empty set.
pub fn shock_value(amounts: &[Money]) -> Money {
    amounts.iter().copied().max().unwrap_or_else(Money::zero)
}

/// One-line summary, e.g. `DEVASTATING: $87,500 medical bill`. The tier is
/// only shown when a patient name sits on the same bill as the amount.
pub fn summarize(amounts: &[Money], findings: &PiiFindings) -> String {
    if amounts.is_empty() {
        return UNCLEAR_SUMMARY.to_string();
    }
    let max = shock_value(amounts);
    let summary = format!("{} medical bill", max.to_grouped_string(0));
    if findings.contains(PiiCategory::Name) {
        format!("{}: {summary}", ShockTier::classify(max))
    } else {
        summary
    }
}
