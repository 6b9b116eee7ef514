use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The fixed set of personal-data categories the detector knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiCategory {
    Ssn,
    Dob,
    Address,
    Phone,
    Account,
    Mrn,
    Name,
    Email,
}

impl PiiCategory {
    pub const ALL: [PiiCategory; 8] = [
        PiiCategory::Ssn,
        PiiCategory::Dob,
        PiiCategory::Address,
        PiiCategory::Phone,
        PiiCategory::Account,
        PiiCategory::Mrn,
        PiiCategory::Name,
        PiiCategory::Email,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PiiCategory::Ssn => "ssn",
            PiiCategory::Dob => "dob",
            PiiCategory::Address => "address",
            PiiCategory::Phone => "phone",
            PiiCategory::Account => "account",
            PiiCategory::Mrn => "mrn",
            PiiCategory::Name => "name",
            PiiCategory::Email => "email",
        }
    }

    /// Replacement marker used in redacted text, e.g. `[SSN_REDACTED]`.
    pub fn placeholder(self) -> String {
        format!("[{}_REDACTED]", self.as_str().to_uppercase())
    }
}

impl fmt::Display for PiiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Matched literals per category. Categories with no matches are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiiFindings(BTreeMap<PiiCategory, Vec<String>>);

impl PiiFindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records matches for `category`; an empty list is dropped.
    pub fn insert(&mut self, category: PiiCategory, matches: Vec<String>) {
        if matches.is_empty() {
            return;
        }
        self.0.entry(category).or_default().extend(matches);
    }

    pub fn get(&self, category: PiiCategory) -> Option<&[String]> {
        self.0.get(&category).map(Vec::as_slice)
    }

    pub fn contains(&self, category: PiiCategory) -> bool {
        self.0.contains_key(&category)
    }

    pub fn categories(&self) -> Vec<PiiCategory> {
        self.0.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PiiCategory, &[String])> + '_ {
        self.0.iter().map(|(c, v)| (*c, v.as_slice()))
    }

    pub fn retain_categories(&mut self, keep: &[PiiCategory]) {
        self.0.retain(|c, _| keep.contains(c));
    }
}
