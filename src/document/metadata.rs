use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Optional descriptive fields used by the relevance factors.
///
/// Every field is optional and every absence has a documented default:
/// a missing `agency`, empty `keywords`, or empty `technologies` contribute
/// zero to their factor; a missing `date` contributes a neutral recency
/// value rather than a penalty.
///
/// Sets are BTree-backed so serialization and factor iteration order are
/// deterministic.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default)]
    pub agency: Option<String>,

    #[serde(default)]
    pub keywords: BTreeSet<String>,

    #[serde(default)]
    pub technologies: BTreeSet<String>,

    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl DocumentMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agency(mut self, agency: impl Into<String>) -> Self {
        self.agency = Some(agency.into());
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_technologies<I, S>(mut self, technologies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.technologies = technologies.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }
}
