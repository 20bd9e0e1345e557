//! Case-study catalog.
//!
//! The catalog is a JSON document `{"case_studies": [...]}`. A record's
//! identity is its position in that list; records are never modified after
//! loading.
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use crate::common::error::{Error, Result};

/// Metric values that mean "no metric".
const EMPTY_METRICS: [&str; 3] = ["", "-", "—"];

/// `null` and missing both read as the type's default.
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One case study as stored in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseStudyRecord {
    /// Client organization
    #[serde(deserialize_with = "nullable")]
    pub org: String,
    #[serde(deserialize_with = "nullable")]
    pub deal_title: String,
    /// Display title; `deal_title` is used when absent
    pub title: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    #[serde(deserialize_with = "nullable")]
    pub comments: String,
    pub challenges: Option<Vec<String>>,
    pub solutions: Option<Vec<String>>,
    pub impacts: Option<Vec<String>>,
    #[serde(deserialize_with = "nullable")]
    pub category: String,
    #[serde(deserialize_with = "nullable")]
    pub metric: String,
    #[serde(deserialize_with = "nullable")]
    pub metric_label: String,
    /// File name under the images directory
    #[serde(deserialize_with = "nullable")]
    pub image_file: String,
    #[serde(deserialize_with = "nullable")]
    pub angles: Vec<String>,
}

impl CaseStudyRecord {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.deal_title)
    }

    /// True when challenges, solutions and impacts are all present.
    pub fn has_csi(&self) -> bool {
        self.challenges.is_some() && self.solutions.is_some() && self.impacts.is_some()
    }

    /// True when the metric is something other than blank or a dash.
    pub fn has_real_metric(&self) -> bool {
        !is_missing_metric(&self.metric)
    }

    #[inline]
    pub fn has_image(&self) -> bool {
        !self.image_file.is_empty()
    }

    /// Category as shown in similarity prompts.
    pub fn category_or_unknown(&self) -> &str {
        if self.category.is_empty() {
            "Unknown"
        } else {
            &self.category
        }
    }
}

/// True for metrics that carry no value.
pub fn is_missing_metric(metric: &str) -> bool {
    EMPTY_METRICS.contains(&metric.trim())
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    case_studies: Vec<CaseStudyRecord>,
}

/// The loaded catalog.
#[derive(Debug, Clone, Default)]
pub struct CaseStudyStore {
    records: Vec<CaseStudyRecord>,
}

impl CaseStudyStore {
    pub fn new(records: Vec<CaseStudyRecord>) -> Self {
        Self { records }
    }

    /// Load the catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::MissingFile(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path)?;
        let store = Self::from_json(&json)?;
        info!(path = %path.display(), records = store.len(), "loaded case-study catalog");
        Ok(store)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Ok(Self::new(file.case_studies))
    }

    #[inline]
    pub fn records(&self) -> &[CaseStudyRecord] {
        &self.records
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
