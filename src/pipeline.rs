//! One generation run from request to finished deck.
//!
//! ```rust,no_run
//! use casedeck::config::AppConfig;
//! use casedeck::pipeline::{GenerationRequest, Generator};
//!
//! let config = AppConfig::with_root(std::path::Path::new("."));
//! let generator = Generator::with_api_key(config, std::env::var("OPENAI_API_KEY").ok().as_deref())?;
//! let request = GenerationRequest::new("Acme", "Regional rail operator modernizing maintenance", 4);
//! let path = generator.generate_to_dir(&request, std::path::Path::new("output"))?;
//! println!("{}", path.display());
//! # Ok::<(), casedeck::Error>(())
//! ```
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use crate::ai::{CompletionClient, OpenAiClient};
use crate::common::{Error, Result};
use crate::config::AppConfig;
use crate::filter::{self, VALID_SIZES};
use crate::layout::LayoutEngine;
use crate::ooxml::pptx::Package;
use crate::placeholders::{CompanyContext, Formatter};
use crate::selector::{cases_for_size, SelectionResult, Selector};
use crate::store::CaseStudyStore;

pub const MAX_NAME_CHARS: usize = 200;
pub const MIN_DESCRIPTION_CHARS: usize = 10;
pub const MAX_DESCRIPTION_CHARS: usize = 2000;
const MAX_FILENAME_STEM_CHARS: usize = 50;

static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));
static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-\s]+").expect("valid regex"));

/// What the caller asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub company_name: String,
    pub company_description: String,
    /// Cases in the deck: 1, 2 or 4, or 0 for the whole template
    pub size: u8,
}

impl GenerationRequest {
    pub fn new(company_name: impl Into<String>, company_description: impl Into<String>, size: u8) -> Self {
        Self {
            company_name: company_name.into(),
            company_description: company_description.into(),
            size,
        }
    }

    /// The trimmed request, or why it cannot be served.
    pub fn validate(&self) -> Result<Self> {
        let name = self.company_name.trim();
        let description = self.company_description.trim();

        let name_len = name.chars().count();
        if name_len == 0 || name_len > MAX_NAME_CHARS {
            return Err(Error::InvalidRequest(format!(
                "company name must be 1 to {MAX_NAME_CHARS} characters"
            )));
        }
        let description_len = description.chars().count();
        if !(MIN_DESCRIPTION_CHARS..=MAX_DESCRIPTION_CHARS).contains(&description_len) {
            return Err(Error::InvalidRequest(format!(
                "company description must be {MIN_DESCRIPTION_CHARS} to {MAX_DESCRIPTION_CHARS} characters"
            )));
        }
        if !VALID_SIZES.contains(&self.size) {
            return Err(Error::InvalidRequest(format!(
                "presentation size must be one of 0, 1, 2 or 4 (got {})",
                self.size
            )));
        }
        Ok(Self::new(name, description, self.size))
    }
}

/// A finished presentation.
#[derive(Debug, Clone)]
pub struct GeneratedDeck {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub selection: SelectionResult,
}

/// Runs the whole chain: catalog, selection, tokens, layout, filtering.
pub struct Generator<C: CompletionClient> {
    config: AppConfig,
    client: C,
}

impl Generator<OpenAiClient> {
    /// A generator backed by the OpenAI chat-completions API.
    pub fn with_api_key(config: AppConfig, api_key: Option<&str>) -> Result<Self> {
        let api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(Error::MissingCredential)?;
        let client = OpenAiClient::new(api_key, &config.ai)?;
        Ok(Self::new(config, client))
    }
}

impl<C: CompletionClient> Generator<C> {
    pub fn new(config: AppConfig, client: C) -> Self {
        Self { config, client }
    }

    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Build the deck in memory.
    pub fn generate(&self, request: &GenerationRequest) -> Result<GeneratedDeck> {
        let request = request.validate()?;
        let paths = &self.config.paths;
        for path in [&paths.data, &paths.template] {
            if !path.exists() {
                return Err(Error::MissingFile(path.clone()));
            }
        }

        let store = CaseStudyStore::load(&paths.data)?;
        let count = cases_for_size(request.size as usize);
        let selection = Selector::new(&self.client, &self.config.ai.model).select(
            store.records(),
            &request.company_name,
            &request.company_description,
            count,
        )?;

        let mut table = Formatter::new(&self.client, &self.config, store.records()).format(&selection.records);
        CompanyContext::new(&request.company_name, &request.company_description).apply(&mut table);
        table.backfill(&self.config.tokens);
        info!(tokens = table.len(), "placeholder table ready");

        let mut package = Package::open(&paths.template)?;
        LayoutEngine::new(&self.config.layout).mutate_presentation(&mut package, &mut table)?;
        let slides = filter::filter_slides(&mut package, request.size)?;
        let bytes = package.to_bytes()?;

        let filename = output_filename(&request.company_name, request.size, Local::now().naive_local());
        info!(filename = %filename, slides, bytes = bytes.len(), "presentation generated");
        Ok(GeneratedDeck {
            bytes,
            filename,
            selection,
        })
    }

    /// Build the deck and write it into `dir`, returning the file path.
    pub fn generate_to_dir(&self, request: &GenerationRequest, dir: &Path) -> Result<PathBuf> {
        let deck = self.generate(request)?;
        fs::create_dir_all(dir)?;
        let path = dir.join(&deck.filename);
        fs::write(&path, &deck.bytes)?;
        info!(path = %path.display(), "presentation written");
        Ok(path)
    }
}

/// Company name reduced to word characters joined by underscores.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned = UNSAFE_CHARS.replace_all(name, "");
    let joined = SEPARATORS.replace_all(&cleaned, "_");
    joined.chars().take(MAX_FILENAME_STEM_CHARS).collect()
}

/// `{company}_{size}-cases_{YYYYmmdd_HHMMSS}.pptx`
pub fn output_filename(company_name: &str, size: u8, at: NaiveDateTime) -> String {
    format!(
        "{}_{}-cases_{}.pptx",
        sanitize_filename(company_name),
        size,
        at.format("%Y%m%d_%H%M%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::ScriptedClient;
    use crate::ai::ResponseFormat;
    use crate::ooxml::pptx::package::tests::{build_pptx, text_shape};
    use chrono::NaiveDate;

    #[test]
    fn test_validate() {
        let ok = GenerationRequest::new("  Acme  ", "  Rail operator in Iberia ", 2).validate().unwrap();
        assert_eq!(ok, GenerationRequest::new("Acme", "Rail operator in Iberia", 2));

        let bad = [
            GenerationRequest::new("   ", "Rail operator in Iberia", 4),
            GenerationRequest::new("x".repeat(201), "Rail operator in Iberia", 4),
            GenerationRequest::new("Acme", " too short ", 4),
            GenerationRequest::new("Acme", "d".repeat(2001), 4),
            GenerationRequest::new("Acme", "Rail operator in Iberia", 3),
        ];
        for request in bad {
            assert!(matches!(request.validate(), Err(Error::InvalidRequest(_))), "{request:?}");
        }
    }

    #[test]
    fn test_output_filename() {
        let at = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap().and_hms_opt(9, 5, 1).unwrap();
        assert_eq!(output_filename("Acme", 4, at), "Acme_4-cases_20250307_090501.pptx");
        assert_eq!(sanitize_filename("Banco BIG, S.A. -- Lisboa"), "Banco_BIG_SA_Lisboa");
        assert_eq!(sanitize_filename(&"a".repeat(80)).len(), 50);
    }

    #[test]
    fn test_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let generator = Generator::new(AppConfig::with_root(dir.path()), ScriptedClient::constant("1"));
        let request = GenerationRequest::new("Acme", "Rail operator in Iberia", 4);
        let err = generator.generate(&request).unwrap_err();
        assert!(matches!(err, Error::MissingFile(p) if p.ends_with("case_studies_complete.json")));
    }

    #[test]
    fn test_missing_api_key() {
        let config = AppConfig::default();
        assert!(matches!(Generator::with_api_key(config.clone(), None), Err(Error::MissingCredential)));
        assert!(matches!(Generator::with_api_key(config, Some("  ")), Err(Error::MissingCredential)));
    }

    fn catalog_json() -> String {
        let records: Vec<serde_json::Value> = (1..=5)
            .map(|i| {
                serde_json::json!({
                    "org": format!("Org {i}"),
                    "deal_title": format!("Project {i}"),
                    "description": "Challenge: Slow audits. Solution: Automated checks. Impact: Faster closing.",
                    "challenges": ["Slow audits"],
                    "solutions": ["Automated checks"],
                    "impacts": ["Faster closing"],
                    "category": "Financial",
                    "metric": format!("{}0%", i),
                    "metric_label": "faster",
                    "angles": ["automation"]
                })
            })
            .collect();
        serde_json::json!({ "case_studies": records }).to_string()
    }

    #[test]
    fn test_generate_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("templates")).unwrap();
        std::fs::create_dir_all(root.join("data")).unwrap();
        std::fs::write(
            root.join("templates/case_studies_template.pptx"),
            build_pptx(&[
                &[
                    text_shape(2, "case_study_1_name", "{{case_study_1_name}}"),
                    text_shape(3, "Header", "{{slide_case_studies_title}}"),
                ]
                .concat(),
                &text_shape(2, "case_study_name", "{{case_study_name}}"),
                &text_shape(2, "Single", "{{case_study_1_title}}"),
            ]),
        )
        .unwrap();
        std::fs::write(root.join("data/case_studies_complete.json"), catalog_json()).unwrap();

        let client = ScriptedClient::new(|request| match request.response_format {
            ResponseFormat::JsonSchema { .. } => {
                Ok(r#"{"reasoning": "closest fit", "selected_indices": [4, 0, 2, 1]}"#.to_string())
            },
            ResponseFormat::Text => Ok("1".to_string()),
        });
        let generator = Generator::new(AppConfig::with_root(root), client);
        let request = GenerationRequest::new("Acme", "Regional rail operator", 4);

        let path = generator.generate_to_dir(&request, &root.join("output")).unwrap();
        let filename = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(filename.starts_with("Acme_4-cases_"), "{filename}");

        let package = Package::open(&path).unwrap();
        let slides = package.slide_partnames().unwrap();
        assert_eq!(slides.len(), 1);
        let slide = package.load_slide(&slides[0]).unwrap();
        let name = slide.find_by_name("case_study_1_name").unwrap();
        assert_eq!(slide.shape(name).text(), "Org 5");
        let header = slide.find_by_name("Header").unwrap();
        assert_eq!(slide.shape(header).text(), "Selected Case Studies — Acme");
    }
}
