//! Application configuration.
//!
//! One immutable [`AppConfig`] is built at start-up, either from defaults or
//! from a YAML file, and shared read-only by every stage of a generation run.
//! Every section and field falls back to its default when omitted.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::error::{Error, Result};

/// Where inputs are read from and outputs written to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    pub template: PathBuf,
    pub data: PathBuf,
    pub images_dir: PathBuf,
    pub logos_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            template: PathBuf::from("templates/case_studies_template.pptx"),
            data: PathBuf::from("data/case_studies_complete.json"),
            images_dir: PathBuf::from("images"),
            logos_dir: PathBuf::from("Logos"),
            output_dir: PathBuf::from("output"),
        }
    }
}

impl PathsConfig {
    /// Resolve every relative path against `root`.
    fn resolve(&mut self, root: &Path) {
        for path in [
            &mut self.template,
            &mut self.data,
            &mut self.images_dir,
            &mut self.logos_dir,
            &mut self.output_dir,
        ] {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        }
    }
}

/// Completion service settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AiConfig {
    /// Model for selection, metric and image lookups
    pub model: String,
    /// Model for logo matching
    pub logo_model: String,
    pub logo_max_completion_tokens: u32,
    /// Chat completions endpoint
    pub base_url: String,
    /// Overrides the HTTP client's default timeout
    pub timeout_secs: Option<u64>,
    /// Upper bound on candidates listed in a similarity prompt
    pub similarity_candidates: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            logo_model: "gpt-5-mini".to_string(),
            logo_max_completion_tokens: 5000,
            base_url: "https://api.openai.com/v1/chat/completions".to_string(),
            timeout_secs: None,
            similarity_candidates: 20,
        }
    }
}

/// Measured constants of the layout engine, in EMU unless noted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    pub overview_slide_index: usize,
    pub detail_slide_index: usize,

    /// Pictures at least this large (EMU²) are case-study images
    pub min_image_area: f64,
    pub max_case_images: usize,
    pub standard_image_width: i64,
    pub standard_image_height: i64,
    /// JPEG quality for cropped overview images
    pub jpeg_quality: u8,

    pub grey_char_width: i64,
    pub grey_text_padding: i64,
    pub grey_horizontal_padding: i64,
    pub grey_vertical_padding: i64,
    /// Category text must start within this distance of a grey box's top
    pub grey_top_tolerance: i64,

    pub white_box_max_height: i64,
    pub white_box_max_width: i64,
    pub white_box_char_factor: f64,
    /// Extra width in points added to a white box
    pub white_box_padding_pt: f64,
    pub white_box_default_font_pt: f64,

    pub metric_default_font_pt: f64,
    pub metric_char_factor: f64,
    pub label_default_font_pt: f64,
    pub label_char_factor: f64,
    pub label_min_font_pt: f64,
    pub detail_metric_font_pt: f64,
    pub detail_label_font_pt: f64,

    pub category_default_font_pt: f64,
    /// Category values whose text shrinks by one point
    pub category_shrink: Vec<String>,

    pub title_top: i64,
    pub title_height: i64,
    pub title_char_width_factor: f64,
    pub title_min_chars: usize,
    pub title_max_lines: usize,
    pub title_default_font_pt: f64,
    pub line_top_offset: i64,
    pub line_width_factor: f64,
    pub line_left_offset: i64,
    pub description_gap: i64,
    pub description_small_font_pt: f64,

    /// Logo rasterization resolution and oversampling
    pub logo_dpi: u32,
    pub logo_oversample: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            overview_slide_index: 0,
            detail_slide_index: 1,

            min_image_area: 1.5e12,
            max_case_images: 4,
            standard_image_width: 2_109_600,
            standard_image_height: 2_160_000,
            jpeg_quality: 95,

            grey_char_width: 46_800,
            grey_text_padding: 50_000,
            grey_horizontal_padding: 108_000,
            grey_vertical_padding: 46_800,
            grey_top_tolerance: 274_320,

            white_box_max_height: 457_200,
            white_box_max_width: 2_742_000,
            white_box_char_factor: 0.52,
            white_box_padding_pt: 40.0,
            white_box_default_font_pt: 11.0,

            metric_default_font_pt: 30.0,
            metric_char_factor: 0.6,
            label_default_font_pt: 11.0,
            label_char_factor: 0.5,
            label_min_font_pt: 8.0,
            detail_metric_font_pt: 30.0,
            detail_label_font_pt: 11.0,

            category_default_font_pt: 18.0,
            category_shrink: vec!["INFRASTRUCTURE".to_string()],

            title_top: 3_638_400,
            title_height: 208_000,
            title_char_width_factor: 0.56,
            title_min_chars: 6,
            title_max_lines: 2,
            title_default_font_pt: 11.0,
            line_top_offset: 445_854,
            line_width_factor: 0.913,
            line_left_offset: 85_432,
            description_gap: 105_713,
            description_small_font_pt: 6.0,

            logo_dpi: 96,
            logo_oversample: 3,
        }
    }
}

/// Fixed texts and the sentinels used when data is missing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TokenConfig {
    pub subtitle: String,
    pub four_cases_title: String,
    pub solution_intro: String,
    pub text_placeholder: String,
    pub image_placeholder: String,
    pub logo_placeholder: String,
    pub max_title_len: usize,
    pub max_metric_len: usize,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            subtitle: "Selected Case Studies".to_string(),
            four_cases_title: "4 Selected Case Studies".to_string(),
            solution_intro: "Our Solution:".to_string(),
            text_placeholder: "-".to_string(),
            image_placeholder: "[Image placeholder]".to_string(),
            logo_placeholder: "[Logo placeholder]".to_string(),
            max_title_len: 60,
            max_metric_len: 40,
        }
    }
}

/// One industry and the organization-name keywords that identify it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndustryCategory {
    pub name: String,
    pub keywords: Vec<String>,
}

/// Ordered industry keyword map; the first match wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CategoryConfig {
    pub industries: Vec<IndustryCategory>,
    pub fallback: String,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        let industry = |name: &str, keywords: &[&str]| IndustryCategory {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        };
        Self {
            industries: vec![
                industry("infrastructure", &["Ferrovial", "Quadrante", "Nortecnica"]),
                industry("logistics", &["Portir", "AddVolt", "Profit"]),
                industry("media", &["24 horas", "Media Capital", "SportTV"]),
                industry("retail", &["Farmácias", "STS", "Rádio Popular", "Bene"]),
                industry(
                    "healthcare",
                    &["Astrazeneca", "Maia", "Sword Health", "Vet AI", "Medicare", "Pet24"],
                ),
                industry("financial", &["Banco", "BIG", "Lince Capital", "Sage", "Millennium"]),
                industry("technology", &["Clever", "DeskSkill", "Gist", "Code for All"]),
                industry("public sector", &["SPMS", "Câmara", "FAP", "SST"]),
            ],
            fallback: "TECHNOLOGY".to_string(),
        }
    }
}

impl CategoryConfig {
    /// Upper-cased industry for an organization name.
    pub fn industry_for(&self, org: &str) -> String {
        let org = org.to_lowercase();
        self.industries
            .iter()
            .find(|c| c.keywords.iter().any(|k| org.contains(&k.to_lowercase())))
            .map(|c| c.name.to_uppercase())
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub ai: AiConfig,
    pub layout: LayoutConfig,
    pub tokens: TokenConfig,
    pub categories: CategoryConfig,
}

impl AppConfig {
    /// Defaults with paths relative to the working directory.
    pub fn with_root(root: &Path) -> Self {
        let mut config = Self::default();
        config.paths.resolve(root);
        config
    }

    /// Parse YAML; relative paths resolve against `root`.
    pub fn from_yaml(yaml: &str, root: &Path) -> Result<Self> {
        let mut config: Self =
            serde_saphyr::from_str(yaml).map_err(|e| Error::Config(e.to_string()))?;
        config.paths.resolve(root);
        Ok(config)
    }

    /// Load a YAML file; relative paths resolve against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::MissingFile(path.to_path_buf()));
        }
        let yaml = std::fs::read_to_string(path)?;
        let root = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        debug!(path = %path.display(), "loading configuration");
        Self::from_yaml(&yaml, root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "ai:\n  model: gpt-4o\n  timeout_secs: 30\nlayout:\n  grey_char_width: 50000\n";
        let config = AppConfig::from_yaml(yaml, Path::new("/srv/decks")).unwrap();

        assert_eq!(config.ai.model, "gpt-4o");
        assert_eq!(config.ai.timeout_secs, Some(30));
        assert_eq!(config.ai.logo_model, "gpt-5-mini");
        assert_eq!(config.layout.grey_char_width, 50_000);
        assert_eq!(config.layout.standard_image_width, 2_109_600);
        assert_eq!(config.tokens.image_placeholder, "[Image placeholder]");
        assert_eq!(config.paths.images_dir, PathBuf::from("/srv/decks/images"));
    }

    #[test]
    fn test_absolute_paths_are_kept() {
        let yaml = "paths:\n  template: /opt/template.pptx\n";
        let config = AppConfig::from_yaml(yaml, Path::new("/srv")).unwrap();
        assert_eq!(config.paths.template, PathBuf::from("/opt/template.pptx"));
        assert_eq!(config.paths.data, PathBuf::from("/srv/data/case_studies_complete.json"));
    }

    #[test]
    fn test_invalid_yaml_is_a_config_error() {
        let err = AppConfig::from_yaml("ai: [unclosed", Path::new(".")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_resolves_against_file_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("casedeck.yaml");
        std::fs::write(&path, "paths:\n  output_dir: out\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.paths.output_dir, dir.path().join("out"));
        assert!(matches!(
            AppConfig::load(&dir.path().join("missing.yaml")),
            Err(Error::MissingFile(_))
        ));
    }

    #[test]
    fn test_industry_lookup() {
        let categories = CategoryConfig::default();
        assert_eq!(categories.industry_for("Banco Português"), "FINANCIAL");
        assert_eq!(categories.industry_for("Sword Health Inc"), "HEALTHCARE");
        assert_eq!(categories.industry_for("câmara municipal"), "PUBLIC SECTOR");
        assert_eq!(categories.industry_for("Unknown Ltd"), "TECHNOLOGY");
    }
}
