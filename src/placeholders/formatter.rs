//! Builds the placeholder table for a selection.
use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::csi::{clean_description, CsiBullets};
use super::keys;
use super::ledger::{Resource, ResourceLedger};
use super::metric;
use super::PlaceholderTable;
use crate::ai::prompts::{self, Borrow};
use crate::ai::{parse_choice, ChatRequest, CompletionClient};
use crate::config::AppConfig;
use crate::store::{is_missing_metric, CaseStudyRecord};

/// The company the deck is generated for.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyContext {
    pub name: String,
    pub description: String,
    pub date: NaiveDate,
}

impl CompanyContext {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            date: chrono::Local::now().date_naive(),
        }
    }

    /// Write the deck-level company tokens.
    pub fn apply(&self, table: &mut PlaceholderTable) {
        table.insert_text(keys::COMPANY_NAME, self.name.clone());
        table.insert_text(keys::COMPANY_DESCRIPTION, self.description.clone());
        table.insert_text(keys::GENERATION_DATE, self.date.format("%Y-%m-%d").to_string());
        table.insert_text(keys::SLIDES_TITLE, format!("Selected Case Studies — {}", self.name));
    }
}

/// Maps selected records to template tokens, borrowing missing images,
/// metrics and logos from similar records through the completion service.
pub struct Formatter<'a, C: CompletionClient> {
    client: &'a C,
    config: &'a AppConfig,
    catalog: &'a [CaseStudyRecord],
    logos: Vec<String>,
}

impl<'a, C: CompletionClient> Formatter<'a, C> {
    pub fn new(client: &'a C, config: &'a AppConfig, catalog: &'a [CaseStudyRecord]) -> Self {
        let logos = logo_catalog(&config.paths.logos_dir);
        Self {
            client,
            config,
            catalog,
            logos,
        }
    }

    /// Replace the logo catalog read from the logos directory.
    pub fn with_logos(mut self, logos: Vec<String>) -> Self {
        self.logos = logos;
        self
    }

    pub fn format(&self, selected: &[CaseStudyRecord]) -> PlaceholderTable {
        let tokens = &self.config.tokens;
        let mut table = PlaceholderTable::new();
        table.insert_text(keys::SUBTITLE, tokens.subtitle.clone());
        table.insert_text(keys::FOUR_CASES_TITLE, tokens.four_cases_title.clone());

        let mut ledger = ResourceLedger::for_selection(selected);

        for (i, record) in selected.iter().enumerate() {
            let n = i + 1;
            debug!(slot = n, org = %record.org, "formatting case study");

            let org = record.org.trim();
            table.insert_text(keys::name(n), org);
            table.insert_text(keys::title(n), self.clean_title(record.display_title()));
            table.insert_text(keys::description(n), clean_description(&record.description));

            self.format_image(record, n, &mut ledger, &mut table);
            let label = self.format_metric(record, n, &mut ledger, &mut table);

            let category = self.category(record);
            table.insert_text(keys::category(n), category.clone());
            let tab = org
                .split_whitespace()
                .next()
                .map_or_else(|| format!("Case {n}"), str::to_string);
            table.insert_text(keys::tab_label(n), tab);

            self.format_logo(record, n, &mut ledger, &mut table);

            let bullets = CsiBullets::for_record(record);
            insert_bullets(&mut table, &bullets, |kind, x| match kind {
                Section::Challenge => keys::challenge(n, x),
                Section::Solution => keys::solution(n, x),
                Section::Impact => keys::impact(n, x),
            });

            if n == 1 {
                table.insert_text(keys::DETAIL_NAME, org);
                table.insert_text(keys::DETAIL_CATEGORY, category);
                table.insert_text(keys::DETAIL_METRIC_LABEL, label);
                table.insert_text(keys::SOLUTION_INTRO, tokens.solution_intro.clone());
                insert_bullets(&mut table, &bullets, |kind, x| match kind {
                    Section::Challenge => format!("challenge_{x}"),
                    Section::Solution => format!("solution_{x}"),
                    Section::Impact => format!("impact_{x}"),
                });
            }
        }

        info!(slots = selected.len(), tokens = table.len(), "placeholder table built");
        table
    }

    fn clean_title(&self, title: &str) -> String {
        let title = title.trim();
        let max = self.config.tokens.max_title_len;
        if title.chars().count() > max {
            let head: String = title.chars().take(max.saturating_sub(3)).collect();
            format!("{head}...")
        } else {
            title.to_string()
        }
    }

    fn category(&self, record: &CaseStudyRecord) -> String {
        let category = record.category.trim();
        if category.is_empty() {
            self.config.categories.industry_for(&record.org)
        } else {
            category.to_uppercase()
        }
    }

    fn format_image(
        &self,
        record: &CaseStudyRecord,
        n: usize,
        ledger: &mut ResourceLedger,
        table: &mut PlaceholderTable,
    ) {
        let images_dir = &self.config.paths.images_dir;
        if record.has_image() && ledger.claim(Resource::Image, &record.image_file) {
            table.insert_media(keys::image(n), images_dir.join(&record.image_file));
            return;
        }

        warn!(org = %record.org, "no image for case study, looking for a similar one");
        let candidates: Vec<&CaseStudyRecord> = self
            .catalog
            .iter()
            .filter(|cs| cs.has_image() && ledger.is_free(Resource::Image, &cs.image_file))
            .take(self.config.ai.similarity_candidates)
            .collect();

        match self.borrow_from(record, &candidates, Borrow::Image) {
            Some(similar) => {
                ledger.claim(Resource::Image, &similar.image_file);
                info!(org = %record.org, image = %similar.image_file, "using image from similar company");
                table.insert_media(keys::image(n), images_dir.join(&similar.image_file));
            },
            None => table.insert_text(keys::image(n), self.config.tokens.image_placeholder.clone()),
        }
    }

    /// Fill the metric and label tokens; returns the label used.
    fn format_metric(
        &self,
        record: &CaseStudyRecord,
        n: usize,
        ledger: &mut ResourceLedger,
        table: &mut PlaceholderTable,
    ) -> String {
        let mut label = record.metric_label.trim().to_string();
        let own = record.metric.trim();

        let raw = if !is_missing_metric(own) && ledger.claim(Resource::Metric, &record.metric) {
            own.to_string()
        } else {
            warn!(org = %record.org, "missing metric, looking for a similar company");
            let candidates: Vec<&CaseStudyRecord> = self
                .catalog
                .iter()
                .filter(|cs| cs.has_real_metric() && ledger.is_free(Resource::Metric, &cs.metric))
                .take(self.config.ai.similarity_candidates)
                .collect();

            match self.borrow_from(record, &candidates, Borrow::Metric) {
                Some(similar) => {
                    ledger.claim(Resource::Metric, &similar.metric);
                    info!(org = %record.org, metric = %similar.metric, "using metric from similar company");
                    if label.is_empty() {
                        label = similar.metric_label.trim().to_string();
                    }
                    similar.metric.trim().to_string()
                },
                None => self.config.tokens.text_placeholder.clone(),
            }
        };

        let value = if raw == self.config.tokens.text_placeholder {
            raw
        } else {
            metric::normalize(&raw, self.config.tokens.max_metric_len)
        };
        table.insert_text(keys::metric(n), value);
        table.insert_text(keys::metric_label(n), label.clone());
        label
    }

    fn format_logo(
        &self,
        record: &CaseStudyRecord,
        n: usize,
        ledger: &mut ResourceLedger,
        table: &mut PlaceholderTable,
    ) {
        let remaining: Vec<&str> = self
            .logos
            .iter()
            .map(String::as_str)
            .filter(|logo| ledger.is_free(Resource::Logo, logo))
            .collect();

        let matched = if remaining.is_empty() {
            None
        } else {
            let request = ChatRequest::new(&self.config.ai.logo_model)
                .user(prompts::logo(record, &remaining))
                .max_completion_tokens(self.config.ai.logo_max_completion_tokens);
            self.ask_choice(&request, remaining.len())
                .map(|i| remaining[i])
        };

        match matched {
            Some(logo) => {
                ledger.claim(Resource::Logo, logo);
                info!(org = %record.org, logo, "matched logo");
                table.insert_media(keys::logo(n), self.config.paths.logos_dir.join(format!("{logo}.svg")));
            },
            None => table.insert_text(keys::logo(n), self.config.tokens.logo_placeholder.clone()),
        }
    }

    /// Ask which candidate is most similar to `target`.
    fn borrow_from<'c>(
        &self,
        target: &CaseStudyRecord,
        candidates: &[&'c CaseStudyRecord],
        borrow: Borrow,
    ) -> Option<&'c CaseStudyRecord> {
        if candidates.is_empty() {
            warn!(org = %target.org, ?borrow, "no unused candidates to borrow from");
            return None;
        }
        let request = ChatRequest::new(&self.config.ai.model)
            .user(prompts::similarity(target, candidates, borrow))
            .temperature(0.0);
        self.ask_choice(&request, candidates.len()).map(|i| candidates[i])
    }

    fn ask_choice(&self, request: &ChatRequest, count: usize) -> Option<usize> {
        match self.client.complete(request) {
            Ok(reply) => {
                let choice = parse_choice(&reply, count);
                if choice.is_none() {
                    warn!(reply = %reply.trim(), "lookup reply is not a valid choice");
                }
                choice
            },
            Err(e) => {
                warn!(error = %e, "similarity lookup failed");
                None
            },
        }
    }
}

#[derive(Clone, Copy)]
enum Section {
    Challenge,
    Solution,
    Impact,
}

fn insert_bullets(
    table: &mut PlaceholderTable,
    bullets: &CsiBullets,
    key: impl Fn(Section, usize) -> String,
) {
    for (section, items, max) in [
        (Section::Challenge, &bullets.challenges, keys::MAX_CHALLENGES),
        (Section::Solution, &bullets.solutions, keys::MAX_SOLUTIONS),
        (Section::Impact, &bullets.impacts, keys::MAX_IMPACTS),
    ] {
        for x in 1..=max {
            let text = items.get(x - 1).cloned().unwrap_or_default();
            table.insert_text(key(section, x), text);
        }
    }
}

/// Sorted stems of the `*.svg` files in `dir`; empty when the directory is missing.
pub fn logo_catalog(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        debug!(dir = %dir.display(), "no logos directory");
        return Vec::new();
    };
    let mut logos: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("svg")))
        .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .collect();
    logos.sort();
    logos
}
