//! Challenge / solution / impact bullets.
use once_cell::sync::Lazy;
use regex::Regex;

use super::keys::{MAX_CHALLENGES, MAX_IMPACTS, MAX_SOLUTIONS};
use crate::store::CaseStudyRecord;

static CHALLENGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)Challenge:\s*(.+?)(?:Solution:|$)").expect("valid regex"));
static SOLUTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)Solution:\s*(.+?)(?:Impact:|$)").expect("valid regex"));
static IMPACT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)Impact:\s*(.+?)$").expect("valid regex"));
static SENTENCE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.;]\s+").expect("valid regex"));
static SECTION_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(Challenge|Solution|Impact):\s*").expect("valid regex"));

/// Fragments this short are noise rather than bullets.
const MIN_BULLET_CHARS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsiBullets {
    pub challenges: Vec<String>,
    pub solutions: Vec<String>,
    pub impacts: Vec<String>,
}

impl CsiBullets {
    /// Structured lists when the record has all three, else parsed from the description.
    pub fn for_record(record: &CaseStudyRecord) -> Self {
        match (&record.challenges, &record.solutions, &record.impacts) {
            (Some(c), Some(s), Some(i)) => Self {
                challenges: capped(c, MAX_CHALLENGES),
                solutions: capped(s, MAX_SOLUTIONS),
                impacts: capped(i, MAX_IMPACTS),
            },
            _ => Self::parse(&record.description),
        }
    }

    /// Pull labeled sections out of free text.
    pub fn parse(description: &str) -> Self {
        Self {
            challenges: section(&CHALLENGE, description, MAX_CHALLENGES),
            solutions: section(&SOLUTION, description, MAX_SOLUTIONS),
            impacts: section(&IMPACT, description, MAX_IMPACTS),
        }
    }
}

fn capped(items: &[String], max: usize) -> Vec<String> {
    items.iter().take(max).cloned().collect()
}

fn section(pattern: &Regex, text: &str, max: usize) -> Vec<String> {
    let Some(body) = pattern.captures(text).and_then(|c| c.get(1)) else {
        return Vec::new();
    };
    split_bullets(body.as_str().trim(), max)
}

/// Split a section into sentence bullets.
pub fn split_bullets(text: &str, max: usize) -> Vec<String> {
    SENTENCE_BREAK
        .split(text)
        .map(str::trim)
        .filter(|p| p.chars().count() > MIN_BULLET_CHARS)
        .take(max)
        .map(str::to_string)
        .collect()
}

/// Description with its section labels removed.
pub fn clean_description(description: &str) -> String {
    SECTION_LABEL.replace_all(description.trim(), "").trim().to_string()
}
