//! Prompt texts for the four request shapes.
use std::fmt::Write;

use crate::store::CaseStudyRecord;

pub const SELECTION_SYSTEM: &str =
    "You are an expert business analyst selecting relevant case studies.";

/// Ask for `count` indices out of `candidates`.
pub fn selection(
    candidates: &[&CaseStudyRecord],
    company_name: &str,
    company_description: &str,
    count: usize,
) -> String {
    let case_list = candidates
        .iter()
        .enumerate()
        .map(|(i, cs)| {
            format!(
                "Index: {}\nTitle: {}\nOrg: {}\nAngles: {}\nComments: {}",
                i,
                cs.deal_title,
                cs.org,
                cs.angles.join(", "),
                cs.comments
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Select the {count} most relevant case studies for this company:\n\n\
         TARGET COMPANY:\nName: {company_name}\nDescription: {company_description}\n\n\
         CRITERIA: Industry alignment, similar challenges, complementary perspectives, relevant use cases\n\n\
         CASE STUDIES:\n{case_list}\n\n\
         Return JSON with a short \"reasoning\" string and exactly {count} distinct \"selected_indices\"."
    )
}

/// JSON schema for the selection reply.
pub fn selection_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "reasoning": { "type": "string" },
            "selected_indices": {
                "type": "array",
                "items": { "type": "integer" }
            }
        },
        "required": ["reasoning", "selected_indices"],
        "additionalProperties": false
    })
}

/// What a similarity lookup is borrowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Borrow {
    Metric,
    Image,
}

fn describe(cs: &CaseStudyRecord) -> String {
    format!("{} - {} - {}", cs.org, cs.category_or_unknown(), cs.display_title())
}

/// Ask which candidate is most similar to `target`.
pub fn similarity(target: &CaseStudyRecord, candidates: &[&CaseStudyRecord], borrow: Borrow) -> String {
    let mut options = String::new();
    for (i, cs) in candidates.iter().enumerate() {
        let _ = match borrow {
            Borrow::Metric => writeln!(
                options,
                "{}. {} (metric: {} - {})",
                i + 1,
                describe(cs),
                cs.metric,
                cs.metric_label
            ),
            Borrow::Image => writeln!(options, "{}. {} (image: {})", i + 1, describe(cs), cs.image_file),
        };
    }
    let options = options.trim_end();
    let n = candidates.len();

    match borrow {
        Borrow::Metric => format!(
            "Find the most similar company to borrow a metric from.\n\n\
             Target company (no metric available):\n{}\n\n\
             Available companies with metrics:\n{}\n\n\
             Return ONLY the number (1-{}) of the most similar company based on industry and solution type.\n\n\
             Return only the number.",
            describe(target),
            options,
            n
        ),
        Borrow::Image => format!(
            "You need to find the most similar company to use as a visual placeholder.\n\n\
             Target company (no image available):\n{}\n\n\
             Available companies with images:\n{}\n\n\
             Return ONLY the number (1-{}) of the most similar company based on:\n\
             - Industry/sector similarity\n\
             - Type of solution (AI, ML, automation, etc.)\n\
             - Company type (SaaS, infrastructure, etc.)\n\n\
             Return only the number, nothing else.",
            describe(target),
            options,
            n
        ),
    }
}

/// Ask which business-value logo fits `case`.
pub fn logo(case: &CaseStudyRecord, logos: &[&str]) -> String {
    let logos_list = logos
        .iter()
        .enumerate()
        .map(|(i, logo)| format!("{}. {}", i + 1, logo))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Match this case study to the BEST business value category.\n\n\
         Case Study:\nTitle: {}\nImpact: {}\nAngles: {}\nMetric: {}\n\n\
         Available Business Value Categories:\n{}\n\n\
         Return ONLY the number (1-{}) of the best matching category based on the primary business value/outcome delivered.",
        case.display_title(),
        case.impacts.as_deref().unwrap_or_default().join("; "),
        case.angles.join("; "),
        case.metric_label,
        logos_list,
        logos.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(org: &str, metric: &str, image: &str) -> CaseStudyRecord {
        CaseStudyRecord {
            org: org.to_string(),
            deal_title: format!("{org} project"),
            metric: metric.to_string(),
            metric_label: "Faster".to_string(),
            image_file: image.to_string(),
            angles: vec!["AI".to_string(), "Ops".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_selection_lists_candidates() {
        let a = record("Alpha", "", "");
        let b = record("Beta", "", "");
        let prompt = selection(&[&a, &b], "Acme", "Makes anvils", 2);
        assert!(prompt.starts_with("Select the 2 most relevant"));
        assert!(prompt.contains("Index: 1\nTitle: Beta project\nOrg: Beta\nAngles: AI, Ops"));
        assert!(prompt.contains("Name: Acme\nDescription: Makes anvils"));
    }

    #[test]
    fn test_similarity_numbering() {
        let target = record("Target", "", "");
        let a = record("Alpha", "30%", "a.jpg");
        let b = record("Beta", "2x", "b.jpg");

        let prompt = similarity(&target, &[&a, &b], Borrow::Metric);
        assert!(prompt.contains("Target - Unknown - Target project"));
        assert!(prompt.contains("2. Beta - Unknown - Beta project (metric: 2x - Faster)"));
        assert!(prompt.contains("(1-2)"));

        let prompt = similarity(&target, &[&a], Borrow::Image);
        assert!(prompt.contains("1. Alpha - Unknown - Alpha project (image: a.jpg)"));
        assert!(prompt.ends_with("Return only the number, nothing else."));
    }

    #[test]
    fn test_logo_prompt() {
        let mut case = record("Alpha", "30%", "");
        case.impacts = Some(vec!["Less waste".to_string(), "More uptime".to_string()]);
        let prompt = logo(&case, &["Cost Reduction", "Efficiency"]);
        assert!(prompt.contains("Impact: Less waste; More uptime"));
        assert!(prompt.contains("2. Efficiency"));
        assert!(prompt.contains("(1-2)"));
    }
}
