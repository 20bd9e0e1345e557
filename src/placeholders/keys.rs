//! Token names shared between the formatter and the template.

/// Slots on the overview slide.
pub const SLOTS: usize = 4;
pub const MAX_CHALLENGES: usize = 3;
pub const MAX_SOLUTIONS: usize = 4;
pub const MAX_IMPACTS: usize = 3;

pub const SUBTITLE: &str = "slide_case_studies_subtitle";
pub const FOUR_CASES_TITLE: &str = "4_cases_title";
pub const SLIDES_TITLE: &str = "slide_case_studies_title";
pub const COMPANY_NAME: &str = "company_name";
pub const COMPANY_DESCRIPTION: &str = "company_description";
pub const GENERATION_DATE: &str = "generation_date";
pub const SLIDE_NUMBER: &str = "sn";

pub const DETAIL_NAME: &str = "case_study_name";
pub const DETAIL_CATEGORY: &str = "case_study_category";
pub const DETAIL_METRIC_LABEL: &str = "metric_label_case_study";
pub const SOLUTION_INTRO: &str = "solution_intro";

/// Which sentinel a token falls back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Text,
    Image,
    Logo,
}

pub fn name(n: usize) -> String {
    format!("case_study_{n}_name")
}

pub fn title(n: usize) -> String {
    format!("case_study_{n}_title")
}

pub fn description(n: usize) -> String {
    format!("case_study_{n}_description")
}

pub fn image(n: usize) -> String {
    format!("case_study_{n}_image")
}

pub fn category(n: usize) -> String {
    format!("case_study_{n}_category")
}

pub fn metric(n: usize) -> String {
    format!("n{n}")
}

pub fn metric_label(n: usize) -> String {
    format!("metric_label_case_study_{n}")
}

pub fn tab_label(n: usize) -> String {
    format!("tab_{n}_label")
}

pub fn logo(n: usize) -> String {
    format!("logo{n}")
}

pub fn challenge(n: usize, x: usize) -> String {
    format!("case_study_{n}_challenge_{x}")
}

pub fn solution(n: usize, x: usize) -> String {
    format!("case_study_{n}_solution_{x}")
}

pub fn impact(n: usize, x: usize) -> String {
    format!("case_study_{n}_impact_{x}")
}

/// Every token the template may reference, with its fallback kind.
pub fn expected() -> Vec<(String, TokenKind)> {
    let mut keys = Vec::with_capacity(SLOTS * 20 + 20);

    for key in [SUBTITLE, FOUR_CASES_TITLE, SLIDES_TITLE, COMPANY_NAME, COMPANY_DESCRIPTION, GENERATION_DATE] {
        keys.push((key.to_string(), TokenKind::Text));
    }

    for n in 1..=SLOTS {
        for key in [name(n), title(n), description(n), category(n), metric(n), metric_label(n), tab_label(n)] {
            keys.push((key, TokenKind::Text));
        }
        keys.push((image(n), TokenKind::Image));
        keys.push((logo(n), TokenKind::Logo));
        keys.extend((1..=MAX_CHALLENGES).map(|x| (challenge(n, x), TokenKind::Text)));
        keys.extend((1..=MAX_SOLUTIONS).map(|x| (solution(n, x), TokenKind::Text)));
        keys.extend((1..=MAX_IMPACTS).map(|x| (impact(n, x), TokenKind::Text)));
    }

    for key in [DETAIL_NAME, DETAIL_CATEGORY, DETAIL_METRIC_LABEL, SOLUTION_INTRO] {
        keys.push((key.to_string(), TokenKind::Text));
    }
    keys.extend((1..=MAX_CHALLENGES).map(|x| (format!("challenge_{x}"), TokenKind::Text)));
    keys.extend((1..=MAX_SOLUTIONS).map(|x| (format!("solution_{x}"), TokenKind::Text)));
    keys.extend((1..=MAX_IMPACTS).map(|x| (format!("impact_{x}"), TokenKind::Text)));

    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_expected_keys_are_unique() {
        let keys = expected();
        let unique: HashSet<&str> = keys.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(unique.len(), keys.len());
        assert_eq!(keys.len(), 6 + SLOTS * 19 + 4 + 10);
        assert!(keys.contains(&("logo3".to_string(), TokenKind::Logo)));
        assert!(keys.contains(&("case_study_2_image".to_string(), TokenKind::Image)));
        assert!(keys.contains(&("solution_4".to_string(), TokenKind::Text)));
    }
}
