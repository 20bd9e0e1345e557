//! AI-driven case-study selection.
use serde::Deserialize;
use tracing::{info, warn};

use crate::ai::{prompts, ChatRequest, CompletionClient};
use crate::common::error::{Error, Result};
use crate::store::CaseStudyRecord;

/// Slots filled when every template slide is kept.
pub const FULL_DECK_CASES: usize = 4;

/// The records chosen for one request, in slot order.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionResult {
    pub records: Vec<CaseStudyRecord>,
    pub reasoning: String,
}

#[derive(Debug, Deserialize)]
struct SelectionReply {
    #[serde(default)]
    reasoning: String,
    selected_indices: Vec<i64>,
}

/// Number of records a presentation size needs; 0 means the full deck.
pub fn cases_for_size(size: usize) -> usize {
    if size == 0 { FULL_DECK_CASES } else { size }
}

/// Chooses records for a target company through a completion service.
pub struct Selector<'a, C: CompletionClient> {
    client: &'a C,
    model: &'a str,
}

impl<'a, C: CompletionClient> Selector<'a, C> {
    pub fn new(client: &'a C, model: &'a str) -> Self {
        Self { client, model }
    }

    /// Select `count` records for the company.
    ///
    /// Records with structured challenge/solution/impact data are preferred;
    /// all records are offered when too few of them exist.
    pub fn select(
        &self,
        records: &[CaseStudyRecord],
        company_name: &str,
        company_description: &str,
        count: usize,
    ) -> Result<SelectionResult> {
        let csi: Vec<&CaseStudyRecord> = records.iter().filter(|r| r.has_csi()).collect();
        let candidates = if csi.len() < count {
            warn!(
                with_csi = csi.len(),
                needed = count,
                "too few case studies with challenge/solution/impact data, offering all"
            );
            records.iter().collect()
        } else {
            info!(candidates = csi.len(), "offering case studies with challenge/solution/impact data");
            csi
        };

        if candidates.len() < count {
            return Err(Error::Data(format!(
                "need {} case studies but the catalog has {}",
                count,
                candidates.len()
            )));
        }

        let request = ChatRequest::new(self.model)
            .system(prompts::SELECTION_SYSTEM)
            .user(prompts::selection(&candidates, company_name, company_description, count))
            .json_schema("case_study_selection", prompts::selection_schema());
        let reply = self.client.complete(&request)?;

        let (indices, reasoning) = parse_selection(&reply, candidates.len(), count)?;
        info!(?indices, "case studies selected");

        Ok(SelectionResult {
            records: indices.into_iter().map(|i| candidates[i].clone()).collect(),
            reasoning,
        })
    }
}

/// Validate a selection reply against `len` candidates.
fn parse_selection(reply: &str, len: usize, count: usize) -> Result<(Vec<usize>, String)> {
    let parsed: SelectionReply = serde_json::from_str(reply)
        .map_err(|e| Error::MalformedResponse(format!("selection is not valid JSON: {}", e)))?;

    if parsed.selected_indices.len() != count {
        return Err(Error::MalformedResponse(format!(
            "expected {} selections, got {}",
            count,
            parsed.selected_indices.len()
        )));
    }

    let mut indices = Vec::with_capacity(count);
    for raw in parsed.selected_indices {
        let index = usize::try_from(raw)
            .ok()
            .filter(|&i| i < len)
            .ok_or_else(|| Error::MalformedResponse(format!("index {} is out of range", raw)))?;
        if indices.contains(&index) {
            return Err(Error::MalformedResponse(format!("index {} selected twice", index)));
        }
        indices.push(index);
    }
    Ok((indices, parsed.reasoning))
}
