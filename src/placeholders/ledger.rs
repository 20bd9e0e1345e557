//! Per-presentation bookkeeping of images, metrics and logos.
use std::collections::HashSet;

use crate::store::CaseStudyRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Image,
    Metric,
    Logo,
}

/// Tracks which resources are spoken for in one presentation.
///
/// A value is *reserved* when one of the selected records owns it and
/// *assigned* once a slot has taken it. Lookups only offer values that are
/// neither.
#[derive(Debug, Clone, Default)]
pub struct ResourceLedger {
    reserved: HashSet<(Resource, String)>,
    assigned: HashSet<(Resource, String)>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the selected records' own images and real metrics.
    pub fn for_selection(selected: &[CaseStudyRecord]) -> Self {
        let mut ledger = Self::new();
        for record in selected {
            if record.has_image() {
                ledger.reserve(Resource::Image, &record.image_file);
            }
            if record.has_real_metric() {
                ledger.reserve(Resource::Metric, &record.metric);
            }
        }
        ledger
    }

    pub fn reserve(&mut self, kind: Resource, value: &str) {
        self.reserved.insert((kind, value.to_string()));
    }

    /// Assign `value` to the current slot; false when a slot already has it.
    pub fn claim(&mut self, kind: Resource, value: &str) -> bool {
        self.assigned.insert((kind, value.to_string()))
    }

    /// True when a lookup may offer `value`.
    pub fn is_free(&self, kind: Resource, value: &str) -> bool {
        let key = (kind, value.to_string());
        !self.reserved.contains(&key) && !self.assigned.contains(&key)
    }
}
