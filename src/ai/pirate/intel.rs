//! Intel reports (§4.8): a single-slot, per-base mailbox a scout fills
//! on returning from a successful espionage run and captains/fighters
//! of that base drain while it's still fresh.

use std::collections::HashMap;

use crate::config::INTEL_VALIDITY_MS;
use crate::world::ids::BaseId;
use crate::world::Vec2;

use super::super::action::ActionTarget;

#[derive(Debug, Clone, Copy)]
pub struct IntelReport {
    pub target: ActionTarget,
    pub target_pos: Vec2,
    pub is_base_target: bool,
    pub has_resources: bool,
    pub reported_at_ms: f64,
}

/// Newer reports overwrite older ones for the same base (§4.8).
#[derive(Default)]
pub struct IntelStore {
    reports: HashMap<BaseId, IntelReport>,
}

impl IntelStore {
    pub fn new() -> Self {
        IntelStore::default()
    }

    pub fn publish(&mut self, base_id: BaseId, report: IntelReport) {
        self.reports.insert(base_id, report);
    }

    /// Consumes and returns the report if it's still within
    /// `INTEL_VALIDITY_MS` of being reported; stale reports are dropped
    /// silently rather than ever handed to a caller.
    pub fn consume(&mut self, base_id: BaseId, now_ms: f64) -> Option<IntelReport> {
        let report = self.reports.remove(&base_id)?;
        if now_ms - report.reported_at_ms <= INTEL_VALIDITY_MS {
            Some(report)
        } else {
            None
        }
    }

    pub fn clear_base(&mut self, base_id: BaseId) {
        self.reports.remove(&base_id);
    }
}
