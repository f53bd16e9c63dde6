//! Debounced status reporting.
//!
//! A service only shows as degraded once the same non-operational status
//! has been seen on enough consecutive polls. Recovery is reported at once.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use dotkit_core::{Result, atomic_write};

use crate::status::{ServiceReport, ServiceStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// What the widget currently shows.
    pub reported: ServiceStatus,
    /// Non-operational status waiting to be confirmed.
    pub pending: Option<ServiceStatus>,
    /// Consecutive polls `pending` has been observed.
    pub streak: u32,
}

impl Default for ServiceRecord {
    fn default() -> Self {
        Self {
            reported: ServiceStatus::Operational,
            pending: None,
            streak: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebounceState {
    #[serde(default)]
    pub services: BTreeMap<String, ServiceRecord>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DebounceState {
    /// Load the state file. A missing or corrupt file starts fresh.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read status state, starting fresh");
                return Self::default();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "corrupt status state, starting fresh");
            Self::default()
        })
    }

    pub fn save(&mut self, path: &Path, now: DateTime<Utc>) -> Result<()> {
        self.updated_at = Some(now);
        let json = serde_json::to_string_pretty(self)?;
        atomic_write(path, &json)
    }

    /// Record one observation and return the status to display.
    ///
    /// `cycles` is how many consecutive identical observations are needed
    /// before a non-operational status is shown; 0 and 1 both disable
    /// debouncing.
    pub fn observe(&mut self, service: &str, observed: ServiceStatus, cycles: u32) -> ServiceStatus {
        let record = self.services.entry(service.to_string()).or_default();

        if observed == ServiceStatus::Operational {
            if record.reported != ServiceStatus::Operational {
                info!(service, "service recovered");
            }
            *record = ServiceRecord::default();
            return record.reported;
        }

        if record.pending == Some(observed) {
            record.streak = record.streak.saturating_add(1);
        } else {
            record.pending = Some(observed);
            record.streak = 1;
        }

        if record.streak >= cycles.max(1) && record.reported != observed {
            info!(service, status = %observed, streak = record.streak, "status change confirmed");
            record.reported = observed;
        }
        record.reported
    }

    /// Debounce a whole poll in place and forget services no longer checked.
    pub fn apply(&mut self, reports: &mut [ServiceReport], cycles: u32) {
        for r in reports.iter_mut() {
            r.status = self.observe(&r.service.name, r.status, cycles);
        }
        self.services
            .retain(|name, _| reports.iter().any(|r| &r.service.name == name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ServiceStatus::*;

    #[test]
    fn test_single_blip_is_suppressed() {
        let mut state = DebounceState::default();
        assert_eq!(state.observe("GitHub", Degraded, 2), Operational);
        assert_eq!(state.observe("GitHub", Operational, 2), Operational);
        assert_eq!(state.observe("GitHub", Degraded, 2), Operational);
    }

    #[test]
    fn test_persistent_issue_is_reported() {
        let mut state = DebounceState::default();
        state.observe("GitHub", Degraded, 2);
        assert_eq!(state.observe("GitHub", Degraded, 2), Degraded);
        assert_eq!(state.observe("GitHub", Degraded, 2), Degraded);
        assert_eq!(state.services["GitHub"].streak, 3);
    }

    #[test]
    fn test_recovery_is_immediate() {
        let mut state = DebounceState::default();
        state.observe("Linear", Major, 2);
        state.observe("Linear", Major, 2);
        assert_eq!(state.observe("Linear", Operational, 2), Operational);
        assert_eq!(state.services["Linear"], ServiceRecord::default());
    }

    #[test]
    fn test_escalation_needs_its_own_streak() {
        let mut state = DebounceState::default();
        state.observe("AWS", Degraded, 2);
        state.observe("AWS", Degraded, 2);
        assert_eq!(state.observe("AWS", Major, 2), Degraded);
        assert_eq!(state.observe("AWS", Major, 2), Major);
    }

    #[test]
    fn test_cycles_one_disables_debounce() {
        let mut state = DebounceState::default();
        assert_eq!(state.observe("GCP", Unknown, 1), Unknown);
        let mut state = DebounceState::default();
        assert_eq!(state.observe("GCP", Unknown, 0), Unknown);
    }

    #[test]
    fn test_services_are_independent() {
        let mut state = DebounceState::default();
        state.observe("A", Degraded, 2);
        state.observe("B", Degraded, 2);
        assert_eq!(state.observe("A", Degraded, 2), Degraded);
        assert_eq!(state.services["B"].reported, Operational);
    }
}
