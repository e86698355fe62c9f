use std::{collections::HashMap, fmt};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::Phase;
use crate::log_debug;

const ENABLE_LOGS: bool = true;

/// Which edge of a phase's time window is referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Boundary {
    Beginning,
    End,
}

impl Boundary {
    pub fn as_str(&self) -> &'static str {
        match self {
            Boundary::Beginning => "BEGINNING_DATETIME",
            Boundary::End => "END_DATETIME",
        }
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `(campaign code, phase label, boundary)`.
///
/// Kept as separate fields rather than a joined string so that codes or
/// labels containing `-` cannot collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhaseKey {
    pub campaign: String,
    pub phase: String,
    pub boundary: Boundary,
}

impl PhaseKey {
    pub fn new(campaign: &str, phase: &str, boundary: Boundary) -> Self {
        Self {
            campaign: campaign.to_string(),
            phase: phase.to_string(),
            boundary,
        }
    }
}

impl fmt::Display for PhaseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.campaign, self.phase, self.boundary)
    }
}

/// Immutable snapshot of every phase boundary, built in one pass over the
/// phase table. Never mutated after `build`; a refresh builds a new one.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PhaseTimeCache {
    entries: HashMap<PhaseKey, DateTime<Utc>>,
}

impl PhaseTimeCache {
    /// When two phases of a campaign share a label, the one listed last wins.
    pub fn build(phases: &[Phase]) -> Self {
        let mut entries = HashMap::with_capacity(phases.len() * 2);

        for phase in phases {
            entries.insert(
                PhaseKey::new(&phase.campaign_code, &phase.label, Boundary::Beginning),
                phase.starting_date,
            );
            entries.insert(
                PhaseKey::new(&phase.campaign_code, &phase.label, Boundary::End),
                phase.ending_date,
            );

            log_debug!(
                "  -> Added '{}-{}' = '{}/{}'.",
                phase.campaign_code,
                phase.label,
                phase.starting_date,
                phase.ending_date
            );
        }

        Self { entries }
    }

    pub fn get(&self, campaign: &str, phase: &str, boundary: Boundary) -> Option<DateTime<Utc>> {
        self.entries
            .get(&PhaseKey::new(campaign, phase, boundary))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::at;

    fn phase(campaign: &str, label: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Phase {
        Phase {
            id: 0,
            campaign_code: campaign.into(),
            label: label.into(),
            order_num: 0,
            starting_date: start,
            ending_date: end,
            phase_type_code: None,
        }
    }

    #[test]
    fn stores_both_boundaries_of_each_phase() {
        let cache = PhaseTimeCache::build(&[
            phase("A", "VOTE", at(2021, 6, 16), at(2021, 9, 16)),
            phase("A", "RESULTS", at(2021, 9, 17), at(2021, 12, 31)),
        ]);

        assert_eq!(cache.len(), 4);
        assert_eq!(cache.get("A", "VOTE", Boundary::Beginning), Some(at(2021, 6, 16)));
        assert_eq!(cache.get("A", "VOTE", Boundary::End), Some(at(2021, 9, 16)));
        assert_eq!(cache.get("A", "RESULTS", Boundary::End), Some(at(2021, 12, 31)));
        assert_eq!(cache.get("B", "VOTE", Boundary::End), None);
    }

    #[test]
    fn no_phases_gives_an_empty_cache() {
        let cache = PhaseTimeCache::build(&[]);
        assert!(cache.is_empty());
        assert_eq!(cache.get("A", "VOTE", Boundary::Beginning), None);
    }

    #[test]
    fn dashes_in_codes_do_not_collide() {
        let cache = PhaseTimeCache::build(&[
            phase("A-B", "C", at(2021, 1, 1), at(2021, 1, 2)),
            phase("A", "B-C", at(2022, 1, 1), at(2022, 1, 2)),
        ]);

        assert_eq!(cache.get("A-B", "C", Boundary::Beginning), Some(at(2021, 1, 1)));
        assert_eq!(cache.get("A", "B-C", Boundary::Beginning), Some(at(2022, 1, 1)));
    }

    #[test]
    fn later_duplicate_label_wins() {
        let cache = PhaseTimeCache::build(&[
            phase("A", "VOTE", at(2021, 1, 1), at(2021, 2, 1)),
            phase("A", "VOTE", at(2021, 3, 1), at(2021, 4, 1)),
        ]);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("A", "VOTE", Boundary::Beginning), Some(at(2021, 3, 1)));
    }

    #[test]
    fn key_renders_as_dash_joined_string() {
        let key = PhaseKey::new("A", "VOTE", Boundary::End);
        assert_eq!(key.to_string(), "A-VOTE-END_DATETIME");
    }
}
