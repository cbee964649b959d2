pub use crate::config::*;

use std::collections::BTreeMap;

use crate::roster::derive_brand;
use crate::Snapshot;

/// A builder for assembling a snapshot without going through the sheets.
///
/// Stage times and start times are given in stage order: the first value is
/// for `SS1`, the second for `SS2`, and so on.
///
/// ```
/// use rally_standings::builder::Builder;
/// use rally_standings::{general::general_classification, Scope};
///
/// let snapshot = Builder::new()
///     .stage("1", "El Durazno", "Yacanto", "12.4")
///     .stage("2", "Yacanto", "El Durazno", "12.4")
///     .entrant("Ana Diaz", "RC2", &["8:01.10", "7:59.80"], "")
///     .entrant("Bruno Paz", "RC2", &["8:03.00", "DNF"], "0:10")
///     .build();
///
/// let gc = general_classification(&snapshot, &Scope::Overall, 2);
/// assert_eq!(gc.results[0].name, "Ana Diaz");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Builder {
    pub(crate) _event_name: Option<String>,
    pub(crate) _stages: Vec<StageDefinition>,
    pub(crate) _entrants: Vec<Entrant>,
    pub(crate) _roster: Vec<RosterEntry>,
    pub(crate) _schedule: Vec<ScheduleEntry>,
}

fn by_stage(values: &[&str]) -> BTreeMap<u32, String> {
    values
        .iter()
        .enumerate()
        .map(|(idx, v)| ((idx + 1) as u32, v.trim().to_string()))
        .collect()
}

impl Builder {
    pub fn new() -> Builder {
        Builder::default()
    }

    pub fn event_name(self, name: &str) -> Builder {
        Builder {
            _event_name: Some(name.to_string()),
            ..self
        }
    }

    /// Adds a stage to the itinerary.
    pub fn stage(mut self, number: &str, from: &str, to: &str, distance_km: &str) -> Builder {
        self._stages.push(StageDefinition {
            stage_number: number.to_string(),
            from_location: from.to_string(),
            to_location: to.to_string(),
            distance_km: distance_km.to_string(),
            scheduled_time: "".to_string(),
        });
        self
    }

    /// Adds a line to the results.
    pub fn entrant(mut self, name: &str, category: &str, times: &[&str], penalty: &str) -> Builder {
        self._entrants.push(Entrant {
            name: name.to_string(),
            category: category.to_string(),
            stage_times: by_stage(times),
            penalty: penalty.to_string(),
        });
        self
    }

    pub fn roster(mut self, number: &str, name: &str, vehicle: &str, category: &str) -> Builder {
        self._roster.push(RosterEntry {
            number: number.to_string(),
            name: name.to_string(),
            vehicle: vehicle.to_string(),
            brand: derive_brand(vehicle),
            category: category.to_string(),
        });
        self
    }

    /// Adds a line to the start order.
    pub fn schedule(mut self, name: &str, category: &str, starts: &[&str]) -> Builder {
        self._schedule.push(ScheduleEntry {
            name: name.to_string(),
            category: category.to_string(),
            stage_starts: by_stage(starts),
        });
        self
    }

    /// The time columns of the results are the ones used by the entrants.
    pub fn build(self) -> Snapshot {
        let mut result_columns: Vec<u32> = self
            ._entrants
            .iter()
            .flat_map(|e| e.stage_times.keys().cloned())
            .collect();
        result_columns.sort_unstable();
        result_columns.dedup();
        Snapshot::new(
            self._stages,
            self._entrants,
            result_columns,
            self._roster,
            self._schedule,
        )
        .with_event_name(self._event_name)
    }
}
