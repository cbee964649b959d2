mod config;
pub mod builder;
pub mod general;
pub mod itinerary;
pub mod manual;
pub mod records;
mod report;
pub mod roster;
pub mod stage;
pub mod start_order;
pub mod time_codec;
pub mod validation;
pub mod winners;

use log::{debug, info};

use std::collections::BTreeMap;

pub use crate::config::*;
pub use crate::report::*;

use crate::records::Table;

/// Everything read from the sheets during one refresh cycle.
///
/// A snapshot is never modified once built: a new cycle builds a new one.
/// The entrants are grouped by category at construction, and every
/// classification reuses that grouping.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Snapshot {
    pub event_name: Option<String>,
    pub stages: Vec<StageDefinition>,
    pub entrants: Vec<Entrant>,
    /// The stage numbers of the `SS<n>` columns found in the results sheet.
    pub result_columns: Vec<u32>,
    pub roster: Vec<RosterEntry>,
    pub schedule: Vec<ScheduleEntry>,
    // Category name -> indices in `entrants`, in sheet order.
    categories: BTreeMap<String, Vec<usize>>,
}

impl Snapshot {
    pub fn new(
        stages: Vec<StageDefinition>,
        entrants: Vec<Entrant>,
        result_columns: Vec<u32>,
        roster: Vec<RosterEntry>,
        schedule: Vec<ScheduleEntry>,
    ) -> Snapshot {
        let mut categories: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (idx, e) in entrants.iter().enumerate() {
            categories.entry(e.category.clone()).or_default().push(idx);
        }
        info!(
            "Snapshot: {} stages, {} entrants in {} categories, {} roster entries, {} schedule entries",
            stages.len(),
            entrants.len(),
            categories.len(),
            roster.len(),
            schedule.len()
        );
        for (cat, idxs) in categories.iter() {
            debug!("Snapshot: category {}: {} entrants", cat, idxs.len());
        }
        Snapshot {
            event_name: None,
            stages,
            entrants,
            result_columns,
            roster,
            schedule,
            categories,
        }
    }

    /// Builds a snapshot from the parsed sheets. The roster and the start
    /// order are optional sheets.
    pub fn from_tables(
        stages: &Table,
        results: &Table,
        roster: Option<&Table>,
        schedule: Option<&Table>,
    ) -> Snapshot {
        Snapshot::new(
            stages.stage_definitions(),
            results.entrants(),
            results.stage_columns(),
            roster.map(|t| t.roster()).unwrap_or_default(),
            schedule.map(|t| t.schedule()).unwrap_or_default(),
        )
    }

    pub fn with_event_name(self, event_name: Option<String>) -> Snapshot {
        Snapshot { event_name, ..self }
    }

    /// Number of stages of the event, as declared by the stage list.
    pub fn stage_count(&self) -> u32 {
        self.stages.len() as u32
    }

    /// The definition of the stage with the given number.
    pub fn stage(&self, stage: u32) -> Option<&StageDefinition> {
        self.stages.iter().find(|s| s.ordinal() == Some(stage))
    }

    /// The category names, sorted.
    pub fn categories(&self) -> Vec<&str> {
        self.categories.keys().map(|s| s.as_str()).collect()
    }

    /// The entrants of the scope, in sheet order.
    pub fn entrants_in(&self, scope: &Scope) -> Vec<&Entrant> {
        match scope {
            Scope::Overall => self.entrants.iter().collect(),
            Scope::Category(c) => self
                .categories
                .get(c)
                .map(|idxs| idxs.iter().map(|idx| &self.entrants[*idx]).collect())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouping_by_category() {
        let results = Table::parse(
            "Nombre,Categoria,SS1\nAna,RC3,4:00.00\nBruno,RC2,4:01.00\nCarla,RC3,4:02.00\n",
        );
        let stages = Table::parse("PE,Desde,Hasta,KMS,HORA\n1,A,B,10,09:00\n");
        let snapshot = Snapshot::from_tables(&stages, &results, None, None);
        assert_eq!(snapshot.categories(), vec!["RC2", "RC3"]);
        let rc3: Vec<&str> = snapshot
            .entrants_in(&Scope::Category("RC3".to_string()))
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(rc3, vec!["Ana", "Carla"]);
        assert_eq!(snapshot.entrants_in(&Scope::Overall).len(), 3);
        assert!(snapshot
            .entrants_in(&Scope::Category("N1".to_string()))
            .is_empty());
        assert_eq!(snapshot.stage(1).map(|s| s.to_location.as_str()), Some("B"));
        assert_eq!(snapshot.stage(2), None);
        assert_eq!(snapshot.result_columns, vec![1]);
    }
}
