use log::{debug, info};

use crate::config::*;
use crate::general::{general_classification, general_classification_by_category};
use crate::itinerary::{itinerary, StageListing};
use crate::roster::{roster_by_category, RosterGroup};
use crate::stage::{stage_classification, stage_classification_by_category};
use crate::start_order::start_order;
use crate::validation::check_consistency;
use crate::winners::category_winners;
use crate::Snapshot;

/// The classifications after one stage.
#[derive(PartialEq, Debug, Clone)]
pub struct StageReport {
    pub stage: u32,
    pub overall: StageClassification,
    /// Empty unless the classifications by category were requested.
    pub by_category: Vec<StageClassification>,
    pub general: GeneralClassification,
    pub general_by_category: Vec<GeneralClassification>,
}

/// Everything that is published about an event for one snapshot.
#[derive(PartialEq, Debug, Clone)]
pub struct EventReport {
    pub event_name: Option<String>,
    pub itinerary: Vec<StageListing>,
    pub stages: Vec<StageReport>,
    /// Only present once somebody completed every stage.
    pub winners: Option<Vec<CategoryWinner>>,
    pub roster: Vec<RosterGroup>,
    pub start_order: Vec<ScheduleEntry>,
}

fn stage_report(snapshot: &Snapshot, stage: u32, by_category: bool) -> StageReport {
    let overall = stage_classification(snapshot, &Scope::Overall, stage);
    let general = general_classification(snapshot, &Scope::Overall, stage);
    let (by_cat, general_by_cat) = if by_category {
        (
            stage_classification_by_category(snapshot, stage),
            general_classification_by_category(snapshot, stage),
        )
    } else {
        (Vec::new(), Vec::new())
    };
    debug!(
        "stage_report: stage {}: {} classified on the stage, {} in the general",
        stage,
        overall.results.len(),
        general.results.len()
    );
    StageReport {
        stage,
        overall,
        by_category: by_cat,
        general,
        general_by_category: general_by_cat,
    }
}

/// Computes the full report of a snapshot.
///
/// Fails without computing anything when the stage list and the results
/// sheet disagree.
pub fn build_report(snapshot: &Snapshot, options: &ReportOptions) -> Result<EventReport, ConsistencyError> {
    info!(
        "Building report for {:?}: {} stages, {} entrants, options: {:?}",
        snapshot.event_name,
        snapshot.stage_count(),
        snapshot.entrants.len(),
        options
    );
    check_consistency(snapshot)?;

    let stage_numbers: Vec<u32> = match options.stage {
        Some(n) if n >= 1 && n <= snapshot.stage_count() => vec![n],
        Some(n) => {
            info!("build_report: stage {} is not part of the event", n);
            Vec::new()
        }
        None => (1..=snapshot.stage_count()).collect(),
    };
    let stages: Vec<StageReport> = stage_numbers
        .iter()
        .map(|n| stage_report(snapshot, *n, options.by_category))
        .collect();

    let winners = category_winners(snapshot);
    info!(
        "build_report: {} stage reports, winners: {:?}",
        stages.len(),
        winners.as_ref().map(|w| w.len())
    );

    Ok(EventReport {
        event_name: snapshot.event_name.clone(),
        itinerary: itinerary(snapshot),
        stages,
        winners,
        roster: roster_by_category(&snapshot.roster),
        start_order: start_order(&snapshot.schedule).into_iter().cloned().collect(),
    })
}
