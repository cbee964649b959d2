//! Cumulative (general) classification through a given stage.

use log::debug;

use std::collections::HashMap;

use crate::config::*;
use crate::stage::{dnf_time, worst_valid_time};
use crate::time_codec::{is_dnf, parse_seconds};
use crate::Snapshot;

/// The penalty of the entrant. Anything that is not a valid time counts as no penalty.
pub fn penalty_time(entrant: &Entrant) -> Seconds {
    parse_seconds(&entrant.penalty).unwrap_or(Seconds::ZERO)
}

#[derive(Debug)]
struct Cumulative<'a> {
    entrant: &'a Entrant,
    stage_total: Seconds,
    penalty: Seconds,
    total: Seconds,
    had_dnf: bool,
}

// Worst valid times, per (category, stage). They are shared by all the
// entrants of a category that did not finish the same stage.
type WorstTimes<'a> = HashMap<(&'a str, u32), Seconds>;

/// Sum of the stage times from the first stage through `through_stage`.
///
/// Returns `None` if one of the times is missing or cannot be read. A DNF is
/// counted as the worst valid time of the entrant's category on that stage
/// plus one minute.
fn cumulative_time<'a>(
    snapshot: &Snapshot,
    entrant: &'a Entrant,
    through_stage: u32,
    worst_times: &mut WorstTimes<'a>,
) -> Option<(Seconds, bool)> {
    let mut total = Seconds::ZERO;
    let mut had_dnf = false;
    for stage in 1..=through_stage {
        let raw = entrant.raw_time(stage);
        if raw.is_empty() {
            return None;
        }
        if is_dnf(raw) {
            let worst = *worst_times
                .entry((entrant.category.as_str(), stage))
                .or_insert_with(|| {
                    worst_valid_time(snapshot, &Scope::Category(entrant.category.clone()), stage)
                });
            total += dnf_time(worst);
            had_dnf = true;
        } else {
            total += parse_seconds(raw)?;
        }
    }
    Some((total, had_dnf))
}

fn ranking<'a>(snapshot: &'a Snapshot, scope: &Scope, through_stage: u32) -> Vec<Cumulative<'a>> {
    let mut worst_times: WorstTimes = HashMap::new();
    let mut lines: Vec<Cumulative> = Vec::new();
    for e in snapshot.entrants_in(scope) {
        match cumulative_time(snapshot, e, through_stage, &mut worst_times) {
            Some((stage_total, had_dnf)) => {
                let penalty = penalty_time(e);
                lines.push(Cumulative {
                    entrant: e,
                    stage_total,
                    penalty,
                    total: stage_total + penalty,
                    had_dnf,
                });
            }
            None => {
                debug!(
                    "ranking: {} ({}) not classified through stage {}",
                    e.name, e.category, through_stage
                );
            }
        }
    }
    lines.sort_by(|a, b| a.total.total_cmp(&b.total));
    lines
}

/// Ranks the entrants of the scope by their total time (stages plus penalty)
/// through `through_stage`.
///
/// Entrants with a missing or unreadable time on any of these stages are left
/// out. The position change is computed against the same classification
/// through the previous stage.
pub fn general_classification(
    snapshot: &Snapshot,
    scope: &Scope,
    through_stage: u32,
) -> GeneralClassification {
    let current = ranking(snapshot, scope, through_stage);

    let previous: HashMap<(&str, &str), u32> = if through_stage > 1 {
        ranking(snapshot, scope, through_stage - 1)
            .iter()
            .enumerate()
            .map(|(idx, c)| {
                (
                    (c.entrant.name.as_str(), c.entrant.category.as_str()),
                    (idx + 1) as u32,
                )
            })
            .collect()
    } else {
        HashMap::new()
    };

    debug!(
        "general_classification: scope {} through stage {}: {} classified, {} previously",
        scope,
        through_stage,
        current.len(),
        previous.len()
    );

    let leader = current.first().map(|c| c.total).unwrap_or(Seconds::ZERO);
    let mut results: Vec<GeneralResult> = Vec::new();
    for (idx, c) in current.iter().enumerate() {
        let position = (idx + 1) as u32;
        let delta_to_previous = if idx > 0 {
            c.total - current[idx - 1].total
        } else {
            Seconds::ZERO
        };
        let position_change = previous
            .get(&(c.entrant.name.as_str(), c.entrant.category.as_str()))
            .map(|prev| *prev as i32 - position as i32);
        results.push(GeneralResult {
            position,
            name: c.entrant.name.clone(),
            category: c.entrant.category.clone(),
            stage_total: c.stage_total,
            penalty: c.penalty,
            total: c.total,
            had_dnf: c.had_dnf,
            delta_to_leader: c.total - leader,
            delta_to_previous,
            position_change,
        });
    }
    GeneralClassification {
        through_stage,
        scope: scope.clone(),
        results,
    }
}

/// The general classification of every category, in category order.
/// Categories with nobody classified are left out.
pub fn general_classification_by_category(
    snapshot: &Snapshot,
    through_stage: u32,
) -> Vec<GeneralClassification> {
    snapshot
        .categories()
        .into_iter()
        .map(|c| general_classification(snapshot, &Scope::Category(c.to_string()), through_stage))
        .filter(|gc| !gc.results.is_empty())
        .collect()
}
