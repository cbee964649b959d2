use log::{debug, info};

use crate::config::*;
use crate::general::general_classification;
use crate::Snapshot;

/// True when at least one entrant, in any category, has a time for every
/// stage of the event.
pub fn event_completed(snapshot: &Snapshot) -> bool {
    let num_stages = snapshot.stage_count();
    if num_stages == 0 {
        return false;
    }
    snapshot
        .entrants
        .iter()
        .any(|e| (1..=num_stages).all(|stage| e.has_time(stage)))
}

/// The winner of each category over the whole event, with their position in
/// the overall classification.
///
/// Returns `None` until somebody completed every stage: no partial winners
/// are published.
pub fn category_winners(snapshot: &Snapshot) -> Option<Vec<CategoryWinner>> {
    if !event_completed(snapshot) {
        debug!("category_winners: no entrant completed every stage yet");
        return None;
    }
    let num_stages = snapshot.stage_count();
    let overall = general_classification(snapshot, &Scope::Overall, num_stages);

    let mut winners: Vec<CategoryWinner> = Vec::new();
    for category in snapshot.categories() {
        let gc = general_classification(snapshot, &Scope::Category(category.to_string()), num_stages);
        if let Some(first) = gc.results.first() {
            let overall_position = overall
                .results
                .iter()
                .find(|r| r.name == first.name && r.category == first.category)
                .map(|r| r.position);
            info!(
                "category_winners: {}: {} (overall position {:?})",
                category, first.name, overall_position
            );
            winners.push(CategoryWinner {
                category: category.to_string(),
                name: first.name.clone(),
                total: first.total,
                had_dnf: first.had_dnf,
                overall_position,
            });
        }
    }
    Some(winners)
}
