//! The itinerary: one listing per special stage, with its title, start time
//! and fastest entrant.

use log::debug;

use crate::config::*;
use crate::start_order::earliest_stage_start;
use crate::time_codec::parse_seconds;
use crate::Snapshot;

/// Upper case for the first letter of every word, lower case for the rest.
pub fn capitalize_words(text: &str) -> String {
    let mut res = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            res.push(c);
        } else if at_word_start {
            at_word_start = false;
            res.extend(c.to_uppercase());
        } else {
            res.extend(c.to_lowercase());
        }
    }
    res
}

/// Roman numeral for the first ten passes, decimal afterwards.
pub fn to_roman(n: usize) -> String {
    const ROMANS: [&str; 10] = ["I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X"];
    match n {
        1..=10 => ROMANS[n - 1].to_string(),
        _ => n.to_string(),
    }
}

/// How many times the route of the stage at `index` has been run so far,
/// this stage included. Routes are compared as written in the sheet.
pub fn repeat_count(stages: &[StageDefinition], index: usize) -> usize {
    let current = match stages.get(index) {
        Some(s) => s,
        None => return 0,
    };
    stages[..=index]
        .iter()
        .filter(|s| s.from_location == current.from_location && s.to_location == current.to_location)
        .count()
}

/// The title of the stage, e.g. "Yacanto - El Durazno (II)".
/// Stages without a start or end location have no title.
pub fn stage_title(stages: &[StageDefinition], index: usize) -> Option<String> {
    let s = stages.get(index)?;
    if s.from_location.is_empty() || s.to_location.is_empty() {
        return None;
    }
    Some(format!(
        "{} - {} ({})",
        capitalize_words(&s.from_location),
        capitalize_words(&s.to_location),
        to_roman(repeat_count(stages, index))
    ))
}

/// The fastest entrant of a stage, all categories together.
#[derive(PartialEq, Debug, Clone)]
pub struct StageWinner {
    pub name: String,
    pub category: String,
    pub time: Seconds,
    /// The time as written in the results sheet.
    pub raw_time: String,
}

/// The entrant with the smallest valid time on the stage. A DNF never wins
/// and the first entrant of the sheet wins a tie.
pub fn stage_winner(snapshot: &Snapshot, stage: u32) -> Option<StageWinner> {
    let mut best: Option<(Seconds, &Entrant)> = None;
    for e in snapshot.entrants.iter() {
        if let Some(t) = parse_seconds(e.raw_time(stage)) {
            if best.map_or(true, |(b, _)| t < b) {
                best = Some((t, e));
            }
        }
    }
    best.map(|(time, e)| StageWinner {
        name: e.name.clone(),
        category: e.category.clone(),
        time,
        raw_time: e.raw_time(stage).to_string(),
    })
}

#[derive(PartialEq, Debug, Clone)]
pub struct StageListing {
    /// The stage key, as written in the stage sheet.
    pub stage_number: String,
    pub title: Option<String>,
    pub distance_km: String,
    /// The earliest start of the stage in the start order, or the scheduled
    /// time of the stage sheet.
    pub start_time: String,
    pub winner: Option<StageWinner>,
}

/// The listing of every stage, in the order of the stage sheet.
pub fn itinerary(snapshot: &Snapshot) -> Vec<StageListing> {
    let stages = &snapshot.stages;
    stages
        .iter()
        .enumerate()
        .map(|(index, s)| {
            let ordinal = s.ordinal();
            let start_time = ordinal
                .and_then(|n| earliest_stage_start(&snapshot.schedule, n))
                .unwrap_or(s.scheduled_time.as_str())
                .to_string();
            let winner = ordinal.and_then(|n| stage_winner(snapshot, n));
            debug!(
                "itinerary: stage {:?} start {:?} winner {:?}",
                s.stage_number,
                start_time,
                winner.as_ref().map(|w| &w.name)
            );
            StageListing {
                stage_number: s.stage_number.clone(),
                title: stage_title(stages, index),
                distance_km: s.distance_km.clone(),
                start_time,
                winner,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;

    #[test]
    fn capitalize() {
        assert_eq!(capitalize_words("EL DURAZNO"), "El Durazno");
        assert_eq!(capitalize_words("san  josé de la DORMIDA"), "San  José De La Dormida");
        assert_eq!(capitalize_words(""), "");
    }

    #[test]
    fn roman_numerals() {
        assert_eq!(to_roman(1), "I");
        assert_eq!(to_roman(4), "IV");
        assert_eq!(to_roman(10), "X");
        assert_eq!(to_roman(11), "11");
    }

    #[test]
    fn titles_count_repeats() {
        let snapshot = Builder::new()
            .stage("1", "YACANTO", "EL DURAZNO", "12,4")
            .stage("2", "EL DURAZNO", "YACANTO", "12,4")
            .stage("3", "YACANTO", "EL DURAZNO", "12,4")
            .stage("4", "", "Super", "2")
            .build();
        let titles: Vec<Option<String>> = (0..4).map(|i| stage_title(&snapshot.stages, i)).collect();
        assert_eq!(
            titles,
            vec![
                Some("Yacanto - El Durazno (I)".to_string()),
                Some("El Durazno - Yacanto (I)".to_string()),
                Some("Yacanto - El Durazno (II)".to_string()),
                None,
            ]
        );
        assert_eq!(stage_title(&snapshot.stages, 9), None);
    }

    #[test]
    fn winner_over_the_whole_field() {
        let snapshot = Builder::new()
            .stage("1", "A", "B", "10")
            .entrant("Ana", "RC3", &["DNF"], "")
            .entrant("Bruno", "RC2", &["4:01.00"], "")
            .entrant("Carla", "N1", &["4:01,00"], "")
            .entrant("Dario", "RC2", &["xx"], "")
            .build();
        let w = stage_winner(&snapshot, 1).unwrap();
        assert_eq!((w.name.as_str(), w.category.as_str()), ("Bruno", "RC2"));
        assert_eq!(w.raw_time, "4:01.00");
        assert_eq!(w.time, Seconds(241.0));
        assert_eq!(stage_winner(&snapshot, 2), None);
    }

    #[test]
    fn start_time_from_schedule_or_sheet() {
        let mut snapshot = Builder::new()
            .stage("1", "A", "B", "10")
            .stage("2", "B", "A", "10")
            .schedule("Ana", "RC2", &["09:10", "-"])
            .schedule("Bruno", "RC2", &["9:05", ""])
            .build();
        snapshot.stages[1].scheduled_time = "11:00".to_string();
        let listing = itinerary(&snapshot);
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].start_time, "9:05");
        assert_eq!(listing[1].start_time, "11:00");
        assert_eq!(listing[0].title.as_deref(), Some("A - B (I)"));
        assert_eq!(listing[1].distance_km, "10");
        assert_eq!(listing[0].winner, None);
    }
}
