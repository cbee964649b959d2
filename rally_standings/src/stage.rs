//! Classification of a single stage.

use log::debug;

use crate::config::*;
use crate::time_codec::{is_dnf, parse_seconds, DNF_EXTRA};
use crate::Snapshot;

/// The worst valid time recorded on the stage by the entrants of the scope.
///
/// DNFs, empty and unparseable times are ignored. Returns zero when nobody
/// has a valid time. Both the stage and the general classifications derive
/// the time of a DNF from this value, so they always agree on it.
pub fn worst_valid_time(snapshot: &Snapshot, scope: &Scope, stage: u32) -> Seconds {
    worst_of(snapshot.entrants_in(scope).iter().copied(), stage)
}

fn worst_of<'a>(entrants: impl Iterator<Item = &'a Entrant>, stage: u32) -> Seconds {
    entrants
        .filter_map(|e| parse_seconds(e.raw_time(stage)))
        .fold(Seconds::ZERO, |worst, s| if s > worst { s } else { worst })
}

/// The time given to a DNF: one minute more than the worst valid time.
pub fn dnf_time(worst_valid: Seconds) -> Seconds {
    worst_valid + DNF_EXTRA
}

/// Average speed in km/h, rounded to the closest integer.
pub fn average_speed(time: Option<Seconds>, distance_km: Option<f64>) -> Option<i64> {
    match (time, distance_km) {
        (Some(Seconds(s)), Some(d)) if s > 0.0 && d > 0.0 => {
            Some((d / (s / 3600.0)).round() as i64)
        }
        _ => None,
    }
}

struct Line<'a> {
    entrant: &'a Entrant,
    time: Option<Seconds>,
    is_dnf: bool,
}

fn by_time(a: &Line<'_>, b: &Line<'_>) -> std::cmp::Ordering {
    // Missing times sort last.
    match (a.time, b.time) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    }
}

/// Ranks the entrants of the scope that have a time for this stage.
///
/// DNFs receive the worst valid time of the scope plus one minute, and are
/// ranked with it. Equal times keep the order of the sheet.
pub fn stage_classification(snapshot: &Snapshot, scope: &Scope, stage: u32) -> StageClassification {
    let mut lines: Vec<Line> = snapshot
        .entrants_in(scope)
        .into_iter()
        .filter(|e| e.has_time(stage))
        .map(|e| {
            let raw = e.raw_time(stage);
            Line {
                entrant: e,
                time: parse_seconds(raw),
                is_dnf: is_dnf(raw),
            }
        })
        .collect();
    lines.sort_by(by_time);

    let worst = worst_of(lines.iter().map(|l| l.entrant), stage);
    let substituted = dnf_time(worst);
    for line in lines.iter_mut().filter(|l| l.is_dnf) {
        line.time = Some(substituted);
    }
    lines.sort_by(by_time);

    debug!(
        "stage_classification: stage {} scope {}: {} lines, worst valid time {:?}",
        stage,
        scope,
        lines.len(),
        worst
    );

    let distance = snapshot.stage(stage).and_then(|s| s.distance());
    let best = lines.first().and_then(|l| l.time);
    let results = lines
        .iter()
        .enumerate()
        .map(|(idx, l)| StageResult {
            position: (idx + 1) as u32,
            name: l.entrant.name.clone(),
            category: l.entrant.category.clone(),
            time: l.time,
            is_dnf: l.is_dnf,
            delta_to_leader: match (l.time, best) {
                (Some(t), Some(b)) => Some(t - b),
                _ => None,
            },
            average_speed: average_speed(l.time, distance),
        })
        .collect();
    StageClassification {
        stage,
        scope: scope.clone(),
        results,
    }
}

/// The stage classification of every category, in category order.
/// Categories without any time on this stage are left out.
pub fn stage_classification_by_category(snapshot: &Snapshot, stage: u32) -> Vec<StageClassification> {
    snapshot
        .categories()
        .into_iter()
        .map(|c| stage_classification(snapshot, &Scope::Category(c.to_string()), stage))
        .filter(|sc| !sc.results.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;
    use crate::time_codec::format_seconds;

    fn names(sc: &StageClassification) -> Vec<&str> {
        sc.results.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn dnf_gets_worst_plus_one_minute() {
        let snapshot = Builder::new()
            .stage("1", "A", "B", "10")
            .entrant("Ana", "RC2", &["1:01.20"], "")
            .entrant("Bruno", "RC2", &["DNF"], "")
            .entrant("Carla", "RC2", &["1:15.00"], "")
            .build();
        let rc2 = Scope::Category("RC2".to_string());
        assert_eq!(worst_valid_time(&snapshot, &rc2, 1), Seconds(75.0));

        let sc = stage_classification(&snapshot, &rc2, 1);
        assert_eq!(names(&sc), vec!["Ana", "Carla", "Bruno"]);
        let times: Vec<f64> = sc.results.iter().filter_map(|r| r.time).map(|s| s.0).collect();
        assert_eq!(times.len(), 3);
        assert!((times[0] - 61.2).abs() < 1e-9);
        assert_eq!(times[1], 75.0);
        assert_eq!(times[2], 135.0);
        assert!(sc.results[2].is_dnf);
        assert_eq!(
            format_seconds(sc.results[2].delta_to_leader),
            "1:13.80"
        );
        assert_eq!(sc.results[0].delta_to_leader, Some(Seconds::ZERO));
    }

    #[test]
    fn dnf_can_rank_ahead_of_unparseable() {
        let snapshot = Builder::new()
            .stage("1", "A", "B", "")
            .entrant("Ana", "RC2", &["abc"], "")
            .entrant("Bruno", "RC2", &["dnf"], "")
            .build();
        let sc = stage_classification(&snapshot, &Scope::Overall, 1);
        assert_eq!(names(&sc), vec!["Bruno", "Ana"]);
        // Nobody has a valid time: the DNF gets one minute.
        assert_eq!(sc.results[0].time, Some(Seconds(60.0)));
        assert_eq!(sc.results[1].time, None);
        assert_eq!(sc.results[1].delta_to_leader, None);
        assert_eq!(sc.results[1].average_speed, None);
    }

    #[test]
    fn ties_keep_sheet_order() {
        let snapshot = Builder::new()
            .stage("1", "A", "B", "")
            .entrant("Ana", "RC2", &["4:00.00"], "")
            .entrant("Bruno", "RC3", &["3:59.00"], "")
            .entrant("Carla", "RC2", &["4:00.00"], "")
            .build();
        let sc = stage_classification(&snapshot, &Scope::Overall, 1);
        assert_eq!(names(&sc), vec!["Bruno", "Ana", "Carla"]);
        let positions: Vec<u32> = sc.results.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
    }

    #[test]
    fn missing_time_is_not_classified() {
        let snapshot = Builder::new()
            .stage("1", "A", "B", "")
            .stage("2", "B", "C", "")
            .stage("3", "C", "A", "")
            .entrant("Ana", "RC2", &["4:00.00", "", "5:00.00"], "")
            .entrant("Bruno", "RC2", &["4:10.00", "4:20.00", "5:10.00"], "")
            .build();
        let on = |stage| names(&stage_classification(&snapshot, &Scope::Overall, stage)).len();
        assert_eq!(on(1), 2);
        assert_eq!(on(2), 1);
        assert_eq!(on(3), 2);
    }

    #[test]
    fn average_speed_from_distance() {
        let snapshot = Builder::new()
            .stage("1", "A", "B", "12,5")
            .entrant("Ana", "RC2", &["7:30.00"], "")
            .entrant("Bruno", "RC2", &["DNF"], "")
            .build();
        let sc = stage_classification(&snapshot, &Scope::Overall, 1);
        // 12.5 km in 450 s
        assert_eq!(sc.results[0].average_speed, Some(100));
        // The DNF is given 510 s
        assert_eq!(sc.results[1].average_speed, Some(88));
        assert_eq!(average_speed(Some(Seconds(450.0)), None), None);
        assert_eq!(average_speed(None, Some(10.0)), None);
    }

    #[test]
    fn overall_worst_time_spans_categories() {
        let snapshot = Builder::new()
            .stage("1", "A", "B", "")
            .entrant("Ana", "RC2", &["4:00.00"], "")
            .entrant("Bruno", "RC3", &["5:00.00"], "")
            .entrant("Carla", "RC2", &["DNF"], "")
            .build();
        let overall = stage_classification(&snapshot, &Scope::Overall, 1);
        assert_eq!(overall.results[2].time, Some(Seconds(360.0)));
        let rc2 = stage_classification(&snapshot, &Scope::Category("RC2".to_string()), 1);
        assert_eq!(rc2.results[1].time, Some(Seconds(300.0)));
    }

    #[test]
    fn no_time_marker_is_not_the_worst_time() {
        let snapshot = Builder::new()
            .stage("1", "A", "B", "")
            .entrant("Ana", "RC2", &["4:00.00"], "")
            .entrant("Bruno", "RC2", &["277:46:39.00"], "")
            .entrant("Carla", "RC2", &["DNF"], "")
            .build();
        assert_eq!(worst_valid_time(&snapshot, &Scope::Overall, 1), Seconds(240.0));
        let sc = stage_classification(&snapshot, &Scope::Overall, 1);
        assert_eq!(names(&sc), vec!["Ana", "Carla", "Bruno"]);
        assert_eq!(format_seconds(sc.results[1].time), "5:00.00");
        assert_eq!(sc.results[2].time, None);
    }

    #[test]
    fn by_category_skips_empty_groups() {
        let snapshot = Builder::new()
            .stage("1", "A", "B", "")
            .stage("2", "B", "A", "")
            .entrant("Ana", "RC2", &["4:00.00", "4:00.00"], "")
            .entrant("Bruno", "RC3", &["5:00.00", ""], "")
            .build();
        let scs = stage_classification_by_category(&snapshot, 2);
        assert_eq!(scs.len(), 1);
        assert_eq!(scs[0].scope, Scope::Category("RC2".to_string()));
        assert_eq!(stage_classification_by_category(&snapshot, 1).len(), 2);
    }
}
