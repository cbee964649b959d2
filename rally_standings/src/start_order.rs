//! The start order: when each entrant starts each stage.
//!
//! Start cells hold a wall-clock time (`09:15`) or `-` when the entrant does
//! not start that stage.

use std::collections::BTreeSet;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use chrono::{NaiveTime, Timelike};
use log::{debug, info};
use regex::Regex;

use crate::config::ScheduleEntry;

/// How long a changed start time stays highlighted.
pub const HIGHLIGHT_DURATION: Duration = Duration::from_secs(60);

fn clock_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{1,2}):(\d{2})").expect("clock regex"))
}

/// Minutes since midnight of the first `H:MM` found in the cell.
pub fn parse_start_minutes(cell: &str) -> Option<u32> {
    let cell = cell.trim();
    if cell.is_empty() || cell == "-" {
        return None;
    }
    let caps = clock_regex().captures(cell)?;
    let hours: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minutes: u32 = caps.get(2)?.as_str().parse().ok()?;
    Some(hours * 60 + minutes)
}

/// `HH:MM` text of a number of minutes since midnight.
pub fn format_start_minutes(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// The earliest start of the entrant over all the stages.
pub fn earliest_start(entry: &ScheduleEntry) -> Option<u32> {
    entry
        .stage_starts
        .values()
        .filter_map(|cell| parse_start_minutes(cell))
        .min()
}

/// The entrants sorted by earliest start. Entrants without any start time
/// come last, and ties keep the order of the sheet.
pub fn start_order(schedule: &[ScheduleEntry]) -> Vec<&ScheduleEntry> {
    let mut sorted: Vec<&ScheduleEntry> = schedule.iter().collect();
    sorted.sort_by_key(|e| match earliest_start(e) {
        Some(m) => (0, m),
        None => (1, 0),
    });
    sorted
}

/// The earliest start cell of a stage, as written in the sheet.
pub fn earliest_stage_start(schedule: &[ScheduleEntry], stage: u32) -> Option<&str> {
    let mut best: Option<(u32, &str)> = None;
    for e in schedule.iter() {
        let cell = e.start_cell(stage);
        if let Some(m) = parse_start_minutes(cell) {
            if best.map_or(true, |(bm, _)| m < bm) {
                best = Some((m, cell));
            }
        }
    }
    best.map(|(_, cell)| cell)
}

/// A start cell of the schedule.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd)]
pub struct CellRef {
    pub name: String,
    pub stage: u32,
}

pub type ChangeSet = BTreeSet<CellRef>;

/// The start cells that changed from the old schedule to the new one.
///
/// Only entrants present in both are compared. The cells are compared as
/// text: `9:05` replaced by `09:05` is a change.
pub fn detect_changes(new: &[ScheduleEntry], old: &[ScheduleEntry]) -> ChangeSet {
    let mut changes = ChangeSet::new();
    for n in new.iter() {
        let o = match old.iter().find(|o| o.name == n.name) {
            Some(o) => o,
            None => continue,
        };
        let stages: BTreeSet<u32> = n
            .stage_starts
            .keys()
            .chain(o.stage_starts.keys())
            .cloned()
            .collect();
        for stage in stages {
            if n.start_cell(stage) != o.start_cell(stage) {
                debug!(
                    "detect_changes: {} stage {}: {:?} -> {:?}",
                    n.name,
                    stage,
                    o.start_cell(stage),
                    n.start_cell(stage)
                );
                changes.insert(CellRef {
                    name: n.name.clone(),
                    stage,
                });
            }
        }
    }
    changes
}

/// Keeps the schedule of the previous cycle to highlight the start times
/// that changed.
///
/// Highlights stay active for [`HIGHLIGHT_DURATION`] after the cycle that
/// detected them, unless a later cycle detects new changes.
#[derive(Debug, Clone, Default)]
pub struct ChangeTracker {
    previous: Option<Vec<ScheduleEntry>>,
    highlights: ChangeSet,
    detected_at: Option<Instant>,
}

impl ChangeTracker {
    pub fn new() -> ChangeTracker {
        ChangeTracker::default()
    }

    /// Records the schedule of a new cycle and returns the active highlights.
    pub fn update(&mut self, schedule: &[ScheduleEntry], now: Instant) -> ChangeSet {
        if let Some(previous) = self.previous.as_deref() {
            let changes = detect_changes(schedule, previous);
            if !changes.is_empty() {
                info!("ChangeTracker: {} start times changed", changes.len());
                self.highlights = changes;
                self.detected_at = Some(now);
            }
        }
        self.previous = Some(schedule.to_vec());
        self.active(now)
    }

    /// The highlights still active at the given instant.
    pub fn active(&self, now: Instant) -> ChangeSet {
        match self.detected_at {
            Some(t) if now.saturating_duration_since(t) < HIGHLIGHT_DURATION => {
                self.highlights.clone()
            }
            _ => ChangeSet::new(),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Urgency {
    /// The start is in the current minute.
    Now,
    /// Within 5 minutes.
    Urgent,
    /// Within 15 minutes.
    Soon,
    Normal,
}

impl Urgency {
    pub fn from_minutes(minutes_until: u32) -> Urgency {
        match minutes_until {
            0 => Urgency::Now,
            1..=5 => Urgency::Urgent,
            6..=15 => Urgency::Soon,
            _ => Urgency::Normal,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct NextStart {
    pub name: String,
    pub category: String,
    pub stage: u32,
    /// The start cell, as written in the sheet.
    pub start: String,
    pub minutes_until: u32,
    /// Seconds left in the current minute, for a sub-minute countdown.
    pub seconds_left_in_minute: u32,
    pub urgency: Urgency,
}

/// The closest start at or after `now` over every entrant and stage.
/// Ties go to the first cell found, rows first, then stages in order.
pub fn next_start(schedule: &[ScheduleEntry], now: NaiveTime) -> Option<NextStart> {
    let now_minutes = now.hour() * 60 + now.minute();
    let mut best: Option<(u32, &ScheduleEntry, u32, &str)> = None;
    for e in schedule.iter() {
        for (stage, cell) in e.stage_starts.iter() {
            let start = match parse_start_minutes(cell) {
                Some(m) if m >= now_minutes => m,
                _ => continue,
            };
            let until = start - now_minutes;
            if best.map_or(true, |(b, _, _, _)| until < b) {
                best = Some((until, e, *stage, cell.as_str()));
            }
        }
    }
    best.map(|(minutes_until, e, stage, cell)| NextStart {
        name: e.name.clone(),
        category: e.category.clone(),
        stage,
        start: cell.to_string(),
        minutes_until,
        seconds_left_in_minute: (60 - now.second()) % 60,
        urgency: Urgency::from_minutes(minutes_until),
    })
}
