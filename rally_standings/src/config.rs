// ********* Input data structures ***********

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;
use std::ops::{Add, AddAssign, Sub};

/// A duration in seconds, with fractional hundredths.
///
/// A missing or unparseable time is represented as `Option::<Seconds>::None`
/// everywhere in the engine, never as a magic value.
#[derive(PartialEq, PartialOrd, Debug, Clone, Copy, Default)]
pub struct Seconds(pub f64);

impl Seconds {
    pub const ZERO: Seconds = Seconds(0.0);

    /// Total ordering used for the stable sorts of the classifications.
    pub fn total_cmp(&self, other: &Seconds) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Add for Seconds {
    type Output = Seconds;
    fn add(self: Seconds, rhs: Seconds) -> Seconds {
        Seconds(self.0 + rhs.0)
    }
}

impl AddAssign for Seconds {
    fn add_assign(&mut self, rhs: Seconds) {
        self.0 += rhs.0;
    }
}

impl Sub for Seconds {
    type Output = Seconds;
    fn sub(self: Seconds, rhs: Seconds) -> Seconds {
        Seconds(self.0 - rhs.0)
    }
}

impl std::iter::Sum for Seconds {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Seconds(iter.map(|s| s.0).sum())
    }
}

/// One special stage (PE) of the itinerary.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct StageDefinition {
    /// The key of the stage as written in the stage sheet, e.g. "3".
    pub stage_number: String,
    pub from_location: String,
    pub to_location: String,
    /// Distance as written in the sheet. It may be empty.
    pub distance_km: String,
    pub scheduled_time: String,
}

impl StageDefinition {
    /// The stage number as an integer, when the key is numeric.
    pub fn ordinal(&self) -> Option<u32> {
        self.stage_number.trim().parse::<u32>().ok()
    }

    /// The distance in kilometers, when it is a positive number.
    /// A comma is accepted as decimal separator.
    pub fn distance(&self) -> Option<f64> {
        let d = self.distance_km.trim().replace(',', ".");
        match d.parse::<f64>() {
            Ok(x) if x.is_finite() && x > 0.0 => Some(x),
            _ => None,
        }
    }
}

/// A line of the results sheet.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Entrant {
    pub name: String,
    pub category: String,
    /// Raw time strings, keyed by stage number (the `n` of the `SS<n>` column).
    pub stage_times: BTreeMap<u32, String>,
    /// Raw penalty time. It may be empty.
    pub penalty: String,
}

impl Entrant {
    /// The raw time recorded for the stage, or an empty string.
    pub fn raw_time(&self, stage: u32) -> &str {
        self.stage_times
            .get(&stage)
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    pub fn has_time(&self, stage: u32) -> bool {
        !self.raw_time(stage).is_empty()
    }
}

/// A line of the roster (registered entrants) sheet.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RosterEntry {
    pub number: String,
    pub name: String,
    pub vehicle: String,
    /// Derived from the vehicle, see [`crate::roster::derive_brand`].
    pub brand: String,
    pub category: String,
}

/// A line of the start-order sheet.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ScheduleEntry {
    pub name: String,
    pub category: String,
    /// Start time cells ("HH:MM" or "-"), keyed by stage number.
    pub stage_starts: BTreeMap<u32, String>,
}

impl ScheduleEntry {
    pub fn start_cell(&self, stage: u32) -> &str {
        self.stage_starts
            .get(&stage)
            .map(|s| s.as_str())
            .unwrap_or("")
    }
}

/// The group of entrants a classification is computed over.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum Scope {
    /// The whole field, all categories together.
    Overall,
    Category(String),
}

impl Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Overall => write!(f, "overall"),
            Scope::Category(c) => write!(f, "{}", c),
        }
    }
}

// ******** Output data structures *********

/// One line of a stage classification.
#[derive(PartialEq, Debug, Clone)]
pub struct StageResult {
    pub position: u32,
    pub name: String,
    pub category: String,
    /// The time used for the ranking. For a DNF this is the substituted time.
    pub time: Option<Seconds>,
    pub is_dnf: bool,
    pub delta_to_leader: Option<Seconds>,
    /// Average speed in km/h, rounded.
    pub average_speed: Option<i64>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct StageClassification {
    pub stage: u32,
    pub scope: Scope,
    pub results: Vec<StageResult>,
}

/// One line of a general (cumulative) classification.
#[derive(PartialEq, Debug, Clone)]
pub struct GeneralResult {
    pub position: u32,
    pub name: String,
    pub category: String,
    /// Sum of the stage times, without penalty.
    pub stage_total: Seconds,
    pub penalty: Seconds,
    pub total: Seconds,
    /// At least one stage was a DNF and received a substituted time.
    pub had_dnf: bool,
    pub delta_to_leader: Seconds,
    pub delta_to_previous: Seconds,
    /// Places gained (positive) or lost (negative) since the previous stage.
    pub position_change: Option<i32>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct GeneralClassification {
    pub through_stage: u32,
    pub scope: Scope,
    pub results: Vec<GeneralResult>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct CategoryWinner {
    pub category: String,
    pub name: String,
    pub total: Seconds,
    pub had_dnf: bool,
    /// Position in the whole-field general classification.
    pub overall_position: Option<u32>,
}

/// Errors that block the computation of the standings.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ConsistencyError {
    /// The results sheet has no entrant.
    NoEntrants,
    /// The stage list and the results sheet do not describe the same stages.
    StageCountMismatch {
        declared_stages: usize,
        time_columns: usize,
    },
}

impl Error for ConsistencyError {}

impl Display for ConsistencyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsistencyError::NoEntrants => write!(f, "No entrant data in the results sheet"),
            ConsistencyError::StageCountMismatch {
                declared_stages,
                time_columns,
            } => write!(
                f,
                "Data inconsistency: {} stages in the stage list but {} SS columns in the results sheet. \
                 The number of stages must match the number of SS columns.",
                declared_stages, time_columns
            ),
        }
    }
}

// ********* Configuration **********

/// Options controlling what goes into an [`crate::EventReport`].
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ReportOptions {
    /// Restricts the stage and general classifications to this stage.
    /// All the stages are reported when not provided.
    pub stage: Option<u32>,
    /// Also compute the classifications of every category.
    pub by_category: bool,
}

impl ReportOptions {
    pub const DEFAULT_OPTIONS: ReportOptions = ReportOptions {
        stage: None,
        by_category: true,
    };
}
