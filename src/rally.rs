use log::{debug, info, warn};

use rally_standings::records::Table;
use rally_standings::start_order::{
    earliest_start, format_start_minutes, next_start, ChangeSet, ChangeTracker,
};
use rally_standings::time_codec::{format_delta, format_seconds};
use rally_standings::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::rally::config_reader::*;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_xlsx;

#[derive(Debug, Snafu)]
pub enum RallyError {
    #[snafu(display("Error opening sheet {path}"))]
    OpeningSheet { source: csv::Error, path: String },
    #[snafu(display("Error reading record {record} of sheet {path}"))]
    ReadingCsvRecord {
        source: csv::Error,
        path: String,
        record: usize,
    },
    #[snafu(display("Error opening workbook {path}"))]
    OpeningWorkbook {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook {path} has no worksheet"))]
    EmptyWorkbook { path: String },
    #[snafu(display("The workbook {path} has no worksheet named {worksheet}"))]
    MissingWorksheet { path: String, worksheet: String },
    #[snafu(display("Error opening JSON file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("No parent directory for {path}"))]
    MissingParentDir { path: String },
    #[snafu(display("No {sheet} sheet: provide it in the configuration or with --{sheet}"))]
    MissingSheet { sheet: String },

    #[snafu(display("{source}"))]
    Inconsistent { source: ConsistencyError },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type RallyResult<T> = Result<T, RallyError>;

fn read_sheet(root: &Path, source: &SheetSource) -> RallyResult<Table> {
    let path = io_common::resolve_path(root, &source.file_path);
    info!("read_sheet: {:?} ({})", path, source.provider);
    match source.provider()? {
        Provider::Csv => io_csv::read_csv_table(&path),
        Provider::Xlsx => io_xlsx::read_xlsx_table(&path, source.worksheet_name.as_deref()),
    }
}

fn read_optional_sheet(root: &Path, source: &Option<SheetSource>) -> RallyResult<Option<Table>> {
    match source {
        Some(s) => read_sheet(root, s).map(Some),
        None => Ok(None),
    }
}

/// Reads all the sheets of the configuration into a snapshot.
pub fn read_snapshot(config: &RallyConfig, root: &Path) -> RallyResult<Snapshot> {
    let stages_source = config
        .sheets
        .stages
        .as_ref()
        .context(MissingSheetSnafu { sheet: "stages" })?;
    let results_source = config
        .sheets
        .results
        .as_ref()
        .context(MissingSheetSnafu { sheet: "results" })?;

    let stages = read_sheet(root, stages_source)?;
    let results = read_sheet(root, results_source)?;
    let roster = read_optional_sheet(root, &config.sheets.roster)?;
    let schedule = read_optional_sheet(root, &config.sheets.schedule)?;
    let event = read_optional_sheet(root, &config.sheets.event)?;

    let event_name = event
        .and_then(|t| t.event_name())
        .or_else(|| config.output_settings().event_name);

    let snapshot = Snapshot::from_tables(&stages, &results, roster.as_ref(), schedule.as_ref())
        .with_event_name(event_name);
    Ok(snapshot)
}

fn stage_results_to_json(sc: &StageClassification) -> Vec<JSValue> {
    sc.results
        .iter()
        .map(|r| {
            let time = if r.is_dnf {
                "DNF".to_string()
            } else {
                format_seconds(r.time)
            };
            json!({
                "position": r.position,
                "name": r.name,
                "category": r.category,
                "time": time,
                "gap": r.delta_to_leader.map(format_delta).unwrap_or_else(|| "-".to_string()),
                "speed": r.average_speed,
            })
        })
        .collect()
}

fn general_results_to_json(gc: &GeneralClassification) -> Vec<JSValue> {
    gc.results
        .iter()
        .map(|r| {
            let penalty = if r.penalty == Seconds::ZERO {
                "-".to_string()
            } else {
                format_seconds(Some(r.penalty))
            };
            json!({
                "position": r.position,
                "name": r.name,
                "category": r.category,
                "stageTotal": format_seconds(Some(r.stage_total)),
                "penalty": penalty,
                "total": format_seconds(Some(r.total)),
                "dnf": r.had_dnf,
                "gapToLeader": format_delta(r.delta_to_leader),
                "gapToPrevious": format_delta(r.delta_to_previous),
                "positionChange": r.position_change,
            })
        })
        .collect()
}

fn stage_report_to_json(sr: &StageReport) -> JSValue {
    let mut by_category: JSMap<String, JSValue> = JSMap::new();
    for sc in sr.by_category.iter() {
        by_category.insert(sc.scope.to_string(), json!(stage_results_to_json(sc)));
    }
    let mut general_by_category: JSMap<String, JSValue> = JSMap::new();
    for gc in sr.general_by_category.iter() {
        general_by_category.insert(gc.scope.to_string(), json!(general_results_to_json(gc)));
    }
    json!({
        "stage": sr.stage,
        "overall": stage_results_to_json(&sr.overall),
        "byCategory": by_category,
        "general": general_results_to_json(&sr.general),
        "generalByCategory": general_by_category,
    })
}

/// The JSON summary of a report. Only display strings go into it, so that
/// it can be compared with a reference summary.
fn build_summary_js(report: &EventReport, changed_starts: &ChangeSet) -> JSValue {
    let itinerary: Vec<JSValue> = report
        .itinerary
        .iter()
        .map(|l| {
            json!({
                "stage": l.stage_number,
                "title": l.title,
                "distance": l.distance_km,
                "start": l.start_time,
                "winner": l.winner.as_ref().map(|w| json!({
                    "name": w.name,
                    "category": w.category,
                    "time": w.raw_time,
                })),
            })
        })
        .collect();

    let stages: Vec<JSValue> = report.stages.iter().map(stage_report_to_json).collect();

    let winners: Option<Vec<JSValue>> = report.winners.as_ref().map(|ws| {
        ws.iter()
            .map(|w| {
                json!({
                    "category": w.category,
                    "name": w.name,
                    "total": format_seconds(Some(w.total)),
                    "dnf": w.had_dnf,
                    "overallPosition": w.overall_position,
                })
            })
            .collect()
    });

    let roster: Vec<JSValue> = report
        .roster
        .iter()
        .map(|g| {
            let entries: Vec<JSValue> = g
                .entries
                .iter()
                .map(|e| {
                    json!({
                        "number": e.number,
                        "name": e.name,
                        "vehicle": e.vehicle,
                        "brand": e.brand,
                    })
                })
                .collect();
            json!({
                "category": g.category,
                "colorSlot": g.color_slot,
                "count": g.entries.len(),
                "entries": entries,
            })
        })
        .collect();

    let start_order: Vec<JSValue> = report
        .start_order
        .iter()
        .map(|e| {
            let mut starts: JSMap<String, JSValue> = JSMap::new();
            for (stage, cell) in e.stage_starts.iter() {
                starts.insert(stage.to_string(), json!(cell));
            }
            json!({
                "name": e.name,
                "category": e.category,
                "earliest": earliest_start(e).map(format_start_minutes),
                "starts": starts,
            })
        })
        .collect();

    let changed: Vec<JSValue> = changed_starts
        .iter()
        .map(|c| json!({"name": c.name, "stage": c.stage}))
        .collect();

    json!({
        "event": report.event_name,
        "itinerary": itinerary,
        "stages": stages,
        "winners": winners,
        "roster": roster,
        "startOrder": start_order,
        "changedStarts": changed,
    })
}

/// One refresh: reads the sheets, computes the report and its summary.
///
/// A snapshot whose stage list and results disagree produces no summary.
pub fn run_cycle(
    config: &RallyConfig,
    root: &Path,
    tracker: &mut ChangeTracker,
    now: Instant,
) -> RallyResult<JSValue> {
    let snapshot = read_snapshot(config, root)?;
    let options = config.options().report_options();
    let report = build_report(&snapshot, &options).context(InconsistentSnafu {})?;
    let changed_starts = tracker.update(&snapshot.schedule, now);
    log_next_start(&snapshot.schedule);
    Ok(build_summary_js(&report, &changed_starts))
}

fn write_summary(summary: &JSValue, out: &Option<String>) -> RallyResult<()> {
    let pretty = serde_json::to_string_pretty(summary).context(ParsingJsonSnafu {})?;
    match out.as_deref() {
        None | Some("stdout") | Some("") => println!("{}", pretty),
        Some(path) => {
            fs::write(path, pretty).context(WritingSummarySnafu { path })?;
            info!("write_summary: summary written to {}", path);
        }
    }
    Ok(())
}

fn check_reference(summary: &JSValue, reference_path: &str) -> RallyResult<()> {
    let summary_ref = read_summary(reference_path)?;
    if summary_ref != *summary {
        let pretty_ref = serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        let pretty = serde_json::to_string_pretty(summary).context(ParsingJsonSnafu {})?;
        warn!("Found differences with the reference summary");
        print_diff(pretty_ref.as_str(), pretty.as_str(), "\n");
        whatever!("Difference detected between calculated summary and reference summary")
    }
    Ok(())
}

fn log_next_start(schedule: &[ScheduleEntry]) {
    let now = chrono::Local::now().time();
    match next_start(schedule, now) {
        Some(n) => info!(
            "Next start: {} ({}) stage {} at {} in {} min ({:?})",
            n.name, n.category, n.stage, n.start, n.minutes_until, n.urgency
        ),
        None => debug!("No start left today"),
    }
}

/// The configuration of the run: the configuration file if any, with the
/// sheets and options of the command line on top. Returns it with the
/// directory the sheet paths are relative to.
pub fn resolve_config(args: &Args) -> RallyResult<(RallyConfig, PathBuf)> {
    let (mut config, root) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path)
                .parent()
                .context(MissingParentDirSnafu { path: config_path })?
                .to_path_buf();
            (config, root)
        }
        None => (RallyConfig::empty(), PathBuf::new()),
    };
    let from_arg = |p: &Option<String>| p.as_deref().map(SheetSource::from_path);
    if let Some(s) = from_arg(&args.stages) {
        config.sheets.stages = Some(s);
    }
    if let Some(s) = from_arg(&args.results) {
        config.sheets.results = Some(s);
    }
    if let Some(s) = from_arg(&args.roster) {
        config.sheets.roster = Some(s);
    }
    if let Some(s) = from_arg(&args.schedule) {
        config.sheets.schedule = Some(s);
    }
    if args.stage.is_some() {
        let mut options = config.options();
        options.stage = args.stage;
        config.options = Some(options);
    }
    Ok((config, root))
}

/// The refresh interval of the watch mode, if any. A reference summary only
/// makes sense for a single run.
fn watch_interval(args: &Args, settings: &OutputSettings) -> RallyResult<Option<Duration>> {
    let interval = args
        .watch
        .or(settings.poll_interval)
        .map(|secs| Duration::from_secs(secs.max(1)));
    if interval.is_some() && args.reference.is_some() {
        whatever!("--reference cannot be used when watching the sheets")
    }
    Ok(interval)
}

/// One cycle of the watch mode. Errors are logged and the next cycle tries
/// again. Returns true if a summary was published.
fn watch_cycle(
    config: &RallyConfig,
    root: &Path,
    tracker: &mut ChangeTracker,
    out: &Option<String>,
) -> bool {
    let summary = match run_cycle(config, root, tracker, Instant::now()) {
        Ok(summary) => summary,
        Err(RallyError::Inconsistent { source }) => {
            warn!("Not publishing this cycle: {}", source);
            eprintln!("{}", source);
            return false;
        }
        Err(e) => {
            warn!("Error reading the sheets: {}", e);
            return false;
        }
    };
    match write_summary(&summary, out) {
        Ok(()) => true,
        Err(e) => {
            warn!("Error publishing the summary: {}", e);
            false
        }
    }
}

pub fn run_rally(args: &Args) -> RallyResult<()> {
    let (config, root) = resolve_config(args)?;
    info!("config: {:?}", config);
    let settings = config.output_settings();
    let interval = watch_interval(args, &settings)?;
    let out = args.out.clone().or(settings.output_path);
    let mut tracker = ChangeTracker::new();

    let interval = match interval {
        Some(interval) => interval,
        None => {
            let summary = run_cycle(&config, &root, &mut tracker, Instant::now())?;
            write_summary(&summary, &out)?;
            if let Some(reference_path) = &args.reference {
                check_reference(&summary, reference_path)?;
            }
            return Ok(());
        }
    };

    info!("Watching the sheets every {:?}", interval);
    loop {
        if !watch_cycle(&config, &root, &mut tracker, &out) {
            info!("Retrying in {:?}", interval);
        }
        std::thread::sleep(interval);
    }
}

#[cfg(test)]
fn run_rally_test(test_name: &str, config_lpath: &str, summary_lpath: &str) -> RallyResult<()> {
    let test_dir = format!("{}/tests/data", env!("CARGO_MANIFEST_DIR"));
    info!("Running test {}", test_name);
    let config_path = format!("{}/{}/{}", test_dir, test_name, config_lpath);
    let config = read_config(&config_path)?;
    let root = Path::new(&config_path)
        .parent()
        .context(MissingParentDirSnafu { path: &config_path })?;
    let summary = run_cycle(&config, root, &mut ChangeTracker::new(), Instant::now())?;
    check_reference(
        &summary,
        &format!("{}/{}/{}", test_dir, test_name, summary_lpath),
    )
}

#[cfg(test)]
pub fn test_wrapper(test_name: &str) -> RallyResult<()> {
    run_rally_test(
        test_name,
        format!("{}_config.json", test_name).as_str(),
        format!("{}_expected_summary.json", test_name).as_str(),
    )
}
