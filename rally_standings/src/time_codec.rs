//! Parsing and formatting of the times written in the sheets.
//!
//! Times are typed by hand by the timekeepers, so the separators are not
//! reliable: `1:02.35`, `1.02.35`, `1,02,35` and `1:02:35` all mean one minute,
//! two seconds and 35 hundredths. Hours are only recognized when three
//! separators are present (`1:02:03.50`).

use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::config::Seconds;

/// The "no valid time" marker of the sheets. Any time at or above it is displayed as `-`.
pub const NO_TIME_SENTINEL: f64 = 999_999.0;

/// Time added to the worst valid time of a stage to obtain the time of a DNF.
pub const DNF_EXTRA: Seconds = Seconds(60.0);

fn separator_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[:.,]").expect("separator regex"))
}

/// Rewrites the separators of a time to the canonical `:`/`.` form.
///
/// With two separators the layout is read as `minutes:seconds.hundredths`.
/// With a single separator only a decimal comma is replaced. Any other
/// layout is returned as is (trimmed).
pub fn normalize_separators(raw: &str) -> String {
    let time = raw.trim();
    let re = separator_regex();
    match re.find_iter(time).count() {
        2 => {
            let parts: Vec<&str> = re.split(time).collect();
            if let [minutes, seconds, hundredths] = parts.as_slice() {
                format!("{}:{}.{}", minutes, seconds, hundredths)
            } else {
                time.to_string()
            }
        }
        1 => time.replacen(',', ".", 1),
        _ => time.to_string(),
    }
}

/// True if the value is one of the "did not finish" markers.
pub fn is_dnf(raw: &str) -> bool {
    matches!(
        raw.trim().to_uppercase().as_str(),
        "DNF" | "D.N.F" | "D.N.F."
    )
}

/// Parses a time into seconds.
///
/// Empty values, DNF markers, times at or above [`NO_TIME_SENTINEL`] and
/// anything that cannot be read as a time return `None`. This function never
/// fails.
pub fn parse_seconds(raw: &str) -> Option<Seconds> {
    let raw = raw.trim();
    if raw.is_empty() || is_dnf(raw) {
        return None;
    }
    let normalized = normalize_separators(raw);
    let parts: Vec<&str> = normalized.split(':').collect();
    let res = match parts.as_slice() {
        [minutes, seconds] => {
            let m = read_whole(minutes)?;
            let s = read_fraction(seconds)?;
            Seconds(m * 60.0 + s)
        }
        [hours, minutes, seconds] => {
            let h = read_whole(hours)?;
            let m = read_whole(minutes)?;
            // Three separators are left as typed: the decimal comma is still there.
            let s = read_fraction(&seconds.replacen(',', ".", 1))?;
            Seconds(h * 3600.0 + m * 60.0 + s)
        }
        _ => {
            debug!("parse_seconds: cannot read {:?} ({:?})", raw, normalized);
            return None;
        }
    };
    if res.0 >= NO_TIME_SENTINEL {
        debug!("parse_seconds: {:?} is the no-time marker", raw);
        return None;
    }
    Some(res)
}

fn read_whole(s: &str) -> Option<f64> {
    s.trim().parse::<u32>().ok().map(f64::from)
}

fn read_fraction(s: &str) -> Option<f64> {
    match s.trim().parse::<f64>() {
        Ok(x) if x.is_finite() && x >= 0.0 => Some(x),
        _ => None,
    }
}

/// Formats a time as `H:MM:SS.ss`, or `M:SS.ss` under one hour.
/// A missing time is displayed as `-`.
pub fn format_seconds(seconds: Option<Seconds>) -> String {
    let s = match seconds {
        Some(Seconds(s)) if s.is_finite() && s < NO_TIME_SENTINEL => s,
        _ => return "-".to_string(),
    };
    // Hundredths first: 59.996 is shown as 1:00.00.
    let s = (s * 100.0).round() / 100.0;
    let hours = (s / 3600.0).floor() as u64;
    let minutes = ((s % 3600.0) / 60.0).floor() as u64;
    let secs = s % 60.0;
    if hours > 0 {
        format!("{}:{:02}:{:05.2}", hours, minutes, secs)
    } else {
        format!("{}:{:05.2}", minutes, secs)
    }
}

/// Formats a gap to another time: `-` when there is no gap, `+M:SS.ss` otherwise.
pub fn format_delta(delta: Seconds) -> String {
    if delta.0 == 0.0 {
        "-".to_string()
    } else {
        format!("+{}", format_seconds(Some(delta)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalize_two_separators() {
        assert_eq!(normalize_separators("1:02:35"), "1:02.35");
        assert_eq!(normalize_separators("1.02.35"), "1:02.35");
        assert_eq!(normalize_separators("1,02,35"), "1:02.35");
        assert_eq!(normalize_separators(" 4:05,7 "), "4:05.7");
    }

    #[test]
    fn normalize_one_separator() {
        assert_eq!(normalize_separators("4:05"), "4:05");
        assert_eq!(normalize_separators("65,3"), "65.3");
    }

    #[test]
    fn normalize_other_layouts_unchanged() {
        assert_eq!(normalize_separators("125"), "125");
        assert_eq!(normalize_separators("1:02:03.50"), "1:02:03.50");
    }

    #[test]
    fn dnf_markers() {
        for s in ["DNF", "dnf", " Dnf ", "D.N.F", "d.n.f."] {
            assert!(is_dnf(s), "{:?}", s);
        }
        for s in ["", "DNS", "DSQ", "D N F", "DNF.", "abandono", "1:02.00"] {
            assert!(!is_dnf(s), "{:?}", s);
        }
    }

    #[test]
    fn parse_minutes_seconds() {
        assert_eq!(parse_seconds("4:05"), Some(Seconds(245.0)));
        assert_eq!(parse_seconds("0:30"), Some(Seconds(30.0)));
        assert_eq!(parse_seconds("1:02.5"), Some(Seconds(62.5)));
        assert_eq!(parse_seconds("1.02.50"), Some(Seconds(62.5)));
        assert_eq!(parse_seconds("1,02,50"), Some(Seconds(62.5)));
    }

    #[test]
    fn parse_hours() {
        assert_eq!(parse_seconds("1:02:03.50"), Some(Seconds(3723.5)));
        assert_eq!(parse_seconds("1:02:03,50"), Some(Seconds(3723.5)));
    }

    #[test]
    fn parse_no_time() {
        assert_eq!(parse_seconds(""), None);
        assert_eq!(parse_seconds("   "), None);
        assert_eq!(parse_seconds("DNF"), None);
        assert_eq!(parse_seconds("D.N.F."), None);
        assert_eq!(parse_seconds("DNS"), None);
        assert_eq!(parse_seconds("125"), None);
        assert_eq!(parse_seconds("65,3"), None);
        assert_eq!(parse_seconds("a:b"), None);
        assert_eq!(parse_seconds("1:2:3:4"), None);
        assert_eq!(parse_seconds("277:46:39.00"), None);
        assert_eq!(parse_seconds("16666:39.00"), None);
        assert_eq!(parse_seconds("16666:38.00"), Some(Seconds(999_998.0)));
    }

    #[test]
    fn format_times() {
        assert_eq!(format_seconds(Some(Seconds(62.5))), "1:02.50");
        assert_eq!(format_seconds(Some(Seconds(7.0))), "0:07.00");
        assert_eq!(format_seconds(Some(Seconds(3723.5))), "1:02:03.50");
        assert_eq!(format_seconds(Some(Seconds(3600.0))), "1:00:00.00");
        assert_eq!(format_seconds(Some(Seconds(135.0))), "2:15.00");
        assert_eq!(format_seconds(Some(Seconds(59.996))), "1:00.00");
    }

    #[test]
    fn format_no_time() {
        assert_eq!(format_seconds(None), "-");
        assert_eq!(format_seconds(Some(Seconds(NO_TIME_SENTINEL))), "-");
        assert_eq!(format_seconds(Some(Seconds(f64::NAN))), "-");
    }

    #[test]
    fn format_deltas() {
        assert_eq!(format_delta(Seconds::ZERO), "-");
        assert_eq!(format_delta(Seconds(13.8)), "+0:13.80");
        assert_eq!(format_delta(Seconds(73.8)), "+1:13.80");
    }

    fn layout() -> impl Strategy<Value = String> {
        let sep = prop::sample::select(vec![':', '.', ',']);
        (0u32..240, 0u32..60, 0u32..100, sep.clone(), sep).prop_map(|(m, s, h, a, b)| {
            if h % 2 == 0 {
                format!("{}:{:02}", m, s)
            } else {
                format!("{}{}{:02}{}{:02}", m, a, s, b, h)
            }
        })
    }

    proptest! {
        #[test]
        fn display_round_trip(raw in layout()) {
            let first = parse_seconds(&raw);
            prop_assume!(first.is_some());
            let first = first.unwrap();
            let second = parse_seconds(&format_seconds(Some(first)));
            prop_assert!(second.is_some(), "{:?} -> {:?}", raw, format_seconds(Some(first)));
            prop_assert!((second.unwrap().0 - first.0).abs() <= 0.01 + 1e-9);
        }
    }
}
