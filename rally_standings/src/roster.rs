//! The list of registered entrants, grouped by category.

use crate::config::RosterEntry;

/// Number of distinct color slots assigned to the categories.
pub const CATEGORY_COLORS: usize = 8;

/// The brand of a vehicle, used to pick its logo.
///
/// It is the first word of the vehicle, lower case. Skoda "RS" models have
/// their own logo.
pub fn derive_brand(vehicle: &str) -> String {
    if vehicle.is_empty() {
        return "".to_string();
    }
    let lower = vehicle.to_lowercase();
    if lower.contains("skoda") && lower.contains("rs") {
        return "skodars".to_string();
    }
    lower.split(' ').next().unwrap_or("").to_string()
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RosterGroup {
    pub category: String,
    /// 1-based color slot, cycling over [`CATEGORY_COLORS`].
    pub color_slot: usize,
    pub entries: Vec<RosterEntry>,
}

/// Groups the roster by category. Categories are sorted by name and the
/// entrants keep the order of the sheet.
pub fn roster_by_category(roster: &[RosterEntry]) -> Vec<RosterGroup> {
    let mut sorted: Vec<&RosterEntry> = roster.iter().collect();
    sorted.sort_by(|a, b| a.category.cmp(&b.category));

    let mut groups: Vec<RosterGroup> = Vec::new();
    for entry in sorted {
        match groups.last_mut() {
            Some(g) if g.category == entry.category => g.entries.push(entry.clone()),
            _ => {
                let color_slot = (groups.len() % CATEGORY_COLORS) + 1;
                groups.push(RosterGroup {
                    category: entry.category.clone(),
                    color_slot,
                    entries: vec![entry.clone()],
                });
            }
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, category: &str) -> RosterEntry {
        RosterEntry {
            number: "".to_string(),
            name: name.to_string(),
            vehicle: "".to_string(),
            brand: "".to_string(),
            category: category.to_string(),
        }
    }

    #[test]
    fn brands() {
        assert_eq!(derive_brand("Ford Fiesta R2"), "ford");
        assert_eq!(derive_brand("VOLKSWAGEN Gol"), "volkswagen");
        assert_eq!(derive_brand("Skoda Fabia RS Rally2"), "skodars");
        assert_eq!(derive_brand("Skoda Fabia R5"), "skoda");
        assert_eq!(derive_brand(""), "");
    }

    #[test]
    fn groups_sorted_with_counts() {
        let roster = vec![
            entry("a", "RC3"),
            entry("b", "RC2"),
            entry("c", "RC3"),
            entry("d", "N1"),
        ];
        let groups = roster_by_category(&roster);
        let summary: Vec<(&str, usize, usize)> = groups
            .iter()
            .map(|g| (g.category.as_str(), g.entries.len(), g.color_slot))
            .collect();
        assert_eq!(summary, vec![("N1", 1, 1), ("RC2", 1, 2), ("RC3", 2, 3)]);
        assert_eq!(groups[2].entries[0].name, "a");
        assert_eq!(groups[2].entries[1].name, "c");
    }

    #[test]
    fn color_slots_cycle() {
        let roster: Vec<RosterEntry> = (0..10).map(|i| entry("x", &format!("C{:02}", i))).collect();
        let groups = roster_by_category(&roster);
        assert_eq!(groups[7].color_slot, 8);
        assert_eq!(groups[8].color_slot, 1);
    }
}
