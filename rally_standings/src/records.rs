//! Header-keyed records read from a sheet export.
//!
//! The readers split the sheet into cells, this module gives them meaning.
//! Header names are normalized to upper case once, when the table is built, so
//! that `Nombre` and `NOMBRE` designate the same field.

use std::collections::{BTreeMap, HashMap};

use log::debug;

use crate::config::{Entrant, RosterEntry, ScheduleEntry, StageDefinition};
use crate::roster::derive_brand;

/// Canonical form of a header name.
pub fn canonical_header(header: &str) -> String {
    header.trim().to_uppercase()
}

/// Reads the stage number out of a `SS<n>` column name.
pub fn stage_column_number(header: &str) -> Option<u32> {
    let h = canonical_header(header);
    let digits = h.strip_prefix("SS")?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok()
}

/// A row of a sheet, with its fields keyed by canonical header.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Record {
    fields: HashMap<String, String>,
}

impl Record {
    /// The value of the field, or an empty string when the column does not exist.
    pub fn get(&self, header: &str) -> &str {
        self.fields
            .get(&canonical_header(header))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    /// The values of all the `SS<n>` columns of this row.
    pub fn stage_cells(&self) -> BTreeMap<u32, String> {
        self.fields
            .iter()
            .filter_map(|(h, v)| stage_column_number(h).map(|n| (n, v.clone())))
            .collect()
    }
}

/// A parsed sheet: the canonical headers, in column order, and the records.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl Table {
    /// Splits comma-separated text on every comma. Test sheets only.
    #[cfg(test)]
    pub(crate) fn parse(text: &str) -> Table {
        let mut lines = text.trim().lines();
        let headers: Vec<String> = match lines.next() {
            Some(line) => line.split(',').map(|s| s.to_string()).collect(),
            None => return Table::default(),
        };
        let rows: Vec<Vec<String>> = lines
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.split(',').map(|s| s.to_string()).collect())
            .collect();
        Table::from_rows(&headers, &rows)
    }

    /// Builds a table from cells that were already split by a sheet reader.
    pub fn from_rows(headers: &[String], rows: &[Vec<String>]) -> Table {
        let headers: Vec<String> = headers.iter().map(|h| canonical_header(h)).collect();
        let mut records: Vec<Record> = Vec::new();
        for row in rows.iter() {
            let mut fields: HashMap<String, String> = HashMap::new();
            for (idx, header) in headers.iter().enumerate() {
                let value = row.get(idx).map(|s| s.trim()).unwrap_or("");
                // A duplicated header keeps the last column, like the sheets do.
                fields.insert(header.clone(), value.to_string());
            }
            records.push(Record { fields });
        }
        debug!(
            "Table::from_rows: {} headers, {} records",
            headers.len(),
            records.len()
        );
        Table { headers, records }
    }

    /// The stage numbers of the `SS<n>` columns, in increasing order.
    pub fn stage_columns(&self) -> Vec<u32> {
        let mut cols: Vec<u32> = self
            .headers
            .iter()
            .filter_map(|h| stage_column_number(h))
            .collect();
        cols.sort_unstable();
        cols.dedup();
        cols
    }

    pub fn stage_definitions(&self) -> Vec<StageDefinition> {
        self.records
            .iter()
            .filter(|r| !r.get("PE").is_empty())
            .map(|r| StageDefinition {
                stage_number: r.get("PE").to_string(),
                from_location: r.get("Desde").to_string(),
                to_location: r.get("Hasta").to_string(),
                distance_km: r.get("KMS").to_string(),
                scheduled_time: r.get("HORA").to_string(),
            })
            .collect()
    }

    pub fn entrants(&self) -> Vec<Entrant> {
        let mut res: Vec<Entrant> = Vec::new();
        for (idx, r) in self.records.iter().enumerate() {
            let name = r.get("Nombre");
            let category = r.get("Categoria");
            if name.is_empty() || category.is_empty() {
                debug!("entrants: skipping row {} without name or category", idx + 1);
                continue;
            }
            res.push(Entrant {
                name: name.to_string(),
                category: category.to_string(),
                stage_times: r.stage_cells(),
                penalty: r.get("Penalizacion").to_string(),
            });
        }
        res
    }

    pub fn roster(&self) -> Vec<RosterEntry> {
        self.records
            .iter()
            .filter(|r| !r.get("Nombre").is_empty() && !r.get("Categoria").is_empty())
            .map(|r| {
                let vehicle = r.get("Vehiculo");
                RosterEntry {
                    number: r.get("Nº").to_string(),
                    name: r.get("Nombre").to_string(),
                    vehicle: vehicle.to_string(),
                    brand: derive_brand(vehicle),
                    category: r.get("Categoria").to_string(),
                }
            })
            .collect()
    }

    pub fn schedule(&self) -> Vec<ScheduleEntry> {
        self.records
            .iter()
            .filter(|r| !r.get("Nombre").is_empty() && !r.get("Categoria").is_empty())
            .map(|r| ScheduleEntry {
                name: r.get("Nombre").to_string(),
                category: r.get("Categoria").to_string(),
                stage_starts: r.stage_cells(),
            })
            .collect()
    }

    /// The event name: the `Nombre` field of the first row, when present.
    pub fn event_name(&self) -> Option<String> {
        self.records
            .first()
            .map(|r| r.get("Nombre").trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS: &str = "Nombre,Categoria,SS1,SS2,SS10,PENALIZACION\r\n\
        Ana Diaz,RC2,4:05.10,DNF,,0:30\r\n\
        \r\n\
        ,RC2,4:00.00,4:10.00,,\r\n\
        Bruno Paz,RC3,4:10.00\r\n";

    #[test]
    fn headers_are_case_insensitive() {
        let t = Table::parse("Nombre,CATEGORIA\nAna,RC2\n");
        assert_eq!(t.headers, vec!["NOMBRE", "CATEGORIA"]);
        assert_eq!(t.records[0].get("nombre"), "Ana");
        assert_eq!(t.records[0].get("Categoria"), "RC2");
        assert_eq!(t.records[0].get("Penalizacion"), "");
    }

    #[test]
    fn blank_lines_and_short_rows() {
        let t = Table::parse(RESULTS);
        assert_eq!(t.records.len(), 3);
        assert_eq!(t.records[2].get("SS2"), "");
        assert_eq!(t.records[2].get("PENALIZACION"), "");
    }

    #[test]
    fn stage_columns_sorted_numerically() {
        let t = Table::parse(RESULTS);
        assert_eq!(t.stage_columns(), vec![1, 2, 10]);
        assert_eq!(stage_column_number("ss3"), Some(3));
        assert_eq!(stage_column_number("SS"), None);
        assert_eq!(stage_column_number("SSX"), None);
        assert_eq!(stage_column_number("PE1"), None);
    }

    #[test]
    fn entrants_drop_rows_without_name() {
        let entrants = Table::parse(RESULTS).entrants();
        assert_eq!(entrants.len(), 2);
        let ana = &entrants[0];
        assert_eq!(ana.name, "Ana Diaz");
        assert_eq!(ana.raw_time(1), "4:05.10");
        assert_eq!(ana.raw_time(2), "DNF");
        assert_eq!(ana.raw_time(10), "");
        assert_eq!(ana.raw_time(7), "");
        assert_eq!(ana.penalty, "0:30");
    }

    #[test]
    fn stage_definitions_need_a_number() {
        let t = Table::parse(
            "PE,Desde,Hasta,KMS,HORA\n1,Villa A,Villa B,12.5,09:00\n,,,,\n2,Villa B,Villa A,8,10:30\n",
        );
        let stages = t.stage_definitions();
        assert_eq!(stages.len(), 2);
        assert_eq!(stages[1].stage_number, "2");
        assert_eq!(stages[1].ordinal(), Some(2));
        assert_eq!(stages[0].distance(), Some(12.5));
    }

    #[test]
    fn roster_rows() {
        let t = Table::parse("Nº,NOMBRE,VEHICULO,CATEGORIA\n12,Ana Diaz,Skoda Fabia RS,RC2\n");
        let roster = t.roster();
        assert_eq!(roster[0].number, "12");
        assert_eq!(roster[0].brand, "skodars");
    }

    #[test]
    fn event_name_from_first_row() {
        assert_eq!(
            Table::parse("Nombre\n Rally de la Montaña \n").event_name(),
            Some("Rally de la Montaña".to_string())
        );
        assert_eq!(Table::parse("Nombre\n").event_name(), None);
        assert_eq!(Table::parse("").event_name(), None);
    }
}
