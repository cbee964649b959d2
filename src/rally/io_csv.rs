// Primitives for reading CSV exports.

use crate::rally::{io_common::simplify_file_name, *};

/// Reads a CSV export. The first line is the header, every field is trimmed
/// and rows without any value are skipped. Rows may be shorter than the
/// header: the missing fields are empty.
pub fn read_csv_table(path: &str) -> RallyResult<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .quoting(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(OpeningSheetSnafu { path })?;
    let header: Vec<String> = rdr
        .headers()
        .context(ReadingCsvRecordSnafu { path, record: 0_usize })?
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut records: Vec<Vec<String>> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        let line = line_r.context(ReadingCsvRecordSnafu {
            path,
            record: idx + 1,
        })?;
        if line.iter().all(|c| c.is_empty()) {
            continue;
        }
        records.push(line.iter().map(|s| s.to_string()).collect());
    }
    debug!(
        "read_csv_table: {}: headers: {:?} records: {}",
        simplify_file_name(path),
        header,
        records.len()
    );
    Ok(Table::from_rows(&header, &records))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_sheet(name: &str, text: &str) -> String {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, text).unwrap();
        path.to_string_lossy().to_string()
    }

    #[test]
    fn blank_and_short_rows() {
        let path = write_sheet(
            "rallytab_io_csv_results.csv",
            "Nombre, Categoria ,SS1,SS2\r\n Ana Diaz ,RC2,4:05.10,DNF\r\n\r\n,,,\r\nBruno Paz,RC3,4:10.00\r\n",
        );
        let t = read_csv_table(&path).unwrap();
        assert_eq!(t.headers, vec!["NOMBRE", "CATEGORIA", "SS1", "SS2"]);
        assert_eq!(t.records.len(), 2);
        assert_eq!(t.records[0].get("Nombre"), "Ana Diaz");
        assert_eq!(t.records[1].get("SS2"), "");
    }

    #[test]
    fn quotes_are_kept_as_written() {
        let path = write_sheet(
            "rallytab_io_csv_roster.csv",
            "Nº,Nombre,Vehiculo,Categoria\n7,\"Ana\",Ford Fiesta,RC2\n",
        );
        let t = read_csv_table(&path).unwrap();
        assert_eq!(t.records[0].get("Nombre"), "\"Ana\"");
        assert_eq!(t.records[0].get("Nº"), "7");
    }

    #[test]
    fn missing_file() {
        let res = read_csv_table("/nonexistent/tramos.csv");
        assert!(matches!(res, Err(RallyError::OpeningSheet { .. })));
    }
}
