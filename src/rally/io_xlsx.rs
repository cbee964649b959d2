// Primitives for reading Excel workbooks.

use calamine::{open_workbook, DataType, Range, Reader, Xlsx};

use crate::rally::{io_common::simplify_file_name, *};

pub fn read_xlsx_table(path: &str, worksheet_name: Option<&str>) -> RallyResult<Table> {
    let wrange = get_range(path, worksheet_name)?;
    let mut rows = wrange.rows();
    let header: Vec<String> = match rows.next() {
        Some(row) => row.iter().map(cell_text).collect(),
        None => return Ok(Table::default()),
    };
    let records: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(cell_text).collect::<Vec<String>>())
        .filter(|row| row.iter().any(|c| !c.trim().is_empty()))
        .collect();
    debug!(
        "read_xlsx_table: {}: headers: {:?} records: {}",
        simplify_file_name(path),
        header,
        records.len()
    );
    Ok(Table::from_rows(&header, &records))
}

fn get_range(path: &str, worksheet_name: Option<&str>) -> RallyResult<Range<DataType>> {
    debug!("get_range: path: {:?} worksheet: {:?}", path, worksheet_name);
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningWorkbookSnafu { path })?;
    let wrange = match worksheet_name {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu {
                path,
                worksheet: name,
            })?
            .context(OpeningWorkbookSnafu { path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyWorkbookSnafu { path })?
            .context(OpeningWorkbookSnafu { path })?,
    };
    Ok(wrange)
}

/// The text of a cell, as the CSV export of the same sheet would show it.
///
/// Times typed in a cell formatted as a time are stored as a fraction of a
/// day: they are written back as a duration.
fn cell_text(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.trim().to_string(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) => f.to_string(),
        DataType::Bool(b) => b.to_string(),
        DataType::DateTime(f) => {
            let seconds = (f.fract() * 86_400.0 * 100.0).round() / 100.0;
            format_seconds(Some(Seconds(seconds)))
        }
        DataType::Empty => "".to_string(),
        _ => {
            warn!("cell_text: unreadable cell {:?}", cell);
            "".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_texts() {
        assert_eq!(cell_text(&DataType::String(" 8:01.10 ".to_string())), "8:01.10");
        assert_eq!(cell_text(&DataType::Int(3)), "3");
        assert_eq!(cell_text(&DataType::Float(12.4)), "12.4");
        assert_eq!(cell_text(&DataType::Float(12.0)), "12");
        assert_eq!(cell_text(&DataType::Empty), "");
        // 09:15 as a fraction of a day
        let nine_fifteen = (9.0 * 3600.0 + 15.0 * 60.0) / 86_400.0;
        let text = cell_text(&DataType::DateTime(nine_fifteen));
        assert_eq!(rally_standings::start_order::parse_start_minutes(&text), Some(555));
    }
}
