use log::{debug, warn};

use crate::config::ConsistencyError;
use crate::Snapshot;

/// Checks that the stage list and the results sheet describe the same stages.
///
/// The number of stage definitions must equal the number of `SS<n>` columns
/// of the results sheet. Nothing should be published while this fails.
pub fn check_consistency(snapshot: &Snapshot) -> Result<(), ConsistencyError> {
    if snapshot.entrants.is_empty() {
        warn!("check_consistency: no entrant in the results sheet");
        return Err(ConsistencyError::NoEntrants);
    }
    let declared_stages = snapshot.stages.len();
    let time_columns = snapshot.result_columns.len();
    debug!(
        "check_consistency: {} stages, {} time columns",
        declared_stages, time_columns
    );
    if declared_stages != time_columns {
        warn!(
            "check_consistency: {} stages declared but {} SS columns",
            declared_stages, time_columns
        );
        return Err(ConsistencyError::StageCountMismatch {
            declared_stages,
            time_columns,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Table;

    const STAGES: &str = "PE,Desde,Hasta,KMS,HORA\n1,A,B,10,09:00\n2,B,C,12,10:00\n3,C,A,8,11:00\n";

    #[test]
    fn matching_counts() {
        let results = Table::parse("Nombre,Categoria,SS1,SS2,SS3\nAna,RC2,4:00.00,,\n");
        let snapshot = Snapshot::from_tables(&Table::parse(STAGES), &results, None, None);
        assert_eq!(check_consistency(&snapshot), Ok(()));
    }

    #[test]
    fn mismatch_reports_both_counts() {
        let results = Table::parse("Nombre,Categoria,SS1,SS2,SS3,SS4\nAna,RC2,4:00.00,,,\n");
        let snapshot = Snapshot::from_tables(&Table::parse(STAGES), &results, None, None);
        let err = check_consistency(&snapshot).unwrap_err();
        assert_eq!(
            err,
            ConsistencyError::StageCountMismatch {
                declared_stages: 3,
                time_columns: 4
            }
        );
        let msg = err.to_string();
        assert!(msg.contains('3') && msg.contains('4'), "{}", msg);
    }

    #[test]
    fn no_entrants() {
        let results = Table::parse("Nombre,Categoria,SS1,SS2,SS3\n");
        let snapshot = Snapshot::from_tables(&Table::parse(STAGES), &results, None, None);
        assert_eq!(
            check_consistency(&snapshot),
            Err(ConsistencyError::NoEntrants)
        );
    }
}
