//! CSV output formatter

use crate::dashboard::export::signals_to_csv;
use crate::dashboard::Snapshot;
use crate::error::Result;
use crate::format::OutputFormatter;

/// CSV formatter - same rows as the export file
pub struct CsvFormatter;

impl OutputFormatter for CsvFormatter {
    fn name(&self) -> &str {
        "csv"
    }

    fn description(&self) -> &str {
        "Signal table as CSV"
    }

    fn format(&self, snapshot: &Snapshot) -> Result<String> {
        signals_to_csv(snapshot.active.as_ref(), &snapshot.signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::signal::fixtures;
    use crate::service::mock::store;

    #[test]
    fn test_csv_format() {
        let snapshot = Snapshot {
            active: Some(store("5")),
            signals: vec![fixtures::seasonal(), fixtures::growth()],
            ..Default::default()
        };

        let output = CsvFormatter.format(&snapshot).unwrap();

        assert_eq!(output.lines().count(), 3);
        assert!(output.contains(r#""Store 5","5","Growth""#));
    }

    #[test]
    fn test_csv_without_signals_is_header_only() {
        let output = CsvFormatter.format(&Snapshot::default()).unwrap();
        assert_eq!(output.lines().count(), 1);
    }
}
