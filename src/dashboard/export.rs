//! CSV export of the current signals

use crate::constants::export::{FILE_PREFIX, HEADERS, NO_SELECTION_SENTINEL};
use crate::error::{Error, Result};
use crate::model::{Location, Signal};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A rendered export, ready to be written or downloaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvExport {
    pub file_name: String,
    pub content: String,
}

/// Result of an export request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExportOutcome {
    /// No signals; nothing was produced
    Empty,
    Ready(CsvExport),
}

/// `GreenGrowth_Export_{id}_{date}.csv`
pub fn export_file_name(location: Option<&Location>, date: NaiveDate) -> String {
    let id = location.map_or(NO_SELECTION_SENTINEL, |loc| loc.id.as_str());
    format!("{}_{}_{}.csv", FILE_PREFIX, id, date.format("%Y-%m-%d"))
}

/// Render one row per signal
///
/// Every field is quoted and embedded quotes are doubled.
pub fn signals_to_csv(location: Option<&Location>, signals: &[Signal]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(HEADERS)?;

    let store_name = location.map_or("", |loc| loc.name.as_str());
    let store_id = location.map_or("", |loc| loc.id.as_str());
    for signal in signals {
        let kind = signal.kind.to_string();
        let intensity = signal.intensity.to_string();
        writer.write_record([
            store_name,
            store_id,
            kind.as_str(),
            signal.metric.as_str(),
            signal.market_signal.as_str(),
            signal.stocking_action.as_deref().unwrap_or(""),
            intensity.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| Error::Payload(format!("CSV is not UTF-8: {}", e)))
}

/// Export the signals of the active location
pub fn export(
    location: Option<&Location>,
    signals: &[Signal],
    date: NaiveDate,
) -> Result<ExportOutcome> {
    if signals.is_empty() {
        return Ok(ExportOutcome::Empty);
    }

    Ok(ExportOutcome::Ready(CsvExport {
        file_name: export_file_name(location, date),
        content: signals_to_csv(location, signals)?,
    }))
}
