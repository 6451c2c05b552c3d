//! JSON output formatter

use crate::dashboard::Snapshot;
use crate::error::Result;
use crate::format::OutputFormatter;

/// JSON formatter - outputs the full snapshot as pretty-printed JSON
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Full JSON snapshot"
    }

    fn format(&self, snapshot: &Snapshot) -> Result<String> {
        Ok(serde_json::to_string_pretty(snapshot)?)
    }
}
