//! Human-readable text output formatter

use crate::dashboard::Snapshot;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::model::signal::Overlay;
use crate::model::HistoryPoint;

/// Text formatter - outputs a human-readable summary
pub struct TextFormatter;

fn history_summary(history: &[HistoryPoint]) -> Option<String> {
    let first = history.first()?;
    let last = history.last()?;
    let (min, max) = history.iter().fold((f64::MAX, f64::MIN), |(lo, hi), p| {
        (lo.min(p.ndvi), hi.max(p.ndvi))
    });

    Some(format!(
        "  {} samples, {} to {}\n  NDVI {:.3} -> {:.3} (range {:.3}..{:.3})\n",
        history.len(),
        first.date,
        last.date,
        first.ndvi,
        last.ndvi,
        min,
        max
    ))
}

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable text"
    }

    fn format(&self, snapshot: &Snapshot) -> Result<String> {
        let mut output = String::new();

        let Some(location) = &snapshot.active else {
            output.push_str("No location selected\n");
            return Ok(output);
        };

        // Header
        output.push_str(&format!("{} ({})\n", location.name, location.id));
        output.push_str(&format!("Address: {}\n", location.address));
        output.push_str(&format!("Center: ({:.6}, {:.6})\n", location.lat, location.lng));

        if let Some(context) = &snapshot.context {
            let entries = context.entries();
            if !entries.is_empty() {
                output.push_str("\nLocation Context:\n");
                for (key, value) in entries {
                    output.push_str(&format!("  {}: {}\n", key, value));
                }
            }
        }

        output.push_str("\nSignals:\n");
        if snapshot.signals.is_empty() {
            output.push_str("  (none)\n");
        }
        for signal in &snapshot.signals {
            output.push_str(&format!(
                "  [{}] {} - {}\n",
                signal.intensity, signal.kind, signal.metric
            ));
            output.push_str(&format!("    Market signal: {}\n", signal.market_signal));
            if let Some(action) = signal.stocking_action.as_deref().filter(|a| !a.is_empty()) {
                output.push_str(&format!("    Stocking action: {}\n", action));
            }
            match signal.overlay() {
                Some(Overlay::Tiles(url)) => {
                    output.push_str(&format!("    Overlay: {}\n", url));
                }
                Some(Overlay::Points(points)) => {
                    output.push_str(&format!("    Overlay: {} points\n", points.len()));
                }
                None => {}
            }
        }

        if let Some(summary) = history_summary(&snapshot.history) {
            output.push_str("\nNDVI History:\n");
            output.push_str(&summary);
        }

        if !snapshot.pending.is_empty() {
            let pending: Vec<String> = snapshot.pending.iter().map(|k| k.to_string()).collect();
            output.push_str(&format!("\nStill running: {}\n", pending.join(", ")));
        }

        Ok(output)
    }
}
