//! Demographic context of a location

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Demographic snapshot for a location
///
/// The known statistical variables are typed; anything else the service
/// returns is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationContext {
    /// Data Commons entity the coordinates resolved to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dcid: Option<String>,

    #[serde(rename = "Count_Person", default, skip_serializing_if = "Option::is_none")]
    pub population: Option<f64>,

    #[serde(
        rename = "Median_Income_Person",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub median_income: Option<f64>,

    /// Percent
    #[serde(
        rename = "UnemploymentRate_Person",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub unemployment_rate: Option<f64>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl LocationContext {
    /// True when the service had nothing to say about the location
    pub fn is_empty(&self) -> bool {
        self.dcid.is_none()
            && self.population.is_none()
            && self.median_income.is_none()
            && self.unemployment_rate.is_none()
            && self.extra.is_empty()
    }

    /// Human-readable statistics, excluding the entity id
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut entries = Vec::new();
        if let Some(population) = self.population {
            entries.push(("Population".to_string(), format!("{:.0}", population)));
        }
        if let Some(income) = self.median_income {
            entries.push(("Median income".to_string(), format!("${:.0}", income)));
        }
        if let Some(rate) = self.unemployment_rate {
            entries.push(("Unemployment rate".to_string(), format!("{:.1}%", rate)));
        }
        for (key, value) in &self.extra {
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            entries.push((key.clone(), value));
        }
        entries
    }
}
