//! Stores command handler
//!
//! Lists the stores known to the Analysis Service through the bulk
//! endpoints, optionally with one store's precomputed signals.

use crate::cli::{init_logging, load_config};
use crate::error::Result;
use crate::model::Location;
use crate::service::legacy::StoredSignals;
use crate::service::HttpAnalysisService;
use clap::Args;

/// Stores command arguments
#[derive(Args)]
pub struct StoresArgs {
    /// Show the precomputed signals of this store id
    #[arg(long, value_name = "ID")]
    pub signals: Option<String>,

    /// Print raw JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the stores command
pub async fn run(args: StoresArgs, api_url: Option<String>) -> Result<()> {
    init_logging("warn");
    let config = load_config(api_url)?;
    let service = HttpAnalysisService::from_config(&config)?;

    if let Some(id) = &args.signals {
        let stored = service.stored_signals(id).await?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&stored)?);
        } else {
            print!("{}", render_signals(id, &stored));
        }
        return Ok(());
    }

    let stores = service.list_stores().await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&stores)?);
    } else {
        print!("{}", render_stores(&stores));
    }

    Ok(())
}

fn render_stores(stores: &[Location]) -> String {
    if stores.is_empty() {
        return "No stores\n".to_string();
    }

    let mut output = String::new();
    for store in stores {
        output.push_str(&format!(
            "{:>8}  {:<28} ({:.4}, {:.4})  {}\n",
            store.id, store.name, store.lat, store.lng, store.address
        ));
    }
    output
}

fn render_signals(id: &str, stored: &StoredSignals) -> String {
    let mut output = format!("Store {}\n", id);
    for signal in &stored.signals {
        output.push_str(&format!(
            "  [{}] {} - {}\n    {}\n",
            signal.intensity, signal.signal_type, signal.metric, signal.market_signal
        ));
    }
    if !stored.history.is_empty() {
        output.push_str(&format!("  {} history points\n", stored.history.len()));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::mock::store;

    #[test]
    fn test_render_stores() {
        let output = render_stores(&[store("101"), store("102")]);
        assert_eq!(output.lines().count(), 2);
        assert!(output.contains("Store 102"));
        assert!(output.contains("(44.7900, -93.6000)"));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_stores(&[]), "No stores\n");
    }

    #[tokio::test]
    async fn test_render_service_signals() {
        let service = HttpAnalysisService::new(crate::service::http::test_server::spawn().await).unwrap();
        let stored = service.stored_signals("101").await.unwrap();

        let output = render_signals("101", &stored);
        assert!(output.starts_with("Store 101\n"));
        assert!(output.contains("Machinery"));
        assert!(output.contains("1 history points"));
    }
}
