//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::error::{Error, Result};
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "service.base_url")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    // Show path
    if args.path {
        let path = Config::config_path()?;
        println!("{}", path.display());
        return Ok(());
    }

    // Reset config
    if args.reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    match (&args.key, &args.value) {
        // No arguments: show all config
        (None, None) => {
            print!("{}", render_config(&config)?);
        }

        // Key only: show that value
        (Some(key), None) => {
            if let Some(value) = config.get(key) {
                println!("{}", value);
            } else {
                eprintln!("Unknown config key: {}", key);
                eprintln!("\nAvailable keys:");
                for k in Config::available_keys() {
                    eprintln!("  {}", k);
                }
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        // Key and value: set the value
        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }

        // Value without key: not valid
        (None, Some(_)) => {
            return Err(Error::Config("Must specify a key to set a value".to_string()));
        }
    }

    Ok(())
}

/// Render all configuration values as the TOML that `save` would write
fn render_config(config: &Config) -> Result<String> {
    toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_config_sections() {
        let output = render_config(&Config::default()).unwrap();

        assert!(output.starts_with("[service]\n"));
        assert!(output.contains("[server]\n"));
        assert!(output.contains("port = 7878\n"));
        assert!(output.contains("[defaults]\n"));
        assert!(output.contains("seasonal,growth"));
    }

    #[test]
    fn test_render_config_escapes_values() {
        let mut config = Config::default();
        config.export.directory = r"C:\exports".to_string();
        config.geocoder.user_agent = "say \"hi\"".to_string();
        config.defaults.kinds = "growth".to_string();
        config.server.host = "1234".to_string();

        let output = render_config(&config).unwrap();
        let parsed: Config = toml::from_str(&output).unwrap();

        assert_eq!(parsed.export.directory, r"C:\exports");
        assert_eq!(parsed.geocoder.user_agent, "say \"hi\"");
        assert_eq!(parsed.server.host, "1234");
        assert_eq!(parsed.server.port, 7878);
    }
}
