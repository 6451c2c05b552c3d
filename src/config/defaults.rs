//! Default configuration values
//!
//! Named constants for all tunable parameters

use crate::constants::api::{ANALYSIS_URL, NOMINATIM_URL, USER_AGENT};

/// Default Analysis Service base URL
pub const DEFAULT_SERVICE_URL: &str = ANALYSIS_URL;

/// Default per-request timeout in seconds (satellite analyses are slow)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7878;

/// Default geocoder URL
pub const DEFAULT_GEOCODER_URL: &str = NOMINATIM_URL;

/// Default geocoder User-Agent
pub const DEFAULT_GEOCODER_USER_AGENT: &str = USER_AGENT;

/// Default export directory
pub const DEFAULT_EXPORT_DIR: &str = ".";

/// Default output format
pub const DEFAULT_FORMAT: &str = "text";

/// Default analyses run by `analyze`
pub const DEFAULT_KINDS: &str = "seasonal,growth";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "greengrowth";
