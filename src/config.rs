use crate::infrastructure::modem::DEFAULT_MODEM_COMMAND;
use serde::Deserialize;

/// Sentinel store address selecting the in-process store.
pub const MEMORY_STORE: &str = "memory";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // Scheduling
    pub trigger_interval_secs: u64,
    pub modem_refresh_secs: u64,
    pub lookup_timeout_secs: u64,
    pub debug: bool,

    // Modem
    pub modem_command: String,

    // Remote store
    pub store_addr: String,
    pub store_timeout_ms: u64,

    // Cell tower lookup
    pub opencellid_api_uri: String,
    pub opencellid_api_key: String,

    // Reverse geocoding
    pub geocoding_api_uri: String,
    pub geocoding_api_key: String,

    // IP geolocation
    pub iplocation_api_uri: String,
    pub iplocation_api_key: String,
    pub ipify_api_uri: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trigger_interval_secs: 10,
            modem_refresh_secs: 300,
            lookup_timeout_secs: 10,
            debug: false,
            modem_command: DEFAULT_MODEM_COMMAND.to_string(),
            store_addr: "http://localhost:7777".to_string(),
            store_timeout_ms: 2000,
            opencellid_api_uri: "https://opencellid.org/cell/get".to_string(),
            opencellid_api_key: String::new(),
            geocoding_api_uri: "https://api.geoapify.com/v1/geocode/reverse".to_string(),
            geocoding_api_key: String::new(),
            iplocation_api_uri: String::new(),
            iplocation_api_key: String::new(),
            ipify_api_uri: "https://api.ipify.org?format=json".to_string(),
        }
    }
}

/// Positive integer from the environment; unset, unparsable or zero values
/// fall back to `default`.
fn positive_var(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

pub fn load_config() -> anyhow::Result<Config> {
    let defaults = Config::default();

    let trigger_interval_secs =
        positive_var("LOCATER_TRIGGER_INTERVAL_SECS", defaults.trigger_interval_secs);
    let modem_refresh_secs =
        positive_var("LOCATER_MODEM_REFRESH_SECS", defaults.modem_refresh_secs);
    let lookup_timeout_secs =
        positive_var("LOCATER_LOOKUP_TIMEOUT_SECS", defaults.lookup_timeout_secs);

    let debug = std::env::var("DEBUG").is_ok();

    let modem_command =
        std::env::var("LOCATER_MODEM_COMMAND").unwrap_or(defaults.modem_command);

    let store_addr = std::env::var("LOCATER_STORE_ADDR").unwrap_or(defaults.store_addr);

    let store_timeout_ms = positive_var("LOCATER_STORE_TIMEOUT_MS", defaults.store_timeout_ms);

    // External APIs
    let opencellid_api_uri =
        std::env::var("OPENCELLID_API_URI").unwrap_or(defaults.opencellid_api_uri);
    let opencellid_api_key = std::env::var("OPENCELLID_API_KEY").unwrap_or_default();

    let geocoding_api_uri =
        std::env::var("GEOCODING_API_URI").unwrap_or(defaults.geocoding_api_uri);
    let geocoding_api_key = std::env::var("GEOCODING_API_KEY").unwrap_or_default();

    let iplocation_api_uri = std::env::var("IPLOCATION_API_URI").unwrap_or_default();
    let iplocation_api_key = std::env::var("IPLOCATION_API_KEY").unwrap_or_default();

    let ipify_api_uri = std::env::var("IPIFY_API_URI").unwrap_or(defaults.ipify_api_uri);

    Ok(Config {
        trigger_interval_secs,
        modem_refresh_secs,
        lookup_timeout_secs,
        debug,
        modem_command,
        store_addr,
        store_timeout_ms,
        opencellid_api_uri,
        opencellid_api_key,
        geocoding_api_uri,
        geocoding_api_key,
        iplocation_api_uri,
        iplocation_api_key,
        ipify_api_uri,
    })
}
