use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Environment variable overriding `backend.url`.
pub const ENV_BACKEND_URL: &str = "INVOICER_BACKEND_URL";
/// Environment variable overriding `backend.api_key`.
pub const ENV_API_KEY: &str = "INVOICER_API_KEY";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tui: TuiConfig,
    pub backend: BackendConfig,
    pub invoice: InvoiceConfig,
    pub data: DataConfig,
}

/// TUI-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Tick interval in milliseconds for the event loop.
    pub tick_rate_ms: u64,
    /// Enable mouse support in the terminal.
    pub mouse_enabled: bool,
    /// Terminals narrower than this many columns get the drawer layout.
    pub narrow_below: u16,
}

/// Hosted catalog backend. Without a URL the built-in demo catalog is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub url: Option<String>,
    /// Anon/service key sent as `apikey` and bearer token.
    pub api_key: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Invoice defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceConfig {
    /// ISO 4217 code used for invoice lines and totals.
    pub currency: String,
    /// Tax percentage applied to the subtotal, e.g. `15` for 15%.
    pub tax_rate: Decimal,
}

/// Data directory configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Override the default data directory (logs live under it).
    pub data_dir: Option<PathBuf>,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 50,
            mouse_enabled: true,
            narrow_below: 80,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            timeout_secs: 15,
        }
    }
}

impl Default for InvoiceConfig {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            tax_rate: Decimal::ZERO,
        }
    }
}

impl AppConfig {
    /// Load configuration from `~/.config/invoicer/config.toml`, then apply
    /// environment overrides.
    /// Falls back to `Default` if the file is missing or unparseable.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        let mut config = match std::fs::read_to_string(&config_path) {
            Ok(contents) => Self::from_toml(&contents).unwrap_or_else(|e| {
                log::warn!(
                    "Failed to parse config at {}: {e} - using defaults",
                    config_path.display()
                );
                Self::default()
            }),
            Err(_) => {
                log::debug!(
                    "No config file at {} - using defaults",
                    config_path.display()
                );
                Self::default()
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Overlay values from the environment. The lookup is injected so tests
    /// don't touch the process environment.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_BACKEND_URL).filter(|v| !v.trim().is_empty()) {
            self.backend.url = Some(url);
        }
        if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.trim().is_empty()) {
            self.backend.api_key = Some(key);
        }
    }

    /// Resolved data directory (override or XDG default).
    pub fn data_dir(&self) -> PathBuf {
        self.data.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("invoicer"))
                .unwrap_or_else(|| PathBuf::from("data"))
        })
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir().join("logs")
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("invoicer").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
