use serde::Deserialize;

/// Application configuration, loaded from environment variables with the
/// `BUDGET_PILOT__` prefix (e.g. `BUDGET_PILOT__API__HTTP_PORT=8080`).
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub import: ImportConfig,

    #[serde(default)]
    pub sheets: SheetsConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,

    #[serde(default)]
    pub persistence: PersistenceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    /// Upload size cap in bytes. Payloads over this are rejected before
    /// parsing.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SheetsConfig {
    /// Google Sheets API key. Remote imports are refused when empty.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_sheets_range")]
    pub range: String,

    #[serde(default = "default_sheets_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
    /// Path the campaign snapshot is written to on sync.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_max_file_bytes() -> u64 {
    5 * 1024 * 1024
}

fn default_sheets_range() -> String {
    "A1:Z1000".to_string()
}

fn default_sheets_timeout_secs() -> u64 {
    15
}

fn default_metrics_port() -> u16 {
    9091
}

fn default_snapshot_path() -> String {
    "budget-pilot-campaigns.json".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            range: default_sheets_range(),
            timeout_secs: default_sheets_timeout_secs(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            port: default_metrics_port(),
        }
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            import: ImportConfig::default(),
            sheets: SheetsConfig::default(),
            metrics: MetricsConfig::default(),
            persistence: PersistenceConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from the environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        let cfg = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("BUDGET_PILOT")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(","),
            )
            .build()?;
        cfg.try_deserialize()
    }
}
