use serde::Deserialize;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
    #[serde(default)]
    pub session: SessionSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct BackendSettings {
    /// Base URL; each operation is POSTed to `{url}/{operation}`.
    pub url: String,
    /// No timeout unless set.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct TelemetrySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Clone, Debug)]
pub struct SessionSettings {
    #[serde(default)]
    pub secure_cookie: bool,
    #[serde(default = "default_inactivity_hours")]
    pub inactivity_hours: i64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            secure_cookie: false,
            inactivity_hours: default_inactivity_hours(),
        }
    }
}

fn default_inactivity_hours() -> i64 {
    24
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    service_core::config::load_settings("admin-console")
}
