use config::{Config, ConfigError, Environment, File};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Directory holding `base.yaml` for `crate_dir`, whether the process runs
/// from the workspace root or from the crate itself.
pub fn configuration_directory(base_path: &Path, crate_dir: &str) -> PathBuf {
    if base_path.ends_with(crate_dir) {
        base_path.join("config")
    } else {
        base_path.join(crate_dir).join("config")
    }
}

/// Load `config/base.yaml`, then overlay `APP_` environment variables
/// (`APP_SERVER__PORT=9000` sets `server.port`).
pub fn load_settings<T: DeserializeOwned>(crate_dir: &str) -> Result<T, ConfigError> {
    dotenvy::dotenv().ok();

    let base_path = std::env::current_dir().map_err(|e| {
        ConfigError::Message(format!("Failed to determine current directory: {}", e))
    })?;
    let directory = configuration_directory(&base_path, crate_dir);

    Config::builder()
        .add_source(File::from(directory.join("base.yaml")).required(true))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?
        .try_deserialize::<T>()
}
