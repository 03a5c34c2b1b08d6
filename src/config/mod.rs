mod settings;

pub use settings::{ApiSettings, AuthSettings, Config};

use crate::error::{BillingError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.tirta/)
pub fn config_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "tirta") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.tirta/
    let home = std::env::var_os("HOME").map(PathBuf::from).ok_or_else(|| {
        BillingError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".tirta"))
}

/// Load config.toml from the config directory
pub fn load_config(config_dir: &Path) -> Result<Config> {
    if !config_dir.exists() {
        return Err(BillingError::ConfigNotFound(config_dir.to_path_buf()));
    }
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(BillingError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| BillingError::ConfigParse { path, source: e })
}

/// Load config.toml, falling back to an empty config when the directory
/// has not been initialized. A present but malformed file is still an error.
pub fn load_config_or_default(config_dir: &Path) -> Result<Config> {
    match load_config(config_dir) {
        Err(BillingError::ConfigNotFound(_)) | Err(BillingError::ConfigFileNotFound(_)) => {
            Ok(Config::default())
        }
        other => other,
    }
}

/// Create the config directory and write the config.toml template
pub fn init_config(config_dir: &Path) -> Result<PathBuf> {
    if config_dir.exists() {
        return Err(BillingError::AlreadyInitialized(config_dir.to_path_buf()));
    }

    fs::create_dir_all(config_dir)?;
    let path = config_dir.join("config.toml");
    fs::write(&path, CONFIG_TEMPLATE)?;
    Ok(path)
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[api]
base_url = "http://localhost:8080"
# timeout_secs = 30   # optional, requests wait indefinitely when unset

[auth]
# Bearer token used for the billing API. TIRTA_ACCESS_TOKEN or --token
# take precedence over this value.
# access_token = "your-access-token"
"#;
