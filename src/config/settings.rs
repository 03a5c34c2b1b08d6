use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub auth: AuthSettings,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ApiSettings {
    #[serde(default)]
    pub base_url: Option<String>,
    /// Request timeout; requests wait indefinitely when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct AuthSettings {
    #[serde(default)]
    pub access_token: Option<String>,
}
