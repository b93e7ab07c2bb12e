//! Loading `EngineConfig` from JSON.

use std::path::Path;

use schoolnav_logic::EngineConfig;

use crate::error::ProviderError;

/// Parse and validate a JSON config. Missing fields take their defaults.
pub fn config_from_json(json: &str) -> Result<EngineConfig, ProviderError> {
    let config: EngineConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

pub async fn load_config(path: impl AsRef<Path>) -> Result<EngineConfig, ProviderError> {
    let json = tokio::fs::read_to_string(path).await?;
    config_from_json(&json)
}
