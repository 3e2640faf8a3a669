pub mod hits;
pub mod search;

use crate::core::config::{load_config, Config};
use crate::core::paths::default_config_path;
use std::path::Path;

/// Config from `path`, else the default config file if it exists, else
/// built-in defaults. `host_url` overrides whatever was loaded.
pub fn resolve_config(path: Option<&Path>, host_url: Option<&str>) -> anyhow::Result<Config> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => {
            let default_path = default_config_path();
            if default_path.is_file() {
                tracing::debug!("Loading config from {}", default_path.display());
                load_config(&default_path)?
            } else {
                Config::default()
            }
        }
    };

    if let Some(host_url) = host_url {
        config.server.host_url = host_url.to_string();
    }
    config.validate()?;
    Ok(config)
}
