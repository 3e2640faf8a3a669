use std::path::PathBuf;
use std::sync::OnceLock;

static COLABMSA_HOME: OnceLock<PathBuf> = OnceLock::new();

/// Get the colabmsa home directory
/// Checks COLABMSA_HOME environment variable, falls back to ${HOME}/.colabmsa
pub fn colabmsa_home() -> PathBuf {
    COLABMSA_HOME
        .get_or_init(|| {
            if let Ok(path) = std::env::var("COLABMSA_HOME") {
                PathBuf::from(path)
            } else {
                let home = std::env::var("HOME").unwrap_or_else(|_| {
                    std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string())
                });
                PathBuf::from(home).join(".colabmsa")
            }
        })
        .clone()
}

/// Config file read when `--config` is not given
pub fn default_config_path() -> PathBuf {
    colabmsa_home().join("config.toml")
}
