//! Configuration file loading.
//!
//! Lookup order: `--config`, then `<config dir>/pinvid/config.toml` if it
//! exists, then built-in defaults. Command-line flags are applied on top.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pinvid::PinvidConfig;
use tracing::debug;

use crate::cli::Args;

const APP_DIR: &str = "pinvid";
const CONFIG_FILE: &str = "config.toml";

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// Load the configuration. An explicit path must exist; the default path is
/// optional.
pub fn load(explicit: Option<&Path>) -> Result<PinvidConfig> {
    match explicit {
        Some(path) => read(path),
        None => match default_config_path() {
            Some(path) if path.is_file() => read(&path),
            _ => {
                debug!("no config file, using defaults");
                Ok(PinvidConfig::default())
            }
        },
    }
}

fn read(path: &Path) -> Result<PinvidConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config = toml::from_str(&content)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Apply command-line overrides.
pub fn apply_args(mut config: PinvidConfig, args: &Args) -> PinvidConfig {
    if let Some(path) = &args.ffmpeg_path {
        config.mux.ffmpeg_path = Some(path.clone());
    }
    if let Some(watermark) = &args.watermark {
        config.mux.watermark = watermark.clone();
    }
    if let Some(user_agent) = &args.user_agent {
        config.http.user_agent = Some(user_agent.clone());
    }
    if let Some(timeout) = args.timeout {
        config.http.timeout_secs = Some(timeout);
    }
    config
}
