//! Loading and saving settings.json.

use std::path::{Path, PathBuf};

use crate::error::{GazeError, Result};
use crate::models::settings::{TrackerSettings, SCHEMA_VERSION};

const APP_DIR: &str = "GazeFocus";
const SETTINGS_FILE: &str = "settings.json";

/// `{config_dir}/GazeFocus/settings.json`.
pub fn settings_path() -> Result<PathBuf> {
    let base = dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .ok_or(GazeError::NoConfigDir)?;
    Ok(base.join(APP_DIR).join(SETTINGS_FILE))
}

pub fn load_settings() -> Result<TrackerSettings> {
    load_settings_from(&settings_path()?)
}

/// Reads settings from `path`. A missing file yields the defaults.
pub fn load_settings_from(path: &Path) -> Result<TrackerSettings> {
    if !path.exists() {
        log::info!("load_settings: {} not found, using defaults", path.display());
        return Ok(TrackerSettings::default());
    }

    let raw = std::fs::read_to_string(path).map_err(|e| GazeError::io(path, e))?;
    let settings: TrackerSettings =
        serde_json::from_str(&raw).map_err(|e| GazeError::json(path, e))?;

    if settings.schema_version != SCHEMA_VERSION {
        return Err(GazeError::UnsupportedSchema {
            kind: "settings",
            expected: SCHEMA_VERSION,
            actual: settings.schema_version,
        });
    }

    validate_screen(&settings)?;

    log::info!("load_settings: path={}", path.display());
    Ok(settings)
}

pub fn save_settings(settings: &TrackerSettings) -> Result<PathBuf> {
    let path = settings_path()?;
    save_settings_to(settings, &path)?;
    Ok(path)
}

pub fn save_settings_to(settings: &TrackerSettings, path: &Path) -> Result<()> {
    if settings.schema_version != SCHEMA_VERSION {
        return Err(GazeError::UnsupportedSchema {
            kind: "settings",
            expected: SCHEMA_VERSION,
            actual: settings.schema_version,
        });
    }

    validate_screen(settings)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| GazeError::io(parent, e))?;
    }

    let json = serde_json::to_string_pretty(settings).map_err(|e| GazeError::json(path, e))?;
    std::fs::write(path, json).map_err(|e| GazeError::io(path, e))?;

    log::info!("save_settings: path={}", path.display());
    Ok(())
}

fn validate_screen(settings: &TrackerSettings) -> Result<()> {
    if settings.screen.is_valid() {
        return Ok(());
    }
    Err(GazeError::InvalidScreen {
        width: settings.screen.width,
        height: settings.screen.height,
    })
}
