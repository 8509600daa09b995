use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;
use tracing::{debug, warn};

use crate::domain::pricing::{PathRates, BULK_RATE, DEFAULT_TAX_RATE, RESALE_FEE_RATE};

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "LiquidityEngine";
const APP_NAME: &str = "LiquidityEngine";
const SETTINGS_FILE: &str = "settings.json";

/// Tunables for the calculators and the session.
///
/// Every field has a default, so a partial `settings.json` is valid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub resale_fee_rate: f64,
    pub bulk_rate: f64,
    pub default_tax_rate: f64,
    /// Clamp liquidity scores into `[0, 100]` before storing them.
    pub clamp_liquidity_score: bool,
    /// Products scoring below this are reported as at risk.
    pub at_risk_threshold: f64,
    pub notice_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            resale_fee_rate: RESALE_FEE_RATE,
            bulk_rate: BULK_RATE,
            default_tax_rate: DEFAULT_TAX_RATE,
            clamp_liquidity_score: false,
            at_risk_threshold: 40.0,
            notice_capacity: 5,
        }
    }
}

impl Settings {
    pub fn path_rates(&self) -> PathRates {
        PathRates {
            resale_fee_rate: self.resale_fee_rate,
            bulk_rate: self.bulk_rate,
        }
    }

    pub fn apply_score_policy(&self, score: f64) -> f64 {
        if self.clamp_liquidity_score {
            score.clamp(0.0, 100.0)
        } else {
            score
        }
    }
}

fn settings_file() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
}

/// Loads settings from the platform config directory, if present and valid.
pub fn load_settings() -> Option<Settings> {
    let path = settings_file()?;
    if !path.exists() {
        debug!(target: "settings", path = %path.display(), "no settings file");
        return None;
    }
    match load_settings_from(&path) {
        Ok(settings) => Some(settings),
        Err(err) => {
            warn!(target: "settings", path = %path.display(), "ignoring settings file: {err}");
            None
        }
    }
}

pub fn load_settings_from(path: &Path) -> Result<Settings, SettingsError> {
    let data = fs::read_to_string(path)?;
    let settings = serde_json::from_str(&data)?;
    debug!(target: "settings", path = %path.display(), "loaded settings");
    Ok(settings)
}

pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
}
