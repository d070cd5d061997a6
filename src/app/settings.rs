use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(super) struct AppSettings {
    pub snap_to_grid: bool,
    pub grid_size: f32,
    /// Alignment width used while no page is rendered.
    pub container_width: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub zoom_step: f32,
    pub nudge_step: f32,
    pub nudge_step_fast: f32,
    /// Directory holding the pdfium shared library, if not installed system-wide.
    pub pdfium_dir: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            snap_to_grid: false,
            grid_size: 10.0,
            container_width: 612.0,
            min_scale: 0.5,
            max_scale: 2.0,
            zoom_step: 0.1,
            nudge_step: 1.0,
            nudge_step_fast: 10.0,
            pdfium_dir: None,
        }
    }
}

/// On-disk encoding, picked from the file extension. Files are read leniently:
/// a `.toml` file holding JSON (or the other way round) still loads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum SettingsFormat {
    Toml,
    Json,
}

#[derive(Debug, Error)]
pub(super) enum SettingsError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is neither TOML nor JSON settings")]
    Parse { path: String },
    #[error("cannot encode settings: {0}")]
    Encode(String),
}

impl SettingsFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Json,
        }
    }

    fn other(self) -> Self {
        match self {
            Self::Toml => Self::Json,
            Self::Json => Self::Toml,
        }
    }

    fn parse(self, text: &str) -> Option<AppSettings> {
        let parsed = match self {
            Self::Toml => toml::from_str::<AppSettings>(text).map_err(|e| e.to_string()),
            Self::Json => serde_json::from_str::<AppSettings>(text).map_err(|e| e.to_string()),
        };
        parsed
            .map_err(|e| log::debug!("settings are not {self:?}: {e}"))
            .ok()
    }

    fn encode(self, settings: &AppSettings) -> Result<String, SettingsError> {
        match self {
            Self::Toml => toml::to_string_pretty(settings).map_err(|e| SettingsError::Encode(e.to_string())),
            Self::Json => {
                serde_json::to_string_pretty(settings).map_err(|e| SettingsError::Encode(e.to_string()))
            }
        }
    }
}

pub(super) fn load_settings(path: impl AsRef<Path>) -> Result<AppSettings, SettingsError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let format = SettingsFormat::for_path(path);
    format
        .parse(&text)
        .or_else(|| format.other().parse(&text))
        .ok_or_else(|| {
            log::warn!("could not parse settings at {}, using defaults", path.display());
            SettingsError::Parse {
                path: path.display().to_string(),
            }
        })
}

pub(super) fn save_settings(path: impl AsRef<Path>, settings: &AppSettings) -> Result<(), SettingsError> {
    let path = path.as_ref();
    let text = SettingsFormat::for_path(path).encode(settings)?;
    std::fs::write(path, text).map_err(|source| SettingsError::Io {
        path: path.display().to_string(),
        source,
    })
}
