//! File-backed configuration: runtime tuning, reference data and presets.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use poke_rpg_core::WorldGenerationConfig;
use poke_rpg_engine::{EngineConfig, ReferenceData, ReferenceDataError};
use thiserror::Error;

/// Reference data shipped with the binary.
pub(crate) const EMBEDDED_REFERENCE_DATA: &str = include_str!("../data/reference.json");

/// Errors raised while loading or saving configuration files.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// The file could not be read.
    #[error("could not read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The file could not be written.
    #[error("could not write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The tuning file is not valid TOML for [`EngineConfig`].
    #[error("invalid engine configuration in {}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// The preset is not a valid generation config.
    #[error("invalid generation preset in {}", path.display())]
    Preset {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The preset could not be rendered as JSON.
    #[error("could not serialise generation preset")]
    Serialize(#[source] serde_json::Error),
    /// The reference data file was rejected.
    #[error("invalid reference data in {}", path.display())]
    ReferenceData {
        path: PathBuf,
        #[source]
        source: ReferenceDataError,
    },
}

/// Reads runtime tuning from a TOML file; absent keys keep their defaults.
pub(crate) fn load_engine_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let contents = read(path)?;
    toml::from_str(&contents).map_err(|source| ConfigError::Toml {
        path: path.to_owned(),
        source,
    })
}

/// Reads a reference data document, or the embedded one when no path is given.
pub(crate) fn load_reference_data(path: Option<&Path>) -> Result<ReferenceData, ConfigError> {
    let Some(path) = path else {
        return ReferenceData::from_json(EMBEDDED_REFERENCE_DATA).map_err(|source| {
            ConfigError::ReferenceData {
                path: PathBuf::from("<embedded>"),
                source,
            }
        });
    };
    let contents = read(path)?;
    ReferenceData::from_json(&contents).map_err(|source| ConfigError::ReferenceData {
        path: path.to_owned(),
        source,
    })
}

/// Reads a JSON generation preset.
pub(crate) fn import_preset(path: &Path) -> Result<WorldGenerationConfig, ConfigError> {
    let contents = read(path)?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::Preset {
        path: path.to_owned(),
        source,
    })
}

/// Writes a generation preset as pretty-printed JSON.
pub(crate) fn export_preset(
    config: &WorldGenerationConfig,
    path: &Path,
) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(config).map_err(ConfigError::Serialize)?;
    fs::write(path, json).map_err(|source| ConfigError::Write {
        path: path.to_owned(),
        source,
    })
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_owned(),
        source,
    })
}
