//! RON persistence for [`GalaxyParams`]

use std::path::{Path, PathBuf};

use bevy::prelude::*;

use super::{GalaxyError, GalaxyParams};

pub const DEFAULT_PARAMS_PATH: &str = "galaxy.ron";

/// Where the parameter panel saves to and loads from
#[derive(Resource, Clone, Debug)]
pub struct ParamsPath(pub PathBuf);

#[derive(thiserror::Error, Debug)]
pub enum ParamsFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("{0}")]
    Invalid(#[from] GalaxyError),
}

impl GalaxyParams {
    /// Parses and validates a RON document, missing fields take their defaults.
    /// Files are also held to the panel's particle budget.
    pub fn from_ron_str(contents: &str) -> Result<Self, ParamsFileError> {
        let params: Self =
            ron::from_str(contents).map_err(|e| ParamsFileError::Parse(e.to_string()))?;
        params.validate()?;
        if params.count > Self::MAX.count {
            return Err(GalaxyError::InvalidParameter {
                field: "count",
                value: params.count.to_string(),
            }
            .into());
        }
        Ok(params)
    }

    pub fn to_ron_string(&self) -> Result<String, ParamsFileError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ParamsFileError::Serialize(e.to_string()))
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ParamsFileError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ParamsFileError> {
        let contents = self.to_ron_string()?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Linear rgb stored as an sRGB `#rrggbb` string
pub(crate) mod hex_color {
    use bevy::color::{LinearRgba, Srgba};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(color: &[f32; 3], serializer: S) -> Result<S::Ok, S::Error> {
        let [r, g, b] = *color;
        serializer.serialize_str(&Srgba::from(LinearRgba::rgb(r, g, b)).to_hex())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[f32; 3], D::Error> {
        let hex = String::deserialize(deserializer)?;
        let linear = LinearRgba::from(Srgba::hex(&hex).map_err(serde::de::Error::custom)?);
        Ok([linear.red, linear.green, linear.blue])
    }
}
