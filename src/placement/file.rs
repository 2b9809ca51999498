//! JSON schema for placement output files

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::placement::record::PlacementRecord;

pub const PLACEMENT_FILE_VERSION: u32 = 1;

/// Root structure for placement JSON files
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlacementFile {
    /// Schema version (currently 1)
    pub version: u32,
    #[serde(default)]
    pub metadata: Option<PlacementMetadata>,
    pub placements: Vec<PlacementRecord>,
}

/// Describes the run that produced a placement file
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PlacementMetadata {
    #[serde(default)]
    pub name: Option<String>,
    /// Tool or process that created this file
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub tiles_x: Option<u32>,
    #[serde(default)]
    pub tiles_y: Option<u32>,
    #[serde(default)]
    pub tile_size: Option<f32>,
}

impl PlacementFile {
    pub fn new(placements: Vec<PlacementRecord>, metadata: Option<PlacementMetadata>) -> Self {
        Self {
            version: PLACEMENT_FILE_VERSION,
            metadata,
            placements,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
