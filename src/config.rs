/// Project files: TOML snapshots of build settings. The command line can
/// start from a project file and override individual values with flags.

use crate::error::BuildError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub output: String,
    pub font: FontSection,
    pub images: ImageSection,
    pub layout: LayoutSection,
    pub sprite: SpriteSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSection {
    pub name: String,
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
    pub force_space: bool,
    pub char_sets: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSection {
    pub path: String,
    pub recurse: bool,
    pub center: bool,
    pub origin_x: f32,
    pub origin_y: f32,
    pub start_code: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSection {
    pub alignment: String,
    pub spacing: i32,
    pub power_two: bool,
    pub multi_texture: bool,
    pub max_size: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteSection {
    pub enabled: bool,
    pub rate: f32,
    pub overflow: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            output: String::new(),
            font: FontSection::default(),
            images: ImageSection::default(),
            layout: LayoutSection::default(),
            sprite: SpriteSection::default(),
        }
    }
}

impl Default for FontSection {
    fn default() -> Self {
        Self {
            name: String::new(),
            size: 24.0,
            bold: false,
            italic: false,
            force_space: true,
            char_sets: Vec::new(),
        }
    }
}

impl Default for ImageSection {
    fn default() -> Self {
        Self {
            path: String::new(),
            recurse: false,
            center: false,
            origin_x: 0.0,
            origin_y: 0.0,
            start_code: 0,
        }
    }
}

impl Default for LayoutSection {
    fn default() -> Self {
        Self {
            alignment: "BestFit".into(),
            spacing: 1,
            power_two: false,
            multi_texture: false,
            max_size: 2048,
        }
    }
}

impl Default for SpriteSection {
    fn default() -> Self {
        Self {
            enabled: false,
            rate: 10.0,
            overflow: "Loop".into(),
        }
    }
}

impl ProjectConfig {
    pub fn load(path: &Path) -> Result<Self, BuildError> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|source| BuildError::Project {
            path: path.to_path_buf(),
            source,
        })
    }
}
