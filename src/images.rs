/// Standalone image sources: decoded PNG files that become image glyphs,
/// each with an origin offset and an optional explicit glyph code.

use crate::error::BuildError;
use crate::geom::Vec2f;
use image::RgbaImage;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ImageSource {
    pub path: PathBuf,
    pub image: RgbaImage,
    /// Rendering-origin offset declared for this image.
    pub offset: Vec2f,
    /// Explicit glyph code; only meaningful when `has_custom_code` is set.
    pub code: u32,
    pub has_custom_code: bool,
}

impl ImageSource {
    pub fn from_file(path: &Path) -> Result<Self, BuildError> {
        let image = image::open(path)
            .map_err(|source| BuildError::ImageRead {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        Ok(Self {
            path: path.to_path_buf(),
            image,
            offset: Vec2f::ZERO,
            code: 0,
            has_custom_code: false,
        })
    }

    /// File name portion, used in atlas metadata.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Collects png files under `dir`, optionally recursing into
/// subdirectories. Results are sorted by path so builds are repeatable.
pub fn collect_image_files(dir: &Path, recurse: bool) -> Result<Vec<PathBuf>, BuildError> {
    let mut files = Vec::new();
    scan_dir(dir, recurse, &mut files)?;
    files.sort();
    Ok(files)
}

fn scan_dir(dir: &Path, recurse: bool, files: &mut Vec<PathBuf>) -> Result<(), BuildError> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if recurse {
                scan_dir(&path, recurse, files)?;
            }
        } else if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
        {
            files.push(path);
        }
    }
    Ok(())
}
