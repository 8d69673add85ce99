/// End-to-end build orchestration: collect glyphs, place them, composite
/// the canvases and write the output files. Shared by the command line
/// path and the interactive console.

use crate::atlas::collect::collect_glyphs;
use crate::atlas::descriptor::AtlasDescriptor;
use crate::atlas::pack::place_glyphs;
use crate::atlas::sprite::SpriteDescriptor;
use crate::cancel::CancelToken;
use crate::charset::CharSetProvider;
use crate::compose::build_images;
use crate::error::BuildError;
use crate::geom::Vec2i;
use crate::raster::{FontdueRasterizer, GlyphRasterizer};
use crate::writer::save_atlas;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct BuildReport {
    pub glyphs: usize,
    pub pages: Vec<Vec2i>,
    pub files: Vec<PathBuf>,
}

/// Runs a full build. The progress callback receives a phase label and a
/// fraction in (0, 1] after each unit of work.
pub fn run_build(
    desc: &mut AtlasDescriptor,
    sets: &CharSetProvider,
    sprite: &SpriteDescriptor,
    out_file: &Path,
    mut progress: Option<&mut dyn FnMut(&str, f32)>,
    cancel: Option<&CancelToken>,
) -> Result<BuildReport, BuildError> {
    let raster = if desc.use_fonts {
        Some(FontdueRasterizer::from_spec(&desc.font)?)
    } else {
        None
    };
    let raster_ref = raster.as_ref().map(|r| r as &dyn GlyphRasterizer);

    let mut glyphs = {
        let mut report = |f: f32| {
            if let Some(p) = progress.as_deref_mut() {
                p("Collect", f);
            }
        };
        collect_glyphs(desc, sets, raster_ref, Some(&mut report), cancel)?
    };

    if glyphs.is_empty() {
        return Err(BuildError::NoGlyphs);
    }
    log::debug!("collected {} glyphs", glyphs.len());

    let pages = {
        let mut report = |f: f32| {
            if let Some(p) = progress.as_deref_mut() {
                p("Placement", f);
            }
        };
        place_glyphs(&mut glyphs, desc, Some(&mut report), cancel)?
    };

    let canvases = build_images(&pages, &glyphs, desc);
    let font_height = raster.as_ref().map(|r| r.line_height());
    let files = save_atlas(out_file, &canvases, &mut glyphs, desc, sprite, font_height)?;

    Ok(BuildReport {
        glyphs: glyphs.len(),
        pages,
        files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_image_only_build_end_to_end() {
        let dir = std::env::temp_dir().join("atlas_test_build");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        for (name, edge) in [("a.png", 6u32), ("b.png", 4), ("c.png", 8)] {
            let mut img = RgbaImage::new(edge, edge);
            for p in img.pixels_mut() {
                *p = Rgba([255, 255, 255, 255]);
            }
            img.save(dir.join(name)).unwrap();
        }

        let mut desc = AtlasDescriptor::new();
        desc.use_images = true;
        desc.max_size = 64;
        for name in ["a.png", "b.png", "c.png"] {
            desc.images
                .push(crate::images::ImageSource::from_file(&dir.join(name)).unwrap());
        }

        let sets = CharSetProvider::with_builtins();
        let report = run_build(
            &mut desc,
            &sets,
            &SpriteDescriptor::default(),
            &dir.join("out").join("sheet.atlas"),
            None,
            None,
        )
        .unwrap();

        assert_eq!(report.glyphs, 3);
        assert_eq!(report.pages.len(), 1);
        assert!(dir.join("out").join("sheet.atlas").is_file());
        assert!(dir.join("out").join("sheet0.png").is_file());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_empty_build_is_an_error() {
        let mut desc = AtlasDescriptor::new();
        desc.use_images = true; // enabled but no sources listed
        let sets = CharSetProvider::with_builtins();
        let result = run_build(
            &mut desc,
            &sets,
            &SpriteDescriptor::default(),
            Path::new("unused.atlas"),
            None,
            None,
        );
        assert!(matches!(result, Err(BuildError::NoGlyphs)));
    }
}
