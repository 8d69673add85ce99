/// Glyph collection: expands character sets, rasterizes font glyphs, crops
/// image sources and assigns codes, producing the packable glyph list.

use crate::atlas::crop::crop_image;
use crate::atlas::descriptor::AtlasDescriptor;
use crate::atlas::glyph::{Abc, GlyphCollection, GlyphDescriptor};
use crate::cancel::CancelToken;
use crate::charset::CharSetProvider;
use crate::error::BuildError;
use crate::geom::Vec2i;
use crate::images::ImageSource;
use crate::raster::GlyphRasterizer;
use std::collections::BTreeSet;

/// Gathers every glyph for a build: image sources first, then rasterized
/// font characters, then the optional synthetic space. Progress runs in
/// (0, 1] with a single running total across both phases; the cancel token
/// is checked after each unit of work.
pub fn collect_glyphs(
    desc: &AtlasDescriptor,
    sets: &CharSetProvider,
    raster: Option<&dyn GlyphRasterizer>,
    mut progress: Option<&mut dyn FnMut(f32)>,
    cancel: Option<&CancelToken>,
) -> Result<GlyphCollection, BuildError> {
    desc.validate(sets)?;

    let mut chars: BTreeSet<char> = BTreeSet::new();
    if desc.use_fonts {
        for name in &desc.char_sets {
            chars.extend(sets.expand(name)?);
        }
    }

    let total = chars.len() + if desc.use_images { desc.images.len() } else { 0 };
    let mut current = 0usize;
    let mut glyphs = GlyphCollection::new();

    if desc.use_images {
        let mut next_code = desc.start_code();

        for source in &desc.images {
            let width = source.image.width() as i32;
            let cropped = crop_image(&source.image);

            let abc = Abc::new(
                -(source.offset.x as i32),
                (width as f32 + source.offset.x) as i32,
                0,
            );
            let code = if source.has_custom_code {
                source.code
            } else {
                unique_code(&mut next_code, &desc.images)
            };

            let mut glyph = GlyphDescriptor::new(code, abc, cropped.image, desc.spacing());
            glyph.offset = cropped.offset - Vec2i::from(source.offset);
            glyph.source = Some(source.file_name());
            glyphs.push(glyph);

            current += 1;
            if let Some(report) = progress.as_deref_mut() {
                report(current as f32 / total as f32);
            }
            if let Some(token) = cancel {
                token.check()?;
            }
        }
    }

    if desc.use_fonts {
        let raster = raster.ok_or(BuildError::InvalidFont)?;

        for &ch in &chars {
            // a missing bitmap (whitespace) or a per-code failure skips
            // that single code without aborting the pass
            let rastered = match raster.rasterize(ch) {
                Ok(Some(r)) => r,
                Ok(None) | Err(_) => continue,
            };
            let abc = match raster.abc_widths(ch) {
                Ok(abc) => abc,
                Err(_) => continue,
            };

            let mut glyph = GlyphDescriptor::new(ch as u32, abc, rastered.image, desc.spacing());
            // outline origins are bottom-up; atlas offsets are top-down
            glyph.offset = Vec2i::new(rastered.origin.x, -rastered.origin.y);
            glyphs.push(glyph);

            current += 1;
            if let Some(report) = progress.as_deref_mut() {
                report(current as f32 / total as f32);
            }
            if let Some(token) = cancel {
                token.check()?;
            }
        }

        if desc.force_space && glyphs.find(32).is_none() {
            let mut abc = raster.abc_widths(' ')?;
            // collapse to a zero-ink advance: the space draws nothing but
            // keeps the correct total width
            abc.b = abc.advance();
            abc.a = 0;
            abc.c = 0;
            glyphs.push(GlyphDescriptor::empty(32, abc));
        }
    }

    Ok(glyphs)
}

/// Next free code at or after `*next`, skipping codes claimed by
/// custom-coded sources. Advances `*next` past the returned code.
fn unique_code(next: &mut u32, images: &[ImageSource]) -> u32 {
    let mut code = *next;
    while images.iter().any(|i| i.has_custom_code && i.code == code) {
        code += 1;
    }
    *next = code + 1;
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Vec2f;
    use crate::raster::RasterGlyph;
    use image::{Rgba, RgbaImage};
    use std::path::PathBuf;

    /// Fixed-output rasterizer: every printable character is a 4x6 opaque
    /// block; listed codes fail; whitespace yields no bitmap.
    struct TestRasterizer {
        failing: Vec<char>,
    }

    impl TestRasterizer {
        fn new() -> Self {
            Self { failing: Vec::new() }
        }
    }

    impl GlyphRasterizer for TestRasterizer {
        fn rasterize(&self, ch: char) -> Result<Option<RasterGlyph>, BuildError> {
            if self.failing.contains(&ch) {
                return Err(BuildError::FontLoad(format!("no outline for {ch}")));
            }
            if ch.is_whitespace() {
                return Ok(None);
            }
            let mut image = RgbaImage::new(4, 6);
            for pixel in image.pixels_mut() {
                *pixel = Rgba([255, 255, 255, 255]);
            }
            Ok(Some(RasterGlyph {
                image,
                origin: Vec2i::new(1, 5),
            }))
        }

        fn abc_widths(&self, _ch: char) -> Result<Abc, BuildError> {
            Ok(Abc::new(1, 4, 2))
        }

        fn line_height(&self) -> i32 {
            8
        }
    }

    fn font_descriptor(sets: &[&str]) -> AtlasDescriptor {
        let mut desc = AtlasDescriptor::new();
        desc.use_fonts = true;
        desc.char_sets = sets.iter().map(|s| s.to_string()).collect();
        desc.force_space = false;
        desc
    }

    fn image_source(name: &str, width: u32, height: u32) -> ImageSource {
        let mut image = RgbaImage::new(width, height);
        for pixel in image.pixels_mut() {
            *pixel = Rgba([255, 255, 255, 255]);
        }
        ImageSource {
            path: PathBuf::from(name),
            image,
            offset: Vec2f::ZERO,
            code: 0,
            has_custom_code: false,
        }
    }

    #[test]
    fn test_charsets_deduplicate() {
        // numbers appears twice; each code point must collapse to one glyph
        let desc = font_descriptor(&["numbers", "numbers"]);
        let sets = CharSetProvider::with_builtins();
        let raster = TestRasterizer::new();
        let glyphs = collect_glyphs(&desc, &sets, Some(&raster), None, None).unwrap();
        assert_eq!(glyphs.len(), 10);
    }

    #[test]
    fn test_failing_code_is_skipped() {
        let desc = font_descriptor(&["numbers"]);
        let sets = CharSetProvider::with_builtins();
        let raster = TestRasterizer { failing: vec!['5'] };
        let glyphs = collect_glyphs(&desc, &sets, Some(&raster), None, None).unwrap();
        assert_eq!(glyphs.len(), 9);
        assert!(glyphs.find('5' as u32).is_none());
    }

    #[test]
    fn test_whitespace_has_no_glyph() {
        let desc = font_descriptor(&["ascii"]);
        let sets = CharSetProvider::with_builtins();
        let raster = TestRasterizer::new();
        let glyphs = collect_glyphs(&desc, &sets, Some(&raster), None, None).unwrap();
        assert!(glyphs.find(32).is_none());
    }

    #[test]
    fn test_force_space_synthesizes_blank_advance() {
        let mut desc = font_descriptor(&["numbers"]);
        desc.force_space = true;
        let sets = CharSetProvider::with_builtins();
        let raster = TestRasterizer::new();
        let glyphs = collect_glyphs(&desc, &sets, Some(&raster), None, None).unwrap();
        let space = glyphs.find(32).unwrap();
        assert!(space.image.is_none());
        assert_eq!(space.abc, Abc::new(0, 7, 0));
        assert_eq!(space.abc.advance(), 7);
    }

    #[test]
    fn test_glyph_offset_flips_y() {
        let desc = font_descriptor(&["numbers"]);
        let sets = CharSetProvider::with_builtins();
        let raster = TestRasterizer::new();
        let glyphs = collect_glyphs(&desc, &sets, Some(&raster), None, None).unwrap();
        let g = glyphs.find('0' as u32).unwrap();
        assert_eq!(g.offset, Vec2i::new(1, -5));
    }

    #[test]
    fn test_image_abc_from_offset() {
        let mut desc = AtlasDescriptor::new();
        desc.use_images = true;
        desc.set_spacing(0);
        let mut source = image_source("a.png", 10, 4);
        source.offset = Vec2f::new(2.0, 0.0);
        desc.images.push(source);

        let sets = CharSetProvider::with_builtins();
        let glyphs = collect_glyphs(&desc, &sets, None, None, None).unwrap();
        let g = glyphs.iter().next().unwrap();
        assert_eq!(g.abc, Abc::new(-2, 12, 0));
        assert_eq!(g.source.as_deref(), Some("a.png"));
    }

    #[test]
    fn test_unique_codes_skip_custom() {
        let mut desc = AtlasDescriptor::new();
        desc.use_images = true;
        desc.set_start_code(5);

        let mut custom_a = image_source("five.png", 2, 2);
        custom_a.code = 5;
        custom_a.has_custom_code = true;
        let mut custom_b = image_source("six.png", 2, 2);
        custom_b.code = 6;
        custom_b.has_custom_code = true;
        desc.images.push(image_source("auto1.png", 2, 2));
        desc.images.push(custom_a);
        desc.images.push(custom_b);
        desc.images.push(image_source("auto2.png", 2, 2));

        let sets = CharSetProvider::with_builtins();
        let glyphs = collect_glyphs(&desc, &sets, None, None, None).unwrap();
        let mut codes: Vec<u32> = glyphs.iter().map(|g| g.code).collect();
        codes.sort_unstable();
        assert_eq!(codes, vec![5, 6, 7, 8]);
    }

    #[test]
    fn test_progress_runs_across_phases() {
        let mut desc = font_descriptor(&["numbers"]);
        desc.use_images = true;
        desc.images.push(image_source("a.png", 2, 2));
        desc.set_start_code(1000);

        let sets = CharSetProvider::with_builtins();
        let raster = TestRasterizer::new();
        let mut reports = Vec::new();
        let mut on_progress = |f: f32| reports.push(f);
        let glyphs = collect_glyphs(&desc, &sets, Some(&raster), Some(&mut on_progress), None)
            .unwrap();

        assert_eq!(glyphs.len(), 11);
        assert_eq!(reports.len(), 11);
        assert!(reports.iter().all(|&f| f > 0.0 && f <= 1.0));
        assert!(reports.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*reports.last().unwrap(), 1.0);
    }

    #[test]
    fn test_cancellation_stops_collection() {
        let mut desc = AtlasDescriptor::new();
        desc.use_images = true;
        for i in 0..5 {
            desc.images.push(image_source(&format!("img{i}.png"), 2, 2));
        }

        let sets = CharSetProvider::with_builtins();
        let token = CancelToken::new();
        let cancel_after_two = token.clone();
        let mut seen = 0usize;
        let mut on_progress = move |_f: f32| {
            seen += 1;
            if seen == 2 {
                cancel_after_two.cancel();
            }
        };

        let result = collect_glyphs(&desc, &sets, None, Some(&mut on_progress), Some(&token));
        assert!(matches!(result, Err(BuildError::Cancelled)));
    }

    #[test]
    fn test_validation_runs_first() {
        let desc = AtlasDescriptor::new();
        let sets = CharSetProvider::with_builtins();
        assert!(matches!(
            collect_glyphs(&desc, &sets, None, None, None),
            Err(BuildError::NoSources)
        ));
    }
}
