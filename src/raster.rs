/// Glyph rasterization contract plus the fontdue-backed implementation.
/// Outline coordinates are bottom-up; the reported glyph origin points at
/// the top of the bitmap above the baseline, and the collector flips it
/// into the atlas' top-down convention.

use crate::atlas::descriptor::{FontSpec, FontStyle};
use crate::atlas::glyph::Abc;
use crate::error::BuildError;
use crate::geom::Vec2i;
use font_kit::family_name::FamilyName;
use font_kit::properties::{Properties, Style, Weight};
use font_kit::source::SystemSource;
use image::{Rgba, RgbaImage};
use std::path::Path;

/// A rasterized glyph: an RGBA buffer whose alpha channel carries the
/// coverage, plus the glyph origin relative to the pen position (X right,
/// Y up from the baseline to the top of the bitmap).
#[derive(Debug, Clone)]
pub struct RasterGlyph {
    pub image: RgbaImage,
    pub origin: Vec2i,
}

pub trait GlyphRasterizer {
    /// Rasterize one code point. `Ok(None)` means the glyph has no visible
    /// ink (whitespace); a per-code failure is not fatal to a build.
    fn rasterize(&self, ch: char) -> Result<Option<RasterGlyph>, BuildError>;

    /// ABC advance widths for one code point.
    fn abc_widths(&self, ch: char) -> Result<Abc, BuildError>;

    /// Font cell height in pixels, recorded in the atlas metadata.
    fn line_height(&self) -> i32;
}

pub struct FontdueRasterizer {
    font: fontdue::Font,
    px: f32,
}

impl FontdueRasterizer {
    /// Load from raw font bytes.
    pub fn from_bytes(data: &[u8], px: f32) -> Result<Self, BuildError> {
        let font = fontdue::Font::from_bytes(data, fontdue::FontSettings::default())
            .map_err(|e| BuildError::FontLoad(e.to_string()))?;
        Ok(Self { font, px })
    }

    /// Resolve a font spec: a direct file path when one exists, otherwise
    /// a system font lookup by family name and style.
    pub fn from_spec(spec: &FontSpec) -> Result<Self, BuildError> {
        let path = Path::new(&spec.name);
        if path.is_file() {
            let data = std::fs::read(path)?;
            return Self::from_bytes(&data, spec.size);
        }

        let mut properties = Properties::new();
        if spec.style.contains(FontStyle::BOLD) {
            properties.weight = Weight::BOLD;
        }
        if spec.style.contains(FontStyle::ITALIC) {
            properties.style = Style::Italic;
        }

        let handle = SystemSource::new()
            .select_best_match(&[FamilyName::Title(spec.name.clone())], &properties)
            .map_err(|_| BuildError::FontNotFound(spec.name.clone()))?;
        let font = handle
            .load()
            .map_err(|e| BuildError::FontLoad(e.to_string()))?;
        let data = font
            .copy_font_data()
            .ok_or_else(|| BuildError::FontLoad(format!("no font data for {}", spec.name)))?;

        log::debug!("resolved font {} -> {}", spec.name, font.full_name());
        Self::from_bytes(&data, spec.size)
    }
}

impl GlyphRasterizer for FontdueRasterizer {
    fn rasterize(&self, ch: char) -> Result<Option<RasterGlyph>, BuildError> {
        let (metrics, coverage) = self.font.rasterize(ch, self.px);
        if metrics.width == 0 || metrics.height == 0 {
            return Ok(None);
        }

        let mut image = RgbaImage::new(metrics.width as u32, metrics.height as u32);
        for (pixel, alpha) in image.pixels_mut().zip(coverage.iter()) {
            *pixel = Rgba([255, 255, 255, *alpha]);
        }

        // ymin runs from the baseline to the bitmap bottom
        let top = metrics.ymin + metrics.height as i32;
        Ok(Some(RasterGlyph {
            image,
            origin: Vec2i::new(metrics.xmin, top),
        }))
    }

    fn abc_widths(&self, ch: char) -> Result<Abc, BuildError> {
        let metrics = self.font.metrics(ch, self.px);
        let a = metrics.xmin;
        let b = metrics.width as i32;
        let c = metrics.advance_width.round() as i32 - a - b;
        Ok(Abc::new(a, b, c))
    }

    fn line_height(&self) -> i32 {
        self.font
            .horizontal_line_metrics(self.px)
            .map(|lm| (lm.ascent - lm.descent + lm.line_gap).round() as i32)
            .unwrap_or((self.px * 1.2) as i32)
    }
}
