/// Glyph descriptors: one packable unit (a font character's ink or a
/// standalone image) plus its advance metrics and assigned atlas position.

use crate::geom::Vec2i;
use image::RgbaImage;

/// Three-part horizontal advance: left bearing (may be negative), ink
/// width plus inter-character gap, right bearing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Abc {
    pub a: i32,
    pub b: i32,
    pub c: i32,
}

impl Abc {
    pub fn new(a: i32, b: i32, c: i32) -> Self {
        Self { a, b, c }
    }

    /// Total horizontal advance.
    pub fn advance(&self) -> i32 {
        self.a + self.b + self.c
    }
}

#[derive(Debug, Clone)]
pub struct GlyphDescriptor {
    /// Character code or assigned image code; unique within a collection.
    pub code: u32,
    /// Owned pixel buffer; absent for a synthetic space glyph.
    pub image: Option<RgbaImage>,
    /// Padded width: raw image width plus spacing on both sides.
    pub width: i32,
    /// Padded height: raw image height plus spacing on both sides.
    pub height: i32,
    pub abc: Abc,
    /// Rendering-origin adjustment (e.g. for cropped transparent borders).
    pub offset: Vec2i,
    /// Canvas index assigned by the packer.
    pub page: usize,
    /// Top-left position on the canvas, including spacing padding.
    pub x: i32,
    pub y: i32,
    /// Originating image file name, for serialization.
    pub source: Option<String>,
}

impl GlyphDescriptor {
    /// Glyph backed by a pixel buffer. `spacing` is applied per side on
    /// both axes.
    pub fn new(code: u32, abc: Abc, image: RgbaImage, spacing: i32) -> Self {
        let width = image.width() as i32 + spacing * 2;
        let height = image.height() as i32 + spacing * 2;
        Self {
            code,
            image: Some(image),
            width,
            height,
            abc,
            offset: Vec2i::ZERO,
            page: 0,
            x: 0,
            y: 0,
            source: None,
        }
    }

    /// Metrics-only glyph with no drawn pixels (synthetic space).
    pub fn empty(code: u32, abc: Abc) -> Self {
        Self {
            code,
            image: None,
            width: 0,
            height: 0,
            abc,
            offset: Vec2i::ZERO,
            page: 0,
            x: 0,
            y: 0,
            source: None,
        }
    }

    /// Padded area, the packing sort key.
    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }
}

/// Ordered glyph list with lookup by code. Insertion order carries no
/// meaning; the packer always re-sorts.
#[derive(Debug, Default)]
pub struct GlyphCollection {
    glyphs: Vec<GlyphDescriptor>,
}

impl GlyphCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, glyph: GlyphDescriptor) {
        self.glyphs.push(glyph);
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn find(&self, code: u32) -> Option<&GlyphDescriptor> {
        self.glyphs.iter().find(|g| g.code == code)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GlyphDescriptor> {
        self.glyphs.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, GlyphDescriptor> {
        self.glyphs.iter_mut()
    }

    /// Ascending code order, used by the grid packer and the writer.
    pub fn sort_by_code(&mut self) {
        self.glyphs.sort_by_key(|g| g.code);
    }

    /// Descending padded area, largest first; ties break on code so
    /// placement stays deterministic.
    pub fn sort_by_area(&mut self) {
        self.glyphs.sort_by_key(|g| (std::cmp::Reverse(g.area()), g.code));
    }
}
