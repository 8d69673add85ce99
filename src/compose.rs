/// Canvas compositing: allocates one RGBA canvas per reported size and
/// blits each placed glyph's pixels onto its page.

use crate::atlas::descriptor::AtlasDescriptor;
use crate::atlas::glyph::GlyphCollection;
use crate::geom::Vec2i;
use image::RgbaImage;

pub fn build_images(
    sizes: &[Vec2i],
    glyphs: &GlyphCollection,
    desc: &AtlasDescriptor,
) -> Vec<RgbaImage> {
    let mut canvases: Vec<RgbaImage> = sizes
        .iter()
        .map(|size| RgbaImage::new(size.x.max(0) as u32, size.y.max(0) as u32))
        .collect();

    let spacing = desc.spacing();
    for glyph in glyphs.iter() {
        if let Some(pixels) = &glyph.image {
            image::imageops::replace(
                &mut canvases[glyph.page],
                pixels,
                (glyph.x + spacing) as i64,
                (glyph.y + spacing) as i64,
            );
        }
    }

    canvases
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::glyph::{Abc, GlyphDescriptor};
    use image::Rgba;

    #[test]
    fn test_blit_lands_inside_padding() {
        let mut pixels = RgbaImage::new(2, 2);
        for p in pixels.pixels_mut() {
            *p = Rgba([255, 0, 0, 255]);
        }

        let mut desc = AtlasDescriptor::new();
        desc.set_spacing(1);
        let mut glyphs = GlyphCollection::new();
        let mut glyph = GlyphDescriptor::new(65, Abc::default(), pixels, desc.spacing());
        glyph.x = 4;
        glyph.y = 2;
        glyphs.push(glyph);

        let canvases = build_images(&[Vec2i::new(16, 16)], &glyphs, &desc);
        assert_eq!(canvases.len(), 1);
        // glyph pixels start one spacing pixel inside the padded rect
        assert_eq!(canvases[0].get_pixel(5, 3)[0], 255);
        assert_eq!(canvases[0].get_pixel(5, 3)[3], 255);
        assert_eq!(canvases[0].get_pixel(4, 2)[3], 0);
    }

    #[test]
    fn test_empty_glyph_draws_nothing() {
        let mut glyphs = GlyphCollection::new();
        glyphs.push(GlyphDescriptor::empty(32, Abc::new(0, 4, 0)));
        let desc = AtlasDescriptor::new();
        let canvases = build_images(&[Vec2i::new(8, 8)], &glyphs, &desc);
        assert!(canvases[0].pixels().all(|p| p[3] == 0));
    }
}
