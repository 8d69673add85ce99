/// Transparent-border cropping: scans the alpha channel for the minimal
/// bounding box of visible pixels and returns a cropped copy plus the
/// offset needed to re-align it at render time.

use crate::geom::Vec2i;
use image::RgbaImage;

#[derive(Debug, Clone)]
pub struct CroppedImage {
    pub image: RgbaImage,
    /// How far the crop shifted the content; added back at render time so
    /// the glyph still lines up at its original anchor.
    pub offset: Vec2i,
}

/// Crops `image` to the smallest rectangle containing every pixel with a
/// non-zero alpha. A fully transparent image comes back unmodified with a
/// zero offset. The input is never mutated.
pub fn crop_image(image: &RgbaImage) -> CroppedImage {
    let mut min = Vec2i::new(i32::MAX, i32::MAX);
    let mut max = Vec2i::new(i32::MIN, i32::MIN);

    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[3] != 0 {
            let (x, y) = (x as i32, y as i32);
            if x < min.x {
                min.x = x;
            }
            if y < min.y {
                min.y = y;
            }
            if x > max.x {
                max.x = x;
            }
            if y > max.y {
                max.y = y;
            }
        }
    }

    // no visible pixels: hand back the whole buffer untouched
    if max.x < min.x {
        return CroppedImage {
            image: image.clone(),
            offset: Vec2i::ZERO,
        };
    }

    let width = (max.x - min.x + 1) as u32;
    let height = (max.y - min.y + 1) as u32;
    let cropped =
        image::imageops::crop_imm(image, min.x as u32, min.y as u32, width, height).to_image();

    CroppedImage {
        image: cropped,
        offset: min,
    }
}
