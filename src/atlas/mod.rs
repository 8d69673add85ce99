pub mod collect;
pub mod crop;
pub mod descriptor;
pub mod glyph;
pub mod pack;
pub mod sprite;

pub use collect::collect_glyphs;
pub use crop::{crop_image, CroppedImage};
pub use descriptor::{AtlasDescriptor, FontSpec, FontStyle, GlyphAlignment};
pub use glyph::{Abc, GlyphCollection, GlyphDescriptor};
pub use pack::place_glyphs;
pub use sprite::{OverflowAction, SpriteDescriptor};
