/// Build configuration: everything the collector and packer need to
/// produce an atlas, plus the grid layout outputs. Pure data with upfront
/// validation; the pipeline never mutates it except for grid results.

use crate::charset::CharSetProvider;
use crate::error::BuildError;
use crate::geom::Vec2i;
use crate::images::ImageSource;
use bitflags::bitflags;
use std::fmt;
use std::str::FromStr;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FontStyle: u8 {
        const BOLD   = 0b01;
        const ITALIC = 0b10;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    /// System font family name, or a path to a font file.
    pub name: String,
    /// Size in pixels.
    pub size: f32,
    pub style: FontStyle,
}

impl FontSpec {
    pub const MIN_SIZE: f32 = 4.0;

    pub fn set_size(&mut self, size: f32) {
        self.size = size.max(Self::MIN_SIZE);
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            name: "Arial".into(),
            size: 24.0,
            style: FontStyle::empty(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlyphAlignment {
    /// Greedy rectangle packing into an expanding used box.
    #[default]
    BestFit,
    /// Uniform fixed-size cells in ascending code order.
    Grid,
}

impl FromStr for GlyphAlignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bestfit" => Ok(Self::BestFit),
            "grid" => Ok(Self::Grid),
            _ => Err(format!("invalid alignment: {s} (BestFit|Grid)")),
        }
    }
}

impl fmt::Display for GlyphAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BestFit => write!(f, "BestFit"),
            Self::Grid => write!(f, "Grid"),
        }
    }
}

#[derive(Debug)]
pub struct AtlasDescriptor {
    pub use_fonts: bool,
    pub use_images: bool,
    pub alignment: GlyphAlignment,
    pub power_two: bool,
    pub multi_texture: bool,
    pub make_sprite: bool,
    /// Guarantee a blank-advance glyph exists for code 32 (font mode).
    pub force_space: bool,
    /// Maximum canvas edge length in pixels.
    pub max_size: i32,
    pub font: FontSpec,
    /// Character set names, expanded through the provider at collect time.
    pub char_sets: Vec<String>,
    pub images: Vec<ImageSource>,
    /// Cell dimensions, set by the grid packer.
    pub grid_size: Vec2i,
    /// Grid columns and rows, set by the grid packer.
    pub grid_cells: Vec2i,
    spacing: i32,
    start_code: u32,
}

impl AtlasDescriptor {
    pub fn new() -> Self {
        Self {
            use_fonts: false,
            use_images: false,
            alignment: GlyphAlignment::BestFit,
            power_two: false,
            multi_texture: false,
            make_sprite: false,
            force_space: true,
            max_size: 4096,
            font: FontSpec::default(),
            char_sets: vec!["ascii".into()],
            images: Vec::new(),
            grid_size: Vec2i::ZERO,
            grid_cells: Vec2i::ZERO,
            spacing: 1,
            start_code: 0,
        }
    }

    /// Padding pixels per glyph per side.
    pub fn spacing(&self) -> i32 {
        self.spacing
    }

    pub fn set_spacing(&mut self, spacing: i32) {
        self.spacing = spacing.max(0);
    }

    /// First auto-assigned code for image glyphs.
    pub fn start_code(&self) -> u32 {
        self.start_code
    }

    pub fn set_start_code(&mut self, code: u32) {
        self.start_code = code;
    }

    /// Fails fast on configuration errors before any work is done.
    pub fn validate(&self, sets: &CharSetProvider) -> Result<(), BuildError> {
        if self.use_fonts && self.font.name.is_empty() {
            return Err(BuildError::InvalidFont);
        }
        if !self.use_fonts && !self.use_images {
            return Err(BuildError::NoSources);
        }
        if self.multi_texture && self.alignment == GlyphAlignment::Grid {
            return Err(BuildError::GridMultiTexture);
        }
        if self.use_fonts {
            for name in &self.char_sets {
                if sets.find(name).is_none() {
                    return Err(BuildError::UnknownCharSet(name.clone()));
                }
            }
        }
        for source in &self.images {
            if source.image.width() as i32 > self.max_size
                || source.image.height() as i32 > self.max_size
            {
                return Err(BuildError::ImageTooLarge(source.path.clone()));
            }
        }
        Ok(())
    }
}

impl Default for AtlasDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

/// One editable setting: name, help text, and typed accessors. The table
/// is declared statically; no runtime type inspection is involved.
pub struct PropEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub get: fn(&AtlasDescriptor) -> String,
    pub set: fn(&mut AtlasDescriptor, &str) -> Result<(), BuildError>,
}

fn parse_bool(name: &str, value: &str) -> Result<bool, BuildError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(invalid(name, value)),
    }
}

fn invalid(name: &str, value: &str) -> BuildError {
    BuildError::InvalidProperty {
        name: name.to_string(),
        value: value.to_string(),
    }
}

pub const PROPERTIES: &[PropEntry] = &[
    PropEntry {
        name: "use-fonts",
        description: "set to true to enable fonts on the atlas",
        get: |d| d.use_fonts.to_string(),
        set: |d, v| {
            d.use_fonts = parse_bool("use-fonts", v)?;
            Ok(())
        },
    },
    PropEntry {
        name: "use-images",
        description: "set to true to enable custom images on the atlas",
        get: |d| d.use_images.to_string(),
        set: |d, v| {
            d.use_images = parse_bool("use-images", v)?;
            Ok(())
        },
    },
    PropEntry {
        name: "alignment",
        description: "the method glyphs are positioned on the atlas (BestFit|Grid)",
        get: |d| d.alignment.to_string(),
        set: |d, v| {
            d.alignment = v.parse().map_err(|_| invalid("alignment", v))?;
            Ok(())
        },
    },
    PropEntry {
        name: "spacing",
        description: "surrounding spacing between glyphs on the atlas (in pixels)",
        get: |d| d.spacing().to_string(),
        set: |d, v| {
            d.set_spacing(v.parse().map_err(|_| invalid("spacing", v))?);
            Ok(())
        },
    },
    PropEntry {
        name: "power-two",
        description: "set to true to enforce the atlas dimensions to be a power of 2",
        get: |d| d.power_two.to_string(),
        set: |d, v| {
            d.power_two = parse_bool("power-two", v)?;
            Ok(())
        },
    },
    PropEntry {
        name: "multi-texture",
        description: "set to true to enable support for multi textures",
        get: |d| d.multi_texture.to_string(),
        set: |d, v| {
            d.multi_texture = parse_bool("multi-texture", v)?;
            Ok(())
        },
    },
    PropEntry {
        name: "make-sprite",
        description: "set to true to generate an associated sprite",
        get: |d| d.make_sprite.to_string(),
        set: |d, v| {
            d.make_sprite = parse_bool("make-sprite", v)?;
            Ok(())
        },
    },
    PropEntry {
        name: "force-space",
        description: "when using fonts, set to true to force adding a space glyph",
        get: |d| d.force_space.to_string(),
        set: |d, v| {
            d.force_space = parse_bool("force-space", v)?;
            Ok(())
        },
    },
    PropEntry {
        name: "max-size",
        description: "maximum texture size in pixels",
        get: |d| d.max_size.to_string(),
        set: |d, v| {
            d.max_size = v.parse().map_err(|_| invalid("max-size", v))?;
            Ok(())
        },
    },
    PropEntry {
        name: "font-name",
        description: "name of the system font",
        get: |d| d.font.name.clone(),
        set: |d, v| {
            d.font.name = v.to_string();
            Ok(())
        },
    },
    PropEntry {
        name: "font-size",
        description: "size of the font (in pixels)",
        get: |d| d.font.size.to_string(),
        set: |d, v| {
            d.font.set_size(v.parse().map_err(|_| invalid("font-size", v))?);
            Ok(())
        },
    },
    PropEntry {
        name: "font-bold",
        description: "set to true for bold style",
        get: |d| d.font.style.contains(FontStyle::BOLD).to_string(),
        set: |d, v| {
            d.font.style.set(FontStyle::BOLD, parse_bool("font-bold", v)?);
            Ok(())
        },
    },
    PropEntry {
        name: "font-italic",
        description: "set to true for italic style",
        get: |d| d.font.style.contains(FontStyle::ITALIC).to_string(),
        set: |d, v| {
            d.font
                .style
                .set(FontStyle::ITALIC, parse_bool("font-italic", v)?);
            Ok(())
        },
    },
    PropEntry {
        name: "start-code",
        description: "initial glyph code for images",
        get: |d| d.start_code().to_string(),
        set: |d, v| {
            d.set_start_code(v.parse().map_err(|_| invalid("start-code", v))?);
            Ok(())
        },
    },
];

pub fn find_property(name: &str) -> Option<&'static PropEntry> {
    PROPERTIES.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}
