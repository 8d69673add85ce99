/// Atlas serialization: writes each canvas page as PNG plus a JSON
/// document describing every glyph, and an optional sibling sprite
/// document listing glyph codes as ordered animation frames.

use crate::atlas::descriptor::{AtlasDescriptor, FontStyle, GlyphAlignment};
use crate::atlas::glyph::GlyphCollection;
use crate::atlas::sprite::SpriteDescriptor;
use crate::error::BuildError;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
pub struct AtlasDoc {
    pub glyph_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_height: Option<i32>,
    pub images: Vec<PageEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridInfo>,
    pub glyphs: Vec<GlyphEntry>,
    pub info: EditorInfo,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PageEntry {
    pub src: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GridInfo {
    pub cell_width: i32,
    pub cell_height: i32,
    pub cols: i32,
    pub rows: i32,
}

/// One glyph record. Position and size are reported without the spacing
/// padding: x/y move inside by one spacing, width/height shed both sides.
#[derive(Debug, Serialize, Deserialize)]
pub struct GlyphEntry {
    pub ch: u32,
    pub page: usize,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub a: i32,
    pub b: i32,
    pub c: i32,
    pub ox: i32,
    pub oy: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Settings needed to reopen and rebuild the atlas.
#[derive(Debug, Serialize, Deserialize)]
pub struct EditorInfo {
    pub common: CommonInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<FontInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sprite: Option<SpriteInfo>,
    pub image: ImageListInfo,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommonInfo {
    pub use_fonts: bool,
    pub use_images: bool,
    pub alignment: String,
    pub spacing: i32,
    pub power_two: bool,
    pub multi_texture: bool,
    pub max_size: i32,
    pub make_sprite: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FontInfo {
    pub name: String,
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
    pub charsets: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SpriteInfo {
    pub rate: f32,
    pub overflow: String,
    pub ox: f32,
    pub oy: f32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImageListInfo {
    pub start_code: u32,
    pub images: Vec<ImageSourceEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImageSourceEntry {
    pub src: String,
    pub ox: f32,
    pub oy: f32,
    pub code: u32,
    pub use_code: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SpriteDoc {
    pub rate: f32,
    pub overflow: String,
    pub ox: f32,
    pub oy: f32,
    pub elements: Vec<SpriteElement>,
}

/// One animation frame: the atlas it lives in and the glyph code to show.
#[derive(Debug, Serialize, Deserialize)]
pub struct SpriteElement {
    pub src: String,
    pub index: u32,
}

/// Writes the atlas document, its canvas pages and, when requested, the
/// sprite document. Glyphs are sorted by code first. Returns every file
/// written.
pub fn save_atlas(
    filename: &Path,
    canvases: &[RgbaImage],
    glyphs: &mut GlyphCollection,
    desc: &AtlasDescriptor,
    sprite: &SpriteDescriptor,
    font_height: Option<i32>,
) -> Result<Vec<PathBuf>, BuildError> {
    let dir = match filename.parent() {
        Some(p) if !p.as_os_str().is_empty() => {
            std::fs::create_dir_all(p)?;
            p.to_path_buf()
        }
        _ => std::env::current_dir()?,
    };

    let stem = filename
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "atlas".into());
    let atlas_name = match filename.extension() {
        Some(ext) => format!("{stem}.{}", ext.to_string_lossy()),
        None => format!("{stem}.atlas"),
    };

    let mut written = Vec::new();
    glyphs.sort_by_code();

    // canvas pages land next to the document as <stem><index>.png
    let mut pages = Vec::new();
    for (index, canvas) in canvases.iter().enumerate() {
        let page_name = format!("{stem}{index}.png");
        let page_path = dir.join(&page_name);
        canvas.save(&page_path).map_err(|source| BuildError::ImageWrite {
            path: page_path.clone(),
            source,
        })?;
        pages.push(PageEntry {
            src: page_name,
            width: canvas.width(),
            height: canvas.height(),
        });
        written.push(page_path);
    }

    let spacing = desc.spacing();
    let glyph_entries: Vec<GlyphEntry> = glyphs
        .iter()
        .map(|g| GlyphEntry {
            ch: g.code,
            page: g.page,
            x: g.x + spacing,
            y: g.y + spacing,
            w: g.width - spacing * 2,
            h: g.height - spacing * 2,
            a: g.abc.a,
            b: g.abc.b,
            c: g.abc.c,
            ox: g.offset.x,
            oy: g.offset.y,
            name: g.source.clone(),
        })
        .collect();

    let grid = (desc.alignment == GlyphAlignment::Grid).then(|| GridInfo {
        cell_width: desc.grid_size.x,
        cell_height: desc.grid_size.y,
        cols: desc.grid_cells.x,
        rows: desc.grid_cells.y,
    });

    let doc = AtlasDoc {
        glyph_count: glyph_entries.len(),
        font_height: desc.use_fonts.then_some(font_height).flatten(),
        images: pages,
        grid,
        glyphs: glyph_entries,
        info: EditorInfo {
            common: CommonInfo {
                use_fonts: desc.use_fonts,
                use_images: desc.use_images,
                alignment: desc.alignment.to_string(),
                spacing,
                power_two: desc.power_two,
                multi_texture: desc.multi_texture,
                max_size: desc.max_size,
                make_sprite: desc.make_sprite,
            },
            font: desc.use_fonts.then(|| FontInfo {
                name: desc.font.name.clone(),
                size: desc.font.size,
                bold: desc.font.style.contains(FontStyle::BOLD),
                italic: desc.font.style.contains(FontStyle::ITALIC),
                charsets: desc.char_sets.clone(),
            }),
            sprite: desc.make_sprite.then(|| SpriteInfo {
                rate: sprite.rate,
                overflow: sprite.overflow.to_string(),
                ox: sprite.origin.x,
                oy: sprite.origin.y,
            }),
            image: ImageListInfo {
                start_code: desc.start_code(),
                images: desc
                    .images
                    .iter()
                    .map(|source| ImageSourceEntry {
                        src: source
                            .path
                            .strip_prefix(&dir)
                            .unwrap_or(&source.path)
                            .to_string_lossy()
                            .into_owned(),
                        ox: source.offset.x,
                        oy: source.offset.y,
                        code: source.code,
                        use_code: source.has_custom_code,
                    })
                    .collect(),
            },
        },
    };

    let atlas_path = dir.join(&atlas_name);
    std::fs::write(&atlas_path, serde_json::to_string_pretty(&doc)?)?;
    written.push(atlas_path);

    if desc.make_sprite {
        let sprite_doc = SpriteDoc {
            rate: sprite.rate,
            overflow: sprite.overflow.to_string(),
            ox: sprite.origin.x,
            oy: sprite.origin.y,
            elements: glyphs
                .iter()
                .map(|g| SpriteElement {
                    src: atlas_name.clone(),
                    index: g.code,
                })
                .collect(),
        };
        let sprite_path = dir.join(format!("{stem}.sprite"));
        std::fs::write(&sprite_path, serde_json::to_string_pretty(&sprite_doc)?)?;
        written.push(sprite_path);
    }

    Ok(written)
}
