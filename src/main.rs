/// Command line atlas builder: rasterizes font glyphs, packs standalone
/// images and writes texture pages plus glyph metadata.

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use libatlas::atlas::descriptor::{AtlasDescriptor, FontStyle, GlyphAlignment};
use libatlas::atlas::sprite::{OverflowAction, SpriteDescriptor};
use libatlas::build::run_build;
use libatlas::charset::CharSetProvider;
use libatlas::config::ProjectConfig;
use libatlas::console::Console;
use libatlas::error::BuildError;
use libatlas::geom::Vec2f;
use libatlas::images::{collect_image_files, ImageSource};
use std::error::Error;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "atlas",
    version,
    about = "Packs font glyphs and standalone images into texture atlases"
)]
struct Cli {
    /// Output atlas file[.atlas]
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    /// Generate glyphs for the named system font (or a font file path)
    #[arg(short, long, value_name = "FONT")]
    font: Option<String>,

    /// Font size in pixels [24]
    #[arg(long, value_name = "SIZE")]
    font_size: Option<f32>,

    /// Use bold font
    #[arg(long)]
    font_bold: bool,

    /// Use italic font
    #[arg(long)]
    font_italic: bool,

    /// Do not force a space glyph
    #[arg(long)]
    no_force_space: bool,

    /// Character set to use (repeatable) [ascii]
    #[arg(short = 'c', long = "char-set", value_name = "SET")]
    char_sets: Vec<String>,

    /// List available character sets
    #[arg(short = 'l', long)]
    list_sets: bool,

    /// Directory of png images to add
    #[arg(short = 'i', long, value_name = "PATH")]
    image_path: Option<PathBuf>,

    /// Search subdirectories when adding images
    #[arg(long)]
    image_recurse: bool,

    /// Center all image glyph origins
    #[arg(long)]
    image_center: bool,

    /// "x, y" offset applied to all image glyphs
    #[arg(long, value_name = "X,Y")]
    image_origin: Option<Vec2f>,

    /// Image starting code [0]
    #[arg(long, value_name = "CODE")]
    image_start: Option<u32>,

    /// Maximum texture size in pixels [2048]
    #[arg(long, value_name = "SIZE")]
    max_size: Option<i32>,

    /// Force atlas dimensions to be a power of 2
    #[arg(long)]
    power_two: bool,

    /// Enable multi-texture support
    #[arg(long)]
    multi_texture: bool,

    /// Layout of each glyph (BestFit|Grid)
    #[arg(long, value_name = "LAYOUT")]
    glyph_align: Option<GlyphAlignment>,

    /// Space between glyphs in pixels [1]
    #[arg(long, value_name = "PIXELS")]
    glyph_space: Option<i32>,

    /// Make an associated sprite
    #[arg(short = 'm', long)]
    make_sprite: bool,

    /// Sprite playback speed in frames per second [10]
    #[arg(long, value_name = "FPS")]
    sprite_rate: Option<f32>,

    /// Sprite action after the last frame (Hold|Loop)
    #[arg(long, value_name = "ACTION")]
    sprite_overflow: Option<OverflowAction>,

    /// Load build settings from a TOML project file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable maximum verbosity
    #[arg(short, long)]
    verbose: bool,

    /// Run in interactive console mode
    #[arg(short = 'C', long = "console-mode")]
    console: bool,
}

fn main() {
    env_logger::init();
    std::process::exit(run());
}

fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::DisplayHelp => {
            let _ = e.print();
            return 1;
        }
        Err(e) if e.kind() == ErrorKind::DisplayVersion => {
            let _ = e.print();
            return 0;
        }
        Err(e) => {
            let _ = e.print();
            return 2;
        }
    };

    if cli.list_sets {
        for set in CharSetProvider::with_builtins().list() {
            println!("{:<10}{}", set.name, set.description);
        }
        return 0;
    }

    if cli.console {
        let mut console = Console::new(CharSetProvider::with_builtins());
        return match console.run() {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("{e}");
                2
            }
        };
    }

    let building = cli.font.is_some() || cli.image_path.is_some() || cli.config.is_some();
    if !building {
        let _ = Cli::command().print_help();
        return 1;
    }

    match build(cli) {
        Ok(()) => 0,
        Err(e) => {
            write_error(&e);
            2
        }
    }
}

fn write_error(e: &BuildError) {
    eprintln!("{e}");
    if let Some(cause) = e.source() {
        eprintln!("\t{cause}");
    }
    eprintln!("\nTry `atlas --help' for more information.");
}

/// Settings precedence: defaults, then the project file, then flags.
fn merge(cli: &Cli, cfg: &mut ProjectConfig) {
    if let Some(output) = &cli.output {
        cfg.output = output.clone();
    }
    if let Some(font) = &cli.font {
        cfg.font.name = font.clone();
    }
    if let Some(size) = cli.font_size {
        cfg.font.size = size;
    }
    if cli.font_bold {
        cfg.font.bold = true;
    }
    if cli.font_italic {
        cfg.font.italic = true;
    }
    if cli.no_force_space {
        cfg.font.force_space = false;
    }
    if !cli.char_sets.is_empty() {
        cfg.font.char_sets = cli.char_sets.clone();
    }
    if let Some(path) = &cli.image_path {
        cfg.images.path = path.display().to_string();
    }
    if cli.image_recurse {
        cfg.images.recurse = true;
    }
    if cli.image_center {
        cfg.images.center = true;
    }
    if let Some(origin) = cli.image_origin {
        cfg.images.origin_x = origin.x;
        cfg.images.origin_y = origin.y;
    }
    if let Some(code) = cli.image_start {
        cfg.images.start_code = code;
    }
    if let Some(max) = cli.max_size {
        cfg.layout.max_size = max;
    }
    if cli.power_two {
        cfg.layout.power_two = true;
    }
    if cli.multi_texture {
        cfg.layout.multi_texture = true;
    }
    if let Some(align) = cli.glyph_align {
        cfg.layout.alignment = align.to_string();
    }
    if let Some(space) = cli.glyph_space {
        cfg.layout.spacing = space;
    }
    if cli.make_sprite {
        cfg.sprite.enabled = true;
    }
    if let Some(rate) = cli.sprite_rate {
        cfg.sprite.rate = rate;
    }
    if let Some(overflow) = cli.sprite_overflow {
        cfg.sprite.overflow = overflow.to_string();
    }
}

fn build(cli: Cli) -> Result<(), BuildError> {
    let mut cfg = match &cli.config {
        Some(path) => ProjectConfig::load(path)?,
        None => ProjectConfig::default(),
    };
    merge(&cli, &mut cfg);

    if cfg.output.is_empty() {
        return Err(BuildError::NoOutput);
    }

    let sets = CharSetProvider::with_builtins();
    let mut desc = AtlasDescriptor::new();
    let mut sprite = SpriteDescriptor::default();

    desc.power_two = cfg.layout.power_two;
    desc.multi_texture = cfg.layout.multi_texture;
    desc.alignment = cfg
        .layout
        .alignment
        .parse()
        .map_err(|_| BuildError::InvalidProperty {
            name: "alignment".into(),
            value: cfg.layout.alignment.clone(),
        })?;
    desc.set_spacing(cfg.layout.spacing);
    desc.max_size = cfg.layout.max_size;
    desc.make_sprite = cfg.sprite.enabled;
    desc.set_start_code(cfg.images.start_code);

    sprite.rate = cfg.sprite.rate;
    sprite.overflow = cfg
        .sprite
        .overflow
        .parse()
        .map_err(|_| BuildError::InvalidProperty {
            name: "sprite-overflow".into(),
            value: cfg.sprite.overflow.clone(),
        })?;

    if cfg.font.name.is_empty() {
        desc.use_fonts = false;
    } else {
        desc.use_fonts = true;
        desc.font.name = cfg.font.name.clone();
        desc.font.set_size(cfg.font.size);
        desc.font.style.set(FontStyle::BOLD, cfg.font.bold);
        desc.font.style.set(FontStyle::ITALIC, cfg.font.italic);
        desc.force_space = cfg.font.force_space;
        desc.char_sets = if cfg.font.char_sets.is_empty() {
            vec!["ascii".into()]
        } else {
            cfg.font.char_sets.clone()
        };
    }

    if !cfg.images.path.is_empty() {
        let dir = PathBuf::from(&cfg.images.path);
        let files = collect_image_files(&dir, cfg.images.recurse)?;
        if files.is_empty() {
            return Err(BuildError::NoImagesFound(dir));
        }
        log::info!("adding {} images from {}", files.len(), dir.display());

        let origin = Vec2f::new(cfg.images.origin_x, cfg.images.origin_y);
        for file in files {
            let mut source = ImageSource::from_file(&file)?;
            if cfg.images.center {
                source.offset = Vec2f::new(
                    source.image.width() as f32 * 0.5,
                    source.image.height() as f32 * 0.5,
                );
            } else {
                source.offset = source.offset + origin;
            }
            desc.images.push(source);
        }
        desc.use_images = true;
    }

    let verbose = cli.verbose;
    let mut show = move |phase: &str, complete: f32| {
        if verbose {
            print!("{}: {:3}%    \r", phase, (complete * 100.0) as i32);
            let _ = std::io::stdout().flush();
        }
    };

    let report = run_build(
        &mut desc,
        &sets,
        &sprite,
        Path::new(&cfg.output),
        Some(&mut show),
        None,
    )?;
    if verbose {
        println!();
    }

    println!("Total Glyphs: {}", report.glyphs);
    if verbose {
        for (index, page) in report.pages.iter().enumerate() {
            println!("page {index}: {page}");
        }
        for file in &report.files {
            println!("wrote {}", file.display());
        }
    }
    Ok(())
}
