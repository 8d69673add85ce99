/// Interactive console mode: edit build settings with a small command set
/// and run builds without leaving the program.

use crate::atlas::descriptor::{find_property, AtlasDescriptor, PROPERTIES};
use crate::atlas::sprite::SpriteDescriptor;
use crate::build::run_build;
use crate::charset::CharSetProvider;
use crate::error::BuildError;
use crate::images::ImageSource;
use std::io::{BufRead, Write};
use std::path::Path;

pub struct Console {
    desc: AtlasDescriptor,
    sets: CharSetProvider,
    sprite: SpriteDescriptor,
}

impl Console {
    pub fn new(sets: CharSetProvider) -> Self {
        Self {
            desc: AtlasDescriptor::new(),
            sets,
            sprite: SpriteDescriptor::default(),
        }
    }

    /// Reads commands from stdin until `quit`.
    pub fn run(&mut self) -> std::io::Result<()> {
        println!("Enter ? or help for commands. Enter quit to exit");

        let stdin = std::io::stdin();
        let mut line = String::new();
        loop {
            print!("atlas> ");
            std::io::stdout().flush()?;

            line.clear();
            if stdin.lock().read_line(&mut line)? == 0 {
                break; // end of input
            }

            let args: Vec<&str> = line.split_whitespace().collect();
            if args.is_empty() {
                continue;
            }
            match self.dispatch(&args) {
                Ok(true) => break,
                Ok(false) => {}
                Err(e) => println!("{e}"),
            }
        }
        Ok(())
    }

    /// Returns `Ok(true)` when the session should end.
    fn dispatch(&mut self, args: &[&str]) -> Result<bool, BuildError> {
        match args[0] {
            "?" | "help" => self.write_help(),
            "quit" | "exit" => return Ok(true),
            "clear" | "cls" => print!("\x1b[2J\x1b[H"),
            "prop" => self.write_properties(args.get(1).copied()),
            "get" => self.write_property(args)?,
            "set" => self.apply_property(args)?,
            "sets" => self.write_sets(),
            "add-set" => self.add_set(args)?,
            "clear-sets" => self.desc.char_sets.clear(),
            "add-image" => self.add_image(args)?,
            "images" => self.write_images(),
            "build" => self.build(args)?,
            _ => println!("Invalid command"),
        }
        Ok(false)
    }

    fn write_help(&self) {
        println!("?, help       shows this command list");
        println!("quit, exit    exits the program");
        println!("clear, cls    clears the screen");
        println!("prop          show all properties (value|help)");
        println!("get           get <property>");
        println!("set           set <property> <value>");
        println!("sets          list available character sets");
        println!("add-set       add-set <name>");
        println!("clear-sets    remove all selected character sets");
        println!("add-image     add-image <file>");
        println!("images        list added images");
        println!("build         build <output-file>");
    }

    fn write_properties(&self, mode: Option<&str>) {
        for prop in PROPERTIES {
            if mode == Some("help") {
                println!("{:<14}{}", prop.name, prop.description);
            } else {
                println!("{:<14}{}", prop.name, (prop.get)(&self.desc));
            }
        }
    }

    fn write_property(&self, args: &[&str]) -> Result<(), BuildError> {
        let Some(name) = args.get(1) else {
            println!("get <property>");
            return Ok(());
        };
        let prop =
            find_property(name).ok_or_else(|| BuildError::UnknownProperty(name.to_string()))?;
        println!("{}", (prop.get)(&self.desc));
        Ok(())
    }

    fn apply_property(&mut self, args: &[&str]) -> Result<(), BuildError> {
        if args.len() != 3 {
            println!("set <property> <value>");
            return Ok(());
        }
        let prop = find_property(args[1])
            .ok_or_else(|| BuildError::UnknownProperty(args[1].to_string()))?;
        (prop.set)(&mut self.desc, args[2])
    }

    fn write_sets(&self) {
        for set in self.sets.list() {
            println!("{:<10}{}", set.name, set.description);
        }
    }

    fn add_set(&mut self, args: &[&str]) -> Result<(), BuildError> {
        let Some(name) = args.get(1) else {
            println!("add-set <name>");
            return Ok(());
        };
        // validate eagerly so typos surface here, not at build time
        self.sets.expand(name)?;
        self.desc.char_sets.push(name.to_string());
        Ok(())
    }

    fn add_image(&mut self, args: &[&str]) -> Result<(), BuildError> {
        let Some(path) = args.get(1) else {
            println!("add-image <file>");
            return Ok(());
        };
        let source = ImageSource::from_file(Path::new(path))?;
        println!(
            "{} ({}x{})",
            source.file_name(),
            source.image.width(),
            source.image.height()
        );
        self.desc.images.push(source);
        self.desc.use_images = true;
        Ok(())
    }

    fn write_images(&self) {
        for source in &self.desc.images {
            println!(
                "{} ({}x{})",
                source.file_name(),
                source.image.width(),
                source.image.height()
            );
        }
    }

    fn build(&mut self, args: &[&str]) -> Result<(), BuildError> {
        let out = args.get(1).copied().unwrap_or("out.atlas");
        let report = run_build(
            &mut self.desc,
            &self.sets,
            &self.sprite,
            Path::new(out),
            None,
            None,
        )?;
        println!("Total Glyphs: {}", report.glyphs);
        for file in &report.files {
            println!("wrote {}", file.display());
        }
        Ok(())
    }
}
