//! Command line driver: extracts, lists and patches assets of CND level
//! containers without rebuilding them end to end.

use clap::{Parser, Subcommand};
use cnd::animation::Animation;
use cnd::audio::SoundBank;
use cnd::cnd::{keyframes, materials, patch, sounds};
use cnd::material::{Material, Texture, RGB_565};
use cnd::stream::Stream;
use cnd::key;
use image::ImageFormat;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Parser)]
#[command(
    name = "cndtool",
    version,
    about = "Extract, list and patch game assets of CND level containers"
)]
struct Cli {
    /// Print verbose output, including full error chains
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract animations, materials and sounds to files
    Extract {
        cnd: PathBuf,
        /// Directory the extracted assets are written to
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
        #[arg(long)]
        no_animations: bool,
        #[arg(long)]
        no_materials: bool,
        #[arg(long)]
        no_sounds: bool,
        /// Write materials as BMP instead of PNG
        #[arg(long)]
        bmp: bool,
        /// Extract at most this many cells per material
        #[arg(long, value_name = "N")]
        max_tex: Option<usize>,
        /// Also extract the lower mipmap levels
        #[arg(long)]
        mipmap: bool,
        /// Decode compressed sounds to WAV instead of writing IndyWV files
        #[arg(long)]
        wav: bool,
    },
    /// Print the assets stored in a container
    List {
        cnd: PathBuf,
        #[arg(long)]
        animations: bool,
        #[arg(long)]
        materials: bool,
        #[arg(long)]
        sounds: bool,
    },
    /// Add or replace assets in a container
    Add {
        #[command(subcommand)]
        asset: AddAsset,
    },
    /// Remove assets from a container
    Remove {
        #[command(subcommand)]
        asset: RemoveAsset,
    },
}

#[derive(Subcommand)]
enum AddAsset {
    /// Add animations from KEY files
    Animation {
        /// Replace an existing animation of the same name
        #[arg(long)]
        replace: bool,
        cnd: PathBuf,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Add materials from image files
    Material {
        /// Replace an existing material of the same name
        #[arg(long)]
        replace: bool,
        cnd: PathBuf,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Subcommand)]
enum RemoveAsset {
    /// Remove animations by name
    Animation {
        cnd: PathBuf,
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Remove materials by name
    Material {
        cnd: PathBuf,
        #[arg(required = true)]
        names: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    match run(&cli.command) {
        Ok(()) => println!("SUCCESS"),
        Err(e) => {
            eprintln!("FAILED: {e}");
            if cli.verbose {
                let mut source = e.source();
                while let Some(cause) = source {
                    eprintln!("  caused by: {cause}");
                    source = cause.source();
                }
            }
            std::process::exit(1);
        }
    }
}

fn run(command: &Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Extract {
            cnd,
            output_dir,
            no_animations,
            no_materials,
            no_sounds,
            bmp,
            max_tex,
            mipmap,
            wav,
        } => extract(
            cnd,
            output_dir,
            ExtractOptions {
                animations: !no_animations,
                materials: !no_materials,
                sounds: !no_sounds,
                bmp: *bmp,
                max_tex: *max_tex,
                mipmap: *mipmap,
                wav: *wav,
            },
        ),
        Command::List {
            cnd,
            animations,
            materials,
            sounds,
        } => {
            let all = !animations && !materials && !sounds;
            list(
                cnd,
                *animations || all,
                *materials || all,
                *sounds || all,
            )
        }
        Command::Add { asset } => match asset {
            AddAsset::Animation {
                replace,
                cnd,
                files,
            } => add_animations(cnd, files, *replace),
            AddAsset::Material {
                replace,
                cnd,
                files,
            } => add_materials(cnd, files, *replace),
        },
        Command::Remove { asset } => match asset {
            RemoveAsset::Animation { cnd, names } => remove_animations(cnd, names),
            RemoveAsset::Material { cnd, names } => remove_materials(cnd, names),
        },
    }
}

struct ExtractOptions {
    animations: bool,
    materials: bool,
    sounds: bool,
    bmp: bool,
    max_tex: Option<usize>,
    mipmap: bool,
    wav: bool,
}

fn extract(cnd: &Path, output_dir: &Path, options: ExtractOptions) -> Result<(), Box<dyn Error>> {
    let mut stream = Stream::open(cnd)?;

    let mut num_animations = 0;
    let mut num_materials = 0;
    let mut num_sounds = 0;

    if options.sounds {
        let mut bank = SoundBank::new(1);
        sounds::read(&mut stream, &mut bank, 0)?;
        let sound_dir = output_dir.join("sound");
        fs::create_dir_all(&sound_dir)?;
        for sound in bank.track(0)?.sounds() {
            let name = sound.name()?;
            if sound.is_compressed() && !options.wav {
                let path = sound_dir.join(Path::new(&name).with_extension("wv"));
                let mut out = Stream::create(&path)?;
                sound.write_wv(&mut out)?;
                out.flush()?;
            } else {
                let path = sound_dir.join(&name);
                let mut out = Stream::create(&path)?;
                sound.write_wav(&mut out)?;
                out.flush()?;
            }
            debug!("extracted sound '{name}'");
            num_sounds += 1;
        }
    }

    if options.materials {
        let mat_dir = output_dir.join("mat");
        fs::create_dir_all(&mat_dir)?;
        for mat in materials::read(&mut stream)? {
            export_material(&mat, &mat_dir, &options)?;
            num_materials += 1;
        }
    }

    if options.animations {
        let key_dir = output_dir.join("key");
        fs::create_dir_all(&key_dir)?;
        for anim in keyframes::read(&mut stream)? {
            let text = key::write_key(Vec::new(), &anim)?;
            fs::write(key_dir.join(&anim.name), text)?;
            debug!("extracted animation '{}'", anim.name);
            num_animations += 1;
        }
    }

    println!("-------------------------------------");
    println!("Extracted animations: {num_animations}");
    println!("Extracted materials:  {num_materials}");
    println!("Extracted sounds:     {num_sounds}");
    Ok(())
}

fn export_material(
    mat: &Material,
    dir: &Path,
    options: &ExtractOptions,
) -> Result<(), Box<dyn Error>> {
    let (format, ext) = if options.bmp {
        (ImageFormat::Bmp, "bmp")
    } else {
        (ImageFormat::Png, "png")
    };
    let stem = Path::new(&mat.name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| mat.name.clone());

    let cells = options.max_tex.unwrap_or(usize::MAX).min(mat.cells.len());
    for cell in 0..cells {
        let levels = if options.mipmap {
            mat.cells[cell].mip_levels.len()
        } else {
            1
        };
        for level in 0..levels {
            let Some(rgba) = mat.decode_rgba(cell, level) else {
                warn!(
                    "material '{}' has an unsupported pixel format, skipping",
                    mat.name
                );
                return Ok(());
            };
            let width = mat.width.unsigned_abs() >> level;
            let height = mat.height.unsigned_abs() >> level;
            let image = image::RgbaImage::from_raw(width, height, rgba)
                .ok_or("material pixel buffer does not match its dimensions")?;

            let mut file = dir.join(match (mat.cells.len() > 1, options.mipmap) {
                (false, false) => stem.clone(),
                (true, false) => format!("{stem}_{cell}"),
                (_, true) => format!("{stem}_{cell}_{level}"),
            });
            file.set_extension(ext);
            image.save_with_format(&file, format)?;
            debug!("extracted material '{}' to {}", mat.name, file.display());
        }
    }
    Ok(())
}

fn list(
    cnd: &Path,
    animations: bool,
    materials_too: bool,
    sounds_too: bool,
) -> Result<(), Box<dyn Error>> {
    let mut stream = Stream::open(cnd)?;

    if animations {
        println!("Animations:");
        for (idx, anim) in keyframes::read(&mut stream)?.iter().enumerate() {
            println!("  {idx:>3}: {}", anim.name);
        }
    }
    if materials_too {
        println!("Materials:");
        for (idx, mat) in materials::read(&mut stream)?.iter().enumerate() {
            println!(
                "  {idx:>3}: {} {}x{} cells={}",
                mat.name,
                mat.width,
                mat.height,
                mat.cells.len()
            );
        }
    }
    if sounds_too {
        let mut bank = SoundBank::new(1);
        sounds::read(&mut stream, &mut bank, 0)?;
        println!("Sounds:");
        for (idx, sound) in bank.track(0)?.sounds().iter().enumerate() {
            println!(
                "  {idx:>3}: {} {} Hz {} bit ch={}{}",
                sound.name()?,
                sound.sample_rate(),
                sound.sample_bit_size(),
                sound.num_channels(),
                if sound.is_compressed() { " (indywv)" } else { "" }
            );
        }
    }
    Ok(())
}

fn add_animations(cnd: &Path, files: &[PathBuf], replace: bool) -> Result<(), Box<dyn Error>> {
    let mut animations = {
        let mut stream = Stream::open(cnd)?;
        keyframes::read(&mut stream)?
    };

    for file in files {
        let name = file
            .file_name()
            .ok_or("animation file has no name")?
            .to_string_lossy()
            .to_lowercase();
        let text = fs::read_to_string(file)?;
        let anim = key::read_key(text.as_bytes(), &name)?;

        match animations.iter().position(|a| a.name == name) {
            Some(idx) if replace => animations[idx] = anim,
            Some(_) => {
                return Err(format!(
                    "animation '{name}' already exists and no --replace option was provided"
                )
                .into())
            }
            None => animations.push(anim),
        }
        debug!("staged animation '{name}'");
    }

    patch::patch_keyframes(cnd, &animations)?;
    Ok(())
}

fn remove_animations(cnd: &Path, names: &[String]) -> Result<(), Box<dyn Error>> {
    let mut animations = {
        let mut stream = Stream::open(cnd)?;
        keyframes::read(&mut stream)?
    };

    for name in names {
        let name = name.to_lowercase();
        let Some(idx) = animations.iter().position(|a| a.name == name) else {
            warn!("container has no animation '{name}'");
            continue;
        };
        animations.remove(idx);
    }

    patch::patch_keyframes(cnd, &animations)?;
    Ok(())
}

fn add_materials(cnd: &Path, files: &[PathBuf], replace: bool) -> Result<(), Box<dyn Error>> {
    let mut all = {
        let mut stream = Stream::open(cnd)?;
        materials::read(&mut stream)?
    };

    for file in files {
        let mat = material_from_image(file)?;
        match all.iter().position(|m| m.name == mat.name) {
            Some(idx) if replace => all[idx] = mat,
            Some(_) => {
                return Err(format!(
                    "material '{}' already exists and no --replace option was provided",
                    mat.name
                )
                .into())
            }
            None => all.push(mat),
        }
    }

    patch::patch_materials(cnd, &all)?;
    Ok(())
}

fn remove_materials(cnd: &Path, names: &[String]) -> Result<(), Box<dyn Error>> {
    let mut all = {
        let mut stream = Stream::open(cnd)?;
        materials::read(&mut stream)?
    };

    for name in names {
        let name = name.to_lowercase();
        let Some(idx) = all.iter().position(|m| m.name == name) else {
            warn!("container has no material '{name}'");
            continue;
        };
        all.remove(idx);
    }

    patch::patch_materials(cnd, &all)?;
    Ok(())
}

/// Converts an image file into a single cell RGB565 material.
fn material_from_image(file: &Path) -> Result<Material, Box<dyn Error>> {
    let image = image::open(file)?.into_rgba8();
    let (width, height) = image.dimensions();

    let mut pixels = Vec::with_capacity((width * height * 2) as usize);
    for pixel in image.pixels() {
        let [r, g, b, _] = pixel.0;
        let packed = ((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3);
        pixels.extend_from_slice(&packed.to_le_bytes());
    }

    let stem = file
        .file_stem()
        .ok_or("image file has no name")?
        .to_string_lossy()
        .to_lowercase();

    Ok(Material {
        name: format!("{stem}.mat"),
        width: width as i32,
        height: height as i32,
        format: RGB_565,
        cells: vec![Texture {
            mip_levels: vec![pixels],
        }],
    })
}
