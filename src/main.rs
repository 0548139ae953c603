use std::env;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, Result};

use garden_scene::render::RecordingDevice;
use garden_scene::scene::{SceneComposer, DEFAULT_TEXTURE_DIR};
use garden_scene::view::{ProjectionMode, ViewComposer};
use garden_scene::{app, InputState};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse(env::args().skip(1))?;
    if options.summary_only {
        run_headless(options.texture_dir)
    } else {
        app::run(options.texture_dir)
    }
}

/// Prepares the scene without a window and reports what a frame would draw.
fn run_headless(texture_dir: PathBuf) -> Result<()> {
    let mut device = RecordingDevice::new();
    let mut scene = SceneComposer::new(&texture_dir);
    let setup = scene.prepare_scene(&mut device);

    println!("Loaded {} texture(s)", scene.textures().len());
    for (unit, entry) in scene.textures().entries().iter().enumerate() {
        println!(" - {} (unit {unit})", entry.tag);
    }
    println!("Defined {} material(s)", scene.materials().len());
    if let Err(err) = setup {
        println!("Scene setup aborted: {err}");
    }

    let mut view = ViewComposer::new();
    let input = InputState::new();
    for mode in [ProjectionMode::Perspective, ProjectionMode::Orthographic] {
        view.set_projection_mode(mode);
        view.prepare_scene_view(&mut device, &input, Instant::now());
        scene.render_scene(&mut device, view.is_orthographic());
        println!("{mode} frame: {} draw call(s)", device.take_draws().len());
    }

    scene.release_textures(&mut device);
    Ok(())
}

struct CliOptions {
    texture_dir: PathBuf,
    summary_only: bool,
}

impl CliOptions {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut texture_dir = PathBuf::from(DEFAULT_TEXTURE_DIR);
        let mut summary_only = false;
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--summary-only" => summary_only = true,
                "--textures" => {
                    let Some(dir) = args.next() else {
                        return Err(anyhow!("--textures expects a directory.\n{USAGE}"));
                    };
                    texture_dir = PathBuf::from(dir);
                }
                other => {
                    return Err(anyhow!("Unknown argument: {other}.\n{USAGE}"));
                }
            }
        }
        Ok(Self {
            texture_dir,
            summary_only,
        })
    }
}

const USAGE: &str = "Usage: garden-scene [--textures <dir>] [--summary-only]";
