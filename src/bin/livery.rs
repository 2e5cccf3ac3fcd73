//! Headless livery renderer.
//!
//! ```text
//! livery --base car.jpg --overlay flame.svg --overlay number.svg \
//!        --hue 40 --saturation 0.2 --output out/
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use livery_studio::{
    DirectorySink, Editor, EditorConfig, EditorError, ImageSource, SvgSource, ToneParameter,
};

/// Places SVG overlays on a vehicle photo, applies tone settings and
/// writes the composite as PNG.
#[derive(Parser, Debug)]
#[command(name = "livery", version)]
struct Args {
    /// Base vehicle image (PNG, JPEG, ...).
    #[arg(short, long, value_name = "IMAGE")]
    base: PathBuf,

    /// JSON editor configuration. Defaults are used when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// SVG overlay to place, in order. May be repeated.
    #[arg(long = "overlay", value_name = "SVG")]
    overlays: Vec<PathBuf>,

    /// Emoji overlay to place after the SVG files (requires `twemoji`).
    #[cfg(feature = "twemoji")]
    #[arg(long = "emoji", value_name = "EMOJI")]
    emojis: Vec<String>,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    brightness: f32,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    contrast: f32,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    saturation: f32,

    /// Hue rotation in degrees.
    #[arg(long, default_value_t = 0.0)]
    hue: f32,

    /// Output directory, or a `.png` file path.
    #[arg(short, long, value_name = "PATH", default_value = ".")]
    output: PathBuf,

    /// Print the configuration JSON schema and exit.
    #[cfg(feature = "jsonschema")]
    #[arg(long)]
    print_schema: bool,
}

fn run(args: Args) -> Result<(), EditorError> {
    let config = match &args.config {
        Some(path) => EditorConfig::from_file(path)?,
        None => EditorConfig::default(),
    };

    let mut editor = Editor::open(config, &ImageSource::Path(args.base.clone()))?;

    #[allow(unused_mut)]
    let mut sources: Vec<SvgSource> = args.overlays.iter().cloned().map(SvgSource::File).collect();
    #[cfg(feature = "twemoji")]
    for emoji in &args.emojis {
        match SvgSource::from_emoji(emoji) {
            Some(source) => sources.push(source),
            None => log::warn!("no twemoji asset for {emoji:?}"),
        }
    }
    for source in sources {
        if editor.place_overlay(source).is_none() {
            log::warn!("skipped an overlay that failed to load");
        }
    }

    for (parameter, value) in [
        (ToneParameter::Brightness, args.brightness),
        (ToneParameter::Contrast, args.contrast),
        (ToneParameter::Saturation, args.saturation),
        (ToneParameter::HueRotation, args.hue),
    ] {
        if value != 0.0 {
            editor.set_tone(parameter, value);
        }
    }

    let is_file = args
        .output
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
    if is_file {
        let png = editor.export_png()?;
        std::fs::write(&args.output, &png)?;
        log::info!("wrote {}", args.output.display());
    } else {
        std::fs::create_dir_all(&args.output)?;
        editor.download(&mut DirectorySink::new(&args.output))?;
    }

    editor.dispose();
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    #[cfg(feature = "jsonschema")]
    if args.print_schema {
        match serde_json::to_string_pretty(&EditorConfig::json_schema()) {
            Ok(json) => {
                println!("{json}");
                return ExitCode::SUCCESS;
            }
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
