//! pngflat CLI - flatten transparent icons onto a solid background.
//!
//! Reads an image file, runs it through the flatten pipeline and writes the
//! result. Inputs that are not PNG, fail to decode, or are mostly opaque are
//! copied through unchanged.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{ArgAction, Parser, ValueEnum};
use log::LevelFilter;

use pngflat::png::{self, PngOptions};
use pngflat::{FlattenPolicy, Outcome, Pipeline, Rgb};

/// Flatten a mostly transparent PNG onto a contrasting background.
#[derive(Parser, Debug)]
#[command(name = "pngflat")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input image file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file path (defaults to INPUT with a `.flat.png` suffix)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Declared media type of the input (sniffed from the signature if omitted)
    #[arg(short, long)]
    media_type: Option<String>,

    /// Minimum transparent ratio that triggers flattening (0-1, inclusive)
    #[arg(short, long, default_value_t = 0.5)]
    threshold: f64,

    /// Background for dark images
    #[arg(long, default_value = "#ffffff")]
    light: Rgb,

    /// Background for light images
    #[arg(long, default_value = "#1e1e1e")]
    dark: Rgb,

    /// Shrink the image onto the canvas (0-1, 1 = full bleed)
    #[arg(short, long, default_value_t = 1.0)]
    scale: f64,

    /// Anchor a shrunk image top-left instead of centering it
    #[arg(long)]
    no_center: bool,

    /// Encoder preset for flattened output
    #[arg(short, long, value_enum, default_value_t = Preset::Balanced)]
    preset: Preset,

    /// PNG compression level (1-9, higher = smaller file); overrides --preset
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u8).range(1..=9))]
    compression: Option<u8>,

    /// Show verbose output (repeat for trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Named encoder settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Preset {
    /// Level 1
    Fast,
    /// Level 6
    Balanced,
    /// Level 9
    Max,
}

impl Args {
    fn png_options(&self) -> PngOptions {
        let base = match self.preset {
            Preset::Fast => PngOptions::fast(),
            Preset::Balanced => PngOptions::balanced(),
            Preset::Max => PngOptions::max_compression(),
        };
        match self.compression {
            Some(compression_level) => PngOptions { compression_level },
            None => base,
        }
    }
}

/// Log to stderr at a level set by `-v`; `RUST_LOG` overrides it.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .try_init();
}

fn default_output(input: &Path) -> PathBuf {
    let mut name = input.file_stem().unwrap_or_default().to_os_string();
    name.push(".flat.png");
    input.with_file_name(name)
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    if !(0.0..=1.0).contains(&args.threshold) {
        return Err(format!("threshold {} must be between 0 and 1", args.threshold).into());
    }
    if !(args.scale > 0.0 && args.scale <= 1.0) {
        return Err(format!("scale {} must be in (0, 1]", args.scale).into());
    }

    let input = fs::read(&args.input)?;
    let media_type = args.media_type.clone().unwrap_or_else(|| {
        if png::has_signature(&input) {
            "image/png".to_string()
        } else {
            "application/octet-stream".to_string()
        }
    });

    let policy = FlattenPolicy::builder()
        .threshold(args.threshold)
        .light(args.light)
        .dark(args.dark)
        .scale(args.scale)
        .center(!args.no_center)
        .png_options(args.png_options())
        .build();
    let pipeline = Pipeline::new(policy);

    let start = Instant::now();
    let processed = pipeline.run(&input, &media_type);
    let elapsed = start.elapsed();

    let output_path = args.output.clone().unwrap_or_else(|| default_output(&args.input));
    fs::write(&output_path, &processed.bytes)?;

    match &processed.outcome {
        Outcome::Flattened(analysis) => eprintln!(
            "Flattened {:?} -> {:?} ({:.1}% transparent, luma {:.1}, {:.2?})",
            args.input,
            output_path,
            analysis.transparent_ratio * 100.0,
            analysis.avg_luma,
            elapsed
        ),
        Outcome::PassThrough(reason) => eprintln!(
            "Copied {:?} -> {:?} unchanged ({reason})",
            args.input, output_path
        ),
    }
    if args.verbose > 0 {
        eprintln!("  Input:  {} bytes ({})", input.len(), media_type);
        eprintln!(
            "  Output: {} bytes ({})",
            processed.bytes.len(),
            processed.media_type
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output() {
        assert_eq!(
            default_output(Path::new("icons/github.png")),
            PathBuf::from("icons/github.flat.png")
        );
        assert_eq!(
            default_output(Path::new("favicon")),
            PathBuf::from("favicon.flat.png")
        );
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "pngflat",
            "in.png",
            "--light",
            "#eee",
            "--scale",
            "0.8",
            "-vv",
        ])
        .unwrap();
        assert_eq!(args.light, Rgb::new(0xEE, 0xEE, 0xEE));
        assert_eq!(args.dark, Rgb::new(0x1E, 0x1E, 0x1E));
        assert_eq!(args.scale, 0.8);
        assert_eq!(args.verbose, 2);
        assert!(!args.no_center);
    }

    #[test]
    fn test_args_reject_bad_color() {
        assert!(Args::try_parse_from(["pngflat", "in.png", "--dark", "nope"]).is_err());
    }

    #[test]
    fn test_compression_presets() {
        let parse = |extra: &[&str]| {
            let mut argv = vec!["pngflat", "in.png"];
            argv.extend_from_slice(extra);
            Args::try_parse_from(argv).unwrap().png_options()
        };
        assert_eq!(parse(&[]), PngOptions::default());
        assert_eq!(parse(&["--preset", "fast"]).compression_level, 1);
        assert_eq!(parse(&["--preset", "max"]).compression_level, 9);
        assert_eq!(parse(&["--preset", "fast", "-c", "4"]).compression_level, 4);
        assert!(Args::try_parse_from(["pngflat", "in.png", "-c", "0"]).is_err());
    }

    #[test]
    fn test_init_logging_twice() {
        init_logging(2);
        init_logging(0);
        assert!(log::log_enabled!(log::Level::Warn));
    }
}
