// Command line and the session tunables derived from it.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::placement::ScalePolicy;
use crate::sampler::DEFAULT_PATTERN_RADIUS;

#[derive(Debug, Parser)]
#[command(name = "defect-synth", version, about = "Stamp synthetic defects onto clean inspection images")]
pub struct Cli {
    /// Log level spec, e.g. `info` or `defect_synth=debug`.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the interactive editor window.
    Edit(EditArgs),
    /// Renumber a sprite directory as defect_NNN.png.
    Normalize {
        #[arg(long, default_value = "defects")]
        dir: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
pub struct EditArgs {
    /// Background image to edit.
    #[arg(long)]
    pub image: Option<PathBuf>,
    /// Directory of defect sprites.
    #[arg(long, default_value = "defects")]
    pub defects: PathBuf,
    /// Where `W` saves the result.
    #[arg(long, default_value = "output.png")]
    pub output: PathBuf,
    /// Fixed RNG seed for reproducible placement.
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long, default_value_t = DEFAULT_PATTERN_RADIUS)]
    pub sample_radius: u32,
    #[arg(long, default_value_t = 3)]
    pub stroke_width: u32,
    /// Sprite width as a fraction of the canvas width (manual and whole-canvas auto add).
    #[arg(long, default_value_t = 0.02, value_parser = parse_fraction)]
    pub canvas_scale: f32,
    /// Sprite width as a fraction of the selection width (auto add inside a region).
    #[arg(long, default_value_t = 0.25, value_parser = parse_fraction)]
    pub region_scale: f32,
}

/// A width fraction: finite and in `(0, 1]`.
fn parse_fraction(s: &str) -> Result<f32, String> {
    let value: f32 = s.parse().map_err(|e| format!("`{s}` is not a number: {e}"))?;
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(format!("`{s}` must be a fraction in (0, 1]"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Neighborhood radius for the scratch color.
    pub sample_radius: u32,
    pub stroke_width: u32,
    pub manual_scale: ScalePolicy,
    pub auto_scale: ScalePolicy,
    pub region_scale: ScalePolicy,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_radius: DEFAULT_PATTERN_RADIUS,
            stroke_width: 3,
            manual_scale: ScalePolicy::CanvasWidth(0.02),
            auto_scale: ScalePolicy::CanvasWidth(0.02),
            region_scale: ScalePolicy::RegionWidth(0.25),
            seed: None,
        }
    }
}

impl From<&EditArgs> for Config {
    fn from(args: &EditArgs) -> Self {
        Self {
            sample_radius: args.sample_radius,
            stroke_width: args.stroke_width,
            manual_scale: ScalePolicy::CanvasWidth(args.canvas_scale),
            auto_scale: ScalePolicy::CanvasWidth(args.canvas_scale),
            region_scale: ScalePolicy::RegionWidth(args.region_scale),
            seed: args.seed,
        }
    }
}
