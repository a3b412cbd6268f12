//! Command line arguments.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ValueEnum;
use wisp_core::ScenePreset;
use wisp_renderer::{Intersector, RenderConfig, ToneMap};

/// Wisp command line interface arguments.
#[derive(clap::Parser, Debug)]
#[clap(author, version, about = "Offline stochastic path tracer.")]
pub struct CliArgs {
    /// Scene to render.
    #[clap(short, long, value_enum, default_value_t = SceneArg::DemoSpheres)]
    pub scene: SceneArg,

    /// Where to write the image. The extension picks the format (png or bmp).
    #[clap(short, long, default_value = "wisp.png")]
    pub output: PathBuf,

    /// JSON render config. Flags given on the command line override it.
    #[clap(short, long, help = "Path to a JSON render config")]
    pub config: Option<PathBuf>,

    #[clap(long, help = "Image width in pixels")]
    pub width: Option<u32>,

    #[clap(long, help = "Image height in pixels")]
    pub height: Option<u32>,

    #[clap(long = "spp", help = "Samples per pixel")]
    pub samples_per_pixel: Option<u32>,

    #[clap(long, help = "Image rows per work order")]
    pub rows_per_order: Option<u32>,

    #[clap(short = 'j', long, help = "Render threads, including the main one [default: all cores]")]
    pub threads: Option<usize>,

    #[clap(long, value_enum)]
    pub tone_map: Option<ToneMapArg>,

    #[clap(long, value_enum)]
    pub intersector: Option<IntersectorArg>,

    #[clap(short, long, help = "Only print warnings and errors")]
    pub quiet: bool,

    #[clap(short, long, help = "Print per-order progress")]
    pub verbose: bool,

    #[clap(long, help = "List the built-in scenes and exit")]
    pub list_scenes: bool,

    #[clap(long, help = "Print the effective render config as JSON and exit")]
    pub print_config: bool,
}

impl CliArgs {
    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            log::LevelFilter::Warn
        } else if self.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }

    /// Defaults, then the config file if any, then command line flags.
    pub fn render_config(&self) -> Result<RenderConfig> {
        let mut config = match &self.config {
            Some(path) => RenderConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => RenderConfig::default(),
        };

        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(samples) = self.samples_per_pixel {
            config.samples_per_pixel = samples;
        }
        if let Some(rows) = self.rows_per_order {
            config.rows_per_order = rows;
        }
        if self.threads.is_some() {
            config.threads = self.threads;
        }
        if let Some(tone_map) = self.tone_map {
            config.tone_map = tone_map.into();
        }
        if let Some(intersector) = self.intersector {
            config.intersector = intersector.into();
        }

        config.validate().context("invalid render settings")?;
        Ok(config)
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneArg {
    /// Spheres over a ground plane under a sky-colored environment
    DemoSpheres,
    /// Closed box lit by a ceiling panel
    CornellBox,
}

impl From<SceneArg> for ScenePreset {
    fn from(scene: SceneArg) -> Self {
        match scene {
            SceneArg::DemoSpheres => ScenePreset::DemoSpheres,
            SceneArg::CornellBox => ScenePreset::CornellBox,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneMapArg {
    Gamma2,
    Srgb,
}

impl From<ToneMapArg> for ToneMap {
    fn from(tone_map: ToneMapArg) -> Self {
        match tone_map {
            ToneMapArg::Gamma2 => ToneMap::Gamma2,
            ToneMapArg::Srgb => ToneMap::Srgb,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntersectorArg {
    Scalar,
    Wide,
}

impl From<IntersectorArg> for Intersector {
    fn from(intersector: IntersectorArg) -> Self {
        match intersector {
            IntersectorArg::Scalar => Intersector::Scalar,
            IntersectorArg::Wide => Intersector::Wide,
        }
    }
}
