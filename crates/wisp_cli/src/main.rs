//! `wisp` - render a built-in scene to an image file.

mod args;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use wisp_core::ScenePreset;
use wisp_renderer::{render, ImageBuffer};

use crate::args::CliArgs;

fn main() -> Result<()> {
    let args = CliArgs::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level())
        .init();

    if args.list_scenes {
        for preset in ScenePreset::ALL {
            println!("{}", preset.name());
        }
        return Ok(());
    }

    let config = args.render_config()?;
    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let preset = ScenePreset::from(args.scene);
    log::info!("Building scene '{}'", preset.name());
    let world = preset
        .build()
        .with_context(|| format!("failed to build scene '{}'", preset.name()))?;
    log::info!("Scene has {} primitives", world.primitive_count());

    let mut image = ImageBuffer::new(config.width, config.height);
    let stats = render(&world, &config, &mut image).context("invalid render config")?;

    save_image(&image, &args.output)?;
    log::info!(
        "Wrote {} ({} orders, {} threads, {:.2}s)",
        args.output.display(),
        stats.orders,
        stats.threads,
        stats.elapsed.as_secs_f64()
    );

    Ok(())
}

/// Write the packed pixels as PNG or BMP, chosen by file extension.
fn save_image(image: &ImageBuffer, path: &Path) -> Result<()> {
    let rgba = image::RgbaImage::from_raw(image.width(), image.height(), image.to_rgba8())
        .context("pixel buffer does not match image size")?;
    rgba.save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
