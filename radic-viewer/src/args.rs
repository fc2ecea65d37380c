use crate::config::Config;
use clap::Parser;
use radic_common::Size;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "radic")]
#[command(about = "Headless remote desktop view driven by a loopback session")]
#[command(version)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, env = "RADIC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Integer presentation scale
    #[arg(short, long)]
    pub scale: Option<u32>,

    /// Viewport width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Viewport height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Initial remote desktop size (WIDTHxHEIGHT)
    #[arg(long, value_name = "WxH", default_value = "1280x800", value_parser = parse_size)]
    pub desktop: Size,

    /// Frames per second produced by the loopback session
    #[arg(long, default_value_t = 30)]
    pub fps: u32,

    /// Seconds to run before disconnecting
    #[arg(short, long, default_value_t = 5)]
    pub duration: u64,

    /// Save the last rendered scene as PNG (default name is timestamped)
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    pub screenshot: Option<Option<PathBuf>>,

    /// Keep the remote desktop size fixed
    #[arg(long)]
    pub no_dynamic_resize: bool,

    /// Hide the frames-per-second overlay
    #[arg(long)]
    pub no_fps_overlay: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Override `config` with whatever was given on the command line.
    pub fn apply(&self, config: &mut Config) {
        if let Some(scale) = self.scale {
            config.display.scale = scale;
        }
        if let Some(width) = self.width {
            config.display.width = width;
        }
        if let Some(height) = self.height {
            config.display.height = height;
        }
        if self.no_dynamic_resize {
            config.resize.enabled = false;
        }
        if self.no_fps_overlay {
            config.display.fps_overlay = false;
        }
    }
}

fn parse_size(s: &str) -> Result<Size, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid dimension '{}': {}", v, e))
    };
    let size = Size::new(parse(w)?, parse(h)?);
    if size.is_empty() {
        return Err(format!("desktop size must be non-zero, got '{}'", s));
    }
    Ok(size)
}
