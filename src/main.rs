mod annotate;
mod capture;
mod constants;
mod detector;
mod error;
mod gallery;
mod matcher;
mod pipeline;
mod region;
mod settings;
mod window;

#[cfg(test)]
mod test_support;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::constants::*;
use anyhow::{Context, Result};
use capture::Capture;
use clap::Parser;
use detector::{CascadeDetector, RegionDetector};
use gallery::Gallery;
use matcher::RegionMatcher;
use opencv::core::TickMeter;
use opencv::prelude::*;
use pipeline::Pipeline;
use settings::Settings;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use window::Window;

/// Live webcam face detection that labels faces found in a reference gallery.
#[derive(Parser, Debug)]
#[command(name = "face-match-cam")]
struct Args {
    /// Settings file with CASCADE_FILE_MAIN, CASCADE_FILE_EYES and IMAGE_DIR.
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    settings: PathBuf,
    /// Camera device index.
    #[arg(long, default_value_t = 0)]
    camera: i32,
    /// Overrides MATCH_THRESHOLD from the settings file.
    #[arg(long, value_parser = threshold_arg, allow_hyphen_values = true)]
    threshold: Option<f64>,
    #[arg(long, default_value_t = CAPTURE_WIDTH)]
    width: i32,
    #[arg(long, default_value_t = CAPTURE_HEIGHT)]
    height: i32,
}

fn threshold_arg(value: &str) -> std::result::Result<f64, String> {
    settings::parse_threshold(value).ok_or_else(|| format!("{value:?} is not a finite number"))
}

fn frame_loop<D: RegionDetector>(
    mut capture: Capture,
    mut pipeline: Pipeline<D>,
    window: Window,
) -> Result<()> {
    let mut tick_meter = TickMeter::default()?;
    let mut read_failures = 0;
    loop {
        let mut frame = match capture.grab_frame() {
            Ok(Some(frame)) => {
                read_failures = 0;
                frame
            }
            Ok(None) => {
                info!("video stream ended");
                break;
            }
            Err(err) => {
                read_failures += 1;
                if read_failures > MAX_CONSECUTIVE_READ_FAILURES {
                    return Err(err).context("camera stopped delivering frames");
                }
                warn!(error = %err, "failed to read frame, skipping");
                continue;
            }
        };

        tick_meter.start()?;
        let processed = pipeline.process(&mut frame);
        tick_meter.stop()?;
        if let Err(err) = processed {
            warn!(error = %err, "failed to process frame");
        }

        window.show_image(&mut frame, Some(tick_meter.get_fps()?))?;
        tick_meter.reset()?;

        if window.poll_quit()? {
            info!("quit requested");
            break;
        }
    }

    Ok(())
}

fn run(args: Args) -> Result<()> {
    let mut settings = Settings::load(&args.settings)
        .with_context(|| format!("Failed to open {}", args.settings.display()))?;
    if let Some(threshold) = args.threshold {
        settings.match_threshold = threshold;
    }

    let detector =
        CascadeDetector::load(&settings.cascade_main).context("Could not find the face cascade.")?;
    // Not used for matching yet; loading it validates the configured path.
    let _eyes =
        CascadeDetector::load(&settings.cascade_eyes).context("Could not find the eye cascade.")?;

    let gallery = Gallery::load(&settings.image_dir)?;
    if gallery.is_empty() {
        warn!(dir = %settings.image_dir.display(), "gallery is empty, no face will be identified");
    } else {
        info!(dir = %settings.image_dir.display(), references = gallery.len(), "gallery loaded");
    }

    let capture =
        Capture::create(args.camera, args.width, args.height).context("Error opening camera.")?;
    let window = Window::create(WINDOW_NAME, args.width, args.height)?;

    let matcher = RegionMatcher::new(settings.match_threshold);
    info!(threshold = matcher.threshold(), "starting capture, press ESC or q to quit");
    frame_loop(capture, Pipeline::new(detector, gallery, matcher), window)
}

/// Keeps a console window open long enough for the operator to read the error.
fn wait_for_acknowledgement() {
    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        return;
    }
    eprint!("Press Enter to exit...");
    let mut line = String::new();
    let _ = stdin.read_line(&mut line);
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            wait_for_acknowledgement();
            ExitCode::FAILURE
        }
    }
}
