use anyhow::{Context, Result};
use clap::Parser;
use radic_session::{LoopbackSession, PumpConfig, RemoteSession, ViewId};
use radic_viewer::{Args, Config, Scheduler, SessionView};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

fn init_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "radic={0},radic_viewer={0},radic_display=info,radic_session=info,radic_input=info",
                    log_level
                )
                .into()
            }),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = Config::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn screenshot_path(requested: Option<PathBuf>) -> PathBuf {
    requested.unwrap_or_else(|| {
        PathBuf::from(
            chrono::Local::now()
                .format("radic-%Y%m%d-%H%M%S.png")
                .to_string(),
        )
    })
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    info!("Starting radic {}", env!("CARGO_PKG_VERSION"));
    let config = load_config(&args)?;

    let session = Arc::new(LoopbackSession::new(args.desktop));
    let remote: Arc<dyn RemoteSession> = session.clone();
    let mut view = SessionView::new(ViewId(1), remote, &config)?;

    session
        .start(
            view.session_context(),
            PumpConfig {
                fps: args.fps,
                ..PumpConfig::default()
            },
        )
        .context("Failed to start session event pump")?;

    let scheduler = Scheduler::new(config.resize.tick_interval());
    let stats = scheduler.run_for(&mut view, Duration::from_secs(args.duration));
    info!(
        "Ran {} ticks, {} renders, fps samples {:?}",
        stats.ticks, stats.renders, stats.fps_samples
    );
    for size in &stats.negotiated {
        info!("Negotiated desktop size {}", size);
    }

    if let Some(requested) = args.screenshot.clone() {
        let path = screenshot_path(requested);
        match &stats.last_scene {
            Some(scene) => {
                scene
                    .save_png(&path)
                    .with_context(|| format!("Failed to save screenshot {}", path.display()))?;
                info!("Saved screenshot to {}", path.display());
            }
            None => warn!("Nothing rendered, no screenshot taken"),
        }
    }

    // The pump reports the disconnect; one more tick applies it.
    session.disconnect();
    view.tick();

    let compositor = view.stats();
    info!(
        "Compositor: {} submitted, {} replaced, {} composed",
        compositor.submitted, compositor.replaced, compositor.composed
    );
    view.shutdown();
    info!("Viewer exited normally");
    Ok(())
}
