//! Targeting controller binary.

use anyhow::Context;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vguard_controller::{
    ControlLoop, DirectoryFrameSource, FrameRenderer, GrayTemplateMatcher, LoggingOutput, LoggingServo,
    RunnerConfig, SessionLogger, StdinButton,
};
use vguard_core::{Devices, PressClassifier, SafetySystem, TemplateCatalog};
use vguard_models::SessionId;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing()?;

    info!("Starting vguard-controller");

    let config = RunnerConfig::from_env().context("failed to load configuration")?;
    info!("Runner config: {:?}", config);
    config.validate().context("invalid configuration")?;

    let metrics = install_metrics();

    let session_id = SessionId::new();
    let logger = SessionLogger::new(&session_id, "control_loop");

    let catalog = TemplateCatalog::load(&config.templates, config.controller.template_blur);
    let system = SafetySystem::new(config.controller.clone(), catalog, GrayTemplateMatcher::new())
        .context("failed to build controller")?;

    let source = DirectoryFrameSource::open(&config.frame_dir, config.loop_frames)
        .with_context(|| format!("failed to open frame directory {}", config.frame_dir.display()))?;

    let button = StdinButton::spawn(PressClassifier::from_config(&config.controller));
    let devices = Devices::new(
        Box::new(LoggingServo::new("pan")),
        Box::new(LoggingServo::new("tilt")),
        Box::new(LoggingOutput::new("alert")),
        Box::new(LoggingOutput::new("centering")),
    );
    let renderer = FrameRenderer::new(config.overlay_dir.clone()).context("failed to prepare overlay directory")?;

    let mut control = ControlLoop::new(
        system,
        source,
        Box::new(button),
        devices,
        renderer,
        config.frame_budget(),
        config.max_frames,
        logger.clone(),
    );

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal");
    };

    let result = control.run(shutdown).await;

    if let (Some(handle), Some(path)) = (&metrics, &config.metrics_dump) {
        dump_metrics(handle, path);
    }

    match result {
        Ok(stats) => {
            info!(
                frames = stats.frames,
                deadline_misses = stats.deadline_misses,
                source_errors = stats.source_errors,
                "Controller shutdown complete"
            );
            Ok(())
        }
        Err(e) => {
            logger.log_error(&e.to_string());
            error!("Control loop failed: {}", e);
            Err(e.into())
        }
    }
}

/// Colored output for dev, JSON for production.
fn init_tracing() -> anyhow::Result<()> {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("vguard_core=info".parse()?)
        .add_directive("vguard_controller=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
    Ok(())
}

/// Install the Prometheus recorder. Metrics are optional; a failure only
/// disables them.
fn install_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Metrics disabled: {}", e);
            None
        }
    }
}

fn dump_metrics(handle: &PrometheusHandle, path: &std::path::Path) {
    match std::fs::write(path, handle.render()) {
        Ok(()) => info!(path = %path.display(), "Metrics snapshot written"),
        Err(e) => warn!(path = %path.display(), "Failed to write metrics snapshot: {}", e),
    }
}
