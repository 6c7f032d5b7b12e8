use std::process::ExitCode;

use engine::run_headless;
use tracing::{error, info};

use super::bootstrap::AppWiring;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let AppWiring {
        config,
        title,
        play,
        mut input,
        seed,
    } = app;

    match run_headless(config, title, play, &mut input) {
        Ok(report) => {
            info!(
                seed,
                frames = report.frames,
                ticks = report.ticks,
                dropped_backlog_ms = report.dropped_backlog.as_millis() as u64,
                final_scene = ?report.final_scene,
                games = input.games_finished(),
                "run_complete"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "startup_failed");
            ExitCode::FAILURE
        }
    }
}
