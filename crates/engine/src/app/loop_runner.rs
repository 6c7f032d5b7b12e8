use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use super::metrics::MetricsAccumulator;
use super::rendering::{is_on_screen, Viewport};
use super::scene::SceneMachine;
use super::{InputSnapshot, Scene, SceneCommand, SceneKey, SceneWorld};

const ON_SCREEN_MARGIN_PX: i32 = 64;

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    /// Stop after this many rendered frames. `None` runs until a scene quits.
    pub max_frames: Option<u64>,
    /// Pace frames against the wall clock instead of simulating frame time.
    pub realtime: bool,
    pub render_fps: u32,
    pub viewport: Viewport,
    /// Simulation units advanced per tick. Game code measures time in 60 Hz frames.
    pub tick_units: f32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            max_frames: Some(3600),
            realtime: false,
            render_fps: 60,
            viewport: Viewport::default(),
            tick_units: 1.0,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppError {
    #[error("headless loop without realtime pacing needs a frame limit")]
    UnboundedHeadlessRun,
    #[error("render_fps must be greater than zero")]
    ZeroRenderFps,
}

/// Supplies one input sample per simulation tick.
pub trait InputSource {
    fn snapshot_for_tick(&mut self, active_scene: SceneKey, world: &SceneWorld) -> InputSnapshot;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunReport {
    pub frames: u64,
    pub ticks: u64,
    pub dropped_backlog: Duration,
    pub final_scene: SceneKey,
}

pub fn run_headless(
    config: LoopConfig,
    title: Box<dyn Scene>,
    play: Box<dyn Scene>,
    input: &mut dyn InputSource,
) -> Result<RunReport, AppError> {
    if config.render_fps == 0 {
        return Err(AppError::ZeroRenderFps);
    }
    if config.max_frames.is_none() && !config.realtime {
        return Err(AppError::UnboundedHeadlessRun);
    }

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let render_frame = Duration::from_secs_f64(1.0 / config.render_fps as f64);
    let tick_units = if config.tick_units > 0.0 {
        config.tick_units
    } else {
        1.0
    };

    let mut scenes = SceneMachine::new(title, play, SceneKey::Title, config.viewport);
    scenes.load_active();
    info!(scene = ?scenes.active_scene(), "scene_loaded");
    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        render_fps = config.render_fps,
        realtime = config.realtime,
        max_frames = ?config.max_frames,
        "loop_config"
    );

    let mut accumulator = Duration::ZERO;
    let mut metrics = MetricsAccumulator::new(metrics_log_interval);
    let mut last_frame_instant = Instant::now();
    let mut last_title: Option<String> = None;
    let mut report = RunReport {
        frames: 0,
        ticks: 0,
        dropped_backlog: Duration::ZERO,
        final_scene: scenes.active_scene(),
    };

    'frames: loop {
        if config.max_frames.is_some_and(|limit| report.frames >= limit) {
            break;
        }

        let raw_frame_dt = if config.realtime {
            let elapsed = last_frame_instant.elapsed();
            if elapsed < render_frame {
                thread::sleep(render_frame - elapsed);
            }
            let now = Instant::now();
            let dt = now.saturating_duration_since(last_frame_instant);
            last_frame_instant = now;
            dt
        } else {
            render_frame
        };

        accumulator = accumulator.saturating_add(clamp_frame_delta(raw_frame_dt, max_frame_delta));
        let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
        for _ in 0..step_plan.ticks_to_run {
            let snapshot = input.snapshot_for_tick(scenes.active_scene(), scenes.active_world());
            if snapshot.quit_requested() {
                info!(reason = "input", "shutdown_requested");
                break 'frames;
            }
            let command = scenes.update_active(tick_units, &snapshot);
            report.ticks = report.ticks.saturating_add(1);
            metrics.record_tick();

            let switched = match command {
                SceneCommand::SwitchTo(next_scene) => scenes.switch_to(next_scene),
                SceneCommand::HardResetTo(next_scene) => {
                    scenes.hard_reset_to(next_scene);
                    true
                }
                SceneCommand::Quit => {
                    info!(reason = "scene", "shutdown_requested");
                    break 'frames;
                }
                SceneCommand::None => false,
            };
            if switched {
                info!(scene = ?scenes.active_scene(), "scene_switched");
            }
        }
        accumulator = step_plan.remaining_accumulator;

        if step_plan.dropped_backlog > Duration::ZERO {
            report.dropped_backlog = report
                .dropped_backlog
                .saturating_add(step_plan.dropped_backlog);
            metrics.record_dropped_backlog(step_plan.dropped_backlog);
            warn!(
                dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                max_ticks_per_frame, "sim_clamp_triggered"
            );
        }

        scenes.render_active();
        let world = scenes.active_world();
        let on_screen = world
            .render_layer()
            .items()
            .iter()
            .filter(|item| {
                is_on_screen(
                    item.world_position,
                    ON_SCREEN_MARGIN_PX,
                    world.camera(),
                    world.viewport(),
                )
            })
            .count();
        metrics.record_frame(raw_frame_dt, on_screen);
        report.frames = report.frames.saturating_add(1);

        let next_title = scenes.debug_title_active();
        if next_title != last_title {
            if let Some(title) = &next_title {
                debug!(title = title.as_str(), "title_changed");
            }
            last_title = next_title;
        }

        if let Some(snapshot) = metrics.maybe_snapshot() {
            info!(
                fps = snapshot.fps,
                tps = snapshot.tps,
                frame_time_ms = snapshot.frame_time_ms,
                render_items = snapshot.avg_render_items,
                dropped_backlog_ms = snapshot.dropped_backlog_ms,
                scene = ?scenes.active_scene(),
                "loop_metrics"
            );
        }
    }

    report.final_scene = scenes.active_scene();
    scenes.shutdown_all();
    info!(frames = report.frames, ticks = report.ticks, "shutdown");
    Ok(report)
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}
