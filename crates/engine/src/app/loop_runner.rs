use std::env;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::config::ConfigError;
use crate::pool::PoolCategory;
use crate::session::GameSession;
use crate::StartupError;

use super::input::{action_for_key, ActionStates};
use super::metrics::MetricsAccumulator;
use super::overlay::{draw_overlay, OverlayData};
use super::{InputAction, InputEvent, MetricsHandle, MouseButtonKind, Renderer};

pub const SLOW_FRAME_ENV_VAR: &str = "SKIRMISH_SLOW_FRAME_MS";

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub simulated_slow_frame_ms: u64,
    pub max_render_fps: Option<u32>,
    pub overlay_visible: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Skirmish".to_string(),
            window_width: 1280,
            window_height: 720,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            simulated_slow_frame_ms: 0,
            max_render_fps: None,
            overlay_visible: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(config: LoopConfig, session: GameSession) -> Result<(), AppError> {
    let metrics_handle = MetricsHandle::default();
    run_app_with_metrics(config, session, metrics_handle)
}

pub fn run_app_with_metrics(
    config: LoopConfig,
    mut session: GameSession,
    metrics_handle: MetricsHandle,
) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let window_for_loop = Arc::clone(&window);
    let mut renderer = Renderer::new(window).map_err(AppError::CreateRenderer)?;
    let (surface_width, surface_height) = renderer.size();
    session.resize(surface_width, surface_height);

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let slow_frame_delay = resolve_slow_frame_delay(config.simulated_slow_frame_ms);
    let effective_render_cap = normalize_render_fps_cap(config.max_render_fps);
    let render_frame_target = target_frame_duration(effective_render_cap);
    let mut input_collector = InputCollector::default();

    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        slow_frame_delay_ms = slow_frame_delay.as_millis() as u64,
        render_fps_cap = %format_render_cap(effective_render_cap),
        surface_width,
        surface_height,
        "loop_config"
    );

    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);
    let mut overlay_visible = config.overlay_visible;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window_for_loop.id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        input_collector.mark_quit_requested();
                        info!(reason = "window_close", "shutdown_requested");
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                        session.resize(new_size.width, new_size.height);
                    }
                    WindowEvent::ScaleFactorChanged { .. } => {
                        let size = window_for_loop.inner_size();
                        if let Err(error) = renderer.resize(size.width, size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                        session.resize(size.width, size.height);
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        input_collector.set_cursor_position_px(position.x as f32, position.y as f32);
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        input_collector.handle_mouse_input(button, state);
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        input_collector.handle_keyboard_input(&event);
                        if input_collector.quit_requested {
                            info!(reason = "escape_key", "shutdown_requested");
                            window_target.exit();
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        if input_collector.take_overlay_toggle_pressed() {
                            overlay_visible = !overlay_visible;
                            info!(overlay_visible, "overlay_toggled");
                        }

                        if slow_frame_delay > Duration::ZERO {
                            // Explicit debug perturbation only; this is not the FPS cap.
                            thread::sleep(slow_frame_delay);
                        }

                        let now = Instant::now();
                        let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                        last_frame_instant = now;

                        let clamped_frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
                        accumulator = accumulator.saturating_add(clamped_frame_dt);

                        for input_event in input_collector.drain_events() {
                            session.handle_input(input_event);
                        }

                        let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                        {
                            let mut canvas = renderer.canvas();
                            for _ in 0..step_plan.ticks_to_run {
                                session.tick(canvas.as_mut());
                                metrics_accumulator.record_tick();
                            }
                            if let Some(canvas) = canvas.as_mut().filter(|_| overlay_visible) {
                                let overlay = overlay_data(
                                    &session,
                                    metrics_handle.snapshot(),
                                    effective_render_cap,
                                    slow_frame_delay,
                                );
                                draw_overlay(canvas, &overlay);
                            }
                        }
                        accumulator = step_plan.remaining_accumulator;

                        if step_plan.dropped_backlog > Duration::ZERO {
                            warn!(
                                dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                                max_ticks_per_frame, "sim_clamp_triggered"
                            );
                        }

                        // Single authoritative FPS cap sleep point for render pacing.
                        let elapsed_since_last_present =
                            Instant::now().saturating_duration_since(last_present_instant);
                        let cap_sleep =
                            compute_cap_sleep(elapsed_since_last_present, render_frame_target);
                        if cap_sleep > Duration::ZERO {
                            thread::sleep(cap_sleep);
                        }

                        if let Err(error) = renderer.present() {
                            warn!(error = %error, "renderer_present_failed");
                            window_target.exit();
                        }
                        last_present_instant = Instant::now();
                        metrics_accumulator.record_frame(raw_frame_dt);
                        metrics_accumulator.record_population(
                            session.active_animation_count(),
                            session.live_projectile_count(),
                        );

                        if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                            metrics_handle.publish(snapshot);
                            info!(
                                fps = snapshot.fps,
                                tps = snapshot.tps,
                                frame_time_ms = snapshot.frame_time_ms,
                                active_animations = snapshot.active_animations,
                                live_projectiles = snapshot.live_projectiles,
                                peak_projectiles = snapshot.peak_projectiles,
                                "loop_metrics"
                            );
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                window_for_loop.request_redraw();
            }
            Event::LoopExiting => {
                session.clear_all(None);
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

fn overlay_data(
    session: &GameSession,
    metrics: super::LoopMetricsSnapshot,
    render_fps_cap: Option<u32>,
    slow_frame_delay: Duration,
) -> OverlayData {
    OverlayData {
        metrics,
        render_fps_cap,
        slow_frame_delay_ms: slow_frame_delay.as_millis() as u64,
        explosions: session.category_count(PoolCategory::Explosions),
        flames: session.category_count(PoolCategory::Flames),
        soldiers: session.category_count(PoolCategory::Soldiers),
        live_projectiles: session.live_projectile_count(),
        soldier_state: session
            .soldier()
            .map(|soldier| if soldier.is_alive() { soldier.action_state().as_str() } else { "dead" }),
    }
}

/// Translates window input into session events. Key repeats and repeated
/// presses of a key that is already down are dropped.
#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    overlay_toggle_pressed_edge: bool,
    action_states: ActionStates,
    primary_mouse_is_down: bool,
    secondary_mouse_is_down: bool,
    pending: Vec<InputEvent>,
}

impl InputCollector {
    fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        if key_event.repeat {
            return;
        }
        if let Some(action) = action_for_key(key_event.physical_key) {
            self.handle_action_key(action, key_event.state);
        }
    }

    fn handle_action_key(&mut self, action: InputAction, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if self.action_states.is_down(action) {
                    return;
                }
                self.action_states.set(action, true);
                match action {
                    InputAction::Quit => self.mark_quit_requested(),
                    InputAction::ToggleOverlay => self.overlay_toggle_pressed_edge = true,
                    _ => self.pending.push(InputEvent::KeyDown(action)),
                }
            }
            ElementState::Released => {
                if !self.action_states.is_down(action) {
                    return;
                }
                self.action_states.set(action, false);
                if !matches!(action, InputAction::Quit | InputAction::ToggleOverlay) {
                    self.pending.push(InputEvent::KeyUp(action));
                }
            }
        }
    }

    fn take_overlay_toggle_pressed(&mut self) -> bool {
        let was_pressed = self.overlay_toggle_pressed_edge;
        self.overlay_toggle_pressed_edge = false;
        was_pressed
    }

    /// Consecutive cursor moves collapse into the latest position.
    fn set_cursor_position_px(&mut self, x: f32, y: f32) {
        if let Some(InputEvent::MouseMove { x: last_x, y: last_y }) = self.pending.last_mut() {
            *last_x = x;
            *last_y = y;
            return;
        }
        self.pending.push(InputEvent::MouseMove { x, y });
    }

    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        let kind = MouseButtonKind::from(button);
        let is_down = match kind {
            MouseButtonKind::Primary => &mut self.primary_mouse_is_down,
            MouseButtonKind::Secondary => &mut self.secondary_mouse_is_down,
            MouseButtonKind::Other => return,
        };
        match state {
            ElementState::Pressed => {
                if !*is_down {
                    *is_down = true;
                    self.pending.push(InputEvent::MouseDown(kind));
                }
            }
            ElementState::Released => {
                if *is_down {
                    *is_down = false;
                    self.pending.push(InputEvent::MouseUp(kind));
                }
            }
        }
    }

    fn drain_events(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.pending)
    }
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

    let dropped_backlog = if accumulator >= fixed_dt {
        std::mem::take(&mut accumulator)
    } else {
        Duration::ZERO
    };
    StepPlan {
        ticks_to_run,
        remaining_accumulator: accumulator,
        dropped_backlog,
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

fn normalize_render_fps_cap(cap: Option<u32>) -> Option<u32> {
    cap.filter(|value| *value > 0)
}

fn target_frame_duration(max_render_fps: Option<u32>) -> Option<Duration> {
    max_render_fps.map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}

fn format_render_cap(cap: Option<u32>) -> String {
    match cap {
        Some(value) => value.to_string(),
        None => "off".to_string(),
    }
}

fn resolve_slow_frame_delay(config_slow_frame_ms: u64) -> Duration {
    match env::var(SLOW_FRAME_ENV_VAR) {
        Ok(value) => match value.parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms),
            Err(_) => {
                warn!(
                    env_var = SLOW_FRAME_ENV_VAR,
                    value = value.as_str(),
                    "invalid slow-frame env var value; falling back to config"
                );
                Duration::from_millis(config_slow_frame_ms)
            }
        },
        Err(env::VarError::NotPresent) => Duration::from_millis(config_slow_frame_ms),
        Err(err) => {
            warn!(
                env_var = SLOW_FRAME_ENV_VAR,
                error = %err,
                "unable to read slow-frame env var; falling back to config"
            );
            Duration::from_millis(config_slow_frame_ms)
        }
    }
}
