use std::sync::Arc;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{debug, info, warn};
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, MouseButton, Touch, TouchPhase, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use super::metrics::FrameStatsWindow;
use super::{
    ControlsLayout, FrameStatsHandle, GameMode, GameSession, HudView, InputAction, PointerId,
    PointerOutcome, PointerRouter, Renderer, Vec2,
};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub tile_size_px: u32,
    /// Upper bound for one frame's dt, so a stall never moves the player
    /// across a whole tile in a single step.
    pub max_frame_delta: Duration,
    pub metrics_log_interval: Duration,
    pub show_debug_overlay: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Aetheria".to_string(),
            window_width: 1280,
            window_height: 720,
            tile_size_px: 48,
            max_frame_delta: Duration::from_millis(100),
            metrics_log_interval: Duration::from_secs(1),
            show_debug_overlay: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
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
    run_app_with_stats(config, session, FrameStatsHandle::default())
}

/// Opens the window and drives `session` until the window closes or the
/// quit key is pressed. `stats` receives a new value every metrics interval.
pub fn run_app_with_stats(
    config: LoopConfig,
    mut session: GameSession,
    stats: FrameStatsHandle,
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
    let mut renderer = Renderer::new(Arc::clone(&window), config.tile_size_px)
        .map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let size = window.inner_size();
    let mut host = HostInput::new(size.width, size.height, config.show_debug_overlay);
    let mut stats_window = FrameStatsWindow::new(Instant::now(), metrics_log_interval);

    info!(
        width = size.width,
        height = size.height,
        tile_size_px = config.tile_size_px,
        max_frame_delta_ms = config.max_frame_delta.as_millis() as u64,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        world_width = session.world().width(),
        world_height = session.world().height(),
        entity_count = session.world().entities().len(),
        "loop_config"
    );

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    host.set_window_size(new_size.width, new_size.height);
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    host.set_window_size(size.width, size.height);
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::Focused(false) => host.release_all(&mut session),
                WindowEvent::KeyboardInput { event, .. } => {
                    host.handle_key(event.physical_key, event.state, event.repeat, &mut session);
                    if host.quit_requested() {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    host.cursor_moved(to_vec2(position), &mut session);
                }
                WindowEvent::MouseInput {
                    state,
                    button: MouseButton::Left,
                    ..
                } => host.left_button(state, &mut session),
                WindowEvent::Touch(Touch {
                    id,
                    phase,
                    location,
                    ..
                }) => host.touch(id, phase, to_vec2(location), &mut session),
                WindowEvent::RedrawRequested => {
                    let frame_start = Instant::now();
                    let report = session.advance_frame(frame_start);
                    if report.stepped {
                        stats_window.record_step();
                    }
                    host.sync_with_mode(&mut session);

                    let hud = HudView {
                        controls: host.controls(),
                        stick: host.router().stick(),
                        stats: host.overlay_visible().then(|| stats.latest()),
                    };
                    if let Err(error) = renderer.render(&session, &hud) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                        return;
                    }
                    stats_window.record_frame(frame_start.elapsed());

                    if let Some(latest) = stats_window.roll(frame_start) {
                        stats.publish(latest);
                        info!(
                            fps = latest.fps,
                            steps_per_second = latest.steps_per_second,
                            frame_time_ms = latest.frame_time_ms,
                            mode = ?session.mode().kind(),
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                info!(dialogue_turns = session.history().len(), "shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

fn to_vec2(position: PhysicalPosition<f64>) -> Vec2 {
    Vec2::new(position.x as f32, position.y as f32)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

pub(crate) fn action_for_key(key: PhysicalKey) -> Option<InputAction> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    let action = match code {
        KeyCode::KeyW | KeyCode::ArrowUp => InputAction::MoveUp,
        KeyCode::KeyS | KeyCode::ArrowDown => InputAction::MoveDown,
        KeyCode::KeyA | KeyCode::ArrowLeft => InputAction::MoveLeft,
        KeyCode::KeyD | KeyCode::ArrowRight => InputAction::MoveRight,
        KeyCode::Space | KeyCode::Enter | KeyCode::NumpadEnter => InputAction::Interact,
        KeyCode::KeyP => InputAction::Pause,
        KeyCode::KeyX => InputAction::Attack,
        KeyCode::F3 => InputAction::ToggleOverlay,
        KeyCode::Escape => InputAction::Quit,
        _ => return None,
    };
    Some(action)
}

/// Translates raw window input into session calls and tracks the state
/// that belongs to the host rather than the simulation.
#[derive(Debug)]
pub(crate) struct HostInput {
    controls: ControlsLayout,
    router: PointerRouter,
    cursor: Option<Vec2>,
    left_button_down: bool,
    overlay_visible: bool,
    quit_requested: bool,
}

impl HostInput {
    pub(crate) fn new(width: u32, height: u32, overlay_visible: bool) -> Self {
        Self {
            controls: ControlsLayout::for_window(width, height),
            router: PointerRouter::default(),
            cursor: None,
            left_button_down: false,
            overlay_visible,
            quit_requested: false,
        }
    }

    pub(crate) fn controls(&self) -> &ControlsLayout {
        &self.controls
    }

    pub(crate) fn router(&self) -> &PointerRouter {
        &self.router
    }

    pub(crate) fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub(crate) fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub(crate) fn set_window_size(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.controls = ControlsLayout::for_window(width, height);
    }

    pub(crate) fn handle_key(
        &mut self,
        key: PhysicalKey,
        state: ElementState,
        repeat: bool,
        session: &mut GameSession,
    ) {
        let Some(action) = action_for_key(key) else {
            return;
        };
        match state {
            ElementState::Pressed if repeat => {}
            ElementState::Pressed => match action {
                InputAction::Quit => self.quit_requested = true,
                InputAction::ToggleOverlay => {
                    self.overlay_visible = !self.overlay_visible;
                    info!(overlay_visible = self.overlay_visible, "overlay_toggled");
                }
                _ => session.press(action),
            },
            ElementState::Released => session.release(action),
        }
    }

    pub(crate) fn cursor_moved(&mut self, position: Vec2, session: &mut GameSession) {
        self.cursor = Some(position);
        if self.left_button_down {
            let outcome = self.router.moved(PointerId::Mouse, position);
            self.apply(outcome, session);
        }
    }

    pub(crate) fn left_button(&mut self, state: ElementState, session: &mut GameSession) {
        match state {
            ElementState::Pressed => {
                if self.left_button_down {
                    return;
                }
                self.left_button_down = true;
                if let Some(position) = self.cursor {
                    self.pointer_pressed(PointerId::Mouse, position, session);
                }
            }
            ElementState::Released => {
                self.left_button_down = false;
                let outcome = self.router.released(PointerId::Mouse);
                self.apply(outcome, session);
            }
        }
    }

    pub(crate) fn touch(
        &mut self,
        id: u64,
        phase: TouchPhase,
        position: Vec2,
        session: &mut GameSession,
    ) {
        let id = PointerId::Touch(id);
        match phase {
            TouchPhase::Started => self.pointer_pressed(id, position, session),
            TouchPhase::Moved => {
                let outcome = self.router.moved(id, position);
                self.apply(outcome, session);
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                let outcome = self.router.released(id);
                self.apply(outcome, session);
            }
        }
    }

    /// Drops stick ownership once the session leaves `Playing`, where the
    /// on-screen controls are hidden.
    pub(crate) fn sync_with_mode(&mut self, session: &mut GameSession) {
        if !matches!(session.mode(), GameMode::Playing) && self.router.stick().is_active() {
            let outcome = self.router.cancel();
            self.apply(outcome, session);
        }
    }

    pub(crate) fn release_all(&mut self, session: &mut GameSession) {
        for action in [
            InputAction::MoveUp,
            InputAction::MoveDown,
            InputAction::MoveLeft,
            InputAction::MoveRight,
        ] {
            session.release(action);
        }
        self.left_button_down = false;
        let outcome = self.router.cancel();
        self.apply(outcome, session);
        debug!("input_released_on_focus_loss");
    }

    fn pointer_pressed(&mut self, id: PointerId, position: Vec2, session: &mut GameSession) {
        match session.mode() {
            GameMode::Playing => {
                let outcome = self.router.press(id, position, &self.controls);
                self.apply(outcome, session);
            }
            GameMode::Paused => session.toggle_pause(),
            GameMode::Menu | GameMode::Dialog(_) => session.interact(),
        }
    }

    fn apply(&mut self, outcome: PointerOutcome, session: &mut GameSession) {
        match outcome {
            PointerOutcome::None => {}
            PointerOutcome::StickMoved(vector) => session.stick_moved(vector),
            PointerOutcome::StickReleased => session.stick_stopped(),
            PointerOutcome::InteractPressed => session.interact(),
            PointerOutcome::AttackPressed => session.attack(),
        }
    }
}
