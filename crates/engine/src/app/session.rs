use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::{
    closest_interactable, interaction_target, step_player, ClosestInteractable,
    DialogueDispatcher, DialogueGenerator, DialogueHistory, DialogueRequest, DialogueResponse,
    Entity, GameMode, InputAction, InputAggregator, ModeError, ModeEvent, Vec2, WorldMap,
};

pub const COMBAT_NOTICE: &str = "Combat not implemented in prototype";
pub const NOTICE_DURATION_MS: f32 = 2000.0;

/// Measures the time between frames in milliseconds.
///
/// The first tick after construction or [`reset`](Self::reset) reports 0.
/// Longer gaps are clamped to `max_delta`.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    last: Option<Instant>,
    max_delta: Duration,
}

impl FrameClock {
    pub fn new(max_delta: Duration) -> Self {
        Self {
            last: None,
            max_delta,
        }
    }

    pub fn tick(&mut self, now: Instant) -> f32 {
        let delta = match self.last {
            Some(previous) => now.saturating_duration_since(previous).min(self.max_delta),
            None => Duration::ZERO,
        };
        self.last = Some(now);
        delta.as_secs_f32() * 1000.0
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Short-lived banner text.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub text: String,
    remaining_ms: f32,
}

impl Notice {
    fn new(text: impl Into<String>, duration_ms: f32) -> Self {
        Self {
            text: text.into(),
            remaining_ms: duration_ms,
        }
    }

    pub fn remaining_ms(&self) -> f32 {
        self.remaining_ms
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub dt_ms: f32,
    pub stepped: bool,
}

/// Everything the frame loop mutates: player, input, mode and dialogue.
///
/// The host owns exactly one session and lends it to the renderer by shared
/// reference after each [`advance_frame`](Self::advance_frame).
#[derive(Debug)]
pub struct GameSession {
    world: WorldMap,
    player: Vec2,
    input: InputAggregator,
    mode: GameMode,
    clock: FrameClock,
    history: DialogueHistory,
    dispatcher: DialogueDispatcher,
    notice: Option<Notice>,
}

impl GameSession {
    pub fn new(
        world: WorldMap,
        player_start: Vec2,
        generator: Arc<dyn DialogueGenerator>,
        max_frame_delta: Duration,
    ) -> Self {
        Self {
            world,
            player: player_start,
            input: InputAggregator::new(),
            mode: GameMode::Menu,
            clock: FrameClock::new(max_frame_delta),
            history: DialogueHistory::default(),
            dispatcher: DialogueDispatcher::new(generator),
            notice: None,
        }
    }

    pub fn world(&self) -> &WorldMap {
        &self.world
    }

    pub fn player(&self) -> Vec2 {
        self.player
    }

    pub fn mode(&self) -> &GameMode {
        &self.mode
    }

    pub fn input(&self) -> &InputAggregator {
        &self.input
    }

    pub fn history(&self) -> &DialogueHistory {
        &self.history
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn closest_interactable(&self) -> Option<ClosestInteractable<'_>> {
        closest_interactable(self.player, self.world.entities())
    }

    /// Entity that would answer an interaction right now.
    pub fn interaction_target(&self) -> Option<&Entity> {
        interaction_target(self.player, self.world.entities())
    }

    /// One scheduled frame: measure dt, collect dialogue results, run the
    /// physics step when playing, and age the notice.
    pub fn advance_frame(&mut self, now: Instant) -> FrameReport {
        let dt_ms = self.clock.tick(now);
        self.poll_dialogue();
        let stepped = self.step(dt_ms);
        self.age_notice(dt_ms);
        FrameReport { dt_ms, stepped }
    }

    /// Runs the physics step for `dt_ms` if the mode allows it.
    pub fn step(&mut self, dt_ms: f32) -> bool {
        if !self.mode.runs_physics() {
            return false;
        }
        self.player = step_player(self.player, self.input.vector(), dt_ms, &self.world);
        true
    }

    pub fn press(&mut self, action: InputAction) {
        match action {
            InputAction::MoveUp
            | InputAction::MoveDown
            | InputAction::MoveLeft
            | InputAction::MoveRight => self.input.set_movement_held(action, true),
            InputAction::Interact => self.interact(),
            InputAction::Pause => self.toggle_pause(),
            InputAction::Attack => self.attack(),
            InputAction::ToggleOverlay | InputAction::Quit => {}
        }
    }

    pub fn release(&mut self, action: InputAction) {
        if action.is_movement() {
            self.input.set_movement_held(action, false);
        }
    }

    pub fn stick_moved(&mut self, stick: Vec2) {
        self.input.stick_moved(stick);
    }

    pub fn stick_stopped(&mut self) {
        self.input.stick_stopped();
    }

    /// The interact action: starts the game from the menu, talks to the
    /// nearest entity while playing, and dismisses an open dialogue.
    pub fn interact(&mut self) {
        match self.mode {
            GameMode::Menu => self.apply_or_log(ModeEvent::Start),
            GameMode::Playing => {
                self.try_interact();
            }
            GameMode::Dialog(_) => self.apply_or_log(ModeEvent::CloseDialog),
            GameMode::Paused => {}
        }
    }

    /// Requests dialogue from the entity in range, if any. Out-of-range
    /// requests are ignored.
    pub fn try_interact(&mut self) -> bool {
        if !self.mode.runs_physics() {
            return false;
        }
        let Some(target) = self.interaction_target() else {
            debug!(x = self.player.x, y = self.player.y, "interaction_out_of_range");
            return false;
        };
        let speaker = target.id;
        let speaker_name = target.name.clone();
        let request = DialogueRequest::new(
            target.name.as_str(),
            target.dialogue_context.as_deref(),
            &self.history,
        );

        let request_id = self.dispatcher.dispatch(request);
        info!(
            speaker = %speaker_name,
            request_id = request_id.0,
            "dialogue_requested"
        );
        self.apply_or_log(ModeEvent::OpenDialog {
            speaker,
            speaker_name,
            request: request_id,
        });
        true
    }

    pub fn toggle_pause(&mut self) {
        let event = match self.mode {
            GameMode::Playing => ModeEvent::Pause,
            GameMode::Paused => ModeEvent::Resume,
            _ => return,
        };
        self.apply_or_log(event);
    }

    pub fn attack(&mut self) {
        if !self.mode.runs_physics() {
            return;
        }
        info!("combat_not_implemented");
        self.notice = Some(Notice::new(COMBAT_NOTICE, NOTICE_DURATION_MS));
    }

    pub fn apply(&mut self, event: ModeEvent) -> Result<(), ModeError> {
        let next = self.mode.transition(event)?;
        let from = self.mode.kind();
        let to = next.kind();
        if from != to {
            self.clock.reset();
            info!(from = ?from, to = ?to, "mode_changed");
        }
        self.mode = next;
        Ok(())
    }

    fn apply_or_log(&mut self, event: ModeEvent) {
        if let Err(error) = self.apply(event) {
            warn!(error = %error, "mode_transition_rejected");
        }
    }

    fn poll_dialogue(&mut self) {
        for response in self.dispatcher.poll() {
            self.resolve_dialogue(response);
        }
    }

    /// Applies a finished response only when it belongs to the open dialog.
    fn resolve_dialogue(&mut self, response: DialogueResponse) {
        let pending = self.mode.dialog().map(|state| state.request);
        if pending != Some(response.id) {
            debug!(
                request_id = response.id.0,
                speaker = %response.speaker,
                "dialogue_discarded_stale"
            );
            return;
        }

        self.history
            .push(response.speaker.as_str(), response.text.as_str());
        info!(
            request_id = response.id.0,
            speaker = %response.speaker,
            history_len = self.history.len(),
            "dialogue_resolved"
        );
        self.apply_or_log(ModeEvent::DialogueResolved {
            request: response.id,
            text: response.text,
        });
    }

    fn age_notice(&mut self, dt_ms: f32) {
        if let Some(notice) = self.notice.as_mut() {
            notice.remaining_ms -= dt_ms;
            if notice.remaining_ms <= 0.0 {
                self.notice = None;
            }
        }
    }
}
