mod controls;
mod dialogue;
mod input;
mod interaction;
mod loop_runner;
mod metrics;
mod mode;
mod physics;
mod rendering;
mod session;
mod world;

pub use controls::{
    CircleControl, ControlsLayout, PointerId, PointerOutcome, PointerRouter, VirtualStick,
    STICK_BASE_RADIUS_PX, STICK_KNOB_RADIUS_PX,
};
pub use dialogue::{
    DialogueDispatcher, DialogueGenerator, DialogueHistory, DialogueRequest, DialogueRequestId,
    DialogueResponse, DialogueTurn, DEFAULT_CHARACTER_CONTEXT, DEFAULT_PLAYER_ACTION,
    HISTORY_WINDOW,
};
pub use input::{normalize_or_zero, InputAction, InputAggregator, InputSource, STICK_DEAD_ZONE};
pub use interaction::{
    closest_interactable, interaction_target, ClosestInteractable, INTERACTION_RADIUS,
};
pub use loop_runner::{run_app, run_app_with_stats, AppError, LoopConfig};
pub use metrics::{FrameStats, FrameStatsHandle};
pub use mode::{DialogState, DialogStatus, GameMode, ModeError, ModeEvent, ModeKind};
pub use physics::{step_player, BASE_SPEED_TILES_PER_MS};
pub use rendering::{
    camera_offset, draw_chrome, draw_frame, draw_menu, draw_scene, overlay_lines,
    world_to_screen_px, wrap_text, Camera, Canvas, HudView, Renderer, TileSpan, Viewport,
};
pub use session::{
    FrameClock, FrameReport, GameSession, Notice, COMBAT_NOTICE, NOTICE_DURATION_MS,
};
pub use world::{
    Entity, EntityId, EntityKind, Tile, Vec2, WorldMap, WorldMapError, OUT_OF_BOUNDS_TILE,
};
