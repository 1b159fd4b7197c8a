pub mod app;

pub use app::{
    camera_offset, closest_interactable, interaction_target, run_app, run_app_with_stats,
    step_player, AppError, Camera, ClosestInteractable, DialogState, DialogStatus,
    DialogueDispatcher, DialogueGenerator, DialogueHistory, DialogueRequest, DialogueRequestId,
    DialogueResponse, DialogueTurn, Entity, EntityId, EntityKind, FrameStats, FrameStatsHandle,
    GameMode, GameSession, InputAction, InputAggregator, InputSource, LoopConfig, ModeError,
    ModeEvent, ModeKind, Renderer, Tile, Vec2, Viewport, WorldMap, WorldMapError,
    BASE_SPEED_TILES_PER_MS, DEFAULT_CHARACTER_CONTEXT, DEFAULT_PLAYER_ACTION, HISTORY_WINDOW,
    INTERACTION_RADIUS,
};
