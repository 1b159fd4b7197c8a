use thiserror::Error;

use super::{DialogueRequestId, EntityId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogStatus {
    Loading,
    Ready(String),
}

/// An open dialogue overlay. It always refers to the request whose answer
/// it is waiting for (or already shows).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogState {
    pub speaker: EntityId,
    pub speaker_name: String,
    pub request: DialogueRequestId,
    pub status: DialogStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GameMode {
    #[default]
    Menu,
    Playing,
    Dialog(DialogState),
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeKind {
    Menu,
    Playing,
    Dialog,
    Paused,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeEvent {
    Start,
    Pause,
    Resume,
    OpenDialog {
        speaker: EntityId,
        speaker_name: String,
        request: DialogueRequestId,
    },
    CloseDialog,
    DialogueResolved {
        request: DialogueRequestId,
        text: String,
    },
}

impl ModeEvent {
    fn name(&self) -> &'static str {
        match self {
            ModeEvent::Start => "start",
            ModeEvent::Pause => "pause",
            ModeEvent::Resume => "resume",
            ModeEvent::OpenDialog { .. } => "open_dialog",
            ModeEvent::CloseDialog => "close_dialog",
            ModeEvent::DialogueResolved { .. } => "dialogue_resolved",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModeError {
    #[error("event {event} is not valid in mode {from:?}")]
    IllegalTransition { from: ModeKind, event: &'static str },
    #[error("dialogue response {got:?} does not match pending request {expected:?}")]
    StaleDialogue {
        expected: DialogueRequestId,
        got: DialogueRequestId,
    },
}

impl GameMode {
    pub fn kind(&self) -> ModeKind {
        match self {
            GameMode::Menu => ModeKind::Menu,
            GameMode::Playing => ModeKind::Playing,
            GameMode::Dialog(_) => ModeKind::Dialog,
            GameMode::Paused => ModeKind::Paused,
        }
    }

    pub fn runs_physics(&self) -> bool {
        matches!(self, GameMode::Playing)
    }

    pub fn dialog(&self) -> Option<&DialogState> {
        match self {
            GameMode::Dialog(state) => Some(state),
            _ => None,
        }
    }

    /// Transition table. Returns the next mode, or an error for any pair not
    /// listed; the current mode is left untouched by the caller in that case.
    pub fn transition(&self, event: ModeEvent) -> Result<GameMode, ModeError> {
        match (self, event) {
            (GameMode::Menu, ModeEvent::Start) => Ok(GameMode::Playing),
            (GameMode::Playing, ModeEvent::Pause) => Ok(GameMode::Paused),
            (GameMode::Paused, ModeEvent::Resume) => Ok(GameMode::Playing),
            (
                GameMode::Playing,
                ModeEvent::OpenDialog {
                    speaker,
                    speaker_name,
                    request,
                },
            ) => Ok(GameMode::Dialog(DialogState {
                speaker,
                speaker_name,
                request,
                status: DialogStatus::Loading,
            })),
            (GameMode::Dialog(_), ModeEvent::CloseDialog) => Ok(GameMode::Playing),
            (GameMode::Dialog(state), ModeEvent::DialogueResolved { request, text }) => {
                if state.request != request {
                    return Err(ModeError::StaleDialogue {
                        expected: state.request,
                        got: request,
                    });
                }
                Ok(GameMode::Dialog(DialogState {
                    status: DialogStatus::Ready(text),
                    ..state.clone()
                }))
            }
            (mode, event) => Err(ModeError::IllegalTransition {
                from: mode.kind(),
                event: event.name(),
            }),
        }
    }
}
