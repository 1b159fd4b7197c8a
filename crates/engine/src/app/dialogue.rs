use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use tracing::info;

/// Number of prior turns sent along with each dialogue request.
pub const HISTORY_WINDOW: usize = 4;
pub const DEFAULT_PLAYER_ACTION: &str = "Hello!";
pub const DEFAULT_CHARACTER_CONTEXT: &str = "A generic villager.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueTurn {
    pub speaker: String,
    pub text: String,
}

/// Session-wide conversation log, shared across all speakers.
#[derive(Debug, Clone, Default)]
pub struct DialogueHistory {
    turns: Vec<DialogueTurn>,
}

impl DialogueHistory {
    pub fn push(&mut self, speaker: impl Into<String>, text: impl Into<String>) {
        self.turns.push(DialogueTurn {
            speaker: speaker.into(),
            text: text.into(),
        });
    }

    pub fn turns(&self) -> &[DialogueTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The last `count` turns, oldest first.
    pub fn recent(&self, count: usize) -> &[DialogueTurn] {
        let start = self.turns.len().saturating_sub(count);
        &self.turns[start..]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueRequest {
    pub character_name: String,
    pub character_context: String,
    pub player_action: String,
    pub history: Vec<DialogueTurn>,
}

impl DialogueRequest {
    pub fn new(
        character_name: impl Into<String>,
        character_context: Option<&str>,
        history: &DialogueHistory,
    ) -> Self {
        Self {
            character_name: character_name.into(),
            character_context: character_context
                .unwrap_or(DEFAULT_CHARACTER_CONTEXT)
                .to_string(),
            player_action: DEFAULT_PLAYER_ACTION.to_string(),
            history: history.recent(HISTORY_WINDOW).to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DialogueRequestId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueResponse {
    pub id: DialogueRequestId,
    pub speaker: String,
    pub text: String,
}

/// Produces one line of character speech.
///
/// Implementations never fail: transport or configuration problems are
/// reported as in-world fallback text.
pub trait DialogueGenerator: Send + Sync {
    fn generate(&self, request: &DialogueRequest) -> String;
}

/// Runs dialogue generation off the frame loop.
///
/// Every dispatch spawns a worker thread that sends its result back over a
/// channel; the loop drains finished responses with [`poll`](Self::poll)
/// once per frame and never blocks.
pub struct DialogueDispatcher {
    generator: Arc<dyn DialogueGenerator>,
    sender: Sender<DialogueResponse>,
    receiver: Receiver<DialogueResponse>,
    next_id: u64,
    in_flight: usize,
}

impl DialogueDispatcher {
    pub fn new(generator: Arc<dyn DialogueGenerator>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            generator,
            sender,
            receiver,
            next_id: 1,
            in_flight: 0,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn dispatch(&mut self, request: DialogueRequest) -> DialogueRequestId {
        let id = DialogueRequestId(self.next_id);
        self.next_id += 1;
        self.in_flight += 1;

        let generator = Arc::clone(&self.generator);
        let sender = self.sender.clone();
        info!(
            request_id = id.0,
            speaker = %request.character_name,
            history_turns = request.history.len(),
            "dialogue_dispatched"
        );
        thread::spawn(move || {
            let text = generator.generate(&request);
            let response = DialogueResponse {
                id,
                speaker: request.character_name,
                text,
            };
            // The receiver is gone only when the session was dropped.
            let _ = sender.send(response);
        });
        id
    }

    /// Drains every response that has arrived since the last call.
    pub fn poll(&mut self) -> Vec<DialogueResponse> {
        // `self.sender` keeps the channel open, so `try_recv` only ever
        // reports an empty queue once drained.
        let mut ready = Vec::new();
        while let Ok(response) = self.receiver.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            ready.push(response);
        }
        ready
    }
}

impl std::fmt::Debug for DialogueDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogueDispatcher")
            .field("next_id", &self.next_id)
            .field("in_flight", &self.in_flight)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    struct EchoGenerator;

    impl DialogueGenerator for EchoGenerator {
        fn generate(&self, request: &DialogueRequest) -> String {
            format!("{} heard {}", request.character_name, request.player_action)
        }
    }

    fn poll_until(dispatcher: &mut DialogueDispatcher, count: usize) -> Vec<DialogueResponse> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut responses = Vec::new();
        while responses.len() < count && Instant::now() < deadline {
            responses.extend(dispatcher.poll());
            thread::sleep(Duration::from_millis(2));
        }
        responses
    }

    #[test]
    fn recent_returns_last_turns_in_order() {
        let mut history = DialogueHistory::default();
        for index in 0..6 {
            history.push("Guard", format!("line {index}"));
        }
        let recent = history.recent(HISTORY_WINDOW);
        assert_eq!(recent.len(), 4);
        assert_eq!(recent[0].text, "line 2");
        assert_eq!(recent[3].text, "line 5");
    }

    #[test]
    fn recent_on_short_history_returns_everything() {
        let mut history = DialogueHistory::default();
        history.push("Elder Oric", "Welcome.");
        assert_eq!(history.recent(HISTORY_WINDOW).len(), 1);
        assert!(DialogueHistory::default().recent(HISTORY_WINDOW).is_empty());
    }

    #[test]
    fn request_uses_defaults_when_context_missing() {
        let history = DialogueHistory::default();
        let request = DialogueRequest::new("Guard", None, &history);
        assert_eq!(request.character_context, DEFAULT_CHARACTER_CONTEXT);
        assert_eq!(request.player_action, DEFAULT_PLAYER_ACTION);
        assert!(request.history.is_empty());
    }

    #[test]
    fn request_snapshots_history_window() {
        let mut history = DialogueHistory::default();
        for index in 0..5 {
            history.push("Guard", format!("line {index}"));
        }
        let request = DialogueRequest::new("Guard", Some("A guard."), &history);
        history.push("Guard", "after dispatch");
        assert_eq!(request.history.len(), HISTORY_WINDOW);
        assert_eq!(request.history[0].text, "line 1");
        assert_eq!(request.character_context, "A guard.");
    }

    #[test]
    fn dispatch_ids_are_monotonic() {
        let mut dispatcher = DialogueDispatcher::new(Arc::new(EchoGenerator));
        let history = DialogueHistory::default();
        let first = dispatcher.dispatch(DialogueRequest::new("A", None, &history));
        let second = dispatcher.dispatch(DialogueRequest::new("B", None, &history));
        assert!(second > first);
        poll_until(&mut dispatcher, 2);
    }

    #[test]
    fn responses_arrive_through_poll() {
        let mut dispatcher = DialogueDispatcher::new(Arc::new(EchoGenerator));
        let id = dispatcher.dispatch(DialogueRequest::new(
            "Elder Oric",
            None,
            &DialogueHistory::default(),
        ));
        let responses = poll_until(&mut dispatcher, 1);
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].id, id);
        assert_eq!(responses[0].speaker, "Elder Oric");
        assert_eq!(responses[0].text, "Elder Oric heard Hello!");
        assert_eq!(dispatcher.in_flight(), 0);
    }

    #[test]
    fn poll_without_requests_is_empty() {
        let mut dispatcher = DialogueDispatcher::new(Arc::new(EchoGenerator));
        assert!(dispatcher.poll().is_empty());
    }

    #[test]
    fn drained_channel_keeps_delivering_later_responses() {
        let mut dispatcher = DialogueDispatcher::new(Arc::new(EchoGenerator));
        let history = DialogueHistory::default();
        dispatcher.dispatch(DialogueRequest::new("Guard", None, &history));
        assert_eq!(poll_until(&mut dispatcher, 1).len(), 1);
        assert!(dispatcher.poll().is_empty());

        let id = dispatcher.dispatch(DialogueRequest::new("Old Chest", None, &history));
        let responses = poll_until(&mut dispatcher, 1);
        assert_eq!(responses.iter().map(|r| r.id).collect::<Vec<_>>(), vec![id]);
        assert_eq!(dispatcher.in_flight(), 0);
    }
}
