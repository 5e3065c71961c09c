use station_types::{BlockTarget, BoxId, MemberId, ScanOutcome, SessionId, TagId};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    TagObserved {
        tag: TagId,
        /// Member the tag was taken away from
        detached_from: Option<MemberId>,
    },
    TagAssigned {
        tag: TagId,
        member_id: MemberId,
        team: String,
    },
    SessionStarted {
        session_id: SessionId,
        debounce_window: u64,
        code_interval: u64,
    },
    SessionPaused {
        session_id: SessionId,
    },
    SessionReset {
        session_id: SessionId,
    },
    ScanEvaluated {
        tag: TagId,
        box_id: BoxId,
        member_id: Option<MemberId>,
        outcome: ScanOutcome,
    },
    CodeRevealed {
        member_id: MemberId,
        code_index: u32,
        digit: u8,
    },
    BlockActivated {
        target: BlockTarget,
    },
    BlockCleared {
        target: BlockTarget,
    },
    BlockExpired {
        target: BlockTarget,
    },
    BoxStatusChanged {
        box_id: BoxId,
        online: bool,
    },
}

/// Event handler trait for processing game events
pub trait GameEventHandler: Send {
    fn handle_event(&mut self, event: GameEvent);
}

/// Simple event bus for distributing game events
pub struct GameEventBus {
    handlers: Vec<Box<dyn GameEventHandler>>,
}

impl GameEventBus {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Box<dyn GameEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn publish(&mut self, event: GameEvent) {
        for handler in &mut self.handlers {
            handler.handle_event(event.clone());
        }
    }
}

impl Default for GameEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GameEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEventBus")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// Writes every event to the tracing log
pub struct TracingEventHandler;

impl GameEventHandler for TracingEventHandler {
    fn handle_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::ScanEvaluated {
                tag,
                box_id,
                outcome,
                ..
            } if outcome.is_accepted() => {
                info!("Scan of {} on box {} accepted: {:?}", tag, box_id, outcome);
            }
            GameEvent::ScanEvaluated {
                tag,
                box_id,
                outcome,
                ..
            } if outcome.is_error() => {
                warn!("Scan of {} on box {} failed: {:?}", tag, box_id, outcome);
            }
            GameEvent::ScanEvaluated {
                tag,
                box_id,
                outcome,
                ..
            } => {
                debug!("Scan of {} on box {} rejected: {:?}", tag, box_id, outcome);
            }
            GameEvent::BoxStatusChanged { box_id, online } => {
                info!("Box {} is now {}", box_id, if online { "online" } else { "offline" });
            }
            other => info!("{:?}", other),
        }
    }
}
