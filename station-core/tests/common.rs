#![allow(dead_code)]

use station_core::{Engine, EngineConfig, Game, GameEvent, GameEventHandler, ManualClock};
use station_types::{MemberId, Timestamp};
use std::sync::{Arc, Mutex};

pub const T0: Timestamp = 1_700_000_000_000;
pub const DEBOUNCE_MS: u64 = 60_000;
pub const CODE_INTERVAL_MS: u64 = 300_000;

/// Creates a game on a manual clock starting at `T0`
pub fn create_test_game() -> (Game, ManualClock) {
    create_test_game_with_config(EngineConfig::default())
}

pub fn create_test_game_with_config(config: EngineConfig) -> (Game, ManualClock) {
    let clock = ManualClock::new(T0);
    (Game::new(config, Arc::new(clock.clone())), clock)
}

/// Creates a running game with one member holding tag "a1" in "Team 1"
pub fn create_running_game() -> (Game, ManualClock, MemberId) {
    let (mut game, clock) = create_test_game();
    let member_id = game.assign("Ada", "Team 1", "a1").unwrap();
    game.start(Some(DEBOUNCE_MS), Some(CODE_INTERVAL_MS)).unwrap();
    (game, clock, member_id)
}

pub fn create_test_engine() -> (Engine, ManualClock) {
    let clock = ManualClock::new(T0);
    (
        Engine::new(EngineConfig::default(), Arc::new(clock.clone())),
        clock,
    )
}

/// Builds a `#T:` line for the given box and tag bytes
pub fn scan_line(box_id: u32, bytes: [u8; 8]) -> String {
    let tag: Vec<String> = bytes.iter().map(|b| b.to_string()).collect();
    format!("#T:{},0,0,0,0,{}\n", box_id, tag.join(","))
}

/// Builds a `#R:` line for the given tag bytes
pub fn enrollment_line(bytes: [u8; 8]) -> String {
    let tag: Vec<String> = bytes.iter().map(|b| b.to_string()).collect();
    format!("#R:0,0,0,0,0,{}\n", tag.join(","))
}

pub fn tag_hex(bytes: [u8; 8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Event collector for testing event emissions
#[derive(Clone, Default)]
pub struct EventCollector {
    events: Arc<Mutex<Vec<GameEvent>>>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_events(&self) -> Vec<GameEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn has_event_type(&self, check_fn: impl Fn(&GameEvent) -> bool) -> bool {
        self.events.lock().unwrap().iter().any(check_fn)
    }
}

impl GameEventHandler for EventCollector {
    fn handle_event(&mut self, event: GameEvent) {
        self.events.lock().unwrap().push(event);
    }
}
