use crate::box_status::BoxStatus;
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::display::{BitGrid, DisplaySetting, DisplaySettingTable};
use crate::display_command::encode;
use crate::errors::Result;
use crate::protocol::{StatusLiterals, parse_line};
use crate::{Game, GameEvent, GameEventHandler};
use station_types::{
    BlockTarget, BoxId, DisplayKey, GameSnapshot, LinkMessage, MemberId, Millis, Rgb,
    ScanOutcome,
};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};

/// Raw inbound lines kept for the dashboard
pub const RECENT_LINE_CAPACITY: usize = 20;

/// The single owner of all game state. Inbound lines and ticks both go
/// through `&mut self`, so whoever holds the engine serializes them.
pub struct Engine {
    game: Game,
    box_status: BoxStatus,
    display: DisplaySettingTable,
    recent_lines: VecDeque<String>,
}

impl Engine {
    pub fn new(config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        let box_status = BoxStatus::new(config.box_count);
        Self {
            game: Game::new(config, clock),
            box_status,
            display: DisplaySettingTable::new(),
            recent_lines: VecDeque::with_capacity(RECENT_LINE_CAPACITY),
        }
    }

    pub fn with_system_clock(config: EngineConfig) -> Self {
        Self::new(config, Arc::new(SystemClock))
    }

    pub fn add_event_handler(&mut self, handler: Box<dyn GameEventHandler>) {
        self.game.event_bus.add_handler(handler);
    }

    /// Handle one decoded link line and return the lines to send back.
    /// Malformed lines are logged and dropped without touching state.
    pub fn dispatch(&mut self, line: &str) -> Vec<String> {
        self.remember(line);

        let config = self.game.config();
        let literals = StatusLiterals {
            source: &config.status_source,
            ok: &config.status_ok,
        };

        match parse_line(line, literals) {
            Ok(Some(message)) => self.handle_message(message),
            Ok(None) => {
                debug!("Ignoring line {:?}", line.trim());
                Vec::new()
            }
            Err(e) => {
                warn!("Dropping malformed line {:?}: {}", line.trim(), e);
                Vec::new()
            }
        }
    }

    pub fn handle_message(&mut self, message: LinkMessage) -> Vec<String> {
        match message {
            LinkMessage::Enrollment { tag } => {
                self.game.observe_enrollment_scan(&tag);
                Vec::new()
            }
            LinkMessage::Scan { box_id, tag } => {
                let outcome = self.game.evaluate_scan(&tag, box_id);
                self.scan_feedback(box_id, outcome).into_iter().collect()
            }
            LinkMessage::Status { box_id, online } => {
                match self.box_status.set_online(box_id, online) {
                    Some(true) => self
                        .game
                        .event_bus
                        .publish(GameEvent::BoxStatusChanged { box_id, online }),
                    Some(false) => {}
                    None => warn!(
                        "Health report for box {} outside 1..={}",
                        box_id,
                        self.box_status.len()
                    ),
                }
                Vec::new()
            }
        }
    }

    /// Periodic sweep, independent of link traffic
    pub fn tick(&mut self) -> Vec<BlockTarget> {
        self.game.tick()
    }

    /// Setting shown for a scan outcome; `None` means the station gets nothing
    pub fn outcome_display(&self, outcome: ScanOutcome) -> Option<&DisplaySetting> {
        let config = self.game.config();
        let key = match outcome {
            ScanOutcome::Code { digit, .. } => return Some(self.display.numeral(digit)),
            ScanOutcome::Mark => DisplayKey::Mark,
            ScanOutcome::BoxBlocked => DisplayKey::BoxBlock,
            ScanOutcome::UserBlocked => DisplayKey::UserBlock,
            ScanOutcome::Blocked => config.debounce_display?,
            ScanOutcome::GameNotRunning | ScanOutcome::MemberNotFound => {
                config.rejection_display?
            }
        };
        Some(self.display.get(key))
    }

    fn scan_feedback(&self, box_id: BoxId, outcome: ScanOutcome) -> Option<String> {
        let setting = self.outcome_display(outcome)?;
        Some(encode(box_id, setting, self.game.config().mark_style))
    }

    fn remember(&mut self, line: &str) {
        if self.recent_lines.len() == RECENT_LINE_CAPACITY {
            self.recent_lines.pop_front();
        }
        self.recent_lines.push_back(line.trim_end().to_string());
    }

    // Operator commands

    pub fn observe_enrollment_scan(&mut self, tag: &str) {
        self.game.observe_enrollment_scan(tag);
    }

    pub fn evaluate_scan(&mut self, tag: &str, box_id: BoxId) -> ScanOutcome {
        self.game.evaluate_scan(tag, box_id)
    }

    pub fn select_tag(&mut self, tag: &str) -> bool {
        self.game.select_tag(tag)
    }

    pub fn add_team(&mut self, name: &str) -> bool {
        self.game.add_team(name)
    }

    pub fn assign(&mut self, name: &str, team: &str, tag: &str) -> Result<MemberId> {
        self.game.assign(name, team, tag)
    }

    pub fn start(
        &mut self,
        debounce_window: Option<Millis>,
        code_interval: Option<Millis>,
    ) -> Result<()> {
        self.game.start(debounce_window, code_interval)
    }

    pub fn pause(&mut self) {
        self.game.pause();
    }

    pub fn reset(&mut self) {
        self.game.reset();
    }

    pub fn stage_box_block(
        &mut self,
        box_id: BoxId,
        duration_seconds: Option<u64>,
        permanent: bool,
    ) {
        self.game.stage_box_block(box_id, duration_seconds, permanent);
    }

    /// Activate a staged box block and return the persistent block visual for that box
    pub fn activate_box_block(&mut self, box_id: BoxId) -> Result<String> {
        self.game.activate_box_block(box_id)?;
        Ok(encode(
            box_id,
            self.display.get(DisplayKey::Block),
            self.game.config().block_style,
        ))
    }

    pub fn deactivate_box_block(&mut self, box_id: BoxId) -> bool {
        self.game.deactivate_box_block(box_id)
    }

    pub fn stage_member_block(
        &mut self,
        member_id: MemberId,
        duration_seconds: Option<u64>,
        permanent: bool,
    ) -> Result<()> {
        self.game
            .stage_member_block(member_id, duration_seconds, permanent)
    }

    pub fn activate_member_block(&mut self, member_id: MemberId) -> Result<()> {
        self.game.activate_member_block(member_id)
    }

    pub fn deactivate_member_block(&mut self, member_id: MemberId) -> Result<bool> {
        self.game.deactivate_member_block(member_id)
    }

    pub fn set_display_color(&mut self, key: DisplayKey, color: Rgb) {
        self.display.set_color(key, color);
    }

    pub fn set_display_grid(&mut self, key: DisplayKey, grid: BitGrid) -> Result<()> {
        self.display.set_grid(key, grid)
    }

    pub fn toggle_display_cell(&mut self, key: DisplayKey, row: usize, col: usize) -> Result<()> {
        self.display.toggle_cell(key, row, col)
    }

    // Queries

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn display(&self) -> &DisplaySettingTable {
        &self.display
    }

    pub fn box_online(&self, box_id: BoxId) -> bool {
        self.box_status.is_online(box_id)
    }

    pub fn box_status(&self) -> &BoxStatus {
        &self.box_status
    }

    pub fn recent_lines(&self) -> Vec<String> {
        self.recent_lines.iter().cloned().collect()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            session: self.game.session.state().clone(),
            teams: self.game.teams.clone(),
            standings: self.game.standings(),
            tags: self.game.tags.tags().to_vec(),
            box_online: self.box_status.to_vec(),
            blocks: self.game.active_blocks(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::errors::EngineError;

    fn create_test_engine(config: EngineConfig) -> (Engine, ManualClock) {
        let clock = ManualClock::new(1_000_000);
        (Engine::new(config, Arc::new(clock.clone())), clock)
    }

    #[test]
    fn test_dispatch_enrollment_selects_tag() {
        let (mut engine, _) = create_test_engine(EngineConfig::default());
        let out = engine.dispatch("#R:0,0,0,0,0,0,0,0,0,0,0,0,161\n");

        assert!(out.is_empty());
        assert_eq!(engine.game().selected_tag(), Some("00000000000000a1"));
    }

    #[test]
    fn test_dispatch_scan_emits_numeral() {
        let (mut engine, _) = create_test_engine(EngineConfig::default());
        engine.assign("Ada", "Team 1", "0102030405060708").unwrap();
        engine.start(Some(60_000), Some(300_000)).unwrap();

        let out = engine.dispatch("#T:3,0,0,0,0,1,2,3,4,5,6,7,8");
        assert_eq!(out, vec!["#BLOCK:3,5,200,150,35,60,102,110,118,102,102,60,0\n".to_string()]);
    }

    #[test]
    fn test_silent_outcomes_by_default() {
        let (mut engine, _) = create_test_engine(EngineConfig::default());
        // Not running
        assert!(engine.dispatch("#T:3,0,0,0,0,1,2,3,4,5,6,7,8").is_empty());

        engine.start(Some(60_000), Some(300_000)).unwrap();
        // Nobody owns the tag
        assert!(engine.dispatch("#T:3,0,0,0,0,1,2,3,4,5,6,7,8").is_empty());

        engine.assign("Ada", "Team 1", "0102030405060708").unwrap();
        assert_eq!(engine.dispatch("#T:3,0,0,0,0,1,2,3,4,5,6,7,8").len(), 1);
        // Debounced
        assert!(engine.dispatch("#T:3,0,0,0,0,1,2,3,4,5,6,7,8").is_empty());
    }

    #[test]
    fn test_configured_feedback_for_rejections() {
        let config = EngineConfig {
            debounce_display: Some(DisplayKey::Block),
            rejection_display: Some(DisplayKey::UserBlock),
            ..EngineConfig::default()
        };
        let (mut engine, _) = create_test_engine(config);

        assert!(engine.outcome_display(ScanOutcome::GameNotRunning).is_some());
        assert!(engine.outcome_display(ScanOutcome::MemberNotFound).is_some());
        assert!(engine.outcome_display(ScanOutcome::Blocked).is_some());

        engine.set_display_color(DisplayKey::Block, Rgb::new(1, 1, 1));
        assert_eq!(
            engine.outcome_display(ScanOutcome::Blocked).unwrap().color(),
            Rgb::new(1, 1, 1)
        );
    }

    #[test]
    fn test_outcome_display_keys() {
        let (mut engine, _) = create_test_engine(EngineConfig::default());
        engine.set_display_color(DisplayKey::Mark, Rgb::new(0, 255, 0));
        engine.set_display_color(DisplayKey::BoxBlock, Rgb::new(255, 0, 0));
        engine.set_display_color(DisplayKey::UserBlock, Rgb::new(0, 0, 255));

        let color = |engine: &Engine, outcome| engine.outcome_display(outcome).unwrap().color();
        assert_eq!(color(&engine, ScanOutcome::Mark), Rgb::new(0, 255, 0));
        assert_eq!(color(&engine, ScanOutcome::BoxBlocked), Rgb::new(255, 0, 0));
        assert_eq!(color(&engine, ScanOutcome::UserBlocked), Rgb::new(0, 0, 255));
        assert!(engine.outcome_display(ScanOutcome::Blocked).is_none());
        assert!(engine.outcome_display(ScanOutcome::GameNotRunning).is_none());
    }

    #[test]
    fn test_status_updates_box_online() {
        let (mut engine, _) = create_test_engine(EngineConfig::default());
        engine.dispatch("#STATUS:sendHealthCheck:NODE_OK:x:12");
        assert!(engine.box_online(12));

        engine.dispatch("#STATUS:sendHealthCheck:DOWN:x:12");
        assert!(!engine.box_online(12));

        // Outside the grid, dropped
        engine.dispatch("#STATUS:sendHealthCheck:NODE_OK:x:51");
        assert_eq!(engine.box_status().online_count(), 0);
    }

    #[test]
    fn test_malformed_lines_leave_state_untouched() {
        let (mut engine, _) = create_test_engine(EngineConfig::default());
        for line in [
            "#R:0,0,0,0,0,1,2",
            "#R:1,0,0,0,0,1,2,3,4,5,6,7,8",
            "#T:x,0,0,0,0,1,2,3,4,5,6,7,8",
            "#STATUS:nope",
            "#T",
            "garbage",
        ] {
            assert!(engine.dispatch(line).is_empty());
        }
        assert!(engine.game().tags.is_empty());
        assert_eq!(engine.recent_lines().len(), 6);
    }

    #[test]
    fn test_recent_lines_are_bounded() {
        let (mut engine, _) = create_test_engine(EngineConfig::default());
        for i in 0..25 {
            engine.dispatch(&format!("line {}\n", i));
        }
        let lines = engine.recent_lines();
        assert_eq!(lines.len(), RECENT_LINE_CAPACITY);
        assert_eq!(lines.first().map(String::as_str), Some("line 5"));
        assert_eq!(lines.last().map(String::as_str), Some("line 24"));
    }

    #[test]
    fn test_box_block_activation_sends_block_visual() {
        let (mut engine, _) = create_test_engine(EngineConfig::default());
        engine.set_display_color(DisplayKey::Block, Rgb::new(9, 8, 7));

        assert_eq!(
            engine.activate_box_block(4),
            Err(EngineError::BlockNotConfigured(BlockTarget::Box(4)))
        );

        engine.stage_box_block(4, Some(60), false);
        let line = engine.activate_box_block(4).unwrap();
        assert!(line.starts_with("#BLOCK:4,3,9,8,7,"));
        assert!(engine.game().box_blocks.is_blocked(&4));
    }

    #[test]
    fn test_snapshot() {
        let (mut engine, _) = create_test_engine(EngineConfig::default());
        engine.dispatch("#R:0,0,0,0,0,1,2,3,4,5,6,7,8");
        engine.assign("Ada", "Team 2", "0102030405060708").unwrap();
        engine.dispatch("#STATUS:sendHealthCheck:NODE_OK:x:1");

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.tags.len(), 1);
        assert!(snapshot.tags[0].is_assigned);
        assert_eq!(snapshot.teams[1].members.len(), 1);
        assert_eq!(snapshot.box_online.len(), 50);
        assert!(snapshot.box_online[0]);
        assert!(snapshot.blocks.is_empty());
        assert!(!snapshot.session.is_running);
    }
}
