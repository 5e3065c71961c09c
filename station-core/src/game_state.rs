use crate::block_timer::BlockTable;
use crate::clock::Clock;
use crate::config::{EngineConfig, ResetPolicy};
use crate::errors::{EngineError, Result};
use crate::{CodeSchedule, GameEvent, GameEventBus, GameSession, TagDirectory};
use station_types::{
    BlockEntry, BlockTarget, BoxId, CodeRecord, Member, MemberId, Millis, ScanOutcome,
    ScanRecord, Team, TeamStanding, Timestamp,
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Game session state machine: teams and members, tag ownership, the session
/// clock, block tables and scan evaluation.
pub struct Game {
    pub session: GameSession,
    pub teams: Vec<Team>,
    pub tags: TagDirectory,
    pub box_blocks: BlockTable<BoxId>,
    pub member_blocks: BlockTable<MemberId>,
    pub event_bus: GameEventBus,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
}

impl Game {
    pub fn new(config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        let teams = config.team_names.iter().map(Team::new).collect();

        Self {
            session: GameSession::new(),
            teams,
            tags: TagDirectory::new(),
            box_blocks: BlockTable::new(),
            member_blocks: BlockTable::new(),
            event_bus: GameEventBus::new(),
            config,
            clock,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    // Tag directory

    /// A tag was presented at the enrollment reader: take it away from its
    /// owner and make it the selected tag.
    pub fn observe_enrollment_scan(&mut self, tag: &str) {
        let detached_from = self.detach_tag(tag);
        self.tags.observe(tag);

        self.event_bus.publish(GameEvent::TagObserved {
            tag: tag.to_string(),
            detached_from,
        });
    }

    pub fn select_tag(&mut self, tag: &str) -> bool {
        self.tags.select(tag)
    }

    pub fn selected_tag(&self) -> Option<&str> {
        self.tags.currently_selected().map(String::as_str)
    }

    pub fn add_team(&mut self, name: &str) -> bool {
        if self.teams.iter().any(|t| t.name == name) {
            return false;
        }
        self.teams.push(Team::new(name));
        true
    }

    /// Give `tag` to a new member of `team_name` and move the enrollment
    /// selection on to the next unassigned tag.
    pub fn assign(&mut self, name: &str, team_name: &str, tag: &str) -> Result<MemberId> {
        let team_index = self
            .teams
            .iter()
            .position(|t| t.name == team_name)
            .ok_or_else(|| EngineError::TeamNotFound(team_name.to_string()))?;

        self.detach_tag(tag);

        let member_id = Uuid::new_v4();
        self.teams[team_index].members.push(Member::new(
            member_id,
            name.to_string(),
            tag.to_string(),
        ));
        let next = self.tags.mark_assigned(tag);

        info!(
            "Assigned tag {} to {} in {} (next tag: {:?})",
            tag, name, team_name, next
        );
        self.event_bus.publish(GameEvent::TagAssigned {
            tag: tag.to_string(),
            member_id,
            team: team_name.to_string(),
        });

        Ok(member_id)
    }

    /// Clear the tag from whichever member holds it
    fn detach_tag(&mut self, tag: &str) -> Option<MemberId> {
        let member = self
            .teams
            .iter_mut()
            .flat_map(|t| t.members.iter_mut())
            .find(|m| m.holds_tag(tag))?;

        member.tag = None;
        self.tags.mark_unassigned(tag);
        Some(member.id)
    }

    // Session

    pub fn start(
        &mut self,
        debounce_window: Option<Millis>,
        code_interval: Option<Millis>,
    ) -> Result<()> {
        let now = self.now();
        self.session.start(debounce_window, code_interval, now)?;

        let state = self.session.state();
        info!("Session {} started at {}", state.id, now);
        self.event_bus.publish(GameEvent::SessionStarted {
            session_id: state.id,
            debounce_window: self.session.debounce_window(),
            code_interval: self.session.code_interval(),
        });
        Ok(())
    }

    pub fn pause(&mut self) {
        self.session.pause();
        self.event_bus.publish(GameEvent::SessionPaused {
            session_id: self.session.state().id,
        });
    }

    pub fn reset(&mut self) {
        let now = self.now();
        self.session.reset(now);

        if self.config.reset_policy == ResetPolicy::FullGame {
            for member in self.teams.iter_mut().flat_map(|t| t.members.iter_mut()) {
                member.score = 0;
                member.last_scan_at.clear();
                member.scan_log.clear();
                member.code_log.clear();
            }
            self.box_blocks.clear();
            self.member_blocks.clear();
        }

        info!(
            "Session reset ({}), new session {}",
            self.config.reset_policy,
            self.session.state().id
        );
        self.event_bus.publish(GameEvent::SessionReset {
            session_id: self.session.state().id,
        });
    }

    // Scoring

    /// Classify one touch of `tag` on `box_id` and apply its effects
    pub fn evaluate_scan(&mut self, tag: &str, box_id: BoxId) -> ScanOutcome {
        let now = self.now();
        let (member_id, outcome) = self.classify_scan(tag, box_id, now);

        self.event_bus.publish(GameEvent::ScanEvaluated {
            tag: tag.to_string(),
            box_id,
            member_id,
            outcome,
        });
        if let (Some(member_id), ScanOutcome::Code { index, digit }) = (member_id, outcome) {
            self.event_bus.publish(GameEvent::CodeRevealed {
                member_id,
                code_index: index,
                digit,
            });
        }

        outcome
    }

    fn classify_scan(
        &mut self,
        tag: &str,
        box_id: BoxId,
        now: Timestamp,
    ) -> (Option<MemberId>, ScanOutcome) {
        if !self.session.is_running() {
            return (None, ScanOutcome::GameNotRunning);
        }

        let Some(member) = self
            .teams
            .iter_mut()
            .flat_map(|t| t.members.iter_mut())
            .find(|m| m.holds_tag(tag))
        else {
            return (None, ScanOutcome::MemberNotFound);
        };

        // Every attempt by a known member is logged, accepted or not
        member.scan_log.push(ScanRecord {
            timestamp: now,
            box_id,
        });

        if self.box_blocks.is_blocked(&box_id) {
            return (Some(member.id), ScanOutcome::BoxBlocked);
        }

        if self.member_blocks.is_blocked(&member.id) {
            return (Some(member.id), ScanOutcome::UserBlocked);
        }

        let debounce = self.session.debounce_window();
        if let Some(last) = member.last_scan_at.get(tag) {
            if now.saturating_sub(*last) < debounce {
                return (Some(member.id), ScanOutcome::Blocked);
            }
        }

        member.score += 1;
        member.last_scan_at.insert(tag.to_string(), now);

        let elapsed = self.session.elapsed(now);
        let outcome = match CodeSchedule::next_code(elapsed, self.session.code_interval(), member) {
            Some(index) => {
                member.code_log.push(CodeRecord {
                    timestamp: now,
                    code_index: index,
                });
                ScanOutcome::Code {
                    index,
                    digit: self.config.code_digit(index),
                }
            }
            None => ScanOutcome::Mark,
        };

        (Some(member.id), outcome)
    }

    // Blocks

    pub fn stage_box_block(
        &mut self,
        box_id: BoxId,
        duration_seconds: Option<u64>,
        permanent: bool,
    ) {
        let now = self.now();
        self.box_blocks.set_pending(box_id, duration_seconds, permanent, now);
    }

    pub fn activate_box_block(&mut self, box_id: BoxId) -> Result<()> {
        let now = self.now();
        self.activate(BlockTarget::Box(box_id), now)
    }

    pub fn deactivate_box_block(&mut self, box_id: BoxId) -> bool {
        self.deactivate(BlockTarget::Box(box_id))
    }

    pub fn stage_member_block(
        &mut self,
        member_id: MemberId,
        duration_seconds: Option<u64>,
        permanent: bool,
    ) -> Result<()> {
        self.require_member(member_id)?;
        let now = self.now();
        self.member_blocks
            .set_pending(member_id, duration_seconds, permanent, now);
        Ok(())
    }

    pub fn activate_member_block(&mut self, member_id: MemberId) -> Result<()> {
        self.require_member(member_id)?;
        let now = self.now();
        self.activate(BlockTarget::Member(member_id), now)
    }

    pub fn deactivate_member_block(&mut self, member_id: MemberId) -> Result<bool> {
        self.require_member(member_id)?;
        Ok(self.deactivate(BlockTarget::Member(member_id)))
    }

    fn activate(&mut self, target: BlockTarget, now: Timestamp) -> Result<()> {
        let activated = match target {
            BlockTarget::Box(id) => self.box_blocks.activate(&id, now),
            BlockTarget::Member(id) => self.member_blocks.activate(&id, now),
        };

        if activated.is_err() {
            warn!("Block for {} has no duration and is not permanent", target);
            return Err(EngineError::BlockNotConfigured(target));
        }

        self.event_bus.publish(GameEvent::BlockActivated { target });
        Ok(())
    }

    fn deactivate(&mut self, target: BlockTarget) -> bool {
        let was_blocked = match target {
            BlockTarget::Box(id) => self.box_blocks.deactivate(&id),
            BlockTarget::Member(id) => self.member_blocks.deactivate(&id),
        };

        if was_blocked {
            info!("Block on {} cleared", target);
            self.event_bus.publish(GameEvent::BlockCleared { target });
        }
        was_blocked
    }

    /// Expire finished timed blocks. Runs on every tick, scans or not.
    pub fn tick(&mut self) -> Vec<BlockTarget> {
        let now = self.now();

        let expired: Vec<BlockTarget> = self
            .box_blocks
            .tick(now)
            .into_iter()
            .map(BlockTarget::Box)
            .chain(
                self.member_blocks
                    .tick(now)
                    .into_iter()
                    .map(BlockTarget::Member),
            )
            .collect();

        for target in &expired {
            info!("Block on {} expired", target);
            self.event_bus
                .publish(GameEvent::BlockExpired { target: *target });
        }
        expired
    }

    pub fn active_blocks(&self) -> Vec<BlockEntry> {
        let boxes = self.box_blocks.active().map(|(id, state)| BlockEntry {
            target: BlockTarget::Box(*id),
            state: state.clone(),
        });
        let members = self.member_blocks.active().map(|(id, state)| BlockEntry {
            target: BlockTarget::Member(*id),
            state: state.clone(),
        });
        boxes.chain(members).collect()
    }

    // Lookups

    pub fn member(&self, member_id: MemberId) -> Option<&Member> {
        self.members().find(|m| m.id == member_id)
    }

    pub fn member_by_tag(&self, tag: &str) -> Option<&Member> {
        self.members().find(|m| m.holds_tag(tag))
    }

    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.teams.iter().flat_map(|t| t.members.iter())
    }

    pub fn team(&self, name: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.name == name)
    }

    pub fn team_score(&self, name: &str) -> Option<u32> {
        self.team(name).map(Team::total_score)
    }

    pub fn standings(&self) -> Vec<TeamStanding> {
        self.teams
            .iter()
            .map(|t| TeamStanding {
                name: t.name.clone(),
                score: t.total_score(),
            })
            .collect()
    }

    fn require_member(&self, member_id: MemberId) -> Result<()> {
        self.member(member_id)
            .map(|_| ())
            .ok_or(EngineError::MemberNotFound(member_id))
    }
}
