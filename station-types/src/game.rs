use crate::{BoxId, MemberId, Millis, SessionId, TagId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Tag {
    pub id: TagId,
    pub is_selected: bool,
    pub is_assigned: bool,
}

impl Tag {
    pub fn new(id: TagId) -> Self {
        Self {
            id,
            is_selected: false,
            is_assigned: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScanRecord {
    pub timestamp: Timestamp,
    pub box_id: BoxId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CodeRecord {
    pub timestamp: Timestamp,
    pub code_index: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    /// None once the tag has been re-enrolled or handed to someone else
    pub tag: Option<TagId>,
    pub score: u32,
    pub last_scan_at: HashMap<TagId, Timestamp>,
    pub scan_log: Vec<ScanRecord>,
    pub code_log: Vec<CodeRecord>,
}

impl Member {
    pub fn new(id: MemberId, name: String, tag: TagId) -> Self {
        Self {
            id,
            name,
            tag: Some(tag),
            score: 0,
            last_scan_at: HashMap::new(),
            scan_log: Vec::new(),
            code_log: Vec::new(),
        }
    }

    pub fn holds_tag(&self, tag: &str) -> bool {
        self.tag.as_deref() == Some(tag)
    }

    /// Highest code index revealed to this member so far
    pub fn last_code_index(&self) -> Option<u32> {
        self.code_log.iter().map(|c| c.code_index).max()
    }

    pub fn has_code(&self, code_index: u32) -> bool {
        self.code_log.iter().any(|c| c.code_index == code_index)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Team {
    pub name: String,
    pub members: Vec<Member>,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn total_score(&self) -> u32 {
        self.members.iter().map(|m| m.score).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TeamStanding {
    pub name: String,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionState {
    pub id: SessionId,
    pub started_at: Option<Timestamp>,
    pub is_running: bool,
    pub debounce_window: Option<Millis>,
    pub code_interval: Option<Millis>,
}

/// Block lifecycle shared by boxes and members.
///
/// While `is_blocked && !permanent`, both `block_start` and `block_duration`
/// are present. `remaining_time` is derived on every tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BlockState {
    pub is_blocked: bool,
    pub permanent: bool,
    pub block_start: Option<Timestamp>,
    pub block_duration: Option<Millis>,
    pub remaining_time: Option<Millis>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum BlockTarget {
    Box(BoxId),
    Member(MemberId),
}

impl fmt::Display for BlockTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockTarget::Box(id) => write!(f, "box {}", box_label(*id)),
            BlockTarget::Member(id) => write!(f, "member {}", id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BlockEntry {
    pub target: BlockTarget,
    pub state: BlockState,
}

/// Classification of one scan attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ScanOutcome {
    /// Accepted and a new code became visible to the member
    Code { index: u32, digit: u8 },
    /// Accepted, nothing new to reveal
    Mark,
    /// Same tag scanned again inside the debounce window
    Blocked,
    BoxBlocked,
    UserBlocked,
    GameNotRunning,
    MemberNotFound,
}

impl ScanOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ScanOutcome::Code { .. } | ScanOutcome::Mark)
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            ScanOutcome::GameNotRunning | ScanOutcome::MemberNotFound
        )
    }
}

/// Everything a dashboard needs to render the current game
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameSnapshot {
    pub session: SessionState,
    pub teams: Vec<Team>,
    pub standings: Vec<TeamStanding>,
    pub tags: Vec<Tag>,
    pub box_online: Vec<bool>,
    pub blocks: Vec<BlockEntry>,
}

/// Zero-padded station label used by dashboards ("01", "02", ...)
pub fn box_label(box_id: BoxId) -> String {
    format!("{:02}", box_id)
}
