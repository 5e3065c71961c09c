use crate::{BoxId, Rgb, TagId};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A decoded inbound line from the controller link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum LinkMessage {
    /// `#R:` a tag presented at the enrollment reader
    Enrollment { tag: TagId },
    /// `#T:` a tag touched on a station
    Scan { box_id: BoxId, tag: TagId },
    /// `#STATUS:` health report from a station node
    Status { box_id: BoxId, online: bool },
}

/// An outbound display instruction for one station
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DisplayCommand {
    pub box_id: BoxId,
    pub style: u8,
    pub color: Rgb,
    pub rows: [u8; 8],
}
