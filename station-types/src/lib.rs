pub mod display;
pub mod game;
pub mod messages;

// Re-export all types
pub use display::*;
pub use game::*;
pub use messages::*;

use uuid::Uuid;

/// Tag identifiers are the lowercase hex string decoded from the reader bytes
pub type TagId = String;
/// Stations are numbered from 1
pub type BoxId = u32;
pub type MemberId = Uuid;
pub type SessionId = Uuid;
/// Milliseconds since the Unix epoch
pub type Timestamp = u64;
/// Durations are carried as milliseconds
pub type Millis = u64;
