pub mod block_timer;
pub mod box_status;
pub mod clock;
pub mod config;
pub mod display;
pub mod display_command;
pub mod engine;
pub mod errors;
pub mod game_events;
pub mod game_state;
pub mod numerals;
pub mod protocol;
pub mod scoring;
pub mod session;
pub mod tag_directory;

// Re-export main components
pub use block_timer::*;
pub use box_status::*;
pub use clock::*;
pub use config::*;
pub use display::*;
pub use engine::*;
pub use errors::*;
pub use game_events::*;
pub use game_state::*;
pub use scoring::*;
pub use session::*;
pub use tag_directory::*;
