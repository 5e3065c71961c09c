use crate::errors::{EngineError, Result};
use station_types::{Millis, SessionState, Timestamp};
use uuid::Uuid;

/// Session clock: when the game started, whether it runs, and its two timing parameters
#[derive(Debug, Clone)]
pub struct GameSession {
    state: SessionState,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            state: SessionState {
                id: Uuid::new_v4(),
                started_at: None,
                is_running: false,
                debounce_window: None,
                code_interval: None,
            },
        }
    }

    /// Both durations must be present and non-zero, otherwise nothing changes
    pub fn start(
        &mut self,
        debounce_window: Option<Millis>,
        code_interval: Option<Millis>,
        now: Timestamp,
    ) -> Result<()> {
        let (Some(debounce), Some(interval)) = (
            debounce_window.filter(|d| *d > 0),
            code_interval.filter(|i| *i > 0),
        ) else {
            return Err(EngineError::InvalidSessionConfig);
        };

        self.state.started_at = Some(now);
        self.state.is_running = true;
        self.state.debounce_window = Some(debounce);
        self.state.code_interval = Some(interval);
        Ok(())
    }

    pub fn pause(&mut self) {
        self.state.is_running = false;
    }

    /// Fresh, stopped clock. Timing parameters are kept for the next start.
    pub fn reset(&mut self, now: Timestamp) {
        self.state.id = Uuid::new_v4();
        self.state.started_at = Some(now);
        self.state.is_running = false;
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn elapsed(&self, now: Timestamp) -> Millis {
        self.state
            .started_at
            .map(|start| now.saturating_sub(start))
            .unwrap_or(0)
    }

    pub fn debounce_window(&self) -> Millis {
        self.state.debounce_window.unwrap_or(0)
    }

    pub fn code_interval(&self) -> Millis {
        self.state.code_interval.unwrap_or(0)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }
}
