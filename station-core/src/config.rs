use serde::{Deserialize, Serialize};
use station_types::DisplayKey;
use std::fmt;
use std::str::FromStr;

/// What `reset()` wipes besides the session clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPolicy {
    /// Only the clock and running flag; scores, logs and blocks survive
    #[default]
    ClockOnly,
    /// Clock plus member scores, scan/code logs and every block
    FullGame,
}

impl FromStr for ResetPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "clock_only" | "clock" => Ok(ResetPolicy::ClockOnly),
            "full_game" | "full" => Ok(ResetPolicy::FullGame),
            other => Err(format!("Invalid reset policy: {}", other)),
        }
    }
}

impl fmt::Display for ResetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResetPolicy::ClockOnly => write!(f, "clock_only"),
            ResetPolicy::FullGame => write!(f, "full_game"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of stations tracked by the health grid
    pub box_count: usize,
    pub team_names: Vec<String>,
    /// Field 0 of a `#STATUS:` payload
    pub status_source: String,
    /// Field 1 value meaning the node is online
    pub status_ok: String,
    /// Secret code shown one digit per revealed code index
    pub code_digits: Vec<u8>,
    pub reset_policy: ResetPolicy,
    /// Shown on a debounced scan; `None` keeps the station silent
    pub debounce_display: Option<DisplayKey>,
    /// Shown when the game is not running or the tag has no owner; `None` keeps the station silent
    pub rejection_display: Option<DisplayKey>,
    /// Style code for short feedback after a scan
    pub mark_style: u8,
    /// Style code for the persistent block visual
    pub block_style: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            box_count: 50,
            team_names: vec!["Team 1".to_string(), "Team 2".to_string()],
            status_source: "sendHealthCheck".to_string(),
            status_ok: "NODE_OK".to_string(),
            code_digits: Vec::new(),
            reset_policy: ResetPolicy::ClockOnly,
            debounce_display: None,
            rejection_display: None,
            mark_style: 5,
            block_style: 3,
        }
    }
}

impl EngineConfig {
    /// Digit shown for a code index
    pub fn code_digit(&self, code_index: u32) -> u8 {
        if self.code_digits.is_empty() {
            (code_index % 10) as u8
        } else {
            self.code_digits[code_index as usize % self.code_digits.len()]
        }
    }
}

/// Parse an operator-entered code such as "40213" into digits, keeping at most eight
pub fn parse_code_digits(code: &str) -> Vec<u8> {
    code.chars()
        .filter_map(|c| c.to_digit(10))
        .map(|d| d as u8)
        .take(8)
        .collect()
}
