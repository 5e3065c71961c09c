use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Known display settings. Anything not configured falls back to `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum DisplayKey {
    Default,
    Mark,
    Block,
    BoxBlock,
    UserBlock,
    Digit(u8),
}

impl DisplayKey {
    pub fn is_digit(&self) -> bool {
        matches!(self, DisplayKey::Digit(_))
    }
}

impl fmt::Display for DisplayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayKey::Default => write!(f, "default"),
            DisplayKey::Mark => write!(f, "mark"),
            DisplayKey::Block => write!(f, "block"),
            DisplayKey::BoxBlock => write!(f, "boxBlock"),
            DisplayKey::UserBlock => write!(f, "userBlock"),
            DisplayKey::Digit(d) => write!(f, "{}", d),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDisplayKey(pub String);

impl fmt::Display for UnknownDisplayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown display key: {}", self.0)
    }
}

impl std::error::Error for UnknownDisplayKey {}

impl FromStr for DisplayKey {
    type Err = UnknownDisplayKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(DisplayKey::Default),
            "mark" => Ok(DisplayKey::Mark),
            "block" => Ok(DisplayKey::Block),
            "boxBlock" => Ok(DisplayKey::BoxBlock),
            "userBlock" => Ok(DisplayKey::UserBlock),
            digit => match digit.parse::<u8>() {
                Ok(d) if d <= 9 && digit.len() == 1 => Ok(DisplayKey::Digit(d)),
                _ => Err(UnknownDisplayKey(s.to_string())),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_key_names() {
        for key in [
            DisplayKey::Default,
            DisplayKey::Mark,
            DisplayKey::Block,
            DisplayKey::BoxBlock,
            DisplayKey::UserBlock,
            DisplayKey::Digit(0),
            DisplayKey::Digit(9),
        ] {
            assert_eq!(key.to_string().parse::<DisplayKey>(), Ok(key));
        }
    }

    #[test]
    fn test_display_key_rejects_unknown() {
        assert!("10".parse::<DisplayKey>().is_err());
        assert!("Mark".parse::<DisplayKey>().is_err());
        assert!("".parse::<DisplayKey>().is_err());
        assert!("+1".parse::<DisplayKey>().is_err());
    }
}
