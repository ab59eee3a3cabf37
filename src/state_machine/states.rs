use serde::{Deserialize, Serialize};
use std::fmt;

/// Participant standing derived from the consecutive-miss run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantState {
    /// No current miss run
    ActiveSafe,
    /// One consecutive miss
    Warned1,
    /// Two consecutive misses; next miss eliminates
    Warned2,
    /// Terminal; re-entry only via administrative reinstatement
    Eliminated,
}

impl ParticipantState {
    /// Map a consecutive-miss count onto a standing
    pub fn from_consecutive_miss(consecutive_miss: i32, threshold: i32) -> Self {
        if consecutive_miss >= threshold {
            Self::Eliminated
        } else {
            match consecutive_miss {
                0 => Self::ActiveSafe,
                1 => Self::Warned1,
                _ => Self::Warned2,
            }
        }
    }

    /// Terminal states admit no further nightly transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Eliminated)
    }

    /// Whether the participant is still being processed nightly
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Whether the standing warrants a warning notification on a miss
    pub fn is_warned(&self) -> bool {
        matches!(self, Self::Warned1 | Self::Warned2)
    }
}

impl fmt::Display for ParticipantState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ActiveSafe => write!(f, "active_safe"),
            Self::Warned1 => write!(f, "warned_1"),
            Self::Warned2 => write!(f, "warned_2"),
            Self::Eliminated => write!(f, "eliminated"),
        }
    }
}

impl std::str::FromStr for ParticipantState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active_safe" => Ok(Self::ActiveSafe),
            "warned_1" => Ok(Self::Warned1),
            "warned_2" => Ok(Self::Warned2),
            "eliminated" => Ok(Self::Eliminated),
            _ => Err(format!("Invalid participant state: {s}")),
        }
    }
}

impl Default for ParticipantState {
    fn default() -> Self {
        Self::ActiveSafe
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_consecutive_miss() {
        assert_eq!(
            ParticipantState::from_consecutive_miss(0, 3),
            ParticipantState::ActiveSafe
        );
        assert_eq!(
            ParticipantState::from_consecutive_miss(1, 3),
            ParticipantState::Warned1
        );
        assert_eq!(
            ParticipantState::from_consecutive_miss(2, 3),
            ParticipantState::Warned2
        );
        assert_eq!(
            ParticipantState::from_consecutive_miss(3, 3),
            ParticipantState::Eliminated
        );
        assert_eq!(
            ParticipantState::from_consecutive_miss(7, 3),
            ParticipantState::Eliminated
        );
    }

    #[test]
    fn test_terminal_check() {
        assert!(ParticipantState::Eliminated.is_terminal());
        assert!(!ParticipantState::ActiveSafe.is_terminal());
        assert!(!ParticipantState::Warned1.is_terminal());
        assert!(!ParticipantState::Warned2.is_terminal());
    }

    #[test]
    fn test_state_string_conversion() {
        assert_eq!(ParticipantState::Warned2.to_string(), "warned_2");
        assert_eq!(
            "eliminated".parse::<ParticipantState>().unwrap(),
            ParticipantState::Eliminated
        );
        assert!("survivor".parse::<ParticipantState>().is_err());
    }

    #[test]
    fn test_state_serde() {
        let json = serde_json::to_string(&ParticipantState::ActiveSafe).unwrap();
        assert_eq!(json, "\"active_safe\"");

        let parsed: ParticipantState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ParticipantState::ActiveSafe);
    }
}
