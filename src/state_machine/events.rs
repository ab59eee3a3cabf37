use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::Participant;

/// One day's outcome for one participant, as determined by the solved set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayEvent {
    /// Handle was present in the day's solved set. Presence is
    /// authoritative: a reported score of 0 is still a solve.
    Solved { score: i32 },
    /// Handle was absent from the solved set
    Missed,
}

impl DayEvent {
    /// Classify a participant against the day's solved map
    /// (lowercased handle → score)
    pub fn for_participant(participant: &Participant, solved_map: &HashMap<String, i32>) -> Self {
        match solved_map.get(&participant.lookup_handle()) {
            Some(score) => Self::Solved { score: *score },
            None => Self::Missed,
        }
    }

    pub fn is_solve(&self) -> bool {
        matches!(self, Self::Solved { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant_with_handle(handle: &str) -> Participant {
        Participant {
            participant_id: 1,
            handle: handle.to_string(),
            display_name: "Test".to_string(),
            email: None,
            status: "active".to_string(),
            strike_count: 0,
            consecutive_miss: 0,
            total_score: 0,
            joined_day: None,
            eliminated_on: None,
            created_at: chrono::Utc::now().naive_utc(),
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_case_insensitive_solved_lookup() {
        let mut solved = HashMap::new();
        solved.insert("coderunner".to_string(), 80);

        let participant = participant_with_handle("CodeRunner");
        assert_eq!(
            DayEvent::for_participant(&participant, &solved),
            DayEvent::Solved { score: 80 }
        );
    }

    #[test]
    fn test_zero_score_still_counts_as_solved() {
        let mut solved = HashMap::new();
        solved.insert("edge".to_string(), 0);

        let participant = participant_with_handle("edge");
        let event = DayEvent::for_participant(&participant, &solved);
        assert!(event.is_solve());
        assert_eq!(event, DayEvent::Solved { score: 0 });
    }

    #[test]
    fn test_absent_handle_is_a_miss() {
        let solved = HashMap::new();
        let participant = participant_with_handle("ghost");
        assert_eq!(
            DayEvent::for_participant(&participant, &solved),
            DayEvent::Missed
        );
    }
}
