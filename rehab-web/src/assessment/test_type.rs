//! Standardized movement tests

use serde::{Deserialize, Serialize};

/// Test labels (order matches the JS test selector)
pub const MOVEMENT_TESTS: [&str; 3] = [
    "standing_hip_flexion",
    "rock_back",
    "seated_knee_extension",
];

/// Movement test being performed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementTest {
    /// Standing, one knee raised toward the chest
    #[default]
    StandingHipFlexion,
    /// Quadruped, hips rocked back toward the heels
    RockBack,
    /// Seated, lower leg extended at the knee
    SeatedKneeExtension,
}

impl MovementTest {
    pub fn from_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(MovementTest::StandingHipFlexion),
            1 => Some(MovementTest::RockBack),
            2 => Some(MovementTest::SeatedKneeExtension),
            _ => None,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            MovementTest::StandingHipFlexion => 0,
            MovementTest::RockBack => 1,
            MovementTest::SeatedKneeExtension => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        MOVEMENT_TESTS[self.index()]
    }

    /// Whether the knee angle is the primary measurement
    pub fn measures_knee(&self) -> bool {
        matches!(self, MovementTest::SeatedKneeExtension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        for (i, name) in MOVEMENT_TESTS.iter().enumerate() {
            let test = MovementTest::from_index(i).unwrap();
            assert_eq!(test.index(), i);
            assert_eq!(test.as_str(), *name);
        }
        assert_eq!(MovementTest::from_index(3), None);
    }

    #[test]
    fn test_serde_names_match_labels() {
        let json = serde_json::to_string(&MovementTest::RockBack).unwrap();
        assert_eq!(json, "\"rock_back\"");
    }
}
