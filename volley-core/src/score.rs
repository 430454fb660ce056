//! Attempt markers and their point semantics.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The mark recorded in one attempt slot.
///
/// Serialized as its ordinal, so `-1` is an unrecorded slot and `0..=3`
/// are scored attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum ScoreValue {
    #[default]
    Empty,
    Error,
    Poor,
    Good,
    Excellent,
}

/// A scored value together with the label shown on its button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreOption {
    pub value: ScoreValue,
    pub label: &'static str,
}

/// The four values a user can record, lowest first.
pub const SCORE_OPTIONS: [ScoreOption; 4] = [
    ScoreOption {
        value: ScoreValue::Error,
        label: "Erro",
    },
    ScoreOption {
        value: ScoreValue::Poor,
        label: "Regular",
    },
    ScoreOption {
        value: ScoreValue::Good,
        label: "Bom",
    },
    ScoreOption {
        value: ScoreValue::Excellent,
        label: "Excelente",
    },
];

/// Highest point value of a single attempt.
pub const MAX_POINTS: u32 = 3;

impl ScoreValue {
    /// Stored ordinal, `-1` for an empty slot.
    pub fn ordinal(self) -> i8 {
        match self {
            Self::Empty => -1,
            Self::Error => 0,
            Self::Poor => 1,
            Self::Good => 2,
            Self::Excellent => 3,
        }
    }

    /// Points earned by the attempt, `None` for an unrecorded slot.
    pub fn points(self) -> Option<u32> {
        match self {
            Self::Empty => None,
            Self::Error => Some(0),
            Self::Poor => Some(1),
            Self::Good => Some(2),
            Self::Excellent => Some(3),
        }
    }

    /// Whether the slot is unrecorded.
    pub fn is_empty(self) -> bool {
        self == Self::Empty
    }

    /// `Good` and `Excellent` count as successes.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Good | Self::Excellent)
    }

    /// Whether this is a scored error (0).
    pub fn is_error(self) -> bool {
        self == Self::Error
    }

    /// Localized label, or `None` for an unrecorded slot.
    pub fn label(self) -> Option<&'static str> {
        SCORE_OPTIONS
            .iter()
            .find(|opt| opt.value == self)
            .map(|opt| opt.label)
    }
}

impl From<ScoreValue> for i8 {
    fn from(value: ScoreValue) -> Self {
        value.ordinal()
    }
}

/// An ordinal outside `-1..=3`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid score value `{0}`, expected one of -1, 0, 1, 2, 3")]
pub struct InvalidScore(pub String);

impl TryFrom<i8> for ScoreValue {
    type Error = InvalidScore;

    fn try_from(ordinal: i8) -> Result<Self, InvalidScore> {
        match ordinal {
            -1 => Ok(ScoreValue::Empty),
            0 => Ok(ScoreValue::Error),
            1 => Ok(ScoreValue::Poor),
            2 => Ok(ScoreValue::Good),
            3 => Ok(ScoreValue::Excellent),
            other => Err(InvalidScore(other.to_string())),
        }
    }
}

impl fmt::Display for ScoreValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "-"),
            other => write!(f, "{}", other.ordinal()),
        }
    }
}

impl FromStr for ScoreValue {
    type Err = InvalidScore;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if let Ok(ordinal) = s.parse::<i8>() {
            return Self::try_from(ordinal);
        }
        match s.as_str() {
            "x" | "-" | "empty" | "clear" | "limpar" => Ok(Self::Empty),
            "e" | "error" | "erro" => Ok(Self::Error),
            "p" | "poor" | "regular" => Ok(Self::Poor),
            "g" | "good" | "bom" => Ok(Self::Good),
            "ex" | "excellent" | "excelente" => Ok(Self::Excellent),
            _ => Err(InvalidScore(s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_match_point_values() {
        for opt in SCORE_OPTIONS {
            assert_eq!(opt.value.points(), Some(opt.value.ordinal() as u32));
        }
        assert_eq!(ScoreValue::Empty.points(), None);
        assert_eq!(ScoreValue::Empty.ordinal(), -1);
    }

    #[test]
    fn success_and_error_buckets() {
        assert!(ScoreValue::Excellent.is_success());
        assert!(ScoreValue::Good.is_success());
        assert!(!ScoreValue::Poor.is_success());
        assert!(!ScoreValue::Poor.is_error());
        assert!(ScoreValue::Error.is_error());
        assert!(!ScoreValue::Empty.is_success());
        assert!(!ScoreValue::Empty.is_error());
    }

    #[test]
    fn serializes_as_ordinal() {
        let json = serde_json::to_string(&[ScoreValue::Empty, ScoreValue::Excellent]).unwrap();
        assert_eq!(json, "[-1,3]");

        let parsed: Vec<ScoreValue> = serde_json::from_str("[0,1,2]").unwrap();
        assert_eq!(
            parsed,
            vec![ScoreValue::Error, ScoreValue::Poor, ScoreValue::Good]
        );
    }

    #[test]
    fn rejects_out_of_range_ordinal() {
        assert!(serde_json::from_str::<ScoreValue>("4").is_err());
        assert!(serde_json::from_str::<ScoreValue>("-2").is_err());
    }

    #[test]
    fn parses_names_labels_and_ordinals() {
        assert_eq!("3".parse::<ScoreValue>().unwrap(), ScoreValue::Excellent);
        assert_eq!("Bom".parse::<ScoreValue>().unwrap(), ScoreValue::Good);
        assert_eq!("poor".parse::<ScoreValue>().unwrap(), ScoreValue::Poor);
        assert_eq!("limpar".parse::<ScoreValue>().unwrap(), ScoreValue::Empty);
        assert!("great".parse::<ScoreValue>().is_err());
    }

    #[test]
    fn labels_come_from_score_options() {
        assert_eq!(ScoreValue::Error.label(), Some("Erro"));
        assert_eq!(ScoreValue::Empty.label(), None);
    }
}
