//! Athletes and their playing positions.

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Court role of an athlete. Serialized by its localized label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "Levantador")]
    Setter,
    #[default]
    #[serde(rename = "Ponteiro")]
    OutsideHitter,
    #[serde(rename = "Central")]
    MiddleBlocker,
    #[serde(rename = "Oposto")]
    Opposite,
    #[serde(rename = "Líbero")]
    Libero,
}

impl Position {
    pub const ALL: [Position; 5] = [
        Position::Setter,
        Position::OutsideHitter,
        Position::MiddleBlocker,
        Position::Opposite,
        Position::Libero,
    ];

    /// Display label, as shown in the roster.
    pub fn label(self) -> &'static str {
        match self {
            Position::Setter => "Levantador",
            Position::OutsideHitter => "Ponteiro",
            Position::MiddleBlocker => "Central",
            Position::Opposite => "Oposto",
            Position::Libero => "Líbero",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown position `{0}`")]
pub struct UnknownPosition(pub String);

impl FromStr for Position {
    type Err = UnknownPosition;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "setter" | "levantador" => Ok(Position::Setter),
            "outside" | "outside-hitter" | "ponteiro" => Ok(Position::OutsideHitter),
            "middle" | "middle-blocker" | "central" => Ok(Position::MiddleBlocker),
            "opposite" | "oposto" => Ok(Position::Opposite),
            "libero" | "líbero" => Ok(Position::Libero),
            unknown => Err(UnknownPosition(unknown.to_string())),
        }
    }
}

/// Opaque athlete identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AthleteId(String);

impl AthleteId {
    /// Wrap an existing id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A fresh id derived from the current time in milliseconds, bumped
    /// forward until `is_taken` rejects it no longer.
    pub fn generate(is_taken: impl Fn(&AthleteId) -> bool) -> Self {
        let mut millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        loop {
            let candidate = AthleteId(millis.to_string());
            if !is_taken(&candidate) {
                return candidate;
            }
            millis += 1;
        }
    }
}

impl fmt::Display for AthleteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Athlete {
    pub id: AthleteId,
    pub name: String,
    pub position: Position,
}

impl Athlete {
    /// The placeholder athlete a fresh roster starts with.
    pub fn example() -> Self {
        Self {
            id: AthleteId::new("1"),
            name: "Atleta Exemplo".to_string(),
            position: Position::Setter,
        }
    }
}

impl fmt::Display for Athlete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.position)
    }
}
