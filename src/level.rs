//! Proficiency levels assigned to classified constructs.

use serde::{Deserialize, Serialize};

/// Six ordered grades, from `A1` (simplest) to `C2` (most complex).
///
/// The derived ordering follows declaration order, so `Level::A1 < Level::C2`
/// and histograms, minimums and maximums can be computed directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl Level {
    /// All levels in ascending order.
    pub const ALL: [Level; 6] = [
        Level::A1,
        Level::A2,
        Level::B1,
        Level::B2,
        Level::C1,
        Level::C2,
    ];

    /// Persisted form of the level (case-sensitive).
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::A1 => "A1",
            Level::A2 => "A2",
            Level::B1 => "B1",
            Level::B2 => "B2",
            Level::C1 => "C1",
            Level::C2 => "C2",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "A1" => Some(Level::A1),
            "A2" => Some(Level::A2),
            "B1" => Some(Level::B1),
            "B2" => Some(Level::B2),
            "C1" => Some(Level::C1),
            "C2" => Some(Level::C2),
            _ => None,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::parse(s).ok_or_else(|| format!("unknown level: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Level::A1 < Level::A2);
        assert!(Level::B2 < Level::C1);
        assert_eq!(Level::ALL.iter().max(), Some(&Level::C2));
        assert_eq!(Level::ALL.iter().min(), Some(&Level::A1));
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!("B2".parse::<Level>(), Ok(Level::B2));
        assert!("b2".parse::<Level>().is_err());
        assert!("D1".parse::<Level>().is_err());
    }

    #[test]
    fn test_serde_uses_persisted_form() {
        let json = serde_json::to_string(&Level::C1).unwrap();
        assert_eq!(json, "\"C1\"");
        let back: Level = serde_json::from_str("\"A2\"").unwrap();
        assert_eq!(back, Level::A2);
    }
}
