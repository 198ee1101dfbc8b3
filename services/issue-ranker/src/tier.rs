//! Backlog Tiers
//!
//! Enumerations for the three ranking attributes of an issue. Parsing is
//! case-insensitive; values outside an enumeration score like its default.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A value that does not name a known tier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind} tier: {value}")]
pub struct UnknownTier {
    pub kind: &'static str,
    pub value: String,
}

/// Urgency tier, P1 is the most urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    P1,
    P2,
    #[default]
    P3,
}

/// Expected benefit tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Impact {
    High,
    Medium,
    #[default]
    Low,
}

/// Effort size tier, XS is the smallest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Estimate {
    XS,
    S,
    #[default]
    M,
    L,
    XL,
}

impl Priority {
    /// Higher is more urgent
    pub fn score(self) -> u8 {
        match self {
            Priority::P1 => 3,
            Priority::P2 => 2,
            Priority::P3 => 1,
        }
    }
}

impl Impact {
    /// Higher is more valuable
    pub fn score(self) -> u8 {
        match self {
            Impact::High => 3,
            Impact::Medium => 2,
            Impact::Low => 1,
        }
    }
}

impl Estimate {
    /// Higher is more effort
    pub fn score(self) -> u8 {
        match self {
            Estimate::XS => 1,
            Estimate::S => 2,
            Estimate::M => 3,
            Estimate::L => 4,
            Estimate::XL => 5,
        }
    }
}

impl FromStr for Priority {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "P1" => Ok(Priority::P1),
            "P2" => Ok(Priority::P2),
            "P3" => Ok(Priority::P3),
            _ => Err(UnknownTier {
                kind: "priority",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for Impact {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HIGH" => Ok(Impact::High),
            "MEDIUM" => Ok(Impact::Medium),
            "LOW" => Ok(Impact::Low),
            _ => Err(UnknownTier {
                kind: "impact",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for Estimate {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "XS" => Ok(Estimate::XS),
            "S" => Ok(Estimate::S),
            "M" => Ok(Estimate::M),
            "L" => Ok(Estimate::L),
            "XL" => Ok(Estimate::XL),
            _ => Err(UnknownTier {
                kind: "estimate",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::P1 => write!(f, "P1"),
            Priority::P2 => write!(f, "P2"),
            Priority::P3 => write!(f, "P3"),
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Impact::High => write!(f, "HIGH"),
            Impact::Medium => write!(f, "MEDIUM"),
            Impact::Low => write!(f, "LOW"),
        }
    }
}

impl fmt::Display for Estimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Estimate::XS => write!(f, "XS"),
            Estimate::S => write!(f, "S"),
            Estimate::M => write!(f, "M"),
            Estimate::L => write!(f, "L"),
            Estimate::XL => write!(f, "XL"),
        }
    }
}

/// Parse a normalized value, falling back to the tier's default when unknown
pub fn parse_or_default<T>(value: &str) -> T
where
    T: FromStr + Default,
{
    value.parse().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("p1".parse::<Priority>(), Ok(Priority::P1));
        assert_eq!("Medium".parse::<Impact>(), Ok(Impact::Medium));
        assert_eq!("xl".parse::<Estimate>(), Ok(Estimate::XL));
    }

    #[test]
    fn test_unknown_value_is_error() {
        let err = "P0".parse::<Priority>().unwrap_err();
        assert_eq!(err.kind, "priority");
        assert_eq!(err.value, "P0");
        assert_eq!(err.to_string(), "Unknown priority tier: P0");
    }

    #[test]
    fn test_surrounding_whitespace_is_not_stripped() {
        assert!(" P1".parse::<Priority>().is_err());
        assert!(" high ".parse::<Impact>().is_err());
        assert_eq!(parse_or_default::<Priority>(" P1").score(), Priority::P3.score());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Priority::default(), Priority::P3);
        assert_eq!(Impact::default(), Impact::Low);
        assert_eq!(Estimate::default(), Estimate::M);
    }

    #[test]
    fn test_unknown_falls_back_to_default_score() {
        assert_eq!(parse_or_default::<Priority>("URGENT").score(), 1);
        assert_eq!(parse_or_default::<Impact>("HUGE").score(), 1);
        assert_eq!(parse_or_default::<Estimate>("XXL").score(), 3);
    }

    #[test]
    fn test_scores_are_ordered() {
        assert!(Priority::P1.score() > Priority::P2.score());
        assert!(Impact::High.score() > Impact::Medium.score());
        assert!(Estimate::XS.score() < Estimate::XL.score());
    }

    #[test]
    fn test_display_round_trips_canonical_form() {
        assert_eq!(Impact::High.to_string(), "HIGH");
        assert_eq!("HIGH".parse::<Impact>(), Ok(Impact::High));
    }
}
