use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Season {
    #[default]
    All,
    Djf,
    Mam,
    Jja,
    Son,
}

impl Season {
    /// Meteorological season of a calendar month (1-12).
    pub fn from_month(month: u32) -> Option<Season> {
        match month {
            12 | 1 | 2 => Some(Season::Djf),
            3..=5 => Some(Season::Mam),
            6..=8 => Some(Season::Jja),
            9..=11 => Some(Season::Son),
            _ => None,
        }
    }

    pub fn includes(&self, month: u32) -> bool {
        match self {
            Season::All => Season::from_month(month).is_some(),
            season => Season::from_month(month) == Some(*season),
        }
    }
}

#[derive(Debug)]
pub struct SeasonParseError(String);

impl fmt::Display for SeasonParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "invalid season '{}', expected one of ALL, DJF, MAM, JJA, SON",
            self.0
        )
    }
}

impl std::error::Error for SeasonParseError {}

impl FromStr for Season {
    type Err = SeasonParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ALL" => Ok(Season::All),
            "DJF" => Ok(Season::Djf),
            "MAM" => Ok(Season::Mam),
            "JJA" => Ok(Season::Jja),
            "SON" => Ok(Season::Son),
            _ => Err(SeasonParseError(s.to_string())),
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Season::All => "ALL",
            Season::Djf => "DJF",
            Season::Mam => "MAM",
            Season::Jja => "JJA",
            Season::Son => "SON",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_lookup() {
        assert_eq!(Season::from_month(12), Some(Season::Djf));
        assert_eq!(Season::from_month(1), Some(Season::Djf));
        assert_eq!(Season::from_month(4), Some(Season::Mam));
        assert_eq!(Season::from_month(8), Some(Season::Jja));
        assert_eq!(Season::from_month(11), Some(Season::Son));
        assert_eq!(Season::from_month(13), None);
    }

    #[test]
    fn test_includes() {
        assert!(Season::All.includes(7));
        assert!(!Season::All.includes(0));
        assert!(Season::Djf.includes(12));
        assert!(!Season::Djf.includes(3));
    }

    #[test]
    fn test_parse() {
        assert_eq!("djf".parse::<Season>().unwrap(), Season::Djf);
        assert_eq!("ALL".parse::<Season>().unwrap(), Season::All);
        assert!("winter".parse::<Season>().is_err());
    }
}
