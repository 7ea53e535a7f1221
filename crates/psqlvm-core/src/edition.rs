//! Edition identifiers.
//!
//! An edition is one release of the managed package, named by its release
//! tag (`14.2`, `16.4`, `17beta1`). The identifier is used verbatim as a
//! directory name and inside download URLs, so only path-safe strings are
//! accepted.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A validated edition identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EditionId(String);

impl EditionId {
    /// Parse and validate an edition identifier.
    pub fn new(value: impl Into<String>) -> Result<Self, EditionParseError> {
        let value = value.into();
        if value.is_empty() {
            return Err(EditionParseError::Empty);
        }
        if value == "." || value == ".." {
            return Err(EditionParseError::Reserved(value));
        }
        if let Some(c) = value
            .chars()
            .find(|c| matches!(c, '/' | '\\') || c.is_whitespace() || c.is_control())
        {
            return Err(EditionParseError::InvalidChar { value, ch: c });
        }
        Ok(Self(value))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Major release component (`14` for `14.2`).
    pub fn major(&self) -> Option<u32> {
        let (num, _) = split_numeric(self.0.split('.').next()?);
        num
    }
}

impl fmt::Display for EditionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EditionId {
    type Err = EditionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.trim())
    }
}

impl TryFrom<String> for EditionId {
    type Error = EditionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EditionId> for String {
    fn from(id: EditionId) -> Self {
        id.0
    }
}

impl AsRef<str> for EditionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for EditionId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for EditionId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialOrd for EditionId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Release ordering: numeric components compare numerically, and a
/// component with a suffix (`17beta1`) sorts before the plain release.
impl Ord for EditionId {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut left = self.0.split('.');
        let mut right = other.0.split('.');
        loop {
            match (left.next(), right.next()) {
                (None, None) => return self.0.cmp(&other.0),
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (Some(a), Some(b)) => match compare_component(a, b) {
                    Ordering::Equal => {}
                    ord => return ord,
                },
            }
        }
    }
}

fn split_numeric(component: &str) -> (Option<u32>, &str) {
    let digits = component
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(component.len());
    (component[..digits].parse().ok(), &component[digits..])
}

fn compare_component(a: &str, b: &str) -> Ordering {
    let (a_num, a_rest) = split_numeric(a);
    let (b_num, b_rest) = split_numeric(b);
    match (a_num, b_num) {
        (Some(x), Some(y)) if x != y => return x.cmp(&y),
        (Some(_), None) => return Ordering::Greater,
        (None, Some(_)) => return Ordering::Less,
        _ => {}
    }
    match (a_rest.is_empty(), b_rest.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a_rest.cmp(b_rest),
    }
}

/// Error parsing an edition identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditionParseError {
    #[error("edition must not be empty")]
    Empty,
    #[error("'{0}' is not a valid edition")]
    Reserved(String),
    #[error("edition '{value}' contains invalid character {ch:?}")]
    InvalidChar { value: String, ch: char },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> EditionId {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_edition() {
        assert_eq!(id("14.2").as_str(), "14.2");
        assert_eq!(id(" 15.1 ").as_str(), "15.1");
        assert_eq!(id("14.2").major(), Some(14));
        assert_eq!(id("17beta1").major(), Some(17));
    }

    #[test]
    fn test_rejects_unsafe_identifiers() {
        assert_eq!("".parse::<EditionId>(), Err(EditionParseError::Empty));
        assert!("..".parse::<EditionId>().is_err());
        assert!("14/2".parse::<EditionId>().is_err());
        assert!("14 2".parse::<EditionId>().is_err());
        assert!(EditionId::new("..\\x").is_err());
    }

    #[test]
    fn test_edition_ordering() {
        assert!(id("15.1") > id("14.2"));
        assert!(id("14.10") > id("14.9"));
        assert!(id("9.6.24") < id("10.0"));
        assert!(id("17beta1") < id("17.0"));
        assert!(id("17beta2") > id("17beta1"));
        assert_eq!(id("14.2").cmp(&id("14.2")), Ordering::Equal);
    }

    #[test]
    fn test_serde_roundtrip_validates() {
        let parsed: Result<EditionId, _> = EditionId::try_from(String::from("a/b"));
        assert!(parsed.is_err());
        let s: String = id("16.4").into();
        assert_eq!(s, "16.4");
    }
}
