//! USE flag value type.
//!
//! # Responsibility
//! - Parse and render `flag` / `-flag` tokens.
//! - Define the sort order used when listing flags.
//!
//! # Invariants
//! - `name` is never empty and never starts with `-`.
//! - Every unset flag orders before every set flag; names break ties.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Whether a USE flag is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FlagState {
    Unset,
    Set,
}

/// One enabled or disabled USE flag.
///
/// Serialized as its display form, e.g. `"X11"` or `"-gtk"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UseFlag {
    // Field order drives the derived ordering.
    state: FlagState,
    name: String,
}

impl UseFlag {
    pub fn new_set(name: impl Into<String>) -> Self {
        Self {
            state: FlagState::Set,
            name: name.into(),
        }
    }

    pub fn new_unset(name: impl Into<String>) -> Self {
        Self {
            state: FlagState::Unset,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> FlagState {
        self.state
    }

    pub fn is_set(&self) -> bool {
        self.state == FlagState::Set
    }
}

impl Display for UseFlag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.state {
            FlagState::Set => write!(f, "{}", self.name),
            FlagState::Unset => write!(f, "-{}", self.name),
        }
    }
}

/// Flag token parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UseFlagParseError {
    Empty,
    MissingName,
}

impl Display for UseFlagParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "use flag must not be empty"),
            Self::MissingName => write!(f, "use flag has a `-` prefix but no name"),
        }
    }
}

impl Error for UseFlagParseError {}

impl FromStr for UseFlag {
    type Err = UseFlagParseError;

    /// Surrounding whitespace is ignored; any number of leading `-` marks the
    /// flag as unset.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(UseFlagParseError::Empty);
        }
        match trimmed.strip_prefix('-') {
            Some(rest) => {
                let name = rest.trim_start_matches('-');
                if name.is_empty() {
                    return Err(UseFlagParseError::MissingName);
                }
                Ok(Self::new_unset(name))
            }
            None => Ok(Self::new_set(trimmed)),
        }
    }
}

impl TryFrom<String> for UseFlag {
    type Error = UseFlagParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<UseFlag> for String {
    fn from(value: UseFlag) -> Self {
        value.to_string()
    }
}
