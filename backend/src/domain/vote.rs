//! Vote direction parsing.

use std::fmt;

/// Which counter a vote increments.
///
/// Down-votes increment the down counter; they never decrement the up
/// counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDirection {
    Up,
    Down,
}

/// Raised when the `up` flag is neither boolean-like nor an integer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("up must be 0, 1, true, or false; got {value:?}")]
pub struct VoteDirectionError {
    value: String,
}

impl VoteDirection {
    /// Interpret the optional `up` query flag.
    ///
    /// Absent or empty means up. Integers are truthy when nonzero.
    ///
    /// # Examples
    /// ```
    /// use qanda::domain::VoteDirection;
    ///
    /// assert_eq!(VoteDirection::from_flag(None), Ok(VoteDirection::Up));
    /// assert_eq!(VoteDirection::from_flag(Some("0")), Ok(VoteDirection::Down));
    /// assert_eq!(VoteDirection::from_flag(Some("1")), Ok(VoteDirection::Up));
    /// assert!(VoteDirection::from_flag(Some("sideways")).is_err());
    /// ```
    pub fn from_flag(flag: Option<&str>) -> Result<Self, VoteDirectionError> {
        let Some(raw) = flag.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Ok(Self::Up);
        };
        if let Ok(number) = raw.parse::<i64>() {
            return Ok(if number == 0 { Self::Down } else { Self::Up });
        }
        match raw.to_ascii_lowercase().as_str() {
            "true" => Ok(Self::Up),
            "false" => Ok(Self::Down),
            _ => Err(VoteDirectionError {
                value: raw.to_owned(),
            }),
        }
    }

    /// Past-tense verb used in response messages.
    pub fn verb(self) -> &'static str {
        match self {
            Self::Up => "up-voted",
            Self::Down => "down-voted",
        }
    }
}

impl fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => f.write_str("up"),
            Self::Down => f.write_str("down"),
        }
    }
}
