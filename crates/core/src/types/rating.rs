//! Review rating type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Rating`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RatingError {
    /// The score is outside the accepted range.
    #[error("rating must be between {min} and {max} (got {got})")]
    OutOfRange {
        /// Smallest accepted score.
        min: u8,
        /// Largest accepted score.
        max: u8,
        /// The rejected score.
        got: i64,
    },
}

/// A review score of one to five stars.
///
/// ```
/// use plateful_core::Rating;
///
/// assert!(Rating::new(5).is_ok());
/// assert!(Rating::new(0).is_err());
/// assert!(Rating::new(6).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Lowest score.
    pub const MIN: u8 = 1;
    /// Highest score.
    pub const MAX: u8 = 5;

    /// Validate a score.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError::OutOfRange`] unless `1 <= score <= 5`.
    pub fn new(score: i64) -> Result<Self, RatingError> {
        u8::try_from(score)
            .ok()
            .filter(|s| (Self::MIN..=Self::MAX).contains(s))
            .map(Self)
            .ok_or(RatingError::OutOfRange {
                min: Self::MIN,
                max: Self::MAX,
                got: score,
            })
    }

    /// The numeric score.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Star glyphs, filled then hollow, e.g. `★★★☆☆`.
    #[must_use]
    pub fn stars(self) -> String {
        let filled = usize::from(self.0);
        let hollow = usize::from(Self::MAX - self.0);
        format!("{}{}", "★".repeat(filled), "☆".repeat(hollow))
    }
}

impl TryFrom<i64> for Rating {
    type Error = RatingError;

    fn try_from(score: i64) -> Result<Self, Self::Error> {
        Self::new(score)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, Self::MAX)
    }
}
