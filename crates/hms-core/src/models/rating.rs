//! Rating model
//!
//! One rating per completed booking; a service's score is the mean over
//! the ratings of its bookings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lowest accepted score
pub const MIN_SCORE: i16 = 1;

/// Highest accepted score
pub const MAX_SCORE: i16 = 5;

/// Rating entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub id: i32,

    /// Rated booking (unique across ratings)
    pub booking_id: i32,

    /// Score in `MIN_SCORE..=MAX_SCORE`
    pub score: i16,

    pub comment: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Rating {
    pub fn is_valid_score(score: i16) -> bool {
        (MIN_SCORE..=MAX_SCORE).contains(&score)
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self {
            id: 0,
            booking_id: 0,
            score: MAX_SCORE,
            comment: None,
            created_at: Utc::now(),
        }
    }
}

/// Arithmetic mean of scores, 0.0 for an empty set
pub fn average_score(scores: &[i16]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let sum: i64 = scores.iter().map(|s| i64::from(*s)).sum();
    sum as f64 / scores.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bounds() {
        assert!(!Rating::is_valid_score(0));
        assert!(Rating::is_valid_score(1));
        assert!(Rating::is_valid_score(5));
        assert!(!Rating::is_valid_score(6));
        assert!(!Rating::is_valid_score(-3));
    }

    #[test]
    fn test_average_score() {
        assert_eq!(average_score(&[]), 0.0);
        assert_eq!(average_score(&[5]), 5.0);
        assert!((average_score(&[4, 5, 3]) - 4.0).abs() < f64::EPSILON);
        assert!((average_score(&[1, 2]) - 1.5).abs() < f64::EPSILON);
    }
}
