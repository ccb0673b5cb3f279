use crate::errors::{BaleenError, BaleenResult, ErrorKind};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Progress of a batch run, reported to event listeners.
///
/// `total` is at least 1 and `current` lies in `0..=total`; both are checked
/// at construction. Progress is informational only and never steers a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Progress {
    total: usize,
    current: usize,
}

impl Progress {
    /// Creates a progress value.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `total` is zero or `current` exceeds it.
    pub fn new(total: usize, current: usize) -> BaleenResult<Self> {
        if total < 1 {
            return Err(BaleenError::new(
                "Progress total must be at least 1",
                ErrorKind::InvalidArgument,
            ));
        }
        if current > total {
            return Err(BaleenError::new(
                &format!("Progress current ({}) cannot exceed total ({})", current, total),
                ErrorKind::InvalidArgument,
            ));
        }
        Ok(Progress { total, current })
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Returns a copy positioned at `current`.
    pub fn update(&self, current: usize) -> BaleenResult<Self> {
        Progress::new(self.total, current)
    }

    pub fn is_complete(&self) -> bool {
        self.current == self.total
    }

    pub fn percent(&self) -> f64 {
        self.current as f64 * 100.0 / self.total as f64
    }
}

impl Display for Progress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.current, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invariants() {
        assert!(Progress::new(0, 0).is_err());
        assert!(Progress::new(3, 4).is_err());
        assert!(Progress::new(3, 0).is_ok());
        assert!(Progress::new(3, 3).is_ok());
    }

    #[test]
    fn test_update() {
        let progress = Progress::new(4, 0).unwrap();
        let next = progress.update(2).unwrap();
        assert_eq!(next.current(), 2);
        assert_eq!(next.total(), 4);
        assert_eq!(next.percent(), 50.0);
        assert!(!next.is_complete());
        assert!(progress.update(5).is_err());
        assert!(next.update(4).unwrap().is_complete());
        assert_eq!(next.to_string(), "2/4");
    }
}
