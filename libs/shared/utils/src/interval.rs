use serde::{Deserialize, Serialize};

/// True when the half-open intervals `[a_start, a_end)` and `[b_start, b_end)`
/// share at least one point. Intervals that only touch do not overlap.
pub fn overlaps<T: PartialOrd>(a_start: &T, a_end: &T, b_start: &T, b_end: &T) -> bool {
    a_start < b_end && b_start < a_end
}

/// A non-empty half-open range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange<T> {
    start: T,
    end: T,
}

impl<T: PartialOrd + Copy> TimeRange<T> {
    /// Returns `None` unless `end > start`.
    pub fn new(start: T, end: T) -> Option<Self> {
        if end > start {
            Some(Self { start, end })
        } else {
            None
        }
    }

    pub fn start(&self) -> T {
        self.start
    }

    pub fn end(&self) -> T {
        self.end
    }

    pub fn overlaps(&self, other: &TimeRange<T>) -> bool {
        overlaps(&self.start, &self.end, &other.start, &other.end)
    }

    /// True when `other` lies entirely inside `self`.
    pub fn contains(&self, other: &TimeRange<T>) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}
