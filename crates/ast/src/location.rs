//! # Source Locations
//!
//! A [`Location`] is a byte range `[offset, offset + length)` into the
//! original script text. Locations are merged rather than recomputed from
//! scratch whenever a grammar action spans several already-located pieces.

use serde::{Deserialize, Serialize};

/// A half-open byte range `[offset, offset + length)` into script text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Location {
    pub offset: u32,
    pub length: u32,
}

impl Location {
    pub fn new(offset: u32, length: u32) -> Self {
        Self { offset, length }
    }

    pub fn end(&self) -> u32 {
        self.offset + self.length
    }

    pub fn contains_offset(&self, offset: u32) -> bool {
        offset >= self.offset && offset < self.end()
    }

    /// Merge a set of locations into their bounding `[min(offset), max(end))` range.
    ///
    /// Empty input merges to the zero location; this matches the driver
    /// convention that an absent child never widens a parent's range.
    pub fn merge<I: IntoIterator<Item = Location>>(locations: I) -> Location {
        let mut min_offset = u32::MAX;
        let mut max_end = 0u32;
        let mut any = false;
        for loc in locations {
            any = true;
            min_offset = min_offset.min(loc.offset);
            max_end = max_end.max(loc.end());
        }
        if !any {
            return Location::default();
        }
        Location::new(min_offset, max_end - min_offset)
    }

    /// A zero-length location immediately after `self`.
    pub fn after(&self) -> Location {
        Location::new(self.end(), 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_takes_bounding_range() {
        let a = Location::new(5, 3); // [5, 8)
        let b = Location::new(10, 2); // [10, 12)
        let merged = Location::merge([a, b]);
        assert_eq!(merged, Location::new(5, 7));
    }

    #[test]
    fn merge_of_empty_is_zero() {
        assert_eq!(Location::merge([]), Location::default());
    }

    #[test]
    fn after_is_zero_length_past_end() {
        let a = Location::new(5, 3);
        assert_eq!(a.after(), Location::new(8, 0));
    }
}
