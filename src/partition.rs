use std::ops::RangeInclusive;

/// A contiguous, inclusive range of indices to be processed together.
#[derive(Hash, Debug, Clone, PartialEq, Eq, Copy)]
pub struct Partition {
    start: usize,
    end: usize
}

impl Partition {
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start <= end);
        Self { start, end }
    }

    pub fn start(&self) -> usize { self.start }
    pub fn end(&self) -> usize { self.end }

    /// Returns size of the partition.
    pub fn size(&self) -> usize { self.end - self.start + 1 }

    /// Creates a range to work with when processing data for the partition.
    pub fn range(&self) -> RangeInclusive<usize> { self.start..=self.end }
}
