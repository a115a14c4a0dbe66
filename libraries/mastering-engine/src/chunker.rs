//! Fixed-duration chunk planning

use std::ops::Range;

/// Nominal chunk duration
pub const DEFAULT_CHUNK_DURATION_MS: u64 = 30_000;

/// Split of a programme into contiguous, non-overlapping frame ranges
///
/// Every chunk is `chunk_frames` long except possibly the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    total_frames: usize,
    chunk_frames: usize,
}

impl ChunkPlan {
    pub fn new(total_frames: usize, chunk_frames: usize) -> Self {
        Self {
            total_frames,
            chunk_frames: chunk_frames.max(1),
        }
    }

    /// Plan chunks of `chunk_duration_ms` at `sample_rate`
    ///
    /// Durations too long to express in frames saturate to a single chunk.
    pub fn for_duration(total_frames: usize, sample_rate: u32, chunk_duration_ms: u64) -> Self {
        let chunk_frames = u64::from(sample_rate).saturating_mul(chunk_duration_ms) / 1000;
        Self::new(total_frames, usize::try_from(chunk_frames).unwrap_or(usize::MAX))
    }

    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    pub fn chunk_frames(&self) -> usize {
        self.chunk_frames
    }

    /// Number of chunks (0 for an empty programme)
    pub fn count(&self) -> usize {
        self.total_frames.div_ceil(self.chunk_frames)
    }

    /// Frame range of chunk `index`
    pub fn range(&self, index: usize) -> Option<Range<usize>> {
        (index < self.count()).then(|| {
            let start = index * self.chunk_frames;
            start..start.saturating_add(self.chunk_frames).min(self.total_frames)
        })
    }

    /// All chunk frame ranges in order
    pub fn ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        (0..self.count()).filter_map(|index| self.range(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirty_second_chunks() {
        // 75 s at 44.1 kHz: 30 + 30 + 15
        let plan = ChunkPlan::for_duration(75 * 44_100, 44_100, DEFAULT_CHUNK_DURATION_MS);
        assert_eq!(plan.chunk_frames(), 1_323_000);
        assert_eq!(plan.count(), 3);
        assert_eq!(plan.range(2), Some(2_646_000..3_307_500));
        assert_eq!(plan.range(3), None);
    }

    #[test]
    fn ranges_tile_the_programme() {
        let plan = ChunkPlan::new(1000, 300);
        let ranges: Vec<_> = plan.ranges().collect();
        assert_eq!(ranges, vec![0..300, 300..600, 600..900, 900..1000]);
    }

    #[test]
    fn exact_multiple_has_no_empty_tail() {
        assert_eq!(ChunkPlan::new(900, 300).count(), 3);
    }

    #[test]
    fn short_and_empty_programmes() {
        assert_eq!(ChunkPlan::new(10, 300).count(), 1);
        assert_eq!(ChunkPlan::new(10, 300).range(0), Some(0..10));
        assert_eq!(ChunkPlan::new(0, 300).count(), 0);
        // Zero-length chunks would never terminate
        assert_eq!(ChunkPlan::new(5, 0).chunk_frames(), 1);
    }

    #[test]
    fn huge_durations_saturate() {
        let plan = ChunkPlan::for_duration(22_050, 44_100, u64::MAX / 1000);
        assert_eq!(plan.count(), 1);
        assert_eq!(plan.range(0), Some(0..22_050));

        let plan = ChunkPlan::for_duration(10, 384_000, u64::MAX);
        assert_eq!(plan.ranges().collect::<Vec<_>>(), vec![0..10]);
    }
}
