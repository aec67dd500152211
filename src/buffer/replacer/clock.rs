//! CLOCK (second-chance) replacement policy.
//!
//! Approximates LRU with one reference bit per frame and a rotating hand.
//! A frame whose bit is set when the hand passes loses the bit instead of
//! being evicted, so a recently touched frame survives one extra lap.

use crate::buffer::frame::FrameDesc;
use crate::common::FrameId;

/// The rotating cursor over the descriptor table.
///
/// The hand persists across calls, so each sweep resumes where the last
/// one stopped.
pub struct ClockReplacer {
    hand: FrameId,
    num_frames: usize,
}

impl ClockReplacer {
    /// Create a hand for a pool of `num_frames` frames.
    ///
    /// The hand starts on the last frame so the first sweep looks at frame 0.
    ///
    /// # Panics
    /// Panics if `num_frames` is 0.
    pub fn new(num_frames: usize) -> Self {
        assert!(num_frames > 0, "num_frames must be > 0");
        Self {
            hand: FrameId::new(num_frames - 1),
            num_frames,
        }
    }

    /// Current position of the hand.
    #[inline]
    pub fn hand(&self) -> FrameId {
        self.hand
    }

    #[inline]
    fn advance(&mut self) {
        self.hand = self.hand.next(self.num_frames);
    }

    /// Sweep until a usable frame is found.
    ///
    /// Returns either an invalid frame or an unpinned, unreferenced valid
    /// frame (the victim, still holding its page; the caller writes it back
    /// and unmaps it). Reference bits passed on the way are cleared.
    ///
    /// Returns `None` once `num_frames` consecutively visited frames were
    /// pinned, i.e. a full lap found nothing evictable. Residency, pins and
    /// dirty bits are untouched in that case, and the hand is back where it
    /// started.
    pub fn find_victim(&mut self, descs: &mut [FrameDesc]) -> Option<FrameId> {
        debug_assert_eq!(descs.len(), self.num_frames);
        let mut pinned_run = 0;

        loop {
            self.advance();
            let desc = &mut descs[self.hand.0];

            if !desc.is_valid() {
                return Some(self.hand);
            }

            if desc.is_pinned() {
                desc.clear_refbit();
                pinned_run += 1;
                if pinned_run >= self.num_frames {
                    return None;
                }
                continue;
            }

            if desc.refbit() {
                // Second chance; this frame is a candidate on the next lap.
                desc.clear_refbit();
                pinned_run = 0;
                continue;
            }

            return Some(self.hand);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::PageId;
    use crate::storage::{shared, FileHandle, PageFile};
    use tempfile::tempdir;

    fn setup(n: usize) -> (Vec<FrameDesc>, FileHandle, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let file = shared(PageFile::create(dir.path().join("clock.db")).unwrap());
        let descs = (0..n).map(|i| FrameDesc::new(FrameId::new(i))).collect();
        (descs, file, dir)
    }

    /// Fill every frame with a page, pinned once and referenced.
    fn fill(descs: &mut [FrameDesc], file: &FileHandle) {
        for (i, desc) in descs.iter_mut().enumerate() {
            desc.set(file, PageId::new(i as u32));
        }
    }

    #[test]
    fn test_first_sweep_starts_at_frame_zero() {
        let (mut descs, _file, _dir) = setup(4);
        let mut clock = ClockReplacer::new(4);

        assert_eq!(clock.find_victim(&mut descs), Some(FrameId::new(0)));
        assert_eq!(clock.hand(), FrameId::new(0));
    }

    #[test]
    fn test_invalid_frame_taken_immediately() {
        let (mut descs, file, _dir) = setup(3);
        fill(&mut descs, &file);
        descs[1].clear();
        let mut clock = ClockReplacer::new(3);

        assert_eq!(clock.find_victim(&mut descs), Some(FrameId::new(1)));
        // Frame 0 was pinned; its reference bit was aged on the way.
        assert!(!descs[0].refbit());
    }

    #[test]
    fn test_second_chance() {
        let (mut descs, file, _dir) = setup(3);
        fill(&mut descs, &file);
        for desc in descs.iter_mut() {
            desc.unpin();
        }
        let mut clock = ClockReplacer::new(3);

        // First lap clears all bits, second lap takes frame 0.
        assert_eq!(clock.find_victim(&mut descs), Some(FrameId::new(0)));
        assert!(descs.iter().all(|d| !d.refbit()));

        // Frame 1 is next in clock order.
        assert_eq!(clock.find_victim(&mut descs), Some(FrameId::new(1)));
    }

    #[test]
    fn test_recently_touched_frame_survives() {
        let (mut descs, file, _dir) = setup(3);
        fill(&mut descs, &file);
        for desc in descs.iter_mut() {
            desc.unpin();
            desc.clear_refbit();
        }
        descs[0].touch();
        descs[0].unpin();
        let mut clock = ClockReplacer::new(3);

        assert_eq!(clock.find_victim(&mut descs), Some(FrameId::new(1)));
        assert!(!descs[0].refbit());
    }

    #[test]
    fn test_all_pinned_returns_none() {
        let (mut descs, file, _dir) = setup(3);
        fill(&mut descs, &file);
        let mut clock = ClockReplacer::new(3);

        assert_eq!(clock.find_victim(&mut descs), None);
        assert_eq!(clock.hand(), FrameId::new(2));
        assert!(descs.iter().all(|d| d.is_valid() && d.pin_count() == 1));
    }

    #[test]
    fn test_single_unpinned_frame_among_pinned() {
        let (mut descs, file, _dir) = setup(5);
        fill(&mut descs, &file);
        descs[3].unpin();
        let mut clock = ClockReplacer::new(5);

        // Frame 3 keeps its reference bit through the first lap, so the
        // sweep must go past four pinned frames twice before taking it.
        assert_eq!(clock.find_victim(&mut descs), Some(FrameId::new(3)));
    }

    #[test]
    #[should_panic(expected = "num_frames must be > 0")]
    fn test_zero_frames_panics() {
        ClockReplacer::new(0);
    }
}
