use super::Policy;
use crate::core::{Bytes, SegmentId, SegmentList};

/// Hole leaving the smallest leftover; ties go to the lowest address.
#[derive(Debug, Default, Clone, Copy)]
pub struct BestFit;

impl Policy for BestFit {
    const NAME: &'static str = "BEST FIT";

    fn init() -> Self {
        Self
    }

    fn find_fit(&self, memory: &SegmentList, requirement: Bytes) -> Option<SegmentId> {
        let mut best: Option<(SegmentId, Bytes)> = None;

        for (id, size) in memory.holes() {
            if size < requirement {
                continue;
            }
            let leftover = size - requirement;
            // Strictly smaller only, so the first of equal candidates stays
            match best {
                Some((_, best_leftover)) if leftover >= best_leftover => {}
                _ => best = Some((id, leftover)),
            }
            if leftover == 0 {
                break;
            }
        }

        best.map(|(id, _)| id)
    }
}
