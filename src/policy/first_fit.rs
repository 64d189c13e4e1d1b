use super::Policy;
use crate::core::{Bytes, SegmentId, SegmentList};

/// Lowest-address hole that is large enough.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstFit;

impl Policy for FirstFit {
    const NAME: &'static str = "FIRST FIT";

    fn init() -> Self {
        Self
    }

    fn find_fit(&self, memory: &SegmentList, requirement: Bytes) -> Option<SegmentId> {
        memory
            .holes()
            .find(|&(_, size)| size >= requirement)
            .map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::tests_support::fragmented;

    #[test]
    fn picks_lowest_address_fit() {
        // holes: 20 @ 0, 40 @ 30, 10 @ 80
        let memory = fragmented(&[20, 40, 10]);
        let chosen = FirstFit.find_fit(&memory, 15).unwrap();
        assert_eq!(memory.start_of(chosen), Some(0));

        let chosen = FirstFit.find_fit(&memory, 25).unwrap();
        assert_eq!(memory.start_of(chosen), Some(30));
    }

    #[test]
    fn exact_size_counts_as_fit() {
        let memory = fragmented(&[20, 40, 10]);
        let chosen = FirstFit.find_fit(&memory, 40).unwrap();
        assert_eq!(memory.get(chosen).unwrap().size(), 40);
    }

    #[test]
    fn no_fit_is_none() {
        let memory = fragmented(&[20, 40, 10]);
        assert_eq!(FirstFit.find_fit(&memory, 41), None);
    }
}
