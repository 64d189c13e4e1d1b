use super::state::SegmentList;

#[derive(Debug, Default)]
pub struct Observer {
    step: u64,
}

impl Observer {
    pub fn new() -> Self {
        Self { step: 0 }
    }

    pub fn steps(&self) -> u64 {
        self.step
    }

    /// Called after the merge pass of every tick.
    pub fn observe(&mut self, memory: &SegmentList) {
        self.step += 1;

        let covered: u64 = memory.iter().map(|(_, s)| s.size()).sum();
        debug_assert_eq!(
            covered,
            memory.total_memory(),
            "Segments cover {covered} of {} at step {}",
            memory.total_memory(),
            self.step
        );

        let mut prev_hole = false;
        for (id, segment) in memory.iter() {
            debug_assert!(
                !(prev_hole && segment.is_hole()),
                "Adjacent holes left unmerged at segment {id:?}, step {}",
                self.step
            );
            debug_assert!(
                segment.size() > 0,
                "Zero-sized segment {id:?} at step {}",
                self.step
            );
            if let Some(process) = segment.process() {
                debug_assert!(
                    process.remaining_time_units > 0,
                    "Finished process {} still occupies memory",
                    process.name
                );
            }
            prev_hole = segment.is_hole();
        }
    }
}
