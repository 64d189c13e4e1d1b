use super::{
    observer::Observer,
    state::{Bytes, Process, SegmentId, SegmentList, Ticks},
};
use crate::policy::Policy;

/// Where a process ended up after a successful placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub segment: SegmentId,
    pub start: Bytes,
    pub size: Bytes,
}

pub struct MemoryCore<P: Policy> {
    pub memory: SegmentList,
    pub policy: P,
    now: Ticks,
    observer: Observer,
}

impl<P: Policy> MemoryCore<P> {
    pub fn new(total_memory: Bytes) -> Self {
        Self {
            memory: SegmentList::new(total_memory),
            policy: P::init(),
            // Tick numbering starts at 1
            now: 1,
            observer: Observer::new(),
        }
    }

    pub fn total_memory(&self) -> Bytes {
        self.memory.total_memory()
    }

    pub fn find_fit(&self, requirement: Bytes) -> Option<SegmentId> {
        self.policy.find_fit(&self.memory, requirement)
    }

    /// Place `process` where the policy says, or hand it back untouched.
    pub fn try_place(&mut self, process: Process) -> Result<Placement, Process> {
        match self.find_fit(process.memory_requirement) {
            Some(segment) => Ok(self.place_at(segment, process)),
            None => Err(process),
        }
    }

    pub fn place_at(&mut self, segment: SegmentId, process: Process) -> Placement {
        let start = self
            .memory
            .start_of(segment)
            .expect("Policy returned a segment outside the list");
        let size = process.memory_requirement;
        self.memory.place(segment, process);

        Placement {
            segment,
            start,
            size,
        }
    }

    /// Age running processes, free the finished ones and coalesce holes.
    /// Returns completed processes in address order.
    pub fn tick(&mut self) -> Vec<Process> {
        let completed = self.memory.tick();
        self.memory.merge_adjacent_holes();
        self.observer.observe(&self.memory);
        self.now = self.now.saturating_add(1);
        completed
    }

    pub fn now(&self) -> Ticks {
        self.now
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{BestFit, FirstFit};

    #[test]
    fn try_place_reports_offset() {
        let mut core = MemoryCore::<FirstFit>::new(100);
        let a = core.try_place(Process::new(0, "A", 0, 30, 2)).unwrap();
        let b = core.try_place(Process::new(1, "B", 0, 50, 2)).unwrap();
        assert_eq!((a.start, a.size), (0, 30));
        assert_eq!((b.start, b.size), (30, 50));
        assert_eq!(core.memory.free_memory(), 20);
    }

    #[test]
    fn try_place_returns_process_on_no_fit() {
        let mut core = MemoryCore::<BestFit>::new(100);
        core.try_place(Process::new(0, "A", 0, 80, 2)).unwrap();
        let rejected = core.try_place(Process::new(1, "B", 0, 30, 2)).unwrap_err();
        assert_eq!(rejected.name, "B");
        assert_eq!(rejected.remaining_time_units, 2);
    }

    #[test]
    fn tick_advances_clock_and_frees_memory() {
        let mut core = MemoryCore::<FirstFit>::new(100);
        core.try_place(Process::new(0, "A", 0, 100, 1)).unwrap();
        assert_eq!(core.now(), 1);

        let completed = core.tick();
        assert_eq!(completed.len(), 1);
        assert_eq!(core.now(), 2);
        assert_eq!(core.memory.hole_sizes(), vec![100]);
        assert_eq!(core.observer().steps(), 1);
    }
}
