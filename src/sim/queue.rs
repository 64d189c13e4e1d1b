use std::collections::VecDeque;

use crate::core::{Process, Ticks};

/// FIFO of processes that found no hole on arrival. Only the head is ever
/// retried, so a large head blocks smaller processes behind it.
#[derive(Debug, Default)]
pub struct AdmissionQueue {
    entries: VecDeque<Process>,
}

impl AdmissionQueue {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    pub fn push_back(&mut self, process: Process) {
        debug_assert!(
            !self.entries.iter().any(|p| p.id == process.id),
            "Process {} queued twice",
            process.name
        );
        self.entries.push_back(process);
    }

    pub fn front(&self) -> Option<&Process> {
        self.entries.front()
    }

    pub fn pop_front(&mut self) -> Option<Process> {
        self.entries.pop_front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Process> + '_ {
        self.entries.iter()
    }

    /// Sum over queued processes of how long each has waited since arrival.
    pub fn waiting_time(&self, now: Ticks) -> Ticks {
        self.entries
            .iter()
            .map(|p| now.saturating_sub(p.arrival_time))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_arrival_order() {
        let mut queue = AdmissionQueue::new();
        queue.push_back(Process::new(0, "A", 2, 10, 1));
        queue.push_back(Process::new(1, "B", 2, 10, 1));
        queue.push_back(Process::new(2, "C", 3, 10, 1));

        let names: Vec<_> = queue.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C"]);
        assert_eq!(queue.pop_front().unwrap().name, "A");
        assert_eq!(queue.front().unwrap().name, "B");
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn waiting_time_sums_queued_processes() {
        let mut queue = AdmissionQueue::new();
        assert_eq!(queue.waiting_time(5), 0);
        queue.push_back(Process::new(0, "A", 2, 10, 1));
        queue.push_back(Process::new(1, "B", 4, 10, 1));
        assert_eq!(queue.waiting_time(5), 3 + 1);
    }
}
