//! Per-tick accounting and the end-of-run summary.
//!
//! The collector never adjusts a counter after the fact: every process has
//! exactly one current outcome, overwritten as its events arrive, and
//! the success/failure totals are derived from those outcomes at the end.
//! A process that is queued on arrival and placed later therefore counts
//! as one success and zero failures.

use std::fmt;

use average::{Estimate, Mean};
use rustc_hash::FxHashMap;

use crate::core::{AllocEvent, Bytes, ProcessId, SegmentList, Ticks};

/// State of memory and queue after admission, before aging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSnapshot {
    pub time: Ticks,
    pub used_memory: Bytes,
    pub hole_count: usize,
    pub fragmentation: Bytes,
    pub queue_len: usize,
    pub waiting_time: Ticks,
}

impl TickSnapshot {
    pub fn capture(
        time: Ticks,
        memory: &SegmentList,
        queue_len: usize,
        waiting_time: Ticks,
    ) -> Self {
        Self {
            time,
            used_memory: memory.used_memory(),
            hole_count: memory.hole_count(),
            fragmentation: memory.free_memory(),
            queue_len,
            waiting_time,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Waiting,
    Placed,
    Dropped,
}

#[derive(Debug)]
pub struct MetricsCollector {
    total_memory: Bytes,
    total_processes: usize,
    outcomes: FxHashMap<ProcessId, Outcome>,
    deferred: usize,
    completed: usize,
    total_waiting_time: Ticks,
    used_memory_time: u128,
    peak_used_memory: Bytes,
    queue_len_range: Option<(usize, usize)>,
    hole_counts: Vec<usize>,
    fragmentation: Vec<Bytes>,
}

impl MetricsCollector {
    pub fn new(total_memory: Bytes, total_processes: usize) -> Self {
        Self {
            total_memory,
            total_processes,
            outcomes: FxHashMap::default(),
            deferred: 0,
            completed: 0,
            total_waiting_time: 0,
            used_memory_time: 0,
            peak_used_memory: 0,
            queue_len_range: None,
            hole_counts: Vec::new(),
            fragmentation: Vec::new(),
        }
    }

    pub fn record_event(&mut self, event: &AllocEvent) {
        let id = event.process();
        let previous = self.outcomes.get(&id).copied();

        match *event {
            AllocEvent::Placed { from_queue, .. } => {
                debug_assert_eq!(
                    previous,
                    from_queue.then_some(Outcome::Waiting),
                    "Process {id} placed from an unexpected state"
                );
                self.outcomes.insert(id, Outcome::Placed);
            }
            AllocEvent::Queued { .. } => {
                debug_assert_eq!(previous, None, "Process {id} queued twice");
                self.outcomes.insert(id, Outcome::Waiting);
                self.deferred += 1;
            }
            AllocEvent::Dropped { .. } => {
                debug_assert_ne!(
                    previous,
                    Some(Outcome::Placed),
                    "Process {id} dropped after placement"
                );
                self.outcomes.insert(id, Outcome::Dropped);
            }
            AllocEvent::Completed { .. } => {
                debug_assert_eq!(
                    previous,
                    Some(Outcome::Placed),
                    "Process {id} completed without placement"
                );
                self.completed += 1;
            }
        }
    }

    pub fn record_snapshot(&mut self, snapshot: &TickSnapshot) {
        self.peak_used_memory = self.peak_used_memory.max(snapshot.used_memory);
        self.used_memory_time += u128::from(snapshot.used_memory);
        self.total_waiting_time += snapshot.waiting_time;

        let len = snapshot.queue_len;
        self.queue_len_range = Some(match self.queue_len_range {
            Some((min, max)) => (min.min(len), max.max(len)),
            None => (len, len),
        });

        self.hole_counts.push(snapshot.hole_count);
        self.fragmentation.push(snapshot.fragmentation);
    }

    fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.values().filter(|&&o| o == outcome).count()
    }

    /// Close the run: record the remaining holes and derive every summary
    /// figure from what was collected.
    pub fn finalize(
        &self,
        policy: &'static str,
        memory: &SegmentList,
        simulation_time: Ticks,
    ) -> Summary {
        let successful_allocations = self.count(Outcome::Placed);
        let dropped = self.count(Outcome::Dropped);
        let allocation_failures = dropped + self.count(Outcome::Waiting);
        let total_memory = self.total_memory as f64;

        let ticks = simulation_time as f64;

        let average_utilization = (simulation_time > 0)
            .then(|| self.used_memory_time as f64 / (ticks * total_memory) * 100.0);
        let throughput = (simulation_time > 0).then(|| self.completed as f64 / ticks);
        let average_waiting_time = (successful_allocations > 0)
            .then(|| self.total_waiting_time as f64 / successful_allocations as f64);
        let success_rate = (self.total_processes > 0)
            .then(|| successful_allocations as f64 / self.total_processes as f64 * 100.0);

        let (min_queue_length, max_queue_length) = self.queue_len_range.unwrap_or((0, 0));

        Summary {
            policy,
            total_memory: self.total_memory,
            total_processes: self.total_processes,
            successful_allocations,
            allocation_failures,
            deferred_allocations: self.deferred,
            dropped,
            processes_completed: self.completed,
            simulation_time,
            average_utilization,
            peak_memory_usage: self.peak_used_memory,
            throughput,
            total_waiting_time: self.total_waiting_time,
            average_waiting_time,
            success_rate,
            min_queue_length,
            max_queue_length,
            average_hole_count: mean(self.hole_counts.iter().map(|&c| c as f64)),
            average_fragmentation: mean(self.fragmentation.iter().map(|&f| f as f64)),
            peak_fragmentation: self.fragmentation.iter().copied().max(),
            final_holes: HoleStats::from_sizes(&memory.hole_sizes()),
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mean: Mean = values.collect();
    (mean.len() > 0).then(|| mean.estimate())
}

/// Size profile of the holes left at termination.
#[derive(Debug, Clone, PartialEq)]
pub struct HoleStats {
    pub count: usize,
    pub total: Bytes,
    pub smallest: Bytes,
    pub largest: Bytes,
    pub average: f64,
    pub sizes: Vec<Bytes>,
}

impl HoleStats {
    pub fn from_sizes(sizes: &[Bytes]) -> Option<Self> {
        let smallest = *sizes.iter().min()?;
        let largest = *sizes.iter().max()?;
        Some(Self {
            count: sizes.len(),
            total: sizes.iter().sum(),
            smallest,
            largest,
            average: mean(sizes.iter().map(|&s| s as f64)).unwrap_or(0.0),
            sizes: sizes.to_vec(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub policy: &'static str,
    pub total_memory: Bytes,
    pub total_processes: usize,
    pub successful_allocations: usize,
    pub allocation_failures: usize,
    pub deferred_allocations: usize,
    pub dropped: usize,
    pub processes_completed: usize,
    pub simulation_time: Ticks,
    /// Percent of memory-time occupied.
    pub average_utilization: Option<f64>,
    pub peak_memory_usage: Bytes,
    /// Completions per tick.
    pub throughput: Option<f64>,
    pub total_waiting_time: Ticks,
    pub average_waiting_time: Option<f64>,
    pub success_rate: Option<f64>,
    pub min_queue_length: usize,
    pub max_queue_length: usize,
    pub average_hole_count: Option<f64>,
    pub average_fragmentation: Option<f64>,
    pub peak_fragmentation: Option<Bytes>,
    pub final_holes: Option<HoleStats>,
}

impl Summary {
    pub fn peak_utilization(&self) -> f64 {
        self.percent_of_memory(self.peak_memory_usage as f64)
    }

    fn percent_of_memory(&self, amount: f64) -> f64 {
        amount / self.total_memory as f64 * 100.0
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "========== {} ALGORITHM METRICS ==========", self.policy)?;
        writeln!(f, "Total Processes: {}", self.total_processes)?;
        writeln!(f, "Successful Allocations: {}", self.successful_allocations)?;
        writeln!(f, "Allocation Failures: {}", self.allocation_failures)?;
        writeln!(f, "Deferred To Queue: {}", self.deferred_allocations)?;
        writeln!(f, "Dropped (larger than memory): {}", self.dropped)?;
        if let Some(rate) = self.success_rate {
            writeln!(f, "Allocation Success Rate: {rate:.2}%")?;
        }
        writeln!(f, "Processes Completed: {}", self.processes_completed)?;
        writeln!(f, "Total Simulation Time: {}", self.simulation_time)?;
        if let Some(utilization) = self.average_utilization {
            writeln!(f, "Average Memory Utilization: {utilization:.2}%")?;
        }
        if let Some(throughput) = self.throughput {
            writeln!(f, "Throughput (processes/time unit): {throughput:.4}")?;
        }
        writeln!(
            f,
            "Peak Memory Usage: {}/{} ({:.2}%)",
            self.peak_memory_usage,
            self.total_memory,
            self.peak_utilization()
        )?;
        if let Some(waiting) = self.average_waiting_time {
            writeln!(f, "Average Waiting Time: {waiting:.2} time units")?;
        }
        writeln!(f, "Minimum Queue Length: {}", self.min_queue_length)?;
        writeln!(f, "Maximum Queue Length: {}", self.max_queue_length)?;
        if let (Some(avg), Some(peak)) = (self.average_fragmentation, self.peak_fragmentation) {
            writeln!(
                f,
                "Average Fragmentation (over time): {avg:.2} ({:.2}% of total memory)",
                self.percent_of_memory(avg)
            )?;
            writeln!(
                f,
                "Peak Fragmentation: {peak} ({:.2}% of total memory)",
                self.percent_of_memory(peak as f64)
            )?;
        }
        if let Some(holes) = self.average_hole_count {
            writeln!(f, "Average Number of Holes: {holes:.2}")?;
        }

        match &self.final_holes {
            Some(holes) => {
                writeln!(f, "Final Number of Memory Holes: {}", holes.count)?;
                writeln!(f, "Average Hole Size: {:.2}", holes.average)?;
                writeln!(f, "Smallest Hole: {}", holes.smallest)?;
                writeln!(f, "Largest Hole: {}", holes.largest)?;
                writeln!(
                    f,
                    "Total Fragmented Memory: {}/{} ({:.2}%)",
                    holes.total,
                    self.total_memory,
                    self.percent_of_memory(holes.total as f64)
                )?;
            }
            None => writeln!(f, "Final Number of Memory Holes: 0")?,
        }

        write!(f, "=========================================================")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(
        time: Ticks,
        used: Bytes,
        holes: usize,
        queue_len: usize,
        waiting: Ticks,
    ) -> TickSnapshot {
        TickSnapshot {
            time,
            used_memory: used,
            hole_count: holes,
            fragmentation: 100 - used,
            queue_len,
            waiting_time: waiting,
        }
    }

    #[test]
    fn late_placement_counts_once_as_success() {
        let mut metrics = MetricsCollector::new(100, 2);
        metrics.record_event(&AllocEvent::Placed {
            process: 0,
            start: 0,
            size: 80,
            from_queue: false,
        });
        metrics.record_event(&AllocEvent::Queued { process: 1 });
        metrics.record_event(&AllocEvent::Completed { process: 0 });
        metrics.record_event(&AllocEvent::Placed {
            process: 1,
            start: 0,
            size: 50,
            from_queue: true,
        });

        let summary = metrics.finalize("TEST", &SegmentList::new(100), 3);
        assert_eq!(summary.successful_allocations, 2);
        assert_eq!(summary.allocation_failures, 0);
        assert_eq!(summary.deferred_allocations, 1);
        assert_eq!(summary.processes_completed, 1);
        assert_eq!(summary.success_rate, Some(100.0));
    }

    #[test]
    fn dropped_and_waiting_are_failures() {
        let mut metrics = MetricsCollector::new(100, 3);
        metrics.record_event(&AllocEvent::Dropped {
            process: 0,
            requirement: 500,
        });
        metrics.record_event(&AllocEvent::Queued { process: 1 });
        metrics.record_event(&AllocEvent::Placed {
            process: 2,
            start: 0,
            size: 10,
            from_queue: false,
        });

        let summary = metrics.finalize("TEST", &SegmentList::new(100), 1);
        assert_eq!(summary.successful_allocations, 1);
        assert_eq!(summary.allocation_failures, 2);
        assert_eq!(summary.dropped, 1);
    }

    #[test]
    fn snapshots_drive_time_averages() {
        let mut metrics = MetricsCollector::new(100, 1);
        metrics.record_event(&AllocEvent::Queued { process: 0 });
        metrics.record_event(&AllocEvent::Placed {
            process: 0,
            start: 0,
            size: 50,
            from_queue: true,
        });
        metrics.record_snapshot(&snapshot(1, 50, 1, 2, 3));
        metrics.record_snapshot(&snapshot(2, 100, 0, 0, 0));
        metrics.record_snapshot(&snapshot(3, 0, 1, 1, 1));
        metrics.record_snapshot(&snapshot(4, 50, 1, 0, 0));

        let summary = metrics.finalize("TEST", &SegmentList::new(100), 4);
        assert_eq!(summary.average_utilization, Some(50.0));
        assert_eq!(summary.peak_memory_usage, 100);
        assert_eq!(summary.peak_utilization(), 100.0);
        assert_eq!((summary.min_queue_length, summary.max_queue_length), (0, 2));
        assert_eq!(summary.total_waiting_time, 4);
        assert_eq!(summary.average_waiting_time, Some(4.0));
        assert_eq!(summary.average_fragmentation, Some(50.0));
        assert_eq!(summary.peak_fragmentation, Some(100));
        assert!((summary.average_hole_count.unwrap() - 0.75).abs() < 1e-9);
        assert_eq!(summary.successful_allocations, 1);
        assert_eq!(summary.deferred_allocations, 1);
    }

    #[test]
    fn empty_run_has_baseline_only() {
        let metrics = MetricsCollector::new(64, 0);
        let summary = metrics.finalize("TEST", &SegmentList::new(64), 0);
        assert_eq!(summary.success_rate, None);
        assert_eq!(summary.average_utilization, None);
        assert_eq!(summary.average_fragmentation, None);
        assert_eq!((summary.min_queue_length, summary.max_queue_length), (0, 0));

        let holes = summary.final_holes.unwrap();
        assert_eq!(
            (holes.count, holes.total, holes.smallest, holes.largest),
            (1, 64, 64, 64)
        );
        assert_eq!(holes.average, 64.0);
    }

    #[test]
    fn hole_stats_cover_min_max_average() {
        let stats = HoleStats::from_sizes(&[10, 30, 20]).unwrap();
        assert_eq!((stats.smallest, stats.largest, stats.total), (10, 30, 60));
        assert_eq!(stats.average, 20.0);
        assert_eq!(HoleStats::from_sizes(&[]), None);
    }

    #[test]
    fn report_mentions_policy() {
        let summary =
            MetricsCollector::new(100, 0).finalize("FIRST FIT", &SegmentList::new(100), 1);
        let text = summary.to_string();
        assert!(text.contains("FIRST FIT ALGORITHM METRICS"));
        assert!(text.contains("Final Number of Memory Holes: 1"));
    }
}
