use tracing::{debug, trace, warn};

use super::{process::ProcessSpec, queue::AdmissionQueue};
use crate::{
    core::{AllocEvent, Bytes, MemoryCore, SegmentView, Ticks},
    metrics::{MetricsCollector, Summary, TickSnapshot},
    policy::{BestFit, FirstFit, Policy, PolicyKind},
};

/// Everything observable about one tick: the memory map and metrics
/// snapshot taken before aging, and the events the tick produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub time: Ticks,
    pub segments: Vec<SegmentView>,
    pub snapshot: TickSnapshot,
    pub events: Vec<AllocEvent>,
}

pub struct Sim<P: Policy> {
    pub core: MemoryCore<P>,
    pub queue: AdmissionQueue,
    pub processes: Vec<ProcessSpec>,
    metrics: MetricsCollector,
    // Next unadmitted index into `processes`
    arrival_cursor: usize,
    simulation_time: Ticks,
    terminated: bool,
}

impl<P: Policy> Sim<P> {
    pub fn new(mut processes: Vec<ProcessSpec>, total_memory: Bytes) -> Self {
        assert!(total_memory > 0, "Simulation requires memory to allocate from");
        for process in &processes {
            assert!(
                process.memory_requirement > 0 && process.execution_time_units > 0,
                "Process {} must need memory and time",
                process.name
            );
        }
        // Stable: equal arrival times keep input order
        processes.sort_by_key(|p| p.arrival_time);

        Self {
            core: MemoryCore::new(total_memory),
            queue: AdmissionQueue::new(),
            metrics: MetricsCollector::new(total_memory, processes.len()),
            processes,
            arrival_cursor: 0,
            simulation_time: 0,
            terminated: false,
        }
    }

    pub fn step(&mut self) -> TickReport {
        let now = self.core.now();
        let mut events = Vec::new();

        self.drain_queue(&mut events);
        self.handle_arrivals(&mut events);

        let snapshot = TickSnapshot::capture(
            now,
            &self.core.memory,
            self.queue.len(),
            self.queue.waiting_time(now),
        );
        self.metrics.record_snapshot(&snapshot);
        let segments = self.core.memory.snapshot();
        trace!(
            t = now,
            used = snapshot.used_memory,
            holes = snapshot.hole_count,
            queued = snapshot.queue_len,
            "snapshot"
        );

        // Decided before aging: a process on its last tick still earns one
        // more tick so its freed hole shows up in the trace
        let active = !self.queue.is_empty() || self.core.memory.has_occupied();

        for process in self.core.tick() {
            debug!(t = now, process = %process.name, "completed");
            events.push(AllocEvent::Completed {
                process: process.id,
            });
        }

        for event in &events {
            self.metrics.record_event(event);
        }

        self.simulation_time = now;
        self.terminated = !active && self.arrival_cursor == self.processes.len();

        TickReport {
            time: now,
            segments,
            snapshot,
            events,
        }
    }

    // Drop unsatisfiable heads, then place heads until one does not fit
    fn drain_queue(&mut self, events: &mut Vec<AllocEvent>) {
        let total_memory = self.core.total_memory();

        while let Some(head) = self.queue.front() {
            if head.memory_requirement > total_memory {
                if let Some(process) = self.queue.pop_front() {
                    warn!(
                        process = %process.name,
                        size = process.memory_requirement,
                        "dropped from queue"
                    );
                    events.push(AllocEvent::Dropped {
                        process: process.id,
                        requirement: process.memory_requirement,
                    });
                }
                continue;
            }

            let Some(segment) = self.core.find_fit(head.memory_requirement) else {
                break;
            };
            let Some(process) = self.queue.pop_front() else {
                break;
            };

            let id = process.id;
            debug!(t = self.core.now(), process = %process.name, "placed from queue");
            let placement = self.core.place_at(segment, process);
            events.push(AllocEvent::Placed {
                process: id,
                start: placement.start,
                size: placement.size,
                from_queue: true,
            });
        }
    }

    fn handle_arrivals(&mut self, events: &mut Vec<AllocEvent>) {
        let now = self.core.now();
        let total_memory = self.core.total_memory();

        // Contiguous, since processes are sorted
        while let Some(spec) = self.processes.get(self.arrival_cursor) {
            if spec.arrival_time > now {
                break;
            }

            let process = spec.instantiate(self.arrival_cursor);
            self.arrival_cursor += 1;

            if process.memory_requirement > total_memory {
                warn!(
                    process = %process.name,
                    size = process.memory_requirement,
                    total_memory,
                    "can never fit, dropped"
                );
                events.push(AllocEvent::Dropped {
                    process: process.id,
                    requirement: process.memory_requirement,
                });
                continue;
            }

            let id = process.id;
            match self.core.try_place(process) {
                Ok(placement) => {
                    debug!(t = now, process = id, start = placement.start, "placed on arrival");
                    events.push(AllocEvent::Placed {
                        process: id,
                        start: placement.start,
                        size: placement.size,
                        from_queue: false,
                    });
                }
                Err(process) => {
                    debug!(t = now, process = %process.name, "no fit, queued");
                    events.push(AllocEvent::Queued {
                        process: process.id,
                    });
                    self.queue.push_back(process);
                }
            }
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn run_to_completion(&mut self, mut on_tick: impl FnMut(&TickReport)) {
        while !self.terminated {
            let report = self.step();
            on_tick(&report);
        }
    }

    pub fn summary(&self) -> Summary {
        self.metrics
            .finalize(P::NAME, &self.core.memory, self.simulation_time)
    }
}

/// Run `processes` to completion under the policy chosen at runtime.
pub fn run_with_policy(
    policy: PolicyKind,
    processes: Vec<ProcessSpec>,
    total_memory: Bytes,
    on_tick: impl FnMut(&TickReport),
) -> Summary {
    match policy {
        PolicyKind::FirstFit => run::<FirstFit>(processes, total_memory, on_tick),
        PolicyKind::BestFit => run::<BestFit>(processes, total_memory, on_tick),
    }
}

fn run<P: Policy>(
    processes: Vec<ProcessSpec>,
    total_memory: Bytes,
    on_tick: impl FnMut(&TickReport),
) -> Summary {
    let mut sim = Sim::<P>::new(processes, total_memory);
    sim.run_to_completion(on_tick);
    sim.summary()
}
