use crate::core::{Bytes, ProcessId};

/// Outcome of one allocation step for one process. Each event is emitted
/// exactly once and is the only thing the metrics collector counts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocEvent {
    Placed {
        process: ProcessId,
        start: Bytes,
        size: Bytes,
        // Placed by the drain pass rather than on arrival
        from_queue: bool,
    },
    // No hole large enough this tick; retried by later drain passes
    Queued {
        process: ProcessId,
    },
    // Larger than total memory, never retried
    Dropped {
        process: ProcessId,
        requirement: Bytes,
    },
    Completed {
        process: ProcessId,
    },
}

impl AllocEvent {
    pub fn process(&self) -> ProcessId {
        match self {
            Self::Placed { process, .. }
            | Self::Queued { process }
            | Self::Dropped { process, .. }
            | Self::Completed { process } => *process,
        }
    }
}
