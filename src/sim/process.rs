use crate::core::{Bytes, Process, ProcessId, Ticks};

/// One input record, before the simulation assigns it an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    pub name: String,
    pub arrival_time: Ticks,
    pub memory_requirement: Bytes,
    pub execution_time_units: Ticks,
}

impl ProcessSpec {
    pub fn new(
        name: impl Into<String>,
        arrival_time: Ticks,
        memory_requirement: Bytes,
        execution_time_units: Ticks,
    ) -> Self {
        Self {
            name: name.into(),
            arrival_time,
            memory_requirement,
            execution_time_units,
        }
    }

    pub fn instantiate(&self, id: ProcessId) -> Process {
        Process::new(
            id,
            self.name.clone(),
            self.arrival_time,
            self.memory_requirement,
            self.execution_time_units,
        )
    }
}
