pub mod driver;
pub mod process;
pub mod queue;
pub mod workload;

pub use driver::{Sim, TickReport, run_with_policy};
pub use process::ProcessSpec;
pub use queue::AdmissionQueue;
pub use workload::{WorkloadParams, bernoulli_processes};
