pub mod config;
pub mod core;
pub mod loader;
pub mod metrics;
pub mod policy;
pub mod sim;
pub mod trace;

pub use config::{ConfigError, SimConfig};
pub use crate::core::{AllocEvent, Process, Segment, SegmentList};
pub use metrics::{MetricsCollector, Summary};
pub use policy::{BestFit, FirstFit, Policy, PolicyKind};
pub use sim::{ProcessSpec, Sim, TickReport, run_with_policy};
