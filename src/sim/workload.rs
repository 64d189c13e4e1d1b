use rand::prelude::*;

use super::process::ProcessSpec;
use crate::core::{Bytes, Ticks};

/// Shape of a synthetic workload: at each tick a process arrives with
/// probability `p_arrival`; it is short-lived with probability `p_short`.
#[derive(Debug, Clone)]
pub struct WorkloadParams {
    pub ticks: Ticks,
    pub p_arrival: f64,
    pub p_short: f64,
    pub short_ticks: Ticks,
    pub long_ticks: Ticks,
    pub min_size: Bytes,
    pub max_size: Bytes,
    pub seed: u64,
}

impl Default for WorkloadParams {
    fn default() -> Self {
        Self {
            ticks: 200,
            p_arrival: 0.4,
            p_short: 0.3,
            short_ticks: 2,
            long_ticks: 8,
            min_size: 8,
            max_size: 256,
            seed: 0,
        }
    }
}

pub fn bernoulli_processes(params: &WorkloadParams) -> Vec<ProcessSpec> {
    assert!(
        params.min_size > 0 && params.min_size <= params.max_size,
        "Invalid size range {}..={}",
        params.min_size,
        params.max_size
    );

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut processes = Vec::new();

    for t in 1..=params.ticks {
        if rng.random::<f64>() < params.p_arrival {
            let run_time = if rng.random::<f64>() < params.p_short {
                params.short_ticks
            } else {
                params.long_ticks
            };
            let size = rng.random_range(params.min_size..=params.max_size);

            processes.push(ProcessSpec::new(
                format!("P{}", processes.len() + 1),
                t,
                size,
                run_time.max(1),
            ));
        }
    }

    processes
}
