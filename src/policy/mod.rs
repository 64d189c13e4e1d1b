pub mod best_fit;
pub mod first_fit;

use std::{fmt, str::FromStr};

use crate::core::{Bytes, SegmentId, SegmentList};
pub use best_fit::BestFit;
pub use first_fit::FirstFit;

/// A placement policy: picks the hole a request of `requirement` bytes goes
/// into. Must be total and deterministic; `None` means nothing fits now.
pub trait Policy {
    const NAME: &'static str;

    fn init() -> Self;

    fn find_fit(&self, memory: &SegmentList, requirement: Bytes) -> Option<SegmentId>;
}

/// Runtime policy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    FirstFit,
    BestFit,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 2] = [PolicyKind::FirstFit, PolicyKind::BestFit];

    pub fn name(self) -> &'static str {
        match self {
            Self::FirstFit => FirstFit::NAME,
            Self::BestFit => BestFit::NAME,
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPolicy(pub String);

impl fmt::Display for UnknownPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown placement policy '{}'", self.0)
    }
}

impl std::error::Error for UnknownPolicy {}

impl FromStr for PolicyKind {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first-fit" | "firstfit" | "first" | "ff" | "f" | "-f" => Ok(Self::FirstFit),
            "best-fit" | "bestfit" | "best" | "bf" | "b" | "-b" => Ok(Self::BestFit),
            _ => Err(UnknownPolicy(s.to_string())),
        }
    }
}


#[cfg(test)]
pub(crate) mod tests_support {
    use crate::core::{Bytes, Process, SegmentList};

    const SEPARATOR: Bytes = 10;

    /// Memory whose holes have the given sizes in address order, each pair
    /// kept apart by a 10-byte long-running process.
    pub fn fragmented(holes: &[Bytes]) -> SegmentList {
        let total = holes.iter().sum::<Bytes>() + SEPARATOR * (holes.len() as Bytes - 1);
        let mut memory = SegmentList::new(total);

        for (i, &size) in holes.iter().enumerate() {
            let tail = memory.holes().last().unwrap().0;
            memory.place(tail, Process::new(2 * i, format!("H{i}"), 0, size, 1));
            if i + 1 < holes.len() {
                let tail = memory.holes().last().unwrap().0;
                memory.place(tail, Process::new(2 * i + 1, format!("S{i}"), 0, SEPARATOR, 100));
            }
        }

        memory.tick();
        memory
    }
}
