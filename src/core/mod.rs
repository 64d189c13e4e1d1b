pub mod driver;
pub mod event;
pub mod observer;
pub mod state;

pub use driver::{MemoryCore, Placement};
pub use event::AllocEvent;
pub use state::{
    Bytes, Process, ProcessId, Segment, SegmentId, SegmentLabel, SegmentList, SegmentView, Ticks,
};
