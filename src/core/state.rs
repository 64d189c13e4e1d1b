use slotmap::{SlotMap, new_key_type};
use std::fmt;

// Index into the sorted input
pub type ProcessId = usize;
pub type Ticks = u64;
pub type Bytes = u64;
new_key_type! {
    pub struct SegmentId;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pub id: ProcessId,
    pub name: String,
    pub arrival_time: Ticks,
    pub memory_requirement: Bytes,
    pub execution_time_units: Ticks,
    pub remaining_time_units: Ticks,
}

impl Process {
    pub fn new(
        id: ProcessId,
        name: impl Into<String>,
        arrival_time: Ticks,
        memory_requirement: Bytes,
        execution_time_units: Ticks,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            arrival_time,
            memory_requirement,
            execution_time_units,
            remaining_time_units: execution_time_units,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Hole { size: Bytes },
    Occupied(Process),
}

impl Segment {
    pub fn size(&self) -> Bytes {
        match self {
            Self::Hole { size } => *size,
            Self::Occupied(process) => process.memory_requirement,
        }
    }

    pub fn is_hole(&self) -> bool {
        matches!(self, Self::Hole { .. })
    }

    pub fn process(&self) -> Option<&Process> {
        match self {
            Self::Hole { .. } => None,
            Self::Occupied(process) => Some(process),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentLabel {
    Hole,
    Process(String),
}

impl fmt::Display for SegmentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hole => f.write_str("hole"),
            Self::Process(name) => f.write_str(name),
        }
    }
}

/// One `(start, label, size)` entry of a tick's memory map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentView {
    pub start: Bytes,
    pub label: SegmentLabel,
    pub size: Bytes,
}

#[derive(Debug)]
struct Node {
    segment: Segment,
    prev: Option<SegmentId>,
    next: Option<SegmentId>,
}

/// Physical memory as an address-ordered, doubly-linked list of segments.
///
/// Links live in a `SlotMap` so splitting a hole and absorbing a neighbour
/// are O(1); fit searches walk the list from `head` in address order.
#[derive(Debug)]
pub struct SegmentList {
    total_memory: Bytes,
    nodes: SlotMap<SegmentId, Node>,
    head: Option<SegmentId>,
}

impl SegmentList {
    pub fn new(total_memory: Bytes) -> Self {
        let mut nodes = SlotMap::with_key();
        let head = nodes.insert(Node {
            segment: Segment::Hole { size: total_memory },
            prev: None,
            next: None,
        });

        Self {
            total_memory,
            nodes,
            head: Some(head),
        }
    }

    pub fn total_memory(&self) -> Bytes {
        self.total_memory
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.nodes.get(id).map(|node| &node.segment)
    }

    /// Segments in address order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    pub fn holes(&self) -> impl Iterator<Item = (SegmentId, Bytes)> + '_ {
        self.iter().filter_map(|(id, segment)| match segment {
            Segment::Hole { size } => Some((id, *size)),
            Segment::Occupied(_) => None,
        })
    }

    pub fn processes(&self) -> impl Iterator<Item = &Process> + '_ {
        self.iter().filter_map(|(_, segment)| segment.process())
    }

    pub fn start_of(&self, id: SegmentId) -> Option<Bytes> {
        let mut start = 0;
        for (current, segment) in self.iter() {
            if current == id {
                return Some(start);
            }
            start += segment.size();
        }
        None
    }

    pub fn used_memory(&self) -> Bytes {
        self.processes().map(|p| p.memory_requirement).sum()
    }

    pub fn hole_count(&self) -> usize {
        self.holes().count()
    }

    pub fn free_memory(&self) -> Bytes {
        self.holes().map(|(_, size)| size).sum()
    }

    pub fn hole_sizes(&self) -> Vec<Bytes> {
        self.holes().map(|(_, size)| size).collect()
    }

    pub fn has_occupied(&self) -> bool {
        self.processes().next().is_some()
    }

    /// Put `process` into the hole `id`, splitting off the leftover as a new
    /// hole directly after it.
    pub fn place(&mut self, id: SegmentId, process: Process) {
        let requirement = process.memory_requirement;
        let node = self.nodes.get_mut(id).expect("Unknown segment");
        let hole_size = match node.segment {
            Segment::Hole { size } => size,
            Segment::Occupied(ref running) => {
                panic!(
                    "Segment already occupied by {}, cannot place {}",
                    running.name, process.name
                )
            }
        };
        assert!(
            requirement <= hole_size,
            "Process {} needs {requirement} but hole has {hole_size}",
            process.name
        );

        node.segment = Segment::Occupied(process);
        let leftover = hole_size - requirement;
        if leftover > 0 {
            self.insert_after(id, Segment::Hole { size: leftover });
        }

        self.merge_adjacent_holes();
    }

    fn insert_after(&mut self, id: SegmentId, segment: Segment) -> SegmentId {
        let next = self.nodes[id].next;
        let new_id = self.nodes.insert(Node {
            segment,
            prev: Some(id),
            next,
        });
        self.nodes[id].next = Some(new_id);
        if let Some(next) = next {
            self.nodes[next].prev = Some(new_id);
        }
        new_id
    }

    // Caller must re-link `prev` itself; this only detaches `id`
    fn unlink(&mut self, id: SegmentId) -> Segment {
        let node = self.nodes.remove(id).expect("Unknown segment");
        match node.prev {
            Some(prev) => self.nodes[prev].next = node.next,
            None => self.head = node.next,
        }
        if let Some(next) = node.next {
            self.nodes[next].prev = node.prev;
        }
        node.segment
    }

    /// Age every running process by one tick. Finished processes turn into
    /// holes of the same size and are returned in address order.
    pub fn tick(&mut self) -> Vec<Process> {
        let mut completed = Vec::new();
        let mut cursor = self.head;

        while let Some(id) = cursor {
            let node = &mut self.nodes[id];
            cursor = node.next;

            let finished = match node.segment {
                Segment::Hole { .. } => false,
                Segment::Occupied(ref mut process) => {
                    process.remaining_time_units = process.remaining_time_units.saturating_sub(1);
                    process.remaining_time_units == 0
                }
            };

            if finished {
                let size = node.segment.size();
                let segment = std::mem::replace(&mut node.segment, Segment::Hole { size });
                if let Segment::Occupied(process) = segment {
                    completed.push(process);
                }
            }
        }

        completed
    }

    /// Coalesce every run of adjacent holes into a single hole. Returns the
    /// number of holes absorbed.
    pub fn merge_adjacent_holes(&mut self) -> usize {
        let mut merged = 0;
        let mut cursor = self.head;

        while let Some(id) = cursor {
            let next = self.nodes[id].next;
            let absorb = match next {
                Some(next) => {
                    self.nodes[id].segment.is_hole() && self.nodes[next].segment.is_hole()
                }
                None => false,
            };

            if let (true, Some(next)) = (absorb, next) {
                let extra = self.unlink(next).size();
                if let Segment::Hole { size } = &mut self.nodes[id].segment {
                    *size += extra;
                }
                merged += 1;
                // Stay on `id`: the new neighbour may be a hole too
            } else {
                cursor = next;
            }
        }

        merged
    }

    pub fn snapshot(&self) -> Vec<SegmentView> {
        let mut start = 0;
        self.iter()
            .map(|(_, segment)| {
                let view = SegmentView {
                    start,
                    label: match segment {
                        Segment::Hole { .. } => SegmentLabel::Hole,
                        Segment::Occupied(process) => SegmentLabel::Process(process.name.clone()),
                    },
                    size: segment.size(),
                };
                start += view.size;
                view
            })
            .collect()
    }
}

pub struct Iter<'a> {
    list: &'a SegmentList,
    cursor: Option<SegmentId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (SegmentId, &'a Segment);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let node = &self.list.nodes[id];
        self.cursor = node.next;
        Some((id, &node.segment))
    }
}
