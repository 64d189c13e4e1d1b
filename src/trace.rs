use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use tracing::warn;

use crate::{
    core::{Bytes, Ticks},
    metrics::Summary,
    policy::PolicyKind,
    sim::{ProcessSpec, TickReport, run_with_policy},
};

/// Writes one line per tick: `t [start label size] [start label size] ...`
pub struct TraceWriter<W: Write> {
    out: W,
    lines: u64,
}

impl<W: Write> TraceWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, lines: 0 }
    }

    pub fn write_tick(&mut self, report: &TickReport) -> io::Result<()> {
        write!(self.out, "{}", report.time)?;
        for segment in &report.segments {
            write!(
                self.out,
                " [{} {} {}]",
                segment.start, segment.label, segment.size
            )?;
        }
        writeln!(self.out)?;
        self.lines += 1;
        Ok(())
    }

    pub fn lines(&self) -> Ticks {
        self.lines
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Create the trace file at `path`. A file that cannot be created is
/// logged and yields `None`; the simulation then runs without a trace.
pub fn open_trace(path: &Path) -> Option<TraceWriter<BufWriter<File>>> {
    match File::create(path) {
        Ok(file) => Some(TraceWriter::new(BufWriter::new(file))),
        Err(err) => {
            warn!(
                path = %path.display(),
                %err,
                "output file could not be created, simulating without trace"
            );
            None
        }
    }
}

/// Result of a run with an optional trace sink.
pub struct TracedRun<W> {
    pub summary: Summary,
    /// Lines written before the sink failed, or all of them.
    pub lines: Ticks,
    /// `None` without a sink. Otherwise the flushed sink, or the first
    /// write or flush error.
    pub trace: Option<io::Result<W>>,
}

/// Run to completion, writing each tick to `writer` if there is one.
///
/// Sink errors never stop the simulation. After the first failed write no
/// further lines are attempted, and the error is handed back in
/// [`TracedRun::trace`] next to the complete summary.
pub fn run_traced<W: Write>(
    policy: PolicyKind,
    processes: Vec<ProcessSpec>,
    total_memory: Bytes,
    mut writer: Option<TraceWriter<W>>,
    mut on_tick: impl FnMut(&TickReport),
) -> TracedRun<W> {
    let mut write_error = None;
    let summary = run_with_policy(policy, processes, total_memory, |report| {
        on_tick(report);
        if write_error.is_some() {
            return;
        }
        if let Some(writer) = writer.as_mut() {
            if let Err(err) = writer.write_tick(report) {
                warn!(t = report.time, %err, "trace write failed, no further lines");
                write_error = Some(err);
            }
        }
    });

    let lines = writer.as_ref().map_or(0, TraceWriter::lines);
    let trace = writer.map(|writer| match write_error {
        Some(err) => Err(err),
        None => writer.finish(),
    });

    TracedRun {
        summary,
        lines,
        trace,
    }
}
