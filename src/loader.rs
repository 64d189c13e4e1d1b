//! Reads process lists: one `name arrival memory duration` record per line,
//! whitespace separated. Blank lines and `#` comments are skipped.

use std::{fs, path::Path};

use anyhow::{Context, Result, bail};

use crate::{
    core::{Bytes, Ticks},
    sim::ProcessSpec,
};

pub fn load_processes(path: impl AsRef<Path>) -> Result<Vec<ProcessSpec>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("could not read process file '{}'", path.display()))?;
    parse_processes(&text).with_context(|| format!("in '{}'", path.display()))
}

pub fn parse_processes(text: &str) -> Result<Vec<ProcessSpec>> {
    let mut processes = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let process = parse_line(line).with_context(|| format!("line {}: '{line}'", index + 1))?;
        processes.push(process);
    }

    Ok(processes)
}

fn parse_line(line: &str) -> Result<ProcessSpec> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [name, arrival, memory, duration] = fields[..] else {
        bail!("expected 4 fields, found {}", fields.len());
    };

    let arrival_time: Ticks = arrival
        .parse()
        .with_context(|| format!("bad arrival time '{arrival}'"))?;
    let memory_requirement: Bytes = memory
        .parse()
        .with_context(|| format!("bad memory requirement '{memory}'"))?;
    let execution_time_units: Ticks = duration
        .parse()
        .with_context(|| format!("bad execution time '{duration}'"))?;

    if memory_requirement == 0 {
        bail!("process {name} requests no memory");
    }
    if execution_time_units == 0 {
        bail!("process {name} has no execution time");
    }

    Ok(ProcessSpec::new(
        name,
        arrival_time,
        memory_requirement,
        execution_time_units,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_records_and_skips_blanks() {
        let text = "P1 0 40 3\n\n# comment\n  P2 1   60 2  \n";
        let processes = parse_processes(text).unwrap();
        assert_eq!(
            processes,
            vec![ProcessSpec::new("P1", 0, 40, 3), ProcessSpec::new("P2", 1, 60, 2)]
        );
    }

    #[test]
    fn reports_line_of_bad_record() {
        let err = parse_processes("P1 0 40 3\nP2 x 10 1\n").unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("line 2"), "{message}");
        assert!(message.contains("bad arrival time 'x'"), "{message}");
    }

    #[test]
    fn rejects_wrong_field_count_and_zero_values() {
        assert!(parse_processes("P1 0 40").is_err());
        assert!(parse_processes("P1 0 0 3").is_err());
        assert!(parse_processes("P1 0 10 0").is_err());
        assert!(parse_processes("P1 -1 10 1").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_processes("definitely/not/here.txt").is_err());
    }
}
