//! Observer side of the marker protocol.
//!
//! An external observer watches the device's output byte stream — it
//! shares no memory with the firmware, only the ordered, lossless
//! sequence of printed characters, each stamped with the cycle at which
//! it appeared. Control lines containing `@@START_<PHASE>` or
//! `@@END_<PHASE>` delimit timed phases; every other line is
//! human-readable output and is not parsed.
//!
//! After the run, each phase's duration is `END − START`, defined only
//! when both markers were seen. A missing marker pair is a reporting gap,
//! not a failure: the phase is shown as unmeasured. A duplicate marker
//! silently overwrites the earlier timestamp — tolerated last-write-wins
//! behavior, kept deliberately.

use imc_chip::marker::{Phase, END_PREFIX, START_PREFIX};
use std::collections::HashMap;

/// Incremental scanner over a cycle-stamped byte stream.
#[derive(Debug, Default)]
pub struct MarkerScanner {
    line: String,
    starts: HashMap<String, u64>,
    ends: HashMap<String, u64>,
}

impl MarkerScanner {
    /// Create an empty scanner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte observed at `cycle`. Lines reset on every newline.
    pub fn push(&mut self, byte: u8, cycle: u64) {
        if byte == b'\n' {
            if let Some(pos) = self.line.find(START_PREFIX) {
                let name = self.line[pos + START_PREFIX.len()..].to_string();
                self.starts.insert(name, cycle);
            } else if let Some(pos) = self.line.find(END_PREFIX) {
                let name = self.line[pos + END_PREFIX.len()..].to_string();
                self.ends.insert(name, cycle);
            }
            self.line.clear();
        } else {
            self.line.push(char::from(byte));
        }
    }

    /// Feed an entire `(cycle, byte)` stream.
    pub fn scan(&mut self, stream: &[(u64, u8)]) {
        for &(cycle, byte) in stream {
            self.push(byte, cycle);
        }
    }

    /// Cycle at which a phase's start marker was observed.
    #[must_use]
    pub fn start(&self, name: &str) -> Option<u64> {
        self.starts.get(name).copied()
    }

    /// Cycle at which a phase's end marker was observed.
    #[must_use]
    pub fn end(&self, name: &str) -> Option<u64> {
        self.ends.get(name).copied()
    }
}

/// Per-phase durations reconstructed from a scanned stream.
#[derive(Debug, Clone)]
pub struct PhaseReport {
    durations: Vec<(Phase, Option<u64>)>,
}

impl PhaseReport {
    /// Compute durations for the fixed phase set from a finished scan.
    #[must_use]
    pub fn from_scanner(scanner: &MarkerScanner) -> Self {
        let durations = Phase::ALL
            .iter()
            .map(|&phase| {
                let d = match (scanner.start(phase.name()), scanner.end(phase.name())) {
                    (Some(start), Some(end)) => Some(end.saturating_sub(start)),
                    _ => None,
                };
                (phase, d)
            })
            .collect();
        Self { durations }
    }

    /// Duration of one phase; `None` if either marker was never observed.
    #[must_use]
    pub fn duration(&self, phase: Phase) -> Option<u64> {
        self.durations
            .iter()
            .find(|(p, _)| *p == phase)
            .and_then(|&(_, d)| d)
    }

    /// Render the breakdown table.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("============================================\n");
        out.push_str("Performance Breakdown (Actual Cycles):\n");
        out.push_str("============================================\n");
        for &(phase, duration) in &self.durations {
            if phase == Phase::Total {
                out.push_str("--------------------------------------------\n");
            }
            match duration {
                Some(cycles) => {
                    out.push_str(&format!("{:<20} {cycles:>12} cycles\n", phase.label()));
                }
                None => {
                    out.push_str(&format!("{:<20} {:>12} (no marker pair)\n", phase.label(), 0));
                }
            }
        }
        out.push_str("============================================\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp(text: &str, cycles: &[u64]) -> Vec<(u64, u8)> {
        // One cycle stamp per line; every byte of a line carries the same
        // stamp, which matches how a line's terminating newline is timed.
        let mut stream = Vec::new();
        for (line, &cycle) in text.lines().zip(cycles) {
            for b in line.bytes() {
                stream.push((cycle, b));
            }
            stream.push((cycle, b'\n'));
        }
        stream
    }

    #[test]
    fn reconstructs_duration_from_marker_pair() {
        let mut scanner = MarkerScanner::new();
        scanner.scan(&stamp("@@START_LAYER1\n@@END_LAYER1\n", &[100, 340]));
        let report = PhaseReport::from_scanner(&scanner);
        assert_eq!(report.duration(Phase::Layer1), Some(240));
    }

    #[test]
    fn missing_end_marker_is_unmeasured_not_an_error() {
        let mut scanner = MarkerScanner::new();
        scanner.scan(&stamp("@@START_LAYER1\nordinary output\n", &[100, 200]));
        let report = PhaseReport::from_scanner(&scanner);
        assert_eq!(report.duration(Phase::Layer1), None);
        assert!(report.render().contains("(no marker pair)"));
    }

    #[test]
    fn ordinary_lines_are_not_parsed() {
        let mut scanner = MarkerScanner::new();
        scanner.scan(&stamp(
            "Image | Label | Cycles\n  0   |   7   | 1234\n",
            &[10, 20],
        ));
        let report = PhaseReport::from_scanner(&scanner);
        for phase in Phase::ALL {
            assert_eq!(report.duration(phase), None);
        }
    }

    #[test]
    fn duplicate_marker_last_write_wins() {
        // Tolerated quirk: a re-emitted marker overwrites the first.
        let mut scanner = MarkerScanner::new();
        scanner.scan(&stamp(
            "@@START_RELU\n@@START_RELU\n@@END_RELU\n",
            &[50, 90, 100],
        ));
        let report = PhaseReport::from_scanner(&scanner);
        assert_eq!(report.duration(Phase::Relu), Some(10));
    }

    #[test]
    fn marker_split_across_pushes() {
        // The scanner is byte-at-a-time; a marker arriving in fragments
        // must still be recognized at its newline.
        let mut scanner = MarkerScanner::new();
        for (i, b) in "@@START_TOTAL".bytes().enumerate() {
            scanner.push(b, i as u64);
        }
        scanner.push(b'\n', 77);
        assert_eq!(scanner.start("TOTAL"), Some(77));
    }

    #[test]
    fn marker_embedded_mid_line_is_recognized() {
        // The substring match tolerates a prefix before the tag.
        let mut scanner = MarkerScanner::new();
        scanner.scan(&stamp("log: @@START_ARGMAX\n@@END_ARGMAX\n", &[5, 9]));
        let report = PhaseReport::from_scanner(&scanner);
        assert_eq!(report.duration(Phase::Argmax), Some(4));
    }

    #[test]
    fn unmeasured_phase_renders_as_zero() {
        let scanner = MarkerScanner::new();
        let report = PhaseReport::from_scanner(&scanner);
        let rendered = report.render();
        assert!(rendered.contains("TOTAL:"));
        assert!(rendered.contains("Performance Breakdown"));
    }
}
