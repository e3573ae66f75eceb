mod report_text;

pub use report_text::parse_line;

use crate::types::VlanReading;

/// Line-level accounting for one parse run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub total_lines: usize,
    pub matched: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedReport {
    pub readings: Vec<VlanReading>,
    pub stats: ParseStats,
}

impl ParsedReport {
    /// A report "succeeded" when at least one line matched. Callers must not
    /// persist a snapshot from an unsuccessful parse.
    pub fn success(&self) -> bool {
        self.stats.matched > 0
    }
}

/// Extracts VLAN readings from a raw report blob, preserving input order.
///
/// Headers, separators, placeholders and malformed fragments are skipped
/// silently; that skip is the contract, not an accident. Lines shorter than
/// 5 characters after trimming are dropped before matching. A VLAN number may
/// repeat within one blob; the parser does not deduplicate.
pub fn parse_report(text: &str) -> ParsedReport {
    let mut total_lines = 0usize;
    let mut matched = 0usize;

    let readings: Vec<VlanReading> = text
        .lines()
        .inspect(|_| total_lines += 1)
        .map(str::trim)
        .filter(|line| line.chars().count() >= 5)
        .filter_map(parse_line)
        .inspect(|_| matched += 1)
        .collect();

    ParsedReport {
        readings,
        stats: ParseStats {
            total_lines,
            matched,
        },
    }
}
