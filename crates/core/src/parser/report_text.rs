use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{Status, VlanReading, GLYPHS};

// One documented grammar for the whole line:
//   <status-glyph> [sep] V<digits> [sep] <digits> MB [sep] <name-text>
// where [sep] is any mix of spaces, hyphens and colons. The status character
// class is generated from the glyph acceptance table so the two never drift.
static RE_LINE: Lazy<Regex> = Lazy::new(|| {
    let glyphs: String = GLYPHS.iter().map(|&(glyph, _)| glyph).collect();
    Regex::new(&format!(
        r"(?i)([{glyphs}])[\s\-:]*V(\d+)[\s\-:]*(\d+)\s*MB[\s\-]*(.*)"
    ))
    .expect("valid regex")
});

/// Attempts to read one VLAN reading out of a single trimmed line. `None`
/// covers both non-matching lines and matched lines whose numeric fields do
/// not fit `u32`; either way the line is skipped, never an error.
pub fn parse_line(line: &str) -> Option<VlanReading> {
    let cap = RE_LINE.captures(line)?;

    let glyph = cap.get(1)?.as_str().chars().next()?;
    let status = Status::from_glyph(glyph)?;
    let number: u32 = cap.get(2)?.as_str().parse().ok()?;
    let megabytes: u32 = cap.get(3)?.as_str().parse().ok()?;
    let name = cap.get(4).map_or("", |m| m.as_str()).trim().to_string();

    Some(VlanReading {
        number,
        name,
        status,
        megabytes,
    })
}
