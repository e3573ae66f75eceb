use std::path::PathBuf;

use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::Status;

/// Feed categories a report source publishes, one message per color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Purple,
    Green,
    Orange,
    Red,
}

pub const ALL_COLORS: [Color; 4] = [Color::Purple, Color::Green, Color::Orange, Color::Red];

impl Color {
    pub fn as_str(self) -> &'static str {
        match self {
            Color::Purple => "purple",
            Color::Green => "green",
            Color::Orange => "orange",
            Color::Red => "red",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Color::Purple => "Purple",
            Color::Green => "Green",
            Color::Orange => "Orange",
            Color::Red => "Red",
        }
    }

    pub fn status(self) -> Status {
        match self {
            Color::Purple => Status::Purple,
            Color::Green => Status::Green,
            Color::Orange => Status::Orange,
            Color::Red => Status::Down,
        }
    }
}

/// Where raw category messages come from. Implementations are expected to be
/// thin; all text normalization lives in [`assemble_report_text`].
pub trait ReportSource {
    /// `Ok(None)` means the source has no message for this category.
    fn fetch_message(&self, network: &str, color: Color) -> anyhow::Result<Option<String>>;
}

/// Messages that mean "no data yet", not a report.
const PLACEHOLDERS: &[&str] = &["لا يوجد تقرير", "جاري التحميل"];

static RE_SECTION_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(Purple|Green|Orange|Red)\s*\(\d+\)\s*\|").expect("valid regex"));

static RE_FEED_VLAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)V(\d+)[:\s]+(\d+)\s*MB\s*[-\s]+(.+)").expect("valid regex"));

/// Pulls every category message for `network` and assembles one parser-ready
/// text blob. A category that errors, is missing, or only carries a
/// placeholder is skipped; the remaining categories still contribute. The
/// result may be empty, which callers treat as "nothing to parse".
pub fn assemble_report_text(source: &dyn ReportSource, network: &str) -> String {
    let mut payload = String::new();

    for color in ALL_COLORS {
        let message = match source.fetch_message(network, color) {
            Ok(Some(message)) => message,
            Ok(None) | Err(_) => continue,
        };
        if PLACEHOLDERS.iter().any(|p| message.contains(p)) {
            continue;
        }
        let clean = message.trim();
        if clean.is_empty() {
            continue;
        }

        if clean.contains("Router:") && clean.contains("Time:") {
            // pipe-delimited feed layout; rewrite into standard glyph lines
            if let Some(lines) = reformat_feed_section(clean, color) {
                payload.push_str(&lines);
                payload.push('\n');
            }
        } else {
            payload.push_str(clean);
            payload.push('\n');
        }
    }

    payload.trim().to_string()
}

/// Extracts this color's `Color (N) | V.. | V..` section from a feed message
/// and rewrites each entry as a standard report line.
fn reformat_feed_section(text: &str, color: Color) -> Option<String> {
    let mut start = None;
    let mut end = text.len();
    for cap in RE_SECTION_HEADER.captures_iter(text) {
        let header = cap.get(0)?;
        match start {
            None => {
                if cap[1].eq_ignore_ascii_case(color.title()) {
                    start = Some(header.end());
                }
            }
            Some(_) => {
                end = header.start();
                break;
            }
        }
    }
    let body = &text[start?..end];

    let lines: Vec<String> = body
        .split('|')
        .filter_map(|piece| {
            let cap = RE_FEED_VLAN.captures(piece.trim())?;
            Some(format!(
                "{} V{}: {} MB - {}",
                color.status().glyph(),
                &cap[1],
                &cap[2],
                cap[3].trim()
            ))
        })
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Directory-backed source: one `<root>/<network>/<color>.txt` file per
/// category. Missing files are "no message".
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ReportSource for FileSource {
    fn fetch_message(&self, network: &str, color: Color) -> anyhow::Result<Option<String>> {
        let path = self.root.join(network).join(format!("{}.txt", color.as_str()));
        if !path.exists() {
            return Ok(None);
        }
        let text =
            std::fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        Ok(Some(text))
    }
}
