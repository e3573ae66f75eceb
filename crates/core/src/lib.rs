pub mod compare;
pub mod config;
pub mod parser;
pub mod ports;
pub mod rules;
pub mod source;
pub mod storage;
pub mod store;
pub mod table;
pub mod types;

use anyhow::Context;
use chrono::NaiveDate;

use crate::parser::ParseStats;
use crate::rules::AlertRecord;
use crate::store::Network;

/// Result of saving one report text into a network.
#[derive(Debug, Clone)]
pub struct Ingest {
    /// Replacement network value; the caller persists it as a unit.
    pub network: Network,
    /// Number of readings saved into the snapshot.
    pub saved: usize,
    pub stats: ParseStats,
    /// Day-over-day alerts against the nearest earlier date, when one exists.
    pub alerts: Option<AlertRecord>,
}

/// Parses a raw report blob and folds it into `network` under `date`.
///
/// Returns `Ok(None)`, leaving no trace, when the text parses to zero
/// readings; a report with nothing in it must never persist a snapshot.
/// A malformed `date` is a caller error and fails hard.
pub fn ingest(network: &Network, date: &str, text: &str, now: &str) -> anyhow::Result<Option<Ingest>> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .with_context(|| format!("invalid report date {date:?}, expected YYYY-MM-DD"))?;

    let parsed = parser::parse_report(text);
    let Some(next) = network.save_snapshot(date, &parsed.readings, now) else {
        return Ok(None);
    };

    let alerts = rules::analyze(&next, date, now);

    Ok(Some(Ingest {
        network: next,
        saved: parsed.readings.len(),
        stats: parsed.stats,
        alerts,
    }))
}
