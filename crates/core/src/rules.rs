use serde::{Deserialize, Serialize};

use crate::ports::port_label;
use crate::store::{DayReading, Network, VlanHistory};
use crate::types::{AlertItem, AlertKind, SizeTier};

/// Day-over-day alert report for one saved date, bucketed by severity.
/// Bucket order preserves VLAN iteration order; no secondary sort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    pub date: String,
    pub compared_with: String,
    pub generated_at: String,
    pub urgent: Vec<AlertItem>,
    pub warning: Vec<AlertItem>,
    pub info: Vec<AlertItem>,
}

impl AlertRecord {
    pub fn is_empty(&self) -> bool {
        self.urgent.is_empty() && self.warning.is_empty() && self.info.is_empty()
    }

    pub fn total(&self) -> usize {
        self.urgent.len() + self.warning.len() + self.info.len()
    }

    pub fn to_markdown(&self) -> String {
        let mut s = String::new();
        s.push_str("# vlanwatch alerts\n\n");
        s.push_str(&format!("- date: `{}`\n", self.date));
        s.push_str(&format!("- compared_with: `{}`\n", self.compared_with));
        s.push_str(&format!("- generated_at: `{}`\n", self.generated_at));
        s.push('\n');

        for (title, bucket) in [
            ("Urgent", &self.urgent),
            ("Warning", &self.warning),
            ("Info", &self.info),
        ] {
            s.push_str(&format!("## {title}\n\n"));
            if bucket.is_empty() {
                s.push_str("- (none)\n\n");
                continue;
            }
            for item in bucket {
                s.push_str(&format!("### V{} {}\n", item.vlan, item.name));
                s.push_str(&format!("- kind: `{}`\n", item.kind.as_str()));
                s.push_str(&format!("- port: {}\n", item.port));
                s.push_str(&format!(
                    "- megabytes: `{}` \u{2192} `{}` ({}%)\n",
                    item.from, item.to, item.percent
                ));
                if let Some(drop) = item.drop_amount {
                    s.push_str(&format!("- drop_amount: `{drop}`\n"));
                }
                if let Some(increase) = item.increase_amount {
                    s.push_str(&format!("- increase_amount: `{increase}`\n"));
                }
                s.push('\n');
            }
        }

        s
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    Urgent,
    Warning,
    Info,
}

/// Everything a classification rule gets to look at for one VLAN.
struct DayPair<'a> {
    vlan: &'a VlanHistory,
    prior: &'a DayReading,
    curr: &'a DayReading,
    delta: i64,
    pct: f64,
    tier: SizeTier,
}

type Rule = fn(&DayPair) -> Option<(Bucket, AlertItem)>;

/// Priority order is the contract: the first matching rule fires and the rest
/// are never consulted, so a VLAN yields at most one alert item per analysis.
const RULES: &[Rule] = &[new_outage, big_drop, medium_drop, big_increase];

/// Compares `saved_date` against the nearest earlier known date and classifies
/// every VLAN with readings on both days. `None` when there is nothing to
/// compare against (fewer than two dates, or `saved_date` is the earliest);
/// that is a normal outcome, not an error.
pub fn analyze(network: &Network, saved_date: &str, generated_at: &str) -> Option<AlertRecord> {
    let dates = &network.dates;
    if dates.len() < 2 {
        return None;
    }
    let index = dates.iter().position(|d| d == saved_date)?;
    if index == 0 {
        return None;
    }
    let compared_with = dates[index - 1].clone();

    let mut record = AlertRecord {
        date: saved_date.to_string(),
        compared_with: compared_with.clone(),
        generated_at: generated_at.to_string(),
        urgent: Vec::new(),
        warning: Vec::new(),
        info: Vec::new(),
    };

    for vlan in network.vlans.values() {
        let (Some(curr), Some(prior)) = (
            vlan.days.get(saved_date),
            vlan.days.get(compared_with.as_str()),
        ) else {
            continue;
        };

        let delta = i64::from(curr.megabytes) - i64::from(prior.megabytes);
        let pct = delta.unsigned_abs() as f64 / f64::from(prior.megabytes.max(1)) * 100.0;
        let pair = DayPair {
            vlan,
            prior,
            curr,
            delta,
            pct,
            tier: SizeTier::of(prior.megabytes),
        };

        if let Some((bucket, item)) = RULES.iter().find_map(|rule| rule(&pair)) {
            match bucket {
                Bucket::Urgent => record.urgent.push(item),
                Bucket::Warning => record.warning.push(item),
                Bucket::Info => record.info.push(item),
            }
        }
    }

    Some(record)
}

fn base_item(pair: &DayPair, kind: AlertKind) -> AlertItem {
    AlertItem {
        kind,
        vlan: pair.vlan.number,
        name: pair.vlan.name.clone(),
        port: port_label(&pair.vlan.name),
        from: pair.prior.megabytes,
        to: pair.curr.megabytes,
        percent: pair.pct.round() as u32,
        size: pair.tier,
        original_size: pair.prior.megabytes,
        drop_amount: None,
        increase_amount: None,
    }
}

/// Rule 1: transition into the down status. Severity follows the size tier;
/// percent is pinned at 100 because a transition to no service counts as
/// total loss whatever the raw delta was.
fn new_outage(pair: &DayPair) -> Option<(Bucket, AlertItem)> {
    if !pair.curr.status.is_down() || pair.prior.status.is_down() {
        return None;
    }
    let (bucket, kind) = match pair.tier {
        SizeTier::Big => (Bucket::Urgent, AlertKind::NewFloatBig),
        SizeTier::Medium => (Bucket::Warning, AlertKind::NewFloatMedium),
        SizeTier::Small => (Bucket::Info, AlertKind::NewFloatSmall),
    };
    let mut item = base_item(pair, kind);
    item.percent = 100;
    Some((bucket, item))
}

/// Rule 2: drops on big VLANs. >50% is urgent, >20% is a warning, anything
/// smaller stays quiet.
fn big_drop(pair: &DayPair) -> Option<(Bucket, AlertItem)> {
    if pair.delta >= 0 || pair.tier != SizeTier::Big {
        return None;
    }
    let (bucket, kind) = if pair.pct > 50.0 {
        (Bucket::Urgent, AlertKind::BigDropCritical)
    } else if pair.pct > 20.0 {
        (Bucket::Warning, AlertKind::BigDropSignificant)
    } else {
        return None;
    };
    let mut item = base_item(pair, kind);
    item.drop_amount = Some(pair.delta.unsigned_abs() as u32);
    Some((bucket, item))
}

/// Rule 3: drops over 70% on medium VLANs.
fn medium_drop(pair: &DayPair) -> Option<(Bucket, AlertItem)> {
    if pair.delta >= 0 || pair.tier != SizeTier::Medium || pair.pct <= 70.0 {
        return None;
    }
    let mut item = base_item(pair, AlertKind::MediumDrop);
    item.drop_amount = Some(pair.delta.unsigned_abs() as u32);
    Some((Bucket::Warning, item))
}

/// Rule 4: increases over 100% on big VLANs. Informational only.
fn big_increase(pair: &DayPair) -> Option<(Bucket, AlertItem)> {
    if pair.delta <= 0 || pair.tier != SizeTier::Big || pair.pct <= 100.0 {
        return None;
    }
    let mut item = base_item(pair, AlertKind::BigIncrease);
    item.increase_amount = Some(pair.delta as u32);
    Some((Bucket::Info, item))
}
