use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Status, VlanReading};

/// What one VLAN reported on one day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayReading {
    pub status: Status,
    pub megabytes: u32,
    pub reported_name: String,
    pub display: String,
    pub short_display: String,
}

impl DayReading {
    fn from_reading(reading: &VlanReading) -> Self {
        Self {
            status: reading.status,
            megabytes: reading.megabytes,
            reported_name: reading.name.clone(),
            display: reading.display(),
            short_display: reading.short_display(),
        }
    }
}

/// Per-VLAN record spanning every date the VLAN has ever reported on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlanHistory {
    pub number: u32,
    /// Current display name. Tracks the most recent report's label, and may
    /// also be overwritten by an operator rename.
    pub name: String,
    pub original_name: String,
    pub last_reported_name: String,
    pub first_seen: String,
    pub days: BTreeMap<String, DayReading>,
}

/// Everything captured for one network on one date. A later save for the same
/// date replaces the snapshot wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySnapshot {
    pub date: String,
    pub readings: Vec<VlanReading>,
    pub down_numbers: Vec<u32>,
    pub parsed_at: String,
}

/// One monitored network: all daily snapshots plus the per-VLAN time series
/// derived from them. Mutating operations are copy-on-write: each returns a
/// fully-formed replacement value and never touches `self`, so a save is
/// atomic at whole-network granularity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub id: String,
    pub name: String,
    pub vlans: BTreeMap<u32, VlanHistory>,
    pub daily: BTreeMap<String, DailySnapshot>,
    /// Always exactly the ascending key set of `daily`.
    pub dates: Vec<String>,
    pub created: String,
    pub last_modified: String,
}

impl Network {
    pub fn new(id: &str, name: &str, now: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            vlans: BTreeMap::new(),
            daily: BTreeMap::new(),
            dates: Vec::new(),
            created: now.to_string(),
            last_modified: now.to_string(),
        }
    }

    /// Replaces the snapshot for `date` with `readings` and upserts every
    /// VLAN's history. Returns `None` (no mutation) when `readings` is empty:
    /// a report that parsed to nothing must never overwrite a day.
    pub fn save_snapshot(&self, date: &str, readings: &[VlanReading], now: &str) -> Option<Network> {
        if readings.is_empty() {
            return None;
        }

        let mut next = self.clone();

        let down_numbers = readings
            .iter()
            .filter(|r| r.status.is_down())
            .map(|r| r.number)
            .collect();
        next.daily.insert(
            date.to_string(),
            DailySnapshot {
                date: date.to_string(),
                readings: readings.to_vec(),
                down_numbers,
                parsed_at: now.to_string(),
            },
        );

        // Wholesale replace: VLANs dropped from a re-saved day lose that day
        // from their history, and a history referenced by no snapshot at all
        // goes away with it.
        let numbers: std::collections::BTreeSet<u32> =
            readings.iter().map(|r| r.number).collect();
        for vlan in next.vlans.values_mut() {
            if !numbers.contains(&vlan.number) {
                vlan.days.remove(date);
            }
        }
        next.vlans.retain(|_, vlan| !vlan.days.is_empty());

        for reading in readings {
            let entry = next
                .vlans
                .entry(reading.number)
                .or_insert_with(|| VlanHistory {
                    number: reading.number,
                    name: reading.name.clone(),
                    original_name: reading.name.clone(),
                    last_reported_name: reading.name.clone(),
                    first_seen: date.to_string(),
                    days: BTreeMap::new(),
                });
            entry
                .days
                .insert(date.to_string(), DayReading::from_reading(reading));
            entry.name = reading.name.clone();
            entry.last_reported_name = reading.name.clone();
        }

        next.sync_dates(now);
        Some(next)
    }

    /// Removes a VLAN's history and strips it from every stored snapshot's
    /// reading list and down-set.
    pub fn delete_vlan(&self, number: u32, now: &str) -> Network {
        let mut next = self.clone();
        next.vlans.remove(&number);
        for snapshot in next.daily.values_mut() {
            snapshot.readings.retain(|r| r.number != number);
            snapshot.down_numbers.retain(|n| *n != number);
        }
        next.last_modified = now.to_string();
        next
    }

    /// Removes one day's snapshot and that day from every VLAN history.
    /// Histories left with no days are dropped, so a VLAN entry exists iff it
    /// still appears in at least one snapshot.
    pub fn delete_day(&self, date: &str, now: &str) -> Network {
        let mut next = self.clone();
        next.daily.remove(date);
        for vlan in next.vlans.values_mut() {
            vlan.days.remove(date);
        }
        next.vlans.retain(|_, vlan| !vlan.days.is_empty());
        next.sync_dates(now);
        next
    }

    /// Drops all snapshots, dates and histories.
    pub fn clear(&self, now: &str) -> Network {
        let mut next = self.clone();
        next.vlans.clear();
        next.daily.clear();
        next.sync_dates(now);
        next
    }

    /// Operator rename of the current display name. The next save will
    /// overwrite it again with the report's label.
    pub fn rename_vlan(&self, number: u32, new_name: &str, now: &str) -> Network {
        let mut next = self.clone();
        if let Some(vlan) = next.vlans.get_mut(&number) {
            vlan.name = new_name.to_string();
            next.last_modified = now.to_string();
        }
        next
    }

    fn sync_dates(&mut self, now: &str) {
        self.dates = self.daily.keys().cloned().collect();
        self.last_modified = now.to_string();
    }

    /// Structural invariants the rest of the crate relies on: `dates` mirrors
    /// the snapshot key set, every snapshot reading has a matching history
    /// entry populated for that date, and no history outlives its snapshots.
    pub fn invariants_hold(&self) -> bool {
        let dates_match = self
            .dates
            .iter()
            .eq(self.daily.keys());

        let readings_backed = self.daily.values().all(|snapshot| {
            snapshot.readings.iter().all(|reading| {
                self.vlans
                    .get(&reading.number)
                    .is_some_and(|vlan| vlan.days.contains_key(&snapshot.date))
            })
        });

        let histories_grounded = self.vlans.values().all(|vlan| {
            !vlan.days.is_empty()
                && vlan.days.keys().all(|date| {
                    self.daily
                        .get(date)
                        .is_some_and(|snapshot| snapshot.readings.iter().any(|r| r.number == vlan.number))
                })
        });

        dates_match && readings_backed && histories_grounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_report;

    const NOW: &str = "2024-01-02T06:00:00Z";

    fn network_with_two_days() -> Network {
        let net = Network::new("network_1", "R1", NOW);
        let day1 = parse_report("🟣 V10: 4000 MB - برج E2\n🟢 V20: 500 MB - حي الجامعة\n");
        let net = net.save_snapshot("2024-01-01", &day1.readings, NOW).unwrap();
        let day2 = parse_report("🟣 V10: 1800 MB - برج E2\n❌ V20: 0 MB - حي الجامعة\n");
        net.save_snapshot("2024-01-02", &day2.readings, NOW).unwrap()
    }

    #[test]
    fn save_is_rejected_for_empty_readings() {
        let net = Network::new("network_1", "R1", NOW);
        assert!(net.save_snapshot("2024-01-01", &[], NOW).is_none());
        assert!(net.dates.is_empty());
    }

    #[test]
    fn save_seeds_history_and_down_set() {
        let net = network_with_two_days();
        assert!(net.invariants_hold());
        assert_eq!(net.dates, vec!["2024-01-01", "2024-01-02"]);
        assert_eq!(net.daily["2024-01-02"].down_numbers, vec![20]);
        assert_eq!(net.vlans[&10].first_seen, "2024-01-01");
        assert_eq!(net.vlans[&10].days["2024-01-02"].megabytes, 1800);
    }

    #[test]
    fn resave_replaces_the_day_wholesale() {
        let net = network_with_two_days();
        let redo = parse_report("🟢 V30: 50 MB - جديد\n");
        let net = net.save_snapshot("2024-01-02", &redo.readings, NOW).unwrap();
        assert_eq!(net.daily["2024-01-02"].readings.len(), 1);
        assert!(net.daily["2024-01-02"].down_numbers.is_empty());
        assert!(net.vlans.contains_key(&30));
        // VLANs dropped from the re-saved day keep only their other days
        assert!(!net.vlans[&10].days.contains_key("2024-01-02"));
        assert!(net.vlans[&10].days.contains_key("2024-01-01"));
        assert!(net.invariants_hold());
    }

    #[test]
    fn name_tracks_the_most_recent_report() {
        let net = Network::new("network_1", "R1", NOW);
        let d1 = parse_report("🟣 V5: 100 MB - الاسم القديم\n");
        let net = net.save_snapshot("2024-01-01", &d1.readings, NOW).unwrap();
        let d2 = parse_report("🟣 V5: 120 MB - الاسم الجديد\n");
        let net = net.save_snapshot("2024-01-02", &d2.readings, NOW).unwrap();
        assert_eq!(net.vlans[&5].name, "الاسم الجديد");
        assert_eq!(net.vlans[&5].original_name, "الاسم القديم");
    }

    #[test]
    fn delete_vlan_strips_every_snapshot() {
        let net = network_with_two_days().delete_vlan(20, NOW);
        assert!(!net.vlans.contains_key(&20));
        for snapshot in net.daily.values() {
            assert!(snapshot.readings.iter().all(|r| r.number != 20));
            assert!(!snapshot.down_numbers.contains(&20));
        }
        assert!(net.invariants_hold());
    }

    #[test]
    fn delete_day_drops_orphaned_histories() {
        let net = network_with_two_days();
        let extra = parse_report("🟠 V99: 40 MB - مؤقت\n");
        let net = net.save_snapshot("2024-01-03", &extra.readings, NOW).unwrap();
        let net = net.delete_day("2024-01-03", NOW);
        assert!(!net.vlans.contains_key(&99));
        assert_eq!(net.dates, vec!["2024-01-01", "2024-01-02"]);
        assert!(net.invariants_hold());
    }

    #[test]
    fn clear_empties_everything() {
        let net = network_with_two_days().clear(NOW);
        assert!(net.vlans.is_empty());
        assert!(net.daily.is_empty());
        assert!(net.dates.is_empty());
        assert!(net.invariants_hold());
    }

    #[test]
    fn rename_then_save_restores_reported_name() {
        let net = network_with_two_days().rename_vlan(10, "اسم يدوي", NOW);
        assert_eq!(net.vlans[&10].name, "اسم يدوي");
        let d3 = parse_report("🟣 V10: 2000 MB - برج E2\n");
        let net = net.save_snapshot("2024-01-03", &d3.readings, NOW).unwrap();
        assert_eq!(net.vlans[&10].name, "برج E2");
    }
}
