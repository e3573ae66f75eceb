use serde::{Deserialize, Serialize};

use crate::store::VlanHistory;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

/// Lightweight per-cell day-over-day annotation for tabular views. Not an
/// alert: no classification, no buckets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ConsumptionDelta {
    pub difference: f64,
    pub percentage: f64,
    pub direction: Direction,
}

/// Raw day-over-day delta with a sub-unit noise floor: anything under 1 MB of
/// absolute change is "no change" and suppresses the annotation. Percentage is
/// rounded to one decimal; a zero prior reading pins it at 100.
pub fn delta(prev: f64, curr: f64) -> Option<ConsumptionDelta> {
    let difference = curr - prev;
    if difference.abs() < 1.0 {
        return None;
    }

    let percentage = if prev > 0.0 {
        round1(difference.abs() / prev * 100.0)
    } else {
        100.0
    };
    let direction = if difference > 0.0 {
        Direction::Up
    } else {
        Direction::Down
    };

    Some(ConsumptionDelta {
        difference: round1(difference),
        percentage,
        direction,
    })
}

/// Annotation for one VLAN cell: compares `date` against the immediately
/// preceding date in `known_dates`. `None` when `date` is the first known
/// date, unknown, or either day lacks a reading for this VLAN.
pub fn consumption_comparison(
    vlan: &VlanHistory,
    date: &str,
    known_dates: &[String],
) -> Option<ConsumptionDelta> {
    let mut sorted = known_dates.to_vec();
    sorted.sort();
    let index = sorted.iter().position(|d| d == date)?;
    if index == 0 {
        return None;
    }
    let previous_date = &sorted[index - 1];

    let curr = vlan.days.get(date)?;
    let prev = vlan.days.get(previous_date.as_str())?;

    delta(f64::from(prev.megabytes), f64::from(curr.megabytes))
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_unit_changes_are_noise() {
        assert!(delta(100.0, 100.9).is_none());
        assert!(delta(100.0, 99.1).is_none());
        assert!(delta(100.0, 100.0).is_none());
    }

    #[test]
    fn one_unit_change_is_reported() {
        let d = delta(100.0, 101.0).unwrap();
        assert_eq!(d.difference, 1.0);
        assert_eq!(d.percentage, 1.0);
        assert_eq!(d.direction, Direction::Up);
    }

    #[test]
    fn percentage_rounds_to_one_decimal() {
        let d = delta(300.0, 100.0).unwrap();
        assert_eq!(d.difference, -200.0);
        assert_eq!(d.percentage, 66.7);
        assert_eq!(d.direction, Direction::Down);
    }

    #[test]
    fn zero_prior_reading_pins_percentage() {
        let d = delta(0.0, 50.0).unwrap();
        assert_eq!(d.percentage, 100.0);
        assert_eq!(d.direction, Direction::Up);
    }
}
