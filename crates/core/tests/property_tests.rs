use proptest::prelude::*;

use vlanwatch_core::compare;
use vlanwatch_core::parser::parse_report;
use vlanwatch_core::store::Network;
use vlanwatch_core::types::{SizeTier, VlanReading};

proptest! {
    #[test]
    fn parser_never_panics_on_arbitrary_input(text in ".{0,4096}") {
        // Should not panic regardless of input
        let _ = parse_report(&text);
    }

    #[test]
    fn parser_is_idempotent(text in ".{0,1024}") {
        let first = parse_report(&text);
        let second = parse_report(&text);
        prop_assert_eq!(first.readings, second.readings);
        prop_assert_eq!(first.stats, second.stats);
    }

    #[test]
    fn well_formed_lines_all_parse_amid_noise(
        entries in prop::collection::vec((1u32..4096, 0u32..100_000), 1..20),
        noise in prop::collection::vec("[a-z ]{0,40}", 0..20),
    ) {
        let mut text = String::new();
        for (i, (number, mb)) in entries.iter().enumerate() {
            text.push_str(&format!("🟣 V{number}: {mb} MB - segment\n"));
            if let Some(n) = noise.get(i % noise.len().max(1)) {
                text.push_str(n);
                text.push('\n');
            }
        }
        let parsed = parse_report(&text);
        prop_assert_eq!(parsed.stats.matched, entries.len());
        let numbers: Vec<u32> = parsed.readings.iter().map(|r| r.number).collect();
        let expected: Vec<u32> = entries.iter().map(|(n, _)| *n).collect();
        prop_assert_eq!(numbers, expected);
    }

    #[test]
    fn size_tier_thresholds_are_total(prior in 0u32..1_000_000) {
        let tier = SizeTier::of(prior);
        match tier {
            SizeTier::Big => prop_assert!(prior >= 3000),
            SizeTier::Medium => prop_assert!((1000..3000).contains(&prior)),
            SizeTier::Small => prop_assert!(prior < 1000),
        }
    }

    #[test]
    fn analyzer_emits_at_most_one_alert_per_vlan(
        prior in 0u32..100_000,
        curr in 0u32..100_000,
        prior_down in any::<bool>(),
        curr_down in any::<bool>(),
    ) {
        use vlanwatch_core::types::Status;

        let now = "2024-01-02T06:00:00Z";
        let reading = |mb: u32, down: bool| VlanReading {
            number: 1,
            name: "segment".to_string(),
            status: if down { Status::Down } else { Status::Purple },
            megabytes: mb,
        };

        let net = Network::new("network_1", "R1", now);
        let net = net
            .save_snapshot("2024-01-01", &[reading(prior, prior_down)], now)
            .unwrap();
        let net = net
            .save_snapshot("2024-01-02", &[reading(curr, curr_down)], now)
            .unwrap();

        let record = vlanwatch_core::rules::analyze(&net, "2024-01-02", now).unwrap();
        prop_assert!(record.total() <= 1);
    }

    #[test]
    fn comparator_noise_floor_is_exactly_one_unit(prev in 0.0f64..100_000.0, diff in -0.99f64..0.99) {
        prop_assert!(compare::delta(prev, prev + diff).is_none());
    }

    #[test]
    fn comparator_direction_matches_the_sign(prev in 0.0f64..100_000.0, diff in 1.5f64..10_000.0) {
        let up = compare::delta(prev, prev + diff).unwrap();
        prop_assert_eq!(up.direction, compare::Direction::Up);
        if prev >= diff {
            let down = compare::delta(prev, prev - diff).unwrap();
            prop_assert_eq!(down.direction, compare::Direction::Down);
        }
    }
}
