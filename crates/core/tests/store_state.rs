use vlanwatch_core::config::default_seeds;
use vlanwatch_core::ingest;
use vlanwatch_core::storage::{alert_key, StateStore};
use vlanwatch_core::store::Network;

const NOW: &str = "2024-01-02T06:00:00Z";

#[test]
fn missing_state_file_seeds_the_stock_networks() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path());

    let networks = store.load_networks(&default_seeds(), NOW).unwrap();
    assert_eq!(networks.len(), 2);
    assert_eq!(networks["network_1"].name, "R1");
    assert_eq!(networks["network_2"].name, "R2");
    assert!(networks["network_1"].dates.is_empty());
}

#[test]
fn networks_round_trip_through_the_state_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path());

    let mut networks = store.load_networks(&default_seeds(), NOW).unwrap();
    let outcome = ingest(
        &networks["network_1"],
        "2024-01-01",
        "🟣 V10: 4000 MB - برج E2\n❌ V20: 0 MB - حي\n",
        NOW,
    )
    .unwrap()
    .unwrap();
    networks.insert("network_1".to_string(), outcome.network);
    store.save_networks(&networks).unwrap();

    let reloaded = store.load_networks(&default_seeds(), NOW).unwrap();
    let net = &reloaded["network_1"];
    assert_eq!(net.dates, vec!["2024-01-01"]);
    assert_eq!(net.daily["2024-01-01"].down_numbers, vec![20]);
    assert_eq!(net.vlans[&10].days["2024-01-01"].megabytes, 4000);
    assert!(net.invariants_hold());
}

#[test]
fn alert_history_and_current_network_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path());

    assert!(store.load_alert_history().unwrap().is_empty());
    assert_eq!(store.load_current_network().unwrap(), None);

    let network = Network::new("network_1", "R1", NOW);
    let day1 = ingest(&network, "2024-01-01", "🟣 V1: 4000 MB - x\n", NOW)
        .unwrap()
        .unwrap();
    let day2 = ingest(&day1.network, "2024-01-02", "🟣 V1: 1000 MB - x\n", NOW)
        .unwrap()
        .unwrap();

    let mut history = store.load_alert_history().unwrap();
    history.insert(
        alert_key("network_1", "2024-01-02"),
        day2.alerts.clone().unwrap(),
    );
    store.save_alert_history(&history).unwrap();
    store.save_current_network("network_1").unwrap();

    let reloaded = store.load_alert_history().unwrap();
    assert_eq!(reloaded["network_1/2024-01-02"].urgent.len(), 1);
    assert_eq!(
        store.load_current_network().unwrap().as_deref(),
        Some("network_1")
    );
}

#[test]
fn invariants_survive_any_mix_of_saves_and_deletes() {
    let network = Network::new("network_1", "R1", NOW);
    let day1 = ingest(
        &network,
        "2024-01-01",
        "🟣 V10: 4000 MB - أ\n🟢 V20: 500 MB - ب\n🟠 V30: 90 MB - ج\n",
        NOW,
    )
    .unwrap()
    .unwrap();
    let day2 = ingest(
        &day1.network,
        "2024-01-02",
        "🟣 V10: 3800 MB - أ\n❌ V20: 0 MB - ب\n",
        NOW,
    )
    .unwrap()
    .unwrap();

    let mut net = day2.network;
    assert!(net.invariants_hold());

    net = net.delete_vlan(20, NOW);
    assert!(net.invariants_hold());
    assert!(!net.vlans.contains_key(&20));

    net = net.delete_day("2024-01-01", NOW);
    assert!(net.invariants_hold());
    // V30 only ever reported on the deleted day
    assert!(!net.vlans.contains_key(&30));
    assert_eq!(net.dates, vec!["2024-01-02"]);

    net = net.clear(NOW);
    assert!(net.invariants_hold());
    assert!(net.dates.is_empty());
}
