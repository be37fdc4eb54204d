mod common;

use vfrfuse::feed::{AprsParser, Parser, SbsParser};
use vfrfuse::object::{Payload, RecordKey, TargetKind};
use vfrfuse::store::Store;

fn ingest(store: &Store, parser: &dyn Parser, line: &str, priority: u32) -> bool {
    let update = parser
        .unpack_at(line, priority, common::reference_time())
        .expect("line parses");
    store.update(update.key, update.candidate)
}

fn tick(store: &Store) -> Vec<String> {
    let mut out = Vec::new();
    store.tick(|bytes| out.extend(common::sentences(bytes)));
    out
}

#[test]
fn test_flarm_report_renders_traffic_pair() {
    let store = Store::from_config(&common::observer_config());
    assert!(ingest(&store, &AprsParser::new(None), &common::aprs_report("DD1234", "135959"), 1));

    let out = tick(&store);
    assert_eq!(out.len(), 2);

    let pflau = common::fields(&out[0]);
    assert_eq!(pflau[0], "$PFLAU");
    assert_eq!(pflau[6], "89");
    assert_eq!(pflau[8], "500");
    assert_eq!(pflau[10], "DD1234");

    let pflaa = common::fields(&out[1]);
    assert_eq!(pflaa[0], "$PFLAA");
    let north: i32 = pflaa[2].parse().unwrap();
    let east: i32 = pflaa[3].parse().unwrap();
    assert!(north.abs() < 20, "north {}", north);
    assert!(east > 700, "east {}", east);
    assert_eq!(pflaa[4], "500");
    assert_eq!(pflaa[5], "2");
    assert_eq!(pflaa[7], "090");
    assert_eq!(pflaa[9], "93");
    assert_eq!(pflaa[10], "0.0");
    assert_eq!(pflaa[11], "1");
}

#[test]
fn test_older_transponder_does_not_replace_flarm() {
    let store = Store::from_config(&common::observer_config());
    let key = RecordKey::from_id("DD1234");
    assert!(ingest(&store, &AprsParser::new(None), &common::aprs_report("DD1234", "135959"), 1));
    let before = store.payload(key);

    assert!(!ingest(
        &store,
        &SbsParser::new(None),
        &common::sbs_report("DD1234", "13:59:50.000", 9000),
        5
    ));
    assert_eq!(store.payload(key), before);
    assert_eq!(store.target_kind(key), Some(TargetKind::Flarm));

    // Newer transponder data still loses while FLARM is fresh
    assert!(!ingest(
        &store,
        &SbsParser::new(None),
        &common::sbs_report("DD1234", "14:00:00.000", 9000),
        5
    ));
}

#[test]
fn test_transponder_takes_over_after_degrade() {
    let mut config = common::observer_config();
    config.store.no_flarm_threshold = 2;
    let store = Store::from_config(&config);
    let key = RecordKey::from_id("DD1234");

    ingest(&store, &AprsParser::new(None), &common::aprs_report("DD1234", "135959"), 1);
    for _ in 0..3 {
        tick(&store);
    }
    assert_eq!(store.target_kind(key), Some(TargetKind::Transponder));

    assert!(ingest(
        &store,
        &SbsParser::new(None),
        &common::sbs_report("DD1234", "14:00:00.000", 3000),
        1
    ));
    match store.payload(key) {
        Some(Payload::Aircraft(aircraft)) => assert_eq!(aircraft.position.altitude, 914),
        other => panic!("unexpected payload {:?}", other),
    }
    assert_eq!(store.age(key), Some(0));
}

#[test]
fn test_distance_filter_suppresses_but_keeps_record() {
    let mut config = common::observer_config();
    config.filter.max_distance = 500;
    let store = Store::from_config(&config);
    ingest(&store, &AprsParser::new(None), &common::aprs_report("DD1234", "135959"), 1);

    assert!(tick(&store).is_empty());
    assert!(store.contains(RecordKey::from_id("DD1234")));
}
