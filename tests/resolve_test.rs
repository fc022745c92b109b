//! Resolution tests
//!
//! Tests that descriptors extract values, identities and attributes from
//! polled payloads.

use serde_json::json;
use truenas_entities::entities::resolve::{resolve, resolve_entry};
use truenas_entities::entities::types::{DataPath, DeviceGroup, Unit};
use truenas_entities::entities::{Payload, Resolver, SensorRegistry, SensorValue};

fn registry() -> &'static SensorRegistry {
    SensorRegistry::builtin().expect("Built-in registry must validate")
}

fn fixture() -> Payload {
    let text = std::fs::read_to_string("tests/fixtures/payload.json").expect("fixture");
    Payload::from_json(&text).expect("fixture parses")
}

#[test]
fn test_cpu_usage_resolves_with_percent_unit() {
    // Given: A payload whose system_info reports 12.5% CPU
    let payload =
        Payload::new().with_section(DataPath::SystemInfo, json!({"cpu_usage": 12.5}));

    // When: Resolving the system_cpu_usage descriptor
    let sensors = Resolver::new(registry(), "truenas")
        .resolve("system_cpu_usage", &payload)
        .unwrap();

    // Then: Exactly one entity with value 12.5 in percent
    assert_eq!(sensors.len(), 1);
    assert_eq!(sensors[0].value, Some(SensorValue::Number(12.5)));
    assert_eq!(sensors[0].unit.map(Unit::symbol), Some("%"));
    assert_eq!(sensors[0].unique_id, "truenas-system_cpu_usage");
    assert_eq!(sensors[0].name, "CPU Usage");
    assert_eq!(sensors[0].reference, None);
}

#[test]
fn test_dataset_entry_resolves_value_name_and_identity() {
    // Given: A dataset entry for tank/media
    let entry = json!({
        "id": "tank/media",
        "name": "tank/media",
        "used_gb": 120.4,
        "mountpoint": "/mnt/tank/media"
    });
    let entry = entry.as_object().unwrap();
    let dataset = registry().get("dataset").unwrap();

    // When: Resolving the dataset descriptor against it
    let sensor = resolve_entry(dataset, entry, "truenas").unwrap();

    // Then: Value, name and identity come from used_gb, name and id
    assert_eq!(sensor.value, Some(SensorValue::Number(120.4)));
    assert_eq!(sensor.name, "tank/media");
    assert_eq!(sensor.reference.as_deref(), Some("tank/media"));
    assert_eq!(sensor.unique_id, "truenas-dataset-tank/media");
    assert_eq!(sensor.group, DeviceGroup::Datasets);
    assert_eq!(sensor.attributes.get("Mountpoint"), Some(&json!("/mnt/tank/media")));
}

#[test]
fn test_identity_follows_reference_field_not_name() {
    // Given: A cloud sync task whose id differs from its description
    let payload = Payload::new().with_section(
        DataPath::Cloudsync,
        json!([{"id": 3, "description": "Offsite B2", "state": "SUCCESS"}]),
    );

    // When: Resolving
    let sensors = resolve(registry().get("cloudsync").unwrap(), &payload, "NAS01");

    // Then: The unique id is built from the lowercased instance, key and id
    assert_eq!(sensors.len(), 1);
    assert_eq!(sensors[0].reference.as_deref(), Some("3"));
    assert_eq!(sensors[0].unique_id, "nas01-cloudsync-3");
    assert_eq!(sensors[0].name, "Offsite B2");
    assert_eq!(sensors[0].value, Some(SensorValue::Text("SUCCESS".to_string())));
}

#[test]
fn test_named_multi_instance_sensor_appends_descriptor_name() {
    let payload = fixture();
    let sensors = Resolver::new(registry(), "truenas")
        .resolve("traffic_rx", &payload)
        .unwrap();

    assert_eq!(sensors.len(), 1);
    assert_eq!(sensors[0].name, "enp3s0 RX");
    assert_eq!(sensors[0].value, Some(SensorValue::Number(1532.5)));
    assert_eq!(sensors[0].attributes.get("MTU"), Some(&json!(1500)));
    assert_eq!(
        sensors[0].attributes.get("Link state"),
        Some(&json!("LINK_STATE_UP"))
    );
}

#[test]
fn test_missing_field_resolves_to_none() {
    // Given: A system_info section without cpu_temperature
    let payload = Payload::new().with_section(DataPath::SystemInfo, json!({"cpu_usage": 1.0}));

    // When: Resolving the temperature sensor
    let sensors = Resolver::new(registry(), "truenas")
        .resolve("system_cpu_temperature", &payload)
        .unwrap();

    // Then: The entity exists with no value rather than an error
    assert_eq!(sensors.len(), 1);
    assert_eq!(sensors[0].value, None);
}

#[test]
fn test_null_disk_temperature_resolves_to_none() {
    let sensors = Resolver::new(registry(), "truenas")
        .resolve("disk", &fixture())
        .unwrap();

    assert_eq!(sensors.len(), 2);
    let sda = sensors.iter().find(|s| s.name == "sda").unwrap();
    let nvme = sensors.iter().find(|s| s.name == "nvme0n1").unwrap();
    assert_eq!(sda.value, Some(SensorValue::Number(34.0)));
    assert_eq!(sda.unique_id, "truenas-disk-sda");
    assert_eq!(nvme.value, None);
    // Only fields present in the entry become attributes
    assert!(nvme.attributes.contains_key("Serial"));
    assert!(!nvme.attributes.contains_key("Model"));
}

#[test]
fn test_missing_section_yields_no_entities() {
    let sensors = Resolver::new(registry(), "truenas")
        .resolve("replication", &Payload::new())
        .unwrap();
    assert!(sensors.is_empty());
}

#[test]
fn test_unknown_sensor_key_is_an_error() {
    let result = Resolver::new(registry(), "truenas").resolve("fan_speed", &Payload::new());
    assert!(result.is_err());
}

#[test]
fn test_uptime_becomes_timestamp() {
    let payload =
        Payload::new().with_section(DataPath::SystemInfo, json!({"uptimeEpoch": 1_700_000_000}));

    let sensors = Resolver::new(registry(), "truenas")
        .resolve("system_uptime", &payload)
        .unwrap();

    match &sensors[0].value {
        Some(SensorValue::Timestamp(ts)) => assert_eq!(ts.timestamp(), 1_700_000_000),
        other => panic!("expected a timestamp, got {other:?}"),
    }
    assert_eq!(
        serde_json::to_value(&sensors[0].value).unwrap(),
        json!("2023-11-14T22:13:20Z")
    );
}

#[test]
fn test_numeric_strings_parse_for_measurements() {
    let payload =
        Payload::new().with_section(DataPath::SystemInfo, json!({"load_shortterm": "0.75"}));

    let sensors = Resolver::new(registry(), "truenas")
        .resolve("system_load_shortterm", &payload)
        .unwrap();

    assert_eq!(sensors[0].value, Some(SensorValue::Number(0.75)));
}

#[test]
fn test_keyed_object_section_is_read_as_entries() {
    let payload = Payload::new().with_section(
        DataPath::Pool,
        json!({
            "tank": {"guid": "111", "name": "tank", "available_gib": 10.5},
            "backup": {"guid": "222", "name": "backup", "available_gib": 99.0}
        }),
    );

    let sensors = resolve(registry().get("pool_free").unwrap(), &payload, "truenas");

    let names: Vec<&str> = sensors.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(sensors.len(), 2);
    assert!(names.contains(&"tank free"));
    assert!(names.contains(&"backup free"));
}

#[test]
fn test_entry_without_reference_is_skipped() {
    let payload = Payload::new().with_section(
        DataPath::Dataset,
        json!([{"name": "tank/orphan", "used_gb": 1.0}, {"id": "tank/a", "name": "tank/a"}]),
    );

    let sensors = resolve(registry().get("dataset").unwrap(), &payload, "truenas");

    assert_eq!(sensors.len(), 1);
    assert_eq!(sensors[0].name, "tank/a");
    assert_eq!(sensors[0].value, None);
}

#[test]
fn test_resolve_all_covers_fixture() {
    let sensors = Resolver::new(registry(), "truenas").resolve_all(&fixture());

    // 10 system, 2 datasets, 2 disks, 1 pool, 1 cloud sync, 1 replication,
    // 1 snapshot task, 2 interface counters
    assert_eq!(sensors.len(), 20);

    let ids: std::collections::HashSet<&str> =
        sensors.iter().map(|s| s.unique_id.as_str()).collect();
    assert_eq!(ids.len(), sensors.len(), "unique ids must not collide");
}

#[test]
fn test_disabled_sensors_are_skipped() {
    let sensors = Resolver::new(registry(), "truenas")
        .with_disabled(["traffic_rx", "traffic_tx"])
        .resolve_all(&fixture());

    assert_eq!(sensors.len(), 18);
    assert!(sensors.iter().all(|s| !s.key.starts_with("traffic_")));
}

#[test]
fn test_non_object_payload_is_rejected() {
    assert!(Payload::from_json("[1, 2, 3]").is_err());
    assert!(Payload::from_json("not json").is_err());
}

#[test]
fn test_repeated_reference_yields_one_entity() {
    // Given: Two disk entries reporting the same device name
    let payload = Payload::new().with_section(
        DataPath::Disk,
        json!([
            {"name": "sda", "devname": "sda", "temperature": 30},
            {"name": "sda", "devname": "sda", "temperature": 99}
        ]),
    );

    // When: Resolving the disk descriptor
    let sensors = resolve(registry().get("disk").unwrap(), &payload, "truenas");

    // Then: The first entry wins, the repeat is dropped
    assert_eq!(sensors.len(), 1);
    assert_eq!(sensors[0].unique_id, "truenas-disk-sda");
    assert_eq!(sensors[0].value, Some(SensorValue::Number(30.0)));
}

#[test]
fn test_references_differing_only_in_case_collide() {
    // Given: Two datasets whose names differ only in case
    let payload = Payload::new().with_section(
        DataPath::Dataset,
        json!([
            {"id": "tank/Media", "name": "tank/Media", "used_gb": 1.0},
            {"id": "tank/media", "name": "tank/media", "used_gb": 2.0}
        ]),
    );

    // When: Resolving
    let sensors = resolve(registry().get("dataset").unwrap(), &payload, "truenas");

    // Then: Unique ids are case-folded, so only the first dataset is exposed
    assert_eq!(sensors.len(), 1);
    assert_eq!(sensors[0].unique_id, "truenas-dataset-tank/media");
    assert_eq!(sensors[0].name, "tank/Media");
}
