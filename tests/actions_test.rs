//! Action registry tests
//!
//! Tests for the maintenance action table and control request building.

use chrono::{TimeZone, Utc};
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use truenas_entities::entities::actions::{
    ActionVerb, ATTR_ENTITY_ID, SERVICE_CLOUDSYNC_RUN, SERVICE_DATASET_SNAPSHOT,
};
use truenas_entities::entities::types::{DataPath, SensorKind};
use truenas_entities::entities::{ActionRegistry, Payload, SensorDescriptor, SensorRegistry};
use truenas_entities::error::EntityError;

fn params(entity_id: &str) -> Map<String, Value> {
    let mut params = Map::new();
    params.insert(ATTR_ENTITY_ID.to_string(), json!(entity_id));
    params
}

fn cloudsync_payload(state: &str) -> Payload {
    Payload::new().with_section(
        DataPath::Cloudsync,
        json!([{"id": 3, "description": "Offsite B2", "state": state}]),
    )
}

#[test]
fn test_registry_has_exactly_two_actions() {
    // Given: The built-in action table
    let actions = ActionRegistry::builtin();

    // Then: Two actions, each with a schema and a distinct verb
    assert_eq!(actions.len(), 2);
    let verbs: HashSet<ActionVerb> = actions.iter().map(|a| a.verb).collect();
    assert_eq!(verbs.len(), 2);
    for action in actions.iter() {
        assert!(!action.schema.is_empty(), "{}", action.service);
    }
}

#[test]
fn test_declared_actions() {
    let actions = ActionRegistry::builtin();

    let run = actions.get(SERVICE_CLOUDSYNC_RUN).unwrap();
    assert_eq!(run.verb.to_string(), "start");
    assert_eq!(run.applies_to, SensorKind::CloudSync);

    let snapshot = actions.get(SERVICE_DATASET_SNAPSHOT).unwrap();
    assert_eq!(snapshot.verb.to_string(), "snapshot");
    assert_eq!(snapshot.applies_to, SensorKind::Dataset);

    assert!(actions.get("pool_scrub").is_none());
    assert_eq!(actions.for_kind(SensorKind::Generic).count(), 0);
}

#[test]
fn test_validate_params_requires_entity_id() {
    let action = ActionRegistry::builtin()
        .get(SERVICE_DATASET_SNAPSHOT)
        .unwrap();

    assert!(action.validate_params(&params("truenas-dataset-tank")).is_ok());
    assert!(matches!(
        action.validate_params(&Map::new()),
        Err(EntityError::MissingParameter { .. })
    ));

    let mut extra = params("truenas-dataset-tank");
    extra.insert("recursive".to_string(), json!(true));
    assert!(matches!(
        action.validate_params(&extra),
        Err(EntityError::UnknownParameter { .. })
    ));
}

#[test]
fn test_cloudsync_start_builds_sync_request() {
    // Given: An idle cloud sync task
    let registry = SensorRegistry::builtin().unwrap();
    let payload = cloudsync_payload("SUCCESS");

    // When: Preparing the cloudsync_run service for it
    let request = ActionRegistry::builtin()
        .prepare(
            SERVICE_CLOUDSYNC_RUN,
            &params("truenas-cloudsync-3"),
            registry,
            &payload,
            "truenas",
            7,
        )
        .unwrap();

    // Then: The control request syncs the task by id
    assert_eq!(request.method, "cloudsync.sync");
    assert_eq!(request.msg, "method");
    assert_eq!(request.id, "7");
    assert_eq!(request.params, Some(json!([3])));
}

#[test]
fn test_cloudsync_start_refused_while_running() {
    let registry = SensorRegistry::builtin().unwrap();

    for state in ["RUNNING", "WAITING"] {
        let result = ActionRegistry::builtin().prepare(
            SERVICE_CLOUDSYNC_RUN,
            &params("truenas-cloudsync-3"),
            registry,
            &cloudsync_payload(state),
            "truenas",
            1,
        );
        assert!(
            matches!(result, Err(EntityError::JobAlreadyRunning(ref name)) if name == "Offsite B2"),
            "{state}: {result:?}"
        );
    }
}

#[test]
fn test_dataset_snapshot_request() {
    // Given: A dataset entry and a fixed clock
    let registry = SensorRegistry::builtin().unwrap();
    let dataset = registry.get("dataset").unwrap();
    let entry = json!({"id": "tank/media", "name": "tank/media", "used_gb": 120.4});
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap();

    // When: Building the snapshot request
    let request = ActionRegistry::builtin()
        .get(SERVICE_DATASET_SNAPSHOT)
        .unwrap()
        .build_request(dataset, entry.as_object().unwrap(), 11, now)
        .unwrap();

    // Then: A custom snapshot named after the timestamp is created
    assert_eq!(request.method, "zfs.snapshot.create");
    assert_eq!(
        request.params,
        Some(json!([{
            "dataset": "tank/media",
            "name": "custom-2024-03-01_12:30:05.000000"
        }]))
    );
}

#[test]
fn test_action_on_wrong_entity_kind_is_refused() {
    // Given: A disk entity, which accepts no actions
    let registry = SensorRegistry::builtin().unwrap();
    let payload = Payload::new().with_section(
        DataPath::Disk,
        json!([{"name": "sda", "devname": "sda", "temperature": 30}]),
    );

    // When: Asking for a dataset snapshot of it
    let result = ActionRegistry::builtin().prepare(
        SERVICE_DATASET_SNAPSHOT,
        &params("truenas-disk-sda"),
        registry,
        &payload,
        "truenas",
        1,
    );

    // Then: The action is not supported
    assert!(matches!(
        result,
        Err(EntityError::ActionNotSupported { .. })
    ));
}

#[test]
fn test_unknown_entity_and_service() {
    let registry = SensorRegistry::builtin().unwrap();
    let actions = ActionRegistry::builtin();
    let payload = cloudsync_payload("SUCCESS");

    let unknown_entity = actions.prepare(
        SERVICE_CLOUDSYNC_RUN,
        &params("truenas-cloudsync-99"),
        registry,
        &payload,
        "truenas",
        1,
    );
    assert!(matches!(unknown_entity, Err(EntityError::UnknownSensor(_))));

    let unknown_service = actions.prepare(
        "pool_scrub",
        &params("truenas-cloudsync-3"),
        registry,
        &payload,
        "truenas",
        1,
    );
    assert!(matches!(unknown_service, Err(EntityError::UnknownAction(_))));
}

#[test]
fn test_request_serializes_as_middleware_call() {
    let registry = SensorRegistry::builtin().unwrap();
    let request = ActionRegistry::builtin()
        .prepare(
            SERVICE_CLOUDSYNC_RUN,
            &params("truenas-cloudsync-3"),
            registry,
            &cloudsync_payload("FAILED"),
            "truenas",
            42,
        )
        .unwrap();

    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({"id": "42", "msg": "method", "method": "cloudsync.sync", "params": [3]})
    );
}

#[test]
fn test_ambiguous_entity_id_is_refused() {
    // Given: Two datasets that resolve to the same case-folded unique id
    let registry = SensorRegistry::builtin().unwrap();
    let payload = Payload::new().with_section(
        DataPath::Dataset,
        json!([
            {"id": "tank/Media", "name": "tank/Media"},
            {"id": "tank/media", "name": "tank/media"}
        ]),
    );

    // When: Asking for a snapshot of that id
    let result = ActionRegistry::builtin().prepare(
        SERVICE_DATASET_SNAPSHOT,
        &params("truenas-dataset-tank/media"),
        registry,
        &payload,
        "truenas",
        1,
    );

    // Then: No request is built for either dataset
    match result {
        Err(EntityError::AmbiguousEntity { entity, entries }) => {
            assert_eq!(entity, "truenas-dataset-tank/media");
            assert_eq!(entries, 2);
        }
        other => panic!("expected AmbiguousEntity, got {other:?}"),
    }
}

#[test]
fn test_requests_follow_descriptor_fields() {
    // Given: A cloud sync descriptor identifying tasks by other fields
    let registry = SensorRegistry::builtin().unwrap();
    let cloudsync = *registry.get("cloudsync").unwrap();
    let renamed = SensorDescriptor {
        data_reference: Some("task_id"),
        data_name: Some("label"),
        ..cloudsync
    };
    let action = ActionRegistry::builtin().get(SERVICE_CLOUDSYNC_RUN).unwrap();
    let now = Utc::now();

    // When: Building requests for idle and running tasks
    let idle = json!({"task_id": 9, "id": 3, "label": "Nightly", "state": "SUCCESS"});
    let running = json!({"task_id": 9, "id": 3, "label": "Nightly", "state": "RUNNING"});
    let request = action
        .build_request(&renamed, idle.as_object().unwrap(), 1, now)
        .unwrap();
    let refused = action.build_request(&renamed, running.as_object().unwrap(), 2, now);

    // Then: The declared reference and name fields are used
    assert_eq!(request.params, Some(json!([9])));
    assert!(
        matches!(refused, Err(EntityError::JobAlreadyRunning(ref name)) if name == "Nightly"),
        "{refused:?}"
    );
}

#[test]
fn test_descriptor_without_reference_cannot_build_request() {
    let registry = SensorRegistry::builtin().unwrap();
    let unreferenced = SensorDescriptor {
        data_reference: None,
        ..*registry.get("cloudsync").unwrap()
    };
    let entry = json!({"id": 3, "description": "Offsite B2", "state": "SUCCESS"});

    let result = ActionRegistry::builtin()
        .get(SERVICE_CLOUDSYNC_RUN)
        .unwrap()
        .build_request(&unreferenced, entry.as_object().unwrap(), 1, Utc::now());

    assert!(
        matches!(result, Err(EntityError::MissingField { ref field, .. }) if field == "data_reference"),
        "{result:?}"
    );
}
