use truenas_entities::config::Config;
use truenas_entities::entities::SensorRegistry;

#[test]
fn test_config_load() {
    // This assumes config/Default.toml exists relative to where cargo test is run
    let config_res = Config::load("config/Default.toml");
    assert!(config_res.is_ok(), "Failed to load default config");

    let config = config_res.unwrap();
    let registry = SensorRegistry::builtin().unwrap();
    assert!(config.validate(registry).is_ok());
}

#[test]
fn test_snapshot_to_metrics_and_action() {
    use serde_json::{json, Map};
    use truenas_entities::entities::{ActionRegistry, Payload, Resolver};
    use truenas_entities::metrics::MetricsCollector;

    // Given: The fixture snapshot and the default configuration
    let config = Config::load("config/Default.toml").unwrap();
    let registry = SensorRegistry::builtin().unwrap();
    let text = std::fs::read_to_string("tests/fixtures/payload.json").unwrap();
    let payload = Payload::from_json(&text).unwrap();

    // When: Resolving, publishing and preparing a snapshot of one dataset
    let sensors = Resolver::new(registry, config.entities.instance.clone()).resolve_all(&payload);
    let metrics = MetricsCollector::new().unwrap();
    metrics.record_registry(registry, ActionRegistry::builtin());
    metrics.record_sensors(&sensors);

    let dataset = sensors
        .iter()
        .find(|s| s.key == "dataset" && s.name == "tank/backups")
        .unwrap();
    let mut params = Map::new();
    params.insert("entity_id".to_string(), json!(dataset.unique_id));
    let request = ActionRegistry::builtin()
        .prepare(
            "dataset_snapshot",
            &params,
            registry,
            &payload,
            &config.entities.instance,
            5,
        )
        .unwrap();

    // Then: Each step agrees on the same entity
    let rendered = metrics.render().unwrap();
    assert!(rendered.contains(&format!("entity=\"{}\"", dataset.unique_id)));
    assert_eq!(request.method, "zfs.snapshot.create");
    assert_eq!(request.params.unwrap()[0]["dataset"], "tank/backups");
}
