//! Prometheus Metrics Definitions
//!
//! Exposes the registry and resolved sensor values in Prometheus text format.
//!
//! # Metrics
//!
//! - `truenas_entity_descriptors` - Registered sensor descriptors
//!   - Labels: data_path, kind
//! - `truenas_entity_actions` - Registered maintenance actions
//! - `truenas_sensor_value` - Numeric value of a resolved sensor
//!   - Labels: key, entity, unit
//! - `truenas_sensor_available` - Whether the sensor resolved to a value (1/0)
//!   - Labels: key, entity
//! - `truenas_resolve_requests_total` - Resolution requests served
//! - `truenas_up` - Whether the last payload snapshot could be read (1 when
//!   no snapshot is configured)
//!
//! All metrics use the `truenas_` namespace prefix.

use crate::entities::{ActionRegistry, ResolvedSensor, SensorRegistry};
use prometheus::{
    Encoder, Gauge, GaugeVec, IntCounter, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Clone)]
pub struct MetricsCollector {
    registry: Arc<Registry>,

    // Registry metrics
    pub entity_descriptors: Arc<IntGaugeVec>,
    pub entity_actions: Arc<IntGauge>,

    // Sensor metrics
    pub sensor_value: Arc<GaugeVec>,
    pub sensor_available: Arc<IntGaugeVec>,

    pub resolve_requests: Arc<IntCounter>,
    pub up: Arc<Gauge>,

    // Held while the sensor series are replaced or gathered
    publish: Arc<Mutex<()>>,
}

impl MetricsCollector {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let entity_descriptors = IntGaugeVec::new(
            Opts::new("entity_descriptors", "Registered sensor descriptors").namespace("truenas"),
            &["data_path", "kind"],
        )?;

        let entity_actions = IntGauge::with_opts(
            Opts::new("entity_actions", "Registered maintenance actions").namespace("truenas"),
        )?;

        let sensor_value = GaugeVec::new(
            Opts::new("sensor_value", "Numeric value of a resolved sensor").namespace("truenas"),
            &["key", "entity", "unit"],
        )?;

        let sensor_available = IntGaugeVec::new(
            Opts::new(
                "sensor_available",
                "Whether the sensor resolved to a value (1=yes, 0=no)",
            )
            .namespace("truenas"),
            &["key", "entity"],
        )?;

        let resolve_requests = IntCounter::with_opts(
            Opts::new("resolve_requests_total", "Resolution requests served").namespace("truenas"),
        )?;

        let up = Gauge::with_opts(
            Opts::new("up", "Whether the last payload snapshot could be read").namespace("truenas"),
        )?;

        registry.register(Box::new(entity_descriptors.clone()))?;
        registry.register(Box::new(entity_actions.clone()))?;
        registry.register(Box::new(sensor_value.clone()))?;
        registry.register(Box::new(sensor_available.clone()))?;
        registry.register(Box::new(resolve_requests.clone()))?;
        registry.register(Box::new(up.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            entity_descriptors: Arc::new(entity_descriptors),
            entity_actions: Arc::new(entity_actions),
            sensor_value: Arc::new(sensor_value),
            sensor_available: Arc::new(sensor_available),
            resolve_requests: Arc::new(resolve_requests),
            up: Arc::new(up),
            publish: Arc::new(Mutex::new(())),
        })
    }

    /// Publish the shape of the descriptor and action tables.
    pub fn record_registry(&self, sensors: &SensorRegistry, actions: &ActionRegistry) {
        self.entity_descriptors.reset();
        for descriptor in sensors.iter() {
            self.entity_descriptors
                .with_label_values(&[descriptor.data_path.as_str(), descriptor.kind.as_str()])
                .inc();
        }
        self.entity_actions.set(actions.len() as i64);
    }

    /// Replace the sensor series with `sensors`.
    ///
    /// Series of entities no longer present are dropped; text-valued sensors
    /// only report availability.
    pub fn record_sensors(&self, sensors: &[ResolvedSensor]) {
        let _guard = self.lock_publish();
        self.sensor_value.reset();
        self.sensor_available.reset();

        for sensor in sensors {
            let unit = sensor.unit.map(|u| u.symbol()).unwrap_or("");
            let numeric = sensor.value.as_ref().and_then(|v| v.as_f64());

            if let Some(value) = numeric {
                self.sensor_value
                    .with_label_values(&[sensor.key, sensor.unique_id.as_str(), unit])
                    .set(value);
            }
            self.sensor_available
                .with_label_values(&[sensor.key, sensor.unique_id.as_str()])
                .set(i64::from(sensor.value.is_some()));
        }
    }

    /// Render metrics in Prometheus text format
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = {
            let _guard = self.lock_publish();
            self.registry.gather()
        };
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Poisoned locks are recovered.
    fn lock_publish(&self) -> MutexGuard<'_, ()> {
        self.publish.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
