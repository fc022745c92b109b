//! Value extraction from polled payloads.
//!
//! A [`Payload`] holds the sections produced by an external appliance client.
//! Resolving a descriptor against it yields one [`ResolvedSensor`] per entity:
//! the primary value, the auxiliary attributes, and for multi-instance sensors
//! the per-instance identity and display name.
//!
//! # Section shapes
//!
//! - single-instance sensors read the section as one object;
//! - multi-instance sensors accept either an array of objects or an object of
//!   objects keyed by id.
//!
//! Fields missing from an entry resolve to no value. Nothing here fails on a
//! partial payload.

use crate::entities::attributes::format_attribute;
use crate::entities::descriptor::SensorDescriptor;
use crate::entities::registry::SensorRegistry;
use crate::entities::types::{
    DataPath, DeviceClass, DeviceGroup, EntityCategory, SensorKind, StateClass, Unit,
};
use crate::error::{EntityError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// One entry of a payload section.
pub type Entry = Map<String, Value>;

/// Polled data, organised by section name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload {
    sections: Map<String, Value>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a decoded JSON document. The top level must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(sections) => Ok(Self { sections }),
            other => Err(EntityError::InvalidPayload(format!(
                "expected an object of sections, got {}",
                json_type(&other)
            ))),
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(text)?)
    }

    pub fn with_section(mut self, path: DataPath, value: Value) -> Self {
        self.sections.insert(path.as_str().to_string(), value);
        self
    }

    pub fn section(&self, path: DataPath) -> Option<&Value> {
        self.sections.get(path.as_str())
    }

    /// Entries of a section. Arrays keep their order; keyed objects iterate by key.
    ///
    /// `multi_instance` selects how an object section is read: as the single
    /// entry itself, or as a map of entries.
    pub fn entries(&self, path: DataPath, multi_instance: bool) -> Vec<&Entry> {
        match (self.section(path), multi_instance) {
            (None | Some(Value::Null), _) => Vec::new(),
            (Some(Value::Object(entry)), false) => vec![entry],
            (Some(Value::Object(map)), true) => collect_objects(path, map.values()),
            (Some(Value::Array(items)), true) => collect_objects(path, items.iter()),
            (Some(other), _) => {
                warn!(
                    "Section {} has unexpected shape ({}), skipping",
                    path,
                    json_type(other)
                );
                Vec::new()
            }
        }
    }
}

fn collect_objects<'a>(path: DataPath, values: impl Iterator<Item = &'a Value>) -> Vec<&'a Entry> {
    values
        .filter_map(|value| match value {
            Value::Object(entry) => Some(entry),
            other => {
                warn!("Skipping non-object {} entry in {}", json_type(other), path);
                None
            }
        })
        .collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Native value of a sensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    Number(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Text(String),
}

impl SensorValue {
    /// Numeric view used by metric exporters: timestamps become epoch seconds,
    /// booleans 0/1, text has none.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Timestamp(ts) => Some(ts.timestamp() as f64),
            Self::Text(_) => None,
        }
    }

    fn from_field(descriptor: &SensorDescriptor, raw: &Value) -> Option<Self> {
        if descriptor.device_class == Some(DeviceClass::Timestamp) {
            return parse_timestamp(raw).map(Self::Timestamp);
        }

        let numeric = descriptor.unit.is_some()
            || descriptor.state_class.is_some()
            || descriptor.device_class.is_some();

        match raw {
            Value::Null => None,
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => n.as_f64().map(Self::Number),
            Value::String(s) if numeric => match s.trim().parse::<f64>() {
                Ok(n) => Some(Self::Number(n)),
                Err(_) => {
                    debug!("{}: '{}' is not numeric", descriptor.key, s);
                    Some(Self::Text(s.clone()))
                }
            },
            Value::String(s) => Some(Self::Text(s.clone())),
            other => Some(Self::Text(other.to_string())),
        }
    }
}

/// Epoch seconds, an RFC 3339 string, or the middleware's `{"$date": millis}`.
fn parse_timestamp(raw: &Value) -> Option<DateTime<Utc>> {
    match raw {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(|secs| DateTime::from_timestamp(secs, 0)),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|ts| ts.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                s.trim()
                    .parse::<i64>()
                    .ok()
                    .and_then(|secs| DateTime::from_timestamp(secs, 0))
            }),
        Value::Object(map) => map
            .get("$date")
            .and_then(Value::as_i64)
            .and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

/// Render an identity or name field as a string.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// A sensor bound to one payload entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedSensor {
    pub key: &'static str,
    pub unique_id: String,
    pub name: String,
    /// Value of the reference field for multi-instance sensors.
    pub reference: Option<String>,
    pub icon: &'static str,
    pub unit: Option<Unit>,
    pub device_class: Option<DeviceClass>,
    pub state_class: Option<StateClass>,
    pub category: Option<EntityCategory>,
    pub group: DeviceGroup,
    pub kind: SensorKind,
    pub value: Option<SensorValue>,
    pub attributes: BTreeMap<String, Value>,
}

/// Resolve a descriptor against one entry.
///
/// Returns `None` only for a multi-instance descriptor whose entry lacks the
/// reference field, since such an entry cannot be identified.
pub fn resolve_entry(
    descriptor: &'static SensorDescriptor,
    entry: &Entry,
    instance: &str,
) -> Option<ResolvedSensor> {
    let reference = match descriptor.data_reference {
        Some(field) => match entry.get(field).and_then(scalar_string) {
            Some(reference) => Some(reference),
            None => {
                warn!(
                    "{} entry without '{}', cannot identify it",
                    descriptor.key, field
                );
                return None;
            }
        },
        None => None,
    };

    let unique_id = match &reference {
        Some(reference) => format!("{}-{}-{}", instance, descriptor.key, reference),
        None => format!("{}-{}", instance, descriptor.key),
    }
    .to_lowercase();

    let name = match descriptor.data_name {
        Some(field) => {
            let instance_name = entry
                .get(field)
                .and_then(scalar_string)
                .or_else(|| reference.clone())
                .unwrap_or_default();
            format!("{} {}", instance_name, descriptor.name)
                .trim()
                .to_string()
        }
        None => descriptor.name.to_string(),
    };

    let value = entry
        .get(descriptor.data_attribute)
        .and_then(|raw| SensorValue::from_field(descriptor, raw));

    let attributes = descriptor
        .attribute_fields()
        .iter()
        .filter_map(|field| {
            entry
                .get(*field)
                .map(|value| (format_attribute(field), value.clone()))
        })
        .collect();

    Some(ResolvedSensor {
        key: descriptor.key,
        unique_id,
        name,
        reference,
        icon: descriptor.icon,
        unit: descriptor.unit,
        device_class: descriptor.device_class,
        state_class: descriptor.state_class,
        category: descriptor.category,
        group: descriptor.group,
        kind: descriptor.kind,
        value,
        attributes,
    })
}

/// Resolve a descriptor against a whole payload: one sensor per entry of its
/// section, none when the section is absent.
///
/// Unique ids are case-folded, so entries whose references differ only in
/// case (`tank/Media`, `tank/media`) collide. Only the first entry with a
/// given id becomes an entity; the others are logged and dropped.
pub fn resolve(
    descriptor: &'static SensorDescriptor,
    payload: &Payload,
    instance: &str,
) -> Vec<ResolvedSensor> {
    let mut seen = HashSet::new();
    payload
        .entries(descriptor.data_path, descriptor.is_multi_instance())
        .into_iter()
        .filter_map(|entry| resolve_entry(descriptor, entry, instance))
        .filter(|sensor| {
            let first = seen.insert(sensor.unique_id.clone());
            if !first {
                warn!(
                    "{}: duplicate entity {}, keeping the first entry",
                    descriptor.key, sensor.unique_id
                );
            }
            first
        })
        .collect()
}

/// Resolves registry descriptors for one appliance instance.
#[derive(Debug, Clone)]
pub struct Resolver<'a> {
    registry: &'a SensorRegistry,
    instance: String,
    disabled: HashSet<String>,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a SensorRegistry, instance: impl Into<String>) -> Self {
        Self {
            registry,
            instance: instance.into(),
            disabled: HashSet::new(),
        }
    }

    /// Skip the given sensor keys in [`Resolver::resolve_all`].
    pub fn with_disabled<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disabled.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn resolve(&self, key: &str, payload: &Payload) -> Result<Vec<ResolvedSensor>> {
        let descriptor = self
            .registry
            .get(key)
            .ok_or_else(|| EntityError::UnknownSensor(key.to_string()))?;
        Ok(resolve(descriptor, payload, &self.instance))
    }

    pub fn resolve_all(&self, payload: &Payload) -> Vec<ResolvedSensor> {
        let sensors: Vec<ResolvedSensor> = self
            .registry
            .iter()
            .filter(|descriptor| !self.disabled.contains(descriptor.key))
            .flat_map(|descriptor| resolve(descriptor, payload, &self.instance))
            .collect();
        debug!("Resolved {} sensors for {}", sensors.len(), self.instance);
        sensors
    }
}
