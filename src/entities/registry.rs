//! Sensor registry.
//!
//! Indexes a descriptor table by key and validates it once, at construction.
//! The built-in registry lives for the whole process and is never mutated.

use crate::entities::descriptor::{SensorDescriptor, SENSOR_DESCRIPTORS};
use crate::entities::schema::{self, FieldKind};
use crate::entities::types::{DataPath, DeviceClass, Unit};
use crate::error::RegistryError;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, info};

static BUILTIN: LazyLock<Result<SensorRegistry, RegistryError>> =
    LazyLock::new(|| SensorRegistry::new(SENSOR_DESCRIPTORS));

#[derive(Debug, Clone)]
pub struct SensorRegistry {
    descriptors: &'static [SensorDescriptor],
    index: HashMap<&'static str, usize>,
}

impl SensorRegistry {
    /// Build a registry over `descriptors`, rejecting the first malformed
    /// record.
    pub fn new(descriptors: &'static [SensorDescriptor]) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(descriptors.len());

        for (position, descriptor) in descriptors.iter().enumerate() {
            validate(descriptor)?;
            if index.insert(descriptor.key, position).is_some() {
                return Err(RegistryError::DuplicateKey(descriptor.key.to_string()));
            }
            debug!(key = descriptor.key, path = %descriptor.data_path, "registered sensor");
        }

        info!("Sensor registry built with {} descriptors", descriptors.len());
        Ok(Self { descriptors, index })
    }

    /// The process-wide registry over [`SENSOR_DESCRIPTORS`].
    pub fn builtin() -> Result<&'static SensorRegistry, RegistryError> {
        BUILTIN.as_ref().map_err(Clone::clone)
    }

    /// Exact-match lookup.
    pub fn get(&self, key: &str) -> Option<&'static SensorDescriptor> {
        let descriptors = self.descriptors;
        self.index.get(key).map(|&position| &descriptors[position])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Descriptors in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &'static SensorDescriptor> {
        self.descriptors.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> {
        self.descriptors.iter().map(|d| d.key)
    }

    pub fn by_path(&self, path: DataPath) -> impl Iterator<Item = &'static SensorDescriptor> {
        self.descriptors.iter().filter(move |d| d.data_path == path)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Check one descriptor against the payload schema and its own presentation
/// metadata.
pub fn validate(descriptor: &SensorDescriptor) -> Result<(), RegistryError> {
    let key = descriptor.key;
    let path = descriptor.data_path;

    if key.is_empty() {
        return Err(RegistryError::EmptyField {
            key: key.to_string(),
            field: "key",
        });
    }
    if descriptor.data_attribute.is_empty() {
        return Err(RegistryError::EmptyField {
            key: key.to_string(),
            field: "data_attribute",
        });
    }

    let value_kind = require_field(key, path, descriptor.data_attribute)?;
    if let Some(name) = descriptor.data_name {
        require_field(key, path, name)?;
    }
    if let Some(reference) = descriptor.data_reference {
        require_field(key, path, reference)?;
        if descriptor.data_name.is_none() {
            return Err(RegistryError::MissingNameField {
                key: key.to_string(),
            });
        }
    }

    if let Some(group) = descriptor.attributes {
        if group.data_path() != path {
            return Err(RegistryError::AttributeGroupMismatch {
                key: key.to_string(),
                group,
                expected: group.data_path(),
                path,
            });
        }
        for field in group.fields() {
            require_field(key, path, field)?;
        }
    }

    if let Some(expected) = descriptor.kind.required_path() {
        if expected != path {
            return Err(RegistryError::KindPathMismatch {
                key: key.to_string(),
                kind: descriptor.kind,
                expected,
                path,
            });
        }
        // Actions address an entry through its reference and name fields
        if descriptor.data_reference.is_none() {
            return Err(RegistryError::MissingReferenceField {
                key: key.to_string(),
                kind: descriptor.kind,
            });
        }
    }

    check_presentation(descriptor, value_kind)
}

fn require_field(key: &str, path: DataPath, field: &str) -> Result<FieldKind, RegistryError> {
    schema::field_kind(path, field).ok_or_else(|| RegistryError::UnknownField {
        key: key.to_string(),
        path,
        field: field.to_string(),
    })
}

fn check_presentation(
    descriptor: &SensorDescriptor,
    value_kind: FieldKind,
) -> Result<(), RegistryError> {
    let key = descriptor.key;
    let unit_mismatch = |unit: Option<Unit>, device_class: DeviceClass| RegistryError::UnitMismatch {
        key: key.to_string(),
        unit: unit.map_or_else(|| "none".to_string(), |u| u.to_string()),
        device_class: device_class.to_string(),
    };

    match descriptor.device_class {
        Some(DeviceClass::Temperature) => {
            if descriptor.unit.is_some_and(|u| !u.is_temperature()) {
                return Err(unit_mismatch(descriptor.unit, DeviceClass::Temperature));
            }
        }
        Some(DeviceClass::Timestamp) => {
            if descriptor.unit.is_some() {
                return Err(unit_mismatch(descriptor.unit, DeviceClass::Timestamp));
            }
            if descriptor.state_class.is_some() {
                return Err(RegistryError::StateClassMismatch {
                    key: key.to_string(),
                });
            }
            if !matches!(value_kind, FieldKind::Timestamp | FieldKind::Number) {
                return Err(value_mismatch(descriptor, value_kind, "timestamp"));
            }
            return Ok(());
        }
        None => {
            // A temperature unit without the temperature class would be
            // rendered as a bare number by the host.
            if let Some(unit) = descriptor.unit.filter(|u| u.is_temperature()) {
                return Err(RegistryError::UnitMismatch {
                    key: key.to_string(),
                    unit: unit.to_string(),
                    device_class: "none".to_string(),
                });
            }
        }
    }

    let numeric = descriptor.unit.is_some()
        || descriptor.state_class.is_some()
        || descriptor.device_class == Some(DeviceClass::Temperature);
    if numeric && !value_kind.is_numeric() {
        return Err(value_mismatch(descriptor, value_kind, "number"));
    }

    Ok(())
}

fn value_mismatch(
    descriptor: &SensorDescriptor,
    actual: FieldKind,
    expected: &'static str,
) -> RegistryError {
    RegistryError::ValueKindMismatch {
        key: descriptor.key.to_string(),
        field: descriptor.data_attribute.to_string(),
        actual,
        expected,
    }
}
