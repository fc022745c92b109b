use crate::entities::attributes::AttributeGroup;
use crate::entities::schema::FieldKind;
use crate::entities::types::{DataPath, SensorKind};
use thiserror::Error;

/// A descriptor table that fails construction-time validation.
///
/// Every variant names the offending descriptor key so a broken table can be
/// fixed without bisecting it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("duplicate sensor key: {0}")]
    DuplicateKey(String),

    #[error("sensor {key}: {field} must not be empty")]
    EmptyField { key: String, field: &'static str },

    #[error("sensor {key}: field '{field}' is not part of the {path} payload")]
    UnknownField {
        key: String,
        path: DataPath,
        field: String,
    },

    #[error("sensor {key}: a reference field requires a name field")]
    MissingNameField { key: String },

    #[error("unknown attribute group: {0}")]
    UnknownAttributeGroup(String),

    #[error("sensor {key}: attribute group {group} belongs to {expected}, not {path}")]
    AttributeGroupMismatch {
        key: String,
        group: AttributeGroup,
        expected: DataPath,
        path: DataPath,
    },

    #[error("sensor {key}: unit {unit} does not fit device class {device_class}")]
    UnitMismatch {
        key: String,
        unit: String,
        device_class: String,
    },

    #[error("sensor {key}: timestamp sensors cannot carry a state class")]
    StateClassMismatch { key: String },

    #[error("sensor {key}: field '{field}' holds {actual} values, expected {expected}")]
    ValueKindMismatch {
        key: String,
        field: String,
        actual: FieldKind,
        expected: &'static str,
    },

    #[error("sensor {key}: {kind} sensors need a reference field to target actions")]
    MissingReferenceField { key: String, kind: SensorKind },

    #[error("sensor {key}: {kind} sensors must read from {expected}, not {path}")]
    KindPathMismatch {
        key: String,
        kind: SensorKind,
        expected: DataPath,
        path: DataPath,
    },
}

#[derive(Debug, Error)]
pub enum EntityError {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Unknown sensor: {0}")]
    UnknownSensor(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Action {action}: missing required parameter '{param}'")]
    MissingParameter { action: String, param: String },

    #[error("Action {action}: unknown parameter '{param}'")]
    UnknownParameter { action: String, param: String },

    #[error("Action {action} is not supported by entity {entity}")]
    ActionNotSupported { action: String, entity: String },

    #[error("Entity {entity} matches {entries} payload entries")]
    AmbiguousEntity { entity: String, entries: usize },

    #[error("Cloud sync job {0} is already running")]
    JobAlreadyRunning(String),

    #[error("Entity {entity}: payload field '{field}' is missing")]
    MissingField { entity: String, field: String },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP server error: {0}")]
    Server(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EntityError>;
