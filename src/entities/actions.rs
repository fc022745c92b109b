//! Maintenance actions.
//!
//! The host exposes a small set of services that act on one entity. This
//! module declares them, validates the parameters a caller passes, and builds
//! the JSON-RPC request for the appliance's control API. Sending the request
//! is the appliance client's job.
//!
//! | service            | verb       | entity kind   | appliance method      |
//! |--------------------|------------|---------------|-----------------------|
//! | `cloudsync_run`    | `start`    | cloud sync    | `cloudsync.sync`      |
//! | `dataset_snapshot` | `snapshot` | dataset       | `zfs.snapshot.create` |

use crate::entities::descriptor::SensorDescriptor;
use crate::entities::registry::SensorRegistry;
use crate::entities::resolve::{resolve_entry, Entry, Payload};
use crate::entities::types::SensorKind;
use crate::error::{EntityError, Result};
use crate::truenas::types::JsonRpcRequest;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};
use strum::{Display, EnumString, IntoStaticStr};
use tracing::{debug, info};

pub const SERVICE_CLOUDSYNC_RUN: &str = "cloudsync_run";
pub const SERVICE_DATASET_SNAPSHOT: &str = "dataset_snapshot";

/// Parameter naming the target entity by its unique id.
pub const ATTR_ENTITY_ID: &str = "entity_id";

/// Job states in which a cloud sync task must not be started again.
const ACTIVE_JOB_STATES: &[&str] = &["RUNNING", "WAITING"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActionVerb {
    Start,
    Snapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionDescriptor {
    pub service: &'static str,
    pub schema: &'static [ParamSpec],
    pub verb: ActionVerb,
    pub applies_to: SensorKind,
}

const ENTITY_SCHEMA: &[ParamSpec] = &[ParamSpec {
    name: ATTR_ENTITY_ID,
    required: true,
}];

pub const SENSOR_SERVICES: &[ActionDescriptor] = &[
    ActionDescriptor {
        service: SERVICE_CLOUDSYNC_RUN,
        schema: ENTITY_SCHEMA,
        verb: ActionVerb::Start,
        applies_to: SensorKind::CloudSync,
    },
    ActionDescriptor {
        service: SERVICE_DATASET_SNAPSHOT,
        schema: ENTITY_SCHEMA,
        verb: ActionVerb::Snapshot,
        applies_to: SensorKind::Dataset,
    },
];

static BUILTIN: ActionRegistry = ActionRegistry {
    actions: SENSOR_SERVICES,
};

impl ActionDescriptor {
    /// Check caller parameters against the schema.
    pub fn validate_params(&self, params: &Map<String, Value>) -> Result<()> {
        for spec in self.schema.iter().filter(|spec| spec.required) {
            if params.get(spec.name).map_or(true, Value::is_null) {
                return Err(EntityError::MissingParameter {
                    action: self.service.to_string(),
                    param: spec.name.to_string(),
                });
            }
        }
        if let Some(unknown) = params
            .keys()
            .find(|name| !self.schema.iter().any(|spec| spec.name == name.as_str()))
        {
            return Err(EntityError::UnknownParameter {
                action: self.service.to_string(),
                param: unknown.clone(),
            });
        }
        Ok(())
    }

    /// Build the control request for the entity backed by `entry`.
    ///
    /// `now` names dataset snapshots; cloud sync requests ignore it.
    pub fn build_request(
        &self,
        descriptor: &SensorDescriptor,
        entry: &Entry,
        request_id: u64,
        now: DateTime<Utc>,
    ) -> Result<JsonRpcRequest> {
        if descriptor.kind != self.applies_to {
            return Err(EntityError::ActionNotSupported {
                action: self.service.to_string(),
                entity: descriptor.key.to_string(),
            });
        }

        match self.verb {
            ActionVerb::Start => {
                let id = require(descriptor, entry, descriptor.data_reference, "data_reference")?;
                let state = entry
                    .get(descriptor.data_attribute)
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                if ACTIVE_JOB_STATES.contains(&state) {
                    return Err(EntityError::JobAlreadyRunning(describe(descriptor, entry, id)));
                }
                Ok(JsonRpcRequest::call(
                    request_id,
                    "cloudsync.sync",
                    json!([id.clone()]),
                ))
            }
            ActionVerb::Snapshot => {
                let dataset = require(descriptor, entry, descriptor.data_name, "data_name")?;
                let name = format!("custom-{}", now.format("%Y-%m-%d_%H:%M:%S%.6f"));
                Ok(JsonRpcRequest::call(
                    request_id,
                    "zfs.snapshot.create",
                    json!([{ "dataset": dataset.clone(), "name": name }]),
                ))
            }
        }
    }
}

/// The non-null value of a descriptor-declared field. `role` names the
/// descriptor slot when the descriptor declares no field for it.
fn require<'e>(
    descriptor: &SensorDescriptor,
    entry: &'e Entry,
    field: Option<&str>,
    role: &str,
) -> Result<&'e Value> {
    let field = field.ok_or_else(|| EntityError::MissingField {
        entity: descriptor.key.to_string(),
        field: role.to_string(),
    })?;
    entry
        .get(field)
        .filter(|value| !value.is_null())
        .ok_or_else(|| EntityError::MissingField {
            entity: descriptor.key.to_string(),
            field: field.to_string(),
        })
}

fn describe(descriptor: &SensorDescriptor, entry: &Entry, id: &Value) -> String {
    descriptor
        .data_name
        .and_then(|field| entry.get(field))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| id.to_string())
}

/// The table of callable maintenance actions.
#[derive(Debug, Clone, Copy)]
pub struct ActionRegistry {
    actions: &'static [ActionDescriptor],
}

impl ActionRegistry {
    pub fn builtin() -> &'static ActionRegistry {
        &BUILTIN
    }

    pub fn get(&self, service: &str) -> Option<&'static ActionDescriptor> {
        self.actions.iter().find(|action| action.service == service)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static ActionDescriptor> {
        self.actions.iter()
    }

    /// Actions an entity of `kind` accepts.
    pub fn for_kind(&self, kind: SensorKind) -> impl Iterator<Item = &'static ActionDescriptor> {
        self.actions
            .iter()
            .filter(move |action| action.applies_to == kind)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Validate a service call and turn it into a control request.
    ///
    /// The `entity_id` parameter is matched against the unique ids of the
    /// entities `payload` resolves to for `instance`. An id shared by several
    /// entries is refused rather than guessed.
    pub fn prepare(
        &self,
        service: &str,
        params: &Map<String, Value>,
        registry: &SensorRegistry,
        payload: &Payload,
        instance: &str,
        request_id: u64,
    ) -> Result<JsonRpcRequest> {
        let action = self
            .get(service)
            .ok_or_else(|| EntityError::UnknownAction(service.to_string()))?;
        action.validate_params(params)?;

        let entity_id = params
            .get(ATTR_ENTITY_ID)
            .and_then(Value::as_str)
            .ok_or_else(|| EntityError::MissingParameter {
                action: service.to_string(),
                param: ATTR_ENTITY_ID.to_string(),
            })?;

        let mut targets = Vec::new();
        for descriptor in registry.iter() {
            for entry in payload.entries(descriptor.data_path, descriptor.is_multi_instance()) {
                let Some(sensor) = resolve_entry(descriptor, entry, instance) else {
                    continue;
                };
                if sensor.unique_id == entity_id {
                    targets.push((descriptor, entry));
                }
            }
        }

        match targets.as_slice() {
            [] => Err(EntityError::UnknownSensor(entity_id.to_string())),
            [(descriptor, entry)] => {
                debug!("{} targets {} ({})", service, entity_id, descriptor.key);
                let request = action.build_request(descriptor, entry, request_id, Utc::now())?;
                info!("Prepared {} for {}: {}", action.verb, entity_id, request.method);
                Ok(request)
            }
            _ => Err(EntityError::AmbiguousEntity {
                entity: entity_id.to_string(),
                entries: targets.len(),
            }),
        }
    }
}
