//! Entity descriptors and their resolution.
//!
//! - [`types`] - closed tag enums (units, classes, data paths, kinds)
//! - [`attributes`] - auxiliary attribute groups
//! - [`schema`] - expected payload fields per data path
//! - [`descriptor`] - the built-in sensor table
//! - [`registry`] - keyed, validated access to the table
//! - [`resolve`] - value, identity and attribute extraction
//! - [`actions`] - maintenance actions and their control requests

pub mod actions;
pub mod attributes;
pub mod descriptor;
pub mod registry;
pub mod resolve;
pub mod schema;
pub mod types;

pub use actions::{ActionDescriptor, ActionRegistry};
pub use attributes::AttributeGroup;
pub use descriptor::{SensorDescriptor, SENSOR_DESCRIPTORS};
pub use registry::SensorRegistry;
pub use resolve::{Payload, ResolvedSensor, Resolver, SensorValue};
