//! TrueNAS Scale Entity Descriptors
//!
//! Describes how a TrueNAS Scale appliance's monitoring data is exposed as
//! entities of a home-automation platform.
//!
//! # Overview
//!
//! Every sensor is a static [`SensorDescriptor`](entities::SensorDescriptor):
//! presentation metadata (name, icon, unit, device and state class) plus the
//! rule that extracts its value from a polled payload (section, field, name
//! and reference fields, auxiliary attributes). The table is validated once
//! and shared read-only for the lifetime of the process.
//!
//! ```text
//! ┌──────────────┐   payload    ┌────────────────────────────┐   entities   ┌──────────┐
//! │  appliance   │ ───────────► │  SensorRegistry + Resolver │ ───────────► │   host   │
//! │   client     │   sections   │  ActionRegistry            │   requests   │ platform │
//! └──────────────┘              └────────────────────────────┘              └──────────┘
//! ```
//!
//! Polling the appliance and managing entity lifecycles happen outside this
//! crate.
//!
//! # Modules
//!
//! - [`entities`] - descriptors, registry, resolution and actions
//! - [`truenas`] - JSON-RPC request type for control calls
//! - [`metrics`] - Prometheus rendering of resolved sensors
//! - [`server`] - HTTP surface
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//!
//! # Quick Start
//!
//! ```
//! use truenas_entities::entities::{Payload, Resolver, SensorRegistry};
//! use truenas_entities::entities::types::DataPath;
//!
//! let registry = SensorRegistry::builtin().unwrap();
//! let payload = Payload::new()
//!     .with_section(DataPath::SystemInfo, serde_json::json!({"cpu_usage": 12.5}));
//!
//! let sensors = Resolver::new(registry, "truenas")
//!     .resolve("system_cpu_usage", &payload)
//!     .unwrap();
//! assert_eq!(sensors[0].value.as_ref().and_then(|v| v.as_f64()), Some(12.5));
//! ```

pub mod config;
pub mod entities;
pub mod error;
pub mod metrics;
pub mod server;
pub mod truenas;
