//! Auxiliary attribute groups.
//!
//! Each entity category surfaces a fixed set of secondary payload fields next
//! to its primary value. The lists here name those fields exactly as they
//! appear in the payload; [`format_attribute`] turns them into the labels the
//! host displays.

use crate::entities::types::DataPath;
use crate::error::RegistryError;
use serde::Serialize;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

pub const NETWORK: &[&str] = &[
    "description",
    "mtu",
    "link_state",
    "active_media_type",
    "active_media_subtype",
    "link_address",
];

pub const POOL: &[&str] = &[
    "path",
    "status",
    "healthy",
    "is_decrypted",
    "autotrim",
    "scrub_state",
    "scrub_start",
    "scrub_end",
    "scrub_secs_left",
];

pub const DATASET: &[&str] = &[
    "type",
    "pool",
    "mountpoint",
    "deduplication",
    "atime",
    "casesensitivity",
    "checksum",
    "exec",
    "sync",
    "compression",
    "compressratio",
    "quota",
    "copies",
    "readonly",
    "recordsize",
    "encryption_algorithm",
    "used",
    "available",
];

pub const DISK: &[&str] = &[
    "serial",
    "size",
    "hddstandby",
    "hddstandby_force",
    "advpowermgmt",
    "acousticlevel",
    "togglesmart",
    "model",
    "rotationrate",
    "type",
];

pub const CPU: &[&str] = &[
    "cpu_interrupt",
    "cpu_system",
    "cpu_user",
    "cpu_nice",
    "cpu_idle",
];

pub const CLOUDSYNC: &[&str] = &[
    "direction",
    "path",
    "enabled",
    "transfer_mode",
    "snapshot",
    "time_started",
    "time_finished",
    "job_percent",
    "job_description",
];

pub const REPLICATION: &[&str] = &[
    "source_datasets",
    "target_dataset",
    "recursive",
    "enabled",
    "direction",
    "transport",
    "auto",
    "retention_policy",
    "state",
    "time_started",
    "time_finished",
    "job_percent",
    "job_description",
];

pub const SNAPSHOTTASK: &[&str] = &[
    "recursive",
    "lifetime_value",
    "lifetime_unit",
    "enabled",
    "naming_schema",
    "allow_empty",
    "vmware_sync",
    "state",
    "datetime",
];

/// Named attribute list belonging to one entity category.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AttributeGroup {
    Network,
    Pool,
    Dataset,
    Disk,
    Cpu,
    Cloudsync,
    Replication,
    #[strum(to_string = "snapshottask")]
    #[serde(rename = "snapshottask")]
    SnapshotTask,
}

impl AttributeGroup {
    /// Resolve a group by name. There is no fuzzy matching.
    pub fn lookup(name: &str) -> Result<Self, RegistryError> {
        Self::from_str(name).map_err(|_| RegistryError::UnknownAttributeGroup(name.to_string()))
    }

    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Self::Network => NETWORK,
            Self::Pool => POOL,
            Self::Dataset => DATASET,
            Self::Disk => DISK,
            Self::Cpu => CPU,
            Self::Cloudsync => CLOUDSYNC,
            Self::Replication => REPLICATION,
            Self::SnapshotTask => SNAPSHOTTASK,
        }
    }

    /// The payload section whose entries carry this group's fields.
    pub fn data_path(self) -> DataPath {
        match self {
            Self::Network => DataPath::Interface,
            Self::Pool => DataPath::Pool,
            Self::Dataset => DataPath::Dataset,
            Self::Disk => DataPath::Disk,
            Self::Cpu => DataPath::SystemInfo,
            Self::Cloudsync => DataPath::Cloudsync,
            Self::Replication => DataPath::Replication,
            Self::SnapshotTask => DataPath::SnapshotTask,
        }
    }
}

const ACRONYMS: &[&str] = &["ip", "mac", "mtu", "arc", "l2", "l2arc", "cpu", "id"];

/// Turn a payload field name into a display label.
///
/// `link_state` becomes `Link state`, `mtu` becomes `MTU`.
pub fn format_attribute(field: &str) -> String {
    field
        .split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .enumerate()
        .map(|(i, word)| {
            let lower = word.to_lowercase();
            if ACRONYMS.contains(&lower.as_str()) {
                lower.to_uppercase()
            } else if i == 0 {
                let mut chars = lower.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => lower,
                }
            } else {
                lower
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
