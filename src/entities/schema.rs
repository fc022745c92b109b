//! Expected payload shape per data path.
//!
//! Only used to validate descriptors when the registry is built. Resolution
//! never consults it: a field missing from a live payload simply resolves to
//! no value.

use crate::entities::types::DataPath;
use serde::Serialize;
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FieldKind {
    Number,
    Text,
    Bool,
    /// Epoch seconds, or a `{"$date": millis}` object as the middleware emits.
    Timestamp,
    List,
    /// Loosely typed properties (ZFS values that are sometimes numeric).
    Any,
}

impl FieldKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, kind }
}

use FieldKind::*;

const SYSTEM_INFO: &[FieldSpec] = &[
    field("hostname", Text),
    field("version", Text),
    field("uptimeEpoch", Timestamp),
    field("cpu_temperature", Number),
    field("load_shortterm", Number),
    field("load_midterm", Number),
    field("load_longterm", Number),
    field("cpu_usage", Number),
    field("cpu_interrupt", Number),
    field("cpu_system", Number),
    field("cpu_user", Number),
    field("cpu_nice", Number),
    field("cpu_idle", Number),
    field("cache_size-arc_value", Number),
    field("cache_size-L2_value", Number),
    field("cache_ratio-arc_value", Number),
    field("cache_ratio-L2_value", Number),
];

const POOL: &[FieldSpec] = &[
    field("id", Number),
    field("guid", Text),
    field("name", Text),
    field("path", Text),
    field("status", Text),
    field("healthy", Bool),
    field("is_decrypted", Bool),
    field("autotrim", Any),
    field("scrub_state", Text),
    field("scrub_start", Timestamp),
    field("scrub_end", Timestamp),
    field("scrub_secs_left", Number),
    field("available_gib", Number),
    field("total_gib", Number),
];

const DATASET: &[FieldSpec] = &[
    field("id", Text),
    field("name", Text),
    field("type", Text),
    field("pool", Text),
    field("mountpoint", Text),
    field("deduplication", Text),
    field("atime", Any),
    field("casesensitivity", Text),
    field("checksum", Text),
    field("exec", Any),
    field("sync", Text),
    field("compression", Text),
    field("compressratio", Any),
    field("quota", Any),
    field("copies", Any),
    field("readonly", Any),
    field("recordsize", Any),
    field("encryption_algorithm", Text),
    field("used", Number),
    field("available", Number),
    field("used_gb", Number),
];

const DISK: &[FieldSpec] = &[
    field("name", Text),
    field("devname", Text),
    field("identifier", Text),
    field("serial", Text),
    field("size", Number),
    field("hddstandby", Text),
    field("hddstandby_force", Bool),
    field("advpowermgmt", Text),
    field("acousticlevel", Text),
    field("togglesmart", Bool),
    field("model", Text),
    field("rotationrate", Number),
    field("type", Text),
    field("temperature", Number),
];

const CLOUDSYNC: &[FieldSpec] = &[
    field("id", Number),
    field("description", Text),
    field("direction", Text),
    field("path", Text),
    field("enabled", Bool),
    field("transfer_mode", Text),
    field("snapshot", Bool),
    field("state", Text),
    field("time_started", Timestamp),
    field("time_finished", Timestamp),
    field("job_percent", Number),
    field("job_description", Text),
];

const REPLICATION: &[FieldSpec] = &[
    field("id", Number),
    field("name", Text),
    field("source_datasets", List),
    field("target_dataset", Text),
    field("recursive", Bool),
    field("enabled", Bool),
    field("direction", Text),
    field("transport", Text),
    field("auto", Bool),
    field("retention_policy", Text),
    field("state", Text),
    field("time_started", Timestamp),
    field("time_finished", Timestamp),
    field("job_percent", Number),
    field("job_description", Text),
];

const SNAPSHOTTASK: &[FieldSpec] = &[
    field("id", Number),
    field("dataset", Text),
    field("recursive", Bool),
    field("lifetime_value", Number),
    field("lifetime_unit", Text),
    field("enabled", Bool),
    field("naming_schema", Text),
    field("allow_empty", Bool),
    field("vmware_sync", Bool),
    field("state", Text),
    field("datetime", Timestamp),
];

const INTERFACE: &[FieldSpec] = &[
    field("id", Text),
    field("name", Text),
    field("description", Text),
    field("mtu", Number),
    field("link_state", Text),
    field("active_media_type", Text),
    field("active_media_subtype", Text),
    field("link_address", Text),
    field("if_octets_rx", Number),
    field("if_octets_tx", Number),
];

/// Fields an entry of `path` is expected to carry.
pub fn fields(path: DataPath) -> &'static [FieldSpec] {
    match path {
        DataPath::SystemInfo => SYSTEM_INFO,
        DataPath::Pool => POOL,
        DataPath::Dataset => DATASET,
        DataPath::Disk => DISK,
        DataPath::Cloudsync => CLOUDSYNC,
        DataPath::Replication => REPLICATION,
        DataPath::SnapshotTask => SNAPSHOTTASK,
        DataPath::Interface => INTERFACE,
    }
}

pub fn field_kind(path: DataPath, name: &str) -> Option<FieldKind> {
    fields(path)
        .iter()
        .find(|spec| spec.name == name)
        .map(|spec| spec.kind)
}
