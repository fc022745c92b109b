//! Closed tag types used by sensor descriptors.
//!
//! The host platform identifies units, device classes and state classes by
//! their string form; the `Display`/`FromStr` impls produce exactly those
//! strings so descriptors can be rendered for the host without a lookup table.

use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Unit of measurement of a sensor's native value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter, IntoStaticStr,
)]
pub enum Unit {
    #[strum(to_string = "%")]
    #[serde(rename = "%")]
    Percentage,
    #[strum(to_string = "°C")]
    #[serde(rename = "°C")]
    Celsius,
    #[strum(to_string = "GiB")]
    #[serde(rename = "GiB")]
    Gibibytes,
    #[strum(to_string = "KiB")]
    #[serde(rename = "KiB")]
    Kibibytes,
}

impl Unit {
    pub fn symbol(self) -> &'static str {
        self.into()
    }

    pub fn is_temperature(self) -> bool {
        matches!(self, Self::Celsius)
    }
}

/// Semantic class of a sensor, drives how the host formats the value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeviceClass {
    Temperature,
    Timestamp,
}

/// Aggregation hint for long-term statistics.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StateClass {
    Measurement,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityCategory {
    Diagnostic,
}

/// Top-level section of a polled payload.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter, IntoStaticStr,
)]
pub enum DataPath {
    #[strum(to_string = "system_info")]
    #[serde(rename = "system_info")]
    SystemInfo,
    #[strum(to_string = "pool")]
    #[serde(rename = "pool")]
    Pool,
    #[strum(to_string = "dataset")]
    #[serde(rename = "dataset")]
    Dataset,
    #[strum(to_string = "disk")]
    #[serde(rename = "disk")]
    Disk,
    #[strum(to_string = "cloudsync")]
    #[serde(rename = "cloudsync")]
    Cloudsync,
    #[strum(to_string = "replication")]
    #[serde(rename = "replication")]
    Replication,
    #[strum(to_string = "snapshottask")]
    #[serde(rename = "snapshottask")]
    SnapshotTask,
    #[strum(to_string = "interface")]
    #[serde(rename = "interface")]
    Interface,
}

impl DataPath {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Device an entity is grouped under on the host.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter, IntoStaticStr,
)]
pub enum DeviceGroup {
    System,
    Datasets,
    Disks,
    Cloudsync,
    Replication,
    #[strum(to_string = "Snapshot tasks")]
    #[serde(rename = "Snapshot tasks")]
    SnapshotTasks,
}

/// Presentation behavior of a sensor.
///
/// `Generic` sensors only report a value. The specialised kinds additionally
/// accept a maintenance action (see [`crate::entities::actions`]) and are
/// bound to the one data path that carries the fields those actions need.
/// Value extraction is the same for every kind.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SensorKind {
    Generic,
    Dataset,
    #[strum(to_string = "cloudsync")]
    #[serde(rename = "cloudsync")]
    CloudSync,
}

impl SensorKind {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// The data path a specialised kind is tied to, `None` for generic sensors.
    pub fn required_path(self) -> Option<DataPath> {
        match self {
            Self::Generic => None,
            Self::Dataset => Some(DataPath::Dataset),
            Self::CloudSync => Some(DataPath::Cloudsync),
        }
    }
}
