//! Sensor descriptors.
//!
//! [`SENSOR_DESCRIPTORS`] is the complete, compile-time table of sensors the
//! integration exposes. Each record couples presentation metadata with the
//! rule that extracts the value from a polled payload.

use crate::entities::attributes::AttributeGroup;
use crate::entities::types::{
    DataPath, DeviceClass, DeviceGroup, EntityCategory, SensorKind, StateClass, Unit,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SensorDescriptor {
    /// Unique across the registry.
    pub key: &'static str,
    /// Display name; for multi-instance sensors it is appended to the
    /// instance name and may be empty.
    pub name: &'static str,
    pub icon: &'static str,
    pub category: Option<EntityCategory>,
    pub unit: Option<Unit>,
    pub device_class: Option<DeviceClass>,
    pub state_class: Option<StateClass>,
    pub group: DeviceGroup,
    pub data_path: DataPath,
    pub data_attribute: &'static str,
    /// Field naming one instance of a multi-instance sensor.
    pub data_name: Option<&'static str>,
    /// Field identifying one instance of a multi-instance sensor.
    pub data_reference: Option<&'static str>,
    pub attributes: Option<AttributeGroup>,
    pub kind: SensorKind,
}

impl SensorDescriptor {
    /// One entity per payload entry rather than one per appliance.
    pub const fn is_multi_instance(&self) -> bool {
        self.data_reference.is_some()
    }

    pub fn attribute_fields(&self) -> &'static [&'static str] {
        self.attributes.map(AttributeGroup::fields).unwrap_or(&[])
    }
}

const SYSTEM: SensorDescriptor = SensorDescriptor {
    key: "",
    name: "",
    icon: "",
    category: Some(EntityCategory::Diagnostic),
    unit: None,
    device_class: None,
    state_class: Some(StateClass::Measurement),
    group: DeviceGroup::System,
    data_path: DataPath::SystemInfo,
    data_attribute: "",
    data_name: None,
    data_reference: None,
    attributes: None,
    kind: SensorKind::Generic,
};

const PER_INSTANCE: SensorDescriptor = SensorDescriptor {
    category: None,
    data_name: Some("name"),
    data_reference: Some("id"),
    ..SYSTEM
};

/// Job-like entities (cloud sync, replication, snapshot tasks) report a text
/// state and carry no unit or state class.
const JOB: SensorDescriptor = SensorDescriptor {
    state_class: None,
    data_attribute: "state",
    ..PER_INSTANCE
};

pub const SENSOR_DESCRIPTORS: &[SensorDescriptor] = &[
    SensorDescriptor {
        key: "system_uptime",
        name: "Uptime",
        icon: "mdi:clock-outline",
        device_class: Some(DeviceClass::Timestamp),
        state_class: None,
        data_attribute: "uptimeEpoch",
        ..SYSTEM
    },
    SensorDescriptor {
        key: "system_cpu_temperature",
        name: "Temperature",
        icon: "mdi:thermometer",
        unit: Some(Unit::Celsius),
        device_class: Some(DeviceClass::Temperature),
        data_attribute: "cpu_temperature",
        ..SYSTEM
    },
    SensorDescriptor {
        key: "system_load_shortterm",
        name: "CPU Load Shortterm",
        icon: "mdi:gauge",
        data_attribute: "load_shortterm",
        ..SYSTEM
    },
    SensorDescriptor {
        key: "system_load_midterm",
        name: "CPU Load Midterm",
        icon: "mdi:gauge",
        data_attribute: "load_midterm",
        ..SYSTEM
    },
    SensorDescriptor {
        key: "system_load_longterm",
        name: "CPU Load Longterm",
        icon: "mdi:gauge",
        data_attribute: "load_longterm",
        ..SYSTEM
    },
    SensorDescriptor {
        key: "system_cpu_usage",
        name: "CPU Usage",
        icon: "mdi:cpu-64-bit",
        unit: Some(Unit::Percentage),
        data_attribute: "cpu_usage",
        attributes: Some(AttributeGroup::Cpu),
        ..SYSTEM
    },
    SensorDescriptor {
        key: "system_cache_size-arc_value",
        name: "ARC Size",
        icon: "mdi:memory",
        unit: Some(Unit::Gibibytes),
        data_attribute: "cache_size-arc_value",
        ..SYSTEM
    },
    SensorDescriptor {
        key: "system_cache_size-L2_value",
        name: "L2ARC Size",
        icon: "mdi:memory",
        unit: Some(Unit::Gibibytes),
        data_attribute: "cache_size-L2_value",
        ..SYSTEM
    },
    SensorDescriptor {
        key: "system_cache_ratio-arc_value",
        name: "ARC Ratio",
        icon: "mdi:aspect-ratio",
        data_attribute: "cache_ratio-arc_value",
        ..SYSTEM
    },
    SensorDescriptor {
        key: "system_cache_ratio-L2_value",
        name: "L2ARC Ratio",
        icon: "mdi:aspect-ratio",
        data_attribute: "cache_ratio-L2_value",
        ..SYSTEM
    },
    SensorDescriptor {
        key: "dataset",
        icon: "mdi:database",
        unit: Some(Unit::Gibibytes),
        group: DeviceGroup::Datasets,
        data_path: DataPath::Dataset,
        data_attribute: "used_gb",
        attributes: Some(AttributeGroup::Dataset),
        kind: SensorKind::Dataset,
        ..PER_INSTANCE
    },
    SensorDescriptor {
        key: "disk",
        icon: "mdi:harddisk",
        unit: Some(Unit::Celsius),
        device_class: Some(DeviceClass::Temperature),
        group: DeviceGroup::Disks,
        data_path: DataPath::Disk,
        data_attribute: "temperature",
        data_reference: Some("devname"),
        attributes: Some(AttributeGroup::Disk),
        ..PER_INSTANCE
    },
    SensorDescriptor {
        key: "pool_free",
        name: "free",
        icon: "mdi:database-settings",
        unit: Some(Unit::Gibibytes),
        data_path: DataPath::Pool,
        data_attribute: "available_gib",
        data_reference: Some("guid"),
        attributes: Some(AttributeGroup::Pool),
        ..PER_INSTANCE
    },
    SensorDescriptor {
        key: "cloudsync",
        icon: "mdi:cloud-upload",
        group: DeviceGroup::Cloudsync,
        data_path: DataPath::Cloudsync,
        data_name: Some("description"),
        attributes: Some(AttributeGroup::Cloudsync),
        kind: SensorKind::CloudSync,
        ..JOB
    },
    SensorDescriptor {
        key: "replication",
        icon: "mdi:transfer",
        group: DeviceGroup::Replication,
        data_path: DataPath::Replication,
        attributes: Some(AttributeGroup::Replication),
        ..JOB
    },
    SensorDescriptor {
        key: "snapshottask",
        icon: "mdi:checkbox-marked-circle-plus-outline",
        group: DeviceGroup::SnapshotTasks,
        data_path: DataPath::SnapshotTask,
        data_name: Some("dataset"),
        attributes: Some(AttributeGroup::SnapshotTask),
        ..JOB
    },
    SensorDescriptor {
        key: "traffic_rx",
        name: "RX",
        icon: "mdi:download-network-outline",
        unit: Some(Unit::Kibibytes),
        data_path: DataPath::Interface,
        data_attribute: "if_octets_rx",
        attributes: Some(AttributeGroup::Network),
        ..PER_INSTANCE
    },
    SensorDescriptor {
        key: "traffic_tx",
        name: "TX",
        icon: "mdi:upload-network-outline",
        unit: Some(Unit::Kibibytes),
        data_path: DataPath::Interface,
        data_attribute: "if_octets_tx",
        attributes: Some(AttributeGroup::Network),
        ..PER_INSTANCE
    },
];
