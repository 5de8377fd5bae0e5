use crate::{
    proto::{ProtoMessage, ProtoSize, ProtoWriteBuffer},
    types::EntityCategory,
};

use super::MessageKind;

/// Fields every `ListEntities*Response` carries. `object_id` is left empty
/// for clients that no longer need the legacy identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InfoCommon<'a> {
    pub object_id: &'a str,
    pub key: u32,
    pub name: &'a str,
    pub icon: &'a str,
    pub disabled_by_default: bool,
    pub entity_category: EntityCategory,
    pub device_id: u32,
}

// object_id, key and name share field numbers 1..3 across the catalog, the
// rest moved around as the schemas grew
struct InfoLayout {
    icon: u32,
    disabled_by_default: u32,
    entity_category: u32,
    device_id: u32,
}

impl InfoCommon<'_> {
    fn encode(&self, layout: &InfoLayout, buffer: &mut ProtoWriteBuffer) {
        buffer.encode_string(1, self.object_id, false);
        buffer.encode_fixed32(2, self.key, false);
        buffer.encode_string(3, self.name, false);
        buffer.encode_string(layout.icon, self.icon, false);
        buffer.encode_bool(layout.disabled_by_default, self.disabled_by_default, false);
        buffer.encode_uint32(layout.entity_category, self.entity_category as u32, false);
        buffer.encode_uint32(layout.device_id, self.device_id, false);
    }

    fn add_size(&self, layout: &InfoLayout, size: &mut ProtoSize) {
        size.add_string(1, self.object_id, false);
        size.add_fixed32(2, self.key, false);
        size.add_string(3, self.name, false);
        size.add_string(layout.icon, self.icon, false);
        size.add_bool(layout.disabled_by_default, self.disabled_by_default, false);
        size.add_uint32(layout.entity_category, self.entity_category as u32, false);
        size.add_uint32(layout.device_id, self.device_id, false);
    }
}

// Binary sensor

const BINARY_SENSOR_LAYOUT: InfoLayout = InfoLayout {
    icon: 8,
    disabled_by_default: 7,
    entity_category: 9,
    device_id: 10,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListEntitiesBinarySensorResponse<'a> {
    pub common: InfoCommon<'a>,
    pub device_class: &'a str,
    pub is_status_binary_sensor: bool,
}

impl ProtoMessage for ListEntitiesBinarySensorResponse<'_> {
    fn kind(&self) -> MessageKind {
        MessageKind::ListEntitiesBinarySensorResponse
    }

    fn encode(&self, buffer: &mut ProtoWriteBuffer) {
        self.common.encode(&BINARY_SENSOR_LAYOUT, buffer);
        buffer.encode_string(5, self.device_class, false);
        buffer.encode_bool(6, self.is_status_binary_sensor, false);
    }

    fn calculate_size(&self) -> usize {
        let mut size = ProtoSize::new();
        self.common.add_size(&BINARY_SENSOR_LAYOUT, &mut size);
        size.add_string(5, self.device_class, false);
        size.add_bool(6, self.is_status_binary_sensor, false);
        size.get()
    }
}

// Sensor

const SENSOR_LAYOUT: InfoLayout = InfoLayout {
    icon: 5,
    disabled_by_default: 12,
    entity_category: 13,
    device_id: 14,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum SensorStateClass {
    #[default]
    None = 0,
    Measurement = 1,
    TotalIncreasing = 2,
    Total = 3,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListEntitiesSensorResponse<'a> {
    pub common: InfoCommon<'a>,
    pub unit_of_measurement: &'a str,
    pub accuracy_decimals: i32,
    pub force_update: bool,
    pub device_class: &'a str,
    pub state_class: SensorStateClass,
}

impl ProtoMessage for ListEntitiesSensorResponse<'_> {
    fn kind(&self) -> MessageKind {
        MessageKind::ListEntitiesSensorResponse
    }

    fn encode(&self, buffer: &mut ProtoWriteBuffer) {
        self.common.encode(&SENSOR_LAYOUT, buffer);
        buffer.encode_string(6, self.unit_of_measurement, false);
        buffer.encode_int32(7, self.accuracy_decimals, false);
        buffer.encode_bool(8, self.force_update, false);
        buffer.encode_string(9, self.device_class, false);
        buffer.encode_uint32(10, self.state_class as u32, false);
    }

    fn calculate_size(&self) -> usize {
        let mut size = ProtoSize::new();
        self.common.add_size(&SENSOR_LAYOUT, &mut size);
        size.add_string(6, self.unit_of_measurement, false);
        size.add_int32(7, self.accuracy_decimals, false);
        size.add_bool(8, self.force_update, false);
        size.add_string(9, self.device_class, false);
        size.add_uint32(10, self.state_class as u32, false);
        size.get()
    }
}

// Switch

const SWITCH_LAYOUT: InfoLayout = InfoLayout {
    icon: 5,
    disabled_by_default: 7,
    entity_category: 8,
    device_id: 10,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListEntitiesSwitchResponse<'a> {
    pub common: InfoCommon<'a>,
    pub assumed_state: bool,
    pub device_class: &'a str,
}

impl ProtoMessage for ListEntitiesSwitchResponse<'_> {
    fn kind(&self) -> MessageKind {
        MessageKind::ListEntitiesSwitchResponse
    }

    fn encode(&self, buffer: &mut ProtoWriteBuffer) {
        self.common.encode(&SWITCH_LAYOUT, buffer);
        buffer.encode_bool(6, self.assumed_state, false);
        buffer.encode_string(9, self.device_class, false);
    }

    fn calculate_size(&self) -> usize {
        let mut size = ProtoSize::new();
        self.common.add_size(&SWITCH_LAYOUT, &mut size);
        size.add_bool(6, self.assumed_state, false);
        size.add_string(9, self.device_class, false);
        size.get()
    }
}

// Text sensor

const TEXT_SENSOR_LAYOUT: InfoLayout = InfoLayout {
    icon: 5,
    disabled_by_default: 6,
    entity_category: 7,
    device_id: 9,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListEntitiesTextSensorResponse<'a> {
    pub common: InfoCommon<'a>,
    pub device_class: &'a str,
}

impl ProtoMessage for ListEntitiesTextSensorResponse<'_> {
    fn kind(&self) -> MessageKind {
        MessageKind::ListEntitiesTextSensorResponse
    }

    fn encode(&self, buffer: &mut ProtoWriteBuffer) {
        self.common.encode(&TEXT_SENSOR_LAYOUT, buffer);
        buffer.encode_string(8, self.device_class, false);
    }

    fn calculate_size(&self) -> usize {
        let mut size = ProtoSize::new();
        self.common.add_size(&TEXT_SENSOR_LAYOUT, &mut size);
        size.add_string(8, self.device_class, false);
        size.get()
    }
}

// Number

const NUMBER_LAYOUT: InfoLayout = InfoLayout {
    icon: 5,
    disabled_by_default: 9,
    entity_category: 10,
    device_id: 14,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum NumberMode {
    #[default]
    Auto = 0,
    Box = 1,
    Slider = 2,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListEntitiesNumberResponse<'a> {
    pub common: InfoCommon<'a>,
    pub min_value: f32,
    pub max_value: f32,
    pub step: f32,
    pub unit_of_measurement: &'a str,
    pub mode: NumberMode,
    pub device_class: &'a str,
}

impl ProtoMessage for ListEntitiesNumberResponse<'_> {
    fn kind(&self) -> MessageKind {
        MessageKind::ListEntitiesNumberResponse
    }

    fn encode(&self, buffer: &mut ProtoWriteBuffer) {
        self.common.encode(&NUMBER_LAYOUT, buffer);
        buffer.encode_float(6, self.min_value, false);
        buffer.encode_float(7, self.max_value, false);
        buffer.encode_float(8, self.step, false);
        buffer.encode_string(11, self.unit_of_measurement, false);
        buffer.encode_uint32(12, self.mode as u32, false);
        buffer.encode_string(13, self.device_class, false);
    }

    fn calculate_size(&self) -> usize {
        let mut size = ProtoSize::new();
        self.common.add_size(&NUMBER_LAYOUT, &mut size);
        size.add_float(6, self.min_value, false);
        size.add_float(7, self.max_value, false);
        size.add_float(8, self.step, false);
        size.add_string(11, self.unit_of_measurement, false);
        size.add_uint32(12, self.mode as u32, false);
        size.add_string(13, self.device_class, false);
        size.get()
    }
}

// Event

const EVENT_LAYOUT: InfoLayout = InfoLayout {
    icon: 5,
    disabled_by_default: 6,
    entity_category: 7,
    device_id: 10,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListEntitiesEventResponse<'a> {
    pub common: InfoCommon<'a>,
    pub device_class: &'a str,
    pub event_types: &'a [String],
}

impl ProtoMessage for ListEntitiesEventResponse<'_> {
    fn kind(&self) -> MessageKind {
        MessageKind::ListEntitiesEventResponse
    }

    fn encode(&self, buffer: &mut ProtoWriteBuffer) {
        self.common.encode(&EVENT_LAYOUT, buffer);
        buffer.encode_string(8, self.device_class, false);
        for event_type in self.event_types {
            buffer.encode_string(9, event_type, true);
        }
    }

    fn calculate_size(&self) -> usize {
        let mut size = ProtoSize::new();
        self.common.add_size(&EVENT_LAYOUT, &mut size);
        size.add_string(8, self.device_class, false);
        for event_type in self.event_types {
            size.add_string(9, event_type, true);
        }
        size.get()
    }
}

// Update

const UPDATE_LAYOUT: InfoLayout = InfoLayout {
    icon: 5,
    disabled_by_default: 6,
    entity_category: 7,
    device_id: 9,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListEntitiesUpdateResponse<'a> {
    pub common: InfoCommon<'a>,
    pub device_class: &'a str,
}

impl ProtoMessage for ListEntitiesUpdateResponse<'_> {
    fn kind(&self) -> MessageKind {
        MessageKind::ListEntitiesUpdateResponse
    }

    fn encode(&self, buffer: &mut ProtoWriteBuffer) {
        self.common.encode(&UPDATE_LAYOUT, buffer);
        buffer.encode_string(8, self.device_class, false);
    }

    fn calculate_size(&self) -> usize {
        let mut size = ProtoSize::new();
        self.common.add_size(&UPDATE_LAYOUT, &mut size);
        size.add_string(8, self.device_class, false);
        size.get()
    }
}
