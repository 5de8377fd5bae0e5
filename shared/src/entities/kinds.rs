use std::any::Any;

use crate::{
    api_version::ApiVersion,
    messages::{
        BinarySensorStateResponse, EventResponse, ListEntitiesBinarySensorResponse,
        ListEntitiesEventResponse, ListEntitiesNumberResponse, ListEntitiesSensorResponse,
        ListEntitiesServicesResponse, ListEntitiesSwitchResponse, ListEntitiesTextSensorResponse,
        ListEntitiesUpdateResponse, NumberMode, NumberStateResponse, SensorStateClass,
        SensorStateResponse, ServiceArgument, SwitchStateResponse, TextSensorStateResponse,
        UpdateStateResponse,
    },
    proto::ProtoMessage,
};

use super::{Entity, EntityCommon, EntityKind};

macro_rules! entity_boilerplate {
    ($kind:ident) => {
        fn common(&self) -> &EntityCommon {
            &self.common
        }

        fn kind(&self) -> EntityKind {
            EntityKind::$kind
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    };
}

#[derive(Debug, Clone, Default)]
pub struct BinarySensor {
    pub common: EntityCommon,
    pub device_class: String,
    pub is_status_binary_sensor: bool,
    pub state: Option<bool>,
}

impl BinarySensor {
    pub fn new(object_id: &str, name: &str, key: u32) -> Self {
        Self {
            common: EntityCommon::new(object_id, name, key),
            ..Default::default()
        }
    }
}

impl Entity for BinarySensor {
    entity_boilerplate!(BinarySensor);

    fn info_message(&self, version: ApiVersion) -> Box<dyn ProtoMessage + '_> {
        Box::new(ListEntitiesBinarySensorResponse {
            common: self.common.info_common(version),
            device_class: &self.device_class,
            is_status_binary_sensor: self.is_status_binary_sensor,
        })
    }

    fn state_message(&self, _aux: Option<u8>) -> Option<Box<dyn ProtoMessage + '_>> {
        Some(Box::new(BinarySensorStateResponse {
            key: self.common.key,
            state: self.state.unwrap_or_default(),
            missing_state: self.state.is_none(),
            device_id: self.common.device_id,
        }))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Sensor {
    pub common: EntityCommon,
    pub unit_of_measurement: String,
    pub accuracy_decimals: i32,
    pub force_update: bool,
    pub device_class: String,
    pub state_class: SensorStateClass,
    pub state: Option<f32>,
}

impl Sensor {
    pub fn new(object_id: &str, name: &str, key: u32) -> Self {
        Self {
            common: EntityCommon::new(object_id, name, key),
            ..Default::default()
        }
    }
}

impl Entity for Sensor {
    entity_boilerplate!(Sensor);

    fn info_message(&self, version: ApiVersion) -> Box<dyn ProtoMessage + '_> {
        Box::new(ListEntitiesSensorResponse {
            common: self.common.info_common(version),
            unit_of_measurement: &self.unit_of_measurement,
            accuracy_decimals: self.accuracy_decimals,
            force_update: self.force_update,
            device_class: &self.device_class,
            state_class: self.state_class,
        })
    }

    fn state_message(&self, _aux: Option<u8>) -> Option<Box<dyn ProtoMessage + '_>> {
        // NaN is how a sensor reports "no reading"
        let state = self.state.filter(|value| !value.is_nan());
        Some(Box::new(SensorStateResponse {
            key: self.common.key,
            state: state.unwrap_or_default(),
            missing_state: state.is_none(),
            device_id: self.common.device_id,
        }))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Switch {
    pub common: EntityCommon,
    pub assumed_state: bool,
    pub device_class: String,
    pub state: bool,
}

impl Switch {
    pub fn new(object_id: &str, name: &str, key: u32) -> Self {
        Self {
            common: EntityCommon::new(object_id, name, key),
            ..Default::default()
        }
    }
}

impl Entity for Switch {
    entity_boilerplate!(Switch);

    fn info_message(&self, version: ApiVersion) -> Box<dyn ProtoMessage + '_> {
        Box::new(ListEntitiesSwitchResponse {
            common: self.common.info_common(version),
            assumed_state: self.assumed_state,
            device_class: &self.device_class,
        })
    }

    fn state_message(&self, _aux: Option<u8>) -> Option<Box<dyn ProtoMessage + '_>> {
        Some(Box::new(SwitchStateResponse {
            key: self.common.key,
            state: self.state,
            device_id: self.common.device_id,
        }))
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextSensor {
    pub common: EntityCommon,
    pub device_class: String,
    pub state: Option<String>,
}

impl TextSensor {
    pub fn new(object_id: &str, name: &str, key: u32) -> Self {
        Self {
            common: EntityCommon::new(object_id, name, key),
            ..Default::default()
        }
    }
}

impl Entity for TextSensor {
    entity_boilerplate!(TextSensor);

    fn info_message(&self, version: ApiVersion) -> Box<dyn ProtoMessage + '_> {
        Box::new(ListEntitiesTextSensorResponse {
            common: self.common.info_common(version),
            device_class: &self.device_class,
        })
    }

    fn state_message(&self, _aux: Option<u8>) -> Option<Box<dyn ProtoMessage + '_>> {
        Some(Box::new(TextSensorStateResponse {
            key: self.common.key,
            state: self.state.clone().unwrap_or_default(),
            missing_state: self.state.is_none(),
            device_id: self.common.device_id,
        }))
    }
}

/// A user-defined action the client may invoke with `ExecuteServiceRequest`
#[derive(Debug, Clone, Default)]
pub struct Service {
    pub common: EntityCommon,
    pub args: Vec<ServiceArgument>,
    /// Whether invocations may ask for an `ExecuteServiceResponse`
    pub supports_response: bool,
}

impl Service {
    pub fn new(name: &str, key: u32) -> Self {
        Self {
            common: EntityCommon::new(name, name, key),
            ..Default::default()
        }
    }
}

impl Entity for Service {
    entity_boilerplate!(Service);

    fn info_message(&self, _version: ApiVersion) -> Box<dyn ProtoMessage + '_> {
        Box::new(ListEntitiesServicesResponse {
            name: &self.common.name,
            key: self.common.key,
            args: &self.args,
        })
    }

    fn state_message(&self, _aux: Option<u8>) -> Option<Box<dyn ProtoMessage + '_>> {
        None
    }
}

#[derive(Debug, Clone, Default)]
pub struct Number {
    pub common: EntityCommon,
    pub min_value: f32,
    pub max_value: f32,
    pub step: f32,
    pub unit_of_measurement: String,
    pub mode: NumberMode,
    pub device_class: String,
    pub state: Option<f32>,
}

impl Number {
    pub fn new(object_id: &str, name: &str, key: u32) -> Self {
        Self {
            common: EntityCommon::new(object_id, name, key),
            step: 1.0,
            max_value: 100.0,
            ..Default::default()
        }
    }
}

impl Entity for Number {
    entity_boilerplate!(Number);

    fn info_message(&self, version: ApiVersion) -> Box<dyn ProtoMessage + '_> {
        Box::new(ListEntitiesNumberResponse {
            common: self.common.info_common(version),
            min_value: self.min_value,
            max_value: self.max_value,
            step: self.step,
            unit_of_measurement: &self.unit_of_measurement,
            mode: self.mode,
            device_class: &self.device_class,
        })
    }

    fn state_message(&self, _aux: Option<u8>) -> Option<Box<dyn ProtoMessage + '_>> {
        let state = self.state.filter(|value| !value.is_nan());
        Some(Box::new(NumberStateResponse {
            key: self.common.key,
            state: state.unwrap_or_default(),
            missing_state: state.is_none(),
            device_id: self.common.device_id,
        }))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Event {
    pub common: EntityCommon,
    pub device_class: String,
    pub event_types: Vec<String>,
}

impl Event {
    pub fn new(object_id: &str, name: &str, key: u32, event_types: &[&str]) -> Self {
        Self {
            common: EntityCommon::new(object_id, name, key),
            event_types: event_types.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn event_type_index(&self, event_type: &str) -> Option<u8> {
        self.event_types
            .iter()
            .position(|candidate| candidate == event_type)
            .and_then(|index| u8::try_from(index).ok())
    }
}

impl Entity for Event {
    entity_boilerplate!(Event);

    fn info_message(&self, version: ApiVersion) -> Box<dyn ProtoMessage + '_> {
        Box::new(ListEntitiesEventResponse {
            common: self.common.info_common(version),
            device_class: &self.device_class,
            event_types: &self.event_types,
        })
    }

    fn state_message(&self, aux: Option<u8>) -> Option<Box<dyn ProtoMessage + '_>> {
        let event_type = self.event_types.get(usize::from(aux?))?;
        Some(Box::new(EventResponse {
            key: self.common.key,
            event_type: event_type.clone(),
            device_id: self.common.device_id,
        }))
    }
}

/// Firmware update status as reported by an update entity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateInfo {
    pub in_progress: bool,
    pub has_progress: bool,
    pub progress: f32,
    pub current_version: String,
    pub latest_version: String,
    pub title: String,
    pub release_summary: String,
    pub release_url: String,
}

#[derive(Debug, Clone, Default)]
pub struct Update {
    pub common: EntityCommon,
    pub device_class: String,
    pub state: Option<UpdateInfo>,
}

impl Update {
    pub fn new(object_id: &str, name: &str, key: u32) -> Self {
        Self {
            common: EntityCommon::new(object_id, name, key),
            ..Default::default()
        }
    }
}

impl Entity for Update {
    entity_boilerplate!(Update);

    fn info_message(&self, version: ApiVersion) -> Box<dyn ProtoMessage + '_> {
        Box::new(ListEntitiesUpdateResponse {
            common: self.common.info_common(version),
            device_class: &self.device_class,
        })
    }

    fn state_message(&self, _aux: Option<u8>) -> Option<Box<dyn ProtoMessage + '_>> {
        let message = match &self.state {
            Some(info) => UpdateStateResponse {
                key: self.common.key,
                missing_state: false,
                in_progress: info.in_progress,
                has_progress: info.has_progress,
                progress: info.progress,
                current_version: info.current_version.clone(),
                latest_version: info.latest_version.clone(),
                title: info.title.clone(),
                release_summary: info.release_summary.clone(),
                release_url: info.release_url.clone(),
                device_id: self.common.device_id,
            },
            None => UpdateStateResponse {
                key: self.common.key,
                missing_state: true,
                device_id: self.common.device_id,
                ..Default::default()
            },
        };
        Some(Box::new(message))
    }
}
