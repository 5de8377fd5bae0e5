use crate::proto::{
    DecodeError, Field, ProtoDecode, ProtoMessage, ProtoReader, ProtoSize, ProtoWriteBuffer,
};

use super::MessageKind;

/// Scalar types a state message can carry in its `state` field
pub trait StateValue: Default + Clone {
    fn encode_field(&self, field: u32, buffer: &mut ProtoWriteBuffer);
    fn add_field(&self, field: u32, size: &mut ProtoSize);
    fn read_field(field: &Field) -> Result<Self, DecodeError>;
}

impl StateValue for bool {
    fn encode_field(&self, field: u32, buffer: &mut ProtoWriteBuffer) {
        buffer.encode_bool(field, *self, false);
    }
    fn add_field(&self, field: u32, size: &mut ProtoSize) {
        size.add_bool(field, *self, false);
    }
    fn read_field(field: &Field) -> Result<Self, DecodeError> {
        field.as_bool()
    }
}

impl StateValue for f32 {
    fn encode_field(&self, field: u32, buffer: &mut ProtoWriteBuffer) {
        buffer.encode_float(field, *self, false);
    }
    fn add_field(&self, field: u32, size: &mut ProtoSize) {
        size.add_float(field, *self, false);
    }
    fn read_field(field: &Field) -> Result<Self, DecodeError> {
        field.as_f32()
    }
}

impl StateValue for String {
    fn encode_field(&self, field: u32, buffer: &mut ProtoWriteBuffer) {
        buffer.encode_string(field, self, false);
    }
    fn add_field(&self, field: u32, size: &mut ProtoSize) {
        size.add_string(field, self, false);
    }
    fn read_field(field: &Field) -> Result<Self, DecodeError> {
        field.as_str().map(str::to_string)
    }
}

// key = 1, state = 2, missing_state = 3, device_id = 4
macro_rules! keyed_state_message {
    ($(#[$meta:meta])* $name:ident, $kind:ident, $state:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            pub key: u32,
            pub state: $state,
            pub missing_state: bool,
            pub device_id: u32,
        }

        impl ProtoMessage for $name {
            fn kind(&self) -> MessageKind {
                MessageKind::$kind
            }

            fn encode(&self, buffer: &mut ProtoWriteBuffer) {
                buffer.encode_fixed32(1, self.key, false);
                self.state.encode_field(2, buffer);
                buffer.encode_bool(3, self.missing_state, false);
                buffer.encode_uint32(4, self.device_id, false);
            }

            fn calculate_size(&self) -> usize {
                let mut size = ProtoSize::new();
                size.add_fixed32(1, self.key, false);
                self.state.add_field(2, &mut size);
                size.add_bool(3, self.missing_state, false);
                size.add_uint32(4, self.device_id, false);
                size.get()
            }
        }

        impl ProtoDecode for $name {
            fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
                let mut message = Self::default();
                let mut reader = ProtoReader::new(payload);
                while let Some(field) = reader.next_field()? {
                    match field.number {
                        1 => message.key = field.as_fixed32()?,
                        2 => message.state = <$state as StateValue>::read_field(&field)?,
                        3 => message.missing_state = field.as_bool()?,
                        4 => message.device_id = field.as_u32()?,
                        _ => {}
                    }
                }
                Ok(message)
            }
        }
    };
}

keyed_state_message!(BinarySensorStateResponse, BinarySensorStateResponse, bool);
keyed_state_message!(SensorStateResponse, SensorStateResponse, f32);
keyed_state_message!(TextSensorStateResponse, TextSensorStateResponse, String);
keyed_state_message!(NumberStateResponse, NumberStateResponse, f32);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwitchStateResponse {
    pub key: u32,
    pub state: bool,
    pub device_id: u32,
}

impl ProtoMessage for SwitchStateResponse {
    fn kind(&self) -> MessageKind {
        MessageKind::SwitchStateResponse
    }

    fn encode(&self, buffer: &mut ProtoWriteBuffer) {
        buffer.encode_fixed32(1, self.key, false);
        buffer.encode_bool(2, self.state, false);
        buffer.encode_uint32(3, self.device_id, false);
    }

    fn calculate_size(&self) -> usize {
        let mut size = ProtoSize::new();
        size.add_fixed32(1, self.key, false);
        size.add_bool(2, self.state, false);
        size.add_uint32(3, self.device_id, false);
        size.get()
    }
}

impl ProtoDecode for SwitchStateResponse {
    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut message = Self::default();
        let mut reader = ProtoReader::new(payload);
        while let Some(field) = reader.next_field()? {
            match field.number {
                1 => message.key = field.as_fixed32()?,
                2 => message.state = field.as_bool()?,
                3 => message.device_id = field.as_u32()?,
                _ => {}
            }
        }
        Ok(message)
    }
}

/// One occurrence of an edge-triggered event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventResponse {
    pub key: u32,
    pub event_type: String,
    pub device_id: u32,
}

impl ProtoMessage for EventResponse {
    fn kind(&self) -> MessageKind {
        MessageKind::EventResponse
    }

    fn encode(&self, buffer: &mut ProtoWriteBuffer) {
        buffer.encode_fixed32(1, self.key, false);
        buffer.encode_string(2, &self.event_type, false);
        buffer.encode_uint32(3, self.device_id, false);
    }

    fn calculate_size(&self) -> usize {
        let mut size = ProtoSize::new();
        size.add_fixed32(1, self.key, false);
        size.add_string(2, &self.event_type, false);
        size.add_uint32(3, self.device_id, false);
        size.get()
    }
}

impl ProtoDecode for EventResponse {
    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut message = Self::default();
        let mut reader = ProtoReader::new(payload);
        while let Some(field) = reader.next_field()? {
            match field.number {
                1 => message.key = field.as_fixed32()?,
                2 => message.event_type = field.as_str()?.to_string(),
                3 => message.device_id = field.as_u32()?,
                _ => {}
            }
        }
        Ok(message)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateStateResponse {
    pub key: u32,
    pub missing_state: bool,
    pub in_progress: bool,
    pub has_progress: bool,
    pub progress: f32,
    pub current_version: String,
    pub latest_version: String,
    pub title: String,
    pub release_summary: String,
    pub release_url: String,
    pub device_id: u32,
}

impl ProtoMessage for UpdateStateResponse {
    fn kind(&self) -> MessageKind {
        MessageKind::UpdateStateResponse
    }

    fn encode(&self, buffer: &mut ProtoWriteBuffer) {
        buffer.encode_fixed32(1, self.key, false);
        buffer.encode_bool(2, self.missing_state, false);
        buffer.encode_bool(3, self.in_progress, false);
        buffer.encode_bool(4, self.has_progress, false);
        buffer.encode_float(5, self.progress, false);
        buffer.encode_string(6, &self.current_version, false);
        buffer.encode_string(7, &self.latest_version, false);
        buffer.encode_string(8, &self.title, false);
        buffer.encode_string(9, &self.release_summary, false);
        buffer.encode_string(10, &self.release_url, false);
        buffer.encode_uint32(11, self.device_id, false);
    }

    fn calculate_size(&self) -> usize {
        let mut size = ProtoSize::new();
        size.add_fixed32(1, self.key, false);
        size.add_bool(2, self.missing_state, false);
        size.add_bool(3, self.in_progress, false);
        size.add_bool(4, self.has_progress, false);
        size.add_float(5, self.progress, false);
        size.add_string(6, &self.current_version, false);
        size.add_string(7, &self.latest_version, false);
        size.add_string(8, &self.title, false);
        size.add_string(9, &self.release_summary, false);
        size.add_string(10, &self.release_url, false);
        size.add_uint32(11, self.device_id, false);
        size.get()
    }
}

impl ProtoDecode for UpdateStateResponse {
    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut message = Self::default();
        let mut reader = ProtoReader::new(payload);
        while let Some(field) = reader.next_field()? {
            match field.number {
                1 => message.key = field.as_fixed32()?,
                2 => message.missing_state = field.as_bool()?,
                3 => message.in_progress = field.as_bool()?,
                4 => message.has_progress = field.as_bool()?,
                5 => message.progress = field.as_f32()?,
                6 => message.current_version = field.as_str()?.to_string(),
                7 => message.latest_version = field.as_str()?.to_string(),
                8 => message.title = field.as_str()?.to_string(),
                9 => message.release_summary = field.as_str()?.to_string(),
                10 => message.release_url = field.as_str()?.to_string(),
                11 => message.device_id = field.as_u32()?,
                _ => {}
            }
        }
        Ok(message)
    }
}
