use crate::proto::{
    DecodeError, NestedMessage, ProtoDecode, ProtoMessage, ProtoReader, ProtoSize,
    ProtoWriteBuffer,
};

use super::MessageKind;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum ServiceArgType {
    #[default]
    Bool = 0,
    Int = 1,
    Float = 2,
    String = 3,
}

/// Declared argument of a user-defined service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceArgument {
    pub name: String,
    pub arg_type: ServiceArgType,
}

impl NestedMessage for ServiceArgument {
    fn encode(&self, buffer: &mut ProtoWriteBuffer) {
        buffer.encode_string(1, &self.name, false);
        buffer.encode_uint32(2, self.arg_type as u32, false);
    }

    fn calculate_size(&self) -> usize {
        let mut size = ProtoSize::new();
        size.add_string(1, &self.name, false);
        size.add_uint32(2, self.arg_type as u32, false);
        size.get()
    }
}

pub struct ListEntitiesServicesResponse<'a> {
    pub name: &'a str,
    pub key: u32,
    pub args: &'a [ServiceArgument],
}

impl ProtoMessage for ListEntitiesServicesResponse<'_> {
    fn kind(&self) -> MessageKind {
        MessageKind::ListEntitiesServicesResponse
    }

    fn encode(&self, buffer: &mut ProtoWriteBuffer) {
        buffer.encode_string(1, self.name, false);
        buffer.encode_fixed32(2, self.key, false);
        for arg in self.args {
            buffer.encode_message(3, arg);
        }
    }

    fn calculate_size(&self) -> usize {
        let mut size = ProtoSize::new();
        size.add_string(1, self.name, false);
        size.add_fixed32(2, self.key, false);
        for arg in self.args {
            size.add_message(3, arg);
        }
        size.get()
    }
}

/// One argument value of a service invocation. The client fills the field
/// that matches the declared [`ServiceArgType`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecuteServiceArgument {
    pub bool_: bool,
    pub legacy_int: i32,
    pub float_: f32,
    pub string_: String,
    pub int_: i32,
}

impl NestedMessage for ExecuteServiceArgument {
    fn encode(&self, buffer: &mut ProtoWriteBuffer) {
        buffer.encode_bool(1, self.bool_, false);
        buffer.encode_int32(2, self.legacy_int, false);
        buffer.encode_float(3, self.float_, false);
        buffer.encode_string(4, &self.string_, false);
        buffer.encode_sint32(5, self.int_, false);
    }

    fn calculate_size(&self) -> usize {
        let mut size = ProtoSize::new();
        size.add_bool(1, self.bool_, false);
        size.add_int32(2, self.legacy_int, false);
        size.add_float(3, self.float_, false);
        size.add_string(4, &self.string_, false);
        size.add_sint32(5, self.int_, false);
        size.get()
    }
}

impl ProtoDecode for ExecuteServiceArgument {
    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut message = Self::default();
        let mut reader = ProtoReader::new(payload);
        while let Some(field) = reader.next_field()? {
            match field.number {
                1 => message.bool_ = field.as_bool()?,
                2 => message.legacy_int = field.as_i32()?,
                3 => message.float_ = field.as_f32()?,
                4 => message.string_ = field.as_str()?.to_string(),
                5 => message.int_ = field.as_sint32()?,
                _ => {}
            }
        }
        Ok(message)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecuteServiceRequest {
    pub key: u32,
    pub args: Vec<ExecuteServiceArgument>,
    /// Client-chosen correlation id, zero when no response is wanted
    pub call_id: u32,
    pub return_response: bool,
}

impl ExecuteServiceRequest {
    pub fn wants_response(&self) -> bool {
        self.call_id != 0
    }
}

impl ProtoMessage for ExecuteServiceRequest {
    fn kind(&self) -> MessageKind {
        MessageKind::ExecuteServiceRequest
    }

    fn encode(&self, buffer: &mut ProtoWriteBuffer) {
        buffer.encode_fixed32(1, self.key, false);
        for arg in &self.args {
            buffer.encode_message(2, arg);
        }
        buffer.encode_uint32(3, self.call_id, false);
        buffer.encode_bool(4, self.return_response, false);
    }

    fn calculate_size(&self) -> usize {
        let mut size = ProtoSize::new();
        size.add_fixed32(1, self.key, false);
        for arg in &self.args {
            size.add_message(2, arg);
        }
        size.add_uint32(3, self.call_id, false);
        size.add_bool(4, self.return_response, false);
        size.get()
    }
}

impl ProtoDecode for ExecuteServiceRequest {
    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut message = Self::default();
        let mut reader = ProtoReader::new(payload);
        while let Some(field) = reader.next_field()? {
            match field.number {
                1 => message.key = field.as_fixed32()?,
                2 => message
                    .args
                    .push(ExecuteServiceArgument::decode(field.as_bytes()?)?),
                3 => message.call_id = field.as_u32()?,
                4 => message.return_response = field.as_bool()?,
                _ => {}
            }
        }
        Ok(message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecuteServiceResponse {
    pub call_id: u32,
    pub success: bool,
    pub error_message: String,
    pub response_data: Vec<u8>,
}

impl ProtoMessage for ExecuteServiceResponse {
    fn kind(&self) -> MessageKind {
        MessageKind::ExecuteServiceResponse
    }

    fn encode(&self, buffer: &mut ProtoWriteBuffer) {
        buffer.encode_uint32(1, self.call_id, false);
        buffer.encode_bool(2, self.success, false);
        buffer.encode_string(3, &self.error_message, false);
        buffer.encode_bytes(4, &self.response_data, false);
    }

    fn calculate_size(&self) -> usize {
        let mut size = ProtoSize::new();
        size.add_uint32(1, self.call_id, false);
        size.add_bool(2, self.success, false);
        size.add_string(3, &self.error_message, false);
        size.add_bytes(4, self.response_data.len(), false);
        size.get()
    }
}

impl ProtoDecode for ExecuteServiceResponse {
    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut message = Self::default();
        let mut reader = ProtoReader::new(payload);
        while let Some(field) = reader.next_field()? {
            match field.number {
                1 => message.call_id = field.as_u32()?,
                2 => message.success = field.as_bool()?,
                3 => message.error_message = field.as_str()?.to_string(),
                4 => message.response_data = field.as_bytes()?.to_vec(),
                _ => {}
            }
        }
        Ok(message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl NestedMessage for KeyValue {
    fn encode(&self, buffer: &mut ProtoWriteBuffer) {
        buffer.encode_string(1, &self.key, false);
        buffer.encode_string(2, &self.value, false);
    }

    fn calculate_size(&self) -> usize {
        let mut size = ProtoSize::new();
        size.add_string(1, &self.key, false);
        size.add_string(2, &self.value, false);
        size.get()
    }
}

impl ProtoDecode for KeyValue {
    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut message = Self::default();
        let mut reader = ProtoReader::new(payload);
        while let Some(field) = reader.next_field()? {
            match field.number {
                1 => message.key = field.as_str()?.to_string(),
                2 => message.value = field.as_str()?.to_string(),
                _ => {}
            }
        }
        Ok(message)
    }
}

/// Asks the controller to run one of its own services (or fire an event)
/// on the device's behalf
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomeassistantActionRequest {
    pub service: String,
    pub data: Vec<KeyValue>,
    pub data_template: Vec<KeyValue>,
    pub variables: Vec<KeyValue>,
    pub is_event: bool,
}

impl ProtoMessage for HomeassistantActionRequest {
    fn kind(&self) -> MessageKind {
        MessageKind::HomeassistantActionRequest
    }

    fn encode(&self, buffer: &mut ProtoWriteBuffer) {
        buffer.encode_string(1, &self.service, false);
        for entry in &self.data {
            buffer.encode_message(2, entry);
        }
        for entry in &self.data_template {
            buffer.encode_message(3, entry);
        }
        for entry in &self.variables {
            buffer.encode_message(4, entry);
        }
        buffer.encode_bool(5, self.is_event, false);
    }

    fn calculate_size(&self) -> usize {
        let mut size = ProtoSize::new();
        size.add_string(1, &self.service, false);
        for entry in &self.data {
            size.add_message(2, entry);
        }
        for entry in &self.data_template {
            size.add_message(3, entry);
        }
        for entry in &self.variables {
            size.add_message(4, entry);
        }
        size.add_bool(5, self.is_event, false);
        size.get()
    }
}

impl ProtoDecode for HomeassistantActionRequest {
    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut message = Self::default();
        let mut reader = ProtoReader::new(payload);
        while let Some(field) = reader.next_field()? {
            match field.number {
                1 => message.service = field.as_str()?.to_string(),
                2 => message.data.push(KeyValue::decode(field.as_bytes()?)?),
                3 => message
                    .data_template
                    .push(KeyValue::decode(field.as_bytes()?)?),
                4 => message.variables.push(KeyValue::decode(field.as_bytes()?)?),
                5 => message.is_event = field.as_bool()?,
                _ => {}
            }
        }
        Ok(message)
    }
}
