use crate::{
    proto::{DecodeError, ProtoDecode, ProtoMessage, ProtoReader, ProtoSize, ProtoWriteBuffer},
    types::LogLevel,
};

use super::MessageKind;

macro_rules! empty_message {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl ProtoMessage for $name {
            fn kind(&self) -> MessageKind {
                MessageKind::$kind
            }

            fn encode(&self, _buffer: &mut ProtoWriteBuffer) {}

            fn calculate_size(&self) -> usize {
                0
            }
        }

        impl ProtoDecode for $name {
            fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
                // unknown fields are tolerated, only framing errors matter
                let mut reader = ProtoReader::new(payload);
                while reader.next_field()?.is_some() {}
                Ok($name)
            }
        }
    };
}

empty_message!(DisconnectRequest, DisconnectRequest);
empty_message!(DisconnectResponse, DisconnectResponse);
empty_message!(PingRequest, PingRequest);
empty_message!(PingResponse, PingResponse);
empty_message!(DeviceInfoRequest, DeviceInfoRequest);
empty_message!(ListEntitiesRequest, ListEntitiesRequest);
empty_message!(ListEntitiesDoneResponse, ListEntitiesDoneResponse);
empty_message!(SubscribeStatesRequest, SubscribeStatesRequest);
empty_message!(
    SubscribeHomeassistantServicesRequest,
    SubscribeHomeassistantServicesRequest
);

// Hello

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HelloRequest {
    pub client_info: String,
    pub api_version_major: u32,
    pub api_version_minor: u32,
}

impl ProtoMessage for HelloRequest {
    fn kind(&self) -> MessageKind {
        MessageKind::HelloRequest
    }

    fn encode(&self, buffer: &mut ProtoWriteBuffer) {
        buffer.encode_string(1, &self.client_info, false);
        buffer.encode_uint32(2, self.api_version_major, false);
        buffer.encode_uint32(3, self.api_version_minor, false);
    }

    fn calculate_size(&self) -> usize {
        let mut size = ProtoSize::new();
        size.add_string(1, &self.client_info, false);
        size.add_uint32(2, self.api_version_major, false);
        size.add_uint32(3, self.api_version_minor, false);
        size.get()
    }
}

impl ProtoDecode for HelloRequest {
    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut message = Self::default();
        let mut reader = ProtoReader::new(payload);
        while let Some(field) = reader.next_field()? {
            match field.number {
                1 => message.client_info = field.as_str()?.to_string(),
                2 => message.api_version_major = field.as_u32()?,
                3 => message.api_version_minor = field.as_u32()?,
                _ => {}
            }
        }
        Ok(message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HelloResponse {
    pub api_version_major: u32,
    pub api_version_minor: u32,
    pub server_info: String,
    pub name: String,
}

impl ProtoMessage for HelloResponse {
    fn kind(&self) -> MessageKind {
        MessageKind::HelloResponse
    }

    fn encode(&self, buffer: &mut ProtoWriteBuffer) {
        buffer.encode_uint32(1, self.api_version_major, false);
        buffer.encode_uint32(2, self.api_version_minor, false);
        buffer.encode_string(3, &self.server_info, false);
        buffer.encode_string(4, &self.name, false);
    }

    fn calculate_size(&self) -> usize {
        let mut size = ProtoSize::new();
        size.add_uint32(1, self.api_version_major, false);
        size.add_uint32(2, self.api_version_minor, false);
        size.add_string(3, &self.server_info, false);
        size.add_string(4, &self.name, false);
        size.get()
    }
}

impl ProtoDecode for HelloResponse {
    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut message = Self::default();
        let mut reader = ProtoReader::new(payload);
        while let Some(field) = reader.next_field()? {
            match field.number {
                1 => message.api_version_major = field.as_u32()?,
                2 => message.api_version_minor = field.as_u32()?,
                3 => message.server_info = field.as_str()?.to_string(),
                4 => message.name = field.as_str()?.to_string(),
                _ => {}
            }
        }
        Ok(message)
    }
}

// Password authentication

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectRequest {
    pub password: String,
}

impl ProtoMessage for ConnectRequest {
    fn kind(&self) -> MessageKind {
        MessageKind::ConnectRequest
    }

    fn encode(&self, buffer: &mut ProtoWriteBuffer) {
        buffer.encode_string(1, &self.password, false);
    }

    fn calculate_size(&self) -> usize {
        let mut size = ProtoSize::new();
        size.add_string(1, &self.password, false);
        size.get()
    }
}

impl ProtoDecode for ConnectRequest {
    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut message = Self::default();
        let mut reader = ProtoReader::new(payload);
        while let Some(field) = reader.next_field()? {
            if field.number == 1 {
                message.password = field.as_str()?.to_string();
            }
        }
        Ok(message)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectResponse {
    pub invalid_password: bool,
}

impl ProtoMessage for ConnectResponse {
    fn kind(&self) -> MessageKind {
        MessageKind::ConnectResponse
    }

    fn encode(&self, buffer: &mut ProtoWriteBuffer) {
        buffer.encode_bool(1, self.invalid_password, false);
    }

    fn calculate_size(&self) -> usize {
        let mut size = ProtoSize::new();
        size.add_bool(1, self.invalid_password, false);
        size.get()
    }
}

impl ProtoDecode for ConnectResponse {
    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut message = Self::default();
        let mut reader = ProtoReader::new(payload);
        while let Some(field) = reader.next_field()? {
            if field.number == 1 {
                message.invalid_password = field.as_bool()?;
            }
        }
        Ok(message)
    }
}

// Device info

/// Static description of the device, answered to `DeviceInfoRequest`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfoResponse {
    pub uses_password: bool,
    pub name: String,
    pub mac_address: String,
    pub firmware_version: String,
    pub compilation_time: String,
    pub model: String,
    pub has_deep_sleep: bool,
    pub project_name: String,
    pub project_version: String,
    pub webserver_port: u32,
    pub manufacturer: String,
    pub friendly_name: String,
    pub suggested_area: String,
    pub api_encryption_supported: bool,
}

impl ProtoMessage for DeviceInfoResponse {
    fn kind(&self) -> MessageKind {
        MessageKind::DeviceInfoResponse
    }

    fn encode(&self, buffer: &mut ProtoWriteBuffer) {
        buffer.encode_bool(1, self.uses_password, false);
        buffer.encode_string(2, &self.name, false);
        buffer.encode_string(3, &self.mac_address, false);
        buffer.encode_string(4, &self.firmware_version, false);
        buffer.encode_string(5, &self.compilation_time, false);
        buffer.encode_string(6, &self.model, false);
        buffer.encode_bool(7, self.has_deep_sleep, false);
        buffer.encode_string(8, &self.project_name, false);
        buffer.encode_string(9, &self.project_version, false);
        buffer.encode_uint32(10, self.webserver_port, false);
        buffer.encode_string(12, &self.manufacturer, false);
        buffer.encode_string(13, &self.friendly_name, false);
        buffer.encode_string(16, &self.suggested_area, false);
        buffer.encode_bool(19, self.api_encryption_supported, false);
    }

    fn calculate_size(&self) -> usize {
        let mut size = ProtoSize::new();
        size.add_bool(1, self.uses_password, false);
        size.add_string(2, &self.name, false);
        size.add_string(3, &self.mac_address, false);
        size.add_string(4, &self.firmware_version, false);
        size.add_string(5, &self.compilation_time, false);
        size.add_string(6, &self.model, false);
        size.add_bool(7, self.has_deep_sleep, false);
        size.add_string(8, &self.project_name, false);
        size.add_string(9, &self.project_version, false);
        size.add_uint32(10, self.webserver_port, false);
        size.add_string(12, &self.manufacturer, false);
        size.add_string(13, &self.friendly_name, false);
        size.add_string(16, &self.suggested_area, false);
        size.add_bool(19, self.api_encryption_supported, false);
        size.get()
    }
}

impl ProtoDecode for DeviceInfoResponse {
    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut message = Self::default();
        let mut reader = ProtoReader::new(payload);
        while let Some(field) = reader.next_field()? {
            match field.number {
                1 => message.uses_password = field.as_bool()?,
                2 => message.name = field.as_str()?.to_string(),
                3 => message.mac_address = field.as_str()?.to_string(),
                4 => message.firmware_version = field.as_str()?.to_string(),
                5 => message.compilation_time = field.as_str()?.to_string(),
                6 => message.model = field.as_str()?.to_string(),
                7 => message.has_deep_sleep = field.as_bool()?,
                8 => message.project_name = field.as_str()?.to_string(),
                9 => message.project_version = field.as_str()?.to_string(),
                10 => message.webserver_port = field.as_u32()?,
                12 => message.manufacturer = field.as_str()?.to_string(),
                13 => message.friendly_name = field.as_str()?.to_string(),
                16 => message.suggested_area = field.as_str()?.to_string(),
                19 => message.api_encryption_supported = field.as_bool()?,
                _ => {}
            }
        }
        Ok(message)
    }
}

// Logs

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubscribeLogsRequest {
    pub level: LogLevel,
    pub dump_config: bool,
}

impl ProtoMessage for SubscribeLogsRequest {
    fn kind(&self) -> MessageKind {
        MessageKind::SubscribeLogsRequest
    }

    fn encode(&self, buffer: &mut ProtoWriteBuffer) {
        buffer.encode_uint32(1, self.level as u32, false);
        buffer.encode_bool(2, self.dump_config, false);
    }

    fn calculate_size(&self) -> usize {
        let mut size = ProtoSize::new();
        size.add_uint32(1, self.level as u32, false);
        size.add_bool(2, self.dump_config, false);
        size.get()
    }
}

impl ProtoDecode for SubscribeLogsRequest {
    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut message = Self::default();
        let mut reader = ProtoReader::new(payload);
        while let Some(field) = reader.next_field()? {
            match field.number {
                1 => message.level = LogLevel::from_u32(field.as_u32()?),
                2 => message.dump_config = field.as_bool()?,
                _ => {}
            }
        }
        Ok(message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscribeLogsResponse {
    pub level: LogLevel,
    pub message: Vec<u8>,
}

impl ProtoMessage for SubscribeLogsResponse {
    fn kind(&self) -> MessageKind {
        MessageKind::SubscribeLogsResponse
    }

    fn encode(&self, buffer: &mut ProtoWriteBuffer) {
        buffer.encode_uint32(1, self.level as u32, false);
        buffer.encode_bytes(3, &self.message, false);
    }

    fn calculate_size(&self) -> usize {
        let mut size = ProtoSize::new();
        size.add_uint32(1, self.level as u32, false);
        size.add_bytes(3, self.message.len(), false);
        size.get()
    }
}

impl ProtoDecode for SubscribeLogsResponse {
    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut message = Self::default();
        let mut reader = ProtoReader::new(payload);
        while let Some(field) = reader.next_field()? {
            match field.number {
                1 => message.level = LogLevel::from_u32(field.as_u32()?),
                3 => message.message = field.as_bytes()?.to_vec(),
                _ => {}
            }
        }
        Ok(message)
    }
}

// Noise pre-shared key

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoiseEncryptionSetKeyRequest {
    pub key: Vec<u8>,
}

impl ProtoMessage for NoiseEncryptionSetKeyRequest {
    fn kind(&self) -> MessageKind {
        MessageKind::NoiseEncryptionSetKeyRequest
    }

    fn encode(&self, buffer: &mut ProtoWriteBuffer) {
        buffer.encode_bytes(1, &self.key, false);
    }

    fn calculate_size(&self) -> usize {
        let mut size = ProtoSize::new();
        size.add_bytes(1, self.key.len(), false);
        size.get()
    }
}

impl ProtoDecode for NoiseEncryptionSetKeyRequest {
    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut message = Self::default();
        let mut reader = ProtoReader::new(payload);
        while let Some(field) = reader.next_field()? {
            if field.number == 1 {
                message.key = field.as_bytes()?.to_vec();
            }
        }
        Ok(message)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoiseEncryptionSetKeyResponse {
    pub success: bool,
}

impl ProtoMessage for NoiseEncryptionSetKeyResponse {
    fn kind(&self) -> MessageKind {
        MessageKind::NoiseEncryptionSetKeyResponse
    }

    fn encode(&self, buffer: &mut ProtoWriteBuffer) {
        buffer.encode_bool(1, self.success, false);
    }

    fn calculate_size(&self) -> usize {
        let mut size = ProtoSize::new();
        size.add_bool(1, self.success, false);
        size.get()
    }
}

impl ProtoDecode for NoiseEncryptionSetKeyResponse {
    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut message = Self::default();
        let mut reader = ProtoReader::new(payload);
        while let Some(field) = reader.next_field()? {
            if field.number == 1 {
                message.success = field.as_bool()?;
            }
        }
        Ok(message)
    }
}
