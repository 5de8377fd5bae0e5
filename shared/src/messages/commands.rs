use crate::proto::{DecodeError, ProtoDecode, ProtoMessage, ProtoReader, ProtoSize, ProtoWriteBuffer};

use super::MessageKind;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwitchCommandRequest {
    pub key: u32,
    pub state: bool,
    pub device_id: u32,
}

impl ProtoMessage for SwitchCommandRequest {
    fn kind(&self) -> MessageKind {
        MessageKind::SwitchCommandRequest
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

impl ProtoDecode for SwitchCommandRequest {
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

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NumberCommandRequest {
    pub key: u32,
    pub state: f32,
    pub device_id: u32,
}

impl ProtoMessage for NumberCommandRequest {
    fn kind(&self) -> MessageKind {
        MessageKind::NumberCommandRequest
    }

    fn encode(&self, buffer: &mut ProtoWriteBuffer) {
        buffer.encode_fixed32(1, self.key, false);
        buffer.encode_float(2, self.state, false);
        buffer.encode_uint32(3, self.device_id, false);
    }

    fn calculate_size(&self) -> usize {
        let mut size = ProtoSize::new();
        size.add_fixed32(1, self.key, false);
        size.add_float(2, self.state, false);
        size.add_uint32(3, self.device_id, false);
        size.get()
    }
}

impl ProtoDecode for NumberCommandRequest {
    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut message = Self::default();
        let mut reader = ProtoReader::new(payload);
        while let Some(field) = reader.next_field()? {
            match field.number {
                1 => message.key = field.as_fixed32()?,
                2 => message.state = field.as_f32()?,
                3 => message.device_id = field.as_u32()?,
                _ => {}
            }
        }
        Ok(message)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum UpdateCommand {
    #[default]
    None = 0,
    Update = 1,
    Check = 2,
}

impl UpdateCommand {
    fn from_u32(value: u32) -> Self {
        match value {
            1 => UpdateCommand::Update,
            2 => UpdateCommand::Check,
            _ => UpdateCommand::None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateCommandRequest {
    pub key: u32,
    pub command: UpdateCommand,
    pub device_id: u32,
}

impl ProtoMessage for UpdateCommandRequest {
    fn kind(&self) -> MessageKind {
        MessageKind::UpdateCommandRequest
    }

    fn encode(&self, buffer: &mut ProtoWriteBuffer) {
        buffer.encode_fixed32(1, self.key, false);
        buffer.encode_uint32(2, self.command as u32, false);
        buffer.encode_uint32(3, self.device_id, false);
    }

    fn calculate_size(&self) -> usize {
        let mut size = ProtoSize::new();
        size.add_fixed32(1, self.key, false);
        size.add_uint32(2, self.command as u32, false);
        size.add_uint32(3, self.device_id, false);
        size.get()
    }
}

impl ProtoDecode for UpdateCommandRequest {
    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut message = Self::default();
        let mut reader = ProtoReader::new(payload);
        while let Some(field) = reader.next_field()? {
            match field.number {
                1 => message.key = field.as_fixed32()?,
                2 => message.command = UpdateCommand::from_u32(field.as_u32()?),
                3 => message.device_id = field.as_u32()?,
                _ => {}
            }
        }
        Ok(message)
    }
}

/// An entity command received from a client, handed to the host
/// application unchanged
#[derive(Debug, Clone, PartialEq)]
pub enum CommandRequest {
    Switch(SwitchCommandRequest),
    Number(NumberCommandRequest),
    Update(UpdateCommandRequest),
}

impl CommandRequest {
    pub fn key(&self) -> u32 {
        match self {
            CommandRequest::Switch(request) => request.key,
            CommandRequest::Number(request) => request.key,
            CommandRequest::Update(request) => request.key,
        }
    }
}
