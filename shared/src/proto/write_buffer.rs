use super::{NestedMessage, WIRE_TYPE_FIXED32, WIRE_TYPE_LENGTH_DELIMITED, WIRE_TYPE_VARINT};

/// Returns the number of bytes `value` takes when written as a varint
pub fn varint_size(value: u64) -> usize {
    if value < 1 << 7 {
        1
    } else if value < 1 << 14 {
        2
    } else if value < 1 << 21 {
        3
    } else if value < 1 << 28 {
        4
    } else {
        let bits = 64 - value.leading_zeros() as usize;
        (bits + 6) / 7
    }
}

fn tag_size(field: u32) -> usize {
    varint_size(u64::from(field) << 3)
}

pub(crate) fn zigzag32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

/// Appends protobuf fields onto a borrowed byte vector.
///
/// Scalar fields equal to their default value are skipped unless `force`
/// is set, matching proto3 semantics.
pub struct ProtoWriteBuffer<'b> {
    buffer: &'b mut Vec<u8>,
}

impl<'b> ProtoWriteBuffer<'b> {
    pub fn new(buffer: &'b mut Vec<u8>) -> Self {
        Self { buffer }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn encode_varint_raw(&mut self, mut value: u64) {
        while value >= 0x80 {
            self.buffer.push((value as u8) | 0x80);
            value >>= 7;
        }
        self.buffer.push(value as u8);
    }

    fn encode_tag(&mut self, field: u32, wire_type: u8) {
        self.encode_varint_raw((u64::from(field) << 3) | u64::from(wire_type));
    }

    pub fn encode_uint32(&mut self, field: u32, value: u32, force: bool) {
        if value == 0 && !force {
            return;
        }
        self.encode_tag(field, WIRE_TYPE_VARINT);
        self.encode_varint_raw(u64::from(value));
    }

    pub fn encode_int32(&mut self, field: u32, value: i32, force: bool) {
        if value == 0 && !force {
            return;
        }
        self.encode_tag(field, WIRE_TYPE_VARINT);
        // negative values are sign-extended to 64 bits
        self.encode_varint_raw(i64::from(value) as u64);
    }

    pub fn encode_sint32(&mut self, field: u32, value: i32, force: bool) {
        self.encode_uint32(field, zigzag32(value), force);
    }

    pub fn encode_bool(&mut self, field: u32, value: bool, force: bool) {
        if !value && !force {
            return;
        }
        self.encode_tag(field, WIRE_TYPE_VARINT);
        self.buffer.push(u8::from(value));
    }

    pub fn encode_fixed32(&mut self, field: u32, value: u32, force: bool) {
        if value == 0 && !force {
            return;
        }
        self.encode_tag(field, WIRE_TYPE_FIXED32);
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn encode_float(&mut self, field: u32, value: f32, force: bool) {
        if value == 0.0 && !force {
            return;
        }
        self.encode_tag(field, WIRE_TYPE_FIXED32);
        self.buffer.extend_from_slice(&value.to_bits().to_le_bytes());
    }

    pub fn encode_bytes(&mut self, field: u32, value: &[u8], force: bool) {
        if value.is_empty() && !force {
            return;
        }
        self.encode_tag(field, WIRE_TYPE_LENGTH_DELIMITED);
        self.encode_varint_raw(value.len() as u64);
        self.buffer.extend_from_slice(value);
    }

    pub fn encode_string(&mut self, field: u32, value: &str, force: bool) {
        self.encode_bytes(field, value.as_bytes(), force);
    }

    /// Nested messages are always written, even when empty
    pub fn encode_message<M: NestedMessage + ?Sized>(&mut self, field: u32, message: &M) {
        self.encode_tag(field, WIRE_TYPE_LENGTH_DELIMITED);
        self.encode_varint_raw(message.calculate_size() as u64);
        message.encode(self);
    }
}

/// Accumulates the encoded size of a message without writing it.
///
/// Every `add_*` mirrors the `encode_*` method of the same name on
/// [`ProtoWriteBuffer`], including default-value skipping.
#[derive(Default)]
pub struct ProtoSize {
    total: usize,
}

impl ProtoSize {
    pub fn new() -> Self {
        Self { total: 0 }
    }

    pub fn get(&self) -> usize {
        self.total
    }

    pub fn add_uint32(&mut self, field: u32, value: u32, force: bool) {
        if value == 0 && !force {
            return;
        }
        self.total += tag_size(field) + varint_size(u64::from(value));
    }

    pub fn add_int32(&mut self, field: u32, value: i32, force: bool) {
        if value == 0 && !force {
            return;
        }
        self.total += tag_size(field) + varint_size(i64::from(value) as u64);
    }

    pub fn add_sint32(&mut self, field: u32, value: i32, force: bool) {
        self.add_uint32(field, zigzag32(value), force);
    }

    pub fn add_bool(&mut self, field: u32, value: bool, force: bool) {
        if !value && !force {
            return;
        }
        self.total += tag_size(field) + 1;
    }

    pub fn add_fixed32(&mut self, field: u32, value: u32, force: bool) {
        if value == 0 && !force {
            return;
        }
        self.total += tag_size(field) + 4;
    }

    pub fn add_float(&mut self, field: u32, value: f32, force: bool) {
        if value == 0.0 && !force {
            return;
        }
        self.total += tag_size(field) + 4;
    }

    pub fn add_bytes(&mut self, field: u32, len: usize, force: bool) {
        if len == 0 && !force {
            return;
        }
        self.total += tag_size(field) + varint_size(len as u64) + len;
    }

    pub fn add_string(&mut self, field: u32, value: &str, force: bool) {
        self.add_bytes(field, value.len(), force);
    }

    pub fn add_message<M: NestedMessage + ?Sized>(&mut self, field: u32, message: &M) {
        self.add_bytes(field, message.calculate_size(), true);
    }
}
