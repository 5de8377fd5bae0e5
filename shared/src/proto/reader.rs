use super::{
    DecodeError, WIRE_TYPE_FIXED32, WIRE_TYPE_FIXED64, WIRE_TYPE_LENGTH_DELIMITED,
    WIRE_TYPE_VARINT,
};

/// A single decoded field value, borrowing from the payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Varint(u64),
    Fixed32(u32),
    Fixed64(u64),
    LengthDelimited(&'a [u8]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field<'a> {
    pub number: u32,
    pub value: FieldValue<'a>,
}

impl<'a> Field<'a> {
    pub fn as_u32(&self) -> Result<u32, DecodeError> {
        match self.value {
            FieldValue::Varint(value) => Ok(value as u32),
            _ => Err(DecodeError::WrongWireType { field: self.number }),
        }
    }

    pub fn as_i32(&self) -> Result<i32, DecodeError> {
        self.as_u32().map(|value| value as i32)
    }

    pub fn as_sint32(&self) -> Result<i32, DecodeError> {
        let raw = self.as_u32()?;
        Ok(((raw >> 1) as i32) ^ -((raw & 1) as i32))
    }

    pub fn as_bool(&self) -> Result<bool, DecodeError> {
        match self.value {
            FieldValue::Varint(value) => Ok(value != 0),
            _ => Err(DecodeError::WrongWireType { field: self.number }),
        }
    }

    pub fn as_fixed32(&self) -> Result<u32, DecodeError> {
        match self.value {
            FieldValue::Fixed32(value) => Ok(value),
            _ => Err(DecodeError::WrongWireType { field: self.number }),
        }
    }

    pub fn as_f32(&self) -> Result<f32, DecodeError> {
        self.as_fixed32().map(f32::from_bits)
    }

    pub fn as_bytes(&self) -> Result<&'a [u8], DecodeError> {
        match self.value {
            FieldValue::LengthDelimited(bytes) => Ok(bytes),
            _ => Err(DecodeError::WrongWireType { field: self.number }),
        }
    }

    pub fn as_str(&self) -> Result<&'a str, DecodeError> {
        let bytes = self.as_bytes()?;
        std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 { field: self.number })
    }
}

/// Pull-style protobuf field reader.
///
/// Unknown fields are returned like any other; decoders skip the ones they
/// do not recognise.
pub struct ProtoReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ProtoReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn read_varint(&mut self) -> Result<u64, DecodeError> {
        let start = self.offset;
        let mut result: u64 = 0;
        for shift in 0..10 {
            let Some(byte) = self.data.get(self.offset) else {
                return Err(DecodeError::Truncated { offset: start });
            };
            self.offset += 1;
            result |= u64::from(byte & 0x7F) << (shift * 7);
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(DecodeError::VarintOverflow { offset: start })
    }

    fn read_slice(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(DecodeError::Truncated {
                offset: self.offset,
            })?;
        let slice = &self.data[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    /// Returns the next field, or `None` once the payload is exhausted
    pub fn next_field(&mut self) -> Result<Option<Field<'a>>, DecodeError> {
        if self.offset >= self.data.len() {
            return Ok(None);
        }
        let tag = self.read_varint()?;
        let number = (tag >> 3) as u32;
        let wire_type = (tag & 0x7) as u8;

        let value = match wire_type {
            WIRE_TYPE_VARINT => FieldValue::Varint(self.read_varint()?),
            WIRE_TYPE_FIXED64 => {
                let bytes = self.read_slice(8)?;
                let mut raw = [0u8; 8];
                raw.copy_from_slice(bytes);
                FieldValue::Fixed64(u64::from_le_bytes(raw))
            }
            WIRE_TYPE_LENGTH_DELIMITED => {
                let len = self.read_varint()? as usize;
                FieldValue::LengthDelimited(self.read_slice(len)?)
            }
            WIRE_TYPE_FIXED32 => {
                let bytes = self.read_slice(4)?;
                let mut raw = [0u8; 4];
                raw.copy_from_slice(bytes);
                FieldValue::Fixed32(u32::from_le_bytes(raw))
            }
            _ => {
                return Err(DecodeError::UnsupportedWireType {
                    wire_type,
                    field: number,
                })
            }
        };

        Ok(Some(Field { number, value }))
    }
}
