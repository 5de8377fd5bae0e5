use thiserror::Error;

/// Errors that can occur while decoding a protobuf payload received from a
/// client
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The payload ended in the middle of a field
    #[error("Payload truncated at offset {offset} while reading a field")]
    Truncated { offset: usize },

    /// A varint ran past 10 bytes (SECURITY: potentially malicious payload)
    #[error("Varint at offset {offset} is longer than 10 bytes. This may indicate a malformed or malicious payload")]
    VarintOverflow { offset: usize },

    /// Wire types 3 and 4 (groups) and anything above 5 are not supported
    #[error("Unsupported wire type {wire_type} for field {field}")]
    UnsupportedWireType { wire_type: u8, field: u32 },

    /// A field was received with a wire type that does not match its schema
    #[error("Field {field} has an unexpected wire type")]
    WrongWireType { field: u32 },

    /// A string field does not hold valid UTF-8
    #[error("Field {field} is not valid UTF-8")]
    InvalidUtf8 { field: u32 },
}
