use std::fmt;

/// Protocol version negotiated during the Hello exchange
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion {
    pub major: u16,
    pub minor: u16,
}

/// Version this device speaks
pub const SERVER_API_VERSION: ApiVersion = ApiVersion::new(1, 14);

impl ApiVersion {
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Clamps wire values that do not fit into 16 bits
    pub fn from_wire(major: u32, minor: u32) -> Self {
        Self {
            major: u16::try_from(major).unwrap_or(u16::MAX),
            minor: u16::try_from(minor).unwrap_or(u16::MAX),
        }
    }

    /// Whether a peer at this version understands features introduced in
    /// `major.minor`
    pub fn supports(&self, major: u16, minor: u16) -> bool {
        self.major > major || (self.major == major && self.minor >= minor)
    }

    /// Clients before 1.14 still identify entities by `object_id`
    pub fn needs_object_id(&self) -> bool {
        !self.supports(1, 14)
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
