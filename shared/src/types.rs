/// Device log severity, as negotiated by `SubscribeLogsRequest`.
///
/// Ordered from least to most verbose; a subscription at `Debug` receives
/// everything up to and including `Debug`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LogLevel {
    #[default]
    None = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Config = 4,
    Debug = 5,
    Verbose = 6,
    VeryVerbose = 7,
}

impl LogLevel {
    /// Out-of-range values clamp to the most verbose level
    pub fn from_u32(value: u32) -> Self {
        match value {
            0 => LogLevel::None,
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Config,
            5 => LogLevel::Debug,
            6 => LogLevel::Verbose,
            _ => LogLevel::VeryVerbose,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EntityCategory {
    #[default]
    None = 0,
    Config = 1,
    Diagnostic = 2,
}
