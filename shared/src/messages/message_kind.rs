// Stable wire identifiers for every message in the catalog. These numbers
// are part of the wire contract and must never be reassigned.

macro_rules! message_kinds {
    ($($variant:ident = $id:literal, $size:literal;)*) => {
        /// Identifies a message type on the wire
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        #[repr(u16)]
        pub enum MessageKind {
            $($variant = $id,)*
        }

        impl MessageKind {
            /// Every known kind, in wire id order
            pub const ALL: &'static [MessageKind] = &[$(MessageKind::$variant,)*];

            /// Maps a wire id back onto a kind, or `None` for ids this
            /// device does not implement
            pub fn from_id(id: u16) -> Option<Self> {
                match id {
                    $($id => Some(MessageKind::$variant),)*
                    _ => None,
                }
            }

            /// Rough encoded size used to pre-size buffers before the real
            /// size is known. Never more than 255.
            pub fn estimated_size(self) -> u8 {
                match self {
                    $(MessageKind::$variant => $size,)*
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(MessageKind::$variant => stringify!($variant),)*
                }
            }
        }
    };
}

message_kinds! {
    HelloRequest = 1, 17;
    HelloResponse = 2, 26;
    ConnectRequest = 3, 9;
    ConnectResponse = 4, 2;
    DisconnectRequest = 5, 0;
    DisconnectResponse = 6, 0;
    PingRequest = 7, 0;
    PingResponse = 8, 0;
    DeviceInfoRequest = 9, 0;
    DeviceInfoResponse = 10, 219;
    ListEntitiesRequest = 11, 0;
    ListEntitiesBinarySensorResponse = 12, 60;
    ListEntitiesSensorResponse = 16, 86;
    ListEntitiesSwitchResponse = 17, 60;
    ListEntitiesTextSensorResponse = 18, 58;
    ListEntitiesDoneResponse = 19, 0;
    SubscribeStatesRequest = 20, 0;
    BinarySensorStateResponse = 21, 13;
    SensorStateResponse = 25, 16;
    SwitchStateResponse = 26, 11;
    TextSensorStateResponse = 27, 20;
    SubscribeLogsRequest = 28, 4;
    SubscribeLogsResponse = 29, 13;
    SwitchCommandRequest = 33, 11;
    SubscribeHomeassistantServicesRequest = 34, 0;
    HomeassistantActionRequest = 35, 113;
    ListEntitiesServicesResponse = 41, 48;
    ExecuteServiceRequest = 42, 39;
    ListEntitiesNumberResponse = 49, 84;
    NumberStateResponse = 50, 16;
    NumberCommandRequest = 51, 14;
    ListEntitiesEventResponse = 107, 76;
    EventResponse = 108, 18;
    ListEntitiesUpdateResponse = 116, 58;
    UpdateStateResponse = 117, 65;
    UpdateCommandRequest = 118, 11;
    NoiseEncryptionSetKeyRequest = 124, 19;
    NoiseEncryptionSetKeyResponse = 125, 2;
    ExecuteServiceResponse = 131, 34;
}

impl MessageKind {
    pub fn id(self) -> u16 {
        self as u16
    }

    /// State messages of fast-changing or edge-triggered entities bypass
    /// the batch whenever the transport can take them right away
    pub fn always_immediate(self) -> bool {
        matches!(
            self,
            MessageKind::UpdateStateResponse | MessageKind::EventResponse
        )
    }
}
