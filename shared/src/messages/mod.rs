//! Message catalog: every control-plane and entity message the device
//! sends or understands.

mod commands;
mod control;
mod entity_info;
mod entity_state;
mod message_kind;
mod services;

pub use commands::{
    CommandRequest, NumberCommandRequest, SwitchCommandRequest, UpdateCommand,
    UpdateCommandRequest,
};
pub use control::{
    ConnectRequest, ConnectResponse, DeviceInfoRequest, DeviceInfoResponse, DisconnectRequest,
    DisconnectResponse, HelloRequest, HelloResponse, ListEntitiesDoneResponse,
    ListEntitiesRequest, NoiseEncryptionSetKeyRequest, NoiseEncryptionSetKeyResponse,
    PingRequest, PingResponse, SubscribeHomeassistantServicesRequest, SubscribeLogsRequest,
    SubscribeLogsResponse, SubscribeStatesRequest,
};
pub use entity_info::{
    InfoCommon, ListEntitiesBinarySensorResponse, ListEntitiesEventResponse,
    ListEntitiesNumberResponse, ListEntitiesSensorResponse, ListEntitiesSwitchResponse,
    ListEntitiesTextSensorResponse, ListEntitiesUpdateResponse, NumberMode, SensorStateClass,
};
pub use entity_state::{
    BinarySensorStateResponse, EventResponse, NumberStateResponse, SensorStateResponse,
    StateValue, SwitchStateResponse, TextSensorStateResponse, UpdateStateResponse,
};
pub use message_kind::MessageKind;
pub use services::{
    ExecuteServiceArgument, ExecuteServiceRequest, ExecuteServiceResponse,
    HomeassistantActionRequest, KeyValue, ListEntitiesServicesResponse, ServiceArgType,
    ServiceArgument,
};
