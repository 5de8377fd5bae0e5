use std::{default::Default, time::Duration};

use devlink_shared::{
    constants::{
        ACTION_CALL_TIMEOUT, BATCH_DELAY, DEFAULT_LISTEN_BACKLOG, DEFAULT_MAX_CONNECTIONS,
        DEFAULT_PORT, PSK_ACTIVATION_DELAY, REBOOT_TIMEOUT, SHUTDOWN_BATCH_DELAY,
    },
    messages::DeviceInfoResponse,
};

use crate::connection::ConnectionConfig;

/// Static description of the device, reported to `DeviceInfoRequest`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
    pub friendly_name: String,
    pub mac_address: String,
    pub firmware_version: String,
    pub compilation_time: String,
    pub model: String,
    pub manufacturer: String,
    pub project_name: String,
    pub project_version: String,
    pub suggested_area: String,
    pub has_deep_sleep: bool,
    pub webserver_port: u32,
}

impl DeviceInfo {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            friendly_name: name.to_string(),
            ..Default::default()
        }
    }

    /// The `server_info` string sent in `HelloResponse`
    pub fn server_info(&self) -> String {
        if self.firmware_version.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.firmware_version)
        }
    }

    pub(crate) fn to_response(
        &self,
        uses_password: bool,
        api_encryption_supported: bool,
    ) -> DeviceInfoResponse {
        DeviceInfoResponse {
            uses_password,
            name: self.name.clone(),
            mac_address: self.mac_address.clone(),
            firmware_version: self.firmware_version.clone(),
            compilation_time: self.compilation_time.clone(),
            model: self.model.clone(),
            has_deep_sleep: self.has_deep_sleep,
            project_name: self.project_name.clone(),
            project_version: self.project_version.clone(),
            webserver_port: self.webserver_port,
            manufacturer: self.manufacturer.clone(),
            friendly_name: self.friendly_name.clone(),
            suggested_area: self.suggested_area.clone(),
            api_encryption_supported,
        }
    }
}

/// Contains Config properties which will be used by the Server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// TCP port the acceptor listens on
    pub port: u16,
    pub listen_backlog: i32,
    /// Clients beyond this are closed right after accept
    pub max_connections: usize,
    /// With no client connected for this long the host is asked to reboot.
    /// `Duration::ZERO` disables the check.
    pub reboot_timeout: Duration,
    /// How long state updates are held back to be coalesced
    pub batch_delay: Duration,
    /// Batch delay once shutdown has started
    pub shutdown_batch_delay: Duration,
    /// A client waiting for a service response gives up after this long
    pub action_call_timeout: Duration,
    /// Grace period between saving a new PSK and switching to it
    pub psk_activation_delay: Duration,
    /// Required in `ConnectRequest` when set; `None` authenticates on Hello
    pub password: Option<String>,
    pub device_info: DeviceInfo,
    /// Used to configure the connections with Clients
    pub connection: ConnectionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            listen_backlog: DEFAULT_LISTEN_BACKLOG,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            reboot_timeout: REBOOT_TIMEOUT,
            batch_delay: BATCH_DELAY,
            shutdown_batch_delay: SHUTDOWN_BATCH_DELAY,
            action_call_timeout: ACTION_CALL_TIMEOUT,
            psk_activation_delay: PSK_ACTIVATION_DELAY,
            password: None,
            device_info: DeviceInfo::new("devlink"),
            connection: ConnectionConfig::default(),
        }
    }
}
