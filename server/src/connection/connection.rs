use std::{mem, time::Instant};

use log::{debug, info, trace, warn};

use devlink_shared::{
    messages::{
        CommandRequest, ConnectRequest, ConnectResponse, DisconnectResponse,
        ExecuteServiceRequest, ExecuteServiceResponse, HelloRequest, HelloResponse,
        HomeassistantActionRequest, NoiseEncryptionSetKeyRequest, NoiseEncryptionSetKeyResponse,
        NumberCommandRequest, PingResponse, SubscribeLogsRequest,
        SubscribeLogsResponse, SwitchCommandRequest, UpdateCommandRequest,
    },
    ApiError, ApiVersion, Entity, EntityHandle, EntityKind, FrameHelper, LogLevel, MessageKind,
    ProtoDecode, ProtoMessage, ReadFrame, Timer, SERVER_API_VERSION,
};

use crate::{
    error::DevlinkServerError,
    events::{ActionCall, ClientInfo},
    iterator::{EntityIterator, IteratorKind, IteratorSink},
    server::NoisePsk,
};

use super::{
    connection_config::ConnectionConfig,
    context::ConnectionContext,
    deferred_batch::{BatchItem, DeferredBatch},
    flags::{ConnectionFlags, ConnectionState},
    outbound::{control_message, encode_into, entity_message, schedule_item},
    ConnectionKey,
};

/// The enumeration pass a connection is running, if any
pub(crate) enum ActiveIterator {
    None,
    ListEntities(EntityIterator),
    InitialState(EntityIterator),
}

impl ActiveIterator {
    pub fn is_active(&self) -> bool {
        !matches!(self, ActiveIterator::None)
    }
}

/// One client session: handshake, inbound dispatch, outbound batching and
/// keepalive.
pub struct Connection {
    key: ConnectionKey,
    helper: Box<dyn FrameHelper>,
    flags: ConnectionFlags,
    client_info: String,
    client_version: ApiVersion,
    batch: DeferredBatch,
    iterator: ActiveIterator,
    last_traffic: Timer,
    config: ConnectionConfig,
}

impl Connection {
    pub fn new(
        key: ConnectionKey,
        helper: Box<dyn FrameHelper>,
        config: &ConnectionConfig,
        now: Instant,
    ) -> Self {
        Self {
            key,
            helper,
            flags: ConnectionFlags::default(),
            client_info: String::new(),
            client_version: ApiVersion::default(),
            batch: DeferredBatch::new(),
            iterator: ActiveIterator::None,
            last_traffic: Timer::new(config.keepalive_timeout, now),
            config: config.clone(),
        }
    }

    pub fn key(&self) -> ConnectionKey {
        self.key
    }

    pub fn peer_name(&self) -> &str {
        self.helper.peer_name()
    }

    pub fn client_info(&self) -> &str {
        &self.client_info
    }

    pub fn state(&self) -> ConnectionState {
        self.flags.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.flags.is_authenticated()
    }

    pub fn has_state_subscription(&self) -> bool {
        self.flags.state_subscription
    }

    pub fn is_removed(&self) -> bool {
        self.flags.remove
    }

    pub fn batch_len(&self) -> usize {
        self.batch.len()
    }

    /// Runs the frame helper's handshake and starts the keepalive clock
    pub fn start(&mut self, ctx: &mut ConnectionContext) {
        self.last_traffic.reset(ctx.now);
        if let Err(error) = self.helper.init() {
            if !error.is_would_block() {
                self.on_api_error(error, ctx);
            }
        }
    }

    /// One pass of the connection: read, flush, enumerate, keepalive
    pub fn poll(&mut self, ctx: &mut ConnectionContext) {
        if self.flags.remove {
            return;
        }

        if let Err(error) = self.helper.poll() {
            if !error.is_would_block() {
                self.on_api_error(error, ctx);
                return;
            }
        }

        if self.flags.next_close {
            if self.helper.can_write_without_blocking() || self.last_traffic.ringing(ctx.now) {
                self.close("disconnect requested");
            }
            return;
        }

        for _ in 0..self.config.max_messages_per_poll {
            match self.helper.read_frame() {
                Ok(Some(frame)) => {
                    self.last_traffic.reset(ctx.now);
                    self.dispatch(frame, ctx);
                    if self.flags.remove || self.flags.next_close {
                        return;
                    }
                }
                Ok(None) => break,
                Err(error) if error.is_would_block() => break,
                Err(error) => {
                    self.on_api_error(error, ctx);
                    return;
                }
            }
        }

        if self.flags.batch_scheduled && self.batch.is_due(ctx.now, ctx.batch_delay) {
            self.process_batch(ctx);
        }

        if !self.flags.remove {
            self.process_iterator(ctx);
        }

        if !self.flags.remove {
            self.check_keepalive(ctx);
        }
    }

    // Inbound

    fn is_allowed(&self, kind: MessageKind) -> bool {
        match kind {
            MessageKind::HelloRequest
            | MessageKind::DisconnectRequest
            | MessageKind::DisconnectResponse
            | MessageKind::PingRequest
            | MessageKind::PingResponse => true,
            MessageKind::ConnectRequest | MessageKind::DeviceInfoRequest => {
                self.flags.state >= ConnectionState::Connected
            }
            _ => self.flags.is_authenticated(),
        }
    }

    fn decode<M: ProtoDecode>(&self, kind: MessageKind, payload: &[u8]) -> Option<M> {
        match M::decode(payload) {
            Ok(message) => Some(message),
            Err(error) => {
                warn!(
                    "{}: dropping malformed {}: {}",
                    self.peer_name(),
                    kind.name(),
                    error
                );
                None
            }
        }
    }

    fn dispatch(&mut self, frame: ReadFrame, ctx: &mut ConnectionContext) {
        let Some(kind) = MessageKind::from_id(frame.message_type) else {
            debug!(
                "{}: ignoring unknown message type {}",
                self.peer_name(),
                frame.message_type
            );
            return;
        };
        if !self.is_allowed(kind) {
            debug!(
                "{}: dropping {} while {:?}",
                self.peer_name(),
                kind.name(),
                self.flags.state
            );
            return;
        }
        trace!("{}: received {}", self.peer_name(), kind.name());

        let payload = frame.payload.as_slice();
        match kind {
            MessageKind::HelloRequest => self.on_hello(payload, ctx),
            MessageKind::ConnectRequest => self.on_connect(payload, ctx),
            MessageKind::DisconnectRequest => {
                info!("{}: client requested disconnect", self.peer_name());
                self.send_message(&DisconnectResponse, ctx);
                self.flags.next_close = true;
            }
            MessageKind::DisconnectResponse => self.close("disconnect acknowledged"),
            MessageKind::PingRequest => {
                self.send_message(&PingResponse, ctx);
            }
            MessageKind::PingResponse => self.flags.sent_ping = false,
            MessageKind::DeviceInfoRequest => {
                let response = ctx
                    .config
                    .device_info
                    .to_response(ctx.config.password.is_some(), ctx.psk.is_supported());
                self.send_message(&response, ctx);
            }
            MessageKind::ListEntitiesRequest => self.request_list_entities(),
            MessageKind::SubscribeStatesRequest => self.request_initial_state(),
            MessageKind::SubscribeLogsRequest => {
                if let Some(request) = self.decode::<SubscribeLogsRequest>(kind, payload) {
                    self.flags.log_subscription = request.level;
                    if request.dump_config {
                        ctx.events.push_dump_config(self.key);
                    }
                }
            }
            MessageKind::SubscribeHomeassistantServicesRequest => {
                self.flags.service_call_subscription = true;
            }
            MessageKind::ExecuteServiceRequest => self.on_execute_service(payload, ctx),
            MessageKind::SwitchCommandRequest => {
                if let Some(request) = self.decode::<SwitchCommandRequest>(kind, payload) {
                    ctx.events.push_command(self.key, CommandRequest::Switch(request));
                }
            }
            MessageKind::NumberCommandRequest => {
                if let Some(request) = self.decode::<NumberCommandRequest>(kind, payload) {
                    ctx.events.push_command(self.key, CommandRequest::Number(request));
                }
            }
            MessageKind::UpdateCommandRequest => {
                if let Some(request) = self.decode::<UpdateCommandRequest>(kind, payload) {
                    ctx.events.push_command(self.key, CommandRequest::Update(request));
                }
            }
            MessageKind::NoiseEncryptionSetKeyRequest => self.on_set_noise_key(payload, ctx),
            _ => debug!(
                "{}: {} is not handled by this device",
                self.peer_name(),
                kind.name()
            ),
        }
    }

    fn on_hello(&mut self, payload: &[u8], ctx: &mut ConnectionContext) {
        let request = match HelloRequest::decode(payload) {
            Ok(request) => request,
            Err(error) => {
                warn!("{}: malformed HelloRequest: {}", self.peer_name(), error);
                self.close("malformed hello");
                return;
            }
        };
        self.client_info = request.client_info;
        self.client_version =
            ApiVersion::from_wire(request.api_version_major, request.api_version_minor);
        debug!(
            "{} ({}): hello, API {}",
            self.client_info,
            self.peer_name(),
            self.client_version
        );
        self.flags.advance_state(ConnectionState::Connected);

        let response = HelloResponse {
            api_version_major: u32::from(SERVER_API_VERSION.major),
            api_version_minor: u32::from(SERVER_API_VERSION.minor),
            server_info: ctx.config.device_info.server_info(),
            name: ctx.config.device_info.name.clone(),
        };
        if !self.send_message(&response, ctx) {
            return;
        }

        if ctx.config.password.is_none() {
            self.complete_authentication(ctx);
        }
    }

    fn on_connect(&mut self, payload: &[u8], ctx: &mut ConnectionContext) {
        let Some(request) = self.decode::<ConnectRequest>(MessageKind::ConnectRequest, payload)
        else {
            return;
        };
        let valid = match ctx.config.password.as_deref() {
            None => true,
            Some(password) => passwords_match(password.as_bytes(), request.password.as_bytes()),
        };
        self.send_message(
            &ConnectResponse {
                invalid_password: !valid,
            },
            ctx,
        );
        if self.flags.remove {
            return;
        }

        if valid {
            self.complete_authentication(ctx);
        } else {
            warn!("{} ({}): invalid password", self.client_info, self.peer_name());
            self.close("invalid password");
        }
    }

    fn complete_authentication(&mut self, ctx: &mut ConnectionContext) {
        if self.flags.is_authenticated() {
            return;
        }
        self.flags.advance_state(ConnectionState::Authenticated);
        info!("{} ({}) connected", self.client_info, self.peer_name());
        ctx.events.push_connection(
            self.key,
            ClientInfo {
                client_info: self.client_info.clone(),
                peer: self.peer_name().to_string(),
                api_version: self.client_version,
            },
        );
    }

    fn on_execute_service(&mut self, payload: &[u8], ctx: &mut ConnectionContext) {
        let Some(request) =
            self.decode::<ExecuteServiceRequest>(MessageKind::ExecuteServiceRequest, payload)
        else {
            return;
        };
        let Some(service) = ctx.entities.find_by_key(EntityKind::Service, request.key) else {
            warn!(
                "{}: no service with key {:#010x}",
                self.peer_name(),
                request.key
            );
            if request.wants_response() {
                let response = ExecuteServiceResponse {
                    call_id: request.call_id,
                    success: false,
                    error_message: "Unknown service".to_string(),
                    response_data: Vec::new(),
                };
                self.send_message(&response, ctx);
            }
            return;
        };

        let action_call_id = if request.wants_response() {
            Some(
                ctx.action_calls
                    .register(request.call_id, self.key, ctx.now),
            )
        } else {
            None
        };
        ctx.events.push_action_call(ActionCall {
            connection: self.key,
            service,
            key: request.key,
            args: request.args,
            action_call_id,
            return_response: request.return_response,
        });
    }

    fn on_set_noise_key(&mut self, payload: &[u8], ctx: &mut ConnectionContext) {
        let Some(request) = self.decode::<NoiseEncryptionSetKeyRequest>(
            MessageKind::NoiseEncryptionSetKeyRequest,
            payload,
        ) else {
            return;
        };
        let result = NoisePsk::try_from(request.key.as_slice())
            .and_then(|psk| ctx.psk.save_noise_psk(psk, true, ctx.now));
        if let Err(error) = &result {
            warn!("{}: Noise PSK not changed: {}", self.peer_name(), error);
        }
        self.send_message(
            &NoiseEncryptionSetKeyResponse {
                success: result.is_ok(),
            },
            ctx,
        );
    }

    // Enumeration

    fn request_list_entities(&mut self) {
        if self.iterator.is_active() {
            debug!("{}: entity list queued behind running pass", self.peer_name());
            self.flags.list_entities_pending = true;
            return;
        }
        self.flags.list_entities_pending = false;
        self.iterator = ActiveIterator::ListEntities(EntityIterator::list_entities());
    }

    fn request_initial_state(&mut self) {
        self.flags.state_subscription = true;
        if self.iterator.is_active() {
            debug!("{}: initial state queued behind running pass", self.peer_name());
            self.flags.initial_state_pending = true;
            return;
        }
        self.flags.initial_state_pending = false;
        self.iterator = ActiveIterator::InitialState(EntityIterator::initial_state());
    }

    /// Starts whichever pass was queued while `finished` ran. The other kind
    /// goes first so neither request can starve.
    fn start_pending_iterator(&mut self, finished: IteratorKind) {
        let list = self.flags.list_entities_pending;
        let initial = self.flags.initial_state_pending;
        match finished {
            IteratorKind::ListEntities if initial => self.request_initial_state(),
            IteratorKind::InitialState if list => self.request_list_entities(),
            _ if list => self.request_list_entities(),
            _ if initial => self.request_initial_state(),
            _ => {}
        }
    }

    fn process_iterator(&mut self, ctx: &mut ConnectionContext) {
        if !self.iterator.is_active() {
            return;
        }
        let max = self.config.max_initial_for(self.client_version);
        if self.batch.len() >= max {
            self.process_batch(ctx);
            if self.flags.remove || self.batch.len() >= max {
                return;
            }
        }
        let budget = max - self.batch.len();

        let mut active = mem::replace(&mut self.iterator, ActiveIterator::None);
        let finished = match &mut active {
            ActiveIterator::ListEntities(iterator) | ActiveIterator::InitialState(iterator) => {
                let mut sink = BatchSink {
                    batch: &mut self.batch,
                    flags: &mut self.flags,
                    version: self.client_version,
                    now: ctx.now,
                };
                iterator.advance(ctx.entities, budget, &mut sink);
                iterator.completed()
            }
            ActiveIterator::None => return,
        };

        if self.batch.len() >= max {
            self.process_batch(ctx);
        }

        if !finished {
            self.iterator = active;
            return;
        }
        match active {
            ActiveIterator::ListEntities(_) => {
                debug!("{}: entity list complete", self.peer_name());
                self.start_pending_iterator(IteratorKind::ListEntities);
            }
            ActiveIterator::InitialState(_) => {
                debug!("{}: initial state complete", self.peer_name());
                self.flags.should_try_send_immediately = true;
                self.start_pending_iterator(IteratorKind::InitialState);
            }
            ActiveIterator::None => {}
        }
    }

    // Keepalive

    fn check_keepalive(&mut self, ctx: &mut ConnectionContext) {
        let silent_for = self.last_traffic.elapsed(ctx.now);
        if self.flags.sent_ping {
            if silent_for >= self.config.keepalive_fatal_timeout() {
                warn!(
                    "{} ({}): no response to ping in {:?}",
                    self.client_info,
                    self.peer_name(),
                    silent_for
                );
                self.close("keepalive timeout");
            }
            return;
        }
        if self.last_traffic.ringing(ctx.now) {
            self.flags.sent_ping = true;
            let item = BatchItem::new(None, MessageKind::PingRequest, 0, None);
            if !(self.helper.can_write_without_blocking() && self.try_send_item(item, ctx)) {
                self.schedule_message(item, true, ctx.now);
            }
        }
    }

    // Outbound

    /// Sends `message` right away. Frame helpers queue what the socket
    /// cannot take yet, up to a limit; a client that lets that queue fill
    /// up is disconnected.
    fn send_message(&mut self, message: &dyn ProtoMessage, ctx: &mut ConnectionContext) -> bool {
        if self.flags.remove {
            return false;
        }
        let padding = self.helper.header_padding();
        let footer = self.helper.footer_size();
        let buffer = &mut *ctx.shared_buffer;
        buffer.clear();
        let Some((info, _)) = encode_into(buffer, message, padding, footer, None) else {
            return false;
        };
        match self.helper.write_messages(buffer, &[info]) {
            Ok(()) => true,
            Err(error) if error.is_would_block() => {
                warn!(
                    "{} ({}): send queue full while sending {}",
                    self.client_info,
                    self.peer_name(),
                    message.kind().name()
                );
                self.close("send queue full");
                false
            }
            Err(error) => {
                self.on_api_error(error, ctx);
                false
            }
        }
    }

    /// Encodes a batchable item and writes it on its own. Returns `false`
    /// when nothing could be written; the item is then still the caller's.
    fn try_send_item(&mut self, item: BatchItem, ctx: &mut ConnectionContext) -> bool {
        let entities = ctx.entities;
        let message = match item.entity {
            Some(handle) => entities.get(handle).and_then(|entity| {
                entity_message(entity, item.kind, self.client_version, item.aux_index)
            }),
            None => control_message(item.kind),
        };
        let Some(message) = message else {
            return false;
        };
        self.send_message(message.as_ref(), ctx)
    }

    fn schedule_message(&mut self, item: BatchItem, front: bool, now: Instant) {
        schedule_item(&mut self.batch, &mut self.flags, item, front, now);
    }

    /// Sends now when the message is latency-sensitive and the socket has
    /// room, queues it otherwise. Returns `true` if it was written.
    pub fn send_message_smart(
        &mut self,
        entity: Option<EntityHandle>,
        kind: MessageKind,
        aux_index: Option<u8>,
        ctx: &mut ConnectionContext,
    ) -> bool {
        let item = BatchItem::new(entity, kind, 0, aux_index);
        let send_now = kind.always_immediate()
            || (self.flags.should_try_send_immediately && ctx.batch_delay.is_zero());
        if send_now && self.batch.contains(entity, kind) {
            // the queued entry for this key was produced first and must
            // reach the client first
            self.process_batch(ctx);
            if self.flags.remove {
                return false;
            }
        }
        if send_now
            && !self.batch.contains(entity, kind)
            && self.helper.can_write_without_blocking()
            && self.try_send_item(item, ctx)
        {
            return true;
        }
        if self.flags.remove {
            return false;
        }

        let estimated_size = match entity.and_then(|handle| ctx.entities.get(handle)) {
            Some(entity) => entity_message(entity, kind, self.client_version, aux_index)
                .map(|message| message.calculate_size())
                .unwrap_or(0),
            None => usize::from(kind.estimated_size()),
        };
        self.schedule_message(
            BatchItem::new(entity, kind, estimated_size, aux_index),
            false,
            ctx.now,
        );
        false
    }

    /// Writes as much of the batch as one flush allows.
    ///
    /// The first message always goes out whatever its size; later ones only
    /// while the write stays under the packet ceiling. Whatever is left is
    /// retried on the next pass.
    pub fn process_batch(&mut self, ctx: &mut ConnectionContext) {
        if self.batch.is_empty() {
            self.batch.clear();
            self.flags.batch_scheduled = false;
            return;
        }
        if !self.helper.can_write_without_blocking() {
            if let Err(error) = self.helper.poll() {
                if !error.is_would_block() {
                    self.on_api_error(error, ctx);
                    return;
                }
            }
            if !self.helper.can_write_without_blocking() {
                return;
            }
        }

        let padding = self.helper.header_padding();
        let footer = self.helper.footer_size();
        let limit = self.batch.len().min(self.config.max_packets_per_batch.max(1));
        let max_size = self.config.max_batch_packet_size;

        let entities = ctx.entities;
        let buffer = &mut *ctx.shared_buffer;
        buffer.clear();
        buffer.reserve(self.batch.estimated_size(limit) + limit * (padding + footer));

        let mut infos = Vec::with_capacity(limit);
        let mut used = 0;
        let mut processed = 0;
        self.flags.batch_first_message = true;
        while processed < limit {
            let Some(item) = self.batch.get(processed).copied() else {
                break;
            };
            let message = match item.entity {
                Some(handle) => entities.get(handle).and_then(|entity| {
                    entity_message(entity, item.kind, self.client_version, item.aux_index)
                }),
                None => control_message(item.kind),
            };
            let Some(message) = message else {
                trace!("skipping {} for a removed entity", item.kind.name());
                processed += 1;
                continue;
            };

            let remaining = if self.flags.batch_first_message {
                None
            } else {
                Some(max_size.saturating_sub(used))
            };
            let Some((info, size)) =
                encode_into(buffer, message.as_ref(), padding, footer, remaining)
            else {
                break;
            };
            infos.push(info);
            used += size;
            processed += 1;
            self.flags.batch_first_message = false;
        }

        if !infos.is_empty() {
            trace!(
                "{}: flushing {} messages in {} bytes",
                self.helper.peer_name(),
                infos.len(),
                used
            );
            if let Err(error) = self.helper.write_messages(buffer, &infos) {
                if !error.is_would_block() {
                    self.on_api_error(error, ctx);
                    return;
                }
            }
        }

        self.batch.remove_front(processed);
        if self.batch.is_empty() {
            self.batch.clear();
            self.flags.batch_scheduled = false;
        } else {
            self.batch.arm(ctx.now);
            self.flags.batch_scheduled = true;
        }
    }

    // Host-facing

    /// Reports the current state of `entity` to a subscribed client
    pub fn send_state(&mut self, entity: EntityHandle, ctx: &mut ConnectionContext) -> bool {
        if !self.flags.is_authenticated() || !self.flags.state_subscription {
            return false;
        }
        let Some(kind) = entity.kind.state_kind() else {
            return false;
        };
        self.send_message_smart(Some(entity), kind, None, ctx)
    }

    /// Reports that `event_type` fired on an event entity
    pub fn send_event(
        &mut self,
        entity: EntityHandle,
        event_type: u8,
        ctx: &mut ConnectionContext,
    ) -> bool {
        if !self.flags.is_authenticated() || !self.flags.state_subscription {
            return false;
        }
        self.send_message_smart(Some(entity), MessageKind::EventResponse, Some(event_type), ctx)
    }

    /// Forwards a log line if the client subscribed at `level` or more
    /// verbose
    pub fn send_log_message(
        &mut self,
        level: LogLevel,
        message: &str,
        ctx: &mut ConnectionContext,
    ) -> bool {
        if level == LogLevel::None || self.flags.log_subscription < level {
            return false;
        }
        // log lines are best effort and never pile up behind a slow client
        if !self.helper.can_write_without_blocking() {
            return false;
        }
        let response = SubscribeLogsResponse {
            level,
            message: message.as_bytes().to_vec(),
        };
        self.send_message(&response, ctx)
    }

    pub fn send_homeassistant_action(
        &mut self,
        request: &HomeassistantActionRequest,
        ctx: &mut ConnectionContext,
    ) -> bool {
        if !self.flags.service_call_subscription {
            return false;
        }
        self.send_message(request, ctx)
    }

    pub fn send_action_response(
        &mut self,
        client_call_id: u32,
        success: bool,
        error_message: &str,
        response_data: &[u8],
        ctx: &mut ConnectionContext,
    ) -> bool {
        let response = ExecuteServiceResponse {
            call_id: client_call_id,
            success,
            error_message: error_message.to_string(),
            response_data: response_data.to_vec(),
        };
        self.send_message(&response, ctx)
    }

    /// Asks the client to disconnect, ahead of anything already queued
    pub fn request_disconnect(&mut self, now: Instant) {
        if self.flags.remove {
            return;
        }
        let item = BatchItem::new(
            None,
            MessageKind::DisconnectRequest,
            usize::from(MessageKind::DisconnectRequest.estimated_size()),
            None,
        );
        self.schedule_message(item, true, now);
    }

    // Teardown

    fn close(&mut self, reason: &str) {
        if self.flags.remove {
            return;
        }
        info!("{}: closing connection ({})", self.peer_name(), reason);
        if let Err(error) = self.helper.close() {
            debug!("{}: {}", self.peer_name(), error);
        }
        self.flags.remove = true;
    }

    fn on_api_error(&mut self, error: ApiError, ctx: &mut ConnectionContext) {
        if error == ApiError::ConnectionClosed {
            self.close("closed by peer");
            return;
        }
        warn!("{}: {}", self.peer_name(), error);
        ctx.events.push_error(DevlinkServerError::Connection {
            connection: self.key,
            source: error,
        });
        self.close("transport error");
    }
}

/// Feeds enumerator output into the connection's batch
struct BatchSink<'b> {
    batch: &'b mut DeferredBatch,
    flags: &'b mut ConnectionFlags,
    version: ApiVersion,
    now: Instant,
}

impl IteratorSink for BatchSink<'_> {
    fn on_entity(&mut self, handle: EntityHandle, entity: &dyn Entity, kind: MessageKind) {
        let estimated_size = entity_message(entity, kind, self.version, None)
            .map(|message| message.calculate_size())
            .unwrap_or(0);
        let item = BatchItem::new(Some(handle), kind, estimated_size, None);
        schedule_item(self.batch, self.flags, item, false, self.now);
    }

    fn on_end(&mut self, kind: Option<MessageKind>) {
        if let Some(kind) = kind {
            let item = BatchItem::new(None, kind, usize::from(kind.estimated_size()), None);
            schedule_item(self.batch, self.flags, item, false, self.now);
        }
    }
}

/// Compares without an early exit, so timing does not reveal the length
/// of the matching prefix
fn passwords_match(expected: &[u8], given: &[u8]) -> bool {
    if expected.len() != given.len() {
        return false;
    }
    expected
        .iter()
        .zip(given)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}
