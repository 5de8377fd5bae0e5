//! Entity model: the device capabilities exposed to clients.
//!
//! Entities are plain data owned by the host application through
//! [`Entities`]. The engine only ever asks an entity to describe itself
//! (its `ListEntities*Response`) or to report its current state; both are
//! encoded at flush time, so a state change that is scheduled twice before
//! a flush goes out once with the latest value.

mod kinds;

pub use kinds::{
    BinarySensor, Event, Number, Sensor, Service, Switch, TextSensor, Update, UpdateInfo,
};

use std::any::Any;

use thiserror::Error;

use crate::{
    api_version::ApiVersion,
    messages::{InfoCommon, MessageKind},
    proto::ProtoMessage,
    types::EntityCategory,
};

/// Entity families, in the order enumerators visit them
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    BinarySensor,
    Sensor,
    Switch,
    TextSensor,
    Service,
    Number,
    Event,
    Update,
}

impl EntityKind {
    pub const ORDER: [EntityKind; 8] = [
        EntityKind::BinarySensor,
        EntityKind::Sensor,
        EntityKind::Switch,
        EntityKind::TextSensor,
        EntityKind::Service,
        EntityKind::Number,
        EntityKind::Event,
        EntityKind::Update,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn info_kind(self) -> MessageKind {
        match self {
            EntityKind::BinarySensor => MessageKind::ListEntitiesBinarySensorResponse,
            EntityKind::Sensor => MessageKind::ListEntitiesSensorResponse,
            EntityKind::Switch => MessageKind::ListEntitiesSwitchResponse,
            EntityKind::TextSensor => MessageKind::ListEntitiesTextSensorResponse,
            EntityKind::Service => MessageKind::ListEntitiesServicesResponse,
            EntityKind::Number => MessageKind::ListEntitiesNumberResponse,
            EntityKind::Event => MessageKind::ListEntitiesEventResponse,
            EntityKind::Update => MessageKind::ListEntitiesUpdateResponse,
        }
    }

    /// `None` for kinds that have nothing to report after enumeration
    pub fn state_kind(self) -> Option<MessageKind> {
        match self {
            EntityKind::BinarySensor => Some(MessageKind::BinarySensorStateResponse),
            EntityKind::Sensor => Some(MessageKind::SensorStateResponse),
            EntityKind::Switch => Some(MessageKind::SwitchStateResponse),
            EntityKind::TextSensor => Some(MessageKind::TextSensorStateResponse),
            EntityKind::Service => None,
            EntityKind::Number => Some(MessageKind::NumberStateResponse),
            EntityKind::Event => Some(MessageKind::EventResponse),
            EntityKind::Update => Some(MessageKind::UpdateStateResponse),
        }
    }

    /// Whether the initial-state pass reports this kind. Events are edge
    /// triggered and have no standing state to replay.
    pub fn has_initial_state(self) -> bool {
        !matches!(self, EntityKind::Service | EntityKind::Event)
    }
}

/// Stable reference to one registered entity
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntityHandle {
    pub kind: EntityKind,
    pub index: u16,
}

impl EntityHandle {
    pub fn new(kind: EntityKind, index: u16) -> Self {
        Self { kind, index }
    }
}

/// Identity and presentation fields shared by every entity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityCommon {
    pub object_id: String,
    pub key: u32,
    pub name: String,
    pub icon: String,
    pub disabled_by_default: bool,
    /// Internal entities exist on the device but are never shown to clients
    pub internal: bool,
    pub entity_category: EntityCategory,
    pub device_id: u32,
}

impl EntityCommon {
    pub fn new(object_id: &str, name: &str, key: u32) -> Self {
        Self {
            object_id: object_id.to_string(),
            name: name.to_string(),
            key,
            ..Default::default()
        }
    }

    pub fn info_common(&self, version: ApiVersion) -> InfoCommon<'_> {
        InfoCommon {
            object_id: if version.needs_object_id() {
                &self.object_id
            } else {
                ""
            },
            key: self.key,
            name: &self.name,
            icon: &self.icon,
            disabled_by_default: self.disabled_by_default,
            entity_category: self.entity_category,
            device_id: self.device_id,
        }
    }
}

/// Capabilities the engine needs from an entity
pub trait Entity: Any {
    fn common(&self) -> &EntityCommon;

    fn kind(&self) -> EntityKind;

    /// The `ListEntities*Response` describing this entity to a client at
    /// `version`
    fn info_message(&self, version: ApiVersion) -> Box<dyn ProtoMessage + '_>;

    /// The current state message. `aux` selects a variant for entities
    /// with more than one kind of report (the event type of an event).
    fn state_message(&self, aux: Option<u8>) -> Option<Box<dyn ProtoMessage + '_>>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A kind already holds as many entities as handles can address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("No handle left for another {kind:?} entity")]
pub struct EntitiesFull {
    pub kind: EntityKind,
}

/// Registry of every entity on the device, grouped by kind.
///
/// Handles stay valid for the life of the registry. A removed entity leaves
/// an empty slot behind, so queued work referring to it can notice and be
/// dropped.
#[derive(Default)]
pub struct Entities {
    slots: [Vec<Option<Box<dyn Entity>>>; 8],
}

impl Entities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `entity`. Fails once its kind has used up every handle,
    /// removed slots included.
    pub fn add<E: Entity>(&mut self, entity: E) -> Result<EntityHandle, EntitiesFull> {
        let kind = entity.kind();
        let slots = &mut self.slots[kind.index()];
        let index = u16::try_from(slots.len()).map_err(|_| EntitiesFull { kind })?;
        slots.push(Some(Box::new(entity)));
        Ok(EntityHandle::new(kind, index))
    }

    pub fn remove(&mut self, handle: EntityHandle) -> Option<Box<dyn Entity>> {
        self.slots[handle.kind.index()]
            .get_mut(handle.index as usize)
            .and_then(Option::take)
    }

    pub fn get(&self, handle: EntityHandle) -> Option<&dyn Entity> {
        self.slots[handle.kind.index()]
            .get(handle.index as usize)
            .and_then(|slot| slot.as_deref())
    }

    pub fn get_mut<E: Entity>(&mut self, handle: EntityHandle) -> Option<&mut E> {
        self.slots[handle.kind.index()]
            .get_mut(handle.index as usize)
            .and_then(|slot| slot.as_deref_mut())
            .and_then(|entity| entity.as_any_mut().downcast_mut::<E>())
    }

    pub fn contains(&self, handle: EntityHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Number of slots for `kind`, including removed ones
    pub fn slot_count(&self, kind: EntityKind) -> usize {
        self.slots[kind.index()].len()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live entities, in enumeration order
    pub fn iter(&self) -> impl Iterator<Item = (EntityHandle, &dyn Entity)> {
        EntityKind::ORDER.into_iter().flat_map(move |kind| {
            self.slots[kind.index()]
                .iter()
                .enumerate()
                .filter_map(move |(index, slot)| {
                    slot.as_deref()
                        .map(|entity| (EntityHandle::new(kind, index as u16), entity))
                })
        })
    }

    pub fn find_by_key(&self, kind: EntityKind, key: u32) -> Option<EntityHandle> {
        self.slots[kind.index()]
            .iter()
            .position(|slot| {
                slot.as_deref()
                    .map(|entity| entity.common().key == key)
                    .unwrap_or(false)
            })
            .map(|index| EntityHandle::new(kind, index as u16))
    }
}
