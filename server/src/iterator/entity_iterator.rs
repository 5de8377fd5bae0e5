use devlink_shared::{Entities, Entity, EntityHandle, EntityKind, MessageKind};

/// What an enumeration pass produces for each entity
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IteratorKind {
    /// `ListEntities*Response` for every entity, then `ListEntitiesDoneResponse`
    ListEntities,
    /// The current state of every entity that has one
    InitialState,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Phase {
    Begin,
    Kind(usize),
    End,
    Done,
}

/// Receives the messages an [`EntityIterator`] wants sent
pub trait IteratorSink {
    fn on_entity(&mut self, handle: EntityHandle, entity: &dyn Entity, kind: MessageKind);

    /// Called once after the last entity, with the closing message if the
    /// pass has one
    fn on_end(&mut self, kind: Option<MessageKind>);
}

/// Cooperative walk over the entity registry.
///
/// Each call to [`advance`](Self::advance) emits at most `budget` messages
/// and returns, so one connection's enumeration never starves the others.
/// A finished iterator stays finished; start a new one to enumerate again.
#[derive(Clone, Debug)]
pub struct EntityIterator {
    kind: IteratorKind,
    phase: Phase,
    cursor: usize,
    include_internal: bool,
}

impl EntityIterator {
    pub fn new(kind: IteratorKind) -> Self {
        Self {
            kind,
            phase: Phase::Begin,
            cursor: 0,
            include_internal: false,
        }
    }

    pub fn list_entities() -> Self {
        Self::new(IteratorKind::ListEntities)
    }

    pub fn initial_state() -> Self {
        Self::new(IteratorKind::InitialState)
    }

    pub fn with_internal(mut self) -> Self {
        self.include_internal = true;
        self
    }

    pub fn kind(&self) -> IteratorKind {
        self.kind
    }

    pub fn completed(&self) -> bool {
        self.phase == Phase::Done
    }

    fn visits(&self, kind: EntityKind) -> bool {
        match self.kind {
            IteratorKind::ListEntities => true,
            IteratorKind::InitialState => kind.has_initial_state(),
        }
    }

    fn message_for(&self, kind: EntityKind) -> Option<MessageKind> {
        match self.kind {
            IteratorKind::ListEntities => Some(kind.info_kind()),
            IteratorKind::InitialState => kind.state_kind(),
        }
    }

    fn next_phase(&mut self, from: usize) {
        self.cursor = 0;
        self.phase = if from + 1 < EntityKind::ORDER.len() {
            Phase::Kind(from + 1)
        } else {
            Phase::End
        };
    }

    /// Emits up to `budget` messages into `sink` and returns how many were
    /// emitted. Skipped entities (internal, removed, or without state) do
    /// not count.
    pub fn advance(
        &mut self,
        entities: &Entities,
        budget: usize,
        sink: &mut dyn IteratorSink,
    ) -> usize {
        let mut emitted = 0;
        while emitted < budget {
            match self.phase {
                Phase::Begin => {
                    self.cursor = 0;
                    self.phase = Phase::Kind(0);
                }
                Phase::Kind(index) => {
                    let kind = EntityKind::ORDER[index];
                    if !self.visits(kind) || self.cursor >= entities.slot_count(kind) {
                        self.next_phase(index);
                        continue;
                    }
                    let handle = EntityHandle::new(kind, self.cursor as u16);
                    self.cursor += 1;

                    let Some(entity) = entities.get(handle) else {
                        continue;
                    };
                    if entity.common().internal && !self.include_internal {
                        continue;
                    }
                    let Some(message_kind) = self.message_for(kind) else {
                        continue;
                    };
                    sink.on_entity(handle, entity, message_kind);
                    emitted += 1;
                }
                Phase::End => {
                    match self.kind {
                        IteratorKind::ListEntities => {
                            sink.on_end(Some(MessageKind::ListEntitiesDoneResponse));
                            emitted += 1;
                        }
                        IteratorKind::InitialState => sink.on_end(None),
                    }
                    self.phase = Phase::Done;
                }
                Phase::Done => break,
            }
        }
        emitted
    }
}
