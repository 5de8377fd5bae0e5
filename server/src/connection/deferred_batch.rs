use std::time::{Duration, Instant};

use devlink_shared::{EntityHandle, MessageKind};

/// One message waiting to be encoded. The payload itself is built from the
/// entity at flush time.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BatchItem {
    pub entity: Option<EntityHandle>,
    pub kind: MessageKind,
    pub estimated_size: u8,
    pub aux_index: Option<u8>,
}

impl BatchItem {
    pub fn new(
        entity: Option<EntityHandle>,
        kind: MessageKind,
        estimated_size: usize,
        aux_index: Option<u8>,
    ) -> Self {
        Self {
            entity,
            kind,
            estimated_size: u8::try_from(estimated_size).unwrap_or(u8::MAX),
            aux_index,
        }
    }

    fn same_key(&self, other: &BatchItem) -> bool {
        self.entity == other.entity && self.kind == other.kind
    }
}

/// Ordered outbound queue with one entry per `(entity, kind)`.
///
/// Flushes happen front to back. Scheduling something already queued
/// refreshes the queued entry in place, so the client only ever sees the
/// latest state of an entity once per flush.
#[derive(Debug, Default)]
pub struct DeferredBatch {
    items: Vec<BatchItem>,
    batch_start: Option<Instant>,
}

impl DeferredBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_item(&mut self, item: BatchItem) {
        if let Some(existing) = self.items.iter_mut().find(|queued| queued.same_key(&item)) {
            existing.estimated_size = item.estimated_size;
            existing.aux_index = item.aux_index;
            return;
        }
        self.items.push(item);
    }

    /// Queues `item` ahead of everything else. An equal-key entry already
    /// queued is moved to the front.
    pub fn add_item_front(&mut self, item: BatchItem) {
        if let Some(index) = self.items.iter().position(|queued| queued.same_key(&item)) {
            self.items.remove(index);
        }
        self.items.insert(0, item);
    }

    /// Whether an entry for `entity` and `kind` is waiting
    pub fn contains(&self, entity: Option<EntityHandle>, kind: MessageKind) -> bool {
        self.items
            .iter()
            .any(|queued| queued.entity == entity && queued.kind == kind)
    }

    pub fn remove_front(&mut self, count: usize) {
        let count = count.min(self.items.len());
        self.items.drain(..count);
    }

    /// Empties the batch and gives its memory back
    pub fn clear(&mut self) {
        self.items = Vec::new();
        self.batch_start = None;
    }

    pub fn arm(&mut self, now: Instant) {
        self.batch_start = Some(now);
    }

    pub fn is_armed(&self) -> bool {
        self.batch_start.is_some()
    }

    pub fn is_due(&self, now: Instant, delay: Duration) -> bool {
        self.batch_start
            .map(|start| now.saturating_duration_since(start) >= delay)
            .unwrap_or(false)
    }

    pub fn get(&self, index: usize) -> Option<&BatchItem> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BatchItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Sum of the size estimates of the first `count` items
    pub fn estimated_size(&self, count: usize) -> usize {
        self.items
            .iter()
            .take(count)
            .map(|item| usize::from(item.estimated_size))
            .sum()
    }
}
