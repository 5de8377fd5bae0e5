/// PROPERTY-BASED TESTS: batching invariants
///
/// Key invariants:
/// 1. The batch never holds two items for one (entity, message kind)
/// 2. Queue order is first-scheduled order, except for front inserts
/// 3. A write carrying more than one message never exceeds the ceiling
use std::time::Duration;

use proptest::prelude::*;

use devlink_server::{
    shared::{
        messages::{ListEntitiesRequest, MessageKind},
        EntityHandle, EntityKind,
    },
    BatchItem, DeferredBatch,
};
use devlink_test::{kinds, TestEntityBuilder, TestServer};

fn item_strategy() -> impl Strategy<Value = BatchItem> {
    (0u16..8, any::<bool>(), 0usize..300).prop_map(|(index, info, size)| {
        let kind = if info {
            MessageKind::ListEntitiesSensorResponse
        } else {
            MessageKind::SensorStateResponse
        };
        BatchItem::new(
            Some(EntityHandle::new(EntityKind::Sensor, index)),
            kind,
            size,
            None,
        )
    })
}

fn key(item: &BatchItem) -> (Option<EntityHandle>, MessageKind) {
    (item.entity, item.kind)
}

proptest! {
    #[test]
    fn prop_batch_keeps_one_entry_per_key(items in prop::collection::vec(item_strategy(), 0..64)) {
        let mut batch = DeferredBatch::new();
        let mut first_seen = Vec::new();
        for item in &items {
            batch.add_item(*item);
            if !first_seen.contains(&key(item)) {
                first_seen.push(key(item));
            }
        }

        let queued: Vec<_> = batch.iter().map(key).collect();
        prop_assert_eq!(queued, first_seen);

        // Every queued entry carries the estimate of its latest schedule
        for queued in batch.iter() {
            let latest = items.iter().rev().find(|item| key(item) == key(queued)).unwrap();
            prop_assert_eq!(queued.estimated_size, latest.estimated_size);
        }
    }

    #[test]
    fn prop_front_insert_leads_without_duplicating(
        items in prop::collection::vec(item_strategy(), 1..32),
        front in item_strategy(),
    ) {
        let mut batch = DeferredBatch::new();
        for item in &items {
            batch.add_item(*item);
        }
        let before = batch.len();
        let was_queued = batch.iter().any(|queued| key(queued) == key(&front));

        batch.add_item_front(front);
        prop_assert_eq!(batch.get(0).map(key), Some(key(&front)));
        prop_assert_eq!(batch.len(), if was_queued { before } else { before + 1 });
        prop_assert_eq!(batch.iter().filter(|queued| key(queued) == key(&front)).count(), 1);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_listing_writes_stay_under_ceiling(
        sensors in 1usize..120,
        padding in 0usize..60,
        legacy in any::<bool>(),
    ) {
        let (entities, _) = TestEntityBuilder::new()
            .name_padding(padding)
            .sensors(sensors)
            .build();
        let mut server = TestServer::with_entities(entities);
        let mut client = server.connect();
        if legacy {
            client.hello_as(1, 9);
        } else {
            client.hello();
        }
        server.poll();
        client.receive();
        client.clear_server_writes();

        client.send(&ListEntitiesRequest);
        let mut frames = Vec::new();
        for _ in 0..200 {
            server.advance(Duration::from_millis(100));
            frames.extend(client.receive());
            if frames.len() > sensors {
                break;
            }
        }

        let received = kinds(&frames);
        prop_assert_eq!(received.len(), sensors + 1);
        prop_assert_eq!(received.last(), Some(&MessageKind::ListEntitiesDoneResponse));
        for size in client.server_write_sizes() {
            prop_assert!(size <= 1390, "write of {} bytes", size);
        }
    }
}
