use devlink_server::shared::{
    entities::{BinarySensor, Event, Sensor, Service, Switch, Update, UpdateInfo},
    Entities, Entity, EntityHandle,
};

/// Builds an entity registry with predictable keys: the n-th entity added
/// gets key `n + 1`.
pub struct TestEntityBuilder {
    entities: Entities,
    handles: Vec<EntityHandle>,
    name_padding: usize,
}

impl TestEntityBuilder {
    pub fn new() -> Self {
        Self {
            entities: Entities::new(),
            handles: Vec::new(),
            name_padding: 0,
        }
    }

    /// Makes every following entity name `padding` characters longer, to
    /// grow its list response
    pub fn name_padding(mut self, padding: usize) -> Self {
        self.name_padding = padding;
        self
    }

    fn next_key(&self) -> u32 {
        self.handles.len() as u32 + 1
    }

    fn push<E: Entity>(&mut self, entity: E) {
        let handle = self.entities.add(entity).expect("entity table full");
        self.handles.push(handle);
    }

    fn name(&self, prefix: &str, key: u32) -> String {
        format!("{} {}{}", prefix, key, "x".repeat(self.name_padding))
    }

    pub fn sensors(mut self, count: usize) -> Self {
        for _ in 0..count {
            let key = self.next_key();
            let mut sensor = Sensor::new(&format!("sensor_{}", key), &self.name("Sensor", key), key);
            sensor.unit_of_measurement = "°C".to_string();
            sensor.state = Some(key as f32 / 2.0);
            self.push(sensor);
        }
        self
    }

    pub fn binary_sensors(mut self, count: usize) -> Self {
        for _ in 0..count {
            let key = self.next_key();
            let mut sensor =
                BinarySensor::new(&format!("binary_{}", key), &self.name("Binary", key), key);
            sensor.state = Some(key % 2 == 0);
            self.push(sensor);
        }
        self
    }

    pub fn switch(mut self) -> Self {
        let key = self.next_key();
        let switch = Switch::new(&format!("switch_{}", key), &self.name("Switch", key), key);
        self.push(switch);
        self
    }

    pub fn service(mut self, name: &str) -> Self {
        let key = self.next_key();
        self.push(Service::new(name, key));
        self
    }

    pub fn event(mut self, event_types: &[&str]) -> Self {
        let key = self.next_key();
        let event = Event::new(
            &format!("event_{}", key),
            &self.name("Event", key),
            key,
            event_types,
        );
        self.push(event);
        self
    }

    pub fn update(mut self) -> Self {
        let key = self.next_key();
        let mut update = Update::new(&format!("update_{}", key), &self.name("Update", key), key);
        update.state = Some(UpdateInfo {
            current_version: "1.0.0".to_string(),
            latest_version: "1.1.0".to_string(),
            ..Default::default()
        });
        self.push(update);
        self
    }

    /// Marks the last added entity internal
    pub fn internal(mut self) -> Self {
        if let Some(&handle) = self.handles.last() {
            if let Some(entity) = self.entities.get_mut::<Sensor>(handle) {
                entity.common.internal = true;
            } else if let Some(entity) = self.entities.get_mut::<BinarySensor>(handle) {
                entity.common.internal = true;
            }
        }
        self
    }

    pub fn build(self) -> (Entities, Vec<EntityHandle>) {
        (self.entities, self.handles)
    }
}

impl Default for TestEntityBuilder {
    fn default() -> Self {
        Self::new()
    }
}
