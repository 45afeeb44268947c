// Keyed store of every entity the client currently knows about.

use crate::domain::math::Vec3;
use crate::domain::ports::ProxyHandle;
use crate::domain::state::{
    EntityFields, EntityKind, LocalEntityState, Motion, RemoteEntityState,
};
use std::collections::HashMap;

/// One entity as the client sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    pub kind: EntityKind,
    pub state_num: u32,
    pub motion: Motion,
    pub proxy: Option<ProxyHandle>,
}

impl EntityRecord {
    /// Record for the local player; prediction starts from the spawn position.
    pub fn local(fields: &EntityFields) -> Self {
        Self {
            kind: fields.kind,
            state_num: fields.state_num,
            motion: Motion::Predicted(LocalEntityState {
                predicted: fields.position,
                authoritative: fields.position,
            }),
            proxy: None,
        }
    }

    /// Record for any other entity; rendering starts at the spawn position.
    pub fn remote(fields: &EntityFields) -> Self {
        Self {
            kind: fields.kind,
            state_num: fields.state_num,
            motion: Motion::Interpolated(RemoteEntityState::new(fields.position)),
            proxy: None,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self.motion, Motion::Predicted(_))
    }

    /// Position the presentation layer should draw.
    pub fn rendered_position(&self) -> Vec3 {
        match &self.motion {
            Motion::Predicted(local) => local.predicted,
            Motion::Interpolated(remote) => remote.rendered(),
        }
    }

    /// Latest position reported by the server.
    pub fn authoritative_position(&self) -> Vec3 {
        match &self.motion {
            Motion::Predicted(local) => local.authoritative,
            Motion::Interpolated(remote) => remote.authoritative(),
        }
    }

    pub fn local_state(&self) -> Option<&LocalEntityState> {
        match &self.motion {
            Motion::Predicted(local) => Some(local),
            Motion::Interpolated(_) => None,
        }
    }

    pub fn local_state_mut(&mut self) -> Option<&mut LocalEntityState> {
        match &mut self.motion {
            Motion::Predicted(local) => Some(local),
            Motion::Interpolated(_) => None,
        }
    }

    /// Players at or below zero health are considered dead by the client.
    pub fn is_dead(&self) -> bool {
        matches!(self.kind, EntityKind::Player { health } if health <= 0.0)
    }
}

#[derive(Debug, Default)]
pub struct EntityStore {
    entities: HashMap<String, EntityRecord>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record, returning the one it replaced.
    pub fn insert(&mut self, key: impl Into<String>, record: EntityRecord) -> Option<EntityRecord> {
        self.entities.insert(key.into(), record)
    }

    pub fn get(&self, key: &str) -> Option<&EntityRecord> {
        self.entities.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut EntityRecord> {
        self.entities.get_mut(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<EntityRecord> {
        self.entities.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entities.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntityRecord)> {
        self.entities.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut EntityRecord)> {
        self.entities.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    /// Keys of players the client considers dead.
    pub fn dead_keys(&self) -> Vec<String> {
        self.entities
            .iter()
            .filter(|(_, record)| record.is_dead())
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Empties the store, yielding every record so proxies can be released.
    pub fn drain(&mut self) -> impl Iterator<Item = (String, EntityRecord)> + '_ {
        self.entities.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(x: f32, health: f32) -> EntityFields {
        EntityFields::player(Vec3::new(x, 0.0, 0.0), 0, health)
    }

    #[test]
    fn when_inserting_an_existing_key_then_previous_record_is_returned() {
        let mut store = EntityStore::new();
        store.insert("a", EntityRecord::remote(&player(1.0, 100.0)));

        let previous = store.insert("a", EntityRecord::remote(&player(2.0, 100.0)));

        assert_eq!(
            previous.map(|r| r.authoritative_position()),
            Some(Vec3::new(1.0, 0.0, 0.0))
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn local_and_remote_records_start_rendered_at_spawn() {
        let fields = player(3.0, 100.0);
        let local = EntityRecord::local(&fields);
        let remote = EntityRecord::remote(&fields);

        assert!(local.is_local());
        assert!(!remote.is_local());
        assert_eq!(local.rendered_position(), fields.position);
        assert_eq!(remote.rendered_position(), fields.position);
    }

    #[test]
    fn dead_keys_only_lists_players_without_health() {
        let mut store = EntityStore::new();
        store.insert("alive", EntityRecord::remote(&player(0.0, 10.0)));
        store.insert("dead", EntityRecord::remote(&player(0.0, 0.0)));
        store.insert(
            "shot",
            EntityRecord::remote(&EntityFields::projectile(Vec3::ZERO, 0.5)),
        );

        assert_eq!(store.dead_keys(), vec!["dead".to_string()]);
    }

    #[test]
    fn drain_empties_the_store() {
        let mut store = EntityStore::new();
        store.insert("a", EntityRecord::remote(&player(0.0, 1.0)));
        store.insert("b", EntityRecord::remote(&player(0.0, 1.0)));

        let drained: Vec<_> = store.drain().collect();

        assert_eq!(drained.len(), 2);
        assert!(store.is_empty());
    }
}
