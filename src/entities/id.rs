//! Opaque entity identifiers and the process-wide generator.
//!
//! A handle carries its object kind, an optional entity-type tag and a
//! monotonically increasing salt, so two handles generated in the same
//! process never collide. Identifiers may be *reserved* for entities
//! that are not constructed yet (pass 1 of two-pass reading) and are
//! released when the owning model is dropped.
//!
//! The generator is the only process-wide mutable state in the crate;
//! multiple file sessions may generate, reserve and release handles
//! concurrently.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

/// What an identifier addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// A whole file session (the resolved model itself)
    File,
    /// One entity within a file
    Entity,
}

/// Opaque, process-unique handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId {
    kind: ObjectKind,
    entity_type: Option<i32>,
    salt: u64,
}

impl EntityId {
    /// Object kind of the handle
    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Entity type tag, when one was recorded at generation time
    pub fn entity_type(&self) -> Option<i32> {
        self.entity_type
    }

    /// The unique salt
    pub fn salt(&self) -> u64 {
        self.salt
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.kind, self.entity_type) {
            (ObjectKind::File, _) => write!(f, "file#{}", self.salt),
            (ObjectKind::Entity, Some(ty)) => write!(f, "entity({})#{}", ty, self.salt),
            (ObjectKind::Entity, None) => write!(f, "entity#{}", self.salt),
        }
    }
}

#[derive(Default)]
struct GeneratorState {
    next_salt: u64,
    /// Reservations keyed by (owning file salt, DE sequence number)
    reserved: HashMap<(u64, u32), EntityId>,
}

static GENERATOR: Lazy<Mutex<GeneratorState>> = Lazy::new(|| Mutex::new(GeneratorState::default()));

/// The process-wide identifier generator
pub struct IdGenerator;

impl IdGenerator {
    /// Generate a fresh identifier
    pub fn generate(kind: ObjectKind, entity_type: Option<i32>) -> EntityId {
        let mut state = GENERATOR.lock();
        state.next_salt += 1;
        EntityId {
            kind,
            entity_type,
            salt: state.next_salt,
        }
    }

    /// Reserve an identifier for a not-yet-constructed entity, keyed by
    /// the owning file and the entity's DE sequence number. Reserving
    /// the same key again returns the same identifier.
    pub fn reserve(file: EntityId, entity_type: Option<i32>, de_pointer: u32) -> EntityId {
        let mut state = GENERATOR.lock();
        if let Some(existing) = state.reserved.get(&(file.salt, de_pointer)) {
            return *existing;
        }
        state.next_salt += 1;
        let id = EntityId {
            kind: ObjectKind::Entity,
            entity_type,
            salt: state.next_salt,
        };
        state.reserved.insert((file.salt, de_pointer), id);
        id
    }

    /// Take the reservation for (file, de_pointer), if any
    pub fn claim(file: EntityId, de_pointer: u32) -> Option<EntityId> {
        GENERATOR.lock().reserved.remove(&(file.salt, de_pointer))
    }

    /// True while (file, de_pointer) has an outstanding reservation
    pub fn is_reserved(file: EntityId, de_pointer: u32) -> bool {
        GENERATOR.lock().reserved.contains_key(&(file.salt, de_pointer))
    }

    /// Drop every outstanding reservation of a file session. Called at
    /// end of read and when a resolved model is dropped.
    pub fn release_file(file: EntityId) {
        let mut state = GENERATOR.lock();
        state.reserved.retain(|(owner, _), _| *owner != file.salt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = IdGenerator::generate(ObjectKind::Entity, Some(100));
        let b = IdGenerator::generate(ObjectKind::Entity, Some(100));
        assert_ne!(a, b);
        assert_eq!(a.entity_type(), Some(100));
        assert_eq!(a.kind(), ObjectKind::Entity);
    }

    #[test]
    fn test_reserve_is_stable_per_key() {
        let file = IdGenerator::generate(ObjectKind::File, None);
        let first = IdGenerator::reserve(file, Some(102), 7);
        let again = IdGenerator::reserve(file, Some(102), 7);
        assert_eq!(first, again);

        let other_file = IdGenerator::generate(ObjectKind::File, None);
        let other = IdGenerator::reserve(other_file, Some(102), 7);
        assert_ne!(first, other);

        IdGenerator::release_file(file);
        IdGenerator::release_file(other_file);
    }

    #[test]
    fn test_claim_and_release() {
        let file = IdGenerator::generate(ObjectKind::File, None);
        let id = IdGenerator::reserve(file, Some(100), 1);
        assert!(IdGenerator::is_reserved(file, 1));
        assert_eq!(IdGenerator::claim(file, 1), Some(id));
        assert!(!IdGenerator::is_reserved(file, 1));
        assert_eq!(IdGenerator::claim(file, 1), None);

        IdGenerator::reserve(file, Some(100), 3);
        IdGenerator::reserve(file, Some(100), 5);
        IdGenerator::release_file(file);
        assert!(!IdGenerator::is_reserved(file, 3));
        assert!(!IdGenerator::is_reserved(file, 5));
    }

    #[test]
    fn test_generator_is_thread_safe() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                std::thread::spawn(|| {
                    (0..100)
                        .map(|_| IdGenerator::generate(ObjectKind::Entity, None).salt())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let mut all: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 800);
    }
}
