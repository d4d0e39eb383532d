//! Sources of fresh `UNIQUE_ID` values.

use std::fmt;

use dyn_clone::DynClone;
use uuid::Uuid;

use crate::value::UniqueId;

/// A source of fresh unique identifiers for new instances.
///
/// The only contract is that successive calls yield values distinct from all
/// previously issued ids and from [`UniqueId::NULL`].
pub trait IdGenerator: DynClone + fmt::Debug {
    fn next_id(&mut self) -> UniqueId;
}

dyn_clone::clone_trait_object!(IdGenerator);

/// The default generator: random version 4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&mut self) -> UniqueId {
        loop {
            let id = UniqueId::from(Uuid::new_v4());
            if !id.is_null() {
                return id;
            }
        }
    }
}

/// A deterministic generator counting up from a starting point, for tests
/// and reproducible loads.
#[derive(Debug, Clone)]
pub struct SequentialGenerator {
    next: u128,
}

impl SequentialGenerator {
    #[must_use]
    pub fn starting_at(next: u128) -> Self {
        Self { next }
    }
}

impl Default for SequentialGenerator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdGenerator for SequentialGenerator {
    fn next_id(&mut self) -> UniqueId {
        if self.next == 0 {
            self.next = 1;
        }
        let id = UniqueId::from(self.next);
        self.next += 1;
        id
    }
}
