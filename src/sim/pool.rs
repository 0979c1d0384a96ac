//! Slot-reuse container for short-lived entities
//!
//! `acquire` hands out the first slot whose entity no longer exists, and only
//! grows the pool when every slot is live. Spawning is O(n) in the pool length,
//! which stays small (tens of entities) for this game.

use std::ops::{Index, IndexMut};

/// Anything that can live in a [`Pool`]
pub trait Poolable {
    /// Whether the slot currently holds a live entity
    fn exists(&self) -> bool;
    /// Remove the entity immediately, skipping any death procedure
    fn force_kill(&mut self);
}

/// Pool of reusable entity slots. Handles are slot indices.
#[derive(Debug, Clone)]
pub struct Pool<T> {
    slots: Vec<T>,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<T: Poolable> Pool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the first dead slot, or append one built by `factory`.
    ///
    /// The caller is expected to `spawn` into the returned slot right away;
    /// until then it still reports `exists() == false`.
    pub fn acquire_with<F: FnOnce() -> T>(&mut self, factory: F) -> usize {
        if let Some(i) = self.slots.iter().position(|o| !o.exists()) {
            return i;
        }
        self.slots.push(factory());
        self.slots.len() - 1
    }

    /// `acquire_with` using the type's default constructor
    pub fn acquire(&mut self) -> usize
    where
        T: Default,
    {
        self.acquire_with(T::default)
    }

    /// Number of slots, live or dead. Never shrinks.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of live entities
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|o| o.exists()).count()
    }

    pub fn get(&self, slot: usize) -> Option<&T> {
        self.slots.get(slot)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut T> {
        self.slots.get_mut(slot)
    }

    /// All slots, including dead ones
    pub fn slots(&self) -> &[T] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [T] {
        &mut self.slots
    }

    /// Live entities only
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter(|o| o.exists())
    }

    /// Live entities only
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter(|o| o.exists())
    }

    /// Kill every entity but keep the slots for reuse
    pub fn flush(&mut self) {
        for o in &mut self.slots {
            o.force_kill();
        }
    }
}

impl<T> Index<usize> for Pool<T> {
    type Output = T;

    fn index(&self, slot: usize) -> &T {
        &self.slots[slot]
    }
}

impl<T> IndexMut<usize> for Pool<T> {
    fn index_mut(&mut self, slot: usize) -> &mut T {
        &mut self.slots[slot]
    }
}
