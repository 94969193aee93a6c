//! Generation-checked handles for loaded models.
//!
//! A [`Handle`] names a registry slot together with the slot's generation
//! at insertion time. Removing an entry bumps the generation, so stale
//! handles (double free, use after free) resolve to nothing instead of to
//! whatever model reuses the slot.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Opaque model handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    /// Pack into a non-zero integer for the C boundary.
    pub fn to_raw(self) -> u64 {
        (u64::from(self.generation) << 32) | (u64::from(self.index) + 1)
    }

    /// Inverse of [`to_raw`](Self::to_raw). `0` (the null handle) gives `None`.
    pub fn from_raw(raw: u64) -> Option<Self> {
        let low = raw as u32;
        if low == 0 {
            return None;
        }
        Some(Self {
            index: low - 1,
            generation: (raw >> 32) as u32,
        })
    }
}

struct Slot<T> {
    generation: u32,
    entry: Option<Arc<Mutex<T>>>,
}

/// Slot map of live models.
///
/// Entries are shared as `Arc<Mutex<T>>`: a caller that resolved a handle
/// keeps the model alive even if the handle is removed meanwhile, and the
/// model drops when the last holder lets go.
pub struct Registry<T> {
    inner: RwLock<Inner<T>>,
}

struct Inner<T> {
    slots: Vec<Slot<T>>,
    vacant: Vec<u32>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Inner {
                slots: Vec::new(),
                vacant: Vec::new(),
            }),
        }
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, value: T) -> Handle {
        let entry = Some(Arc::new(Mutex::new(value)));
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(index) = inner.vacant.pop() {
            let slot = &mut inner.slots[index as usize];
            slot.entry = entry;
            return Handle {
                index,
                generation: slot.generation,
            };
        }
        let index = inner.slots.len() as u32;
        inner.slots.push(Slot {
            generation: 0,
            entry,
        });
        Handle {
            index,
            generation: 0,
        }
    }

    pub fn get(&self, handle: Handle) -> Option<Arc<Mutex<T>>> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let slot = inner.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.entry.clone()
    }

    /// Detach the entry. Returns `None` for stale or unknown handles.
    pub fn remove(&self, handle: Handle) -> Option<Arc<Mutex<T>>> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let slot = inner.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        inner.vacant.push(handle.index);
        Some(entry)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.slots.len() - inner.vacant.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
