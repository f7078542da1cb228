//! Generational arena owning every native instance the host can see.

use std::any::Any;
use std::fmt;

use crate::error::{BindingError, ConversionError};
use crate::{NativeType, SharingPolicy, TypeHash};

/// Handle to a heap-allocated native instance.
///
/// This is the only thing the host ever holds for an object. The
/// generation makes every use after reclamation detectable, including after
/// the slot has been reused for a new instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectHandle {
    /// Index into ObjectHeap.slots
    pub index: u32,
    /// Generation for use-after-free detection
    pub generation: u32,
    /// Exposed type of the instance, for registry dispatch
    pub type_hash: TypeHash,
}

impl ObjectHandle {
    pub fn new(index: u32, generation: u32, type_hash: TypeHash) -> Self {
        Self {
            index,
            generation,
            type_hash,
        }
    }
}

/// Lifecycle of the instance behind a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// Live and untouched since construction
    Constructed,
    /// Live and changed by a mutating method or a field write
    Mutated,
    /// Dropped; every access through the handle fails
    Reclaimed,
}

/// Heap storage for native instances with generational indices.
///
/// Each slot owns exactly one instance plus its ownership tag. When the last
/// reference is released the instance is dropped, the generation is bumped
/// and the slot goes on the free list.
pub struct ObjectHeap {
    slots: Vec<HeapSlot>,
    free_list: Vec<u32>,
    live: usize,
}

struct HeapSlot {
    generation: u32,
    value: Option<Box<dyn Any + Send + Sync>>,
    ref_count: u32,
    type_name: &'static str,
    sharing: SharingPolicy,
    state: HandleState,
}

impl ObjectHeap {
    /// Create a new empty object heap.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            live: 0,
        }
    }

    /// Move an instance into the heap and return its first handle.
    ///
    /// Fails only when every `u32` index is taken by a live or retired slot.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn allocate<T: NativeType>(&mut self, value: T) -> Result<ObjectHandle, ConversionError> {
        let type_hash = T::type_hash();
        let boxed: Box<dyn Any + Send + Sync> = Box::new(value);

        let slot = HeapSlot {
            generation: 0,
            value: Some(boxed),
            ref_count: 1,
            type_name: T::type_name(),
            sharing: T::sharing(),
            state: HandleState::Constructed,
        };

        let handle = if let Some(index) = self.free_list.pop() {
            let reused = &mut self.slots[index as usize];
            let generation = reused.generation;
            *reused = HeapSlot { generation, ..slot };
            ObjectHandle::new(index, generation, type_hash)
        } else {
            let index = u32::try_from(self.slots.len()).map_err(|_| ConversionError::HeapExhausted)?;
            self.slots.push(slot);
            ObjectHandle::new(index, 0, type_hash)
        };

        self.live += 1;
        log::trace!("allocated {} at #{}.{}", T::type_name(), handle.index, handle.generation);
        Ok(handle)
    }

    fn live_slot(&self, handle: ObjectHandle) -> Result<&HeapSlot, ConversionError> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.value.is_some())
            .ok_or(ConversionError::StaleHandle {
                index: handle.index,
                generation: handle.generation,
            })
    }

    fn live_slot_mut(&mut self, handle: ObjectHandle) -> Result<&mut HeapSlot, ConversionError> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.value.is_some())
            .ok_or(ConversionError::StaleHandle {
                index: handle.index,
                generation: handle.generation,
            })
    }

    /// Check that the handle still refers to a live instance.
    pub fn validate(&self, handle: ObjectHandle) -> Result<(), ConversionError> {
        self.live_slot(handle).map(|_| ())
    }

    /// Borrow an instance immutably.
    pub fn get<T: NativeType>(&self, handle: ObjectHandle) -> Result<&T, ConversionError> {
        let slot = self.live_slot(handle)?;
        slot.value
            .as_ref()
            .and_then(|value| value.downcast_ref::<T>())
            .ok_or(ConversionError::TypeMismatch {
                expected: T::type_name(),
                actual: slot.type_name,
            })
    }

    /// Borrow an instance mutably, moving its handle to `Mutated`.
    pub fn get_mut<T: NativeType>(&mut self, handle: ObjectHandle) -> Result<&mut T, ConversionError> {
        let slot = self.live_slot_mut(handle)?;
        let actual = slot.type_name;
        match slot.value.as_mut().and_then(|value| value.downcast_mut::<T>()) {
            Some(value) => {
                slot.state = HandleState::Mutated;
                Ok(value)
            }
            None => Err(ConversionError::TypeMismatch {
                expected: T::type_name(),
                actual,
            }),
        }
    }

    /// Exposed type name of a live instance.
    pub fn type_name(&self, handle: ObjectHandle) -> Result<&'static str, ConversionError> {
        self.live_slot(handle).map(|slot| slot.type_name)
    }

    pub fn state(&self, handle: ObjectHandle) -> HandleState {
        self.live_slot(handle)
            .map_or(HandleState::Reclaimed, |slot| slot.state)
    }

    /// Add a holder to a shared instance.
    ///
    /// Returns the new reference count. Exclusive instances refuse.
    pub fn add_ref(&mut self, handle: ObjectHandle) -> Result<u32, BindingError> {
        let slot = self.live_slot_mut(handle).map_err(|_| BindingError::UseAfterFree {
            index: handle.index,
            generation: handle.generation,
        })?;
        if slot.sharing == SharingPolicy::Exclusive {
            return Err(BindingError::SharingViolation {
                type_name: slot.type_name.to_string(),
                operation: "share",
            });
        }
        slot.ref_count = slot.ref_count.saturating_add(1);
        Ok(slot.ref_count)
    }

    /// Drop one holder; the instance is reclaimed when none remain.
    ///
    /// Returns true if the instance was reclaimed.
    pub fn release(&mut self, handle: ObjectHandle) -> Result<bool, BindingError> {
        let slot = self.live_slot_mut(handle).map_err(|_| BindingError::UseAfterFree {
            index: handle.index,
            generation: handle.generation,
        })?;
        slot.ref_count = slot.ref_count.saturating_sub(1);
        if slot.ref_count > 0 {
            return Ok(false);
        }

        slot.value = None;
        slot.state = HandleState::Reclaimed;
        log::trace!("reclaimed {} at #{}.{}", slot.type_name, handle.index, handle.generation);

        // A slot whose generation cannot advance is retired so no old handle
        // can ever match a later instance.
        let next = slot.generation.checked_add(1);
        if let Some(next) = next {
            slot.generation = next;
            self.free_list.push(handle.index);
        } else {
            log::debug!("retired slot #{} after its final generation", handle.index);
        }
        self.live -= 1;
        Ok(true)
    }

    /// Get the reference count for a live instance.
    pub fn ref_count(&self, handle: ObjectHandle) -> Option<u32> {
        self.live_slot(handle).ok().map(|slot| slot.ref_count)
    }

    /// Number of instances currently alive.
    pub fn live_count(&self) -> usize {
        self.live
    }
}

impl Default for ObjectHeap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ObjectHeap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectHeap")
            .field("slot_count", &self.slots.len())
            .field("free_count", &self.free_list.len())
            .field("live", &self.live)
            .finish()
    }
}
