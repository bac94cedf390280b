//! A drop guard used to keep postconditions when a step in the middle of an operation fails or
//! unwinds.

use core::{
    mem::ManuallyDrop,
    ops::{Deref, DerefMut},
};

/// Owns `value` and runs `on_drop` on it when dropped, unless [`Guard::defuse`] was called.
///
/// The compensating action is written once, next to the resource it protects, instead of on
/// every early return and unwind path.
pub(crate) struct Guard<T, F: FnOnce(&mut T)> {
    value: ManuallyDrop<T>,
    on_drop: ManuallyDrop<F>,
}

impl<T, F: FnOnce(&mut T)> Guard<T, F> {
    #[inline]
    pub(crate) fn new(value: T, on_drop: F) -> Self {
        Self {
            value: ManuallyDrop::new(value),
            on_drop: ManuallyDrop::new(on_drop),
        }
    }

    /// Disarms the guard and returns the protected value.
    #[inline]
    pub(crate) fn defuse(guard: Self) -> T {
        let mut guard = ManuallyDrop::new(guard);
        // SAFETY: `guard` is never dropped, so both fields are taken exactly once
        unsafe {
            ManuallyDrop::drop(&mut guard.on_drop);
            ManuallyDrop::take(&mut guard.value)
        }
    }
}

impl<T, F: FnOnce(&mut T)> Deref for Guard<T, F> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T, F: FnOnce(&mut T)> DerefMut for Guard<T, F> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T, F: FnOnce(&mut T)> Drop for Guard<T, F> {
    fn drop(&mut self) {
        // SAFETY: `drop` runs at most once and `defuse` forgets the guard
        unsafe {
            let on_drop = ManuallyDrop::take(&mut self.on_drop);
            on_drop(&mut self.value);
            ManuallyDrop::drop(&mut self.value);
        }
    }
}
