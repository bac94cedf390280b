//! Memory allocation APIs consumed by [`Indirect`].
//!
//! [`AllocRef`] is the allocator capability: raw allocation in terms of [`NonZeroLayout`],
//! in-place construction and destruction, an identity given by [`AllocRef::is_equal`], and the
//! policy constants that decide whether an allocator follows its value across assignments and
//! swaps.
//!
//! [`Indirect`]: crate::Indirect

mod abort;
mod layout;

pub use self::{
    abort::AbortAlloc,
    layout::{Layout, LayoutErr, NonZeroLayout},
};
use core::{
    fmt,
    ptr::{self, NonNull},
};
#[cfg(feature = "std")]
pub use std::alloc::System;

/// The `AllocErr` error indicates an allocation failure that may be due to resource exhaustion or
/// to something wrong when combining the given input arguments with this allocator.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AllocErr;

impl fmt::Display for AllocErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("memory allocation failed")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AllocErr {}

/// An allocator that [`Indirect`] can place its value in.
///
/// `AllocRef` is designed to be implemented on ZSTs, references, or smart pointers: the box stores
/// the allocator by value next to its pointer, and a cloned allocator must behave like the same
/// allocator.
///
/// # Policy
///
/// The associated constants mirror the propagation traits of allocator-aware containers:
///
/// * [`PROPAGATE_ON_COPY_ASSIGNMENT`]: `clone_from` adopts the source's allocator.
/// * [`PROPAGATE_ON_MOVE_ASSIGNMENT`]: `take_from` adopts the source's allocator.
/// * [`PROPAGATE_ON_SWAP`]: `swap` exchanges allocators along with the values.
/// * [`IS_ALWAYS_EQUAL`]: every two values of the type compare equal.
///
/// [`select_on_copy`] picks the allocator a `clone` of a box is placed in.
///
/// # Safety
///
/// * Memory blocks returned from `alloc` must stay valid until they are passed to `dealloc` of
///   an allocator comparing equal to the one that returned them.
/// * `a.is_equal(&b)` may only return `true` if memory allocated by `a` may be deallocated by
///   `b` and vice versa. Clones and values returned from `select_on_copy` are not required to
///   compare equal, but moving an allocator must not change what it compares equal to.
/// * If `IS_ALWAYS_EQUAL` is `true`, `is_equal` must always return `true`.
///
/// [`Indirect`]: crate::Indirect
/// [`PROPAGATE_ON_COPY_ASSIGNMENT`]: AllocRef::PROPAGATE_ON_COPY_ASSIGNMENT
/// [`PROPAGATE_ON_MOVE_ASSIGNMENT`]: AllocRef::PROPAGATE_ON_MOVE_ASSIGNMENT
/// [`PROPAGATE_ON_SWAP`]: AllocRef::PROPAGATE_ON_SWAP
/// [`IS_ALWAYS_EQUAL`]: AllocRef::IS_ALWAYS_EQUAL
/// [`select_on_copy`]: AllocRef::select_on_copy
pub unsafe trait AllocRef: Clone {
    /// The error returned when `alloc` fails. Allocators which never fail use [`Never`].
    ///
    /// [`Never`]: crate::Never
    type Error;

    const PROPAGATE_ON_COPY_ASSIGNMENT: bool = false;
    const PROPAGATE_ON_MOVE_ASSIGNMENT: bool = false;
    const PROPAGATE_ON_SWAP: bool = false;
    const IS_ALWAYS_EQUAL: bool = false;

    /// On success, returns a pointer to a block meeting the size and alignment of `layout`.
    ///
    /// # Errors
    ///
    /// Returning `Err` indicates that either memory is exhausted or `layout` does not meet the
    /// allocator's size or alignment constraints.
    fn alloc(&mut self, layout: NonZeroLayout) -> Result<NonNull<u8>, Self::Error>;

    /// Deallocates the memory referenced by `ptr`.
    ///
    /// # Safety
    ///
    /// * `ptr` must denote a block currently allocated by this allocator or one comparing equal to
    ///   it, and
    /// * `layout` must be the layout that block was allocated with.
    unsafe fn dealloc(&mut self, ptr: NonNull<u8>, layout: NonZeroLayout);

    /// Returns `true` if memory allocated by `self` may be deallocated by `other`.
    ///
    /// Defaults to [`IS_ALWAYS_EQUAL`](AllocRef::IS_ALWAYS_EQUAL): an allocator that does not
    /// override this is treated as distinct from every other instance unless its type says
    /// otherwise.
    #[inline]
    fn is_equal(&self, other: &Self) -> bool {
        let _ = other;
        Self::IS_ALWAYS_EQUAL
    }

    /// Moves `value` into the uninitialized slot at `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for writes and properly aligned for `T`.
    #[inline]
    unsafe fn construct<T>(&mut self, ptr: NonNull<T>, value: T) {
        unsafe { ptr.as_ptr().write(value) }
    }

    /// Runs the destructor of the value at `ptr` without releasing its memory.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a live value which is not used afterwards.
    #[inline]
    unsafe fn destroy<T: ?Sized>(&mut self, ptr: NonNull<T>) {
        unsafe { ptr::drop_in_place(ptr.as_ptr()) }
    }

    /// Returns the allocator a copy of a container using `self` is placed in.
    #[inline]
    fn select_on_copy(&self) -> Self {
        self.clone()
    }
}

/// The global memory allocator.
///
/// Forwards to the allocator registered with the `#[global_allocator]` attribute if there is one,
/// or the `std` crate's default.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Global;

unsafe impl AllocRef for Global {
    type Error = AllocErr;

    const IS_ALWAYS_EQUAL: bool = true;

    #[inline]
    fn alloc(&mut self, layout: NonZeroLayout) -> Result<NonNull<u8>, Self::Error> {
        // SAFETY: `layout` has a non-zero size
        let ptr = unsafe { liballoc::alloc::alloc(layout.into()) };
        NonNull::new(ptr).ok_or(AllocErr)
    }

    #[inline]
    unsafe fn dealloc(&mut self, ptr: NonNull<u8>, layout: NonZeroLayout) {
        unsafe { liballoc::alloc::dealloc(ptr.as_ptr(), layout.into()) }
    }
}

#[cfg(feature = "std")]
unsafe impl AllocRef for System {
    type Error = AllocErr;

    const IS_ALWAYS_EQUAL: bool = true;

    #[inline]
    fn alloc(&mut self, layout: NonZeroLayout) -> Result<NonNull<u8>, Self::Error> {
        use std::alloc::GlobalAlloc;

        // SAFETY: `layout` has a non-zero size
        let ptr = unsafe { GlobalAlloc::alloc(self, layout.into()) };
        NonNull::new(ptr).ok_or(AllocErr)
    }

    #[inline]
    unsafe fn dealloc(&mut self, ptr: NonNull<u8>, layout: NonZeroLayout) {
        use std::alloc::GlobalAlloc;

        unsafe { GlobalAlloc::dealloc(self, ptr.as_ptr(), layout.into()) }
    }
}
