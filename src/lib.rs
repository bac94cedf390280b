//! An allocator-aware owning pointer with value semantics.
//!
//! [`Indirect<T, A>`] owns a single `T` placed in memory from an allocator `A`. It clones deeply,
//! compares by value, and follows the propagation rules of its allocator when values are copied,
//! moved or swapped between boxes.
//!
//! Allocation
//! ----------
//!
//! - Allocators implement [`AllocRef`]. Besides raw allocation in terms of [`NonZeroLayout`] the
//!   trait carries in-place construction and destruction hooks, an identity check used to decide
//!   whether memory may change hands, and policy constants for copy assignment, move assignment
//!   and swap.
//!
//! - [`AllocRef`] has an associated error type. Every operation which may allocate comes in a
//!   `try_*` form returning that error, and an infallible form available when the error is
//!   [`Never`]. [`AbortAlloc`] wraps another allocator and aborts on allocation failure, so
//!   `AbortAlloc<Global>` is the default allocator of [`Indirect`].
//!
//! - Zero-sized types are never passed to the allocator. [`NonZeroLayout`] makes that a property
//!   of the type signature rather than a convention.
//!
//! Valueless state
//! ---------------
//!
//! Moving out of a box with [`Indirect::take`] or [`Indirect::take_from`] leaves the source
//! *valueless*. A valueless box may be dropped, assigned to, or inspected with
//! [`Indirect::is_valueless`] and [`Indirect::get`]; dereferencing it panics.
//!
//! [`AllocRef`]: crate::alloc::AllocRef
//! [`NonZeroLayout`]: crate::alloc::NonZeroLayout
//! [`AbortAlloc`]: crate::alloc::AbortAlloc

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![doc(test(attr(
    deny(
        future_incompatible,
        nonstandard_style,
        rust_2018_compatibility,
        rust_2018_idioms,
        unused,
        macro_use_extern_crate,
        trivial_casts,
        trivial_numeric_casts,
        unused_import_braces,
        unused_lifetimes,
        unused_qualifications,
        variant_size_differences,
    ),
    allow(unused_extern_crates)
)))]
#![warn(
    future_incompatible,
    nonstandard_style,
    rust_2018_compatibility,
    rust_2018_idioms,
    unused,
    macro_use_extern_crate,
    single_use_lifetimes,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_op_in_unsafe_fn,
    unused_import_braces,
    unused_lifetimes,
    unused_qualifications
)]
#![allow(clippy::module_name_repetitions)]

pub mod alloc;
pub mod clone;
mod guard;
pub mod indirect;

extern crate alloc as liballoc;

pub use self::indirect::Indirect;

pub type Never = core::convert::Infallible;
