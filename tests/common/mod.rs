//! Shared fixtures for integration tests: a counting allocator with a selectable propagation
//! policy, and value types that panic on demand.

#![allow(dead_code)]

use alloc_indirect::alloc::{AllocErr, AllocRef, Global, NonZeroLayout};
use std::{cell::Cell, fmt, marker::PhantomData, ptr, ptr::NonNull, rc::Rc};

/// Counters shared by every clone of a [`Counting`] allocator.
#[derive(Debug, Default)]
pub struct Stats {
    allocs: Cell<usize>,
    deallocs: Cell<usize>,
    constructs: Cell<usize>,
    destroys: Cell<usize>,
    failing: Cell<bool>,
}

impl Stats {
    pub fn allocs(&self) -> usize {
        self.allocs.get()
    }

    pub fn deallocs(&self) -> usize {
        self.deallocs.get()
    }

    pub fn constructs(&self) -> usize {
        self.constructs.get()
    }

    pub fn destroys(&self) -> usize {
        self.destroys.get()
    }

    /// Allocations not yet returned.
    pub fn live(&self) -> usize {
        self.allocs() - self.deallocs()
    }

    /// Makes every following allocation fail until reset.
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }
}

fn bump(counter: &Cell<usize>) {
    counter.set(counter.get() + 1);
}

/// Propagation flags of a [`Counting`] allocator.
pub trait Policy {
    const COPY: bool;
    const MOVE: bool;
    const SWAP: bool;
    /// Clones of a box get a brand-new allocator instead of sharing the source's.
    const FRESH_ON_COPY: bool = false;
}

pub struct NoPropagate;
pub struct Propagate;
pub struct FreshOnCopy;

impl Policy for NoPropagate {
    const COPY: bool = false;
    const MOVE: bool = false;
    const SWAP: bool = false;
}

impl Policy for Propagate {
    const COPY: bool = true;
    const MOVE: bool = true;
    const SWAP: bool = true;
}

impl Policy for FreshOnCopy {
    const COPY: bool = false;
    const MOVE: bool = false;
    const SWAP: bool = false;
    const FRESH_ON_COPY: bool = true;
}

/// An allocator forwarding to [`Global`] that counts every call.
///
/// Two `Counting` allocators compare equal exactly when they share their [`Stats`], i.e. when one
/// is a clone of the other.
pub struct Counting<P = NoPropagate> {
    stats: Rc<Stats>,
    marker: PhantomData<P>,
}

impl<P> Counting<P> {
    pub fn new() -> Self {
        Self {
            stats: Rc::default(),
            marker: PhantomData,
        }
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }
}

impl<P> Clone for Counting<P> {
    fn clone(&self) -> Self {
        Self {
            stats: Rc::clone(&self.stats),
            marker: PhantomData,
        }
    }
}

impl<P> fmt::Debug for Counting<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Counting")
            .field("id", &Rc::as_ptr(&self.stats))
            .finish()
    }
}

unsafe impl<P: Policy> AllocRef for Counting<P> {
    type Error = AllocErr;

    const PROPAGATE_ON_COPY_ASSIGNMENT: bool = P::COPY;
    const PROPAGATE_ON_MOVE_ASSIGNMENT: bool = P::MOVE;
    const PROPAGATE_ON_SWAP: bool = P::SWAP;

    fn alloc(&mut self, layout: NonZeroLayout) -> Result<NonNull<u8>, Self::Error> {
        if self.stats.failing.get() {
            return Err(AllocErr);
        }
        let ptr = Global.alloc(layout)?;
        bump(&self.stats.allocs);
        Ok(ptr)
    }

    unsafe fn dealloc(&mut self, ptr: NonNull<u8>, layout: NonZeroLayout) {
        bump(&self.stats.deallocs);
        unsafe { Global.dealloc(ptr, layout) }
    }

    fn is_equal(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.stats, &other.stats)
    }

    unsafe fn construct<T>(&mut self, ptr: NonNull<T>, value: T) {
        bump(&self.stats.constructs);
        unsafe { ptr.as_ptr().write(value) }
    }

    unsafe fn destroy<T: ?Sized>(&mut self, ptr: NonNull<T>) {
        bump(&self.stats.destroys);
        unsafe { ptr::drop_in_place(ptr.as_ptr()) }
    }

    fn select_on_copy(&self) -> Self {
        if P::FRESH_ON_COPY {
            Self::new()
        } else {
            self.clone()
        }
    }
}

thread_local! {
    static PANIC_ON_CLONE: Cell<bool> = const { Cell::new(false) };
}

/// A value whose `clone` panics while [`Fragile::arm`] is in effect.
#[derive(Debug, PartialEq, Eq)]
pub struct Fragile(pub u32);

impl Fragile {
    /// Runs `f` with cloning armed to panic.
    pub fn arm<R>(f: impl FnOnce() -> R) -> R {
        struct Disarm;
        impl Drop for Disarm {
            fn drop(&mut self) {
                PANIC_ON_CLONE.with(|armed| armed.set(false));
            }
        }

        PANIC_ON_CLONE.with(|armed| armed.set(true));
        let _disarm = Disarm;
        f()
    }
}

impl Clone for Fragile {
    fn clone(&self) -> Self {
        if PANIC_ON_CLONE.with(Cell::get) {
            panic!("clone of Fragile({}) failed", self.0);
        }
        Self(self.0)
    }
}

/// A value whose destructor panics.
#[derive(Debug)]
pub struct PanicOnDrop;

impl Drop for PanicOnDrop {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            panic!("PanicOnDrop dropped");
        }
    }
}

/// A value counting its drops in a shared cell.
#[derive(Debug, Clone)]
pub struct DropCount(pub Rc<Cell<usize>>);

impl Drop for DropCount {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}
