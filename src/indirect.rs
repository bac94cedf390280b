//! An owning, allocator-aware pointer with value semantics.
//!
//! [`Indirect<T, A>`] owns exactly one `T` placed in memory obtained from the allocator `A`.
//! Unlike a plain box it behaves like the value it holds: cloning clones the value into fresh
//! storage, comparisons compare values, and the allocator it was created with decides where every
//! later copy or relocation lives.
//!
//! # Examples
//!
//! Creating a recursive data structure:
//!
//! ```
//! use alloc_indirect::Indirect;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum List {
//!     Cons(i32, Indirect<List>),
//!     Nil,
//! }
//!
//! let list = List::Cons(1, Indirect::new(List::Cons(2, Indirect::new(List::Nil))));
//! let copy = list.clone();
//! assert_eq!(list, copy);
//! ```
//!
//! # Valueless state
//!
//! [`Indirect::take`] and [`Indirect::take_from`] move the owned value out of a box without
//! consuming the box itself. The source is left *valueless*: it owns nothing, holds no memory and
//! compares equal only to other valueless boxes.
//!
//! ```
//! use alloc_indirect::Indirect;
//!
//! let mut x = Indirect::new(5);
//! let y = x.take();
//! assert!(x.is_valueless());
//! assert_eq!(*y, 5);
//! ```
//!
//! # Allocator propagation
//!
//! Operations between two boxes consult [`AllocRef::is_equal`] and the propagation constants of
//! `A`. Memory is only handed over between boxes whose allocators compare equal; otherwise the
//! value is cloned or moved into new storage from the allocator that ends up owning it.

use crate::{
    alloc::{AbortAlloc, AllocRef, Global, NonZeroLayout},
    clone::CloneIn,
    guard::Guard,
    Never,
};
use core::{
    any,
    cell::Cell,
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
    mem::{self, ManuallyDrop},
    ops::{Deref, DerefMut},
    ptr::{self, NonNull},
};

/// An owning pointer to a `T` allocated in `A`, with value semantics.
///
/// See the [module-level documentation](index.html) for more.
pub struct Indirect<T, A: AllocRef = AbortAlloc<Global>> {
    ptr: Option<NonNull<T>>,
    alloc: A,
    marker: PhantomData<T>,
}

unsafe impl<T: Send, A: AllocRef + Send> Send for Indirect<T, A> {}
unsafe impl<T: Sync, A: AllocRef + Sync> Sync for Indirect<T, A> {}

impl<T> Indirect<T> {
    /// Allocates memory on the heap and then places `value` into it.
    ///
    /// # Example
    ///
    /// ```
    /// use alloc_indirect::Indirect;
    ///
    /// let five = Indirect::new(5);
    /// assert_eq!(*five, 5);
    /// ```
    #[inline]
    #[must_use]
    pub fn new(value: T) -> Self {
        Self::new_in(value, AbortAlloc(Global))
    }

    /// Allocates memory on the heap and then constructs the value returned by `f` in it.
    ///
    /// # Example
    ///
    /// ```
    /// use alloc_indirect::Indirect;
    ///
    /// let v = Indirect::new_with(|| vec![1, 2, 3]);
    /// assert_eq!(*v, [1, 2, 3]);
    /// ```
    #[inline]
    pub fn new_with<F: FnOnce() -> T>(f: F) -> Self {
        Self::new_with_in(f, AbortAlloc(Global))
    }
}

impl<T, A: AllocRef> Indirect<T, A> {
    /// Allocates memory with the given allocator and then places `value` into it.
    #[inline]
    pub fn new_in(value: T, a: A) -> Self
    where
        A: AllocRef<Error = Never>,
    {
        let Ok(b) = Self::try_new_in(value, a);
        b
    }

    /// Tries to allocate memory with the given allocator and then places `value` into it.
    ///
    /// # Example
    ///
    /// ```
    /// # #![allow(unused_qualifications)] // rustdoc's `?` wrapper uses `core::result::Result`
    /// use alloc_indirect::{alloc::Global, Indirect};
    ///
    /// let five = Indirect::try_new_in(5, Global)?;
    /// assert_eq!(*five, 5);
    /// # Ok::<_, alloc_indirect::alloc::AllocErr>(())
    /// ```
    #[inline]
    pub fn try_new_in(value: T, a: A) -> Result<Self, A::Error> {
        Self::try_new_with_in(|| value, a)
    }

    /// Allocates memory with the given allocator and constructs the value returned by `f` in it.
    #[inline]
    pub fn new_with_in<F: FnOnce() -> T>(f: F, a: A) -> Self
    where
        A: AllocRef<Error = Never>,
    {
        let Ok(b) = Self::try_new_with_in(f, a);
        b
    }

    /// Tries to allocate memory with the given allocator and constructs the value returned by `f`
    /// in it.
    ///
    /// `f` only runs once the memory is available. If it panics, the memory is returned to `a`
    /// before the panic continues.
    pub fn try_new_with_in<F: FnOnce() -> T>(f: F, mut a: A) -> Result<Self, A::Error> {
        let ptr = allocate_with(&mut a, f)?;
        Ok(Self::engaged(ptr, a))
    }

    /// Allocates memory with the given allocator and places `T::default()` into it.
    #[inline]
    pub fn default_in(a: A) -> Self
    where
        T: Default,
        A: AllocRef<Error = Never>,
    {
        let Ok(b) = Self::try_default_in(a);
        b
    }

    #[inline]
    pub fn try_default_in(a: A) -> Result<Self, A::Error>
    where
        T: Default,
    {
        Self::try_new_with_in(T::default, a)
    }

    /// Constructs a box from a pointer and the allocator it was allocated with.
    ///
    /// `None` creates a valueless box.
    ///
    /// # Safety
    ///
    /// A `Some` pointer must point to an initialized `T` allocated by `alloc` (or an allocator
    /// comparing equal to it) with the layout of `T`, and must not be owned by anything else. For
    /// a zero-sized `T` any non-null, well-aligned pointer will do.
    #[inline]
    pub unsafe fn from_raw_parts_in(ptr: Option<NonNull<T>>, alloc: A) -> Self {
        Self {
            ptr,
            alloc,
            marker: PhantomData,
        }
    }

    /// Consumes the box, returning the owned pointer and the allocator.
    ///
    /// After calling this function the caller is responsible for the value and its memory. The
    /// easiest way to release both is to convert them back with [`Indirect::from_raw_parts_in`].
    ///
    /// Note: this is an associated function, which means that you have to call it as
    /// `Indirect::into_raw_parts(b)` instead of `b.into_raw_parts()`. This is so that there is no
    /// conflict with a method on the inner type.
    #[inline]
    pub fn into_raw_parts(b: Self) -> (Option<NonNull<T>>, A) {
        let b = ManuallyDrop::new(b);
        // SAFETY: `b` is never dropped, so the allocator is read exactly once
        (b.ptr, unsafe { ptr::read(&b.alloc) })
    }

    /// Moves the owned value out of the box and releases its memory.
    ///
    /// # Panics
    ///
    /// Panics if `b` is valueless.
    pub fn into_inner(b: Self) -> T {
        let (ptr, mut alloc) = Self::into_raw_parts(b);
        let Some(ptr) = ptr else { valueless() };
        // SAFETY: the box owned the value, and it is read exactly once before its memory goes
        unsafe {
            let value = ptr.as_ptr().read();
            release(&mut alloc, ptr);
            value
        }
    }

    /// Returns `true` if the box owns no value.
    #[inline]
    pub fn is_valueless(&self) -> bool {
        self.ptr.is_none()
    }

    /// Returns a reference to the allocator backing this box.
    #[inline]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Returns a reference to the owned value, or `None` if the box is valueless.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        // SAFETY: an engaged pointer refers to a live `T` owned by `self`
        self.ptr.map(|ptr| unsafe { &*ptr.as_ptr() })
    }

    /// Returns a mutable reference to the owned value, or `None` if the box is valueless.
    #[inline]
    pub fn get_mut(&mut self) -> Option<&mut T> {
        // SAFETY: an engaged pointer refers to a live `T` owned by `self`
        self.ptr.map(|ptr| unsafe { &mut *ptr.as_ptr() })
    }

    /// Returns a raw pointer to the owned value.
    ///
    /// # Panics
    ///
    /// Panics if the box is valueless.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        match self.ptr {
            Some(ptr) => ptr.as_ptr(),
            None => valueless(),
        }
    }

    /// Returns a raw mutable pointer to the owned value.
    ///
    /// # Panics
    ///
    /// Panics if the box is valueless.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        match self.ptr {
            Some(ptr) => ptr.as_ptr(),
            None => valueless(),
        }
    }

    /// Moves the value into a new box sharing a clone of this box's allocator, leaving `self`
    /// valueless.
    ///
    /// No memory is allocated and the value itself is not touched. Taking from a valueless box
    /// yields another valueless box.
    #[inline]
    pub fn take(&mut self) -> Self {
        let alloc = self.alloc.clone();
        Self {
            ptr: self.ptr.take(),
            alloc,
            marker: PhantomData,
        }
    }

    /// Moves the value into a new box using the allocator `a`, leaving `self` valueless.
    #[inline]
    pub fn take_in(&mut self, a: A) -> Self
    where
        A: AllocRef<Error = Never>,
    {
        let Ok(b) = self.try_take_in(a);
        b
    }

    /// Tries to move the value into a new box using the allocator `a`.
    ///
    /// If `a` compares equal to the allocator of `self`, ownership of the existing memory is
    /// handed over. Otherwise the value is moved into memory allocated from `a`.
    ///
    /// `self` is valueless afterwards on every path, including failure: if allocating from `a`
    /// fails, the value is dropped and its memory is released before the error is returned.
    ///
    /// # Example
    ///
    /// ```
    /// # #![allow(unused_qualifications)] // rustdoc's `?` wrapper uses `core::result::Result`
    /// use alloc_indirect::{alloc::Global, Indirect};
    ///
    /// let mut a = Indirect::try_new_in(String::from("moved"), Global)?;
    /// let b = a.try_take_in(Global)?;
    /// assert!(a.is_valueless());
    /// assert_eq!(*b, "moved");
    /// # Ok::<_, alloc_indirect::alloc::AllocErr>(())
    /// ```
    pub fn try_take_in(&mut self, mut a: A) -> Result<Self, A::Error> {
        if a.is_equal(&self.alloc) {
            return Ok(Self {
                ptr: self.ptr.take(),
                alloc: a,
                marker: PhantomData,
            });
        }
        let Some(src) = self.ptr.take() else {
            return Ok(Self::valueless_in(a));
        };

        tracing::trace!(ty = any::type_name::<T>(), "allocators differ, relocating value");
        let moved = Cell::new(false);
        let source = Guard::new(&mut self.alloc, |alloc| {
            // SAFETY: `src` was owned by `self` and is no longer reachable from it
            unsafe {
                if moved.get() {
                    release(&mut **alloc, src);
                } else {
                    destroy_and_release(&mut **alloc, src);
                }
            }
        });
        let ptr = allocate_with(&mut a, || {
            moved.set(true);
            // SAFETY: `src` holds a live value that is read exactly once
            unsafe { src.as_ptr().read() }
        });
        drop(source);
        Ok(Self::engaged(ptr?, a))
    }

    /// Replaces the value of `self` with the value of `other`, leaving `other` valueless.
    #[inline]
    pub fn take_from(&mut self, other: &mut Self)
    where
        A: AllocRef<Error = Never>,
    {
        let Ok(()) = self.try_take_from(other);
    }

    /// Tries to replace the value of `self` with the value of `other`, leaving `other` valueless.
    ///
    /// * If `other` is valueless, `self` drops its value and becomes valueless.
    /// * If both allocators compare equal, the memory of `other` is handed over and the previous
    ///   value of `self` is dropped. Nothing is allocated.
    /// * If [`AllocRef::PROPAGATE_ON_MOVE_ASSIGNMENT`] is set, `self` adopts a clone of `other`'s
    ///   allocator together with its memory. Nothing is allocated.
    /// * Otherwise the value is moved into memory allocated from `self`'s allocator.
    ///
    /// # Errors
    ///
    /// Only the last case allocates, so only unequal allocators that do not propagate can fail.
    /// If the allocation fails, neither box is modified.
    pub fn try_take_from(&mut self, other: &mut Self) -> Result<(), A::Error> {
        let propagate = A::PROPAGATE_ON_MOVE_ASSIGNMENT;
        let Some(src) = other.ptr else {
            self.install(None, propagate.then(|| other.alloc.clone()));
            return Ok(());
        };
        if self.alloc.is_equal(&other.alloc) {
            mem::swap(&mut self.ptr, &mut other.ptr);
            other.reset();
            return Ok(());
        }
        if propagate {
            let alloc = other.alloc.clone();
            self.install(other.ptr.take(), Some(alloc));
            return Ok(());
        }

        tracing::trace!(
            ty = any::type_name::<T>(),
            "allocators differ, relocating value for move assignment"
        );
        let moved = Cell::new(false);
        let source = Guard::new(&mut *other, |other| {
            if moved.get() {
                other.ptr = None;
                // SAFETY: the value was moved out, only its memory is left
                unsafe { release(&mut other.alloc, src) }
            }
        });
        let ptr = allocate_with(&mut self.alloc, || {
            moved.set(true);
            // SAFETY: `src` holds a live value that is read exactly once
            unsafe { src.as_ptr().read() }
        });
        drop(source);
        self.install(Some(ptr?), None);
        Ok(())
    }

    /// Tries to replace the value of `self` with a clone of the value of `other`.
    ///
    /// * If `other` is valueless, `self` drops its value and becomes valueless.
    /// * If both allocators compare equal and `self` is engaged, the value is assigned in place
    ///   with [`Clone::clone_from`]. Nothing is allocated.
    /// * Otherwise the clone is placed in memory from `other`'s allocator if
    ///   [`AllocRef::PROPAGATE_ON_COPY_ASSIGNMENT`] is set, or from `self`'s allocator if not.
    ///   The clone is fully constructed before the old value is dropped.
    ///
    /// With `PROPAGATE_ON_COPY_ASSIGNMENT`, `self` adopts a clone of `other`'s allocator unless
    /// the value was assigned in place.
    ///
    /// # Errors
    ///
    /// If the allocation fails, `self` is not modified. The same holds if cloning the value panics
    /// while filling new memory.
    pub fn try_clone_from(&mut self, other: &Self) -> Result<(), A::Error>
    where
        T: Clone,
    {
        let propagate = A::PROPAGATE_ON_COPY_ASSIGNMENT;
        let Some(value) = other.get() else {
            self.install(None, propagate.then(|| other.alloc.clone()));
            return Ok(());
        };
        if self.alloc.is_equal(&other.alloc) {
            if let Some(slot) = self.get_mut() {
                slot.clone_from(value);
                return Ok(());
            }
        }

        tracing::trace!(
            ty = any::type_name::<T>(),
            propagate,
            "reallocating for copy assignment"
        );
        let mut alloc = propagate.then(|| other.alloc.clone());
        let ptr = allocate_with(alloc.as_mut().unwrap_or(&mut self.alloc), || value.clone())?;
        self.install(Some(ptr), alloc);
        Ok(())
    }

    /// Assigns `value` to the owned value, or allocates a new one if the box is valueless.
    #[inline]
    pub fn assign<U: Into<T>>(&mut self, value: U)
    where
        A: AllocRef<Error = Never>,
    {
        let Ok(()) = self.try_assign(value);
    }

    /// Tries to assign `value` to the owned value.
    ///
    /// An engaged box assigns through to its value and never allocates. A valueless box allocates
    /// from its allocator and becomes engaged.
    pub fn try_assign<U: Into<T>>(&mut self, value: U) -> Result<(), A::Error> {
        if let Some(slot) = self.get_mut() {
            *slot = value.into();
            return Ok(());
        }
        let ptr = allocate_with(&mut self.alloc, || value.into())?;
        self.ptr = Some(ptr);
        Ok(())
    }

    /// Swaps the values of two boxes without touching the values themselves.
    ///
    /// The allocators are exchanged as well if [`AllocRef::PROPAGATE_ON_SWAP`] is set.
    ///
    /// # Panics
    ///
    /// Panics if the allocators do not propagate on swap and do not compare equal, since each box
    /// would otherwise end up owning memory its allocator cannot release.
    pub fn swap(&mut self, other: &mut Self) {
        if A::PROPAGATE_ON_SWAP {
            tracing::trace!(ty = any::type_name::<T>(), "exchanging allocators on swap");
            mem::swap(&mut self.alloc, &mut other.alloc);
        } else if !A::IS_ALWAYS_EQUAL && !self.alloc.is_equal(&other.alloc) {
            unequal_swap();
        }
        mem::swap(&mut self.ptr, &mut other.ptr);
    }

    /// Compares the owned value with `value`. A valueless box is never equal to a value.
    #[inline]
    pub fn eq_value<U: ?Sized>(&self, value: &U) -> bool
    where
        T: PartialEq<U>,
    {
        self.get().is_some_and(|v| PartialEq::eq(v, value))
    }

    /// Orders the owned value against `value`.
    ///
    /// A valueless box is ordered below every value and always returns `Some(Ordering::Less)`.
    #[inline]
    pub fn partial_cmp_value<U: ?Sized>(&self, value: &U) -> Option<Ordering>
    where
        T: PartialOrd<U>,
    {
        match self.get() {
            Some(v) => PartialOrd::partial_cmp(v, value),
            None => Some(Ordering::Less),
        }
    }

    #[inline]
    fn engaged(ptr: NonNull<T>, alloc: A) -> Self {
        Self {
            ptr: Some(ptr),
            alloc,
            marker: PhantomData,
        }
    }

    #[inline]
    fn valueless_in(alloc: A) -> Self {
        Self {
            ptr: None,
            alloc,
            marker: PhantomData,
        }
    }

    /// Installs `ptr`, allocated from `alloc` if given and from the current allocator otherwise,
    /// then drops the previous value through the allocator it was allocated from.
    fn install(&mut self, ptr: Option<NonNull<T>>, alloc: Option<A>) {
        let old = mem::replace(&mut self.ptr, ptr);
        let mut old_alloc = alloc.map(|alloc| {
            tracing::trace!(ty = any::type_name::<T>(), "adopting allocator of source");
            mem::replace(&mut self.alloc, alloc)
        });
        if let Some(old) = old {
            let alloc = old_alloc.as_mut().unwrap_or(&mut self.alloc);
            // SAFETY: `old` was owned by `self` and allocated from `alloc`
            unsafe { destroy_and_release(alloc, old) }
        }
    }

    #[inline]
    fn reset(&mut self) {
        self.install(None, None);
    }
}

/// Swaps the values of two boxes. See [`Indirect::swap`].
#[inline]
pub fn swap<T, A: AllocRef>(a: &mut Indirect<T, A>, b: &mut Indirect<T, A>) {
    a.swap(b);
}

/// Allocates memory for a `T` from `alloc` and constructs `init()` in it.
///
/// The memory is released again if `init` or the allocator's `construct` panics.
fn allocate_with<T, A: AllocRef>(
    alloc: &mut A,
    init: impl FnOnce() -> T,
) -> Result<NonNull<T>, A::Error> {
    let Some(layout) = NonZeroLayout::of::<T>() else {
        let ptr = NonNull::dangling();
        // SAFETY: any aligned non-null pointer is valid for a zero-sized write
        unsafe { alloc.construct(ptr, init()) };
        return Ok(ptr);
    };
    let raw = alloc.alloc(layout)?;
    // SAFETY: `raw` came from `alloc` with `layout` and holds no value on unwind
    let mut alloc = Guard::new(alloc, |alloc| unsafe { alloc.dealloc(raw, layout) });
    let ptr = raw.cast::<T>();
    // SAFETY: `raw` fits the layout of `T`
    unsafe { alloc.construct(ptr, init()) };
    Guard::defuse(alloc);
    Ok(ptr)
}

/// Drops the value at `ptr` and releases its memory. The memory is released even if dropping the
/// value panics.
unsafe fn destroy_and_release<T, A: AllocRef>(alloc: &mut A, ptr: NonNull<T>) {
    // SAFETY: forwarded from the caller
    let mut alloc = Guard::new(alloc, |alloc| unsafe { release(&mut **alloc, ptr) });
    unsafe { alloc.destroy(ptr) };
}

/// Releases the memory at `ptr` without dropping its contents.
unsafe fn release<T, A: AllocRef>(alloc: &mut A, ptr: NonNull<T>) {
    if let Some(layout) = NonZeroLayout::of::<T>() {
        unsafe { alloc.dealloc(ptr.cast(), layout) }
    }
}

#[cold]
#[track_caller]
fn valueless() -> ! {
    panic!("dereferenced a valueless `Indirect`");
}

#[cold]
#[track_caller]
fn unequal_swap() -> ! {
    panic!("swapped `Indirect`s with unequal allocators that do not propagate on swap");
}

impl<T, A: AllocRef> Drop for Indirect<T, A> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<T, A> Default for Indirect<T, A>
where
    T: Default,
    A: Default + AllocRef<Error = Never>,
{
    fn default() -> Self {
        Self::default_in(A::default())
    }
}

impl<T: Clone, A: AllocRef<Error = Never>> Clone for Indirect<T, A> {
    /// Returns a new box holding a clone of this box's value, allocated from
    /// [`AllocRef::select_on_copy`] of this box's allocator.
    ///
    /// # Examples
    ///
    /// ```
    /// use alloc_indirect::Indirect;
    ///
    /// let x = Indirect::new(5);
    /// let y = x.clone();
    ///
    /// // The value is the same
    /// assert_eq!(x, y);
    ///
    /// // But they are unique objects
    /// assert_ne!(x.as_ptr(), y.as_ptr());
    /// ```
    #[inline]
    fn clone(&self) -> Self {
        self.clone_in(self.alloc.select_on_copy())
    }

    /// See [`Indirect::try_clone_from`].
    ///
    /// # Examples
    ///
    /// ```
    /// use alloc_indirect::Indirect;
    ///
    /// let x = Indirect::new(5);
    /// let mut y = Indirect::new(10);
    /// let yp = y.as_ptr();
    ///
    /// y.clone_from(&x);
    ///
    /// // The value is the same
    /// assert_eq!(x, y);
    ///
    /// // And no allocation occurred
    /// assert_eq!(yp, y.as_ptr());
    /// ```
    #[inline]
    fn clone_from(&mut self, source: &Self) {
        let Ok(()) = self.try_clone_from(source);
    }
}

impl<T: Clone, A: AllocRef, B: AllocRef> CloneIn<B> for Indirect<T, A> {
    type Cloned = Indirect<T, B>;

    fn clone_in(&self, a: B) -> Self::Cloned
    where
        B: AllocRef<Error = Never>,
    {
        let Ok(b) = self.try_clone_in(a);
        b
    }

    /// Clones the value into memory from `a`. A valueless box clones into a valueless box.
    fn try_clone_in(&self, mut a: B) -> Result<Self::Cloned, B::Error> {
        let ptr = match self.get() {
            Some(value) => Some(allocate_with(&mut a, || value.clone())?),
            None => None,
        };
        Ok(Indirect {
            ptr,
            alloc: a,
            marker: PhantomData,
        })
    }
}

impl<T, A> From<T> for Indirect<T, A>
where
    A: Default + AllocRef<Error = Never>,
{
    /// Converts a `T` into an `Indirect<T, A>` by moving it into memory from `A::default()`.
    fn from(t: T) -> Self {
        Self::new_in(t, A::default())
    }
}

impl<T: PartialEq<U>, U, A: AllocRef, B: AllocRef> PartialEq<Indirect<U, B>> for Indirect<T, A> {
    /// Two valueless boxes are equal, a valueless and an engaged box are not.
    #[inline]
    fn eq(&self, other: &Indirect<U, B>) -> bool {
        match (self.get(), other.get()) {
            (Some(a), Some(b)) => PartialEq::eq(a, b),
            (a, b) => a.is_none() && b.is_none(),
        }
    }
}

impl<T: Eq, A: AllocRef> Eq for Indirect<T, A> {}

impl<T: PartialOrd<U>, U, A: AllocRef, B: AllocRef> PartialOrd<Indirect<U, B>>
    for Indirect<T, A>
{
    /// Valueless boxes order below engaged ones.
    #[inline]
    fn partial_cmp(&self, other: &Indirect<U, B>) -> Option<Ordering> {
        match (self.get(), other.get()) {
            (Some(a), Some(b)) => PartialOrd::partial_cmp(a, b),
            (a, b) => Some(a.is_some().cmp(&b.is_some())),
        }
    }
}

impl<T: Ord, A: AllocRef> Ord for Indirect<T, A> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.get().cmp(&other.get())
    }
}

impl<T: Hash, A: AllocRef> Hash for Indirect<T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.get().hash(state);
    }
}

impl<T: fmt::Debug, A: AllocRef> fmt::Debug for Indirect<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => fmt::Debug::fmt(value, f),
            None => f.write_str("Indirect(<valueless>)"),
        }
    }
}

impl<T, A: AllocRef> fmt::Pointer for Indirect<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = self.ptr.map_or(ptr::null(), |p| p.as_ptr().cast_const());
        fmt::Pointer::fmt(&raw, f)
    }
}

impl<T, A: AllocRef> Deref for Indirect<T, A> {
    type Target = T;

    /// # Panics
    ///
    /// Panics if the box is valueless.
    #[inline]
    fn deref(&self) -> &T {
        match self.get() {
            Some(value) => value,
            None => valueless(),
        }
    }
}

impl<T, A: AllocRef> DerefMut for Indirect<T, A> {
    /// # Panics
    ///
    /// Panics if the box is valueless.
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        match self.get_mut() {
            Some(value) => value,
            None => valueless(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::AllocErr;

    #[test]
    fn new_round_trip() {
        let b = Indirect::new((1, 2, 3));
        assert_eq!(*b, (1, 2, 3));
        assert!(!b.is_valueless());
        assert!(b.eq_value(&(1, 2, 3)));
    }

    #[test]
    fn zero_sized_values() {
        let mut a = Indirect::new(());
        let b = a.take();
        assert!(a.is_valueless());
        assert!(!b.is_valueless());
        Indirect::into_inner(b);
    }

    #[test]
    fn take_leaves_valueless() {
        let mut x = Indirect::new(5);
        let y = x.take();
        assert!(x.is_valueless());
        assert_eq!(*y, 5);
        assert_eq!(x.get(), None);

        let z = x.take();
        assert!(z.is_valueless());
    }

    #[test]
    fn valueless_comparisons() {
        let mut a = Indirect::new(1);
        let _ = a.take();
        let mut b = Indirect::new(2);
        let _ = b.take();
        let c = Indirect::new(0);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a < c);
        assert_eq!(a.cmp(&b), Ordering::Equal);
        assert!(!a.eq_value(&1));
        assert_eq!(a.partial_cmp_value(&i32::MIN), Some(Ordering::Less));
        assert_eq!(c.partial_cmp_value(&1), Some(Ordering::Less));
        assert_eq!(c.partial_cmp_value(&0), Some(Ordering::Equal));
    }

    #[test]
    #[should_panic(expected = "valueless")]
    fn deref_valueless_panics() {
        let mut a = Indirect::new(1);
        let _ = a.take();
        let _value: i32 = *a;
    }

    #[test]
    fn assign_through_and_into_valueless() {
        let mut a: Indirect<String> = Indirect::new(String::from("a"));
        let p = a.as_ptr();
        a.assign("b");
        assert_eq!(*a, "b");
        assert_eq!(a.as_ptr(), p);

        let _ = a.take();
        a.assign("c");
        assert_eq!(*a, "c");
    }

    #[test]
    fn try_variants_with_fallible_global() -> Result<(), AllocErr> {
        let mut a = Indirect::try_new_in(vec![1, 2], Global)?;
        let b = a.try_clone_in(Global)?;
        let mut c = a.try_take_in(Global)?;
        assert!(a.is_valueless());
        assert_eq!(b, c);
        c.try_take_from(&mut a)?;
        assert!(c.is_valueless());
        Ok(())
    }

    #[test]
    fn debug_and_pointer() {
        let mut a = Indirect::new(7);
        assert_eq!(format!("{:?}", a), "7");
        let _ = a.take();
        assert_eq!(format!("{:?}", a), "Indirect(<valueless>)");
        assert_eq!(format!("{:p}", a), format!("{:p}", ptr::null::<i32>()));
    }

    #[test]
    fn raw_parts_round_trip() {
        let a = Indirect::new(String::from("raw"));
        let (ptr, alloc) = Indirect::into_raw_parts(a);
        assert!(ptr.is_some());
        let a = unsafe { Indirect::from_raw_parts_in(ptr, alloc) };
        assert_eq!(Indirect::into_inner(a), "raw");
    }

    #[test]
    fn from_and_default() {
        let a: Indirect<u8> = Indirect::from(3);
        let b: Indirect<u8> = Indirect::default();
        assert_eq!(*a, 3);
        assert_eq!(*b, 0);
        assert!(b < a);
    }
}
