use crate::{
    alloc::{AllocRef, NonZeroLayout},
    Never,
};
use core::ptr::NonNull;

/// An allocator adaptor that turns allocation failure into a call to `handle_alloc_error`.
///
/// Concrete allocators should report failure through their `Error` type. Code that cannot
/// recover from an allocation failure anyway wraps the allocator in `AbortAlloc`, which has
/// `Error = Never` and so unlocks the infallible API of [`Indirect`]. All policy constants and
/// hooks forward to the wrapped allocator.
///
/// [`Indirect`]: crate::Indirect
#[derive(Default, Copy, Clone, Debug)]
pub struct AbortAlloc<A>(pub A);

#[cold]
fn alloc_abort(layout: NonZeroLayout) -> ! {
    tracing::error!(?layout, "allocator error, aborting");
    liballoc::alloc::handle_alloc_error(layout.into())
}

unsafe impl<A: AllocRef> AllocRef for AbortAlloc<A> {
    type Error = Never;

    const PROPAGATE_ON_COPY_ASSIGNMENT: bool = A::PROPAGATE_ON_COPY_ASSIGNMENT;
    const PROPAGATE_ON_MOVE_ASSIGNMENT: bool = A::PROPAGATE_ON_MOVE_ASSIGNMENT;
    const PROPAGATE_ON_SWAP: bool = A::PROPAGATE_ON_SWAP;
    const IS_ALWAYS_EQUAL: bool = A::IS_ALWAYS_EQUAL;

    fn alloc(&mut self, layout: NonZeroLayout) -> Result<NonNull<u8>, Self::Error> {
        match self.0.alloc(layout) {
            Ok(ptr) => Ok(ptr),
            Err(_) => alloc_abort(layout),
        }
    }

    unsafe fn dealloc(&mut self, ptr: NonNull<u8>, layout: NonZeroLayout) {
        unsafe { self.0.dealloc(ptr, layout) }
    }

    fn is_equal(&self, other: &Self) -> bool {
        self.0.is_equal(&other.0)
    }

    unsafe fn construct<T>(&mut self, ptr: NonNull<T>, value: T) {
        unsafe { self.0.construct(ptr, value) }
    }

    unsafe fn destroy<T: ?Sized>(&mut self, ptr: NonNull<T>) {
        unsafe { self.0.destroy(ptr) }
    }

    fn select_on_copy(&self) -> Self {
        Self(self.0.select_on_copy())
    }
}
