use crate::{alloc::AllocRef, Never};

/// Clones a value into storage obtained from a caller-supplied allocator.
///
/// This is the allocator-tagged form of [`Clone`]: the clone lives in `a` no matter which
/// allocator the original uses, and `a` may even be of a different type.
pub trait CloneIn<A: AllocRef>: Sized {
    type Cloned;

    fn clone_in(&self, a: A) -> Self::Cloned
    where
        A: AllocRef<Error = Never>;

    fn try_clone_in(&self, a: A) -> Result<Self::Cloned, A::Error>;
}
