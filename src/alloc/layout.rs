pub use core::alloc::Layout;
use core::{fmt, mem};

/// The parameters given to a `NonZeroLayout` constructor do not satisfy its documented
/// constraints.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct LayoutErr {
    private: (),
}

impl From<core::alloc::LayoutError> for LayoutErr {
    fn from(_: core::alloc::LayoutError) -> Self {
        Self { private: () }
    }
}

impl fmt::Display for LayoutErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid or zero-sized layout")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LayoutErr {}

/// Non-zero Layout of a block of memory.
///
/// An instance of `NonZeroLayout` describes a particular layout of memory handed to an
/// [`AllocRef`]. Zero-sized values never reach an allocator, so every allocation request is
/// expressed with this type.
///
/// [`AllocRef`]: crate::alloc::AllocRef
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NonZeroLayout(Layout);

impl NonZeroLayout {
    /// Constructs a layout from a given `size` and `align`, or returns `LayoutErr` if either of
    /// the following conditions are not met:
    ///
    /// * `align` must be a power of two,
    /// * `size` must not be zero,
    /// * `size`, when rounded up to the nearest multiple of `align`, must not overflow.
    #[inline]
    pub fn from_size_align(size: usize, align: usize) -> Result<Self, LayoutErr> {
        Self::try_from(Layout::from_size_align(size, align)?)
    }

    /// Creates a layout, bypassing all checks.
    ///
    /// # Safety
    ///
    /// The preconditions of [`NonZeroLayout::from_size_align`] must hold.
    #[inline]
    pub const unsafe fn from_size_align_unchecked(size: usize, align: usize) -> Self {
        Self(unsafe { Layout::from_size_align_unchecked(size, align) })
    }

    /// The minimum size in bytes for a memory block of this layout.
    #[inline]
    pub const fn size(&self) -> usize {
        self.0.size()
    }

    /// The minimum byte alignment for a memory block of this layout.
    #[inline]
    pub const fn align(&self) -> usize {
        self.0.align()
    }

    /// Constructs a `NonZeroLayout` suitable for holding a value of type `T`.
    ///
    /// Returns `Err` if `T` is a ZST.
    #[inline]
    pub fn new<T>() -> Result<Self, LayoutErr> {
        Self::try_from(Layout::new::<T>())
    }

    /// Produces the layout of the value behind `t`.
    ///
    /// Returns `Err` if the value is zero-sized.
    #[inline]
    pub fn for_value<T: ?Sized>(t: &T) -> Result<Self, LayoutErr> {
        Self::try_from(Layout::for_value(t))
    }

    #[inline]
    pub(crate) fn of<T>() -> Option<Self> {
        if mem::size_of::<T>() == 0 {
            None
        } else {
            Some(Self(Layout::new::<T>()))
        }
    }
}

impl From<NonZeroLayout> for Layout {
    fn from(layout: NonZeroLayout) -> Self {
        layout.0
    }
}

impl TryFrom<Layout> for NonZeroLayout {
    type Error = LayoutErr;

    fn try_from(layout: Layout) -> Result<Self, Self::Error> {
        if layout.size() == 0 {
            Err(LayoutErr { private: () })
        } else {
            Ok(Self(layout))
        }
    }
}
