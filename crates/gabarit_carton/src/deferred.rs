//! Values computed once from their owner.

use std::marker::PhantomData;

use once_cell::unsync::OnceCell;

/// A value produced from its owner on first access and cached afterwards.
///
/// The owner is passed in at access time rather than stored, which lets the
/// deferred value live inside the struct it is computed from. Later changes to
/// the owner do not recompute the cached value.
pub struct DeferredValue<O: ?Sized, T, F = fn(&O) -> T> {
    cell: OnceCell<T>,
    producer: F,
    _owner: PhantomData<fn(&O)>,
}

impl<O: ?Sized, T, F> DeferredValue<O, T, F>
where
    F: Fn(&O) -> T,
{
    /// Wrap `producer` without running it
    #[inline]
    pub const fn new(producer: F) -> Self {
        Self {
            cell: OnceCell::new(),
            producer,
            _owner: PhantomData,
        }
    }

    /// The cached value, producing it from `owner` on first access
    #[inline]
    pub fn get(&self, owner: &O) -> &T {
        self.cell.get_or_init(|| (self.producer)(owner))
    }

    /// The cached value if it has been produced
    #[inline]
    pub fn get_if_computed(&self) -> Option<&T> {
        self.cell.get()
    }

    /// Whether the producer has run
    #[inline]
    pub fn is_computed(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<O: ?Sized, T: std::fmt::Debug, F> std::fmt::Debug for DeferredValue<O, T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.cell.get() {
            Some(value) => f.debug_tuple("DeferredValue").field(value).finish(),
            None => f.write_str("DeferredValue(<pending>)"),
        }
    }
}
