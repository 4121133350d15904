use std::{fmt, num::NonZeroU32};

/// Identifier handed out by an [`IdAllocator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub NonZeroU32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Sequential id source. Every conversion run owns one, so ids are only unique within a run.
///
/// ## Example
/// ```
/// # use avara_utils::IdAllocator;
/// let mut ids = IdAllocator::new();
/// let a = ids.allocate();
/// let b = ids.allocate();
/// assert_ne!(a, b);
/// assert_eq!(ids.allocated(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    allocated: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fresh id.
    ///
    /// ## Panics
    /// Panics after allocating `u32::MAX` ids.
    pub fn allocate(&mut self) -> EntityId {
        self.allocated = self.allocated.checked_add(1).expect("id space exhausted");
        EntityId(NonZeroU32::new(self.allocated).expect("ids start at 1"))
    }

    /// The amount of ids handed out so far.
    pub fn allocated(&self) -> u32 {
        self.allocated
    }
}
