//! Stable integer ids for modules, tags, shapes, and expressions.
//!
//! Registries store their records in arenas and hand out these ids instead of
//! references, so cross-module links never form ownership cycles.

use std::fmt;

/// Index of a module in the program.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct ModuleId(u32);

impl ModuleId {
    /// The core module, seeded with the failure tag tree.
    pub const CORE: ModuleId = ModuleId(0);

    #[inline]
    pub const fn new(index: u32) -> Self {
        ModuleId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleId({})", self.0)
    }
}

/// Index of a tag node inside its module's tag arena.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct TagId(u32);

impl TagId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        TagId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TagId({})", self.0)
    }
}

/// A shape registered in some module.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ShapeId {
    pub module: ModuleId,
    pub index: u32,
}

impl ShapeId {
    #[inline]
    pub const fn new(module: ModuleId, index: u32) -> Self {
        ShapeId { module, index }
    }
}

/// Index into an expression arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct ExprId(u32);

impl ExprId {
    /// Invalid expression ID (sentinel value).
    pub const INVALID: ExprId = ExprId(u32::MAX);

    #[inline]
    pub const fn new(index: u32) -> Self {
        ExprId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

impl fmt::Debug for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "ExprId({})", self.0)
        } else {
            write!(f, "ExprId::INVALID")
        }
    }
}

impl Default for ExprId {
    fn default() -> Self {
        Self::INVALID
    }
}
