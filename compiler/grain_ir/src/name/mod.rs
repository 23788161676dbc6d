//! Interned string identifier.
//!
//! A `Name` is a 32-bit index into the `StringInterner`. Equality and hashing
//! are integer operations, which keeps field lookups in structures cheap.

use std::fmt;

/// Interned string identifier.
///
/// The first few indices are reserved for names the core itself needs
/// (the failure schema's field names). `StringInterner::new` pre-interns them
/// in exactly this order, so the constants below are valid for every interner.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);
    /// `kind` field of a failure value.
    pub const KIND: Name = Name(1);
    /// `message` field of a failure value.
    pub const MESSAGE: Name = Name(2);
    /// `partial` field of a failure value.
    pub const PARTIAL: Name = Name(3);
    /// `errors` field of a failure value.
    pub const ERRORS: Name = Name(4);

    /// Strings backing the reserved names, in index order.
    pub(crate) const RESERVED: [&'static str; 5] = ["", "kind", "message", "partial", "errors"];

    /// Create from raw u32 value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }

    /// Get raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Index into the interner's string table.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::EMPTY
    }
}
