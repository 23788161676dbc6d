//! Memo of dispatch decisions.
//!
//! Resolution that evaluates no field default is a pure function of the
//! calling module, the function name, the parent mask, and the argument's
//! structural signature, so the chosen overload can be reused. Decisions that
//! evaluated a default read mutable scope layers and are never stored. Only
//! the choice is cached; the argument is re-morphed on every hit.

use rustc_hash::FxHashMap;

use grain_ir::{ModuleId, Name};
use grain_types::{OverloadId, StructSig};
use grain_value::TagRef;

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub(crate) struct CacheKey {
    pub module: ModuleId,
    pub name: Name,
    pub mask: Option<(Name, TagRef)>,
    pub signature: StructSig,
}

/// Per-interpreter dispatch memo with a fixed capacity.
///
/// When full, the memo is cleared wholesale.
#[derive(Clone, Debug, Default)]
pub struct DispatchCache {
    capacity: usize,
    entries: FxHashMap<CacheKey, OverloadId>,
    hits: u64,
    misses: u64,
}

impl DispatchCache {
    pub fn new(capacity: usize) -> Self {
        DispatchCache {
            capacity,
            entries: FxHashMap::default(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.capacity > 0
    }

    pub(crate) fn get(&mut self, key: &CacheKey) -> Option<OverloadId> {
        let found = self.entries.get(key).copied();
        if found.is_some() {
            self.hits = self.hits.wrapping_add(1);
        } else {
            self.misses = self.misses.wrapping_add(1);
        }
        found
    }

    pub(crate) fn insert(&mut self, key: CacheKey, overload: OverloadId) {
        if !self.is_enabled() {
            return;
        }
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            tracing::debug!(capacity = self.capacity, "dispatch cache full, clearing");
            self.entries.clear();
        }
        self.entries.insert(key, overload);
    }

    pub(crate) fn remove(&mut self, key: &CacheKey) {
        self.entries.remove(key);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
