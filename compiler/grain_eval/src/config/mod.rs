//! Evaluator policy.
//!
//! Everything the core leaves to the host: whether iteration may run
//! elements concurrently, how tag-by-value lookup treats shared values,
//! the call depth limit, and the dispatch memo size.

use grain_types::TagValuePolicy;

/// How `Iterate` steps evaluate their elements.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum IterationMode {
    /// One element after another on the calling thread.
    #[default]
    Sequential,
    /// Elements run on the rayon pool once there are at least `min_items`.
    /// Results are still collected in source order.
    Parallel { min_items: usize },
}

impl IterationMode {
    /// Whether `len` elements should be spread over the pool.
    pub fn is_parallel_for(self, len: usize) -> bool {
        match self {
            IterationMode::Sequential => false,
            IterationMode::Parallel { min_items } => len >= min_items.max(2),
        }
    }
}

/// Default number of memoized dispatch decisions per interpreter.
pub const DEFAULT_DISPATCH_CACHE_CAPACITY: usize = 256;

#[derive(Clone, Debug)]
pub struct EvalConfig {
    pub iteration: IterationMode,
    pub tag_values: TagValuePolicy,
    /// Call depth limit. `None` leaves recursion bounded only by memory,
    /// with the native stack grown on demand.
    pub max_call_depth: Option<usize>,
    /// Memoized dispatch decisions kept per interpreter; 0 disables the memo.
    pub dispatch_cache_capacity: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            iteration: IterationMode::default(),
            tag_values: TagValuePolicy::default(),
            max_call_depth: None,
            dispatch_cache_capacity: DEFAULT_DISPATCH_CACHE_CAPACITY,
        }
    }
}

impl EvalConfig {
    #[must_use]
    pub fn with_iteration(mut self, iteration: IterationMode) -> Self {
        self.iteration = iteration;
        self
    }

    #[must_use]
    pub fn with_tag_values(mut self, policy: TagValuePolicy) -> Self {
        self.tag_values = policy;
        self
    }

    #[must_use]
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = Some(depth);
        self
    }

    #[must_use]
    pub fn with_dispatch_cache_capacity(mut self, capacity: usize) -> Self {
        self.dispatch_cache_capacity = capacity;
        self
    }
}
