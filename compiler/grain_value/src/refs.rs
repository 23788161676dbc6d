//! References from values into the program registries.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use grain_ir::{ModuleId, Name, TagId};

/// A tag value: a node in some module's tag arena.
///
/// Always canonical once produced by the tag registry, so equality is
/// tag identity.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct TagRef {
    pub module: ModuleId,
    pub id: TagId,
}

impl TagRef {
    pub const fn new(module: ModuleId, id: TagId) -> Self {
        TagRef { module, id }
    }

    const fn core(index: u32) -> Self {
        TagRef {
            module: ModuleId::CORE,
            id: TagId::new(index),
        }
    }

    /// `#failure`, the root of every failure kind.
    pub const FAILURE: TagRef = TagRef::core(0);
    pub const SHAPE_MISMATCH: TagRef = TagRef::core(1);
    pub const DISPATCH_AMBIGUOUS: TagRef = TagRef::core(2);
    pub const DISPATCH_NOT_FOUND: TagRef = TagRef::core(3);
    pub const FIELD_UNDEFINED: TagRef = TagRef::core(4);
    pub const ARITHMETIC: TagRef = TagRef::core(5);
    pub const TAG_AMBIGUOUS: TagRef = TagRef::core(6);
    pub const THREAD: TagRef = TagRef::core(7);
    pub const RAISED: TagRef = TagRef::core(8);
}

/// Root segment of the core failure tree.
pub const CORE_FAILURE_ROOT: &str = "failure";

/// Children of `#failure` in the core module, in `TagId` order after the root.
pub const CORE_FAILURE_KINDS: [&str; 8] = [
    "shape_mismatch",
    "dispatch_ambiguous",
    "dispatch_not_found",
    "field_undefined",
    "arithmetic",
    "tag_ambiguous",
    "thread",
    "raised",
];

/// A function value: an overload set looked up by name from `module`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct FunctionRef {
    pub module: ModuleId,
    pub name: Name,
}

impl FunctionRef {
    pub const fn new(module: ModuleId, name: Name) -> Self {
        FunctionRef { module, name }
    }
}

/// Opaque handle to something owned outside the value model.
///
/// Equality is identity.
#[derive(Clone)]
pub struct ResourceHandle(Arc<dyn Any + Send + Sync>);

impl ResourceHandle {
    pub fn new<T: Any + Send + Sync>(resource: T) -> Self {
        ResourceHandle(Arc::new(resource))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    pub fn ptr_eq(&self, other: &ResourceHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<resource>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kinds_follow_root() {
        assert_eq!(TagRef::FAILURE.id.index(), 0);
        assert_eq!(TagRef::SHAPE_MISMATCH.id.index(), 1);
        assert_eq!(TagRef::RAISED.id.index(), CORE_FAILURE_KINDS.len());
    }

    #[test]
    fn test_resource_identity() {
        let a = ResourceHandle::new(5u8);
        let b = a.clone();
        let c = ResourceHandle::new(5u8);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
        assert_eq!(a.downcast_ref::<u8>(), Some(&5));
        assert!(a.downcast_ref::<u16>().is_none());
    }
}
