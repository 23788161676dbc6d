//! Tag registry.
//!
//! Each module owns an arena of `TagNode`s addressed by `TagId`. Parent and
//! child links are `TagRef`s, never references, so a child declared by one
//! module under another module's tag is just an index pair.
//!
//! # Extension
//!
//! A module extends a foreign tag by declaring a local alias node. The alias
//! overlay maps `(module, local id)` to the canonical `(origin module, id)`;
//! every query canonicalizes through it first. Children declared beneath an
//! alias are owned by the extending module and hang off the canonical tag
//! through the extension index.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use grain_ir::{ModuleId, Name, StringLookup, TagId};
use grain_value::{TagRef, Value, CORE_FAILURE_KINDS, CORE_FAILURE_ROOT};

use crate::RegistryError;

/// How tag-by-value lookup treats several tags sharing one value.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum TagValuePolicy {
    /// More than one candidate is an ambiguity failure.
    #[default]
    Strict,
    /// The first candidate in declaration order wins.
    FirstMatch,
}

/// One tag in a module's arena.
#[derive(Clone, Debug)]
pub struct TagNode {
    pub name: Name,
    /// Canonical parent; may live in another module.
    pub parent: Option<TagRef>,
    /// Optional typed scalar carried by the tag.
    pub value: Option<Value>,
    /// Children owned by this module, in declaration order.
    pub children: SmallVec<[TagRef; 4]>,
    /// Module that declared the node.
    pub origin: ModuleId,
}

#[derive(Clone, Debug, Default)]
struct ModuleTags {
    nodes: Vec<TagNode>,
    /// Top-level names visible in the module, aliases included.
    roots: FxHashMap<Name, TagId>,
}

/// Two or more tags matched a value lookup under `TagValuePolicy::Strict`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagAmbiguity {
    pub candidates: Vec<TagRef>,
}

/// All tag trees of a program.
#[derive(Clone, Debug, Default)]
pub struct TagRegistry {
    modules: Vec<ModuleTags>,
    /// Alias overlay: local alias node to canonical tag.
    aliases: FxHashMap<TagRef, TagRef>,
    /// Children other modules declared under a canonical tag.
    extensions: FxHashMap<TagRef, SmallVec<[TagRef; 4]>>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the core module with `#failure` and its kinds.
    ///
    /// Must run before any other module is added so the ids line up with the
    /// `TagRef` constants.
    pub(crate) fn seed_core(&mut self, lookup: &impl StringInterning) -> Result<(), RegistryError> {
        debug_assert!(self.modules.is_empty());
        self.add_module();
        let root = lookup.intern(CORE_FAILURE_ROOT);
        let failure = self.declare(ModuleId::CORE, &[root], None, lookup)?;
        debug_assert_eq!(failure, TagRef::FAILURE);
        for kind in CORE_FAILURE_KINDS {
            let kind = lookup.intern(kind);
            self.declare(ModuleId::CORE, &[root, kind], None, lookup)?;
        }
        Ok(())
    }

    /// Reserve an empty tag arena for the next module id.
    pub(crate) fn add_module(&mut self) {
        self.modules.push(ModuleTags::default());
    }

    fn tags(&self, module: ModuleId) -> Option<&ModuleTags> {
        self.modules.get(module.index())
    }

    /// Node record for a tag, without canonicalizing.
    pub fn node(&self, tag: TagRef) -> Option<&TagNode> {
        self.tags(tag.module)?.nodes.get(tag.id.index())
    }

    /// Resolve an alias to its canonical tag.
    #[inline]
    pub fn canonical(&self, tag: TagRef) -> TagRef {
        self.aliases.get(&tag).copied().unwrap_or(tag)
    }

    pub fn is_alias(&self, tag: TagRef) -> bool {
        self.aliases.contains_key(&tag)
    }

    pub fn parent(&self, tag: TagRef) -> Option<TagRef> {
        self.node(self.canonical(tag))?.parent
    }

    /// Number of ancestors; roots are depth 0.
    pub fn depth(&self, tag: TagRef) -> u32 {
        let mut depth = 0;
        let mut current = self.parent(tag);
        while let Some(p) = current {
            depth += 1;
            current = self.parent(p);
        }
        depth
    }

    /// Whether `tag` is `ancestor` or lies beneath it.
    pub fn is_same_or_descendant(&self, tag: TagRef, ancestor: TagRef) -> bool {
        let ancestor = self.canonical(ancestor);
        let mut current = Some(self.canonical(tag));
        while let Some(t) = current {
            if t == ancestor {
                return true;
            }
            current = self.parent(t);
        }
        false
    }

    /// Canonical children: the owner's own children, then extensions in
    /// registration order.
    pub fn children(&self, tag: TagRef) -> impl Iterator<Item = TagRef> + '_ {
        let tag = self.canonical(tag);
        let own = self
            .node(tag)
            .map(|n| n.children.as_slice())
            .unwrap_or_default();
        let ext = self
            .extensions
            .get(&tag)
            .map(|v| v.as_slice())
            .unwrap_or_default();
        own.iter().chain(ext.iter()).copied()
    }

    fn child_named(&self, tag: TagRef, name: Name) -> Option<TagRef> {
        self.children(tag)
            .find(|c| self.node(*c).is_some_and(|n| n.name == name))
    }

    /// Root of `module` with the given name, canonicalized.
    fn root_in(&self, module: ModuleId, name: Name) -> Option<TagRef> {
        let id = *self.tags(module)?.roots.get(&name)?;
        Some(self.canonical(TagRef::new(module, id)))
    }

    /// Resolve a dotted path. The first segment is looked up in each of
    /// `visible` in order; the rest walk canonical children.
    pub fn lookup_path(&self, visible: &[ModuleId], path: &[Name]) -> Option<TagRef> {
        let (first, rest) = path.split_first()?;
        let mut current = visible.iter().find_map(|m| self.root_in(*m, *first))?;
        for segment in rest {
            current = self.child_named(current, *segment)?;
        }
        Some(current)
    }

    /// Declare a tag in `module`. The parent path resolves within the module
    /// itself, aliases included.
    pub(crate) fn declare(
        &mut self,
        module: ModuleId,
        path: &[Name],
        value: Option<Value>,
        lookup: &impl StringLookup,
    ) -> Result<TagRef, RegistryError> {
        let Some((last, parent_path)) = path.split_last() else {
            return Err(RegistryError::TagParentMissing {
                path: String::new(),
            });
        };
        let parent = if parent_path.is_empty() {
            None
        } else {
            Some(
                self.lookup_path(&[module], parent_path)
                    .ok_or_else(|| RegistryError::TagParentMissing {
                        path: render_segments(parent_path, lookup),
                    })?,
            )
        };

        let clash = match parent {
            Some(p) => self.child_named(p, *last).is_some(),
            None => self
                .tags(module)
                .is_some_and(|t| t.roots.contains_key(last)),
        };
        if clash {
            return Err(RegistryError::DuplicateTag {
                path: render_segments(path, lookup),
            });
        }

        let tag = self.push_node(
            module,
            TagNode {
                name: *last,
                parent,
                value,
                children: SmallVec::new(),
                origin: module,
            },
            lookup,
        )?;
        match parent {
            Some(p) if p.module == module => {
                if let Some(node) = self.node_mut(p) {
                    node.children.push(tag);
                }
            }
            Some(p) => self.extensions.entry(p).or_default().push(tag),
            None => {
                if let Some(tags) = self.modules.get_mut(module.index()) {
                    tags.roots.insert(*last, tag.id);
                }
            }
        }
        tracing::trace!(?tag, ?parent, "declared tag");
        Ok(tag)
    }

    /// Make `origin` addressable from `module` under its own name.
    ///
    /// Re-aliasing the same origin is a no-op; a different root with that
    /// name is a duplicate.
    pub(crate) fn alias(
        &mut self,
        module: ModuleId,
        origin: TagRef,
        lookup: &impl StringLookup,
    ) -> Result<TagRef, RegistryError> {
        let origin = self.canonical(origin);
        let name = self
            .node(origin)
            .map(|n| n.name)
            .ok_or_else(|| RegistryError::UnknownTag {
                path: format!("{origin:?}"),
            })?;
        if let Some(existing) = self.tags(module).and_then(|t| t.roots.get(&name)).copied() {
            let existing = TagRef::new(module, existing);
            if self.canonical(existing) == origin {
                return Ok(existing);
            }
            return Err(RegistryError::DuplicateTag {
                path: format!("#{}", lookup.lookup(name)),
            });
        }
        let alias = self.push_node(
            module,
            TagNode {
                name,
                parent: None,
                value: None,
                children: SmallVec::new(),
                origin: module,
            },
            lookup,
        )?;
        if let Some(tags) = self.modules.get_mut(module.index()) {
            tags.roots.insert(name, alias.id);
        }
        self.aliases.insert(alias, origin);
        tracing::trace!(?alias, ?origin, "aliased tag");
        Ok(alias)
    }

    fn push_node(
        &mut self,
        module: ModuleId,
        node: TagNode,
        lookup: &impl StringLookup,
    ) -> Result<TagRef, RegistryError> {
        let tags = self
            .modules
            .get_mut(module.index())
            .ok_or_else(|| RegistryError::UnknownModule {
                name: format!("{module:?}"),
            })?;
        let index = u32::try_from(tags.nodes.len()).map_err(|_| RegistryError::Capacity {
            what: format!("tags named #{}", lookup.lookup(node.name)),
        })?;
        tags.nodes.push(node);
        Ok(TagRef::new(module, TagId::new(index)))
    }

    fn node_mut(&mut self, tag: TagRef) -> Option<&mut TagNode> {
        self.modules
            .get_mut(tag.module.index())?
            .nodes
            .get_mut(tag.id.index())
    }

    /// Find the descendant of `parent` whose associated value equals `value`.
    ///
    /// Descendants are searched one level at a time and the shallowest level
    /// holding a match decides. Several matches on that level are ambiguous
    /// under `Strict`; deeper tags sharing the value never are.
    pub fn child_by_value(
        &self,
        parent: TagRef,
        value: &Value,
        policy: TagValuePolicy,
    ) -> Result<Option<TagRef>, TagAmbiguity> {
        let mut level: Vec<TagRef> = self.children(parent).collect();
        while !level.is_empty() {
            let mut found: Vec<TagRef> = level
                .iter()
                .copied()
                .filter(|t| {
                    self.node(*t)
                        .and_then(|n| n.value.as_ref())
                        .is_some_and(|v| v == value)
                })
                .collect();
            match found.len() {
                0 => {}
                1 => return Ok(found.pop()),
                _ if policy == TagValuePolicy::FirstMatch => return Ok(found.first().copied()),
                _ => return Err(TagAmbiguity { candidates: found }),
            }
            level = level.iter().flat_map(|t| self.children(*t)).collect();
        }
        Ok(None)
    }

    /// Segment names from the root down, canonicalized.
    pub fn path(&self, tag: TagRef) -> Vec<Name> {
        let mut segments = Vec::new();
        let mut current = Some(self.canonical(tag));
        while let Some(t) = current {
            match self.node(t) {
                Some(node) => {
                    segments.push(node.name);
                    current = node.parent;
                }
                None => break,
            }
        }
        segments.reverse();
        segments
    }

    /// Render as `#a.b.c`.
    pub fn render(&self, tag: TagRef, lookup: &impl StringLookup) -> String {
        render_segments(&self.path(tag), lookup)
    }
}

/// Interning access for registry seeding.
pub(crate) trait StringInterning: StringLookup {
    fn intern(&self, s: &str) -> Name;
}

impl StringInterning for grain_ir::StringInterner {
    fn intern(&self, s: &str) -> Name {
        grain_ir::StringInterner::intern(self, s)
    }
}

impl StringInterning for grain_ir::SharedInterner {
    fn intern(&self, s: &str) -> Name {
        grain_ir::StringInterner::intern(self, s)
    }
}

pub(crate) fn render_segments(segments: &[Name], lookup: &impl StringLookup) -> String {
    let mut out = String::from("#");
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        out.push_str(lookup.lookup(*segment));
    }
    out
}
