//! Program registry: per-module symbol tables plus the shared tag registry.
//!
//! Built once through `ProgramBuilder`, then sealed into an immutable
//! `Program` that every evaluator thread reads without locking.

mod builder;
mod render;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use grain_ir::{ModuleId, Name, ShapeId, SharedArena, SharedInterner, StringLookup};
use grain_value::TagRef;

use crate::overload::{FunctionOverload, OverloadId};
use crate::shapes::Shape;
use crate::tags::TagRegistry;

pub use builder::{ModuleBuilder, ProgramBuilder};

/// Name of the implicit core module.
pub const CORE_MODULE: &str = "core";

/// Everything one module declared.
#[derive(Clone, Debug)]
pub struct ModuleSymbols {
    pub id: ModuleId,
    pub name: Name,
    deps: Vec<ModuleId>,
    arena: SharedArena,
    shapes: Vec<Shape>,
    shape_index: FxHashMap<Name, u32>,
    overloads: Vec<FunctionOverload>,
    overload_index: FxHashMap<Name, SmallVec<[u32; 4]>>,
    sealed: bool,
}

impl ModuleSymbols {
    fn new(id: ModuleId, name: Name, deps: Vec<ModuleId>, arena: SharedArena) -> Self {
        ModuleSymbols {
            id,
            name,
            deps,
            arena,
            shapes: Vec::new(),
            shape_index: FxHashMap::default(),
            overloads: Vec::new(),
            overload_index: FxHashMap::default(),
            sealed: false,
        }
    }

    pub fn deps(&self) -> &[ModuleId] {
        &self.deps
    }

    /// Expression arena the module's bodies and defaults index into.
    pub fn arena(&self) -> &SharedArena {
        &self.arena
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Named shape declared by this module.
    pub fn local_shape(&self, name: Name) -> Option<ShapeId> {
        self.shape_index
            .get(&name)
            .map(|&index| ShapeId::new(self.id, index))
    }

    /// This module's overloads of `name`, in registration order.
    pub fn local_overloads(&self, name: Name) -> impl Iterator<Item = &FunctionOverload> + '_ {
        self.overload_index
            .get(&name)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .filter_map(|&i| self.overloads.get(i as usize))
    }

    pub fn overload_count(&self) -> usize {
        self.overloads.len()
    }
}

/// Sealed program.
#[derive(Clone, Debug)]
pub struct Program {
    modules: Vec<ModuleSymbols>,
    module_index: FxHashMap<Name, ModuleId>,
    tags: TagRegistry,
    interner: SharedInterner,
}

impl Program {
    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn tags(&self) -> &TagRegistry {
        &self.tags
    }

    pub fn module(&self, id: ModuleId) -> Option<&ModuleSymbols> {
        self.modules.get(id.index())
    }

    pub fn module_id(&self, name: Name) -> Option<ModuleId> {
        self.module_index.get(&name).copied()
    }

    pub fn modules(&self) -> impl Iterator<Item = &ModuleSymbols> + '_ {
        self.modules.iter()
    }

    /// Search order for names used in `module`: itself, its declared
    /// dependencies, then core.
    pub fn visible(&self, module: ModuleId) -> SmallVec<[ModuleId; 4]> {
        visible_from(&self.modules, module)
    }

    /// Read-only symbol view scoped to `module`.
    pub fn symbols(&self, module: ModuleId) -> SymbolTable<'_> {
        SymbolTable {
            program: self,
            module,
        }
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.module(id.module)?.shapes.get(id.index as usize)
    }

    pub fn overload(&self, id: OverloadId) -> Option<&FunctionOverload> {
        self.module(id.module)?.overloads.get(id.index as usize)
    }

    pub fn name(&self, name: Name) -> &str {
        self.interner.lookup(name)
    }

    pub fn render_tag(&self, tag: TagRef) -> String {
        self.tags.render(tag, &self.interner)
    }
}

fn visible_from(modules: &[ModuleSymbols], module: ModuleId) -> SmallVec<[ModuleId; 4]> {
    let mut out: SmallVec<[ModuleId; 4]> = SmallVec::new();
    out.push(module);
    if let Some(symbols) = modules.get(module.index()) {
        for dep in &symbols.deps {
            if !out.contains(dep) {
                out.push(*dep);
            }
        }
    }
    if !out.contains(&ModuleId::CORE) {
        out.push(ModuleId::CORE);
    }
    out
}

/// Lookups scoped to one module and what it can see.
#[derive(Copy, Clone)]
pub struct SymbolTable<'p> {
    program: &'p Program,
    module: ModuleId,
}

impl<'p> SymbolTable<'p> {
    pub fn module(&self) -> ModuleId {
        self.module
    }

    pub fn lookup_shape(&self, name: Name) -> Option<&'p Shape> {
        let program = self.program;
        program
            .visible(self.module)
            .into_iter()
            .find_map(|m| program.module(m)?.local_shape(name))
            .and_then(|id| program.shape(id))
    }

    pub fn lookup_tag(&self, path: &[Name]) -> Option<TagRef> {
        self.program
            .tags
            .lookup_path(&self.program.visible(self.module), path)
    }

    /// Every visible overload of `name`, nearest module first.
    pub fn lookup_overloads(&self, name: Name) -> Vec<&'p FunctionOverload> {
        let program = self.program;
        program
            .visible(self.module)
            .into_iter()
            .filter_map(|m| program.module(m))
            .flat_map(|symbols| symbols.local_overloads(name))
            .collect()
    }
}
