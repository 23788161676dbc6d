//! Mutable construction of a `Program`.
//!
//! Registration goes through a `ModuleBuilder` borrowed for one module. Once
//! a module is sealed every further registration into it fails with
//! `RegistryError::Sealed`; `ProgramBuilder::finish` seals everything.

use rustc_hash::FxHashMap;

use grain_ir::{Body, ExprArena, ModuleId, Name, ShapeId, SharedArena, SharedInterner, StringLookup};
use grain_value::{TagRef, Value};

use super::{visible_from, ModuleSymbols, Program, CORE_MODULE};
use crate::overload::{FunctionOverload, NativeFn, OverloadBody, OverloadId, SignatureKey};
use crate::shapes::{FieldSpec, Shape};
use crate::tags::{render_segments, TagRegistry};
use crate::RegistryError;

/// Builder for a whole program.
pub struct ProgramBuilder {
    modules: Vec<ModuleSymbols>,
    module_index: FxHashMap<Name, ModuleId>,
    tags: TagRegistry,
    interner: SharedInterner,
}

impl ProgramBuilder {
    /// Start a program whose core module holds the failure tag tree.
    pub fn new(interner: SharedInterner) -> Self {
        let mut tags = TagRegistry::new();
        if let Err(err) = tags.seed_core(&interner) {
            unreachable!("seeding an empty tag registry cannot clash: {err}");
        }
        let core_name = interner.intern(CORE_MODULE);
        let core = ModuleSymbols::new(
            ModuleId::CORE,
            core_name,
            Vec::new(),
            SharedArena::new(ExprArena::new()),
        );
        let mut module_index = FxHashMap::default();
        module_index.insert(core_name, ModuleId::CORE);
        ProgramBuilder {
            modules: vec![core],
            module_index,
            tags,
            interner,
        }
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// Add an empty module. Dependencies must already be registered.
    pub fn add_module(
        &mut self,
        name: Name,
        deps: &[Name],
        arena: SharedArena,
    ) -> Result<ModuleId, RegistryError> {
        if self.module_index.contains_key(&name) {
            return Err(RegistryError::DuplicateModule {
                name: self.interner.lookup(name).to_string(),
            });
        }
        let deps = deps
            .iter()
            .map(|dep| {
                self.module_index
                    .get(dep)
                    .copied()
                    .ok_or_else(|| RegistryError::UnknownModule {
                        name: self.interner.lookup(*dep).to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let index = u32::try_from(self.modules.len()).map_err(|_| RegistryError::Capacity {
            what: "modules".to_string(),
        })?;
        let id = ModuleId::new(index);
        self.modules.push(ModuleSymbols::new(id, name, deps, arena));
        self.module_index.insert(name, id);
        self.tags.add_module();
        tracing::debug!(module = self.interner.lookup(name), ?id, "added module");
        Ok(id)
    }

    pub fn module_id(&self, name: Name) -> Option<ModuleId> {
        self.module_index.get(&name).copied()
    }

    /// Borrow a module for registration.
    pub fn module(&mut self, id: ModuleId) -> Result<ModuleBuilder<'_>, RegistryError> {
        let symbols = self
            .modules
            .get(id.index())
            .ok_or_else(|| RegistryError::UnknownModule {
                name: format!("{id:?}"),
            })?;
        if symbols.sealed {
            return Err(RegistryError::Sealed {
                module: self.interner.lookup(symbols.name).to_string(),
            });
        }
        Ok(ModuleBuilder { program: self, id })
    }

    /// Borrow the core module, e.g. to register standard-library natives.
    pub fn core(&mut self) -> Result<ModuleBuilder<'_>, RegistryError> {
        self.module(ModuleId::CORE)
    }

    /// Seal every module and freeze the program.
    pub fn finish(mut self) -> Program {
        for index in 0..self.modules.len() {
            let keys: Vec<SignatureKey> = self.modules[index]
                .overloads
                .iter()
                .map(|o| {
                    self.shape(o.param)
                        .map(SignatureKey::of)
                        .unwrap_or_default()
                })
                .collect();
            let symbols = &mut self.modules[index];
            for (overload, key) in symbols.overloads.iter_mut().zip(keys) {
                overload.key = key;
            }
            symbols.sealed = true;
        }
        tracing::debug!(modules = self.modules.len(), "program sealed");
        Program {
            modules: self.modules,
            module_index: self.module_index,
            tags: self.tags,
            interner: self.interner,
        }
    }

    fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.modules.get(id.module.index())?.shapes.get(id.index as usize)
    }
}

/// Registration handle for one unsealed module.
pub struct ModuleBuilder<'b> {
    program: &'b mut ProgramBuilder,
    id: ModuleId,
}

impl ModuleBuilder<'_> {
    pub fn id(&self) -> ModuleId {
        self.id
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.program.interner
    }

    /// Symbols of this module, failing once sealed.
    fn symbols_mut(&mut self) -> Result<&mut ModuleSymbols, RegistryError> {
        let interner = &self.program.interner;
        let symbols = self
            .program
            .modules
            .get_mut(self.id.index())
            .ok_or_else(|| RegistryError::UnknownModule {
                name: format!("{:?}", self.id),
            })?;
        if symbols.sealed {
            return Err(RegistryError::Sealed {
                module: interner.lookup(symbols.name).to_string(),
            });
        }
        Ok(symbols)
    }

    fn name_str(&self, name: Name) -> String {
        self.program.interner.lookup(name).to_string()
    }

    // Tags

    /// Declare a tag by path. Parents must already exist in this module.
    pub fn declare_tag(
        &mut self,
        path: &[Name],
        value: Option<Value>,
    ) -> Result<TagRef, RegistryError> {
        self.symbols_mut()?;
        self.program
            .tags
            .declare(self.id, path, value, &self.program.interner)
    }

    /// Extend the tag at `origin_path` in `origin_module` with `child`
    /// (relative path, possibly empty for a bare alias).
    pub fn extend_tag(
        &mut self,
        origin_module: Name,
        origin_path: &[Name],
        child: &[Name],
        value: Option<Value>,
    ) -> Result<TagRef, RegistryError> {
        self.symbols_mut()?;
        let origin_id =
            self.program
                .module_id(origin_module)
                .ok_or_else(|| RegistryError::UnknownModule {
                    name: self.name_str(origin_module),
                })?;
        let origin = self
            .program
            .tags
            .lookup_path(&[origin_id], origin_path)
            .ok_or_else(|| RegistryError::UnknownTag {
                path: render_segments(origin_path, &self.program.interner),
            })?;
        let alias = self
            .program
            .tags
            .alias(self.id, origin, &self.program.interner)?;
        if child.is_empty() {
            return Ok(alias);
        }
        let alias_name = self
            .program
            .tags
            .node(alias)
            .map(|n| n.name)
            .ok_or_else(|| RegistryError::UnknownTag {
                path: render_segments(origin_path, &self.program.interner),
            })?;
        let mut path = Vec::with_capacity(child.len() + 1);
        path.push(alias_name);
        path.extend_from_slice(child);
        self.program
            .tags
            .declare(self.id, &path, value, &self.program.interner)
    }

    /// Resolve a tag path as seen from this module.
    pub fn lookup_tag(&self, path: &[Name]) -> Option<TagRef> {
        let visible = visible_from(&self.program.modules, self.id);
        self.program.tags.lookup_path(&visible, path)
    }

    // Shapes

    /// Reserve a named shape so constraints can reference it before its
    /// fields are known.
    pub fn declare_shape(&mut self, name: Name) -> Result<ShapeId, RegistryError> {
        let name_str = self.name_str(name);
        let id = self.id;
        let symbols = self.symbols_mut()?;
        if symbols.shape_index.contains_key(&name) {
            return Err(RegistryError::DuplicateShape { name: name_str });
        }
        let index = u32::try_from(symbols.shapes.len()).map_err(|_| RegistryError::Capacity {
            what: "shapes".to_string(),
        })?;
        let shape_id = ShapeId::new(id, index);
        symbols.shapes.push(Shape {
            id: shape_id,
            name,
            fields: Vec::new(),
        });
        symbols.shape_index.insert(name, index);
        Ok(shape_id)
    }

    /// Fill in the fields of a reserved shape.
    pub fn define_shape(&mut self, id: ShapeId, fields: Vec<FieldSpec>) -> Result<(), RegistryError> {
        let module = self.id;
        let symbols = self.symbols_mut()?;
        match symbols.shapes.get_mut(id.index as usize) {
            Some(shape) if id.module == module => {
                shape.fields = fields;
                Ok(())
            }
            _ => Err(RegistryError::UnknownShape {
                name: format!("{id:?}"),
            }),
        }
    }

    pub fn add_shape(&mut self, name: Name, fields: Vec<FieldSpec>) -> Result<ShapeId, RegistryError> {
        let id = self.declare_shape(name)?;
        self.define_shape(id, fields)?;
        Ok(id)
    }

    /// Register an unnamed shape, used for inline parameter lists.
    pub fn add_anonymous_shape(&mut self, fields: Vec<FieldSpec>) -> Result<ShapeId, RegistryError> {
        let id = self.id;
        let symbols = self.symbols_mut()?;
        let index = u32::try_from(symbols.shapes.len()).map_err(|_| RegistryError::Capacity {
            what: "shapes".to_string(),
        })?;
        let shape_id = ShapeId::new(id, index);
        symbols.shapes.push(Shape {
            id: shape_id,
            name: Name::EMPTY,
            fields,
        });
        Ok(shape_id)
    }

    /// Resolve a shape name as seen from this module.
    pub fn lookup_shape(&self, name: Name) -> Option<ShapeId> {
        visible_from(&self.program.modules, self.id)
            .into_iter()
            .find_map(|m| self.program.modules.get(m.index())?.local_shape(name))
    }

    // Overloads

    pub fn add_overload(
        &mut self,
        name: Name,
        param: ShapeId,
        body: Body,
    ) -> Result<OverloadId, RegistryError> {
        self.push_overload(name, param, OverloadBody::User(body))
    }

    /// Register a native overload over an anonymous parameter shape.
    pub fn register_native(
        &mut self,
        name: &str,
        fields: Vec<FieldSpec>,
        native: NativeFn,
    ) -> Result<OverloadId, RegistryError> {
        let name = self.program.interner.intern(name);
        let param = self.add_anonymous_shape(fields)?;
        self.push_overload(name, param, OverloadBody::Native(native))
    }

    fn push_overload(
        &mut self,
        name: Name,
        param: ShapeId,
        body: OverloadBody,
    ) -> Result<OverloadId, RegistryError> {
        let key = self
            .program
            .shape(param)
            .map(SignatureKey::of)
            .ok_or_else(|| RegistryError::UnknownShape {
                name: format!("{param:?}"),
            })?;
        let module = self.id;
        let symbols = self.symbols_mut()?;
        let index = u32::try_from(symbols.overloads.len()).map_err(|_| RegistryError::Capacity {
            what: "overloads".to_string(),
        })?;
        let id = OverloadId { module, index };
        symbols.overloads.push(FunctionOverload {
            id,
            name,
            param,
            body,
            key,
        });
        symbols.overload_index.entry(name).or_default().push(index);
        Ok(id)
    }

    /// Seal this module. Later registrations fail.
    pub fn seal(mut self) -> Result<(), RegistryError> {
        let symbols = self.symbols_mut()?;
        symbols.sealed = true;
        let name = symbols.name;
        tracing::debug!(module = self.program.interner.lookup(name), "module sealed");
        Ok(())
    }
}
