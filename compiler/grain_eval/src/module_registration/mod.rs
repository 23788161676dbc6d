//! Module registration: lowering a parsed module into the program registry.
//!
//! Hosts build a `ProgramBuilder`, call [`register_module`] once per module
//! in dependency order, then `finish()` it. Each module is lowered in a fixed
//! order so later items can refer to earlier ones:
//!
//! 1. tags and tag extensions, in declaration order
//! 2. shape names, then shape fields (shapes may reference each other in
//!    any order within the module)
//! 3. function overloads, with named or inline parameter shapes
//!
//! The module is sealed once its last item is registered.

use grain_ir::ast::{ConstraintDef, FieldSpecDef, Item, Literal, Module, ParamDef};
use grain_ir::{ModuleId, StringInterner, TagPath};
use grain_types::{Constraint, FieldSpec, ModuleBuilder, ProgramBuilder, RegistryError};
use grain_value::Value;

/// Runtime value of a literal.
pub fn literal_value(lit: Literal, interner: &StringInterner) -> Value {
    match lit {
        Literal::Int(n) => Value::Int(n),
        Literal::Float(x) => Value::Float(x),
        Literal::Bool(b) => Value::Bool(b),
        Literal::Str(name) => Value::string(interner.lookup(name)),
        Literal::Void => Value::Void,
    }
}

/// Register every item of `module` and seal it.
///
/// Dependencies named by the module must already be registered.
#[tracing::instrument(level = "debug", skip_all, fields(module = builder.interner().lookup(module.name)))]
pub fn register_module(
    builder: &mut ProgramBuilder,
    module: &Module,
) -> Result<ModuleId, RegistryError> {
    let id = builder.add_module(module.name, &module.deps, module.arena.clone())?;
    let mut m = builder.module(id)?;
    register_tags(&mut m, module)?;
    register_shapes(&mut m, module)?;
    register_functions(&mut m, module)?;
    m.seal()?;
    Ok(id)
}

fn register_tags(m: &mut ModuleBuilder<'_>, module: &Module) -> Result<(), RegistryError> {
    for item in &module.items {
        let Item::Tag(def) = item else { continue };
        let value = def.value.map(|lit| literal_value(lit, m.interner()));
        match &def.extends {
            Some(origin) => {
                m.extend_tag(
                    origin.module,
                    &origin.path.segments,
                    &def.path.segments,
                    value,
                )?;
            }
            None => {
                m.declare_tag(&def.path.segments, value)?;
            }
        }
    }
    Ok(())
}

fn register_shapes(m: &mut ModuleBuilder<'_>, module: &Module) -> Result<(), RegistryError> {
    let mut declared = Vec::new();
    for item in &module.items {
        if let Item::Shape(def) = item {
            declared.push((m.declare_shape(def.name)?, def));
        }
    }
    for (id, def) in declared {
        let fields = lower_fields(m, &def.fields)?;
        m.define_shape(id, fields)?;
    }
    Ok(())
}

fn register_functions(m: &mut ModuleBuilder<'_>, module: &Module) -> Result<(), RegistryError> {
    for item in &module.items {
        let Item::Function(def) = item else { continue };
        let param = match &def.param {
            ParamDef::Shape(name) => {
                m.lookup_shape(*name)
                    .ok_or_else(|| RegistryError::UnknownShape {
                        name: m.interner().lookup(*name).to_string(),
                    })?
            }
            ParamDef::Inline(fields) => {
                let fields = lower_fields(m, fields)?;
                m.add_anonymous_shape(fields)?
            }
        };
        m.add_overload(def.name, param, def.body.clone())?;
    }
    Ok(())
}

fn lower_fields(
    m: &ModuleBuilder<'_>,
    defs: &[FieldSpecDef],
) -> Result<Vec<FieldSpec>, RegistryError> {
    defs.iter().map(|def| lower_field(m, def)).collect()
}

fn lower_field(m: &ModuleBuilder<'_>, def: &FieldSpecDef) -> Result<FieldSpec, RegistryError> {
    let shape = |name| {
        m.lookup_shape(name).ok_or_else(|| RegistryError::UnknownShape {
            name: m.interner().lookup(name).to_string(),
        })
    };
    let constraint = match &def.constraint {
        ConstraintDef::Any => Constraint::Any,
        ConstraintDef::Scalar(scalar) => Constraint::Scalar(*scalar),
        ConstraintDef::Shape(name) => Constraint::Shape(shape(*name)?),
        ConstraintDef::Union(names) => Constraint::Union(
            names
                .iter()
                .map(|name| shape(*name))
                .collect::<Result<_, _>>()?,
        ),
    };
    let tag = def.tag.as_ref().map(|path| lookup_tag(m, path)).transpose()?;
    Ok(FieldSpec {
        name: def.name,
        constraint,
        tag,
        default: def.default,
        required: def.required,
    })
}

fn lookup_tag(
    m: &ModuleBuilder<'_>,
    path: &TagPath,
) -> Result<grain_value::TagRef, RegistryError> {
    m.lookup_tag(&path.segments)
        .ok_or_else(|| RegistryError::UnknownTag {
            path: render_path(m.interner(), path),
        })
}

fn render_path(interner: &StringInterner, path: &TagPath) -> String {
    let segments: Vec<&str> = path.segments.iter().map(|s| interner.lookup(*s)).collect();
    format!("#{}", segments.join("."))
}
