//! Function overloads.
//!
//! User bodies and native (standard-library) bodies share one record type, so
//! dispatch treats them identically.

use std::fmt;

use grain_ir::{Body, ModuleId, Name, ShapeId};
use grain_value::{EvalResult, Structure};

use crate::program::Program;
use crate::shapes::Shape;

/// Native implementation.
pub type NativeFn = fn(&NativeCall<'_>) -> EvalResult;

/// Arguments handed to a native body.
pub struct NativeCall<'a> {
    /// Argument morphed into the overload's parameter shape.
    pub input: &'a Structure,
    pub program: &'a Program,
    /// Module the overload belongs to.
    pub module: ModuleId,
}

impl NativeCall<'_> {
    /// Value of a named input field.
    pub fn field(&self, name: &str) -> Option<&grain_value::Value> {
        let name = self.program.interner().get(name)?;
        self.input.get(name)
    }
}

#[derive(Clone)]
pub enum OverloadBody {
    User(Body),
    Native(NativeFn),
}

impl fmt::Debug for OverloadBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverloadBody::User(body) => write!(f, "User({} stmts)", body.stmts.len()),
            OverloadBody::Native(_) => f.write_str("Native"),
        }
    }
}

/// Stable address of an overload.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct OverloadId {
    pub module: ModuleId,
    pub index: u32,
}

/// Precomputed from the parameter shape at registration.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct SignatureKey {
    /// Fields that must bind from the argument.
    pub mandatory: u32,
    pub named: u32,
    pub tagged: u32,
}

impl SignatureKey {
    pub fn of(shape: &Shape) -> Self {
        let fields = &shape.fields;
        SignatureKey {
            mandatory: saturate(fields.iter().filter(|f| f.is_mandatory()).count()),
            named: saturate(fields.iter().filter(|f| f.name.is_some()).count()),
            tagged: saturate(fields.iter().filter(|f| f.tag.is_some()).count()),
        }
    }

    /// Cheap rejection before matching: every mandatory field needs a
    /// distinct argument field.
    pub fn admits(&self, arg: &Structure) -> bool {
        usize::try_from(self.mandatory).is_ok_and(|m| m <= arg.len())
    }
}

fn saturate(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[derive(Clone, Debug)]
pub struct FunctionOverload {
    pub id: OverloadId,
    pub name: Name,
    pub param: ShapeId,
    pub body: OverloadBody,
    pub key: SignatureKey,
}

impl FunctionOverload {
    pub fn module(&self) -> ModuleId {
        self.id.module
    }

    pub fn is_native(&self) -> bool {
        matches!(self.body, OverloadBody::Native(_))
    }
}
