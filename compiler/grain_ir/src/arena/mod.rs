//! Expression arena.
//!
//! Each module owns one arena; function bodies, defaults, and pipeline
//! conditions are `ExprId`s into it.

use std::sync::Arc;

use crate::ast::{Expr, ExprKind};
use crate::{ExprId, Span};

/// Contiguous storage for a module's expressions.
#[derive(Clone, Debug, Default)]
pub struct ExprArena {
    exprs: Vec<Expr>,
}

impl ExprArena {
    pub fn new() -> Self {
        ExprArena { exprs: Vec::new() }
    }

    /// Allocate an expression and return its id.
    ///
    /// # Panics
    /// Panics if the arena exceeds `u32::MAX - 1` expressions.
    pub fn alloc(&mut self, expr: Expr) -> ExprId {
        let index = u32::try_from(self.exprs.len())
            .ok()
            .filter(|&i| i != u32::MAX)
            .unwrap_or_else(|| panic!("expression arena overflow"));
        self.exprs.push(expr);
        ExprId::new(index)
    }

    /// Allocate an expression kind with a dummy span.
    pub fn alloc_kind(&mut self, kind: ExprKind) -> ExprId {
        self.alloc(Expr::new(kind, Span::DUMMY))
    }

    /// Get an expression by id.
    ///
    /// # Panics
    /// Panics if `id` was not allocated by this arena.
    #[inline]
    pub fn get(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    /// Get an expression by id, `None` for foreign or invalid ids.
    #[inline]
    pub fn try_get(&self, id: ExprId) -> Option<&Expr> {
        self.exprs.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }
}

/// Arena shared between the program registry and every evaluator thread.
#[derive(Clone, Debug, Default)]
pub struct SharedArena(Arc<ExprArena>);

impl SharedArena {
    pub fn new(arena: ExprArena) -> Self {
        SharedArena(Arc::new(arena))
    }
}

impl std::ops::Deref for SharedArena {
    type Target = ExprArena;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<ExprArena> for SharedArena {
    fn from(arena: ExprArena) -> Self {
        SharedArena::new(arena)
    }
}

#[cfg(test)]
mod tests;
