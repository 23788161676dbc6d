//! Evaluator-internal errors.
//!
//! Language-level errors are failure values. `EvalError` is reserved for
//! evaluator defects and resource exhaustion: it aborts the call stack and
//! surfaces to the host.
//!
//! # Structured Error Categories
//!
//! `EvalErrorKind` carries the category; factory functions (e.g.
//! `recursion_limit_exceeded()`) are the public constructors and fill in both
//! `kind` and `message`.

use std::fmt;

use grain_ir::Span;

use crate::value::Value;

/// Result of evaluation.
pub type EvalResult = Result<Value, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    /// Call depth exceeded the configured limit.
    RecursionLimit { limit: usize },
    /// A module name did not resolve in the program.
    UnknownModule { name: String },
    /// A shape named by the AST did not resolve after sealing.
    UnknownShape { name: String },
    /// The AST referenced an expression or construct the evaluator cannot run.
    InvalidAst { detail: String },
    /// A spawned evaluator thread panicked.
    ThreadPanicked { message: String },
    /// Anything else the evaluator considers a defect.
    Internal { message: String },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RecursionLimit { limit } => {
                write!(f, "maximum recursion depth exceeded (limit: {limit})")
            }
            Self::UnknownModule { name } => write!(f, "unknown module: {name}"),
            Self::UnknownShape { name } => write!(f, "unknown shape: {name}"),
            Self::InvalidAst { detail } => write!(f, "invalid AST: {detail}"),
            Self::ThreadPanicked { message } => write!(f, "evaluator thread panicked: {message}"),
            Self::Internal { message } => write!(f, "internal evaluator error: {message}"),
        }
    }
}

/// A frame in the evaluation backtrace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BacktraceFrame {
    /// Function name, rendered.
    pub name: String,
    /// Call site.
    pub span: Option<Span>,
}

/// Call-stack snapshot taken when an error is raised.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalBacktrace {
    frames: Vec<BacktraceFrame>,
}

impl EvalBacktrace {
    /// Frames, innermost first.
    pub fn new(frames: Vec<BacktraceFrame>) -> Self {
        EvalBacktrace { frames }
    }

    pub fn frames(&self) -> &[BacktraceFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

impl fmt::Display for EvalBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frames.is_empty() {
            return Ok(());
        }
        writeln!(f, "stack backtrace:")?;
        for (i, frame) in self.frames.iter().enumerate() {
            write!(f, "  {i}: {}", frame.name)?;
            if let Some(span) = frame.span {
                write!(f, " at {span}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Evaluation error.
#[derive(Clone, Debug)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Equals `kind.to_string()` for factory-built errors.
    pub message: String,
    /// Source location where the error occurred.
    pub span: Option<Span>,
    /// Populated by the evaluator from its live call stack.
    pub backtrace: Option<EvalBacktrace>,
    /// Secondary context lines.
    pub notes: Vec<String>,
}

impl EvalError {
    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        EvalError {
            kind,
            message,
            span: None,
            backtrace: None,
            notes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Attach a backtrace unless one is already present.
    #[must_use]
    pub fn with_backtrace(mut self, backtrace: EvalBacktrace) -> Self {
        if self.backtrace.is_none() {
            self.backtrace = Some(backtrace);
        }
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        for note in &self.notes {
            write!(f, "\n  note: {note}")?;
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {}

// Factory functions

#[cold]
pub fn recursion_limit_exceeded(limit: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::RecursionLimit { limit })
}

#[cold]
pub fn unknown_module(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownModule {
        name: name.to_string(),
    })
}

#[cold]
pub fn unknown_shape(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownShape {
        name: name.to_string(),
    })
}

#[cold]
pub fn invalid_ast(detail: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidAst {
        detail: detail.into(),
    })
}

#[cold]
pub fn thread_panicked(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ThreadPanicked {
        message: message.into(),
    })
}

#[cold]
pub fn internal(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Internal {
        message: message.into(),
    })
}
