//! Per-call validation context.
//!
//! A [`Context`] is owned by exactly one top-level check and threaded
//! through every combinator call: the current path prefix, the error
//! sink, and the recursion guard all live here. There is no ambient or
//! global state, so concurrent checks simply use separate contexts.

use std::collections::HashSet;

use crate::compile::CellId;
use crate::error::{ErrorKind, PathSegment, ValidationError};
use crate::value::ValueId;

/// Where structured errors go.
#[derive(Debug)]
enum ErrorSink {
    /// Drop errors without allocating. The cheapest path.
    Silent,
    /// Collect errors into the owned buffer.
    Collect(Vec<ValidationError>),
}

/// Mutable state for one top-level validation call.
#[derive(Debug)]
pub struct Context {
    path: Vec<PathSegment>,
    sink: ErrorSink,
    /// Recursion guard: (recursion cell, value) pairs currently being
    /// verified by an ancestor call.
    guard: HashSet<(CellId, ValueId)>,
}

impl Context {
    /// Create a silent context. Errors are discarded.
    pub fn silent() -> Self {
        Self {
            path: Vec::new(),
            sink: ErrorSink::Silent,
            guard: HashSet::new(),
        }
    }

    /// Create a collecting context.
    pub fn collecting() -> Self {
        Self {
            path: Vec::new(),
            sink: ErrorSink::Collect(Vec::new()),
            guard: HashSet::new(),
        }
    }

    /// Current path prefix.
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    /// Errors collected so far. Empty for silent contexts.
    pub fn errors(&self) -> &[ValidationError] {
        match &self.sink {
            ErrorSink::Silent => &[],
            ErrorSink::Collect(errors) => errors,
        }
    }

    /// Consume the context, yielding collected errors.
    pub fn into_errors(self) -> Vec<ValidationError> {
        match self.sink {
            ErrorSink::Silent => Vec::new(),
            ErrorSink::Collect(errors) => errors,
        }
    }

    /// Append an error at the current path, if collecting.
    pub(crate) fn error(&mut self, kind: ErrorKind, target: impl Into<String>) {
        if let ErrorSink::Collect(errors) = &mut self.sink {
            errors.push(ValidationError {
                kind,
                target: target.into(),
                path: self.path.clone(),
            });
        }
    }

    /// Descend one path step for the duration of `f`.
    pub(crate) fn with_segment<R>(
        &mut self,
        segment: PathSegment,
        f: impl FnOnce(&mut Context) -> R,
    ) -> R {
        self.path.push(segment);
        let out = f(self);
        self.path.pop();
        out
    }

    /// Run `f` with the sink silenced, keeping path and guard intact.
    ///
    /// Used by `Union` branch probing and `Record` entry checks, both of
    /// which need results without surfacing child errors.
    pub(crate) fn silenced<R>(&mut self, f: impl FnOnce(&mut Context) -> R) -> R {
        let saved = std::mem::replace(&mut self.sink, ErrorSink::Silent);
        let out = f(self);
        self.sink = saved;
        out
    }

    /// Enter a (cell, value) pair. Returns `false` if an ancestor call is
    /// already verifying this pair, in which case the caller must treat
    /// the pair as vacuously valid and must not exit it.
    pub(crate) fn guard_enter(&mut self, cell: CellId, value: ValueId) -> bool {
        self.guard.insert((cell, value))
    }

    /// Leave a (cell, value) pair on return from a recursion point.
    pub(crate) fn guard_exit(&mut self, cell: CellId, value: ValueId) {
        self.guard.remove(&(cell, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_discards() {
        let mut ctx = Context::silent();
        ctx.error(ErrorKind::InvalidType, "number");
        assert!(ctx.errors().is_empty());
        assert!(ctx.into_errors().is_empty());
    }

    #[test]
    fn test_collect_records_path() {
        let mut ctx = Context::collecting();
        ctx.with_segment(PathSegment::from("items"), |ctx| {
            ctx.with_segment(PathSegment::from(2usize), |ctx| {
                ctx.error(ErrorKind::InvalidType, "string");
            });
        });
        assert!(ctx.path().is_empty());

        let errors = ctx.into_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].path,
            vec![PathSegment::Key("items".into()), PathSegment::Index(2)]
        );
    }

    #[test]
    fn test_silenced_restores_sink() {
        let mut ctx = Context::collecting();
        ctx.silenced(|ctx| ctx.error(ErrorKind::InvalidType, "number"));
        assert!(ctx.errors().is_empty());

        ctx.error(ErrorKind::InvalidType, "string");
        assert_eq!(ctx.errors().len(), 1);
    }

    #[test]
    fn test_guard_enter_exit() {
        let mut ctx = Context::silent();
        let pair = (CellId(0), ValueId(1));
        assert!(ctx.guard_enter(pair.0, pair.1));
        assert!(!ctx.guard_enter(pair.0, pair.1));
        ctx.guard_exit(pair.0, pair.1);
        assert!(ctx.guard_enter(pair.0, pair.1));
    }
}
