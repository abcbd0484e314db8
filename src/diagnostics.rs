//! Structured error records and the error sink collaborator (§6, §7).
//!
//! The core never renders these to text itself beyond producing the
//! `message` strings attached to each position — turning a `VarianceError`
//! into a user-facing report (grouping, colorizing, deduplicating across a
//! whole compilation) is the external reporter's job.

use crate::reason::{Pos, RenderedFrame};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VarianceErrorKind {
    /// A covariant-declared parameter was used contravariantly or invariantly.
    DeclaredCovariant,
    /// A contravariant-declared parameter was used covariantly or invariantly.
    DeclaredContravariant,
    /// `this` was used contravariantly within a class that cannot safely
    /// permit it.
    ContravariantThis,
    /// A generic parameter appeared in the type of a static property outside
    /// a trait.
    StaticPropertyTypeGenericParam,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecondaryPos {
    pub pos: Pos,
    pub message: String,
}

impl From<RenderedFrame> for SecondaryPos {
    fn from(frame: RenderedFrame) -> Self {
        SecondaryPos {
            pos: frame.pos,
            message: frame.message,
        }
    }
}

/// A fully formed diagnostic, ready to be handed to the external reporter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VarianceError {
    pub kind: VarianceErrorKind,
    /// The declaration site (for `DeclaredCovariant`/`DeclaredContravariant`)
    /// or the offending construct's own position (other kinds).
    pub primary: Pos,
    pub secondaries: Vec<SecondaryPos>,
    /// The stripped name of the generic parameter or type involved.
    pub type_name: String,
}

/// Accepts structured error records. Concurrent reads of the nominal oracle
/// and atomic appends to the sink are the collaborator's contract (§5); nothing
/// here requires the core itself to be thread-aware.
pub trait ErrorSink {
    fn emit(&mut self, error: VarianceError);
}

/// Logs every emitted error at `trace` level before handing it to `inner`.
/// Handy for wiring into a driver's existing `tracing` subscriber without
/// threading a logging call through every call site that can fail a check.
pub struct TracingSink<'a> {
    inner: &'a mut dyn ErrorSink,
}

impl<'a> TracingSink<'a> {
    pub fn new(inner: &'a mut dyn ErrorSink) -> Self {
        Self { inner }
    }
}

impl<'a> ErrorSink for TracingSink<'a> {
    fn emit(&mut self, error: VarianceError) {
        tracing::trace!(
            kind = ?error.kind,
            primary = error.primary,
            type_name = %error.type_name,
            "variance error"
        );
        self.inner.emit(error);
    }
}

/// A plain in-memory sink, handy for tests and for single-threaded drivers.
#[derive(Default, Debug)]
pub struct VecSink(pub Vec<VarianceError>);

impl ErrorSink for VecSink {
    fn emit(&mut self, error: VarianceError) {
        self.0.push(error);
    }
}

impl VecSink {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn into_errors(self) -> Vec<VarianceError> {
        self.0
    }
}
