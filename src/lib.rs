//! Declaration-site variance checking for a nominally-typed generic object
//! language, in the style of a single pass over an already-resolved type
//! representation.
//!
//! The crate is organized the way the algorithm is described:
//!
//! - [`reason`] — position descriptors and the reason chains that explain an
//!   inferred polarity.
//! - [`polarity`] — the polarity algebra itself: `flip`, `compose`, and the
//!   `Variance` lattice built on top of [`PolTag`](polarity::PolTag).
//! - [`types`] — the closed type grammar the traversal descends over.
//! - [`env`] — the in-scope generic-parameter environment.
//! - [`tenv`] — the `TypingEnv` collaborator interface and the class/typedef
//!   shapes it hands back.
//! - [`oracle`] — the nominal variance oracle, a thin projection over
//!   `TypingEnv`.
//! - [`diagnostics`] — structured error records and the `ErrorSink`
//!   collaborator.
//! - [`traversal`] — the structural traversal (`Checker`) that drives the
//!   algebra over a type expression.
//! - [`entry`] — the `check_class`/`check_typedef` entry points that set up
//!   the initial polarity and environment for a declaration.
//!
//! None of the surrounding type-checker's concerns — parsing, name
//! resolution, the actual class/typedef table — are implemented here; see
//! the collaborator traits in `tenv` and `oracle` for the boundary.

pub mod diagnostics;
pub mod entry;
pub mod env;
pub mod oracle;
pub mod polarity;
pub mod reason;
pub mod tenv;
pub mod traversal;
pub mod types;

pub use diagnostics::{ErrorSink, SecondaryPos, VarianceError, VarianceErrorKind, VecSink};
pub use entry::{check_class, check_class_into, check_typedef, check_typedef_into};
pub use env::Environment;
pub use oracle::{NominalOracle, TenvOracle};
pub use polarity::{compose, flip, initial_from_annotation, PolTag, Variance};
pub use reason::{render, Pos, PosDescr, Reason, RenderedFrame};
pub use tenv::{
    ClassInfo, ClassKind, ClassTParam, MethodInfo, NominalDecl, PropertyInfo, TypedefInfo,
    TypingEnv, Visibility, AWAITABLE,
};
pub use traversal::Checker;
pub use types::{
    ConstraintKind, FnTParam, FnType, Mode, Name, Prim, ShapeField, Ty, TyKind, WhereClause,
};
