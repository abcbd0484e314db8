//! Collaborator interfaces consumed by the core (§6 of the specification).
//!
//! None of this is owned by the variance checker: name resolution, the
//! class/typedef lookup service, and the declared-type representation all
//! live in the surrounding type-checker. This module only declares the
//! shape the core expects from them.

use crate::polarity::PolTag;
use crate::reason::Pos;
use crate::types::{ConstraintKind, Name, Ty};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Interface,
    Trait,
}

/// A class or interface's own type parameter: name, declaration position,
/// declared variance annotation, and its bounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassTParam {
    pub name: Name,
    pub pos: Pos,
    pub variance: PolTag,
    pub constraints: Vec<(ConstraintKind, Ty)>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyInfo {
    pub name: Name,
    pub pos: Pos,
    pub visibility: Visibility,
    pub is_static: bool,
    pub ty: Ty,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodInfo {
    pub name: Name,
    pub pos: Pos,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    /// Always a `Ty::Fn`; kept as `Ty` so callers don't need to unwrap twice.
    pub ty: Ty,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassInfo {
    pub name: Name,
    pub pos: Pos,
    pub is_final: bool,
    pub kind: ClassKind,
    pub tparams: Vec<ClassTParam>,
    pub properties: Vec<PropertyInfo>,
    pub methods: Vec<MethodInfo>,
}

impl ClassInfo {
    pub fn is_trait(&self) -> bool {
        matches!(self.kind, ClassKind::Trait)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypedefInfo {
    pub name: Name,
    pub pos: Pos,
    pub tparams: Vec<ClassTParam>,
    pub body: Ty,
}

pub enum NominalDecl<'a> {
    Class(&'a ClassInfo),
    Typedef(&'a TypedefInfo),
}

/// Read-only accessor over the typing environment. Concurrent reads must be
/// safe — the collaborator's contract, not the core's (see §5).
pub trait TypingEnv {
    fn lookup_class_or_typedef(&self, name: &str) -> Option<NominalDecl<'_>>;
}

/// The canonical name of the built-in awaitable type, which is given a
/// synthetic covariant parameter regardless of its own (possibly absent)
/// declaration — it lives in a prelude that may not be loaded (§4.3).
pub const AWAITABLE: &str = "Awaitable";
