//! The closed type grammar the traversal descends over.
//!
//! This is the resolved type representation the surrounding type-checker
//! hands us; parsing and name resolution are out of scope (see crate docs).
//! The grammar is bit-exact with the specification's §6 type grammar, with
//! one addition: every node carries the source position it was written at,
//! since the traversal and its error messages need to refer back to it.

use std::rc::Rc;

use crate::reason::Pos;

/// Interned-ish name. Cloning an `Rc<str>` is cheap, which matters because
/// names are threaded through every reason and environment lookup.
pub type Name = Rc<str>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Prim {
    Int,
    Float,
    String,
    Bool,
    Void,
    Noreturn,
    Null,
    Resource,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShapeField {
    pub name: Name,
    pub optional: bool,
    pub ty: Ty,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    Normal,
    Inout,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    As,
    Eq,
    Super,
}

/// A method's own type parameter: its name and the constraints attached to
/// it (`T as U`, `T = U`, `T super U`). Method tparams do not carry a
/// class-style declared variance; they are bivariant with respect to the
/// enclosing class's tparams (see data model §3).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FnTParam {
    pub name: Name,
    pub pos: Pos,
    pub constraints: Vec<(ConstraintKind, Ty)>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WhereClause {
    pub lhs: Ty,
    pub kind: ConstraintKind,
    pub rhs: Ty,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FnType {
    pub params: Vec<(Mode, Ty)>,
    pub variadic: Option<(Mode, Ty)>,
    pub tparams: Vec<FnTParam>,
    pub where_clauses: Vec<WhereClause>,
    pub ret: Ty,
}

/// The resolved type expression grammar, without its position — see [`Ty`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TyKind {
    Any,
    ErrorType,
    Mixed,
    Nonnull,
    Dynamic,
    Var,
    Prim(Prim),
    Option(Box<Ty>),
    Like(Box<Ty>),
    Access(Box<Ty>, Name),
    Union(Vec<Ty>),
    Intersection(Vec<Ty>),
    Tuple(Vec<Ty>),
    Darray(Box<Ty>, Box<Ty>),
    Varray(Box<Ty>),
    VarrayOrDarray(Box<Ty>, Box<Ty>),
    Shape(Vec<ShapeField>),
    /// A reference to an in-scope generic parameter. `targs` is carried for
    /// grammar completeness but never descended: higher-kinded variance for
    /// generic-of-generic arguments is not supported by the source language
    /// yet (see DESIGN.md open question).
    Generic { name: Name, targs: Vec<Ty> },
    /// Application of a named nominal type (class or typedef) to arguments.
    Apply { name: Name, targs: Vec<Ty> },
    Fn(Box<FnType>),
    This,
}

/// A type expression: its source position plus its structural shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ty {
    pub pos: Pos,
    pub kind: TyKind,
}

impl Ty {
    pub fn new(pos: Pos, kind: TyKind) -> Self {
        Self { pos, kind }
    }

    pub fn generic(pos: Pos, name: impl Into<Name>) -> Self {
        Self::new(
            pos,
            TyKind::Generic {
                name: name.into(),
                targs: Vec::new(),
            },
        )
    }

    pub fn apply(pos: Pos, name: impl Into<Name>, targs: Vec<Ty>) -> Self {
        Self::new(
            pos,
            TyKind::Apply {
                name: name.into(),
                targs,
            },
        )
    }

    pub fn boxed(pos: Pos, kind: TyKind) -> Box<Self> {
        Box::new(Self::new(pos, kind))
    }
}
