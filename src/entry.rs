//! Entry points (§4.8): drivers that set up the initial polarity and
//! environment for a class body or a typedef body, and invoke the traversal.

use crate::diagnostics::{ErrorSink, SecondaryPos, VarianceError, VarianceErrorKind, VecSink};
use crate::env::Environment;
use crate::oracle::TenvOracle;
use crate::polarity::{initial_from_annotation, PolTag, Variance};
use crate::reason::{Pos, PosDescr};
use crate::tenv::{ClassInfo, TypedefInfo, TypingEnv, Visibility};
use crate::traversal::Checker;
use crate::types::{Name, Ty, TyKind};

fn class_environment(class: &ClassInfo) -> Environment {
    let mut env = Environment::new();
    for t in &class.tparams {
        env.insert(
            t.name.clone(),
            initial_from_annotation(t.pos, PosDescr::TparamDecl, t.variance),
        );
    }
    env
}

fn typedef_environment(typedef: &TypedefInfo) -> Environment {
    let mut env = Environment::new();
    for t in &typedef.tparams {
        env.insert(
            t.name.clone(),
            initial_from_annotation(t.pos, PosDescr::TparamDecl, t.variance),
        );
    }
    env
}

/// Check a class or interface body (including `extends`/`implements`/`use`
/// clauses, passed separately since they live outside the member list in
/// most representations).
pub fn check_class(tenv: &dyn TypingEnv, class: &ClassInfo, parents: &[Ty]) -> Vec<VarianceError> {
    let mut sink = VecSink::new();
    check_class_into(tenv, class, parents, &mut sink);
    sink.into_errors()
}

/// Same as [`check_class`], but emits into caller-provided sink (useful when
/// a driver wants to accumulate diagnostics across many declarations).
pub fn check_class_into(
    tenv: &dyn TypingEnv,
    class: &ClassInfo,
    parents: &[Ty],
    sink: &mut dyn ErrorSink,
) {
    tracing::trace!(class = %class.name, tparams = class.tparams.len(), "checking class");
    let oracle = TenvOracle::new(tenv);
    let env = class_environment(class);
    let mut checker = Checker::new(&oracle, sink);

    for parent in parents {
        checker.traverse(Some(class), &Variance::Bivariant, &env, parent);
    }

    for property in &class.properties {
        if property.is_static {
            if !class.is_trait() {
                check_static_property(&property.ty, &env, property.pos, checker.sink_mut());
            }
            continue;
        }
        if property.visibility == Visibility::Private {
            continue;
        }
        let polarity = initial_from_annotation(property.pos, PosDescr::InstanceMember, PolTag::Inv);
        checker.traverse(Some(class), &polarity, &env, &property.ty);
    }

    for method in &class.methods {
        if method.visibility == Visibility::Private {
            continue;
        }
        if method.is_static {
            if class.is_final {
                continue;
            }
        } else if method.is_final {
            continue;
        }
        let polarity = Variance::Cov(Default::default());
        checker.traverse(Some(class), &polarity, &env, &method.ty);
    }
}

pub fn check_typedef(tenv: &dyn TypingEnv, typedef: &TypedefInfo) -> Vec<VarianceError> {
    let mut sink = VecSink::new();
    check_typedef_into(tenv, typedef, &mut sink);
    sink.into_errors()
}

pub fn check_typedef_into(tenv: &dyn TypingEnv, typedef: &TypedefInfo, sink: &mut dyn ErrorSink) {
    tracing::trace!(typedef = %typedef.name, "checking typedef");
    let oracle = TenvOracle::new(tenv);
    let env = typedef_environment(typedef);
    let mut checker = Checker::new(&oracle, sink);
    let polarity = initial_from_annotation(typedef.pos, PosDescr::TypedefBody, PolTag::Cov);
    checker.traverse(None, &polarity, &env, &typedef.body);
}

/// Static properties of non-trait classes never have their type traversed
/// for variance: any occurrence of a generic parameter in scope is rejected
/// outright, since each instantiation of a class shares one static slot
/// while a trait's static slot is re-typed per use (§4.8).
fn check_static_property(ty: &Ty, env: &Environment, fallback_pos: Pos, sink: &mut dyn ErrorSink) {
    let mut shadowed: Vec<Name> = Vec::new();
    scan_for_generics(ty, env, &mut shadowed, &mut |pos, name| {
        sink.emit(VarianceError {
            kind: VarianceErrorKind::StaticPropertyTypeGenericParam,
            primary: pos,
            secondaries: vec![SecondaryPos {
                pos: fallback_pos,
                message: "static property declared here".to_string(),
            }],
            type_name: name.to_string(),
        });
    });
}

fn scan_for_generics(
    ty: &Ty,
    env: &Environment,
    shadowed: &mut Vec<Name>,
    report: &mut impl FnMut(Pos, &str),
) {
    match &ty.kind {
        TyKind::Any
        | TyKind::ErrorType
        | TyKind::Mixed
        | TyKind::Nonnull
        | TyKind::Dynamic
        | TyKind::Var
        | TyKind::Prim(_)
        | TyKind::This => {}

        TyKind::Option(inner) | TyKind::Like(inner) | TyKind::Varray(inner) => {
            scan_for_generics(inner, env, shadowed, report)
        }
        TyKind::Access(inner, _) => scan_for_generics(inner, env, shadowed, report),
        TyKind::Union(tys) | TyKind::Intersection(tys) | TyKind::Tuple(tys) => {
            for t in tys {
                scan_for_generics(t, env, shadowed, report);
            }
        }
        TyKind::Darray(k, v) | TyKind::VarrayOrDarray(k, v) => {
            scan_for_generics(k, env, shadowed, report);
            scan_for_generics(v, env, shadowed, report);
        }
        TyKind::Shape(fields) => {
            for field in fields {
                scan_for_generics(&field.ty, env, shadowed, report);
            }
        }
        TyKind::Generic { name, .. } => {
            if env.contains(name.as_ref()) && !shadowed.iter().any(|s| s.as_ref() == name.as_ref())
            {
                report(ty.pos, name.as_ref());
            }
        }
        TyKind::Apply { targs, .. } => {
            for t in targs {
                scan_for_generics(t, env, shadowed, report);
            }
        }
        TyKind::Fn(f) => {
            let added = f.tparams.len();
            shadowed.extend(f.tparams.iter().map(|t| t.name.clone()));
            for (_, p) in &f.params {
                scan_for_generics(p, env, shadowed, report);
            }
            if let Some((_, v)) = &f.variadic {
                scan_for_generics(v, env, shadowed, report);
            }
            for t in &f.tparams {
                for (_, c) in &t.constraints {
                    scan_for_generics(c, env, shadowed, report);
                }
            }
            for wc in &f.where_clauses {
                scan_for_generics(&wc.lhs, env, shadowed, report);
                scan_for_generics(&wc.rhs, env, shadowed, report);
            }
            scan_for_generics(&f.ret, env, shadowed, report);
            shadowed.truncate(shadowed.len() - added);
        }
    }
}
