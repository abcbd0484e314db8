//! The structural traversal: `type_` descends the type grammar carrying a
//! current polarity and environment, applying the polarity algebra at each
//! constructor (§4.4), checking uses of in-scope generics (§4.5), and
//! propagating transitive obligations through function tparam bounds (§4.7).

use rustc_hash::{FxHashMap, FxHashSet};

use crate::diagnostics::{ErrorSink, SecondaryPos, VarianceError, VarianceErrorKind};
use crate::env::Environment;
use crate::oracle::NominalOracle;
use crate::polarity::{compose, flip, initial_from_annotation, PolTag, Variance};
use crate::reason::{render, Pos, PosDescr};
use crate::tenv::ClassInfo;
use crate::types::{ConstraintKind, FnType, Mode, Name, Ty, TyKind};

#[derive(Default, Clone, Copy)]
struct ObservedUse {
    cov: bool,
    contra: bool,
}

struct TrackingFrame {
    names: FxHashSet<Name>,
    obs: FxHashMap<Name, ObservedUse>,
}

/// Drives one `check_class`/`check_typedef` invocation. Holds no state that
/// outlives it beyond the errors it emits; a fresh `Checker` per declaration
/// is how the collaborators' "independent, deterministic per-declaration"
/// contract (§5) is upheld.
pub struct Checker<'o, 's> {
    oracle: &'o dyn NominalOracle,
    sink: &'s mut dyn ErrorSink,
    tracking: Vec<TrackingFrame>,
}

impl<'o, 's> Checker<'o, 's> {
    pub fn new(oracle: &'o dyn NominalOracle, sink: &'s mut dyn ErrorSink) -> Self {
        Self {
            oracle,
            sink,
            tracking: Vec::new(),
        }
    }

    pub fn sink_mut(&mut self) -> &mut dyn ErrorSink {
        &mut *self.sink
    }

    /// The structural traversal itself — `type_(root, currentPolarity, env, ty)`.
    pub fn traverse(&mut self, root: Option<&ClassInfo>, polarity: &Variance, env: &Environment, ty: &Ty) {
        match &ty.kind {
            TyKind::Any
            | TyKind::ErrorType
            | TyKind::Mixed
            | TyKind::Nonnull
            | TyKind::Dynamic
            | TyKind::Var
            | TyKind::Prim(_) => {}

            TyKind::This => self.check_this(root, polarity, ty.pos),

            TyKind::Option(inner) | TyKind::Like(inner) => self.traverse(root, polarity, env, inner),
            TyKind::Access(inner, _) => self.traverse(root, polarity, env, inner),

            TyKind::Union(tys) | TyKind::Intersection(tys) | TyKind::Tuple(tys) => {
                for t in tys {
                    self.traverse(root, polarity, env, t);
                }
            }

            TyKind::Darray(k, v) | TyKind::VarrayOrDarray(k, v) => {
                self.traverse(root, polarity, env, k);
                self.traverse(root, polarity, env, v);
            }
            TyKind::Varray(inner) => self.traverse(root, polarity, env, inner),

            TyKind::Shape(fields) => {
                for field in fields {
                    self.traverse(root, polarity, env, &field.ty);
                }
            }

            TyKind::Generic { name, .. } => {
                self.record_local_use(name, polarity);
                self.check_use(env, polarity, name, ty.pos);
            }

            TyKind::Apply { name, targs } => {
                let declared = self.oracle.declared_variances(name);
                for (declared_i, t_i) in declared.iter().zip(targs.iter()) {
                    let descr = PosDescr::TypeArgument(name.clone());
                    let v = compose(t_i.pos, descr, polarity, declared_i);
                    self.traverse(root, &v, env, t_i);
                }
            }

            TyKind::Fn(f) => self.traverse_fn(root, polarity, env, f),
        }
    }

    fn check_this(&mut self, root: Option<&ClassInfo>, polarity: &Variance, pos: Pos) {
        let Some(class) = root else { return };
        // Final classes cannot be subtyped, so `this` is exactly the class
        // itself there and no polarity is unsound (see DESIGN.md for why
        // this is the inverse of a literal reading of §4.4's prose).
        if class.is_final {
            return;
        }
        if polarity.tag() != Some(PolTag::Contra) {
            return;
        }
        if !class
            .tparams
            .iter()
            .any(|t| matches!(t.variance, PolTag::Cov | PolTag::Contra))
        {
            return;
        }

        let refined = polarity.refine_head_pos(pos);
        let secondaries = match refined.stack_for_tag(PolTag::Contra) {
            Some(stack) if !stack.is_empty() => {
                render(stack).into_iter().map(SecondaryPos::from).collect()
            }
            _ => vec![SecondaryPos {
                pos,
                message: "`this` is used in a contravariant position here".to_string(),
            }],
        };

        self.sink.emit(VarianceError {
            kind: VarianceErrorKind::ContravariantThis,
            primary: class.pos,
            secondaries,
            type_name: class.name.to_string(),
        });
    }

    fn check_use(&mut self, env: &Environment, observed: &Variance, name: &str, pos: Pos) {
        let refined = observed.refine_head_pos(pos);
        let declared = env.get(name);

        let (Some(declared_tag), Some(observed_tag)) = (declared.tag(), refined.tag()) else {
            return;
        };

        let (kind, proof_tag) = match (declared_tag, observed_tag) {
            (PolTag::Inv, _) => return,
            (PolTag::Cov, PolTag::Cov) => return,
            (PolTag::Contra, PolTag::Contra) => return,
            (PolTag::Cov, PolTag::Contra) => (VarianceErrorKind::DeclaredCovariant, PolTag::Contra),
            (PolTag::Cov, PolTag::Inv) => (VarianceErrorKind::DeclaredCovariant, PolTag::Contra),
            (PolTag::Contra, PolTag::Cov) => (VarianceErrorKind::DeclaredContravariant, PolTag::Cov),
            (PolTag::Contra, PolTag::Inv) => (VarianceErrorKind::DeclaredContravariant, PolTag::Cov),
        };

        let primary = declared.head().map(|r| r.pos).unwrap_or(pos);
        let stack = refined
            .stack_for_tag(proof_tag)
            .or_else(|| refined.stack_for_tag(observed_tag))
            .unwrap_or(&[]);
        let secondaries = if stack.is_empty() {
            vec![SecondaryPos {
                pos,
                message: "used here".to_string(),
            }]
        } else {
            render(stack).into_iter().map(SecondaryPos::from).collect()
        };

        self.sink.emit(VarianceError {
            kind,
            primary,
            secondaries,
            type_name: name.to_string(),
        });
    }

    fn record_local_use(&mut self, name: &str, polarity: &Variance) {
        let Some(tag) = polarity.tag() else { return };
        for frame in self.tracking.iter_mut().rev() {
            if let Some(owned) = frame.names.get(name).cloned() {
                let entry = frame.obs.entry(owned).or_default();
                match tag {
                    PolTag::Cov => entry.cov = true,
                    PolTag::Contra => entry.contra = true,
                    PolTag::Inv => {
                        entry.cov = true;
                        entry.contra = true;
                    }
                }
                return;
            }
        }
    }

    fn traverse_fn(&mut self, root: Option<&ClassInfo>, polarity: &Variance, env: &Environment, f: &FnType) {
        let own_names: FxHashSet<Name> = f.tparams.iter().map(|t| t.name.clone()).collect();
        let inner_env = env.without(own_names.iter().cloned());

        self.tracking.push(TrackingFrame {
            names: own_names,
            obs: FxHashMap::default(),
        });

        for (mode, ty) in &f.params {
            let param_polarity = self.param_polarity(*mode, polarity, ty.pos);
            self.traverse(root, &param_polarity, &inner_env, ty);
        }
        if let Some((mode, ty)) = &f.variadic {
            let param_polarity = self.param_polarity(*mode, polarity, ty.pos);
            self.traverse(root, &param_polarity, &inner_env, ty);
        }

        for tparam in &f.tparams {
            for (kind, ty) in &tparam.constraints {
                let (descr, tag) = bound_polarity_for(*kind);
                let bound_polarity = initial_from_annotation(ty.pos, descr, tag);
                self.traverse(root, &bound_polarity, &inner_env, ty);
            }
        }

        for wc in &f.where_clauses {
            let (left_descr, left_tag, right_descr, right_tag) = where_polarities_for(wc.kind);
            let left_polarity = initial_from_annotation(wc.lhs.pos, left_descr, left_tag);
            self.traverse(root, &left_polarity, &inner_env, &wc.lhs);
            let right_polarity = initial_from_annotation(wc.rhs.pos, right_descr, right_tag);
            self.traverse(root, &right_polarity, &inner_env, &wc.rhs);
        }

        let ret_to = initial_from_annotation(f.ret.pos, PosDescr::FnReturn, PolTag::Cov);
        let ret_polarity = compose(f.ret.pos, PosDescr::FnReturn, polarity, &ret_to);
        self.traverse(root, &ret_polarity, &inner_env, &f.ret);

        if let Some(frame) = self.tracking.pop() {
            for tparam in &f.tparams {
                let obs = frame.obs.get(&tparam.name).copied().unwrap_or_default();
                if obs.cov {
                    for bound in lower_bounds(f, &tparam.name) {
                        let polarity =
                            initial_from_annotation(bound.pos, PosDescr::MethodBoundSuper, PolTag::Cov);
                        self.traverse(root, &polarity, env, bound);
                    }
                }
                if obs.contra {
                    for bound in upper_bounds(f, &tparam.name) {
                        let polarity =
                            initial_from_annotation(bound.pos, PosDescr::MethodBoundAs, PolTag::Contra);
                        self.traverse(root, &polarity, env, bound);
                    }
                }
            }
        }
    }

    fn param_polarity(&self, mode: Mode, outer: &Variance, pos: Pos) -> Variance {
        match mode {
            Mode::Normal => flip(pos, PosDescr::FnParameter, outer),
            Mode::Inout => initial_from_annotation(pos, PosDescr::InoutParameter, PolTag::Inv),
        }
    }
}

fn bound_polarity_for(kind: ConstraintKind) -> (PosDescr, PolTag) {
    match kind {
        ConstraintKind::As => (PosDescr::MethodBoundAs, PolTag::Contra),
        ConstraintKind::Super => (PosDescr::MethodBoundSuper, PolTag::Cov),
        ConstraintKind::Eq => (PosDescr::MethodBoundEq, PolTag::Inv),
    }
}

fn where_polarities_for(kind: ConstraintKind) -> (PosDescr, PolTag, PosDescr, PolTag) {
    match kind {
        ConstraintKind::As => (
            PosDescr::WhereAsLeft,
            PolTag::Cov,
            PosDescr::WhereAsRight,
            PolTag::Contra,
        ),
        ConstraintKind::Super => (
            PosDescr::WhereSuperLeft,
            PolTag::Contra,
            PosDescr::WhereSuperRight,
            PolTag::Cov,
        ),
        ConstraintKind::Eq => (PosDescr::WhereEq, PolTag::Inv, PosDescr::WhereEq, PolTag::Inv),
    }
}

fn is_generic_named(ty: &Ty, name: &str) -> bool {
    matches!(&ty.kind, TyKind::Generic { name: n, .. } if n.as_ref() == name)
}

/// Lower bounds of `name`: its own `super`/`eq` constraints, plus where-clauses
/// of shape `where _ as name` or `where name super _` (§4.7).
fn lower_bounds<'f>(f: &'f FnType, name: &str) -> Vec<&'f Ty> {
    let mut out = Vec::new();
    if let Some(tparam) = f.tparams.iter().find(|t| t.name.as_ref() == name) {
        for (kind, ty) in &tparam.constraints {
            if matches!(kind, ConstraintKind::Super | ConstraintKind::Eq) {
                out.push(ty);
            }
        }
    }
    for wc in &f.where_clauses {
        match wc.kind {
            ConstraintKind::As if is_generic_named(&wc.rhs, name) => out.push(&wc.lhs),
            ConstraintKind::Super if is_generic_named(&wc.lhs, name) => out.push(&wc.rhs),
            _ => {}
        }
    }
    out
}

/// Upper bounds of `name`: its own `as`/`eq` constraints, plus where-clauses
/// of shape `where name as _` or `where _ super name` (§4.7).
fn upper_bounds<'f>(f: &'f FnType, name: &str) -> Vec<&'f Ty> {
    let mut out = Vec::new();
    if let Some(tparam) = f.tparams.iter().find(|t| t.name.as_ref() == name) {
        for (kind, ty) in &tparam.constraints {
            if matches!(kind, ConstraintKind::As | ConstraintKind::Eq) {
                out.push(ty);
            }
        }
    }
    for wc in &f.where_clauses {
        match wc.kind {
            ConstraintKind::As if is_generic_named(&wc.lhs, name) => out.push(&wc.rhs),
            ConstraintKind::Super if is_generic_named(&wc.rhs, name) => out.push(&wc.lhs),
            _ => {}
        }
    }
    out
}
