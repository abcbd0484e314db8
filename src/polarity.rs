//! The polarity algebra: the closed domain of polarities and the operations
//! (`flip`, `compose`, `initial_from_annotation`) defined over it.
//!
//! This is the smallest, most load-bearing piece of the checker. Every other
//! module (the traversal, the entry points) is a consumer of this algebra.

use smallvec::SmallVec;

use crate::reason::{Pos, PosDescr, Reason};

/// The tag of a polarity, stripped of its proof. Used for comparisons in
/// `traversal::check_use` and the composition sign table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PolTag {
    Cov,
    Contra,
    Inv,
}

/// Reason stacks are small (bounded by type-expression nesting depth) and
/// built by repeated single-element pushes, so a `SmallVec` avoids a heap
/// allocation for the common shallow case.
pub type ReasonStack = SmallVec<[Reason; 4]>;

/// An inferred variance: the polarity a parameter is observed to occupy,
/// together with the proof(s) that justify it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Variance {
    /// Appeared only in covariant positions.
    Cov(ReasonStack),
    /// Appeared only in contravariant positions.
    Contra(ReasonStack),
    /// Appeared in both; both proofs are retained.
    Inv(ReasonStack, ReasonStack),
    /// Did not appear, or is not in scope (e.g. a method's own tparam).
    Bivariant,
}

impl Variance {
    pub fn tag(&self) -> Option<PolTag> {
        match self {
            Variance::Cov(_) => Some(PolTag::Cov),
            Variance::Contra(_) => Some(PolTag::Contra),
            Variance::Inv(_, _) => Some(PolTag::Inv),
            Variance::Bivariant => None,
        }
    }

    /// The head (innermost) reason of the covariant-or-only stack, if any.
    /// For `Inv`, both the cov and contra proofs have their own head; this
    /// returns the cov one, which is what declaration-site errors want.
    pub fn head(&self) -> Option<&Reason> {
        match self {
            Variance::Cov(s) | Variance::Contra(s) => s.first(),
            Variance::Inv(cov, _) => cov.first(),
            Variance::Bivariant => None,
        }
    }

    /// The proof stack matching a specific tag; for `Inv` this picks the
    /// cov or contra side as requested. Used when reporting an error to
    /// render the relevant chain.
    pub fn stack_for_tag(&self, tag: PolTag) -> Option<&[Reason]> {
        match (self, tag) {
            (Variance::Cov(s), PolTag::Cov) | (Variance::Contra(s), PolTag::Contra) => {
                Some(s.as_slice())
            }
            (Variance::Inv(cov, _), PolTag::Cov) => Some(cov.as_slice()),
            (Variance::Inv(_, contra), PolTag::Contra) => Some(contra.as_slice()),
            _ => None,
        }
    }

    /// The head reason matching a specific observed tag; used when reporting
    /// an error against an `Inv` observation to pick the relevant proof.
    pub fn head_for_tag(&self, tag: PolTag) -> Option<&Reason> {
        self.stack_for_tag(tag).and_then(|s| s.first())
    }

    fn single(reason: Reason) -> ReasonStack {
        let mut s = SmallVec::new();
        s.push(reason);
        s
    }

    /// Non-destructively replace the head reason's position with a more
    /// precise one, keeping its descriptor and tag. See "Position refinement"
    /// in the design notes.
    pub fn refine_head_pos(&self, pos: Pos) -> Variance {
        match self {
            Variance::Cov(s) => {
                let mut s = s.clone();
                if let Some(head) = s.first() {
                    let refined = head.with_pos(pos);
                    s[0] = refined;
                }
                Variance::Cov(s)
            }
            Variance::Contra(s) => {
                let mut s = s.clone();
                if let Some(head) = s.first() {
                    let refined = head.with_pos(pos);
                    s[0] = refined;
                }
                Variance::Contra(s)
            }
            Variance::Inv(cov, contra) => {
                let mut cov = cov.clone();
                let mut contra = contra.clone();
                if let Some(head) = cov.first() {
                    cov[0] = head.with_pos(pos);
                }
                if let Some(head) = contra.first() {
                    contra[0] = head.with_pos(pos);
                }
                Variance::Inv(cov, contra)
            }
            Variance::Bivariant => Variance::Bivariant,
        }
    }
}

/// Build a fresh `Variance` from a declared annotation (`+`, `-`, invariant)
/// written at `pos`.
pub fn initial_from_annotation(pos: Pos, descr: PosDescr, declared: PolTag) -> Variance {
    match declared {
        PolTag::Cov => Variance::Cov(Variance::single(Reason::new(pos, descr, PolTag::Cov))),
        PolTag::Contra => {
            Variance::Contra(Variance::single(Reason::new(pos, descr, PolTag::Contra)))
        }
        PolTag::Inv => {
            let r = Reason::new(pos, descr, PolTag::Inv);
            Variance::Inv(Variance::single(r.clone()), Variance::single(r))
        }
    }
}

/// Negate a polarity, recording the new reason at `pos`/`descr`. `Inv` is
/// already maximally constrained and absorbs the flip; `Bivariant` is the
/// absorbing identity.
pub fn flip(pos: Pos, descr: PosDescr, v: &Variance) -> Variance {
    match v {
        Variance::Cov(s) => {
            let mut s = s.clone();
            s.insert(0, Reason::new(pos, descr, PolTag::Contra));
            Variance::Contra(s)
        }
        Variance::Contra(s) => {
            let mut s = s.clone();
            s.insert(0, Reason::new(pos, descr, PolTag::Cov));
            Variance::Cov(s)
        }
        Variance::Inv(_, _) => v.clone(),
        Variance::Bivariant => Variance::Bivariant,
    }
}

/// Compose the current polarity `from` with the declared polarity `to` of an
/// outer parameter slot (e.g. descending into `A<T>` where `A<+X>` makes the
/// slot covariant). `Bivariant` on either side is the absorbing identity.
/// When the result is `Inv`, both sub-stacks are rebuilt as a single fresh
/// reason at `pos` — the outer declaration may live in a distant file, but
/// the local position is always meaningful, so `to`'s stack is discarded
/// beyond its tag.
pub fn compose(pos: Pos, descr: PosDescr, from: &Variance, to: &Variance) -> Variance {
    // Matched directly on the (from, to) shapes rather than extracted tags,
    // so every case is total and no arm needs to assume the other's shape.
    match (from, to) {
        (Variance::Bivariant, _) => to.clone(),
        (_, Variance::Bivariant) => from.clone(),

        (Variance::Inv(_, _), _) | (_, Variance::Inv(_, _)) => {
            let r = Reason::new(pos, descr, PolTag::Inv);
            Variance::Inv(Variance::single(r.clone()), Variance::single(r))
        }

        // `to = Cov` is transparent: the result tag equals `from`'s tag.
        (Variance::Cov(s), Variance::Cov(_)) => {
            Variance::Cov(prepend(s, Reason::new(pos, descr, PolTag::Cov)))
        }
        (Variance::Contra(s), Variance::Cov(_)) => {
            Variance::Contra(prepend(s, Reason::new(pos, descr, PolTag::Contra)))
        }

        // `to = Contra` flips `from`'s tag.
        (Variance::Cov(s), Variance::Contra(_)) => {
            Variance::Contra(prepend(s, Reason::new(pos, descr, PolTag::Contra)))
        }
        (Variance::Contra(s), Variance::Contra(_)) => {
            Variance::Cov(prepend(s, Reason::new(pos, descr, PolTag::Cov)))
        }
    }
}

/// Non-destructively prepend a new head reason onto a cloned stack.
fn prepend(stack: &ReasonStack, reason: Reason) -> ReasonStack {
    let mut stack = stack.clone();
    stack.insert(0, reason);
    stack
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(tag: PolTag) -> Reason {
        Reason::new(0, PosDescr::FnParameter, tag)
    }

    fn cov() -> Variance {
        Variance::Cov(Variance::single(r(PolTag::Cov)))
    }

    fn contra() -> Variance {
        Variance::Contra(Variance::single(r(PolTag::Contra)))
    }

    fn inv() -> Variance {
        Variance::Inv(
            Variance::single(r(PolTag::Inv)),
            Variance::single(r(PolTag::Inv)),
        )
    }

    #[test]
    fn reason_stack_non_emptiness() {
        for v in [cov(), contra(), inv()] {
            match &v {
                Variance::Cov(s) | Variance::Contra(s) => assert!(!s.is_empty()),
                Variance::Inv(a, b) => {
                    assert!(!a.is_empty());
                    assert!(!b.is_empty());
                }
                Variance::Bivariant => unreachable!(),
            }
        }
    }

    #[test]
    fn double_flip_identity_on_tag() {
        for v in [cov(), contra(), inv(), Variance::Bivariant] {
            let once = flip(0, PosDescr::FnParameter, &v);
            let twice = flip(0, PosDescr::FnParameter, &once);
            assert_eq!(twice.tag(), v.tag());
        }
    }

    #[test]
    fn inv_absorption() {
        for v in [cov(), contra(), inv(), Variance::Bivariant] {
            if matches!(v, Variance::Bivariant) {
                continue;
            }
            assert_eq!(
                compose(0, PosDescr::FnParameter, &inv(), &v).tag(),
                Some(PolTag::Inv)
            );
            assert_eq!(
                compose(0, PosDescr::FnParameter, &v, &inv()).tag(),
                Some(PolTag::Inv)
            );
        }
    }

    #[test]
    fn bivariant_neutrality() {
        assert_eq!(
            compose(0, PosDescr::FnParameter, &Variance::Bivariant, &cov()).tag(),
            Some(PolTag::Cov)
        );
        assert_eq!(
            compose(0, PosDescr::FnParameter, &cov(), &Variance::Bivariant).tag(),
            Some(PolTag::Cov)
        );
    }

    #[test]
    fn composition_sign_table() {
        let cases = [
            (PolTag::Cov, PolTag::Cov, PolTag::Cov),
            (PolTag::Cov, PolTag::Contra, PolTag::Contra),
            (PolTag::Contra, PolTag::Cov, PolTag::Contra),
            (PolTag::Contra, PolTag::Contra, PolTag::Cov),
        ];
        let build = |tag| match tag {
            PolTag::Cov => cov(),
            PolTag::Contra => contra(),
            PolTag::Inv => inv(),
        };
        for (from, to, expected) in cases {
            let result = compose(0, PosDescr::FnParameter, &build(from), &build(to));
            assert_eq!(result.tag(), Some(expected), "{from:?} compose {to:?}");
        }
        // Any combination touching Inv yields Inv, for all 16 combinations.
        for from in [PolTag::Cov, PolTag::Contra, PolTag::Inv] {
            for to in [PolTag::Cov, PolTag::Contra, PolTag::Inv] {
                if from == PolTag::Inv || to == PolTag::Inv {
                    let result = compose(0, PosDescr::FnParameter, &build(from), &build(to));
                    assert_eq!(result.tag(), Some(PolTag::Inv));
                }
            }
        }
    }

    #[test]
    fn scenario_box_contra_in_contra_slot_is_covariant() {
        // class Box<-T> {}; class C<+T> { function f(Box<T> $x): void {} }
        // Box<T> parameter position is contravariant; Box's own T slot is
        // contravariant; composed that is a covariant use of T.
        let param_polarity = contra();
        let box_t_declared = contra();
        let result = compose(
            0,
            PosDescr::TypeArgument("Box".into()),
            &param_polarity,
            &box_t_declared,
        );
        assert_eq!(result.tag(), Some(PolTag::Cov));
    }
}
