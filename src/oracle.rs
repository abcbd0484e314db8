//! The nominal variance oracle: a projection over `TypingEnv` that yields
//! only the tparam variance vector for a named class or typedef — the only
//! information the traversal needs per applied type (§4.3).

use crate::polarity::{initial_from_annotation, Variance};
use crate::reason::PosDescr;
use crate::tenv::{NominalDecl, TypingEnv, AWAITABLE};

pub trait NominalOracle {
    /// The declared variance vector of `name`, in parameter order. Unknown
    /// names return an empty vector; the traversal zips against type-argument
    /// lists short-as-shorter to tolerate arity mismatches, leaving the arity
    /// error itself to the surrounding type-checker.
    fn declared_variances(&self, name: &str) -> Vec<Variance>;
}

pub struct TenvOracle<'a> {
    tenv: &'a dyn TypingEnv,
}

impl<'a> TenvOracle<'a> {
    pub fn new(tenv: &'a dyn TypingEnv) -> Self {
        Self { tenv }
    }
}

impl<'a> NominalOracle for TenvOracle<'a> {
    fn declared_variances(&self, name: &str) -> Vec<Variance> {
        if name == AWAITABLE {
            // Synthetic single covariant parameter, regardless of any
            // declaration that may or may not be loaded for it.
            return vec![Variance::Cov(smallvec_reason())];
        }

        match self.tenv.lookup_class_or_typedef(name) {
            Some(NominalDecl::Class(class)) => class
                .tparams
                .iter()
                .map(|t| initial_from_annotation(t.pos, PosDescr::TparamDecl, t.variance))
                .collect(),
            Some(NominalDecl::Typedef(typedef)) => typedef
                .tparams
                .iter()
                .map(|t| initial_from_annotation(t.pos, PosDescr::TparamDecl, t.variance))
                .collect(),
            None => Vec::new(),
        }
    }
}

fn smallvec_reason() -> crate::polarity::ReasonStack {
    use crate::polarity::PolTag;
    use crate::reason::Reason;
    let mut s = crate::polarity::ReasonStack::new();
    s.push(Reason::new(0, PosDescr::TparamDecl, PolTag::Cov));
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EmptyEnv;
    impl TypingEnv for EmptyEnv {
        fn lookup_class_or_typedef(&self, _name: &str) -> Option<NominalDecl<'_>> {
            None
        }
    }

    #[test]
    fn awaitable_is_hardcoded_covariant() {
        let oracle = TenvOracle::new(&EmptyEnv);
        let v = oracle.declared_variances(AWAITABLE);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].tag(), Some(crate::polarity::PolTag::Cov));
    }

    #[test]
    fn unknown_name_is_empty() {
        let oracle = TenvOracle::new(&EmptyEnv);
        assert!(oracle.declared_variances("NoSuchType").is_empty());
    }
}
