use tracing::debug;

use crate::{compare::le, term::Term};

/// Classifies the cofinality of `s`.
///
/// Returns `0` when `s` is a successor (or zero), `1` when its fundamental
/// sequence is indexed by natural numbers, and otherwise the term whose
/// values index the sequence (possibly `s` itself).
pub fn dom(s: &Term) -> Term {
    match s {
        Term::Zero => Term::Zero,
        Term::Sum(addends) => addends.last().map(dom).unwrap_or_default(),
        Term::Collapse(inner) => {
            let d = dom(inner);
            if d.is_zero() {
                s.clone()
            } else if d.is_one() {
                Term::omega()
            } else {
                d
            }
        }
        Term::Psi(sub, arg) => {
            let dom_arg = dom(arg);
            if dom_arg.is_zero() {
                let dom_sub = dom(sub);
                if dom_sub.is_zero() || dom_sub.is_one() {
                    s.clone()
                } else if le(&dom_sub, s) {
                    dom_sub
                } else if dom_sub.is_collapse() {
                    s.clone()
                } else {
                    Term::omega()
                }
            } else if dom_arg.is_one() {
                Term::omega()
            } else if le(&dom_arg, s) {
                dom_arg
            } else {
                Term::omega()
            }
        }
    }
}

pub fn cofinality(a: &Term) -> Term {
    debug!(term = %a, "cofinality");
    dom(a)
}

#[cfg(test)]
mod test {
    use super::*;

    fn psi(sub: Term, arg: Term) -> Term {
        Term::psi(sub, arg)
    }

    #[test]
    fn test_successors() {
        assert_eq!(dom(&Term::Zero), Term::Zero);
        assert_eq!(dom(&Term::one()), Term::one());
        assert_eq!(dom(&Term::from_nat(4)), Term::one());
        assert_eq!(dom(&(&Term::omega() + &Term::one())), Term::one());
    }

    #[test]
    fn test_countable() {
        let omega = Term::omega();
        assert_eq!(dom(&omega), omega);
        assert_eq!(dom(&psi(Term::Zero, Term::from_nat(2))), omega);
        assert_eq!(dom(&(&Term::large_omega() + &omega)), omega);
        assert_eq!(dom(&Term::collapse(Term::one())), omega);
        assert_eq!(dom(&psi(Term::Zero, Term::large_omega())), omega);
        assert_eq!(dom(&psi(Term::omega(), Term::Zero)), omega);
        assert_eq!(dom(&psi(Term::iota(), Term::Zero)), omega);
        assert_eq!(dom(&psi(Term::collapse(Term::Zero), Term::one())), omega);
    }

    #[test]
    fn test_uncountable() {
        let large_omega = Term::large_omega();
        assert_eq!(dom(&large_omega), large_omega);
        assert_eq!(dom(&psi(Term::one(), large_omega.clone())), large_omega);
        assert_eq!(dom(&Term::iota()), Term::iota());
        let mahlo = Term::collapse(Term::Zero);
        assert_eq!(dom(&mahlo), mahlo);
        assert_eq!(
            dom(&Term::collapse(Term::iota())),
            Term::iota(),
            "M(I) takes the cofinality of I"
        );
    }

    #[test]
    fn test_total_on_samples() {
        for t in crate::term::small_terms() {
            let d = cofinality(&t);
            assert!(
                d.is_zero() || matches!(d, Term::Psi(..) | Term::Collapse(_)),
                "dom({t}) = {d}"
            );
        }
    }
}
