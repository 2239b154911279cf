use std::cmp::Ordering;

use crate::term::Term;

/// Strict order on terms.
///
/// Sums compare by their leading addend first and the remainder after that,
/// so a proper prefix of a sum is smaller than the sum. Among principal terms
/// every `ψ` lies below every `M`; `ψ` terms compare by subscript, then by
/// argument.
pub fn lt(s: &Term, t: &Term) -> bool {
    match (s, t) {
        (_, Term::Zero) => false,
        (Term::Zero, _) => true,
        (Term::Sum(ss), Term::Sum(ts)) => lt_addends(ss, ts),
        (Term::Sum(addends), _) => addends.first().map_or(false, |s0| lt(s0, t)),
        (_, Term::Sum(addends)) => addends.first().map_or(false, |t0| le(s, t0)),
        (Term::Collapse(a), Term::Collapse(b)) => lt(a, b),
        (Term::Collapse(_), Term::Psi(..)) => false,
        (Term::Psi(..), Term::Collapse(_)) => true,
        (Term::Psi(sa, aa), Term::Psi(sb, ab)) => lt(sa, sb) || (sa == sb && lt(aa, ab)),
    }
}

/// Lexicographic order on addend sequences; a proper prefix is smaller.
fn lt_addends(ss: &[Term], ts: &[Term]) -> bool {
    match ss.iter().zip(ts).find(|(s, t)| s != t) {
        Some((s, t)) => lt(s, t),
        None => ss.len() < ts.len(),
    }
}

pub fn le(s: &Term, t: &Term) -> bool {
    s == t || lt(s, t)
}

pub fn compare_less_than(a: &Term, b: &Term) -> bool {
    lt(a, b)
}

impl PartialOrd for Term {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Term {
    fn cmp(&self, other: &Self) -> Ordering {
        if self == other {
            Ordering::Equal
        } else if lt(self, other) {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::term::small_terms;

    #[test]
    fn test_basic() {
        let zero = Term::Zero;
        let one = Term::one();
        let omega = Term::omega();
        let mahlo = Term::collapse(Term::Zero);
        assert!(!lt(&zero, &zero));
        assert!(lt(&zero, &one));
        assert!(!lt(&one, &zero));
        assert!(lt(&one, &omega));
        assert!(lt(&omega, &Term::large_omega()));
        assert!(lt(&Term::large_omega(), &Term::iota()));
        assert!(lt(&Term::iota(), &mahlo));
        assert!(lt(&one, &mahlo));
        assert!(!lt(&mahlo, &Term::iota()));
        assert!(lt(&mahlo, &Term::collapse(one.clone())));
    }

    #[test]
    fn test_sums() {
        let one = Term::one();
        let omega = Term::omega();
        let omega_plus_one = &omega + &one;
        assert!(lt(&omega, &omega_plus_one));
        assert!(!lt(&omega_plus_one, &omega));
        assert!(lt(&omega_plus_one, &(&omega + &omega)));
        assert!(lt(&Term::from_nat(2), &Term::from_nat(3)));
        assert!(lt(&Term::from_nat(3), &omega));
        assert!(lt(&omega_plus_one, &Term::large_omega()));
        assert!(le(&omega_plus_one, &omega_plus_one));
    }

    #[test]
    fn test_long_sums() {
        let long = Term::from_nat(30_000);
        let copy = Term::from_nat(30_000);
        assert!(!lt(&long, &copy));
        assert!(!lt(&copy, &long));
        assert!(le(&long, &copy));

        let longer = &long + &Term::one();
        assert!(lt(&long, &longer));
        assert!(!lt(&longer, &long));
        let bigger = &Term::from_nat(29_999) + &Term::omega();
        assert!(lt(&longer, &bigger));
    }

    #[test]
    fn test_trichotomy() {
        let terms = small_terms();
        for s in &terms {
            for t in &terms {
                let holds = [lt(s, t), s == t, lt(t, s)];
                assert_eq!(
                    holds.iter().filter(|b| **b).count(),
                    1,
                    "{s} vs {t}: {holds:?}"
                );
            }
        }
    }

    #[test]
    fn test_transitivity() {
        let terms = small_terms();
        for a in &terms {
            for b in terms.iter().filter(|b| lt(a, b)) {
                for c in terms.iter().filter(|c| lt(b, c)) {
                    assert!(lt(a, c), "{a} < {b} < {c}");
                }
            }
        }
    }

    #[test]
    fn test_ord_agrees() {
        let mut terms = small_terms();
        terms.sort();
        for pair in terms.windows(2) {
            assert!(le(&pair[0], &pair[1]));
        }
        assert_eq!(Term::one().cmp(&Term::omega()), Ordering::Less);
        assert_eq!(Term::one().cmp(&Term::one()), Ordering::Equal);
    }
}
