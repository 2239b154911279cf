use std::rc::Rc;

use tracing::{debug, trace};

use crate::{cofinality::dom, compare::le, error::InternalInconsistency, term::Term};

type Result<T> = std::result::Result<T, InternalInconsistency>;

/// `a[b]` together with the diagonal term met while resolving it.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Expansion {
    pub fund: Term,
    /// The "bad part": the first critical term recorded while descending
    /// through a countable-cofinality branch, `0` if none was.
    pub witness: Term,
}

/// Computes the `b`-th element of the fundamental sequence of `a`.
pub fn fund_and_witness(a: &Term, b: &Term) -> Result<Expansion> {
    debug!(term = %a, index = %b, "fundamental sequence");
    let mut evaluator = Evaluator::default();
    let fund = evaluator.fund(a, b)?;
    Ok(Expansion {
        fund,
        witness: evaluator.witness,
    })
}

/// Walks past leading non-`ψ` addends and `M` wrappers.
///
/// Returns the first `ψ` term found, or the whole remaining sum when that sum
/// already starts with a `ψ` term; `0` if there is none.
pub fn leading_psi(s: &Term) -> Term {
    match s {
        Term::Zero => Term::Zero,
        Term::Sum(addends) => {
            if matches!(addends.first(), Some(Term::Psi(..))) {
                s.clone()
            } else {
                s.split_first()
                    .map(|(_, rest)| leading_psi(&rest))
                    .unwrap_or_default()
            }
        }
        Term::Collapse(inner) => leading_psi(inner),
        Term::Psi(..) => s.clone(),
    }
}

fn expect_psi(term: &Term, context: &'static str) -> Result<(Rc<Term>, Rc<Term>)> {
    match term {
        Term::Psi(sub, arg) => Ok((sub.clone(), arg.clone())),
        _ => Err(InternalInconsistency {
            context,
            found: term.clone(),
        }),
    }
}

/// One evaluation. The witness slot starts at `0`; any branch that finds it
/// still `0` may fill it, and the outermost such write wins.
#[derive(Default)]
struct Evaluator {
    witness: Term,
}

impl Evaluator {
    fn witness_open(&self) -> bool {
        self.witness.is_zero()
    }

    fn record(&mut self, witness: Term) {
        trace!(%witness, "witness recorded");
        self.witness = witness;
    }

    fn fund(&mut self, s: &Term, t: &Term) -> Result<Term> {
        match s {
            Term::Zero => Ok(Term::Zero),
            Term::Sum(_) => {
                let Some((init, last)) = s.split_last() else {
                    return Ok(Term::Zero);
                };
                let last = self.fund(last, t)?;
                Ok(init.add(&last))
            }
            Term::Collapse(inner) => self.fund_collapse(inner, t),
            Term::Psi(sub, arg) => self.fund_psi(s, sub, arg, t),
        }
    }

    /// `s[t[0]]`, the element one step before `s[t]`; it must be a `ψ` term.
    fn previous_step(
        &mut self,
        s: &Term,
        t: &Term,
        context: &'static str,
    ) -> Result<(Rc<Term>, Rc<Term>)> {
        let index = self.fund(t, &Term::Zero)?;
        let previous = self.fund(s, &index)?;
        expect_psi(&previous, context)
    }

    fn fund_collapse(&mut self, inner: &Term, t: &Term) -> Result<Term> {
        let dom_inner = dom(inner);
        if dom_inner.is_zero() {
            return Ok(t.clone());
        }
        if dom_inner.is_one() {
            if self.witness_open() {
                let witness = Term::collapse(self.fund(inner, &Term::Zero)?);
                self.record(witness);
            }
            if dom(t).is_one() {
                let head = self.fund(t, &Term::Zero)?;
                let tail = Term::collapse(self.fund(inner, &Term::Zero)?);
                return Ok(head.add(&tail));
            }
            return Ok(Term::Zero);
        }
        Ok(Term::collapse(self.fund(inner, t)?))
    }

    fn fund_psi(&mut self, s: &Term, sub: &Term, arg: &Term, t: &Term) -> Result<Term> {
        let dom_arg = dom(arg);
        if dom_arg.is_zero() {
            return self.fund_psi_sub(s, sub, arg, t);
        }
        if dom_arg.is_one() {
            if self.witness_open() {
                let witness = Term::psi(sub.clone(), self.fund(arg, &Term::Zero)?);
                self.record(witness);
            }
            if dom(t).is_one() {
                let head = self.fund(t, &Term::Zero)?;
                let tail = Term::psi(sub.clone(), self.fund(arg, &Term::Zero)?);
                return Ok(head.add(&tail));
            }
            return Ok(Term::Zero);
        }
        if le(&dom_arg, s) {
            return Ok(Term::psi(sub.clone(), self.fund(arg, t)?));
        }

        let (c, _) = expect_psi(&dom_arg, "cofinality of a ψ argument")?;
        if dom(&c).is_one() {
            if self.witness_open() {
                let head = self.fund(&c, &Term::Zero)?;
                let witness = Term::psi(head, self.fund(arg, &Term::Zero)?);
                self.record(witness);
            }
            if dom(t).is_one() {
                let (_, gamma) = self.previous_step(s, t, "previous step of a ψ argument")?;
                let head = self.fund(&c, &Term::Zero)?;
                let index = Term::psi(head, gamma.as_ref().clone());
                return Ok(Term::psi(sub.clone(), self.fund(arg, &index)?));
            }
            return Ok(Term::psi(sub.clone(), self.fund(arg, &Term::Zero)?));
        }

        if self.witness_open() {
            let witness = self.fund(arg, &Term::Zero)?;
            self.record(witness);
        }
        if dom(t).is_one() {
            let (_, gamma) = self.previous_step(s, t, "previous step of a ψ argument")?;
            return Ok(Term::psi(sub.clone(), self.fund(arg, &gamma)?));
        }
        Ok(Term::psi(sub.clone(), self.fund(arg, &Term::Zero)?))
    }

    /// `ψ(sub, 0)[t]`: with a zero argument the subscript drives the sequence.
    fn fund_psi_sub(&mut self, s: &Term, sub: &Term, arg: &Term, t: &Term) -> Result<Term> {
        let dom_sub = dom(sub);
        if dom_sub.is_zero() || dom_sub.is_one() {
            return Ok(t.clone());
        }
        if le(&dom_sub, s) || dom_sub.is_collapse() {
            return Ok(Term::psi(self.fund(sub, t)?, arg.clone()));
        }

        let (c, _) = expect_psi(&dom_sub, "cofinality of a ψ subscript")?;
        if dom(&c).is_one() {
            if self.witness_open() {
                let head = self.fund(&c, &Term::Zero)?;
                let witness = Term::psi(head, leading_psi(&self.fund(sub, &Term::Zero)?));
                self.record(witness);
            }
            if dom(t).is_one() {
                let (gamma, _) = self.previous_step(s, t, "previous step of a ψ subscript")?;
                let bad_part = leading_psi(&gamma);
                expect_psi(&bad_part, "leading ψ of a previous subscript")?;
                let head = self.fund(&c, &Term::Zero)?;
                let index = Term::psi(head, bad_part);
                return Ok(Term::psi(self.fund(sub, &index)?, arg.clone()));
            }
            return Ok(Term::psi(self.fund(sub, &Term::Zero)?, arg.clone()));
        }

        if self.witness_open() {
            let witness = leading_psi(&self.fund(sub, &Term::Zero)?);
            self.record(witness);
        }
        if dom(t).is_one() {
            let (gamma, _) = self.previous_step(s, t, "previous step of a ψ subscript")?;
            let index = leading_psi(&gamma);
            return Ok(Term::psi(self.fund(sub, &index)?, arg.clone()));
        }
        Ok(Term::psi(self.fund(sub, &Term::Zero)?, arg.clone()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::parse;

    fn run(a: &str, b: &str) -> Expansion {
        fund_and_witness(&parse(a).unwrap(), &parse(b).unwrap()).unwrap()
    }

    fn term(s: &str) -> Term {
        parse(s).unwrap()
    }

    #[test]
    fn test_mahlo_identity() {
        for b in ["0", "1", "w", "W", "I", "M(0)", "p(w,1)+3"] {
            let expansion = run("M(0)", b);
            assert_eq!(expansion.fund, term(b));
            assert_eq!(expansion.witness, Term::Zero);
        }
    }

    #[test]
    fn test_zero_and_successors() {
        assert_eq!(run("0", "w").fund, Term::Zero);
        assert_eq!(run("1", "0").fund, Term::Zero);
        assert_eq!(run("3", "0").fund, term("2"));
        assert_eq!(run("w+1", "0").fund, term("w"));
        assert_eq!(run("w+1", "5").fund, term("w+5"));
    }

    #[test]
    fn test_countable_argument() {
        let expansion = run("w", "3");
        assert_eq!(expansion.fund, term("3"));
        assert_eq!(expansion.witness, Term::one());
        assert_eq!(run("w", "0").fund, Term::Zero);

        let expansion = run("p(0,2)", "3");
        assert_eq!(expansion.fund, term("2+w"));
        assert_eq!(expansion.witness, Term::omega());

        assert_eq!(run("w", "w").fund, Term::Zero);
    }

    #[test]
    fn test_countable_mahlo() {
        let expansion = run("M(1)", "2");
        assert_eq!(expansion.fund, term("1+M(0)"));
        assert_eq!(expansion.witness, term("M(0)"));
        assert_eq!(run("M(1)", "0").fund, Term::Zero);
        assert_eq!(run("M(1)", "w").fund, Term::Zero);
    }

    #[test]
    fn test_passes_index_through() {
        assert_eq!(run("W", "w").fund, term("w"));
        assert_eq!(run("I", "w").fund, term("p(w,0)"));
        assert_eq!(run("p(1,w)", "3").fund, term("p(1,3)"));
        let expansion = run("p(w,0)", "3");
        assert_eq!(expansion.fund, term("p(3,0)"));
        assert_eq!(expansion.witness, Term::one());
        assert_eq!(run("M(w)", "2").fund, term("M(2)"));
    }

    #[test]
    fn test_argument_diagonal() {
        // ψ(0,Ω): 1, ω, ψ(0,ω), ...
        assert_eq!(run("p(0,W)", "0").fund, Term::one());
        assert_eq!(run("p(0,W)", "1").fund, Term::omega());
        let expansion = run("p(0,W)", "2");
        assert_eq!(expansion.fund, term("p(0,w)"));
        assert_eq!(expansion.witness, Term::one());

        // ψ(0,I): ω, ψ(0,Ω), ψ(0,ψ(Ω,0)), ...
        assert_eq!(run("p(0,I)", "0").fund, Term::omega());
        assert_eq!(run("p(0,I)", "1").fund, term("p(0,W)"));
        let expansion = run("p(0,I)", "2");
        assert_eq!(expansion.fund, term("p(0,p(W,0))"));
        assert_eq!(expansion.witness, Term::one());
    }

    #[test]
    fn test_subscript_diagonal() {
        // ψ(I,0): Ω, ψ(Ω,0), ψ(ψ(Ω,0),0), ...
        assert_eq!(run("p(I,0)", "0").fund, Term::large_omega());
        assert_eq!(run("p(I,0)", "1").fund, term("p(W,0)"));
        let expansion = run("p(I,0)", "2");
        assert_eq!(expansion.fund, term("p(p(W,0),0)"));
        assert_eq!(expansion.witness, Term::one());
    }

    #[test]
    fn test_argument_refinement() {
        // ψ(0,ψ(I+1,0)): the argument's cofinality is a ψ term above the whole.
        let expansion = run("p(0,p(I+1,0))", "1");
        assert_eq!(expansion.fund, term("p(0,p(I,0))"));

        let expansion = run("p(0,p(I+1,0))", "2");
        assert_eq!(expansion.fund, term("p(0,p(I,p(I,0)))"));
        assert_eq!(expansion.witness, term("p(I,0)"));
    }

    #[test]
    fn test_sum_keeps_prefix() {
        let expansion = run("W+p(0,W)", "2");
        assert_eq!(expansion.fund, term("W+p(0,w)"));
    }

    #[test]
    fn test_inconsistency_is_reported() {
        // ψ(ψ(I+1,0),0)[1] steps back to ψ(0,0), whose subscript has no ψ part.
        let e = fund_and_witness(&term("p(p(I+1,0),0)"), &Term::one()).unwrap_err();
        assert_eq!(e.context, "leading ψ of a previous subscript");
        assert_eq!(e.found, Term::Zero);
        assert_eq!(run("p(p(I+1,0),0)", "0").fund, Term::one());
    }

    #[test]
    fn test_leading_psi() {
        assert_eq!(leading_psi(&Term::Zero), Term::Zero);
        assert_eq!(leading_psi(&term("M(M(w))")), Term::omega());
        assert_eq!(leading_psi(&term("M(0)")), Term::Zero);
        assert_eq!(leading_psi(&term("M(0)+W+1")), term("W+1"));
        assert_eq!(leading_psi(&term("W+M(0)")), term("W+M(0)"));
    }

    #[test]
    fn test_mahlo_argument_is_rejected() {
        let e = fund_and_witness(&term("p(0,M(0))"), &Term::one()).unwrap_err();
        assert_eq!(e.context, "cofinality of a ψ argument");
        assert_eq!(e.found, term("M(0)"));
    }

    #[test]
    fn test_no_inconsistency_on_standard_terms() {
        let terms = [
            "1", "w", "W", "I", "M(0)", "M(1)", "M(w)", "M(I)", "p(w,0)", "p(0,W)", "p(0,I)",
            "p(I,0)", "p(1,w)", "p(W,W)", "p(M(1),0)", "p(M(0),1)", "p(I+1,0)",
            "p(p(M(0),1),0)", "W+p(0,W)", "p(0,p(W,W))",
        ];
        let indices = [Term::Zero, Term::one(), Term::from_nat(2), Term::omega()];
        for a in terms {
            for b in &indices {
                assert!(fund_and_witness(&term(a), b).is_ok(), "{a}[{b}]");
            }
        }
    }
}
