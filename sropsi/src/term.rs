use std::rc::Rc;

/// An ordinal term of the ψ notation with the Mahlo operator.
///
/// Equality is structural (`Sum`s compare element-wise, in order). Terms are
/// immutable; subterms are reference counted so they can be shared between
/// parents freely.
#[derive(PartialEq, Eq, Hash, Clone, Default, Debug)]
pub enum Term {
    #[default]
    Zero,
    /// Ordinal sum of two or more principal terms (`Collapse` or `Psi`).
    ///
    /// Build it with [`Term::sum`] or [`Term::add`], which keep it flat.
    Sum(Vec<Term>),
    /// `M(inner)`.
    Collapse(Rc<Term>),
    /// `ψ(sub, arg)`.
    Psi(Rc<Term>, Rc<Term>),
}

impl Term {
    pub fn collapse(inner: Term) -> Self {
        Term::Collapse(inner.into())
    }

    pub fn psi(sub: Term, arg: Term) -> Self {
        Term::Psi(sub.into(), arg.into())
    }

    /// `ψ(0,0)`, i.e. 1.
    pub fn one() -> Self {
        Term::psi(Term::Zero, Term::Zero)
    }

    /// `ψ(0,1)`, i.e. ω.
    pub fn omega() -> Self {
        Term::psi(Term::Zero, Term::one())
    }

    /// `ψ(1,0)`, i.e. Ω.
    pub fn large_omega() -> Self {
        Term::psi(Term::one(), Term::Zero)
    }

    /// `ψ(M(0),0)`, i.e. I.
    pub fn iota() -> Self {
        Term::psi(Term::collapse(Term::Zero), Term::Zero)
    }

    /// `1+1+...+1` with `n` ones, `0` for `n = 0`.
    pub fn from_nat(n: usize) -> Self {
        Term::sum(vec![Term::one(); n])
    }

    /// Wraps a sequence of addends, splicing nested sums and dropping zeros.
    /// A single remaining addend is returned unwrapped.
    pub fn sum(components: Vec<Term>) -> Self {
        let mut addends = Vec::with_capacity(components.len());
        for component in components {
            match component {
                Term::Zero => {}
                Term::Sum(inner) => addends.extend(inner),
                principal => addends.push(principal),
            }
        }
        match addends.len() {
            0 => Term::Zero,
            1 => addends.pop().unwrap_or(Term::Zero),
            _ => Term::Sum(addends),
        }
    }

    /// Formal ordinal sum `self + rhs`; no reordering and no absorption.
    pub fn add(&self, rhs: &Term) -> Self {
        match (self, rhs) {
            (Term::Zero, _) => rhs.clone(),
            (_, Term::Zero) => self.clone(),
            _ => Term::sum(
                self.addends()
                    .iter()
                    .chain(rhs.addends())
                    .cloned()
                    .collect(),
            ),
        }
    }

    /// The principal terms this term is the sum of, left to right.
    pub fn addends(&self) -> &[Term] {
        match self {
            Term::Zero => &[],
            Term::Sum(addends) => addends,
            _ => std::slice::from_ref(self),
        }
    }

    /// Splits off the leading addend. `Zero` has none.
    pub fn split_first(&self) -> Option<(&Term, Term)> {
        let (first, rest) = self.addends().split_first()?;
        Some((first, Term::sum(rest.to_vec())))
    }

    /// Splits off the trailing addend. `Zero` has none.
    pub fn split_last(&self) -> Option<(Term, &Term)> {
        let (last, init) = self.addends().split_last()?;
        Some((Term::sum(init.to_vec()), last))
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Term::Zero)
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Term::Psi(sub, arg) if sub.is_zero() && arg.is_zero())
    }

    pub fn is_collapse(&self) -> bool {
        matches!(self, Term::Collapse(_))
    }
}

impl std::ops::Add for &Term {
    type Output = Term;

    fn add(self, rhs: &Term) -> Term {
        Term::add(self, rhs)
    }
}

/// The unabbreviated form, which the parser reads back verbatim.
impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Zero => f.write_str("0"),
            Term::Sum(addends) => {
                for (i, addend) in addends.iter().enumerate() {
                    if i > 0 {
                        f.write_str("+")?;
                    }
                    f.write_fmt(format_args!("{addend}"))?;
                }
                Ok(())
            }
            Term::Collapse(inner) => f.write_fmt(format_args!("M({inner})")),
            Term::Psi(sub, arg) => f.write_fmt(format_args!("ψ({sub},{arg})")),
        }
    }
}

/// Every term built from depth-two principals, sums of those, and a few
/// landmarks that reach deeper.
#[cfg(test)]
pub(crate) fn small_terms() -> Vec<Term> {
    let atoms = [Term::Zero, Term::one(), Term::collapse(Term::Zero)];
    let mut principals = vec![];
    for sub in &atoms {
        for arg in &atoms {
            principals.push(Term::psi(sub.clone(), arg.clone()));
        }
        principals.push(Term::collapse(sub.clone()));
    }
    principals.extend([
        Term::psi(Term::omega(), Term::Zero),
        Term::psi(Term::Zero, Term::large_omega()),
        Term::psi(Term::iota(), Term::Zero),
        Term::psi(Term::one(), Term::omega()),
        Term::collapse(Term::iota()),
    ]);
    let mut terms = vec![Term::Zero];
    terms.extend(principals.iter().cloned());
    for lhs in principals.iter().step_by(2) {
        for rhs in principals.iter().step_by(3) {
            terms.push(lhs + rhs);
        }
    }
    terms.push(Term::from_nat(3));
    terms.push(Term::sum(vec![Term::omega(), Term::one(), Term::one()]));
    terms
}
