use chumsky::prelude::*;
use tracing::debug;

use crate::{
    error::{Reason, SyntaxError},
    lang::Token,
    prelude::*,
};

/// Deepest nesting of `ψ`/`M` constructs accepted.
pub const MAX_NESTING: usize = 32;
/// Largest numeral accepted as sugar for `1+1+...+1`.
pub const MAX_NATURAL: usize = 10_000;

pub trait SimpleParser<I: Clone + std::hash::Hash, O>:
    Parser<I, O, Error = Simple<I>> + Clone
{
    #[allow(clippy::type_complexity)]
    fn spanned(self) -> chumsky::combinator::MapWithSpan<Self, fn(O, Span) -> Spanned<O>, O>
    where
        Self: Sized,
        I: std::cmp::Eq,
    {
        self.map_with_span(|value, span| Spanned { span, value })
    }
}
impl<I: Clone + std::hash::Hash, O, T> SimpleParser<I, O> for T where
    T: Parser<I, O, Error = Simple<I>> + Clone
{
}

pub fn lexer() -> impl SimpleParser<char, Vec<Spanned<Token>>> {
    let symbols = choice((
        just('(').to(Token::LParen),
        just(')').to(Token::RParen),
        just('{').to(Token::LBrace),
        just('}').to(Token::RBrace),
        just(',').to(Token::Comma),
        just('+').to(Token::Plus),
        just('_').to(Token::Underscore),
    ));
    let letters = choice((
        one_of("wω").to(Token::Omega),
        one_of("WΩ").to(Token::LargeOmega),
        one_of("iI").to(Token::Iota),
        one_of("mM").to(Token::Mahlo),
        one_of("pψ").to(Token::Psi),
    ));
    let nat = text::int::<char, _>(10)
        .from_str::<usize>()
        .try_map(|r, span: Span| {
            let n = r.map_err(|e| Simple::custom(span.clone(), format!("{e}")))?;
            if n > MAX_NATURAL {
                return Err(Simple::custom(
                    span,
                    format!("numerals above {MAX_NATURAL} are not supported"),
                ));
            }
            Ok(Token::Nat(n))
        });
    let token = choice((symbols, letters, nat));
    token.spanned().padded().repeated().then_ignore(end())
}

fn term_parser() -> impl SimpleParser<Token, Term> {
    recursive(|term: Recursive<Token, Term, Simple<Token>>| {
        // 0, 1, 2, ...
        let nat = select! { Token::Nat(n) => Term::from_nat(n) }.labelled("numeral");

        // ω, Ω, I
        let constant = select! {
            Token::Omega => Term::omega(),
            Token::LargeOmega => Term::large_omega(),
            Token::Iota => Term::iota(),
        }
        .labelled("constant");

        let parenthesized = term
            .clone()
            .delimited_by(just(Token::LParen), just(Token::RParen));

        // M(a)
        let collapse = just(Token::Mahlo)
            .ignore_then(parenthesized.clone())
            .map(Term::collapse)
            .labelled("collapse");

        // ψ(b), ψ(a,b)
        let tuple = term
            .clone()
            .then(just(Token::Comma).ignore_then(term.clone()).or_not())
            .delimited_by(just(Token::LParen), just(Token::RParen))
            .map(|(first, second)| match second {
                Some(arg) => Term::psi(first, arg),
                None => Term::psi(Term::Zero, first),
            });

        // ψ_{a}(b), ψ{a}(b), ψ_a(b), ψa(b)
        let subscripted = just(Token::Underscore)
            .or_not()
            .ignore_then(choice((
                term.clone()
                    .delimited_by(just(Token::LBrace), just(Token::RBrace)),
                term.clone(),
            )))
            .then(parenthesized)
            .map(|(sub, arg)| Term::psi(sub, arg));

        let psi = just(Token::Psi)
            .ignore_then(choice((tuple, subscripted)))
            .labelled("psi");

        choice((nat, constant, collapse, psi))
            .spanned()
            .separated_by(just(Token::Plus))
            .at_least(1)
            .try_map(|addends: Vec<Spanned<Term>>, _| {
                if addends.len() > 1 {
                    if let Some(zero) = addends.iter().find(|a| a.value().is_zero()) {
                        return Err(Simple::custom(
                            zero.span(),
                            "0 cannot be an addend of a sum",
                        ));
                    }
                }
                Ok(Term::sum(
                    addends.into_iter().map(Spanned::forget_span).collect(),
                ))
            })
    })
    .labelled("term")
}

/// Rejects inputs whose `ψ`/`M` nesting would recurse past [`MAX_NESTING`].
///
/// Every `ψ` or `M` construct ends with exactly one `)` of its own, so the
/// running difference between the two counts is the nesting depth.
fn check_nesting(tokens: &[Spanned<Token>]) -> Result<(), Vec<SyntaxError>> {
    let mut depth = 0usize;
    for token in tokens {
        match token.value() {
            Token::Psi | Token::Mahlo => {
                depth += 1;
                if depth > MAX_NESTING {
                    return Err(vec![SyntaxError {
                        span: token.span(),
                        reason: Reason::TooDeep { limit: MAX_NESTING },
                    }]);
                }
            }
            Token::RParen => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

/// Parses a whole line into a term. Whitespace is ignored; positions in the
/// returned errors are character offsets into `s`.
pub fn parse(s: &str) -> Result<Term, Vec<SyntaxError>> {
    debug!(input = s, "parse");
    let len = s.chars().count();
    let eoi = len..len + 1;
    let tokens = lexer().parse(s).map_err(|es| {
        es.into_iter()
            .map(|e| SyntaxError::from(e.map(|c| c.to_string())))
            .collect::<Vec<_>>()
    })?;
    check_nesting(&tokens)?;
    term_parser()
        .then_ignore(end())
        .parse(chumsky::Stream::from_iter(
            eoi,
            tokens
                .into_iter()
                .map(|Spanned { span, value }| (value, span)),
        ))
        .map_err(|es| {
            es.into_iter()
                .map(|e| SyntaxError::from(e.map(|t| t.to_string())))
                .collect::<Vec<_>>()
        })
}
