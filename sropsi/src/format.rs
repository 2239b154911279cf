use std::sync::OnceLock;

use regex::{Captures, Regex};
use thiserror::Error;

use crate::term::Term;

/// Switches for the abbreviated output form. All off prints `ψ(a,b)`
/// everywhere except for `1` and numerals.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
pub struct DisplayOptions {
    /// ψ(0,1) as ω.
    pub omega: bool,
    /// ψ(1,0) as Ω.
    pub large_omega: bool,
    /// ψ(M(0),0) as I.
    pub iota: bool,
    /// ψ(a,b) as ψ_a(b).
    pub subscript: bool,
    /// With `subscript`, always brace the subscript.
    pub braces: bool,
    /// ψ(0,b) as ψ(b).
    pub unary: bool,
    pub tex: bool,
}

#[derive(Error, Debug)]
#[error("unknown option `{0}`; expected one of {}", DisplayOptions::NAMES.join(", "))]
pub struct UnknownOption(pub String);

impl DisplayOptions {
    pub const NAMES: [&'static str; 7] = [
        "omega",
        "large-omega",
        "iota",
        "subscript",
        "braces",
        "unary",
        "tex",
    ];

    fn flag_mut(&mut self, name: &str) -> Option<&mut bool> {
        Some(match name {
            "omega" | "o" => &mut self.omega,
            "large-omega" | "O" => &mut self.large_omega,
            "iota" | "I" => &mut self.iota,
            "subscript" | "a" => &mut self.subscript,
            "braces" | "b" => &mut self.braces,
            "unary" | "c" => &mut self.unary,
            "tex" | "t" => &mut self.tex,
            _ => return None,
        })
    }

    pub fn set(&mut self, name: &str, value: bool) -> Result<(), UnknownOption> {
        let flag = self
            .flag_mut(name)
            .ok_or_else(|| UnknownOption(name.to_string()))?;
        *flag = value;
        Ok(())
    }

    pub fn flags(&self) -> [(&'static str, bool); 7] {
        [
            ("omega", self.omega),
            ("large-omega", self.large_omega),
            ("iota", self.iota),
            ("subscript", self.subscript),
            ("braces", self.braces),
            ("unary", self.unary),
            ("tex", self.tex),
        ]
    }
}

/// Renders `term` for display under `options`.
pub fn to_display_string(term: &Term, options: &DisplayOptions) -> String {
    abbreviate(render(term, options), options)
}

fn render(term: &Term, options: &DisplayOptions) -> String {
    match term {
        Term::Zero => "0".to_string(),
        Term::Sum(addends) => addends
            .iter()
            .map(|addend| render(addend, options))
            .collect::<Vec<_>>()
            .join("+"),
        Term::Collapse(inner) => format!("M({})", render(inner, options)),
        Term::Psi(sub, arg) => {
            let arg_str = render(arg, options);
            if options.unary && sub.is_zero() {
                return format!("ψ({arg_str})");
            }
            let sub_str = render(sub, options);
            if !options.subscript {
                return format!("ψ({sub_str},{arg_str})");
            }
            if !(options.braces || options.tex) && bare_subscript(sub, options) {
                format!("ψ_{sub_str}({arg_str})")
            } else {
                format!("ψ_{{{sub_str}}}({arg_str})")
            }
        }
    }
}

/// Subscripts that read unambiguously without braces.
fn bare_subscript(sub: &Term, options: &DisplayOptions) -> bool {
    match sub {
        Term::Zero => true,
        Term::Sum(addends) => addends.iter().all(Term::is_one),
        _ => {
            sub.is_one()
                || (options.omega && *sub == Term::omega())
                || (options.large_omega && *sub == Term::large_omega())
                || (options.iota && *sub == Term::iota())
        }
    }
}

fn abbreviate(mut s: String, options: &DisplayOptions) -> String {
    fn replace_all(s: String, patterns: &[&str], with: &str) -> String {
        patterns
            .iter()
            .fold(s, |s, pattern| s.replace(pattern, with))
    }

    s = replace_all(s, &["ψ(0)", "ψ_{0}(0)", "ψ_0(0)", "ψ(0,0)"], "1");
    if options.omega {
        s = replace_all(s, &["ψ(1)", "ψ_{0}(1)", "ψ_0(1)", "ψ(0,1)"], "ω");
    }
    if options.large_omega {
        s = replace_all(s, &["ψ_{1}(0)", "ψ_1(0)", "ψ(1,0)"], "Ω");
    }
    if options.iota {
        s = replace_all(s, &["ψ_{M(0)}(0)", "ψ(M(0),0)"], "I");
    }
    if options.tex {
        s = to_tex(&s);
    }
    collapse_numerals(&s)
}

fn to_tex(s: &str) -> String {
    s.replace('ψ', r"\psi")
        .replace('M', r"\mathbb{M}")
        .replace('ω', r"\omega")
        .replace('Ω', r"\Omega")
        .replace('I', r"\textrm{I}")
}

/// `1+1+1` → `3`, for every run of two or more ones.
fn collapse_numerals(s: &str) -> String {
    static NUMERAL: OnceLock<Regex> = OnceLock::new();
    let numeral =
        NUMERAL.get_or_init(|| Regex::new(r"1(\+1)+").expect("numeral pattern is valid"));
    numeral
        .replace_all(s, |caps: &Captures| caps[0].matches('1').count().to_string())
        .into_owned()
}
