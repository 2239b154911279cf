#[derive(PartialEq, Eq, Hash, Clone, derive_more::Display, Debug)]
pub enum Token {
    #[display(fmt = "(")]
    LParen,
    #[display(fmt = ")")]
    RParen,
    #[display(fmt = "{{")]
    LBrace,
    #[display(fmt = "}}")]
    RBrace,
    #[display(fmt = ",")]
    Comma,
    #[display(fmt = "+")]
    Plus,
    #[display(fmt = "_")]
    Underscore,

    #[display(fmt = "ω")]
    Omega,
    #[display(fmt = "Ω")]
    LargeOmega,
    #[display(fmt = "I")]
    Iota,
    #[display(fmt = "M")]
    Mahlo,
    #[display(fmt = "ψ")]
    Psi,

    #[display(fmt = "{_0}")]
    Nat(usize),
}
