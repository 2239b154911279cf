pub use crate::term::Term;

/// Character offsets into the raw input line.
pub type Span = std::ops::Range<usize>;

#[derive(derive_more::AsRef, Clone, derive_more::Display, Debug)]
#[display(bound = "T: std::fmt::Display")]
#[display(fmt = "{value}")]
pub struct Spanned<T> {
    pub span: Span,
    #[as_ref]
    pub value: T,
}
impl<T> Spanned<T> {
    pub fn forget_span(self) -> T {
        self.value
    }
    pub fn value(&self) -> &T {
        &self.value
    }
    pub fn span(&self) -> Span {
        self.span.clone()
    }
}

pub type Result<T, E = crate::error::Error> = std::result::Result<T, E>;
