//! Ordinal notation ψ with the Mahlo collapse `M`: term algebra, ordering,
//! cofinality, fundamental sequences and a parser for the textual form.

pub mod cofinality;
pub mod compare;
pub mod error;
pub mod format;
pub mod fund;
mod lang;
pub mod parser;
pub mod prelude;
pub mod term;

pub use cofinality::{cofinality, dom};
pub use compare::compare_less_than;
pub use error::{Error, InternalInconsistency, Reason, SyntaxError};
pub use format::{to_display_string, DisplayOptions};
pub use fund::{fund_and_witness, leading_psi, Expansion};
pub use parser::parse;
pub use term::Term;
