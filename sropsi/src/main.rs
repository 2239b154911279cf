use anyhow::Result;
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use sropsi::{
    cofinality, compare_less_than,
    error::{Error as CoreError, InternalInconsistency, Reason, SyntaxError},
    format::UnknownOption,
    fund_and_witness,
    prelude::Span,
    to_display_string, DisplayOptions, Expansion, Term,
};
use thiserror::Error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use util::{repl, ResultExt};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

fn build_report(e: &SyntaxError) -> Report<Span> {
    let report = Report::build(ReportKind::Error, (), e.position());
    match &e.reason {
        Reason::Unexpected { found, .. } => {
            let found = found.as_deref().unwrap_or("end of the input");
            report.with_message(&e.reason).with_label(
                Label::new(e.span.clone())
                    .with_message(format!("Unexpected {}", found.fg(Color::Red)))
                    .with_color(Color::Red),
            )
        }
        Reason::Unclosed { span, delimiter } => report
            .with_message(format!("Unclosed delimiter {}", delimiter.fg(Color::Yellow)))
            .with_label(
                Label::new(span.clone())
                    .with_message(format!(
                        "Unclosed delimiter {}",
                        delimiter.fg(Color::Yellow)
                    ))
                    .with_color(Color::Yellow),
            )
            .with_label(
                Label::new(e.span.clone())
                    .with_message(format!("{}", "Must be closed before this".fg(Color::Red)))
                    .with_color(Color::Red),
            ),
        Reason::Custom(msg) => report.with_message(msg).with_label(
            Label::new(e.span.clone())
                .with_message(format!("{}", msg.fg(Color::Red)))
                .with_color(Color::Red),
        ),
        Reason::TooDeep { limit } => report.with_message(&e.reason).with_label(
            Label::new(e.span.clone())
                .with_message(format!("{}", format!("level {}", limit + 1).fg(Color::Red)))
                .with_color(Color::Red),
        ),
    }
    .finish()
}

#[derive(Error, Debug)]
enum HostError {
    #[error("operand {0} required")]
    MissingOperand(&'static str),
    #[error("expected `A[B]`")]
    ExpectedIndex,
    #[error("expected `A < B`")]
    ExpectedComparison,
    #[error("expected `:set <option> on|off`")]
    ExpectedSetting,
    #[error("expected `on` or `off`, found `{0}`")]
    ExpectedSwitch(String),
    #[error(transparent)]
    UnknownOption(#[from] UnknownOption),
}

#[derive(Debug)]
enum Failure {
    Core(CoreError),
    Host(HostError),
}
impl From<CoreError> for Failure {
    fn from(e: CoreError) -> Self {
        Failure::Core(e)
    }
}
impl From<InternalInconsistency> for Failure {
    fn from(e: InternalInconsistency) -> Self {
        Failure::Core(e.into())
    }
}
impl From<HostError> for Failure {
    fn from(e: HostError) -> Self {
        Failure::Host(e)
    }
}
impl From<UnknownOption> for Failure {
    fn from(e: UnknownOption) -> Self {
        Failure::Host(e.into())
    }
}

type CommandResult = Result<(), Failure>;

/// A slice of the input line and its character offset into that line.
#[derive(Clone, Copy, Debug)]
struct Operand<'a> {
    text: &'a str,
    offset: usize,
}

impl<'a> Operand<'a> {
    fn split_once(self, delimiter: char) -> Option<(Self, Self)> {
        let (head, tail) = self.text.split_once(delimiter)?;
        let tail_offset = self.offset + head.chars().count() + 1;
        Some((
            Operand {
                text: head,
                offset: self.offset,
            },
            Operand {
                text: tail,
                offset: tail_offset,
            },
        ))
    }

    fn strip_suffix(self, suffix: char) -> Option<Self> {
        let text = self.text.trim_end().strip_suffix(suffix)?;
        Some(Operand { text, ..self })
    }

    fn parse(self, name: &'static str) -> Result<Term, Failure> {
        if self.text.trim().is_empty() {
            return Err(HostError::MissingOperand(name).into());
        }
        sropsi::parse(self.text).map_err(|es| {
            let es: Vec<_> = es.into_iter().map(|e| shift(e, self.offset)).collect();
            CoreError::from(es).into()
        })
    }
}

fn shift(e: SyntaxError, offset: usize) -> SyntaxError {
    let shift_span = |span: Span| span.start + offset..span.end + offset;
    let reason = match e.reason {
        Reason::Unclosed { span, delimiter } => Reason::Unclosed {
            span: shift_span(span),
            delimiter,
        },
        reason => reason,
    };
    SyntaxError {
        span: shift_span(e.span),
        reason,
    }
}

/// `:cmd rest` into `("cmd", "rest")`; a line without `:` is all operand.
/// The operand is always a suffix of `line`.
fn split_command(line: &str) -> (&str, &str) {
    match line.strip_prefix(':') {
        Some(stripped) => {
            let stripped = stripped.trim_start();
            stripped.split_once(' ').unwrap_or((stripped, ""))
        }
        None => ("", line),
    }
}

#[derive(Default)]
struct Repl {
    options: DisplayOptions,
}
impl Repl {
    fn display(&self, term: &Term) -> String {
        to_display_string(term, &self.options)
    }

    fn show(&self, label: &str, text: &str) {
        if self.options.tex {
            println!("{label:<9} ${text}$");
        } else {
            println!("{label:<9} {text}");
        }
    }

    fn fund(&self, input: Operand) -> CommandResult {
        let (a, b) = input.split_once('[').ok_or(HostError::ExpectedIndex)?;
        let b = b.strip_suffix(']').ok_or(HostError::ExpectedIndex)?;
        let a = a.parse("A")?;
        let b = b.parse("B")?;
        let Expansion { fund, witness } = fund_and_witness(&a, &b)?;
        self.show(
            "input:",
            &format!("{}[{}]", self.display(&a), self.display(&b)),
        );
        self.show("bad part:", &self.display(&witness));
        self.show("output:", &self.display(&fund));
        Ok(())
    }

    fn dom(&self, input: Operand) -> CommandResult {
        let a = input.parse("A")?;
        self.show("dom:", &self.display(&cofinality(&a)));
        Ok(())
    }

    fn less_than(&self, input: Operand) -> CommandResult {
        let (a, b) = input
            .split_once('<')
            .ok_or(HostError::ExpectedComparison)?;
        let a = a.parse("A")?;
        let b = b.parse("B")?;
        println!("{}", compare_less_than(&a, &b));
        Ok(())
    }

    fn parse(&self, input: Operand) -> CommandResult {
        let a = input.parse("A")?;
        println!("{a}");
        self.show("display:", &self.display(&a));
        Ok(())
    }

    fn set(&mut self, input: Operand) -> CommandResult {
        let mut words = input.text.split_whitespace();
        let (name, value) = match (words.next(), words.next(), words.next()) {
            (Some(name), Some(value), None) => (name, value),
            _ => return Err(HostError::ExpectedSetting.into()),
        };
        let value = match value {
            "on" | "true" | "1" => true,
            "off" | "false" | "0" => false,
            _ => return Err(HostError::ExpectedSwitch(value.to_string()).into()),
        };
        self.options.set(name, value)?;
        Ok(())
    }

    fn show_options(&self) {
        for (name, value) in self.options.flags() {
            println!("{name:<12} {}", if value { "on" } else { "off" });
        }
    }

    fn show_help() {
        println!(
            "{}",
            r#"
A[B]                -- same as :fund A[B]
A < B               -- same as :lt A < B
A                   -- same as :parse A
:fund     A[B]      -- show the B-th term of the fundamental sequence of A
:dom      A         -- show the cofinality of A
:lt       A < B     -- decide whether A < B
:parse    A         -- show A unabbreviated and abbreviated
:set      opt on    -- toggle a display option (omega, large-omega, iota,
                       subscript, braces, unary, tex)
:options            -- show the display options
:help               -- show this message

Terms: 0, 1, 2, ..., w, W, I, M(a), p(a,b), p(b), p_a(b), p_{a}(b), a+b
        "#
            .trim()
        );
    }

    fn handle_repl_input(&mut self, line: &str) -> CommandResult {
        let (cmd, input) = split_command(line);
        let input = Operand {
            text: input,
            offset: line[..line.len() - input.len()].chars().count(),
        };
        match cmd {
            "" if input.text.contains('<') => self.less_than(input)?,
            "" if input.text.contains('[') => self.fund(input)?,
            "" | "p" | "parse" => self.parse(input)?,
            "f" | "fund" => self.fund(input)?,
            "d" | "dom" => self.dom(input)?,
            "l" | "lt" => self.less_than(input)?,
            "s" | "set" => self.set(input)?,
            "o" | "options" => self.show_options(),
            "h" | "he" | "hel" | "help" => Self::show_help(),
            _ => {
                eprintln!("Unknown command {cmd}");
                Self::show_help();
            }
        }
        Ok(())
    }
}
impl repl::Repl for Repl {
    type Error = anyhow::Error;
    const HISTORY: Option<&'static str> = Some("/tmp/sropsi.history");
    fn evaluate(&mut self, input: String) -> Result<(), Self::Error> {
        match self.handle_repl_input(&input) {
            Ok(()) => {}
            Err(Failure::Core(CoreError::Syntax(es))) => {
                for e in es {
                    build_report(&e).eprint(Source::from(&input))?;
                }
            }
            Err(Failure::Core(CoreError::Internal(e))) => {
                eprintln!("{} {e}", "internal error:".fg(Color::Magenta));
            }
            Err(Failure::Host(e)) => {
                eprintln!("{} {e}", "error:".fg(Color::Yellow));
            }
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    init_tracing();
    println!("Hi, this is a ψ/M ordinal notation calculator. :h to show help");
    println!();
    repl::start_repl(Repl::default()).staticalize()?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn run(line: &str) -> CommandResult {
        Repl::default().handle_repl_input(line)
    }

    #[test]
    fn test_missing_operands() {
        assert!(matches!(
            run("[3]"),
            Err(Failure::Host(HostError::MissingOperand("A")))
        ));
        assert!(matches!(
            run("w[ ]"),
            Err(Failure::Host(HostError::MissingOperand("B")))
        ));
        assert!(matches!(
            run("w <"),
            Err(Failure::Host(HostError::MissingOperand("B")))
        ));
        assert!(matches!(
            run(":dom"),
            Err(Failure::Host(HostError::MissingOperand("A")))
        ));
        assert!(matches!(
            run(":fund w"),
            Err(Failure::Host(HostError::ExpectedIndex))
        ));
    }

    #[test]
    fn test_error_positions() {
        match run("w[1+0]") {
            Err(Failure::Core(CoreError::Syntax(es))) => assert_eq!(es[0].position(), 4),
            other => panic!("unexpected {other:?}"),
        }
        match run(":lt 1 < x") {
            Err(Failure::Core(CoreError::Syntax(es))) => assert_eq!(es[0].position(), 8),
            other => panic!("unexpected {other:?}"),
        }
        match run("ψ(0,1) < ψ(") {
            Err(Failure::Core(CoreError::Syntax(es))) => assert_eq!(es[0].position(), 11),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_split_command() {
        assert_eq!(split_command(":help"), ("help", ""));
        assert_eq!(split_command(": help"), ("help", ""));
        assert_eq!(split_command(":  dom w+1"), ("dom", "w+1"));
        assert_eq!(split_command("w[3]"), ("", "w[3]"));
        assert!(matches!(
            run(": dom"),
            Err(Failure::Host(HostError::MissingOperand("A")))
        ));
    }

    #[test]
    fn test_commands() {
        let mut repl = Repl::default();
        repl.handle_repl_input("w[3]").unwrap();
        repl.handle_repl_input(":fund I[w]").unwrap();
        repl.handle_repl_input("W < I").unwrap();
        repl.handle_repl_input(":dom p(1,W)").unwrap();
        repl.handle_repl_input(":set omega on").unwrap();
        repl.handle_repl_input(":set t on").unwrap();
        assert!(repl.options.omega && repl.options.tex);
        repl.handle_repl_input(":set tex off").unwrap();
        assert!(!repl.options.tex);
        assert!(matches!(
            repl.handle_repl_input(":set tex maybe"),
            Err(Failure::Host(HostError::ExpectedSwitch(_)))
        ));
        assert!(matches!(
            repl.handle_repl_input(":set colour on"),
            Err(Failure::Host(HostError::UnknownOption(_)))
        ));
        assert!(matches!(
            repl.handle_repl_input("p(0,M(0))[1]"),
            Err(Failure::Core(CoreError::Internal(_)))
        ));
    }
}
