use rustyline::{error::ReadlineError, Editor};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error<E> {
    #[error(transparent)]
    Readline(ReadlineError),
    #[error("command failed: {0:?}")]
    Command(E),
}

/// A line-oriented session. Lines ending in `\` continue on the next line.
pub trait Repl {
    type Error: std::fmt::Debug;
    const PROMPT: &'static str = ">> ";
    const CONTINUATION_PROMPT: &'static str = ".. ";
    const HISTORY: Option<&'static str> = None;
    /// Handles one complete, non-blank input.
    fn evaluate(&mut self, input: String) -> Result<(), Self::Error>;
}

pub fn start_repl<R: Repl>(mut repl: R) -> Result<(), Error<R::Error>> {
    let mut editor = Editor::<()>::new();
    if let Some(history) = R::HISTORY {
        editor.load_history(history).ok();
    }
    let mut pending: Option<String> = None;
    loop {
        let prompt = if pending.is_some() {
            R::CONTINUATION_PROMPT
        } else {
            R::PROMPT
        };
        match editor.readline(prompt) {
            Ok(mut line) if line.ends_with('\\') => {
                line.pop();
                line.push(' ');
                pending.get_or_insert_with(String::new).push_str(&line);
            }
            Ok(line) => {
                let input = match pending.take() {
                    Some(mut input) => {
                        input.push_str(&line);
                        input
                    }
                    None => line,
                };
                if input.trim().is_empty() {
                    continue;
                }
                editor.add_history_entry(input.as_str());
                repl.evaluate(input).map_err(Error::Command)?;
                if let Some(history) = R::HISTORY {
                    editor.save_history(history).map_err(Error::Readline)?;
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                println!("Bye!");
                break Ok(());
            }
            Err(e) => break Err(Error::Readline(e)),
        }
    }
}
