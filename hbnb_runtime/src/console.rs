//! Line-oriented read-eval-print loop.
//!
//! One line in, at most one block of text out. A line is fully handled
//! (parse, validate, mutate, save) before the next is read.

use std::io::{BufRead, Write};

use crate::error::ConsoleError;
use crate::interpreter::{Interpreter, Outcome};

/// Run until `quit`, `EOF` or end of input.
///
/// `prompt` is written before each read when set; pass `None` for piped
/// input. End of input prints one blank line. Storage failures stop the
/// loop and are returned.
pub fn run_console<R: BufRead, W: Write>(
    interpreter: &mut Interpreter,
    mut input: R,
    output: &mut W,
    prompt: Option<&str>,
) -> Result<(), ConsoleError> {
    let mut line = String::new();
    loop {
        if let Some(prompt) = prompt {
            write!(output, "{}", prompt)?;
            output.flush()?;
        }

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            output.flush()?;
            return Ok(());
        }

        let outcome = interpreter.handle_line(&line)?;
        let (text, exit) = match outcome {
            Outcome::Continue(text) => (text, false),
            Outcome::Exit(text) => (text, true),
        };
        if let Some(text) = text {
            writeln!(output, "{}", text)?;
        }
        output.flush()?;
        if exit {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hbnb_engine::KindRegistry;

    use crate::file_storage::FileStorage;

    fn session(script: &str, prompt: Option<&str>) -> String {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("file.json"));
        let mut interp = Interpreter::new(KindRegistry::standard(), storage);
        let mut out = Vec::new();
        run_console(&mut interp, script.as_bytes(), &mut out, prompt).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn end_of_input_prints_blank_line() {
        assert_eq!(session("", None), "\n");
        assert_eq!(session("count City\n", None), "0\n\n");
    }

    #[test]
    fn quit_stops_without_output() {
        assert_eq!(session("quit\ncount City\n", None), "");
    }

    #[test]
    fn eof_command_prints_blank_line_and_stops() {
        assert_eq!(session("EOF\ncount City\n", None), "\n");
    }

    #[test]
    fn prompt_is_written_before_each_read() {
        assert_eq!(session("\nquit\n", Some("(hbnb) ")), "(hbnb) (hbnb) ");
    }

    #[test]
    fn last_line_without_newline_still_runs() {
        assert_eq!(session("create", None), "** class name missing **\n\n");
    }
}
