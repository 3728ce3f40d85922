//! Operator confirmation.

use std::io::{self, BufRead, Write};

pub const PROMPT: &str = "Do you want to proceed: [y/n]? ";

/// Shows `heading` and `body`, asks for confirmation and reads one line.
///
/// Only an answer starting with `y` or `Y` proceeds. End of input and an
/// empty answer both decline.
pub fn confirm(
    input: &mut dyn BufRead,
    output: &mut dyn Write,
    heading: &str,
    body: &str,
) -> io::Result<bool> {
    writeln!(output, "{heading}:\n{}\n", body.trim_end())?;
    write!(output, "{PROMPT}")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(is_affirmative(&answer))
}

pub fn is_affirmative(answer: &str) -> bool {
    answer
        .trim()
        .chars()
        .next()
        .is_some_and(|c| c.eq_ignore_ascii_case(&'y'))
}
