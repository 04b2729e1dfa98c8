//! Line-based terminal prompts. Generic over the streams so they can be
//! driven from tests.
use std::io::{self, BufRead, Write};

use expander_engine::SessionFile;

/// Asks a yes/no question. Only `y`/`yes` (any case) count as yes; end of
/// input counts as no.
pub(crate) fn ask_yes_no(
    input: &mut impl BufRead,
    output: &mut impl Write,
    question: &str,
) -> io::Result<bool> {
    let answer = ask_line(input, output, &format!("{question} (y/n): "))?;
    Ok(matches!(
        answer.as_deref().map(str::to_ascii_lowercase).as_deref(),
        Some("y" | "yes")
    ))
}

/// Prints `prompt` and reads one line. Returns `None` on end of input or a
/// blank answer.
pub(crate) fn ask_line(
    input: &mut impl BufRead,
    output: &mut impl Write,
    prompt: &str,
) -> io::Result<Option<String>> {
    write!(output, "{prompt}")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let line = line.trim();
    Ok((!line.is_empty()).then(|| line.to_string()))
}

pub(crate) fn confirm_resume(
    input: &mut impl BufRead,
    output: &mut impl Write,
    saved: &SessionFile,
) -> io::Result<bool> {
    writeln!(
        output,
        "Found a saved session for seed \"{}\": query {} of {}, page {}, {} unique results so far.",
        saved.context.seed,
        saved.state.current_query_index + 1,
        saved.context.query_count,
        saved.state.current_page,
        saved.state.unique_count_for_current_query
    )?;
    ask_yes_no(input, output, "Resume previous session?")
}
