use std::io::{self, BufRead, Write};

pub const SAVE_PROMPT: &str = "Do you wish to save to csv? Y/N: ";
pub const DISCARD_MESSAGE: &str = "Operation complete.  Quitting.";

/// Ask whether to save. `y`/`yes` in any case confirms; anything else,
/// including end of input, declines.
pub fn confirm_save<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<bool> {
    write!(output, "{SAVE_PROMPT}")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim();
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}
