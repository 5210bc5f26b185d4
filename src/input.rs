use std::{
    fmt::Display,
    io::{BufRead, Write},
};

use anyhow::Context;
use log::{debug, warn};

pub const PROMPT: &str = "Enter your name: ";

/// Operator answer to the prompt with surrounding whitespace removed
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UserInput(String);

impl UserInput {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserInput {
    fn from(value: &str) -> Self {
        Self(value.trim().to_string())
    }
}

impl Display for UserInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Writes the prompt to `prompt_out` and blocks until a line is read from `reader`
///
/// End of input is treated as an empty answer
pub fn read_user_input<R, W>(mut reader: R, mut prompt_out: W) -> anyhow::Result<UserInput>
where
    R: BufRead,
    W: Write,
{
    write!(prompt_out, "{PROMPT}").context("Failed to write prompt")?;
    prompt_out.flush().context("Failed to flush prompt")?;

    let mut line = String::new();
    let bytes_read = reader
        .read_line(&mut line)
        .context("Failed to read user input")?;
    if bytes_read == 0 {
        warn!("End of input reached before a line was entered, using empty input");
    }

    let result = UserInput::from(line.as_str());
    debug!("User input read: {result:?}");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("  Alice  \n", "Alice")]
    #[case("Bob\n", "Bob")]
    #[case("\tMary Ann \r\n", "Mary Ann")]
    #[case("   \n", "")]
    #[case("no newline", "no newline")]
    fn trims_surrounding_whitespace(#[case] typed: &str, #[case] expected: &str) {
        // Arrange
        let mut prompt_out = Vec::new();

        // Act
        let actual = read_user_input(typed.as_bytes(), &mut prompt_out).unwrap();

        // Assert
        assert_eq!(actual.as_str(), expected);
    }

    #[test]
    fn writes_prompt() {
        let mut prompt_out = Vec::new();
        read_user_input("x\n".as_bytes(), &mut prompt_out).unwrap();
        assert_eq!(prompt_out, PROMPT.as_bytes());
    }

    #[test]
    fn only_first_line_consumed() {
        let actual = read_user_input("first\nsecond\n".as_bytes(), Vec::new()).unwrap();
        assert_eq!(actual, UserInput::from("first"));
    }

    #[test]
    fn end_of_input_is_empty() {
        let actual = read_user_input("".as_bytes(), Vec::new()).unwrap();
        assert_eq!(actual, UserInput::default());
    }
}
