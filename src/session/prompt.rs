//! Line-oriented prompting with validate-and-retry loops.

use super::SessionError;
use crate::validation::{EntropySeed, SeedError};
use std::io::{BufRead, Write};

/// Prompts on `W` and reads answers from `R`.
///
/// Generic over the streams so that sessions can be scripted in tests.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Writes a line of output.
    pub fn say(&mut self, text: &str) -> Result<(), SessionError> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    /// Mutable access to the output stream.
    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    /// Asks `prompt` and returns the answer without its line ending.
    pub fn line(&mut self, prompt: &str) -> Result<String, SessionError> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            return Err(SessionError::InputClosed);
        }
        let trimmed = answer.trim_end_matches(['\r', '\n']).len();
        answer.truncate(trimmed);
        Ok(answer)
    }

    /// Asks until the answer is a whole number of at least `min`.
    pub fn integer(&mut self, prompt: &str, min: usize) -> Result<usize, SessionError> {
        loop {
            let answer = self.line(prompt)?;
            match answer.trim().parse::<usize>() {
                Ok(value) if value >= min => return Ok(value),
                Ok(_) => self.say(&format!("Please enter a number of at least {min}."))?,
                Err(_) => self.say("Please enter a whole number.")?,
            }
        }
    }

    /// Asks until the answer is `y` or `n` (either case).
    pub fn yes_no(&mut self, prompt: &str) -> Result<bool, SessionError> {
        loop {
            let answer = self.line(prompt)?;
            match answer.trim() {
                a if a.eq_ignore_ascii_case("y") => return Ok(true),
                a if a.eq_ignore_ascii_case("n") => return Ok(false),
                _ => self.say("You must enter y (for yes) or n (for no).")?,
            }
        }
    }

    /// Reads at least `min_rolls` dice rolls.
    pub fn dice_seed(&mut self, min_rolls: usize) -> Result<EntropySeed, SessionError> {
        let prompt = format!(
            "Enter {min_rolls} dice rolls (example: 62543 16325 21341...) \
             Spaces are OK, and will be ignored:\n"
        );
        self.seed_loop(&prompt, |raw| EntropySeed::dice(raw, min_rolls))
    }

    /// Reads at least `min_bytes` bytes of hex computer entropy.
    pub fn computer_seed(&mut self, min_bytes: usize) -> Result<EntropySeed, SessionError> {
        let prompt = format!(
            "Enter at least {} characters of computer entropy. \
             Spaces are OK, and will be ignored:\n",
            min_bytes * 2
        );
        self.seed_loop(&prompt, |raw| EntropySeed::computer(raw, min_bytes))
    }

    fn seed_loop(
        &mut self,
        prompt: &str,
        parse: impl Fn(&str) -> Result<EntropySeed, SeedError>,
    ) -> Result<EntropySeed, SessionError> {
        loop {
            let raw = self.line(prompt)?;
            match parse(&raw) {
                Ok(seed) => return Ok(seed),
                Err(reason) => self.say(&format!("Error: {reason}"))?,
            }
        }
    }

    /// Returns the underlying streams.
    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }
}
