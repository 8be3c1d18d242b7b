use std::io::{self, BufRead, Write};

use crate::error::{PulseError, Result};

pub fn ask(prompt: &str) -> Result<String> {
  let stdin = io::stdin();
  ask_with(&mut stdin.lock(), &mut io::stdout(), prompt)
}

pub fn confirm(prompt: &str) -> Result<bool> {
  let stdin = io::stdin();
  confirm_with(&mut stdin.lock(), &mut io::stdout(), prompt)
}

pub fn ask_with(input: &mut impl BufRead, output: &mut impl Write, prompt: &str) -> Result<String> {
  write!(output, "{}", prompt).map_err(|e| PulseError::io("<stdout>", e))?;
  output.flush().map_err(|e| PulseError::io("<stdout>", e))?;

  let mut line = String::new();
  let read = input.read_line(&mut line).map_err(|e| PulseError::io("<stdin>", e))?;
  if read == 0 {
    return Err(PulseError::Cancelled);
  }
  Ok(line.trim().to_string())
}

/// Only an explicit `y`/`yes` counts as consent.
pub fn confirm_with(input: &mut impl BufRead, output: &mut impl Write, prompt: &str) -> Result<bool> {
  let answer = ask_with(input, output, prompt)?.to_lowercase();
  Ok(answer == "y" || answer == "yes")
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Cursor;

  #[test]
  fn confirm_accepts_yes() {
    let mut out = Vec::new();
    assert!(confirm_with(&mut Cursor::new("Y\n"), &mut out, "go? ").unwrap());
    assert!(confirm_with(&mut Cursor::new("yes\n"), &mut out, "go? ").unwrap());
    assert_eq!(String::from_utf8(out).unwrap(), "go? go? ");
  }

  #[test]
  fn confirm_defaults_to_no() {
    let mut out = Vec::new();
    assert!(!confirm_with(&mut Cursor::new("\n"), &mut out, "go? ").unwrap());
    assert!(!confirm_with(&mut Cursor::new("nope\n"), &mut out, "go? ").unwrap());
  }

  #[test]
  fn eof_cancels() {
    let mut out = Vec::new();
    let err = ask_with(&mut Cursor::new(""), &mut out, "dirs: ").unwrap_err();
    assert!(matches!(err, PulseError::Cancelled));
  }
}
