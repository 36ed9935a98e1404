//! ui::prompts
//!
//! Interactive prompts.
//!
//! # Design
//!
//! Prompts are only shown in interactive mode. In non-interactive mode,
//! operations requiring user input must either have defaults or fail with a
//! clear error message.

use std::io::{self, BufRead, Write};

use thiserror::Error;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("not in interactive mode")]
    NotInteractive,

    #[error("IO error: {0}")]
    IoError(String),
}

/// Prompt for a line of text input.
///
/// Returns the entered line with trailing whitespace trimmed; an empty line
/// is returned as an empty string, which callers treat as "skipped" where a
/// prompt is optional.
pub fn input(message: &str, interactive: bool) -> Result<String, PromptError> {
    if !interactive {
        return Err(PromptError::NotInteractive);
    }

    let mut stderr = io::stderr();
    write!(stderr, "{}: ", message).map_err(|e| PromptError::IoError(e.to_string()))?;
    stderr
        .flush()
        .map_err(|e| PromptError::IoError(e.to_string()))?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| PromptError::IoError(e.to_string()))?;
    Ok(line.trim_end().to_string())
}

/// Prompt for confirmation (yes/no).
///
/// Returns the default on an empty answer. Fails in non-interactive mode so
/// callers fall back to their `--force`-style flags.
pub fn confirm(message: &str, default: bool, interactive: bool) -> Result<bool, PromptError> {
    if !interactive {
        return Err(PromptError::NotInteractive);
    }

    let hint = if default { "Y/n" } else { "y/N" };
    let answer = input(&format!("{} [{}]", message, hint), interactive)?;
    match answer.to_lowercase().as_str() {
        "" => Ok(default),
        "y" | "yes" => Ok(true),
        _ => Ok(false),
    }
}
