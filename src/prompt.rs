//! One-shot confirmation prompt with TTY detection and `--assume-yes` bypass.

use crate::error::CliError;
use dialoguer::Confirm;
use std::io::{self, IsTerminal};

/// Ask the user to confirm `message`.
///
/// With `assume_yes` the call succeeds without touching stdin. When stdin is
/// not a terminal and `assume_yes` is unset, the prompt cannot be answered
/// and the command is cancelled before any API call.
pub fn confirm(assume_yes: bool, message: &str) -> Result<(), CliError> {
    if assume_yes {
        return Ok(());
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::PromptRejected);
    }
    let confirmed = Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|_| CliError::PromptRejected)?;
    if confirmed {
        Ok(())
    } else {
        Err(CliError::PromptRejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assume_yes_bypasses_prompt() {
        assert!(confirm(true, "Are you sure you want to delete volume \"v\"?").is_ok());
    }

    #[test]
    fn test_non_tty_stdin_is_rejected() {
        // Test harness stdin is not a terminal, so the prompt must refuse
        // rather than block on input.
        let result = confirm(false, "Are you sure?");
        assert!(matches!(result, Err(CliError::PromptRejected)));
    }
}
