//! Diagnostic sink shared by every pipeline stage.
//!
//! The driver owns the single [`Reporter`] and hands shared references to the
//! parser and resolver.  Errors are printed to standard error as they occur;
//! the two flags record whether a static or a runtime error was seen so the
//! driver can pick an exit code afterwards.

use std::cell::Cell;

use log::info;

use crate::error::LoxError;

#[derive(Debug, Default)]
pub struct Reporter {
    had_error: Cell<bool>,
    had_runtime_error: Cell<bool>,
}

impl Reporter {
    pub fn new() -> Self {
        Reporter {
            had_error: Cell::new(false),
            had_runtime_error: Cell::new(false),
        }
    }

    /// Print a static (scan/parse/resolve) error and raise the error flag.
    pub fn error(&self, err: &LoxError) {
        info!("Reporting static error: {}", err);

        self.had_error.set(true);
        eprintln!("{}", err);
    }

    /// Print a runtime error and raise the runtime-error flag.
    pub fn runtime_error(&self, err: &LoxError) {
        info!("Reporting runtime error: {}", err);

        self.had_runtime_error.set(true);
        eprintln!("{}", err);
    }

    pub fn had_error(&self) -> bool {
        self.had_error.get()
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error.get()
    }

    /// Clear the static-error flag.  The REPL calls this after each line so
    /// a typo does not poison the rest of the session.
    pub fn reset(&self) {
        self.had_error.set(false);
    }
}
