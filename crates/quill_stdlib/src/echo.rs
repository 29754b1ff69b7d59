//! The `echo` native and its output buffer.

use std::cell::RefCell;
use std::rc::Rc;

use quill_language::Native;
use tracing::info;

/// Shared buffer of lines written by `echo`.
///
/// Clones share the same buffer, so the host keeps one handle while the VM
/// owns another.
#[derive(Clone, Debug, Default)]
pub struct EchoLog {
    lines: Rc<RefCell<Vec<String>>>,
}

impl EchoLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one line.
    pub fn push(&self, line: String) {
        self.lines.borrow_mut().push(line);
    }

    /// Returns a copy of every line written so far.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// Returns the number of lines written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.borrow().len()
    }

    /// Returns true if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.borrow().is_empty()
    }

    /// Removes and returns every line.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.borrow_mut())
    }
}

/// Builds the `echo` native writing into `log`.
///
/// `echo(a, b, c)` records the line `a, b, c` and returns its last argument,
/// or 0 when called with none.
pub fn echo(log: EchoLog) -> impl Native {
    move |args: &[i64]| {
        let line = format_args_line(args);
        info!(target: "quill::echo", "{line}");
        log.push(line);
        args.last().copied().unwrap_or(0)
    }
}

fn format_args_line(args: &[i64]) -> String {
    args.iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
