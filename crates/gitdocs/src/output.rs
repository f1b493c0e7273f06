//! Terminal output for the CLI.
//!
//! Status lines go to stderr so that `gitdocs index --json` can be piped.
//! Colors are dropped automatically when the stream is not a terminal.

use console::{Style, Term};

pub(crate) struct Output {
    status: Term,
    results: Term,
    failure: Style,
    emphasis: Style,
    secondary: Style,
}

impl Output {
    pub(crate) fn new() -> Self {
        Self {
            status: Term::stderr(),
            results: Term::stdout(),
            failure: Style::new().red(),
            emphasis: Style::new().cyan().bold(),
            secondary: Style::new().dim(),
        }
    }

    /// Status line on stderr.
    pub(crate) fn info(&self, msg: &str) {
        emit(&self.status, None, msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        emit(&self.status, Some(&self.failure), msg);
    }

    /// Status line that should stand out, like the listening address.
    pub(crate) fn highlight(&self, msg: &str) {
        emit(&self.status, Some(&self.emphasis), msg);
    }

    /// Command result on stdout.
    pub(crate) fn result(&self, msg: &str) {
        emit(&self.results, None, msg);
    }

    pub(crate) fn result_dim(&self, msg: &str) {
        emit(&self.results, Some(&self.secondary), msg);
    }
}

// A closed pipe is not worth failing the command over.
fn emit(term: &Term, style: Option<&Style>, msg: &str) {
    let _ = match style {
        Some(style) => term.write_line(&style.apply_to(msg).to_string()),
        None => term.write_line(msg),
    };
}
