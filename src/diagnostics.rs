//! Diagnostics sink.
//!
//! The scanner, parser, resolver and interpreter never write diagnostics
//! themselves. They produce [`LoxError`](crate::error::LoxError) values, and
//! the session hands each one to a [`Reporter`] exactly once.

/// Receives diagnostics from every stage of the pipeline.
pub trait Reporter {
    /// A static (lex/parse/resolve) diagnostic.
    ///
    /// `location` is `"at end"`, `"at '<lexeme>'"`, or empty.
    fn report(&mut self, line: usize, location: &str, message: &str);

    /// A runtime diagnostic.
    fn runtime(&mut self, line: usize, message: &str) {
        self.report(line, "", message);
    }
}

fn format_static(line: usize, location: &str, message: &str) -> String {
    if location.is_empty() {
        format!("[line {}] Error: {}", line, message)
    } else {
        format!("[line {}] Error {}: {}", line, location, message)
    }
}

fn format_runtime(line: usize, message: &str) -> String {
    format!("{}\n[line {}]", message, line)
}

/// Writes diagnostics to standard error in the classic Lox format.
#[derive(Debug, Default)]
pub struct StderrReporter;

impl Reporter for StderrReporter {
    fn report(&mut self, line: usize, location: &str, message: &str) {
        eprintln!("{}", format_static(line, location, message));
    }

    fn runtime(&mut self, line: usize, message: &str) {
        eprintln!("{}", format_runtime(line, message));
    }
}

/// Keeps formatted diagnostics in memory, one entry per report.
#[derive(Debug, Default, Clone)]
pub struct CollectingReporter {
    pub messages: Vec<String>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for CollectingReporter {
    fn report(&mut self, line: usize, location: &str, message: &str) {
        self.messages.push(format_static(line, location, message));
    }

    fn runtime(&mut self, line: usize, message: &str) {
        self.messages.push(format_runtime(line, message));
    }
}
