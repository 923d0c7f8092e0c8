//! Session driver: source text in, side effects and a [`Status`] out.
//!
//! A [`Lox`] session owns one interpreter, so globals defined by one
//! [`Lox::run`] call are visible to the next (this is what the REPL relies
//! on). Every diagnostic goes to the supplied [`Reporter`] exactly once; the
//! outcome is returned rather than kept in a flag.

use log::{debug, info};

use crate::diagnostics::Reporter;
use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;
use crate::value::Value;

/// Session settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Execute the statements that survived lex/parse errors instead of
    /// stopping after reporting them. Resolve errors always stop the run.
    pub recover: bool,
}

/// Outcome of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,

    /// Lex, parse or resolve errors were reported.
    StaticError,

    /// Execution stopped at a runtime error.
    RuntimeError,
}

impl Status {
    /// Conventional `sysexits` code for this outcome.
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::StaticError => 65,
            Status::RuntimeError => 70,
        }
    }
}

pub struct Lox {
    interpreter: Interpreter,
    options: Options,
}

impl Default for Lox {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl Lox {
    /// Session printing to stdout.
    pub fn new(options: Options) -> Self {
        Self::with_interpreter(Interpreter::new(), options)
    }

    pub fn with_interpreter(interpreter: Interpreter, options: Options) -> Self {
        info!("Lox session created with {:?}", options);

        Self {
            interpreter,
            options,
        }
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    pub fn interpreter_mut(&mut self) -> &mut Interpreter {
        &mut self.interpreter
    }

    /// Scan, parse, resolve and execute `source`.
    pub fn run(&mut self, source: &str, reporter: &mut dyn Reporter) -> Status {
        info!("Running {} bytes of source", source.len());

        let (tokens, lex_errors) = Scanner::new(source).scan_all();
        report_all(&lex_errors, reporter);

        let parsed = Parser::new(tokens).parse();
        report_all(&parsed.errors, reporter);

        let had_static_error = !lex_errors.is_empty() || parsed.has_errors();

        if had_static_error && !self.options.recover {
            debug!("Static errors reported; not executing");
            return Status::StaticError;
        }

        if let Err(errors) = Resolver::new(&mut self.interpreter).resolve(&parsed.statements) {
            report_all(&errors, reporter);
            return Status::StaticError;
        }

        if let Err(e) = self.interpreter.interpret(&parsed.statements) {
            e.report(reporter);
            return Status::RuntimeError;
        }

        if had_static_error {
            Status::StaticError
        } else {
            Status::Ok
        }
    }

    /// Parse `source` as a single expression and evaluate it against the
    /// session's globals.
    pub fn evaluate(
        &mut self,
        source: &str,
        reporter: &mut dyn Reporter,
    ) -> std::result::Result<Value, Status> {
        let (tokens, lex_errors) = Scanner::new(source).scan_all();
        if !lex_errors.is_empty() {
            report_all(&lex_errors, reporter);
            return Err(Status::StaticError);
        }

        let expr = Parser::new(tokens).parse_expression().map_err(|e| {
            e.report(reporter);
            Status::StaticError
        })?;

        self.interpreter.evaluate(&expr).map_err(|e| {
            e.report(reporter);
            Status::RuntimeError
        })
    }
}

fn report_all(errors: &[LoxError], reporter: &mut dyn Reporter) {
    for error in errors {
        error.report(reporter);
    }
}
