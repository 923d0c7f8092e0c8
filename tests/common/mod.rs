#![allow(dead_code)]

use rox::diagnostics::CollectingReporter;
use rox::interpreter::Interpreter;
use rox::lox::{Lox, Options, Status};
use rox::output::SharedBuffer;

/// What one run of a program produced.
#[derive(Debug)]
pub struct Outcome {
    pub stdout: String,
    pub diagnostics: Vec<String>,
    pub status: Status,
}

/// A session whose `print` output is captured.
pub struct Session {
    pub lox: Lox,
    pub out: SharedBuffer,
}

impl Session {
    pub fn new(options: Options) -> Self {
        let out = SharedBuffer::new();
        let interpreter = Interpreter::with_output(Box::new(out.clone()));

        Self {
            lox: Lox::with_interpreter(interpreter, options),
            out,
        }
    }

    pub fn run(&mut self, source: &str) -> Outcome {
        let mut reporter = CollectingReporter::new();
        let status = self.lox.run(source, &mut reporter);

        Outcome {
            stdout: self.out.take(),
            diagnostics: reporter.messages,
            status,
        }
    }
}

pub fn run(source: &str) -> Outcome {
    Session::new(Options::default()).run(source)
}

pub fn run_recovering(source: &str) -> Outcome {
    Session::new(Options { recover: true }).run(source)
}

/// Runs `source` expecting success, returning printed lines.
pub fn lines(source: &str) -> Vec<String> {
    let outcome = run(source);

    assert_eq!(
        outcome.status,
        Status::Ok,
        "unexpected diagnostics: {:?}",
        outcome.diagnostics
    );

    outcome.stdout.lines().map(str::to_string).collect()
}
