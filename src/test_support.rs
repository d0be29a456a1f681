//! Scripted process runner for unit tests.

use crate::process::{CommandLine, ProcessOutcome, ProcessRunner};
use crate::{InstallContext, MemorySink, Platform, Sink};
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Runner that records every invocation and answers from a script.
///
/// Each run writes the command line to the sink's standard channel (unless
/// silenced) so tests can check output ordering. Commands not in the script
/// succeed.
#[derive(Default)]
pub(crate) struct ScriptedRunner {
    by_program: HashMap<String, ProcessOutcome>,
    by_command: HashMap<String, ProcessOutcome>,
    invocations: Mutex<Vec<String>>,
    silent: bool,
}

impl ScriptedRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// `program` is not installed.
    pub(crate) fn missing(mut self, program: &str) -> Self {
        self.by_program
            .insert(program.to_string(), ProcessOutcome::NotFound);
        self
    }

    /// Every invocation of `program` exits with `code`.
    pub(crate) fn exit(mut self, program: &str, code: i32) -> Self {
        self.by_program
            .insert(program.to_string(), ProcessOutcome::Exited { code });
        self
    }

    /// The exact command line `command` exits with `code`.
    pub(crate) fn exit_for(mut self, command: &str, code: i32) -> Self {
        self.by_command
            .insert(command.to_string(), ProcessOutcome::Exited { code });
        self
    }

    /// Do not write anything to the sink.
    pub(crate) fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    /// Command lines run so far, in order.
    pub(crate) fn invocations(&self) -> Vec<String> {
        self.invocations.lock().unwrap().clone()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run<'a>(
        &'a self,
        command: &'a CommandLine,
        _cwd: &'a Path,
        sink: &'a dyn Sink,
    ) -> BoxFuture<'a, ProcessOutcome> {
        async move {
            let display = command.display();
            self.invocations.lock().unwrap().push(display.clone());

            let outcome = self
                .by_command
                .get(&display)
                .or_else(|| self.by_program.get(&command.program))
                .cloned()
                .unwrap_or(ProcessOutcome::SUCCESS);

            if !self.silent && outcome != ProcessOutcome::NotFound {
                sink.stdout(&display);
            }
            outcome
        }
        .boxed()
    }
}

/// Unix context at `/work` that does not echo command lines.
pub(crate) fn scripted_context(runner: Arc<ScriptedRunner>, sink: Arc<MemorySink>) -> InstallContext {
    InstallContext::builder("/work")
        .platform(Platform::Unix)
        .runner(runner)
        .sink(sink)
        .echo_commands(false)
        .build()
}
