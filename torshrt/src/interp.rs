//! Command table and dispatch.
//!
//! Evaluation is strictly single-threaded request-response: parse, resolve,
//! compute, store, return. Handlers run inside a panic boundary so a fault
//! deep in the wrapped library surfaces as a command error and the registry
//! stays usable.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

use once_cell::sync::Lazy;

use crate::binder::{BoundArgs, CommandSpec};
use crate::commands;
use crate::error::RtError;
use crate::list;
use crate::registry::Registry;

pub type Handler = fn(&mut Registry, &BoundArgs) -> Result<String, RtError>;

pub struct Command {
    pub spec: CommandSpec,
    pub run: Handler,
}

#[derive(Default)]
pub struct CommandTable {
    commands: Vec<Command>,
    by_name: BTreeMap<String, usize>,
}

impl CommandTable {
    pub fn new() -> Self {
        CommandTable::default()
    }

    /// Register under the canonical snake_case name and a camelCase alias.
    pub fn register(&mut self, spec: CommandSpec, run: Handler) {
        let canonical = spec.name;
        let camel = camel_case(canonical);
        let idx = self.commands.len();
        self.by_name.insert(canonical.to_string(), idx);
        if camel != canonical {
            self.by_name.insert(camel, idx);
        }
        self.commands.push(Command { spec, run });
    }

    pub fn lookup(&self, name: &str) -> Option<&Command> {
        self.by_name.get(name).map(|&idx| &self.commands[idx])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }
}

static TABLE: Lazy<CommandTable> = Lazy::new(|| {
    let mut table = CommandTable::new();
    commands::register_all(&mut table);
    table
});

pub fn command_table() -> &'static CommandTable {
    &TABLE
}

pub struct Interp {
    registry: Registry,
}

impl Interp {
    pub fn new() -> Self {
        Interp {
            registry: Registry::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Evaluate one command given as words (command name first).
    pub fn eval_words(&mut self, words: &[String]) -> Result<String, RtError> {
        let Some((name, rest)) = words.split_first() else {
            return Ok(String::new());
        };
        let Some(command) = TABLE.lookup(name) else {
            return Err(RtError::argument(format!("invalid command name \"{name}\"")));
        };
        let bound = command.spec.bind(rest)?;
        let registry = &mut self.registry;
        match panic::catch_unwind(AssertUnwindSafe(|| (command.run)(registry, &bound))) {
            Ok(result) => result,
            Err(payload) => Err(RtError::domain(panic_message(payload))),
        }
    }

    pub fn eval_line(&mut self, line: &str) -> Result<String, RtError> {
        let words = list::split_words(line)?;
        self.eval_words(&words)
    }

    /// Evaluate a script line by line (blank lines and `#` comments skipped),
    /// stopping at the first error; returns the last command's result.
    pub fn eval_script(&mut self, source: &str) -> Result<String, RtError> {
        let mut last = String::new();
        for line in source.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            last = self.eval_line(trimmed)?;
        }
        Ok(last)
    }
}

impl Default for Interp {
    fn default() -> Self {
        Interp::new()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "error inside tensor library".to_string()
    }
}

fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
