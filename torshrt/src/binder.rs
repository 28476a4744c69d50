//! Generic dual-syntax argument binder.
//!
//! Every command declares a schema (field name, aliases, kind, default) and
//! one engine binds the raw word vector against it, accepting positional,
//! named (`-flag value` pairs in any order), or hybrid (leading positional
//! words followed by a named tail) invocations.

use std::collections::HashMap;

use crate::error::RtError;
use crate::list;

#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    IntList(Vec<i64>),
    StrList(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// Free-form word; also used for handles, dtype and device specs, and
    /// nested numeric data, all of which the handler interprets.
    Str,
    Int,
    Float,
    Bool,
    /// Integer list; a non-zero arity broadcasts a single scalar to that
    /// many entries and rejects any other length mismatch.
    IntList(usize),
    /// Whitespace/brace-separated list of words (e.g. handle lists).
    StrList,
}

#[derive(Debug, Clone)]
pub struct ArgSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub kind: ArgKind,
    pub required: bool,
    pub default: Option<ArgValue>,
}

impl ArgSpec {
    pub fn required(name: &'static str, kind: ArgKind) -> Self {
        ArgSpec {
            name,
            aliases: &[],
            kind,
            required: true,
            default: None,
        }
    }

    pub fn optional(name: &'static str, kind: ArgKind, default: ArgValue) -> Self {
        ArgSpec {
            name,
            aliases: &[],
            kind,
            required: false,
            default: Some(default),
        }
    }

    /// Optional argument with no default; absence is meaningful to the
    /// handler (e.g. "stride defaults to the kernel size").
    pub fn opt_bare(name: &'static str, kind: ArgKind) -> Self {
        ArgSpec {
            name,
            aliases: &[],
            kind,
            required: false,
            default: None,
        }
    }

    pub fn with_aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    fn matches(&self, flag: &str) -> bool {
        flag == self.name || self.aliases.contains(&flag)
    }
}

#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub name: &'static str,
    pub usage: &'static str,
    pub args: Vec<ArgSpec>,
}

/// A word selects named mode when it starts with `-` followed by something
/// that cannot begin a number, so negative values stay positional.
fn is_flag(word: &str) -> bool {
    let bytes = word.as_bytes();
    bytes.len() >= 2 && bytes[0] == b'-' && !bytes[1].is_ascii_digit() && bytes[1] != b'.'
}

impl CommandSpec {
    pub fn new(name: &'static str, usage: &'static str) -> Self {
        CommandSpec {
            name,
            usage,
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: ArgSpec) -> Self {
        self.args.push(arg);
        self
    }

    pub fn bind(&self, argv: &[String]) -> Result<BoundArgs, RtError> {
        let mut values: HashMap<&'static str, ArgValue> = HashMap::new();
        for spec in &self.args {
            if let Some(default) = &spec.default {
                values.insert(spec.name, default.clone());
            }
        }

        let mut i = 0;
        let mut pos = 0;
        let mut saw_named = false;
        if !argv.is_empty() && !is_flag(&argv[0]) {
            while i < argv.len() && !is_flag(&argv[i]) {
                let Some(spec) = self.args.get(pos) else {
                    return Err(self.wrong_num_args());
                };
                values.insert(spec.name, coerce(spec, &argv[i])?);
                pos += 1;
                i += 1;
            }
        }
        while i < argv.len() {
            let word = &argv[i];
            if !is_flag(word) {
                return Err(self.wrong_num_args());
            }
            saw_named = true;
            let flag = &word[1..];
            let Some(spec) = self.args.iter().find(|a| a.matches(flag)) else {
                return Err(RtError::argument(format!("Unknown parameter: -{flag}")));
            };
            let Some(value) = argv.get(i + 1) else {
                return Err(RtError::argument(format!(
                    "Missing value for parameter -{flag}"
                )));
            };
            values.insert(spec.name, coerce(spec, value)?);
            i += 2;
        }

        // Short positional calls report arity; named calls report the field.
        let required_total = self.args.iter().filter(|a| a.required).count();
        if !saw_named && pos < required_total {
            return Err(self.wrong_num_args());
        }
        for spec in &self.args {
            if spec.required && !values.contains_key(spec.name) {
                return Err(RtError::argument(format!(
                    "Required parameter missing: -{}",
                    spec.name
                )));
            }
        }
        Ok(BoundArgs { values })
    }

    fn wrong_num_args(&self) -> RtError {
        RtError::argument(format!("wrong # args: should be \"{}\"", self.usage))
    }
}

fn coerce(spec: &ArgSpec, raw: &str) -> Result<ArgValue, RtError> {
    match spec.kind {
        ArgKind::Str => Ok(ArgValue::Str(raw.to_string())),
        ArgKind::Int => raw.parse::<i64>().map(ArgValue::Int).map_err(|_| {
            RtError::argument(format!(
                "Invalid integer value for -{}: \"{raw}\"",
                spec.name
            ))
        }),
        ArgKind::Float => raw.parse::<f64>().map(ArgValue::Float).map_err(|_| {
            RtError::argument(format!("Invalid float value for -{}: \"{raw}\"", spec.name))
        }),
        ArgKind::Bool => match raw {
            "true" | "1" => Ok(ArgValue::Bool(true)),
            "false" | "0" => Ok(ArgValue::Bool(false)),
            _ => Err(RtError::argument(format!(
                "Invalid boolean value for -{}: \"{raw}\"",
                spec.name
            ))),
        },
        ArgKind::IntList(arity) => {
            let items = list::split_list(raw)?;
            let mut out = Vec::with_capacity(items.len());
            for item in &items {
                let v = item.parse::<i64>().map_err(|_| {
                    RtError::argument(format!(
                        "Invalid integer value for -{}: \"{item}\"",
                        spec.name
                    ))
                })?;
                out.push(v);
            }
            if arity > 0 {
                if out.len() == 1 {
                    out = vec![out[0]; arity];
                } else if out.len() != arity {
                    return Err(RtError::argument(format!(
                        "Expected {arity} values for -{}, got {}",
                        spec.name,
                        out.len()
                    )));
                }
            }
            Ok(ArgValue::IntList(out))
        }
        ArgKind::StrList => Ok(ArgValue::StrList(list::split_list(raw)?)),
    }
}

/// Fully bound arguments for one invocation. Getters return an error on a
/// schema/getter mismatch instead of panicking; absence of an optional
/// argument without a default surfaces through the `opt_*` getters.
#[derive(Debug)]
pub struct BoundArgs {
    values: HashMap<&'static str, ArgValue>,
}

impl BoundArgs {
    pub fn get_str(&self, name: &str) -> Result<&str, RtError> {
        match self.values.get(name) {
            Some(ArgValue::Str(v)) => Ok(v),
            _ => Err(missing(name)),
        }
    }

    pub fn get_int(&self, name: &str) -> Result<i64, RtError> {
        match self.values.get(name) {
            Some(ArgValue::Int(v)) => Ok(*v),
            _ => Err(missing(name)),
        }
    }

    pub fn get_float(&self, name: &str) -> Result<f64, RtError> {
        match self.values.get(name) {
            Some(ArgValue::Float(v)) => Ok(*v),
            Some(ArgValue::Int(v)) => Ok(*v as f64),
            _ => Err(missing(name)),
        }
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, RtError> {
        match self.values.get(name) {
            Some(ArgValue::Bool(v)) => Ok(*v),
            _ => Err(missing(name)),
        }
    }

    pub fn get_int_list(&self, name: &str) -> Result<&[i64], RtError> {
        match self.values.get(name) {
            Some(ArgValue::IntList(v)) => Ok(v),
            _ => Err(missing(name)),
        }
    }

    pub fn get_str_list(&self, name: &str) -> Result<&[String], RtError> {
        match self.values.get(name) {
            Some(ArgValue::StrList(v)) => Ok(v),
            _ => Err(missing(name)),
        }
    }

    pub fn opt_str(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ArgValue::Str(v)) => Some(v),
            _ => None,
        }
    }

    pub fn opt_int(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(ArgValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn opt_float(&self, name: &str) -> Option<f64> {
        match self.values.get(name) {
            Some(ArgValue::Float(v)) => Some(*v),
            Some(ArgValue::Int(v)) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn opt_int_list(&self, name: &str) -> Option<&[i64]> {
        match self.values.get(name) {
            Some(ArgValue::IntList(v)) => Some(v),
            _ => None,
        }
    }
}

fn missing(name: &str) -> RtError {
    RtError::argument(format!("Required parameter missing: -{name}"))
}
