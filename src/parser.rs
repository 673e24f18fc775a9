// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::spec::{Arity, Specification, Value, POSITIONAL_KEY};
use crate::tokens::{help_requested, preprocess, resolve, Resolved, Token};

/// The result of a successful parse.
///
/// Maps option names to their [Value] in the order the options were first
/// seen, followed by defaults, followed by the positional arguments (under
/// [POSITIONAL_KEY], only if there were any).
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Response {
    entries: IndexMap<String, Value>,
}

impl Response {
    /// Returns the value for the option `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Returns true if the option `name` was specified or has a default.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns true if `name` is a flag that is set.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.entries.get(name), Some(Value::Bool(true)))
    }

    /// Returns the single value of the option `name`.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.entries.get(name).and_then(Value::as_str)
    }

    /// Returns all values of the option `name` (empty for flags and
    /// absent options).
    pub fn values(&self, name: &str) -> Vec<&str> {
        self.entries
            .get(name)
            .map(Value::values)
            .unwrap_or_default()
    }

    /// Returns the positional arguments.
    pub fn args(&self) -> &[String] {
        match self.entries.get(POSITIONAL_KEY) {
            Some(Value::Many(args)) => args,
            _ => &[],
        }
    }

    /// Iterate over all entries, positional arguments included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was parsed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The option currently collecting values.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Active {
    name: String,
    remaining: Arity,
    collected: Vec<String>,
    multiple: bool,
}

impl Active {
    fn missing(&self) -> bool {
        matches!(self.remaining, Arity::Fixed(n) if n > 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Cursor {
    Idle,
    Collecting(Active),
}

/// Single-use state for one parse.
#[derive(Debug)]
struct Parser<'a> {
    spec: &'a Specification,
    cursor: Cursor,
    entries: IndexMap<String, Value>,
    positional: Vec<String>,
    end_of_options: bool,
}

impl<'a> Parser<'a> {
    fn new(spec: &'a Specification) -> Self {
        Parser {
            spec,
            cursor: Cursor::Idle,
            entries: IndexMap::new(),
            positional: Vec::new(),
            end_of_options: false,
        }
    }

    fn feed(&mut self, token: Token) -> Result<()> {
        let arg = match token {
            Token::Assigned(value) => {
                self.value(value);
                return Ok(());
            }
            Token::Plain(arg) => arg,
        };

        if self.end_of_options {
            self.positional.push(arg);
            return Ok(());
        }

        match resolve(self.spec, &arg)? {
            Resolved::Value => self.value(arg),
            Resolved::EndOfOptions => {
                self.flush()?;
                self.end_of_options = true;
            }
            Resolved::Help => return Err(Error::HelpRequested),
            Resolved::Options(names) => {
                for name in names {
                    self.start(name)?;
                }
            }
        }

        Ok(())
    }

    /// Handle a non-option argument.
    fn value(&mut self, arg: String) {
        let active = match &mut self.cursor {
            Cursor::Idle => {
                trace!(arg = %arg, "positional argument");
                self.positional.push(arg);
                return;
            }
            Cursor::Collecting(active) => active,
        };

        trace!(option = %active.name, value = %arg, "option value");

        active.collected.push(arg);

        if let Arity::Fixed(n) = active.remaining {
            active.remaining = Arity::Fixed(n.saturating_sub(1));

            if n <= 1 {
                self.commit();
            }
        }
    }

    /// Commit the active option before another option (or `--`) is handled.
    fn flush(&mut self) -> Result<()> {
        if let Cursor::Collecting(active) = &self.cursor {
            if active.missing() && !active.multiple {
                let expected = self.spec.get(&active.name).map_or(0, |opt| match opt.arity {
                    Arity::Fixed(n) => n,
                    Arity::Unbounded => 0,
                });

                return Err(Error::Arity {
                    option: active.name.clone(),
                    expected,
                    provided: active.collected.len(),
                });
            }
        }

        self.commit();

        Ok(())
    }

    /// Store the values collected for the active option and go idle.
    fn commit(&mut self) {
        let active = match std::mem::replace(&mut self.cursor, Cursor::Idle) {
            Cursor::Idle => return,
            Cursor::Collecting(active) => active,
        };

        debug!(option = %active.name, values = ?active.collected, "commit option");

        if active.collected.is_empty() {
            return;
        }

        match self.entries.get_mut(&active.name) {
            Some(Value::Many(values)) if active.multiple => values.extend(active.collected),
            _ => {
                self.entries
                    .insert(active.name, Value::Many(active.collected));
            }
        }
    }

    /// Handle an option found on the command line.
    fn start(&mut self, name: String) -> Result<()> {
        self.flush()?;

        let opt = self
            .spec
            .get(&name)
            .ok_or_else(|| Error::UnrecognizedOption(name.clone()))?;

        if !opt.multiple && self.entries.contains_key(&name) {
            return Err(Error::DuplicateOption(name));
        }

        let remaining = opt.per_occurrence();

        debug!(option = %name, ?remaining, "option");

        if remaining.is_flag() {
            self.entries.insert(name, Value::Bool(true));
            return Ok(());
        }

        self.entries
            .entry(name.clone())
            .or_insert(Value::Bool(true));

        self.cursor = Cursor::Collecting(Active {
            name,
            remaining,
            collected: Vec::new(),
            multiple: opt.multiple,
        });

        Ok(())
    }

    fn finish(mut self) -> (IndexMap<String, Value>, Vec<String>) {
        // An incomplete final option is caught by the arity check.
        self.commit();

        (self.entries, self.positional)
    }
}

/// Check that every option given on the command line with a fixed number
/// of values got exactly that many.
fn check_arity(spec: &Specification, entries: &IndexMap<String, Value>) -> Result<()> {
    for (name, value) in entries {
        let opt = match spec.get(name) {
            Some(opt) => opt,
            None => continue,
        };

        let expected = match opt.arity {
            Arity::Fixed(n) if n > 0 && !opt.multiple => n,
            _ => continue,
        };

        let provided = value.values().len();

        if provided != expected {
            return Err(Error::Arity {
                option: name.clone(),
                expected,
                provided,
            });
        }
    }

    Ok(())
}

/// Add the default value of every absent option.
fn apply_defaults(spec: &Specification, entries: &mut IndexMap<String, Value>) {
    for (name, opt) in spec.iter() {
        if entries.contains_key(name) {
            continue;
        }

        if let Some(default) = &opt.default {
            debug!(option = %name, default = %default, "apply default");
            entries.insert(name.into(), default.clone());
        }
    }
}

fn check_required(spec: &Specification, entries: &IndexMap<String, Value>) -> Result<()> {
    match spec
        .iter()
        .find(|(name, opt)| opt.required && !entries.contains_key(*name))
    {
        Some((name, _)) => Err(Error::MissingRequiredOption(name.into())),
        None => Ok(()),
    }
}

/// Reduce single element lists to the bare value.
fn collapse(entries: &mut IndexMap<String, Value>) {
    for value in entries.values_mut() {
        if let Value::Many(values) = value {
            if values.len() == 1 {
                *value = Value::Single(values.remove(0));
            }
        }
    }
}

/// Parse `cli_args` (without the program name) against `spec`.
///
/// The specification is not validated here, see [Specification::validate].
pub(crate) fn parse(spec: &Specification, cli_args: &[String]) -> Result<Response> {
    debug!(args = ?cli_args, options = spec.len(), "parsing");

    let tokens = preprocess(cli_args);

    // Help wins over any other problem with the command line.
    if help_requested(&tokens) {
        debug!("help requested");
        return Err(Error::HelpRequested);
    }

    let mut parser = Parser::new(spec);

    for token in tokens {
        parser.feed(token)?;
    }

    let (mut entries, positional) = parser.finish();

    check_arity(spec, &entries)?;

    apply_defaults(spec, &mut entries);

    check_required(spec, &entries)?;

    spec.positional_rules().check(positional.len())?;

    collapse(&mut entries);

    if !positional.is_empty() {
        entries.insert(POSITIONAL_KEY.into(), Value::Many(positional));
    }

    Ok(Response { entries })
}
