// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name of the built-in help option (`--help`).
pub const HELP_OPTION: &str = "help";

/// Short key of the built-in help option (`-h`).
pub const HELP_KEY: char = 'h';

/// Key under which positional arguments are stored in a [crate::Response].
pub const POSITIONAL_KEY: &str = "args";

/// Name of the pseudo-option that carries the [Positional] rules in a
/// declarative specification.
pub const META_OPTION: &str = "_meta_";

/// Value used in a declarative specification for [Arity::Unbounded].
const UNBOUNDED_ARGS: &str = "*";

/// Number of values an option consumes each time it is specified.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Arity {
    /// Option takes exactly this many values (`0` for a flag).
    Fixed(usize),
    /// Option takes every value up to the next option.
    Unbounded,
}

impl Default for Arity {
    fn default() -> Self {
        Arity::Fixed(0)
    }
}

impl From<usize> for Arity {
    fn from(n: usize) -> Self {
        Arity::Fixed(n)
    }
}

impl Arity {
    /// Returns true if the option takes no values.
    pub fn is_flag(&self) -> bool {
        *self == Arity::Fixed(0)
    }
}

/// A parsed (or default) option value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A flag, present (`true`) or given as a default.
    Bool(bool),
    /// Exactly one value.
    Single(String),
    /// Several values, or the positional arguments.
    Many(Vec<String>),
}

impl Value {
    /// Returns the flag value, if this is a [Value::Bool].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value, if this is a [Value::Single].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Single(s) => Some(s),
            _ => None,
        }
    }

    /// Returns all string values held: none for a flag, one for
    /// [Value::Single], all of them for [Value::Many].
    pub fn values(&self) -> Vec<&str> {
        match self {
            Value::Bool(_) => Vec::new(),
            Value::Single(s) => vec![s.as_str()],
            Value::Many(v) => v.iter().map(String::as_str).collect(),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Single(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Single(s)
    }
}

impl From<Vec<&str>> for Value {
    fn from(v: Vec<&str>) -> Self {
        Value::Many(v.into_iter().map(String::from).collect())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Single(s) => write!(f, "{:?}", s),
            Value::Many(v) => {
                let quoted: Vec<String> = v.iter().map(|s| format!("{:?}", s)).collect();
                write!(f, "[{}]", quoted.join(", "))
            }
        }
    }
}

/// Description of a single option.
///
/// The option name is not part of the descriptor: it is the key the
/// descriptor is registered under in a [Specification].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Opt {
    /// Single character short form (`-k`).
    pub key: Option<char>,
    /// Description shown in the help message.
    pub description: String,
    /// Number of values the option takes.
    pub arity: Arity,
    /// Set if the option may be specified more than once.
    pub multiple: bool,
    /// Set if the option must be present after defaults are applied.
    pub required: bool,
    /// Value used if the option is not specified.
    pub default: Option<Value>,
}

impl Opt {
    /// Create a new flag option.
    pub fn new() -> Self {
        Opt::default()
    }

    /// Specify the short key for the option.
    pub fn key(self, key: char) -> Self {
        Opt {
            key: Some(key),
            ..self
        }
    }

    /// Specify the help text for the option.
    pub fn description(self, description: &str) -> Self {
        Opt {
            description: description.into(),
            ..self
        }
    }

    /// Specify how many values the option takes.
    pub fn arity<A: Into<Arity>>(self, arity: A) -> Self {
        Opt {
            arity: arity.into(),
            ..self
        }
    }

    /// Specify that the option may be given more than once.
    pub fn multiple(self) -> Self {
        Opt {
            multiple: true,
            ..self
        }
    }

    /// Specify that the option must be provided.
    pub fn required(self) -> Self {
        Opt {
            required: true,
            ..self
        }
    }

    /// Specify the value to use when the option is absent.
    pub fn default_value<V: Into<Value>>(self, value: V) -> Self {
        Opt {
            default: Some(value.into()),
            ..self
        }
    }

    /// Number of values a single occurrence of the option collects.
    ///
    /// A multiple option always takes at least one value per occurrence.
    pub(crate) fn per_occurrence(&self) -> Arity {
        match self.arity {
            Arity::Fixed(0) if self.multiple => Arity::Fixed(1),
            arity => arity,
        }
    }
}

/// Constraints on the number of positional arguments.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Positional {
    /// Exact number of positional arguments required.
    pub exact: Option<usize>,
    /// Minimum number of positional arguments.
    pub min: Option<usize>,
    /// Maximum number of positional arguments.
    pub max: Option<usize>,
}

impl Positional {
    /// Create an unconstrained set of rules.
    pub fn new() -> Self {
        Positional::default()
    }

    /// Require exactly `n` positional arguments.
    pub fn exact(self, n: usize) -> Self {
        Positional {
            exact: Some(n),
            ..self
        }
    }

    /// Require at least `n` positional arguments.
    pub fn min(self, n: usize) -> Self {
        Positional {
            min: Some(n),
            ..self
        }
    }

    /// Allow at most `n` positional arguments.
    pub fn max(self, n: usize) -> Self {
        Positional {
            max: Some(n),
            ..self
        }
    }

    /// Returns true if no rule is set.
    pub fn is_unconstrained(&self) -> bool {
        self.exact.is_none() && self.min.is_none() && self.max.is_none()
    }

    fn validate(&self) -> Result<()> {
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(Error::InvalidPositionalRules(format!(
                    "minimum {} exceeds maximum {}",
                    min, max
                )));
            }
        }

        if let Some(exact) = self.exact {
            if self.min.map_or(false, |min| exact < min) || self.max.map_or(false, |max| exact > max)
            {
                return Err(Error::InvalidPositionalRules(format!(
                    "exact count {} is outside the minimum/maximum bounds",
                    exact
                )));
            }
        }

        Ok(())
    }

    /// Check `count` positional arguments against the rules.
    pub(crate) fn check(&self, count: usize) -> Result<()> {
        let expected = if let Some(exact) = self.exact {
            (count != exact).then(|| format!("exactly {}", exact))
        } else {
            match (self.min, self.max) {
                (Some(min), Some(max)) if count < min || count > max => {
                    Some(format!("between {} and {}", min, max))
                }
                (Some(min), None) if count < min => Some(format!("at least {}", min)),
                (None, Some(max)) if count > max => Some(format!("at most {}", max)),
                _ => None,
            }
        };

        match expected {
            Some(expected) => Err(Error::PositionalCount {
                expected,
                provided: count,
            }),
            None => Ok(()),
        }
    }
}

/// Represents the full set of options a program accepts.
///
/// Options are kept in the order they were added, which is the order
/// they are listed in the help message.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Specification {
    options: IndexMap<String, Opt>,
    positional: Positional,
}

impl Specification {
    /// Create an empty specification.
    pub fn new() -> Self {
        Specification::default()
    }

    /// Register an option. Registering an existing name replaces it.
    pub fn add(&mut self, name: &str, opt: Opt) {
        self.options.insert(name.into(), opt);
    }

    /// Builder form of [Specification::add].
    pub fn option(mut self, name: &str, opt: Opt) -> Self {
        self.add(name, opt);
        self
    }

    /// Specify the positional argument rules.
    pub fn positional(self, positional: Positional) -> Self {
        Specification { positional, ..self }
    }

    /// Returns the positional argument rules.
    pub fn positional_rules(&self) -> &Positional {
        &self.positional
    }

    /// Returns the option registered under `name`.
    pub fn get(&self, name: &str) -> Option<&Opt> {
        self.options.get(name)
    }

    /// Returns the name of the option using the short `key`.
    pub fn name_for_key(&self, key: char) -> Option<&str> {
        self.options
            .iter()
            .find(|(_, opt)| opt.key == Some(key))
            .map(|(name, _)| name.as_str())
    }

    /// Iterate over the options in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Opt)> {
        self.options.iter().map(|(name, opt)| (name.as_str(), opt))
    }

    /// Returns the number of declared options.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Returns true if no options are declared.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Check the specification for reserved names and keys and for
    /// short keys shared between options.
    pub fn validate(&self) -> Result<()> {
        let mut used_keys: HashMap<char, &str> = HashMap::new();

        for (name, opt) in self.options.iter() {
            if [HELP_OPTION, POSITIONAL_KEY, META_OPTION].contains(&name.as_str()) {
                return Err(Error::ReservedName(name.clone()));
            }

            let key = match opt.key {
                Some(key) => key,
                None => continue,
            };

            if key == HELP_KEY {
                return Err(Error::ReservedShortKey(name.clone()));
            }

            if key.is_ascii_digit() || key.is_whitespace() || key == '-' || key == '=' {
                return Err(Error::InvalidShortKey {
                    option: name.clone(),
                    key,
                });
            }

            if let Some(first) = used_keys.insert(key, name) {
                return Err(Error::DuplicateShortKey {
                    key,
                    first: first.into(),
                    second: name.clone(),
                });
            }
        }

        self.positional.validate()
    }

    /// Build a specification from its declarative JSON form.
    ///
    /// Each member maps an option name to either `true` (a plain flag),
    /// `false` (the option is not declared) or an object with the optional fields `key`, `description`, `args`
    /// (a count or `"*"`), `multiple`, `required` (or `mandatory`) and
    /// `default`. The `_meta_` member holds the positional rules
    /// (`args`, `minArgs`, `maxArgs`).
    ///
    /// The result is not validated: that happens when parsing.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: IndexMap<String, serde_json::Value> =
            serde_json::from_str(json).map_err(|e| Error::InvalidSpecification(e.to_string()))?;

        let mut spec = Specification::new();

        for (name, value) in raw {
            if name == META_OPTION {
                let meta: RawMeta = from_json_value(&name, value)?;

                spec.positional = Positional {
                    exact: meta.args,
                    min: meta.min_args,
                    max: meta.max_args,
                };

                continue;
            }

            let entry: RawEntry = from_json_value(&name, value)?;

            let opt = match entry {
                RawEntry::Flag(true) => Opt::new(),
                // Not declared at all.
                RawEntry::Flag(false) => continue,
                RawEntry::Full(raw) => raw.into_opt(&name)?,
            };

            spec.add(&name, opt);
        }

        Ok(spec)
    }
}

fn from_json_value<T: serde::de::DeserializeOwned>(name: &str, value: serde_json::Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| Error::InvalidSpecification(format!("option {:?}: {}", name, e)))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Flag(bool),
    Full(RawOpt),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawArity {
    Count(usize),
    Named(String),
}

#[derive(Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct RawOpt {
    key: Option<char>,
    description: Option<String>,
    args: Option<RawArity>,
    multiple: bool,
    #[serde(alias = "mandatory")]
    required: bool,
    default: Option<Value>,
}

impl RawOpt {
    fn into_opt(self, name: &str) -> Result<Opt> {
        let arity = match self.args {
            None => Arity::default(),
            Some(RawArity::Count(n)) => Arity::Fixed(n),
            Some(RawArity::Named(s)) if s == UNBOUNDED_ARGS => Arity::Unbounded,
            Some(RawArity::Named(s)) => {
                return Err(Error::InvalidSpecification(format!(
                    "option {:?}: args must be a number or {:?}, found {:?}",
                    name, UNBOUNDED_ARGS, s
                )))
            }
        };

        Ok(Opt {
            key: self.key,
            description: self.description.unwrap_or_default(),
            arity,
            multiple: self.multiple,
            required: self.required,
            default: self.default,
        })
    }
}

#[derive(Deserialize, Default)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
struct RawMeta {
    args: Option<usize>,
    min_args: Option<usize>,
    max_args: Option<usize>,
}
