// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

use crate::error::{Error, Result};
use crate::spec::{Specification, HELP_KEY, HELP_OPTION};

const OPT_PREFIX: char = '-';

/// Special argument used to denote the end of all options; all arguments
/// that follow are considered to be positional arguments (even if they
/// start with `-`!)
///
/// See: `getopt(3)`.
pub(crate) const END_OF_OPTIONS: &str = "--";
const LONG_OPT_PREFIX: &str = END_OF_OPTIONS;

const ASSIGNMENT: char = '=';

/// A command-line argument after preprocessing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// An argument as given by the user.
    Plain(String),
    /// The value half of a `--name=value` argument. It always binds as a
    /// value, even if it starts with a dash.
    Assigned(String),
}

/// What a [Token::Plain] argument denotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Resolved {
    /// A positional argument or an option value.
    Value,
    /// The `--` separator.
    EndOfOptions,
    /// `-h` or `--help` (possibly among collapsed short options).
    Help,
    /// One or more declared option names, in command-line order.
    Options(Vec<String>),
}

/// Returns true if `arg` is a negative (or otherwise signed) number such as
/// `-33`, `-0.5` or `-1,000` rather than an option.
pub(crate) fn is_numeric(arg: &str) -> bool {
    match arg.strip_prefix(OPT_PREFIX) {
        Some(rest) => {
            rest.chars().any(|c| c.is_ascii_digit())
                && rest
                    .chars()
                    .all(|c| c.is_ascii_digit() || c == '.' || c == ',' || c == OPT_PREFIX)
        }
        None => false,
    }
}

/// Returns true if `arg` looks like an option rather than a value.
///
/// A number is never an option, even with something assigned to it
/// (`-3=4`).
fn looks_like_option(arg: &str) -> bool {
    let head = arg.split_once(ASSIGNMENT).map_or(arg, |(head, _)| head);

    arg.starts_with(OPT_PREFIX) && arg.len() > 1 && !is_numeric(head)
}

/// Split every `-n=value` and `--name=value` argument into the option and
/// its value. Only the first `=` splits: the value is kept verbatim.
/// Nothing after `--` is split.
pub(crate) fn preprocess(cli_args: &[String]) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(cli_args.len());
    let mut end_of_options = false;

    for arg in cli_args {
        if arg == END_OF_OPTIONS {
            end_of_options = true;
        } else if looks_like_option(arg) && !end_of_options {
            let name_start = if arg.starts_with(LONG_OPT_PREFIX) { 2 } else { 1 };

            if let Some((option, value)) = arg.split_once(ASSIGNMENT) {
                if option.len() > name_start {
                    tokens.push(Token::Plain(option.into()));
                    tokens.push(Token::Assigned(value.into()));
                    continue;
                }
            }
        }

        tokens.push(Token::Plain(arg.clone()));
    }

    tokens
}

/// Returns true if any argument before `--` asks for help: `--help`, or
/// `-h` on its own or among collapsed short options.
pub(crate) fn help_requested(tokens: &[Token]) -> bool {
    tokens
        .iter()
        .filter_map(|token| match token {
            Token::Plain(arg) => Some(arg.as_str()),
            Token::Assigned(_) => None,
        })
        .take_while(|arg| *arg != END_OF_OPTIONS)
        .filter(|arg| looks_like_option(arg))
        .any(|arg| match arg.strip_prefix(LONG_OPT_PREFIX) {
            Some(name) => name == HELP_OPTION,
            None => arg.chars().skip(1).any(|key| key == HELP_KEY),
        })
}

/// Determine which option(s), if any, the argument `arg` denotes.
pub(crate) fn resolve(spec: &Specification, arg: &str) -> Result<Resolved> {
    if arg == END_OF_OPTIONS {
        return Ok(Resolved::EndOfOptions);
    }

    if !looks_like_option(arg) {
        return Ok(Resolved::Value);
    }

    if let Some(name) = arg.strip_prefix(LONG_OPT_PREFIX) {
        if name == HELP_OPTION {
            return Ok(Resolved::Help);
        }

        if spec.get(name).is_none() {
            return Err(Error::UnrecognizedOption(arg.into()));
        }

        return Ok(Resolved::Options(vec![name.into()]));
    }

    let mut names = Vec::new();

    // Collapsed short options: "-abc" is "-a -b -c".
    for key in arg.chars().skip(1) {
        if key == HELP_KEY {
            return Ok(Resolved::Help);
        }

        let name = spec
            .name_for_key(key)
            .ok_or_else(|| Error::UnrecognizedOption(arg.into()))?;

        names.push(name.to_string());
    }

    Ok(Resolved::Options(names))
}
