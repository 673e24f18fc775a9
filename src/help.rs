// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

use crate::error::Error;
use crate::spec::{Arity, Opt, Positional, Specification, HELP_KEY, HELP_OPTION};

const USAGE_PREFIX_SPACES: &str = "  ";

/// Space between the option column and the description column.
const COLUMN_GAP: &str = "  ";

/// String to show in usage if an option is required
const REQUIRED_STR: &str = "(required)";
const MULTIPLE_STR: &str = "(multiple)";

const HELP_DESCRIPTION: &str = "Display this help message";

fn placeholders(arity: Arity) -> String {
    match arity {
        Arity::Fixed(n) => (1..=n).map(|i| format!(" <ARG{}>", i)).collect(),
        Arity::Unbounded => " <ARG1>...".into(),
    }
}

/// The option column: short and long forms plus value placeholders.
fn label(name: &str, opt: &Opt) -> String {
    let short = match opt.key {
        Some(key) => format!("-{}, ", key),
        None => "    ".into(),
    };

    format!("{}--{}{}", short, name, placeholders(opt.per_occurrence()))
}

/// The description column: help text plus annotations.
fn annotations(opt: &Opt) -> String {
    let mut parts = Vec::new();

    if !opt.description.is_empty() {
        parts.push(opt.description.trim().to_string());
    }

    if opt.required {
        parts.push(REQUIRED_STR.into());
    }

    if opt.multiple {
        parts.push(MULTIPLE_STR.into());
    }

    if let Some(default) = &opt.default {
        parts.push(format!("(default: {})", default));
    }

    parts.join(" ")
}

fn positional_usage(rules: &Positional) -> String {
    if rules.is_unconstrained() {
        return "[ARG]...".into();
    }

    let named = |n: usize| -> Vec<String> { (1..=n).map(|i| format!("<ARG{}>", i)).collect() };

    let mut parts = match (rules.exact, rules.min) {
        (Some(exact), _) => return named(exact).join(" "),
        (None, Some(min)) => named(min),
        (None, None) => Vec::new(),
    };

    if rules.max != Some(parts.len()) {
        parts.push("[ARG]...".into());
    }

    parts.join(" ")
}

/// Generate the usage message for `spec`: a usage line followed by one
/// line per option in declaration order, the columns aligned.
pub fn usage(spec: &Specification, program: &str) -> String {
    let mut rows: Vec<(String, String)> = spec
        .iter()
        .map(|(name, opt)| (label(name, opt), annotations(opt)))
        .collect();

    rows.push((
        format!("-{}, --{}", HELP_KEY, HELP_OPTION),
        HELP_DESCRIPTION.into(),
    ));

    let width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);

    let mut lines = Vec::<String>::new();

    let positional = positional_usage(spec.positional_rules());

    let line = if positional.is_empty() {
        format!("USAGE: {} [OPTION]...", program)
    } else {
        format!("USAGE: {} [OPTION]... {}", program, positional)
    };

    lines.push(line);
    lines.push("The following options are supported:".into());

    for (left, help) in rows {
        let line = if help.is_empty() {
            format!("{}{}", USAGE_PREFIX_SPACES, left)
        } else {
            format!(
                "{}{:width$}{}{}",
                USAGE_PREFIX_SPACES,
                left,
                COLUMN_GAP,
                help,
                width = width
            )
        };

        lines.push(line);
    }

    let mut text = lines.join("\n");
    text.push('\n');

    text
}

/// Compose the message shown when parsing fails: the error followed by
/// the usage message. A help request shows only the usage message.
pub fn failure_message(error: &Error, spec: &Specification, program: &str) -> String {
    match error.cause() {
        Error::HelpRequested => usage(spec, program),
        cause => format!("{}\n\n{}", cause, usage(spec, program)),
    }
}
