// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

#![deny(missing_docs)]
#![forbid(unsafe_code)]

//! Declarative command-line option parsing into an ordered map.
//!
//! Describe the options a program accepts once, hand the parser the
//! command line, and get back a map of option names to values plus the
//! leftover positional arguments.
//!
//! If you want lots of extra features, you should consider the excellent
//! [`clap`](https://crates.io/crates/clap) crate instead.
//!
//! ---
//!
//! Table of contents:
//!
//! * [Quickstart](#quickstart)
//! * [Declarative specifications](#declarative-specifications)
//! * [Details](#details)
//! * [Failure handling](#failure-handling)
//! * [Limitations](#limitations)
//!
//! ---
//!
//! # Quickstart
//!
//! 1. Create a [Specification] and add an [Opt] for each option.
//!
//!    By default, options are flags (they take no value).
//!
//!    ```rust
//!    use optmap::{Arity, Opt, Specification};
//!
//!    let spec = Specification::new()
//!        // Support "-n <a> <b>" and "--number <a> <b>".
//!        .option("number", Opt::new().key('n').arity(2).description("two numbers"))
//!        // Support "-o" and "--other".
//!        .option("other", Opt::new().key('o'))
//!        // Support "--files <f>..." (every value up to the next option).
//!        .option("files", Opt::new().arity(Arity::Unbounded));
//!    ```
//!
//! 1. Create an [App] for your program and parse the command line:
//!
//!    ```rust
//!    # use optmap::{App, Opt, Specification};
//!    #
//!    # let spec = Specification::new()
//!    #     .option("number", Opt::new().key('n').arity(2))
//!    #     .option("other", Opt::new().key('o'));
//!    #
//!    let app = App::new("my app").spec(spec);
//!
//!    let cli_args = vec!["-n", "-33", "-237", "--other", "file.txt"]
//!        .into_iter()
//!        .map(String::from)
//!        .collect();
//!
//!    let response = app.parse_with_args(cli_args)?;
//!
//!    assert_eq!(response.values("number"), vec!["-33", "-237"]);
//!    assert!(response.flag("other"));
//!    assert_eq!(response.args(), &["file.txt".to_string()]);
//!    # Ok::<(), optmap::Error>(())
//!    ```
//!
//!    Real programs call [App::parse()], which uses [get_args()].
//!
//! # Declarative specifications
//!
//! A specification can also be loaded from JSON, which is handy when the
//! option set lives in a configuration file:
//!
//! ```rust
//! use optmap::{Specification, Value};
//!
//! let spec = Specification::from_json(r#"{
//!     "meta":   { "key": "m", "multiple": true, "description": "metadata" },
//!     "level":  { "args": 1, "default": "3" },
//!     "quiet":  true,
//!     "_meta_": { "maxArgs": 2 }
//! }"#)?;
//!
//! let app = optmap::App::new("prog").spec(spec);
//!
//! let cli_args = ["-m", "1", "-m", "2", "a", "b"].iter().map(|s| s.to_string()).collect();
//! let response = app.parse_with_args(cli_args)?;
//!
//! assert_eq!(response.values("meta"), vec!["1", "2"]);
//! assert_eq!(response.get("level"), Some(&Value::from("3")));
//! assert_eq!(response.args(), &["a".to_string(), "b".to_string()]);
//! # Ok::<(), optmap::Error>(())
//! ```
//!
//! A [Response] serializes (with `serde`) to the same shape:
//! `{"meta":["1","2"],"level":"3","args":["a","b"]}`.
//!
//! # Details
//!
//! - `--name` is the long form of option `name`; `-k` is the short form of
//!   the option whose key is `k`.
//! - Short options can be collapsed: `-abc` is `-a -b -c`.
//! - Values can be assigned: `--name=value` and `-k=value` are
//!   `--name value` and `-k value`. Only the first `=` splits, and an
//!   assigned value is always a value, even if it starts with a dash.
//! - An option taking values consumes the arguments that follow it. An
//!   argument starting with a dash ends the values _unless_ it is a number
//!   such as `-33` or `-0.5`: numbers are always values.
//! - An option declared with [Arity::Unbounded] consumes every value up to
//!   the next option.
//! - A [multiple](Opt::multiple) option may be specified repeatedly; its
//!   values accumulate. Any other option specified twice is an error.
//! - Absent options take their [default](Opt::default_value).
//! - Single values are returned bare ([Value::Single]), several values as a
//!   list ([Value::Many]) and flags as [Value::Bool].
//! - Arguments that are neither options nor option values are positional
//!   arguments, returned in their original order under [POSITIONAL_KEY].
//!   Their number can be constrained with [Positional].
//! - The special argument `--` ends option processing: all arguments that
//!   follow are positional arguments.
//! - `-h` and `--help` are built in and show a generated usage message.
//!
//! # Failure handling
//!
//! A malformed [Specification] (see [Error::is_configuration()]) is a bug
//! in the calling program: it is returned straight away, before any
//! argument is looked at.
//!
//! Bad user input is presented according to the [Settings]: by default the
//! error and the usage message are printed to stderr and the process exits
//! with status 1. Printing, returning the message as [Error::Reported] and
//! exiting can each be enabled or disabled.
//!
//! # Limitations
//!
//! - Options cannot take optional values.
//! - Non-ASCII short keys work, but long names are matched exactly
//!   (no abbreviations).
//! - Help output is not wrapped to the terminal width.

mod app;
mod error;
mod help;
mod parser;
mod spec;
mod tokens;

pub use error::{Error, Result};

pub use app::{get_args, App, Settings};
pub use help::{failure_message, usage};
pub use parser::Response;
pub use spec::{
    Arity, Opt, Positional, Specification, Value, HELP_KEY, HELP_OPTION, META_OPTION,
    POSITIONAL_KEY,
};
