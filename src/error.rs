// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

use thiserror::Error;

/// The error type.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum Error {
    //------------------------------
    // Incorrect API usage errors (programmer error)
    //------------------------------
    /// An option was declared with a name the parser reserves
    /// (`help`, the positional key or the positional rules key).
    #[error("option name {0:?} is reserved and cannot be declared")]
    ReservedName(String),

    /// An option tried to use the short key reserved for help (`h`).
    #[error("short key 'h' of option {0:?} is reserved for the help message")]
    ReservedShortKey(String),

    /// An option declared a short key that can never be resolved on a
    /// command line (a digit, `-`, `=` or whitespace).
    #[error("short key {key:?} of option {option:?} cannot be used as an option")]
    InvalidShortKey {
        /// Name of the offending option.
        option: String,
        /// The short key it declared.
        key: char,
    },

    /// Two options declared the same short key.
    #[error("short key {key:?} is used by both {first:?} and {second:?}")]
    DuplicateShortKey {
        /// The repeated short key.
        key: char,
        /// Option that declared the key first.
        first: String,
        /// Option that declared the key again.
        second: String,
    },

    /// The positional argument rules can never be satisfied.
    #[error("invalid positional argument rules: {0}")]
    InvalidPositionalRules(String),

    /// A declarative (JSON) specification could not be understood.
    #[error("invalid specification: {0}")]
    InvalidSpecification(String),

    /// The failure policy neither prints nor returns the failure message.
    #[error("failure policy must print or return parse failures")]
    SilentFailurePolicy,

    //------------------------------
    // Runtime errors (user error)
    //------------------------------
    /// User specified an option that was not declared.
    #[error("unrecognized option: {0}")]
    UnrecognizedOption(String),

    /// User specified a non-multiple option more than once.
    #[error("option \"--{0}\" can only be specified once")]
    DuplicateOption(String),

    /// An option received a different number of values than it declares.
    #[error("option \"--{option}\" requires {expected} arguments, but {provided} were provided")]
    Arity {
        /// Name of the offending option.
        option: String,
        /// Number of values the option declares.
        expected: usize,
        /// Number of values found on the command line.
        provided: usize,
    },

    /// An option that must be specified was not specified.
    #[error("missing required option \"--{0}\"")]
    MissingRequiredOption(String),

    /// The number of positional arguments is outside the declared bounds.
    #[error("expected {expected} positional arguments, but {provided} were provided")]
    PositionalCount {
        /// Human readable description of the accepted counts.
        expected: String,
        /// Number of positional arguments found.
        provided: usize,
    },

    /// User asked for the help message (`-h` or `--help`).
    #[error("help requested")]
    HelpRequested,

    //------------------------------
    // Presentation
    //------------------------------
    /// A parse failure together with the composed help message.
    ///
    /// Returned when `Settings::throw_on_failure` is set.
    #[error("{message}")]
    Reported {
        /// The underlying parse failure.
        source: Box<Error>,
        /// The error line followed by the usage block.
        message: String,
    },

    /// Failed to write the help message.
    #[error("I/O error: {0}")]
    Io(String),
}

impl Error {
    /// Returns true if the error signals a malformed specification or
    /// settings (a bug in the calling program rather than bad user input).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::ReservedName(_)
                | Error::ReservedShortKey(_)
                | Error::InvalidShortKey { .. }
                | Error::DuplicateShortKey { .. }
                | Error::InvalidPositionalRules(_)
                | Error::InvalidSpecification(_)
                | Error::SilentFailurePolicy
        )
    }

    /// Returns the underlying parse failure, looking through
    /// [Error::Reported].
    pub fn cause(&self) -> &Error {
        match self {
            Error::Reported { source, .. } => source.cause(),
            _ => self,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

/// Convenience type that allows a function to be defined as returning a
/// [Result], but which only requires the success type to be specified,
/// defaulting the error type to this crates `Error` type.
pub type Result<T, E = Error> = std::result::Result<T, E>;
