// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

use std::env;
use std::io::{self, Write};
use std::path::Path;
use std::process;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::help;
use crate::parser::{self, Response};
use crate::spec::Specification;

/// Exit status used when parsing fails.
const FAILURE: i32 = 1;

/// Exit status used after showing the requested help message.
const HELP_SHOWN: i32 = 0;

/// Settings used to control what happens when parsing fails.
///
/// The three behaviours are independent. By default the failure message
/// is printed and the process exits.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialOrd, PartialEq)]
pub struct Settings {
    /// Print the error and usage message (to stderr, or to stdout for a
    /// help request).
    print_on_failure: bool,

    /// Return [Error::Reported] (whose message is the error and usage
    /// message) rather than the bare parse error.
    throw_on_failure: bool,

    /// Exit the process: with status 1 on error, 0 after a help request.
    exit_on_failure: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            print_on_failure: true,
            throw_on_failure: false,
            exit_on_failure: true,
        }
    }
}

impl Settings {
    /// Create a new settings object.
    pub fn new() -> Self {
        Settings::default()
    }

    /// Specify whether the failure message is printed.
    pub fn print_on_failure(self, print_on_failure: bool) -> Self {
        Settings {
            print_on_failure,
            ..self
        }
    }

    /// Specify whether the returned error carries the failure message.
    pub fn throw_on_failure(self, throw_on_failure: bool) -> Self {
        Settings {
            throw_on_failure,
            ..self
        }
    }

    /// Specify whether the process exits on failure.
    pub fn exit_on_failure(self, exit_on_failure: bool) -> Self {
        Settings {
            exit_on_failure,
            ..self
        }
    }

    /// A failure must at least be printed or returned with its message.
    fn validate(&self) -> Result<()> {
        if !self.print_on_failure && !self.throw_on_failure {
            return Err(Error::SilentFailurePolicy);
        }

        Ok(())
    }
}

/// Get a list of all command-line arguments specified to the program with
/// the program name (the first argument) removed.
///
/// # Note
///
/// Used with [App::parse_with_args()]. However, this isn't usually
/// required: just call [App::parse()].
pub fn get_args() -> Vec<String> {
    env::args().skip(1).collect()
}

/// Name of the running program, as invoked.
fn invoked_name() -> String {
    env::args()
        .next()
        .and_then(|path| {
            Path::new(&path)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_default()
}

/// The main object used to represent the program.
///
/// All consumers of the crate need to create a
/// single object of this type.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct App {
    name: String,
    version: String,
    summary: String,
    settings: Settings,
    spec: Specification,
}

impl App {
    /// Create a new application object.
    pub fn new(name: &str) -> Self {
        App::default().name(name)
    }

    /// Specify the name of the program.
    fn name(self, name: &str) -> Self {
        App {
            name: name.into(),
            ..self
        }
    }

    /// Specify the options to parse the command-line with.
    pub fn spec(self, spec: Specification) -> Self {
        App { spec, ..self }
    }

    /// Specify the version of the program.
    pub fn version(self, version: &str) -> Self {
        App {
            version: version.into(),
            ..self
        }
    }

    /// Specify brief explanatory text for the program.
    pub fn summary(self, summary: &str) -> Self {
        App {
            summary: summary.into(),
            ..self
        }
    }

    /// Specify the failure settings for the program.
    pub fn settings(self, settings: Settings) -> Self {
        App { settings, ..self }
    }

    /// Return failures as [Error::Reported] without printing them or
    /// exiting, for programs that handle errors themselves.
    ///
    /// # Note
    ///
    /// This is an alternative to calling the `settings()` method.
    pub fn throw_on_failure(self) -> Self {
        App {
            settings: Settings::new()
                .print_on_failure(false)
                .throw_on_failure(true)
                .exit_on_failure(false),
            ..self
        }
    }

    fn program(&self) -> String {
        if self.name.is_empty() {
            invoked_name()
        } else {
            self.name.clone()
        }
    }

    /// Generate the help message: program details followed by the
    /// usage message.
    pub fn help_text(&self) -> String {
        let program = self.program();

        let mut text = String::new();

        if !self.version.is_empty() {
            text.push_str(&format!("{} {}\n", program, self.version));
        }

        if !self.summary.is_empty() {
            text.push_str(self.summary.trim());
            text.push('\n');
        }

        if !text.is_empty() {
            text.push('\n');
        }

        text.push_str(&help::usage(&self.spec, &program));

        text
    }

    /// Write the help message to `writer`.
    ///
    /// This is shown automatically when the user specifies `-h` or
    /// `--help` on the command line; you do not need to declare an
    /// option for it.
    pub fn generate_help<W: Write>(&self, writer: &mut W) -> Result<()> {
        write!(writer, "{}", self.help_text())?;

        Ok(())
    }

    /// Parse a set of command line arguments (without the program name).
    ///
    /// # Arguments
    ///
    /// - `cli_args`: Vector of string arguments. Specify your own,
    ///    or call [get_args()].
    ///
    /// # Errors
    ///
    /// Configuration errors (see [Error::is_configuration()]) are returned
    /// before any argument is looked at and are never printed. Parse
    /// failures are handled as the [Settings] specify.
    pub fn parse_with_args(&self, cli_args: Vec<String>) -> Result<Response> {
        self.parse_to(cli_args, &mut io::stdout(), &mut io::stderr())
    }

    /// Simplest interface to the parser.
    pub fn parse(&self) -> Result<Response> {
        self.parse_with_args(get_args())
    }

    fn parse_to<O: Write, E: Write>(
        &self,
        cli_args: Vec<String>,
        out: &mut O,
        err: &mut E,
    ) -> Result<Response> {
        self.spec.validate()?;
        self.settings.validate()?;

        match parser::parse(&self.spec, &cli_args) {
            Ok(response) => {
                debug!(entries = response.len(), "parsed");
                Ok(response)
            }
            Err(error) => Err(self.fail(error, out, err)),
        }
    }

    /// Present a parse failure as the settings specify.
    fn fail<O: Write, E: Write>(&self, error: Error, out: &mut O, err: &mut E) -> Error {
        let help_requested = error == Error::HelpRequested;

        let message = if help_requested {
            self.help_text()
        } else {
            help::failure_message(&error, &self.spec, &self.program())
        };

        debug!(error = %error, settings = ?self.settings, "parse failed");

        if self.settings.print_on_failure {
            let writer: &mut dyn Write = if help_requested { out } else { err };

            if let Err(e) = write!(writer, "{}", message).and_then(|_| writer.flush()) {
                warn!(error = %e, "failed to show failure message");
            }
        }

        if self.settings.exit_on_failure {
            process::exit(if help_requested { HELP_SHOWN } else { FAILURE });
        }

        if self.settings.throw_on_failure {
            Error::Reported {
                source: Box::new(error),
                message,
            }
        } else {
            error
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::spec::{Arity, Opt, Positional, Value};
    use regex::Regex;
    use std::sync::{Arc, Mutex};

    /// Writer that stores all data written to it.
    #[derive(Default, Clone)]
    struct BufWriter(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for BufWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.0.lock().unwrap().flush()
        }
    }

    impl BufWriter {
        fn new() -> Self {
            BufWriter::default()
        }

        fn is_empty(&self) -> bool {
            self.0.lock().unwrap().is_empty()
        }
    }

    impl ToString for BufWriter {
        fn to_string(&self) -> String {
            let data_ref = self.0.clone();
            let output = data_ref.lock().unwrap();
            let s = (*output).clone();

            String::from_utf8(s).unwrap()
        }
    }

    fn to_args(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    fn no_exit() -> Settings {
        Settings::new().exit_on_failure(false)
    }

    fn number_spec() -> Specification {
        Specification::new()
            .option(
                "number",
                Opt::new()
                    .key('n')
                    .arity(2)
                    .required()
                    .description("two numbers"),
            )
            .option("other", Opt::new().key('o'))
    }

    #[test]
    fn test_settings() {
        let new_settings = Settings::new();
        let def_settings = Settings::default();

        assert_eq!(new_settings.print_on_failure, true);
        assert_eq!(new_settings.throw_on_failure, false);
        assert_eq!(new_settings.exit_on_failure, true);
        assert_eq!(new_settings, def_settings);

        let settings = Settings::new()
            .print_on_failure(false)
            .throw_on_failure(true)
            .exit_on_failure(false);

        assert_eq!(settings.print_on_failure, false);
        assert_eq!(settings.throw_on_failure, true);
        assert_eq!(settings.exit_on_failure, false);

        assert!(settings.validate().is_ok());
        assert_eq!(
            Settings::new().print_on_failure(false).validate(),
            Err(Error::SilentFailurePolicy)
        );
    }

    #[test]
    fn test_app_creation() {
        let new_app = App::new("foo bar");
        let def_app = App::default();

        let expected_def_app = App {
            name: "".into(),
            version: "".into(),
            summary: "".into(),
            settings: Settings::default(),
            spec: Specification::default(),
        };

        let expected_new_app = App {
            name: "foo bar".into(),
            ..Default::default()
        };

        assert_eq!(def_app, expected_def_app);
        assert_eq!(new_app, expected_new_app);

        let app = App::new("foo").throw_on_failure();
        assert_eq!(
            app.settings,
            Settings::new()
                .print_on_failure(false)
                .throw_on_failure(true)
                .exit_on_failure(false)
        );
    }

    #[test]
    fn test_parse_success() {
        let app = App::new("prog").spec(number_spec()).settings(no_exit());

        let response = app
            .parse_with_args(to_args(&["-n", "-33", "-237", "--other"]))
            .unwrap();

        assert_eq!(response.values("number"), vec!["-33", "-237"]);
        assert!(response.flag("other"));
        assert!(response.args().is_empty());
    }

    #[test]
    fn test_configuration_errors_bypass_presentation() {
        #[derive(Debug)]
        struct TestData<'a> {
            cli_args: Vec<&'a str>,
            spec: Specification,
            settings: Settings,
            result: Error,
        }

        let shared_key = Specification::new()
            .option("test", Opt::new().key('t'))
            .option("tango", Opt::new().key('t'));

        let tests = vec![
            TestData {
                cli_args: vec![],
                spec: shared_key.clone(),
                settings: Settings::new(),
                result: Error::DuplicateShortKey {
                    key: 't',
                    first: "test".into(),
                    second: "tango".into(),
                },
            },
            TestData {
                // Never gets as far as the unknown option
                cli_args: vec!["--wibble", "-h"],
                spec: shared_key,
                settings: Settings::new(),
                result: Error::DuplicateShortKey {
                    key: 't',
                    first: "test".into(),
                    second: "tango".into(),
                },
            },
            TestData {
                cli_args: vec!["-x"],
                spec: Specification::new().option("help", Opt::new()),
                settings: Settings::new(),
                result: Error::ReservedName("help".into()),
            },
            TestData {
                cli_args: vec!["-x"],
                spec: Specification::new(),
                settings: Settings::new().print_on_failure(false),
                result: Error::SilentFailurePolicy,
            },
        ];

        for (i, d) in tests.iter().enumerate() {
            let mut out = BufWriter::new();
            let mut err = BufWriter::new();

            let app = App::new("prog").spec(d.spec.clone()).settings(d.settings);

            let result = app.parse_to(to_args(&d.cli_args), &mut out, &mut err);

            let msg = format!("test[{}]: {:?}, result: {:?}", i, d, result);

            assert_eq!(result, Err(d.result.clone()), "{}", msg);
            assert!(out.is_empty(), "{}", msg);
            assert!(err.is_empty(), "{}", msg);
        }
    }

    #[test]
    fn test_failure_policy() {
        #[derive(Debug)]
        struct TestData<'a> {
            cli_args: Vec<&'a str>,
            settings: Settings,
            reported: bool,
            printed_out: bool,
            printed_err: bool,
            cause: Error,
        }

        let tests = &[
            TestData {
                cli_args: vec!["-o"],
                settings: no_exit(),
                reported: false,
                printed_out: false,
                printed_err: true,
                cause: Error::MissingRequiredOption("number".into()),
            },
            TestData {
                cli_args: vec!["-o"],
                settings: no_exit().throw_on_failure(true),
                reported: true,
                printed_out: false,
                printed_err: true,
                cause: Error::MissingRequiredOption("number".into()),
            },
            TestData {
                cli_args: vec!["-x"],
                settings: no_exit().print_on_failure(false).throw_on_failure(true),
                reported: true,
                printed_out: false,
                printed_err: false,
                cause: Error::UnrecognizedOption("-x".into()),
            },
            TestData {
                cli_args: vec!["--help"],
                settings: no_exit(),
                reported: false,
                printed_out: true,
                printed_err: false,
                cause: Error::HelpRequested,
            },
            TestData {
                cli_args: vec!["-n", "1", "2", "-oh"],
                settings: no_exit().throw_on_failure(true),
                reported: true,
                printed_out: true,
                printed_err: false,
                cause: Error::HelpRequested,
            },
        ];

        for (i, d) in tests.iter().enumerate() {
            let mut out = BufWriter::new();
            let mut err = BufWriter::new();

            let app = App::new("prog").spec(number_spec()).settings(d.settings);

            let result = app.parse_to(to_args(&d.cli_args), &mut out, &mut err);

            let msg = format!("test[{}]: {:?}, result: {:?}", i, d, result);

            let error = result.expect_err(&msg);

            assert_eq!(error.cause(), &d.cause, "{}", msg);
            assert_eq!(
                matches!(error, Error::Reported { .. }),
                d.reported,
                "{}",
                msg
            );
            assert_eq!(!out.is_empty(), d.printed_out, "{}", msg);
            assert_eq!(!err.is_empty(), d.printed_err, "{}", msg);

            if d.printed_err {
                let printed = err.to_string();
                assert!(printed.starts_with(&d.cause.to_string()), "{}", msg);
                assert!(printed.contains("USAGE: prog"), "{}", msg);
            }

            if let Error::Reported { message, .. } = &error {
                assert!(message.contains("USAGE: prog"), "{}", msg);
            }
        }
    }

    /// Writer whose output has gone away.
    struct ClosedWriter;

    impl std::io::Write for ClosedWriter {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failure_with_closed_writer() {
        let app = App::new("prog")
            .spec(number_spec())
            .settings(no_exit().throw_on_failure(true));

        let result = app.parse_to(to_args(&["-x"]), &mut ClosedWriter, &mut ClosedWriter);

        match result {
            Err(Error::Reported { source, message }) => {
                assert_eq!(*source, Error::UnrecognizedOption("-x".into()));
                assert!(message.contains("USAGE: prog"), "{}", message);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_missing_required_reported() {
        let app = App::new("prog").spec(number_spec()).throw_on_failure();

        let error = app.parse_with_args(to_args(&["-o"])).unwrap_err();

        let message = error.to_string();

        let re = Regex::new(r#"^missing required option "--number"\n\nUSAGE: prog "#).unwrap();
        assert!(re.is_match(&message), "{}", message);

        let re = Regex::new(r"\n\s+-n, --number <ARG1> <ARG2>\s+two numbers \(required\)\n").unwrap();
        assert!(re.is_match(&message), "{}", message);
    }

    #[test]
    fn test_shared_short_key_before_parsing() {
        let spec = Specification::new()
            .option("test", Opt::new().key('t').arity(Arity::Unbounded))
            .option("tango", Opt::new().key('t'));

        let app = App::new("prog").spec(spec).throw_on_failure();

        for cli_args in &[vec![], vec!["-t", "a"], vec!["--help"], vec!["--bogus"]] {
            let result = app.parse_with_args(to_args(cli_args));

            assert!(
                matches!(result, Err(Error::DuplicateShortKey { key: 't', .. })),
                "{:?}: {:?}",
                cli_args,
                result
            );
        }
    }

    #[test]
    fn test_help_text() {
        let spec = Specification::new()
            .option("debug", Opt::new().key('d').description("enable debug"))
            .option("file", Opt::new().key('f').arity(1).required())
            .option("tag", Opt::new().key('t').multiple().default_value("x"))
            .positional(Positional::new().min(1));

        let app = App::new("my app")
            .version("1.2.3-alpha4")
            .summary("This is one awesome app\n")
            .spec(spec);

        let mut writer = BufWriter::new();

        let result = app.generate_help(&mut writer);
        assert!(result.is_ok());

        let value = writer.to_string();
        assert_eq!(value, app.help_text());

        let re = Regex::new(r"^my app 1\.2\.3-alpha4\nThis is one awesome app\n\n").unwrap();
        assert!(re.is_match(&value), "{}", value);

        let re = Regex::new(r"USAGE: my app \[OPTION\]\.\.\. <ARG1> \[ARG\]\.\.\.\n").unwrap();
        assert!(re.is_match(&value), "{}", value);

        let options_re = concat!(
            r#"The following options are supported:\n"#,
            r#"\s+-d, --debug\s+enable debug\n"#,
            r#"\s+-f, --file <ARG1>\s+\(required\)\n"#,
            r#"\s+-t, --tag <ARG1>\s+\(multiple\) \(default: "x"\)\n"#,
            r#"\s+-h, --help\s+Display this help message\n"#,
        );

        let re = Regex::new(options_re).unwrap();
        assert!(re.is_match(&value), "{}", value);
    }

    #[test]
    fn test_help_text_without_details() {
        let app = App::new("prog").spec(Specification::new().option("other", Opt::new()));

        assert!(app.help_text().starts_with("USAGE: prog [OPTION]..."));
    }

    #[test]
    fn test_get_args() {
        let get_args_result = get_args();

        let mut args: Vec<String> = env::args().collect();
        args.remove(0);

        assert_eq!(get_args_result, args);
    }

    #[test]
    fn test_parse_is_repeatable() {
        let spec = Specification::new()
            .option("meta", Opt::new().key('m').multiple())
            .option("level", Opt::new().arity(1).default_value("3"));

        let app = App::new("prog").spec(spec).settings(no_exit());

        let cli_args = to_args(&["-m", "1", "-m", "2", "-m", "3", "a", "b"]);

        let first = app.parse_with_args(cli_args.clone()).unwrap();
        let second = app.parse_with_args(cli_args).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.values("meta"), vec!["1", "2", "3"]);
        assert_eq!(first.get("level"), Some(&Value::from("3")));
        assert_eq!(first.args(), &["a".to_string(), "b".to_string()]);
    }
}
