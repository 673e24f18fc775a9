// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

/// A simple example showing flags, options that need values and
/// repeatable options.
///
/// Try:
///
/// ```bash
/// $ cargo run --example simple -- -d -n 3 -4 -t a -t b file1 file2
/// $ RUST_LOG=optmap=debug cargo run --example simple -- --number=1 2 -dt x
/// $ cargo run --example simple -- --help
/// ```
use optmap::{App, Arity, Opt, Positional, Result, Specification};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let spec = Specification::new()
        // Support "-d" flag option.
        .option("debug", Opt::new().key('d').description("enable debug output"))
        // Support "-n <value> <value>" option.
        .option(
            "number",
            Opt::new()
                .key('n')
                .arity(2)
                .required()
                .description("two numbers, negative ones too"),
        )
        // Support "-t <value>", as many times as you like.
        .option(
            "tag",
            Opt::new()
                .key('t')
                .multiple()
                .default_value("untagged")
                .description("tag the files"),
        )
        // Support "--exclude <value>..."
        .option(
            "exclude",
            Opt::new()
                .arity(Arity::Unbounded)
                .description("files to skip"),
        )
        .positional(Positional::new().min(1));

    let app = App::new("simple")
        .version(env!("CARGO_PKG_VERSION"))
        .summary("Show how options are parsed.")
        .spec(spec);

    // Prints the error and usage and exits on failure.
    let response = app.parse()?;

    for (name, value) in response.iter() {
        println!("INFO: {}: {}", name, value);
    }

    if response.flag("debug") {
        println!("INFO: debug enabled, tags: {:?}", response.values("tag"));
    }

    Ok(())
}
