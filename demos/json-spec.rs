// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

/// An example showing a specification loaded from JSON, with failures
/// returned to the program rather than exiting.
///
/// Try:
///
/// ```bash
/// $ cargo run --example json-spec -- -m 1 -m 2 --url=http://example.com/?a=b in out
/// $ cargo run --example json-spec -- --bogus
/// ```
use std::error::Error;

use optmap::{App, Settings, Specification};
use tracing_subscriber::EnvFilter;

const SPEC: &str = r#"{
    "url":    { "key": "u", "args": 1, "mandatory": true, "description": "where to send it" },
    "meta":   { "key": "m", "multiple": true, "description": "metadata entries" },
    "retry":  { "key": "r", "args": 1, "default": "3", "description": "attempts" },
    "dry-run": true,
    "_meta_": { "args": 2 }
}"#;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let spec = Specification::from_json(SPEC)?;

    let settings = Settings::new()
        .print_on_failure(false)
        .throw_on_failure(true)
        .exit_on_failure(false);

    let app = App::new("json-spec").spec(spec).settings(settings);

    match app.parse() {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);

            Ok(())
        }
        Err(e) => {
            eprintln!("ERROR: {}", e);

            std::process::exit(1);
        }
    }
}
