// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

/// An example showing how to handle positional arguments (like `echo(1)`)
/// only.
///
/// ```bash
/// $ cargo run --example positional-args-only -- one two "hello world" -3 "the end"
/// ```
use optmap::{App, Result, Specification};

fn main() -> Result<()> {
    let app = App::new("positional-args-only").spec(Specification::new());

    let response = app.parse()?;

    println!("{}", response.args().join(" "));

    Ok(())
}
