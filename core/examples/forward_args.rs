//! Prints the parsed namespace for a wrapper-style command line.
//!
//! ```text
//! cargo run -p argpass --example forward_args -- \
//!     --file test.txt --args-to-pass-on-1 --param1 val1 --regular-arg x
//! ```

use argpass::{ArgOptions, CollectingArgumentParser, ParserConfig};

fn main() {
    let config = ParserConfig::new("forward_args")
        .with_description("Collects arguments meant for a child process");
    let mut parser = match CollectingArgumentParser::new(config) {
        Ok(parser) => parser,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.exit_code());
        }
    };

    let registrations = [
        ("--file", ArgOptions::new().with_help("input file")),
        ("--regular-arg", ArgOptions::new()),
        (
            "--args-to-pass-on-1",
            ArgOptions::collect_until_next_known().with_help("forwarded verbatim"),
        ),
        (
            "--args-to-pass-on-2",
            ArgOptions::collect_until_next_known().with_help("forwarded verbatim"),
        ),
    ];
    for (flag, options) in registrations {
        if let Err(err) = parser.add_argument([flag], options) {
            eprintln!("error: {err}");
            std::process::exit(err.exit_code());
        }
    }

    let namespace = parser.parse();
    match serde_json::to_string_pretty(&namespace) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}
