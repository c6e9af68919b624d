//! Argument parsing with collect-until-next-known flags.
//!
//! This crate provides an argparse-style flag parser and a wrapper that adds
//! one extra argument mode:
//!
//! - [`ArgumentParser`] parses flags into a [`Namespace`], either strictly or
//!   leniently (returning the tokens it did not recognize, in order).
//! - [`CollectingArgumentParser`] accepts flags registered with
//!   [`Nargs::CollectUntilNextKnown`]. Such a flag gathers every following
//!   token, including ones that look like flags, up to the next registered
//!   flag. Wrapper tools use it to forward an opaque argument list to a child
//!   process.
//! - [`ParserSpec`] declares a parser in YAML or JSON.
//!
//! Registration problems surface as [`RegistrationError`]; parse failures as
//! [`ArgError`], whose [`exit_code`](ArgError::exit_code) follows the usual
//! command-line conventions.
//!
//! # Example
//!
//! ```
//! use argpass::*;
//! use serde_json::json;
//!
//! let mut parser = CollectingArgumentParser::new(ParserConfig::new("wrap")).unwrap();
//! parser.add_argument(["--file"], ArgOptions::new()).unwrap();
//! parser.add_argument(["--regular-arg"], ArgOptions::new()).unwrap();
//! parser
//!     .add_argument(["--pass-on"], ArgOptions::collect_until_next_known())
//!     .unwrap();
//!
//! let ns = parser
//!     .try_parse_from([
//!         "--file", "test.txt", "--pass-on", "--param1", "val1", "--blu",
//!         "--regular-arg", "x",
//!     ])
//!     .unwrap();
//! assert_eq!(
//!     serde_json::to_value(&ns).unwrap(),
//!     json!({
//!         "file": "test.txt",
//!         "regular_arg": "x",
//!         "pass_on": ["--param1", "val1", "--blu"],
//!     })
//! );
//!
//! let err = parser.try_parse_from(["--stray"]).unwrap_err();
//! assert_eq!(err.exit_code(), USAGE_EXIT_CODE);
//! ```

mod collect;
mod error;
mod marker;
mod namespace;
mod parser;
mod spec;
mod types;
mod validate;

pub use collect::{CollectingArgumentParser, Registration};
pub use error::{ArgError, ErrorKind, Result, SOFTWARE_EXIT_CODE, SpecError, USAGE_EXIT_CODE};
pub use marker::{MARKER_SIGILS, MarkerConvention, marker_sigil};
pub use namespace::Namespace;
pub use parser::{ArgumentParser, derive_dest, tokens_from_args};
pub use spec::{ArgumentSpec, ParserSpec};
pub use types::*;
pub use validate::{RegistrationError, validate_prefix_chars, validate_registration};
