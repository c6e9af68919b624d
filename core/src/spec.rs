//! Declarative parser definitions.
//!
//! A [`ParserSpec`] describes a parser and its flags in YAML or JSON, so a
//! wrapper script can declare which flags forward their arguments without
//! writing Rust.
//!
//! # Example YAML
//!
//! ```yaml
//! parser:
//!   prog: forward
//!   description: Run a child process with forwarded arguments
//! arguments:
//!   - names: ["--file"]
//!   - names: ["-v", "--verbose"]
//!     options:
//!       action: store_true
//!   - names: ["--child-args"]
//!     options:
//!       nargs: collect_until_next_known
//!       help: Arguments passed to the child verbatim
//! ```

use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SpecError;
use crate::{ArgOptions, CollectingArgumentParser, ParserConfig};

/// One flag registration in a [`ParserSpec`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArgumentSpec {
    /// Flag spellings, e.g. `["-f", "--file"]`.
    pub names: Vec<String>,
    /// Registration options.
    #[serde(default)]
    pub options: ArgOptions,
}

/// A parser definition.
///
/// # Examples
///
/// ```
/// use argpass::ParserSpec;
///
/// let spec = ParserSpec::from_yaml_str(r#"
/// parser:
///   prog: forward
/// arguments:
///   - names: ["--child-args"]
///     options: { nargs: collect_until_next_known }
/// "#).unwrap();
///
/// let parser = spec.build().unwrap();
/// let ns = parser.try_parse_from(["--child-args", "-la", "/tmp"]).unwrap();
/// assert_eq!(ns.get_strings("child_args"), Some(vec!["-la", "/tmp"]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParserSpec {
    /// Construction options.
    #[serde(default)]
    pub parser: ParserConfig,
    /// Flags in registration order.
    #[serde(default)]
    pub arguments: Vec<ArgumentSpec>,
}

impl ParserSpec {
    /// Parses a spec from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`YamlError`](SpecError::YamlError) for malformed YAML or
    /// unknown keys.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SpecError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parses a spec from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError`](SpecError::JsonError) for malformed JSON or
    /// unknown keys.
    pub fn from_json_str(json: &str) -> Result<Self, SpecError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a spec from a file; `.json` files are read as JSON, anything
    /// else as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](SpecError::IoError) if the file cannot be read, or
    /// a deserialization error if it does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SpecError> {
        let path = path.as_ref();
        let reader = BufReader::new(std::fs::File::open(path)?);
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Ok(serde_json::from_reader(reader)?)
        } else {
            Ok(serde_yaml::from_reader(reader)?)
        }
    }

    /// Saves the spec as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](SpecError::IoError) if the file cannot be
    /// written, or [`YamlError`](SpecError::YamlError) if serialization
    /// fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SpecError> {
        let file = std::fs::File::create(path)?;
        serde_yaml::to_writer(std::io::BufWriter::new(file), self)?;
        Ok(())
    }

    /// Builds a parser with every flag registered in order.
    ///
    /// # Errors
    ///
    /// Returns [`Argument`](SpecError::Argument) for the first registration
    /// the parser rejects.
    pub fn build(&self) -> Result<CollectingArgumentParser, SpecError> {
        let mut parser = CollectingArgumentParser::new(self.parser.clone())?;
        for argument in &self.arguments {
            parser.add_argument(argument.names.iter().cloned(), argument.options.clone())?;
        }
        Ok(parser)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{Action, ArgError, Nargs, RegistrationError};

    fn sample_yaml() -> &'static str {
        r#"
parser:
  prog: forward
  prefix_chars: "-+"
arguments:
  - names: ["--file"]
    options:
      required: true
  - names: ["-v", "--verbose"]
    options:
      action: store_true
  - names: ["--level"]
    options:
      type: integer
      default: 3
  - names: ["--child-args"]
    options:
      nargs: collect_until_next_known
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let spec = ParserSpec::from_yaml_str(sample_yaml()).unwrap();
        assert_eq!(spec.parser.prog.as_deref(), Some("forward"));
        assert_eq!(spec.parser.prefix_chars, "-+");
        assert_eq!(spec.arguments.len(), 4);
        assert!(spec.arguments[0].options.required);
        assert_eq!(spec.arguments[1].options.action, Action::StoreTrue);
        assert_eq!(spec.arguments[2].options.default, Some(json!(3)));
        assert_eq!(
            spec.arguments[3].options.nargs,
            Some(Nargs::CollectUntilNextKnown)
        );
    }

    #[test]
    fn test_build_and_parse() {
        let parser = ParserSpec::from_yaml_str(sample_yaml()).unwrap().build().unwrap();
        let ns = parser
            .try_parse_from(["--file", "a", "--child-args", "+x", "-y", "--level", "9"])
            .unwrap();
        assert_eq!(
            serde_json::to_value(&ns).unwrap(),
            json!({
                "file": "a",
                "verbose": false,
                "level": 9,
                "child_args": ["+x", "-y"]
            })
        );
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let yaml = "arguments:\n  - names: [\"--x\"]\n    options: { kind: int }\n";
        assert!(matches!(
            ParserSpec::from_yaml_str(yaml),
            Err(SpecError::YamlError(_))
        ));

        let json = r#"{ "parser": { "prog": "x", "colour": true } }"#;
        assert!(matches!(
            ParserSpec::from_json_str(json),
            Err(SpecError::JsonError(_))
        ));
    }

    #[test]
    fn test_build_reports_registration_errors() {
        let yaml = "arguments:\n  - names: [\"--x\"]\n  - names: [\"--x\"]\n";
        let err = ParserSpec::from_yaml_str(yaml).unwrap().build().unwrap_err();
        assert!(matches!(
            err,
            SpecError::Argument(ArgError::Registration(RegistrationError::DuplicateFlag(_)))
        ));
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let yaml_path = dir.path().join("spec.yaml");
        let original = ParserSpec::from_yaml_str(sample_yaml()).unwrap();
        original.save(&yaml_path).unwrap();
        assert_eq!(ParserSpec::load(&yaml_path).unwrap(), original);

        let json_path = dir.path().join("spec.json");
        std::fs::write(&json_path, serde_json::to_string(&original).unwrap()).unwrap();
        assert_eq!(ParserSpec::load(&json_path).unwrap(), original);
    }
}
