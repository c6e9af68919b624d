//! Registration and construction option types.
//!
//! These types describe how a flag is registered and how a parser is
//! configured. Every type is a closed, explicitly enumerated structure that
//! round-trips through [`serde`]; unknown keys in serialized options are
//! rejected instead of being carried along as free-form attributes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Prefix characters used when a [`ParserConfig`] does not override them.
pub const DEFAULT_PREFIX_CHARS: &str = "-";

/// Number of values a flag consumes.
///
/// # Examples
///
/// ```
/// use argpass::Nargs;
///
/// assert_eq!(Nargs::default(), Nargs::Single);
/// assert!(Nargs::CollectUntilNextKnown.is_collection());
/// assert_eq!(Nargs::OneOrMore.min_values(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Nargs {
    /// Exactly one value, stored as a scalar (the default).
    #[default]
    Single,
    /// Zero or one value, stored as a scalar.
    Optional,
    /// Any number of values, stored as a list.
    ZeroOrMore,
    /// At least one value, stored as a list.
    OneOrMore,
    /// Exactly `n` values, stored as a list.
    Exactly(usize),
    /// Every following token, flag-like or not, up to the next registered
    /// flag. Only accepted by
    /// [`CollectingArgumentParser`](crate::CollectingArgumentParser).
    CollectUntilNextKnown,
}

impl Nargs {
    /// Returns `true` for the collect-until-next-known arity.
    pub fn is_collection(self) -> bool {
        matches!(self, Nargs::CollectUntilNextKnown)
    }

    /// Minimum number of values a flag with this arity must receive.
    pub fn min_values(self) -> usize {
        match self {
            Nargs::Single | Nargs::OneOrMore => 1,
            Nargs::Exactly(n) => n,
            Nargs::Optional | Nargs::ZeroOrMore | Nargs::CollectUntilNextKnown => 0,
        }
    }

    /// Whether the parsed value is stored as a list rather than a scalar.
    pub fn stores_list(self) -> bool {
        !matches!(self, Nargs::Single | Nargs::Optional)
    }
}

/// Type that raw string values are coerced into.
///
/// # Examples
///
/// ```
/// use argpass::ValueType;
/// use serde_json::json;
///
/// assert_eq!(ValueType::Integer.coerce("42"), Some(json!(42)));
/// assert_eq!(ValueType::Bool.coerce("yes"), Some(json!(true)));
/// assert_eq!(ValueType::Float.coerce("abc"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// Keep the raw string (the default).
    #[default]
    String,
    /// Signed 64-bit integer.
    Integer,
    /// 64-bit float.
    Float,
    /// `true/false`, `yes/no`, `on/off` or `1/0`, case-insensitive.
    Bool,
}

impl ValueType {
    /// Converts a raw token into a JSON value, or `None` if it does not parse.
    pub fn coerce(self, raw: &str) -> Option<Value> {
        match self {
            ValueType::String => Some(Value::String(raw.to_string())),
            ValueType::Integer => raw.trim().parse::<i64>().ok().map(Value::from),
            ValueType::Float => raw
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
            ValueType::Bool => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Some(Value::Bool(true)),
                "false" | "no" | "off" | "0" => Some(Value::Bool(false)),
                _ => None,
            },
        }
    }

    /// Human-readable name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Integer => "int",
            ValueType::Float => "float",
            ValueType::Bool => "bool",
        }
    }
}

/// What happens when a flag is seen on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Store the flag's value(s), replacing earlier occurrences (the default).
    #[default]
    Store,
    /// Store `true`; defaults to `false`.
    StoreTrue,
    /// Store `false`; defaults to `true`.
    StoreFalse,
    /// Append each occurrence's value to a list.
    Append,
    /// Count occurrences; defaults to `0`.
    Count,
    /// Render the help text and stop parsing.
    Help,
}

impl Action {
    /// Whether the action consumes values at all.
    pub fn takes_values(self) -> bool {
        matches!(self, Action::Store | Action::Append)
    }
}

/// Options for a single flag registration.
///
/// Use the builder methods to construct options in code, or deserialize them
/// from a [`ParserSpec`](crate::ParserSpec) file.
///
/// # Examples
///
/// ```
/// use argpass::{ArgOptions, Nargs, ValueType};
///
/// let opts = ArgOptions::new()
///     .with_type(ValueType::Integer)
///     .with_default(8080)
///     .with_help("Port to listen on");
/// assert_eq!(opts.value_type, ValueType::Integer);
/// assert_eq!(opts.default, Some(serde_json::json!(8080)));
///
/// let forward = ArgOptions::collect_until_next_known();
/// assert_eq!(forward.nargs, Some(Nargs::CollectUntilNextKnown));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArgOptions {
    /// Type the flag's values are coerced into.
    #[serde(rename = "type")]
    pub value_type: ValueType,
    /// Value stored when the flag does not appear.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Value stored by [`Nargs::Optional`] when no value follows the flag.
    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,
    /// Destination field name override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,
    /// Whether the flag must appear.
    pub required: bool,
    /// Help text shown in `--help` output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Placeholder used for the value in usage and help text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metavar: Option<String>,
    /// What to do when the flag is seen.
    pub action: Action,
    /// Arity; `None` means the action's natural arity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nargs: Option<Nargs>,
}

impl ArgOptions {
    /// Creates options for a plain single-value string flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for a collect-until-next-known flag.
    pub fn collect_until_next_known() -> Self {
        Self::new().with_nargs(Nargs::CollectUntilNextKnown)
    }

    /// Creates options for a boolean switch.
    pub fn switch() -> Self {
        Self::new().with_action(Action::StoreTrue)
    }

    /// Sets the value type.
    pub fn with_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    /// Sets the default value.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Sets the value stored by an [`Nargs::Optional`] flag given without a value.
    pub fn with_const(mut self, value: impl Into<Value>) -> Self {
        self.const_value = Some(value.into());
        self
    }

    /// Overrides the destination field name.
    pub fn with_dest(mut self, dest: &str) -> Self {
        self.dest = Some(dest.to_string());
        self
    }

    /// Marks the flag as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Adds help text.
    pub fn with_help(mut self, help: &str) -> Self {
        self.help = Some(help.to_string());
        self
    }

    /// Sets the value placeholder.
    pub fn with_metavar(mut self, metavar: &str) -> Self {
        self.metavar = Some(metavar.to_string());
        self
    }

    /// Sets the action.
    pub fn with_action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    /// Sets the arity.
    pub fn with_nargs(mut self, nargs: Nargs) -> Self {
        self.nargs = Some(nargs);
        self
    }

    /// Returns `true` if the options request collect-until-next-known mode.
    pub fn is_collection(&self) -> bool {
        self.nargs.is_some_and(Nargs::is_collection)
    }

    /// Arity after applying the action's natural default.
    ///
    /// Value-less actions report `Exactly(0)`.
    pub fn effective_nargs(&self) -> Nargs {
        if self.action.takes_values() {
            self.nargs.unwrap_or_default()
        } else {
            Nargs::Exactly(0)
        }
    }
}

/// Parser construction options.
///
/// # Examples
///
/// ```
/// use argpass::ParserConfig;
///
/// let config = ParserConfig::new("forward").with_prefix_chars("-+");
/// assert_eq!(config.prog.as_deref(), Some("forward"));
/// assert!(config.add_help);
///
/// let defaults = ParserConfig::default();
/// assert_eq!(defaults.prefix_chars, "-");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    /// Program name for usage and error messages; defaults to the executable name.
    pub prog: Option<String>,
    /// Text shown between the usage line and the options.
    pub description: Option<String>,
    /// Text shown after the options.
    pub epilog: Option<String>,
    /// Characters that introduce a flag.
    pub prefix_chars: String,
    /// Register `-h/--help` automatically.
    pub add_help: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            prog: None,
            description: None,
            epilog: None,
            prefix_chars: DEFAULT_PREFIX_CHARS.to_string(),
            add_help: true,
        }
    }
}

impl ParserConfig {
    /// Creates a configuration with an explicit program name.
    pub fn new(prog: &str) -> Self {
        Self {
            prog: Some(prog.to_string()),
            ..Default::default()
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Adds an epilog.
    pub fn with_epilog(mut self, epilog: &str) -> Self {
        self.epilog = Some(epilog.to_string());
        self
    }

    /// Replaces the prefix characters.
    pub fn with_prefix_chars(mut self, prefix_chars: &str) -> Self {
        self.prefix_chars = prefix_chars.to_string();
        self
    }

    /// Disables the automatic help flag.
    pub fn without_help(mut self) -> Self {
        self.add_help = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_effective_nargs_for_switches() {
        assert_eq!(ArgOptions::switch().effective_nargs(), Nargs::Exactly(0));
        assert_eq!(ArgOptions::new().effective_nargs(), Nargs::Single);
        assert_eq!(
            ArgOptions::new()
                .with_action(Action::Append)
                .with_nargs(Nargs::OneOrMore)
                .effective_nargs(),
            Nargs::OneOrMore
        );
    }

    #[test]
    fn test_coerce_rejects_garbage() {
        assert_eq!(ValueType::Integer.coerce("12x"), None);
        assert_eq!(ValueType::Bool.coerce("maybe"), None);
        assert_eq!(ValueType::Float.coerce("1.5"), Some(json!(1.5)));
        assert_eq!(ValueType::String.coerce(" x "), Some(json!(" x ")));
    }

    #[test]
    fn test_options_reject_unknown_keys() {
        let err = serde_json::from_value::<ArgOptions>(json!({ "nargs": "one_or_more", "colour": "red" }));
        assert!(err.is_err());

        let opts: ArgOptions = serde_json::from_value(json!({
            "type": "integer",
            "nargs": "collect_until_next_known",
            "required": true
        }))
        .unwrap();
        assert!(opts.is_collection());
        assert!(opts.required);
        assert_eq!(opts.value_type, ValueType::Integer);
    }

    #[test]
    fn test_parser_config_defaults_from_partial_yaml() {
        let config: ParserConfig = serde_yaml::from_str("prog: demo\nprefix_chars: \"+\"\n").unwrap();
        assert_eq!(config.prog.as_deref(), Some("demo"));
        assert_eq!(config.prefix_chars, "+");
        assert!(config.add_help);
    }
}
