//! Flag parser with an argparse-style lenient mode.
//!
//! [`ArgumentParser`] registers prefixed flags, consumes their values by
//! arity, coerces types, fills defaults and checks required flags. Its
//! lenient parse ([`ArgumentParser::try_parse_known_from`]) never fails on
//! unrecognized input; such tokens are returned in order instead, which is
//! the hook [`CollectingArgumentParser`](crate::CollectingArgumentParser)
//! builds on.
//!
//! # Token classification
//!
//! - A token is flag-like if it starts with a prefix character and has at
//!   least one more character. Negative numbers (`-5`, `-.5`) are values
//!   unless some registered flag itself looks like a negative number, and
//!   tokens containing whitespace are values unless they name a flag.
//! - Flags match exactly, as `--flag=value`, or as a single-prefix short flag
//!   with the value attached (`-fVALUE`). Clustered switches (`-vq`) expand
//!   one short flag at a time. There is no abbreviation matching.
//! - A literal `--` ends flag parsing; it and everything after it are
//!   reported as unrecognized.
//! - Unrecognized flags consume nothing; the values following them are
//!   reported as unrecognized as well.

use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{ArgError, Result};
use crate::validate::{validate_prefix_chars, validate_registration};
use crate::{Action, ArgOptions, Namespace, Nargs, ParserConfig};

static NEGATIVE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-\d+$|^-\d*\.\d+$").expect("static regex must compile"));

const HELP_COLUMN: usize = 24;

/// A registered flag.
#[derive(Debug, Clone)]
struct FlagSpec {
    names: Vec<String>,
    dest: String,
    options: ArgOptions,
    nargs: Nargs,
}

/// A flag-like token resolved to a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FlagMatch {
    index: usize,
    flag: String,
    attached: Option<String>,
    short: bool,
}

#[derive(Debug)]
enum Token {
    Flag(FlagMatch),
    UnknownFlag,
    Value,
}

/// Derives a destination name from flag spellings.
///
/// Uses the first long flag (two leading prefix characters), else the first
/// name; strips the leading prefix characters and replaces `-` with `_`.
///
/// # Examples
///
/// ```
/// use argpass::derive_dest;
///
/// let names = vec!["-a".to_string(), "--args-to-pass-on".to_string()];
/// assert_eq!(derive_dest(&names, "-"), "args_to_pass_on");
/// assert_eq!(derive_dest(&["+x".to_string()], "+"), "x");
/// ```
pub fn derive_dest(names: &[String], prefix_chars: &str) -> String {
    let is_prefix = |c: char| prefix_chars.contains(c);
    let long = names.iter().find(|name| {
        let mut chars = name.chars();
        chars.next().is_some_and(is_prefix) && chars.next().is_some_and(is_prefix)
    });
    let selected = long.or(names.first()).map(String::as_str).unwrap_or_default();
    selected.trim_start_matches(is_prefix).replace('-', "_")
}

/// Converts a process argument vector into parser tokens.
///
/// The first element (the program name) is dropped. Arguments that are not
/// valid UTF-8 are rejected rather than rewritten, so a collected token is
/// never handed on in a different form than it was given.
///
/// # Errors
///
/// Returns [`ArgError::InvalidUtf8`] for the first argument that is not
/// valid UTF-8.
///
/// # Examples
///
/// ```
/// use std::ffi::OsString;
///
/// use argpass::tokens_from_args;
///
/// let argv = ["tool", "--rest", "-x"].map(OsString::from);
/// assert_eq!(tokens_from_args(argv).unwrap(), vec!["--rest", "-x"]);
/// ```
pub fn tokens_from_args<I>(args: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .skip(1)
        .map(|arg| {
            arg.into_string()
                .map_err(|raw| ArgError::InvalidUtf8(raw.to_string_lossy().into_owned()))
        })
        .collect()
}

fn default_prog() -> String {
    std::env::args_os()
        .next()
        .and_then(|arg0| {
            Path::new(&arg0)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "prog".to_string())
}

/// Flag parser.
///
/// # Examples
///
/// ```
/// use argpass::{ArgOptions, ArgumentParser, ParserConfig, ValueType};
///
/// let mut parser = ArgumentParser::new(ParserConfig::new("serve")).unwrap();
/// parser.add_argument(["-p", "--port"], ArgOptions::new().with_type(ValueType::Integer)).unwrap();
/// parser.add_argument(["--verbose"], ArgOptions::switch()).unwrap();
///
/// let (ns, unknown) = parser
///     .try_parse_known_from(["--port", "8080", "--color", "always"])
///     .unwrap();
/// assert_eq!(ns.get_i64("port"), Some(8080));
/// assert_eq!(ns.get_bool("verbose"), Some(false));
/// assert_eq!(unknown, vec!["--color", "always"]);
///
/// let err = parser.try_parse_from(["--color"]).unwrap_err();
/// assert_eq!(err.exit_code(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ArgumentParser {
    config: ParserConfig,
    prog: String,
    flags: Vec<FlagSpec>,
    lookup: HashMap<String, usize>,
    has_negative_number_flags: bool,
}

impl ArgumentParser {
    /// Creates a parser, registering `-h/--help` unless disabled.
    ///
    /// # Errors
    ///
    /// Returns a registration error if the prefix characters are invalid.
    pub fn new(config: ParserConfig) -> Result<Self> {
        validate_prefix_chars(&config.prefix_chars)?;

        let prog = config.prog.clone().unwrap_or_else(default_prog);
        let mut parser = Self {
            config,
            prog,
            flags: Vec::new(),
            lookup: HashMap::new(),
            has_negative_number_flags: false,
        };

        if parser.config.add_help {
            let lead = parser.lead_char();
            parser.add_argument(
                [format!("{lead}h"), format!("{lead}{lead}help")],
                ArgOptions::new()
                    .with_action(Action::Help)
                    .with_help("show this help message and exit"),
            )?;
        }

        Ok(parser)
    }

    /// Registers a flag and returns its destination name.
    ///
    /// # Errors
    ///
    /// Returns a registration error for malformed or duplicate names and
    /// contradictory options.
    pub fn add_argument<I, S>(&mut self, names: I, options: ArgOptions) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let known: HashSet<String> = self.lookup.keys().cloned().collect();
        validate_registration(&names, &options, &self.config.prefix_chars, &known)?;

        let dest = options
            .dest
            .clone()
            .unwrap_or_else(|| derive_dest(&names, &self.config.prefix_chars));
        let index = self.flags.len();
        for name in &names {
            if NEGATIVE_NUMBER_RE.is_match(name) {
                self.has_negative_number_flags = true;
            }
            self.lookup.insert(name.clone(), index);
        }

        debug!(flags = ?names, dest = %dest, action = ?options.action, "registered flag");
        self.flags.push(FlagSpec {
            nargs: options.effective_nargs(),
            names,
            dest: dest.clone(),
            options,
        });
        Ok(dest)
    }

    /// Configuration this parser was built from.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Program name used in usage and error messages.
    pub fn prog(&self) -> &str {
        &self.prog
    }

    /// Returns `true` if `name` is a registered flag spelling.
    pub fn is_registered(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    /// Parses `tokens`, returning unrecognized tokens instead of failing on them.
    ///
    /// # Errors
    ///
    /// Returns usage errors for missing or invalid values and missing
    /// required flags, and [`ArgError::DisplayHelp`] when help is requested.
    pub fn try_parse_known_from<I, T>(&self, tokens: I) -> Result<(Namespace, Vec<String>)>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        self.parse_tokens(&tokens)
    }

    /// Parses `tokens`, failing on any unrecognized token.
    ///
    /// # Errors
    ///
    /// As [`try_parse_known_from`](Self::try_parse_known_from), plus
    /// [`ArgError::UnrecognizedArguments`] if anything is left over.
    pub fn try_parse_from<I, T>(&self, tokens: I) -> Result<Namespace>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let (namespace, unknown) = self.try_parse_known_from(tokens)?;
        if !unknown.is_empty() {
            return Err(ArgError::UnrecognizedArguments(unknown));
        }
        Ok(namespace)
    }

    /// Lenient parse of `tokens`; prints the error and exits on failure.
    pub fn parse_known_from<I, T>(&self, tokens: I) -> (Namespace, Vec<String>)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.try_parse_known_from(tokens)
            .unwrap_or_else(|err| self.exit(&err))
    }

    /// Strict parse of `tokens`; prints the error and exits on failure.
    pub fn parse_from<I, T>(&self, tokens: I) -> Namespace
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.try_parse_from(tokens)
            .unwrap_or_else(|err| self.exit(&err))
    }

    /// Lenient parse of the process's arguments.
    pub fn parse_known(&self) -> (Namespace, Vec<String>) {
        tokens_from_args(std::env::args_os())
            .and_then(|tokens| self.try_parse_known_from(tokens))
            .unwrap_or_else(|err| self.exit(&err))
    }

    /// Strict parse of the process's arguments.
    pub fn parse(&self) -> Namespace {
        tokens_from_args(std::env::args_os())
            .and_then(|tokens| self.try_parse_from(tokens))
            .unwrap_or_else(|err| self.exit(&err))
    }

    /// Renders the one-line usage summary.
    pub fn format_usage(&self) -> String {
        let mut parts = vec![format!("usage: {}", self.prog)];
        for spec in &self.flags {
            let name = spec.names.first().map(String::as_str).unwrap_or_default();
            let args = format_args(spec);
            let item = if args.is_empty() {
                name.to_string()
            } else {
                format!("{name} {args}")
            };
            if spec.options.required {
                parts.push(item);
            } else {
                parts.push(format!("[{item}]"));
            }
        }
        parts.join(" ")
    }

    /// Renders the full help text.
    pub fn format_help(&self) -> String {
        let mut out = self.format_usage();
        out.push('\n');

        if let Some(description) = self.config.description.as_deref().filter(|d| !d.is_empty()) {
            out.push('\n');
            out.push_str(description);
            out.push('\n');
        }

        if !self.flags.is_empty() {
            out.push_str("\noptions:\n");
            let width = HELP_COLUMN - 4;
            for spec in &self.flags {
                let args = format_args(spec);
                let invocation = spec
                    .names
                    .iter()
                    .map(|name| {
                        if args.is_empty() {
                            name.clone()
                        } else {
                            format!("{name} {args}")
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(", ");

                match spec.options.help.as_deref() {
                    None | Some("") => out.push_str(&format!("  {invocation}\n")),
                    Some(help) if invocation.chars().count() <= width => {
                        out.push_str(&format!("  {invocation:<width$}  {help}\n"));
                    }
                    Some(help) => {
                        out.push_str(&format!("  {invocation}\n{:pad$}{help}\n", "", pad = HELP_COLUMN));
                    }
                }
            }
        }

        if let Some(epilog) = self.config.epilog.as_deref().filter(|e| !e.is_empty()) {
            out.push('\n');
            out.push_str(epilog);
            out.push('\n');
        }

        out
    }

    /// Renders an error the way [`exit`](Self::exit) prints it.
    pub fn format_error(&self, err: &ArgError) -> String {
        format!("{}\n{}: error: {err}\n", self.format_usage(), self.prog)
    }

    /// Prints `err` (help to stdout, everything else to stderr) and exits
    /// with its status.
    pub fn exit(&self, err: &ArgError) -> ! {
        match err {
            ArgError::DisplayHelp(help) => print!("{help}"),
            _ => eprint!("{}", self.format_error(err)),
        }
        std::process::exit(err.exit_code())
    }

    fn lead_char(&self) -> char {
        self.config.prefix_chars.chars().next().unwrap_or('-')
    }

    fn is_prefix(&self, c: char) -> bool {
        self.config.prefix_chars.contains(c)
    }

    fn parse_tokens(&self, tokens: &[String]) -> Result<(Namespace, Vec<String>)> {
        let mut namespace = self.initial_namespace();
        let mut seen = vec![false; self.flags.len()];
        let mut unknown = Vec::new();
        let mut cursor = 0;
        let mut carried: Option<String> = None;

        loop {
            let token = match carried.take() {
                Some(token) => token,
                None => {
                    let Some(token) = tokens.get(cursor) else {
                        break;
                    };
                    if token == "--" {
                        unknown.extend(tokens[cursor..].iter().cloned());
                        break;
                    }
                    cursor += 1;
                    token.clone()
                }
            };

            let found = match self.classify(&token) {
                Token::Flag(found) => found,
                Token::UnknownFlag | Token::Value => {
                    trace!(token = %token, "unrecognized token");
                    unknown.push(token);
                    continue;
                }
            };
            let spec = &self.flags[found.index];
            seen[found.index] = true;

            if !spec.options.action.takes_values() {
                if let Some(rest) = &found.attached {
                    if !found.short {
                        return Err(ArgError::IgnoredExplicitValue {
                            flag: found.flag,
                            value: rest.clone(),
                        });
                    }
                    // `-vq` continues as `-q`
                    let lead = found.flag.chars().next().unwrap_or('-');
                    carried = Some(format!("{lead}{rest}"));
                }
                self.apply(spec, &found.flag, Vec::new(), &mut namespace)?;
                continue;
            }

            let available = tokens[cursor..]
                .iter()
                .take_while(|candidate| self.is_value(candidate))
                .count();
            let (values, consumed) =
                take_values(spec, &found, &tokens[cursor..cursor + available])?;
            cursor += consumed;
            self.apply(spec, &found.flag, values, &mut namespace)?;
        }

        let missing: Vec<String> = self
            .flags
            .iter()
            .zip(&seen)
            .filter(|(spec, seen)| spec.options.required && !**seen)
            .map(|(spec, _)| spec.names.join("/"))
            .collect();
        if !missing.is_empty() {
            return Err(ArgError::MissingRequired(missing));
        }

        debug!(
            prog = %self.prog,
            tokens = tokens.len(),
            unknown = unknown.len(),
            "parsed command line"
        );
        Ok((namespace, unknown))
    }

    fn initial_namespace(&self) -> Namespace {
        let mut namespace = Namespace::new();
        for spec in &self.flags {
            if spec.options.action == Action::Help || namespace.contains(&spec.dest) {
                continue;
            }
            let value = spec.options.default.clone().unwrap_or_else(|| match spec.options.action {
                Action::StoreTrue => Value::Bool(false),
                Action::StoreFalse => Value::Bool(true),
                Action::Count => Value::from(0),
                Action::Append => Value::Array(Vec::new()),
                Action::Store | Action::Help => Value::Null,
            });
            namespace.insert(spec.dest.clone(), value);
        }
        namespace
    }

    fn classify(&self, token: &str) -> Token {
        let mut chars = token.chars();
        let starts_like_flag = chars.next().is_some_and(|c| self.is_prefix(c)) && chars.next().is_some();
        if !starts_like_flag {
            return Token::Value;
        }
        if let Some(found) = self.match_flag(token) {
            return Token::Flag(found);
        }
        if (!self.has_negative_number_flags && NEGATIVE_NUMBER_RE.is_match(token))
            || token.chars().any(char::is_whitespace)
        {
            return Token::Value;
        }
        Token::UnknownFlag
    }

    fn is_value(&self, token: &str) -> bool {
        token != "--" && matches!(self.classify(token), Token::Value)
    }

    fn match_flag(&self, token: &str) -> Option<FlagMatch> {
        if let Some(&index) = self.lookup.get(token) {
            return Some(FlagMatch {
                index,
                flag: token.to_string(),
                attached: None,
                short: false,
            });
        }

        if let Some((head, value)) = token.split_once('=') {
            if let Some(&index) = self.lookup.get(head) {
                return Some(FlagMatch {
                    index,
                    flag: head.to_string(),
                    attached: Some(value.to_string()),
                    short: false,
                });
            }
        }

        let mut chars = token.char_indices();
        chars.next()?;
        let (second_at, second) = chars.next()?;
        if self.is_prefix(second) {
            return None;
        }
        let split = second_at + second.len_utf8();
        if split >= token.len() {
            return None;
        }
        let (head, rest) = token.split_at(split);
        let &index = self.lookup.get(head)?;
        Some(FlagMatch {
            index,
            flag: head.to_string(),
            attached: Some(rest.to_string()),
            short: true,
        })
    }

    fn apply(
        &self,
        spec: &FlagSpec,
        flag: &str,
        values: Vec<String>,
        namespace: &mut Namespace,
    ) -> Result<()> {
        match spec.options.action {
            Action::Store => {
                let value = convert(spec, flag, values)?;
                namespace.insert(spec.dest.clone(), value);
            }
            Action::Append => {
                let value = convert(spec, flag, values)?;
                match namespace.get_mut(&spec.dest) {
                    Some(Value::Array(items)) => items.push(value),
                    _ => {
                        namespace.insert(spec.dest.clone(), Value::Array(vec![value]));
                    }
                }
            }
            Action::StoreTrue => {
                namespace.insert(spec.dest.clone(), Value::Bool(true));
            }
            Action::StoreFalse => {
                namespace.insert(spec.dest.clone(), Value::Bool(false));
            }
            Action::Count => {
                let count = namespace.get_i64(&spec.dest).unwrap_or(0);
                namespace.insert(spec.dest.clone(), Value::from(count + 1));
            }
            Action::Help => return Err(ArgError::DisplayHelp(self.format_help())),
        }
        Ok(())
    }
}

fn take_values(spec: &FlagSpec, found: &FlagMatch, available: &[String]) -> Result<(Vec<String>, usize)> {
    if spec.nargs.is_collection() {
        return Err(ArgError::Internal(format!(
            "{} registered with collect-until-next-known on a plain parser",
            found.flag
        )));
    }

    let mut values: Vec<String> = found.attached.iter().cloned().collect();
    let needed = spec.nargs.min_values().saturating_sub(values.len());
    if available.len() < needed {
        return Err(ArgError::MissingValue {
            flag: found.flag.clone(),
            expected: expected_values(spec.nargs),
        });
    }

    // An attached value satisfies every open-ended arity.
    let take = match spec.nargs {
        Nargs::Exactly(_) => needed,
        _ if !values.is_empty() => 0,
        Nargs::Single => 1,
        Nargs::Optional => available.len().min(1),
        _ => available.len(),
    };

    values.extend(available[..take].iter().cloned());
    Ok((values, take))
}

fn expected_values(nargs: Nargs) -> String {
    match nargs {
        Nargs::Single => "expected one argument".to_string(),
        Nargs::Exactly(1) => "expected 1 argument".to_string(),
        Nargs::Exactly(n) => format!("expected {n} arguments"),
        _ => "expected at least one argument".to_string(),
    }
}

fn convert(spec: &FlagSpec, flag: &str, values: Vec<String>) -> Result<Value> {
    let value_type = spec.options.value_type;
    let coerce = |raw: String| {
        value_type.coerce(&raw).ok_or_else(|| ArgError::InvalidValue {
            flag: flag.to_string(),
            kind: value_type.name(),
            value: raw,
        })
    };

    if spec.nargs.stores_list() {
        return values
            .into_iter()
            .map(coerce)
            .collect::<Result<Vec<_>>>()
            .map(Value::Array);
    }

    match values.into_iter().next() {
        Some(raw) => coerce(raw),
        None => Ok(spec.options.const_value.clone().unwrap_or(Value::Null)),
    }
}

fn format_args(spec: &FlagSpec) -> String {
    let metavar = spec
        .options
        .metavar
        .clone()
        .unwrap_or_else(|| spec.dest.to_uppercase());
    match spec.nargs {
        Nargs::Single => metavar,
        Nargs::Optional => format!("[{metavar}]"),
        Nargs::ZeroOrMore | Nargs::CollectUntilNextKnown => format!("[{metavar} ...]"),
        Nargs::OneOrMore => format!("{metavar} [{metavar} ...]"),
        Nargs::Exactly(n) => vec![metavar; n].join(" "),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ValueType;

    fn parser() -> ArgumentParser {
        let mut parser = ArgumentParser::new(ParserConfig::new("prog")).unwrap();
        parser.add_argument(["-f", "--file"], ArgOptions::new()).unwrap();
        parser
            .add_argument(["-n"], ArgOptions::new().with_type(ValueType::Integer))
            .unwrap();
        parser.add_argument(["-v", "--verbose"], ArgOptions::switch()).unwrap();
        parser.add_argument(["-q"], ArgOptions::switch()).unwrap();
        parser
    }

    #[test]
    fn test_defaults_are_filled() {
        let ns = parser().try_parse_from(Vec::<String>::new()).unwrap();
        assert_eq!(
            serde_json::to_value(&ns).unwrap(),
            json!({ "file": null, "n": null, "verbose": false, "q": false })
        );
    }

    #[test]
    fn test_attached_values() {
        let p = parser();
        assert_eq!(p.try_parse_from(["--file=a.txt"]).unwrap().get_str("file"), Some("a.txt"));
        assert_eq!(p.try_parse_from(["-fa.txt"]).unwrap().get_str("file"), Some("a.txt"));
        assert_eq!(p.try_parse_from(["-f=a.txt"]).unwrap().get_str("file"), Some("a.txt"));
    }

    #[test]
    fn test_clustered_switches() {
        let ns = parser().try_parse_from(["-vq"]).unwrap();
        assert_eq!(ns.get_bool("verbose"), Some(true));
        assert_eq!(ns.get_bool("q"), Some(true));

        let ns = parser().try_parse_from(["-vfx.txt"]).unwrap();
        assert_eq!(ns.get_bool("verbose"), Some(true));
        assert_eq!(ns.get_str("file"), Some("x.txt"));
    }

    #[test]
    fn test_explicit_value_on_switch_is_rejected() {
        let err = parser().try_parse_from(["--verbose=yes"]).unwrap_err();
        assert_eq!(
            err,
            ArgError::IgnoredExplicitValue {
                flag: "--verbose".into(),
                value: "yes".into()
            }
        );
    }

    #[test]
    fn test_negative_numbers_are_values() {
        let ns = parser().try_parse_from(["-n", "-5"]).unwrap();
        assert_eq!(ns.get_i64("n"), Some(-5));

        let (_, unknown) = parser().try_parse_known_from(["-5", "-x"]).unwrap();
        assert_eq!(unknown, vec!["-5", "-x"]);
    }

    #[test]
    fn test_negative_number_flag_changes_classification() {
        let mut p = parser();
        p.add_argument(["-1"], ArgOptions::switch()).unwrap();
        let err = p.try_parse_from(["-n", "-5"]).unwrap_err();
        assert_eq!(
            err,
            ArgError::MissingValue {
                flag: "-n".into(),
                expected: "expected one argument".into()
            }
        );
    }

    #[test]
    fn test_missing_value_at_end_and_before_flag() {
        let p = parser();
        assert!(matches!(p.try_parse_from(["--file"]), Err(ArgError::MissingValue { .. })));
        assert!(matches!(
            p.try_parse_from(["--file", "--verbose"]),
            Err(ArgError::MissingValue { .. })
        ));
    }

    #[test]
    fn test_invalid_type() {
        let err = parser().try_parse_from(["-n", "ten"]).unwrap_err();
        assert_eq!(err.to_string(), "argument -n: invalid int value: 'ten'");
    }

    #[test]
    fn test_unknown_tokens_keep_order() {
        let (ns, unknown) = parser()
            .try_parse_known_from(["--bogus", "x", "--file", "a", "y", "--more=1"])
            .unwrap();
        assert_eq!(ns.get_str("file"), Some("a"));
        assert_eq!(unknown, vec!["--bogus", "x", "y", "--more=1"]);
    }

    #[test]
    fn test_double_dash_ends_flag_parsing() {
        let (ns, unknown) = parser()
            .try_parse_known_from(["-v", "--", "--file", "a"])
            .unwrap();
        assert_eq!(ns.get_bool("verbose"), Some(true));
        assert_eq!(ns.get_str("file"), None);
        assert_eq!(unknown, vec!["--", "--file", "a"]);
    }

    #[test]
    fn test_nargs_variants() {
        let mut p = ArgumentParser::new(ParserConfig::new("prog")).unwrap();
        p.add_argument(["--opt"], ArgOptions::new().with_nargs(Nargs::Optional).with_const("c"))
            .unwrap();
        p.add_argument(["--many"], ArgOptions::new().with_nargs(Nargs::ZeroOrMore))
            .unwrap();
        p.add_argument(["--some"], ArgOptions::new().with_nargs(Nargs::OneOrMore))
            .unwrap();
        p.add_argument(
            ["--pair"],
            ArgOptions::new()
                .with_nargs(Nargs::Exactly(2))
                .with_type(ValueType::Float),
        )
        .unwrap();

        let ns = p
            .try_parse_from(["--opt", "--many", "a", "b", "--some", "c", "--pair", "1", "2.5"])
            .unwrap();
        assert_eq!(ns.get("opt"), Some(&json!("c")));
        assert_eq!(ns.get_strings("many"), Some(vec!["a", "b"]));
        assert_eq!(ns.get_strings("some"), Some(vec!["c"]));
        assert_eq!(ns.get("pair"), Some(&json!([1.0, 2.5])));

        assert!(matches!(p.try_parse_from(["--some"]), Err(ArgError::MissingValue { .. })));
        let err = p.try_parse_from(["--pair", "1"]).unwrap_err();
        assert_eq!(err.to_string(), "argument --pair: expected 2 arguments");
    }

    #[test]
    fn test_append_and_count() {
        let mut p = ArgumentParser::new(ParserConfig::new("prog")).unwrap();
        p.add_argument(["-I"], ArgOptions::new().with_action(Action::Append))
            .unwrap();
        p.add_argument(["-v"], ArgOptions::new().with_action(Action::Count))
            .unwrap();

        let ns = p.try_parse_from(["-I", "a", "-v", "-Ib", "-v"]).unwrap();
        assert_eq!(ns.get_strings("I"), Some(vec!["a", "b"]));
        assert_eq!(ns.get_i64("v"), Some(2));

        let ns = p.try_parse_from(Vec::<String>::new()).unwrap();
        assert_eq!(ns.get_strings("I"), Some(vec![]));
        assert_eq!(ns.get_i64("v"), Some(0));
    }

    #[test]
    fn test_required_flags() {
        let mut p = ArgumentParser::new(ParserConfig::new("prog")).unwrap();
        p.add_argument(["--in"], ArgOptions::new().required()).unwrap();
        p.add_argument(["-o", "--out"], ArgOptions::new().required()).unwrap();

        let err = p.try_parse_known_from(["--in", "x"]).unwrap_err();
        assert_eq!(err, ArgError::MissingRequired(vec!["-o/--out".into()]));
    }

    #[test]
    fn test_help_request() {
        let err = parser().try_parse_from(["--file", "a", "-h", "--bogus"]).unwrap_err();
        let ArgError::DisplayHelp(help) = &err else {
            panic!("expected help, got {err:?}");
        };
        assert_eq!(err.exit_code(), 0);
        assert!(help.starts_with("usage: prog [-h] [-f FILE] [-n N] [-v] [-q]\n"));
        assert!(help.contains("  -h, --help            show this help message and exit\n"));
    }

    #[test]
    fn test_help_uses_custom_prefix() {
        let p = ArgumentParser::new(ParserConfig::new("prog").with_prefix_chars("+")).unwrap();
        assert!(p.is_registered("+h"));
        assert!(p.is_registered("++help"));
        assert!(!p.is_registered("--help"));
    }

    #[test]
    fn test_help_layout() {
        let mut p = ArgumentParser::new(
            ParserConfig::new("prog")
                .with_description("Does things.")
                .with_epilog("See the manual.")
                .without_help(),
        )
        .unwrap();
        p.add_argument(["--rest"], ArgOptions::new().with_nargs(Nargs::ZeroOrMore))
            .unwrap();
        p.add_argument(
            ["--a-very-long-option-name"],
            ArgOptions::new().with_metavar("X").with_help("long one"),
        )
        .unwrap();

        assert_eq!(
            p.format_help(),
            "usage: prog [--rest [REST ...]] [--a-very-long-option-name X]\n\
             \n\
             Does things.\n\
             \n\
             options:\n  \
             --rest [REST ...]\n  \
             --a-very-long-option-name X\n                        long one\n\
             \n\
             See the manual.\n"
        );
    }

    #[test]
    fn test_format_error() {
        let p = parser();
        let err = ArgError::UnrecognizedArguments(vec!["--x".into()]);
        assert_eq!(
            p.format_error(&err),
            "usage: prog [-h] [-f FILE] [-n N] [-v] [-q]\nprog: error: unrecognized arguments: --x\n"
        );
    }

    #[test]
    fn test_registration_errors_leave_parser_untouched() {
        let mut p = parser();
        let err = p.add_argument(["--new", "--file"], ArgOptions::new()).unwrap_err();
        assert!(matches!(err, ArgError::Registration(_)));
        assert!(!p.is_registered("--new"));
    }

    #[test]
    fn test_reparse_does_not_accumulate() {
        let mut p = parser();
        p.add_argument(["-I"], ArgOptions::new().with_action(Action::Append))
            .unwrap();
        let first = p.try_parse_from(["-I", "a"]).unwrap();
        let second = p.try_parse_from(["-I", "a"]).unwrap();
        assert_eq!(first, second);
        assert_eq!(second.get_strings("I"), Some(vec!["a"]));
    }

    #[test]
    fn test_tokens_from_args_drops_program_name() {
        let argv = ["/usr/bin/tool", "--file", "a b", "-v", "--"].map(OsString::from);
        assert_eq!(tokens_from_args(argv).unwrap(), vec!["--file", "a b", "-v", "--"]);
        assert!(tokens_from_args(Vec::<OsString>::new()).unwrap().is_empty());
        assert!(tokens_from_args([OsString::from("tool")]).unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_tokens_from_args_rejects_invalid_utf8() {
        use std::os::unix::ffi::OsStringExt;

        let argv = vec![
            OsString::from("tool"),
            OsString::from("--file"),
            OsString::from_vec(b"caf\xe9".to_vec()),
        ];
        let err = tokens_from_args(argv).unwrap_err();
        assert_eq!(err, ArgError::InvalidUtf8("caf\u{FFFD}".into()));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_missing_value_messages_follow_arity() {
        let mut p = ArgumentParser::new(ParserConfig::new("prog")).unwrap();
        p.add_argument(["--one"], ArgOptions::new().with_nargs(Nargs::Exactly(1)))
            .unwrap();
        p.add_argument(["--opt"], ArgOptions::new().with_nargs(Nargs::Optional))
            .unwrap();

        let err = p.try_parse_from(["--one"]).unwrap_err();
        assert_eq!(err.to_string(), "argument --one: expected 1 argument");
        assert_eq!(p.try_parse_from(["--one=x"]).unwrap().get("one"), Some(&json!(["x"])));
        assert_eq!(p.try_parse_from(["--opt"]).unwrap().get("opt"), Some(&Value::Null));
    }
}
