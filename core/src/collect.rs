//! Collect-until-next-known flags on top of [`ArgumentParser`].
//!
//! A flag registered with [`Nargs::CollectUntilNextKnown`] swallows every
//! following token, including tokens that look like flags, until the next
//! token that is a registered flag. This lets a command line carry an opaque
//! argument list for a child process without a delimiter:
//!
//! ```text
//! tool --file test.txt --pass-on --param1 val1 --blu --regular-arg x
//!                      ^^^^^^^^^ collects [--param1, val1, --blu]
//! ```
//!
//! The collecting parser never changes how the underlying parser works. It
//! registers collection flags there as plain zero-or-more flags and, on every
//! parse:
//!
//! 1. rewrites the token list, inserting a synthetic marker (see
//!    [`MarkerConvention`]) right after each collection flag, so the flag
//!    itself consumes nothing and the marker plus the whole payload end up in
//!    the underlying parser's unrecognized list;
//! 2. walks that list, switching the active collection whenever it meets a
//!    marker and moving every later token into the active collection.
//!
//! Tokens that precede the first collection flag stay unrecognized. Once a
//! collection has started, every later unrecognized token belongs to the
//! most recent collection, including tokens after intervening plain flags.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{ArgError, Result};
use crate::marker::MarkerConvention;
use crate::parser::{ArgumentParser, tokens_from_args};
use crate::validate::RegistrationError;
use crate::{Action, ArgOptions, Namespace, Nargs, ParserConfig};

/// Marker and destination of one collect-until-next-known flag spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Synthetic marker inserted after the flag.
    pub marker: String,
    /// Destination field that receives the collected tokens.
    pub dest: String,
}

/// Argument parser with collect-until-next-known support.
///
/// Wraps an [`ArgumentParser`]; plain flags behave exactly as they do there.
///
/// # Examples
///
/// ```
/// use argpass::{ArgOptions, CollectingArgumentParser, ParserConfig};
///
/// let mut parser = CollectingArgumentParser::new(ParserConfig::new("wrap")).unwrap();
/// parser.add_argument(["--file"], ArgOptions::new()).unwrap();
/// parser
///     .add_argument(["--pass-on"], ArgOptions::collect_until_next_known())
///     .unwrap();
///
/// let ns = parser
///     .try_parse_from(["--pass-on", "--param1", "val1", "-x", "--file", "a.txt"])
///     .unwrap();
/// assert_eq!(ns.get_str("file"), Some("a.txt"));
/// assert_eq!(ns.get_strings("pass_on"), Some(vec!["--param1", "val1", "-x"]));
/// ```
#[derive(Debug, Clone)]
pub struct CollectingArgumentParser {
    inner: ArgumentParser,
    markers: MarkerConvention,
    registrations: BTreeMap<String, Registration>,
    marker_dests: HashMap<String, String>,
}

impl CollectingArgumentParser {
    /// Creates a parser from the same configuration an [`ArgumentParser`] takes.
    ///
    /// # Errors
    ///
    /// Returns a registration error if the prefix characters are invalid.
    pub fn new(config: ParserConfig) -> Result<Self> {
        let inner = ArgumentParser::new(config)?;
        let markers = MarkerConvention::new(&inner.config().prefix_chars);
        debug!(sigil = ?markers.sigil(), "chose marker convention");
        Ok(Self {
            inner,
            markers,
            registrations: BTreeMap::new(),
            marker_dests: HashMap::new(),
        })
    }

    /// Registers a flag and returns its destination name.
    ///
    /// Collection-mode registrations are handed to the underlying parser as
    /// [`Nargs::ZeroOrMore`] flags defaulting to an empty list; everything
    /// else is delegated unchanged.
    ///
    /// # Errors
    ///
    /// Propagates the underlying parser's registration errors. Collection
    /// mode additionally requires the [`Action::Store`] action.
    pub fn add_argument<I, S>(&mut self, names: I, options: ArgOptions) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if !options.is_collection() {
            return self.inner.add_argument(names, options);
        }

        if options.action != Action::Store {
            return Err(RegistrationError::CollectionAction {
                flag: names.first().cloned().unwrap_or_default(),
                action: options.action,
            }
            .into());
        }

        let mut delegated = options.with_nargs(Nargs::ZeroOrMore);
        if delegated.default.is_none() {
            delegated.default = Some(Value::Array(Vec::new()));
        }
        let dest = self.inner.add_argument(names.iter().cloned(), delegated)?;

        for name in names {
            let marker = self.markers.marker_for(&name);
            debug!(flag = %name, dest = %dest, "registered collect-until-next-known flag");
            self.marker_dests.insert(marker.clone(), dest.clone());
            self.registrations.insert(
                name,
                Registration {
                    marker,
                    dest: dest.clone(),
                },
            );
        }
        Ok(dest)
    }

    /// The wrapped parser.
    pub fn inner(&self) -> &ArgumentParser {
        &self.inner
    }

    /// Marker convention derived from the configured prefix characters.
    pub fn markers(&self) -> MarkerConvention {
        self.markers
    }

    /// Collection-mode flag spellings and their registrations.
    pub fn registrations(&self) -> impl Iterator<Item = (&str, &Registration)> {
        self.registrations.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the token list handed to the underlying parser.
    ///
    /// Each collection flag is followed by its marker. After a literal `--`
    /// nothing is a flag any more, so no markers are inserted there.
    ///
    /// # Examples
    ///
    /// ```
    /// use argpass::{ArgOptions, CollectingArgumentParser, ParserConfig};
    ///
    /// let mut parser = CollectingArgumentParser::new(ParserConfig::new("wrap")).unwrap();
    /// parser.add_argument(["--rest"], ArgOptions::collect_until_next_known()).unwrap();
    ///
    /// let tokens = vec!["--rest".to_string(), "-x".to_string()];
    /// assert_eq!(parser.rewrite(&tokens), vec!["--rest", "--?\0--rest", "-x"]);
    /// ```
    pub fn rewrite(&self, tokens: &[String]) -> Vec<String> {
        let mut rewritten = Vec::with_capacity(tokens.len() + self.registrations.len());
        let mut rest = tokens.iter();
        for token in rest.by_ref() {
            rewritten.push(token.clone());
            if token == "--" {
                break;
            }
            if let Some(registration) = self.registrations.get(token) {
                rewritten.push(registration.marker.clone());
            }
        }
        rewritten.extend(rest.cloned());
        rewritten
    }

    /// Lenient parse: returns the namespace and the tokens that are neither
    /// recognized nor collected.
    ///
    /// # Errors
    ///
    /// Propagates the underlying parser's usage and help errors, and returns
    /// [`ArgError::Internal`] if a collection destination is missing from the
    /// underlying result.
    pub fn try_parse_known_from<I, T>(&self, tokens: I) -> Result<(Namespace, Vec<String>)>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let rewritten = self.rewrite(&tokens);
        let (mut namespace, unknown) = self.inner.try_parse_known_from(rewritten)?;
        let still_unknown = self.reassemble(&mut namespace, unknown)?;
        debug!(
            tokens = tokens.len(),
            unknown = still_unknown.len(),
            "reassembled collections"
        );
        Ok((namespace, still_unknown))
    }

    /// Strict parse: fails if any token is neither recognized nor collected.
    ///
    /// # Errors
    ///
    /// As [`try_parse_known_from`](Self::try_parse_known_from), plus
    /// [`ArgError::UnrecognizedArguments`] listing exactly the leftover
    /// tokens.
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
    ///
    /// Arguments that are not valid UTF-8 are reported as a usage error.
    pub fn parse_known(&self) -> (Namespace, Vec<String>) {
        tokens_from_args(std::env::args_os())
            .and_then(|tokens| self.try_parse_known_from(tokens))
            .unwrap_or_else(|err| self.exit(&err))
    }

    /// Strict parse of the process's arguments.
    ///
    /// Arguments that are not valid UTF-8 are reported as a usage error.
    pub fn parse(&self) -> Namespace {
        tokens_from_args(std::env::args_os())
            .and_then(|tokens| self.try_parse_from(tokens))
            .unwrap_or_else(|err| self.exit(&err))
    }

    /// Renders the usage line.
    pub fn format_usage(&self) -> String {
        self.inner.format_usage()
    }

    /// Renders the help text.
    pub fn format_help(&self) -> String {
        self.inner.format_help()
    }

    /// Renders an error as [`exit`](Self::exit) prints it.
    pub fn format_error(&self, err: &ArgError) -> String {
        self.inner.format_error(err)
    }

    /// Prints `err` and exits with its status.
    pub fn exit(&self, err: &ArgError) -> ! {
        self.inner.exit(err)
    }

    fn reassemble(&self, namespace: &mut Namespace, unknown: Vec<String>) -> Result<Vec<String>> {
        let mut active: Option<&str> = None;
        let mut still_unknown = Vec::new();

        for token in unknown {
            if let Some(dest) = self.marker_dests.get(&token) {
                trace!(dest = %dest, "collection started");
                active = Some(dest.as_str());
                continue;
            }
            if self.markers.is_marker(&token) {
                return Err(ArgError::Internal(format!(
                    "marker {token:?} has no registration"
                )));
            }

            let Some(dest) = active else {
                still_unknown.push(token);
                continue;
            };
            match namespace.get_mut(dest) {
                Some(Value::Array(items)) => items.push(Value::String(token)),
                Some(other) => {
                    return Err(ArgError::Internal(format!(
                        "collection destination `{dest}` holds {other} instead of a list"
                    )));
                }
                None => {
                    return Err(ArgError::Internal(format!(
                        "collection destination `{dest}` missing from namespace"
                    )));
                }
            }
        }

        Ok(still_unknown)
    }
}
