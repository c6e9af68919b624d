//! Registration validation.
//!
//! Checks flag spellings and option combinations before a flag is added to a
//! parser, catching malformed names, duplicates and contradictory options
//! before they can confuse token classification.
//!
//! # Examples
//!
//! ```
//! use std::collections::HashSet;
//!
//! use argpass::{ArgOptions, RegistrationError, validate_registration};
//!
//! let known = HashSet::new();
//! let names = vec!["-v".to_string(), "--verbose".to_string()];
//! assert!(validate_registration(&names, &ArgOptions::switch(), "-", &known).is_ok());
//!
//! // Positional names are not flags
//! let bad = vec!["verbose".to_string()];
//! assert_eq!(
//!     validate_registration(&bad, &ArgOptions::new(), "-", &known),
//!     Err(RegistrationError::PositionalNotSupported("verbose".to_string()))
//! );
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{Action, ArgOptions, Nargs};

/// Registration validation errors.
///
/// Each variant describes a specific problem with a flag registration. The
/// `Display` impl provides a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The parser was configured without any prefix characters.
    #[error("prefix_chars cannot be empty")]
    EmptyPrefixChars,
    /// A prefix character that can never introduce a flag.
    #[error("invalid prefix character: {0:?}")]
    InvalidPrefixChar(char),
    /// A registration with no names.
    #[error("flag must define at least one name")]
    MissingFlagName,
    /// A name without a leading prefix character.
    #[error("positional arguments are not supported: {0}")]
    PositionalNotSupported(String),
    /// A name that is too short or contains a reserved character.
    #[error("invalid flag name: {0:?}")]
    InvalidFlagName(String),
    /// A name already registered on this parser, or repeated in one call.
    #[error("conflicting option string: {0}")]
    DuplicateFlag(String),
    /// An explicit destination that is empty.
    #[error("destination cannot be empty for {0}")]
    EmptyDest(String),
    /// `nargs` given for an action that takes no values.
    #[error("nargs is not allowed with action {action:?} for {flag}")]
    NargsNotAllowed { flag: String, action: Action },
    /// `nargs` of zero for an action that stores values.
    #[error("nargs must be greater than zero for {0}")]
    ZeroNargs(String),
    /// Collect-until-next-known handed to a parser that cannot honour it.
    #[error("{0}: collect-until-next-known requires a CollectingArgumentParser")]
    CollectionUnsupported(String),
    /// Collect-until-next-known combined with a non-store action.
    #[error("{flag}: collect-until-next-known cannot be used with action {action:?}")]
    CollectionAction { flag: String, action: Action },
}

/// Validates a set of prefix characters.
///
/// Whitespace and NUL can never start a flag: whitespace never survives
/// shell splitting at the start of a word and NUL is reserved for
/// synthetic markers.
pub fn validate_prefix_chars(prefix_chars: &str) -> Result<(), RegistrationError> {
    if prefix_chars.is_empty() {
        return Err(RegistrationError::EmptyPrefixChars);
    }
    if let Some(bad) = prefix_chars.chars().find(|c| c.is_whitespace() || *c == '\0') {
        return Err(RegistrationError::InvalidPrefixChar(bad));
    }
    Ok(())
}

/// Validates one registration against the names already known to a parser.
///
/// Checks flag formats, duplicate names, and option combinations. The first
/// problem found is returned.
pub fn validate_registration(
    names: &[String],
    options: &ArgOptions,
    prefix_chars: &str,
    known: &HashSet<String>,
) -> Result<(), RegistrationError> {
    let Some(first) = names.first() else {
        return Err(RegistrationError::MissingFlagName);
    };

    let mut seen = HashSet::new();
    for name in names {
        validate_flag_name(name, prefix_chars)?;
        if known.contains(name) || !seen.insert(name.as_str()) {
            return Err(RegistrationError::DuplicateFlag(name.clone()));
        }
    }

    if let Some(dest) = &options.dest {
        if dest.trim().is_empty() {
            return Err(RegistrationError::EmptyDest(first.clone()));
        }
    }

    if let Some(nargs) = options.nargs {
        if nargs.is_collection() {
            return Err(RegistrationError::CollectionUnsupported(first.clone()));
        }
        if !options.action.takes_values() {
            return Err(RegistrationError::NargsNotAllowed {
                flag: first.clone(),
                action: options.action,
            });
        }
        if nargs == Nargs::Exactly(0) {
            return Err(RegistrationError::ZeroNargs(first.clone()));
        }
    }

    Ok(())
}

fn validate_flag_name(name: &str, prefix_chars: &str) -> Result<(), RegistrationError> {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if prefix_chars.contains(c) => {}
        _ => return Err(RegistrationError::PositionalNotSupported(name.to_string())),
    }

    let rest = chars.as_str();
    if rest.is_empty()
        || rest.chars().all(|c| prefix_chars.contains(c))
        || name.contains('=')
        || name.contains('\0')
        || name.chars().any(char::is_whitespace)
    {
        return Err(RegistrationError::InvalidFlagName(name.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_rejects_duplicate_against_known() {
        let known: HashSet<String> = ["--file".to_string()].into();
        let err = validate_registration(&names(&["-f", "--file"]), &ArgOptions::new(), "-", &known);
        assert_eq!(err, Err(RegistrationError::DuplicateFlag("--file".to_string())));
    }

    #[test]
    fn test_rejects_duplicate_within_call() {
        let err = validate_registration(
            &names(&["--file", "--file"]),
            &ArgOptions::new(),
            "-",
            &HashSet::new(),
        );
        assert_eq!(err, Err(RegistrationError::DuplicateFlag("--file".to_string())));
    }

    #[test]
    fn test_rejects_malformed_names() {
        for bad in ["-", "--", "--a=b", "--with space", "--nul\0"] {
            let err = validate_registration(&names(&[bad]), &ArgOptions::new(), "-", &HashSet::new());
            assert_eq!(err, Err(RegistrationError::InvalidFlagName(bad.to_string())), "{bad:?}");
        }
    }

    #[test]
    fn test_respects_custom_prefix_chars() {
        let ok = validate_registration(&names(&["+x", "++extra"]), &ArgOptions::new(), "+", &HashSet::new());
        assert!(ok.is_ok());

        let err = validate_registration(&names(&["--x"]), &ArgOptions::new(), "+", &HashSet::new());
        assert_eq!(err, Err(RegistrationError::PositionalNotSupported("--x".to_string())));
    }

    #[test]
    fn test_rejects_nargs_on_switch() {
        let opts = ArgOptions::switch().with_nargs(Nargs::Single);
        let err = validate_registration(&names(&["--v"]), &opts, "-", &HashSet::new());
        assert_eq!(
            err,
            Err(RegistrationError::NargsNotAllowed {
                flag: "--v".to_string(),
                action: Action::StoreTrue
            })
        );
    }

    #[test]
    fn test_rejects_collection_mode() {
        let err = validate_registration(
            &names(&["--rest"]),
            &ArgOptions::collect_until_next_known(),
            "-",
            &HashSet::new(),
        );
        assert_eq!(err, Err(RegistrationError::CollectionUnsupported("--rest".to_string())));
    }

    #[test]
    fn test_prefix_chars_validation() {
        assert_eq!(validate_prefix_chars(""), Err(RegistrationError::EmptyPrefixChars));
        assert_eq!(validate_prefix_chars("- "), Err(RegistrationError::InvalidPrefixChar(' ')));
        assert!(validate_prefix_chars("?-+_#").is_ok());
    }
}
