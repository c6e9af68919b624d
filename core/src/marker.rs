//! Synthetic marker tokens.
//!
//! A marker is inserted directly after every occurrence of a
//! collect-until-next-known flag before the token list reaches the underlying
//! parser. Markers must look like flags to that parser (so value consumption
//! stops at them and they land in the unknown list) while never being equal
//! to anything a user can register or type.
//!
//! A marker is spelled `{lead}{lead}{sigil}\0{flag}`:
//!
//! - `lead` is the first configured prefix character, which makes the marker
//!   flag-like;
//! - `sigil` is chosen by [`marker_sigil`] and is never a configured prefix
//!   character;
//! - the NUL separator cannot appear in a process argument and is refused in
//!   registered flag names.

/// Sigils tried in order when choosing a marker convention.
pub const MARKER_SIGILS: [char; 6] = ['?', '!', '~', '^', '%', '@'];

const MARKER_SEPARATOR: char = '\0';

/// Picks the marker sigil for a set of prefix characters.
///
/// Deterministic: the first of [`MARKER_SIGILS`] not used as a prefix
/// character, then the Unicode private use area. The result is never one of
/// `prefix_chars`.
///
/// # Examples
///
/// ```
/// use argpass::marker_sigil;
///
/// assert_eq!(marker_sigil("-"), '?');
/// assert_eq!(marker_sigil("?-+_#"), '!');
/// ```
pub fn marker_sigil(prefix_chars: &str) -> char {
    MARKER_SIGILS
        .into_iter()
        .chain('\u{E000}'..='\u{F8FF}')
        .find(|c| !prefix_chars.contains(*c))
        // NUL is never accepted as a prefix character.
        .unwrap_or(MARKER_SEPARATOR)
}

/// Marker spelling for one parser's prefix characters.
///
/// # Examples
///
/// ```
/// use argpass::MarkerConvention;
///
/// let markers = MarkerConvention::new("-");
/// let marker = markers.marker_for("--rest");
/// assert_eq!(marker, "--?\0--rest");
/// assert!(markers.is_marker(&marker));
/// assert!(!markers.is_marker("--rest"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerConvention {
    lead: char,
    sigil: char,
}

impl MarkerConvention {
    /// Derives the convention for `prefix_chars`.
    pub fn new(prefix_chars: &str) -> Self {
        Self {
            lead: prefix_chars.chars().next().unwrap_or('-'),
            sigil: marker_sigil(prefix_chars),
        }
    }

    /// The sigil in use.
    pub fn sigil(&self) -> char {
        self.sigil
    }

    /// Builds the marker inserted after `flag`.
    pub fn marker_for(&self, flag: &str) -> String {
        let mut marker = String::with_capacity(flag.len() + 8);
        marker.push(self.lead);
        marker.push(self.lead);
        marker.push(self.sigil);
        marker.push(MARKER_SEPARATOR);
        marker.push_str(flag);
        marker
    }

    /// Returns `true` if `token` is spelled like a marker of this convention.
    pub fn is_marker(&self, token: &str) -> bool {
        let mut chars = token.chars();
        chars.next() == Some(self.lead)
            && chars.next() == Some(self.lead)
            && chars.next() == Some(self.sigil)
            && chars.next() == Some(MARKER_SEPARATOR)
    }
}
