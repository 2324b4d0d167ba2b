#![forbid(unsafe_code)]

//! Semantic key identities and the capabilities derived from them.
//!
//! A [`KeyIdentity`] names what a key *means* (a character payload or a
//! special function), never where it sits on screen. Identities are
//! immutable per key instance and double as the lookup key for per-key
//! state such as tap cadence.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use unicode_segmentation::UnicodeSegmentation;

// ---------------------------------------------------------------------------
// KeyboardMode
// ---------------------------------------------------------------------------

/// The active key set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyboardMode {
    /// Letters (the initial mode of every session).
    #[default]
    Normal,
    /// Digits and punctuation.
    Symbols,
    /// Emoji grid.
    Emoji,
}

impl KeyboardMode {
    /// Stable lowercase tag used in key tags and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Symbols => "symbols",
            Self::Emoji => "emoji",
        }
    }
}

impl fmt::Display for KeyboardMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a mode or key tag cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseKeyError {
    tag: String,
}

impl fmt::Display for ParseKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized key tag `{}`", self.tag)
    }
}

impl std::error::Error for ParseKeyError {}

impl FromStr for KeyboardMode {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" | "abc" => Ok(Self::Normal),
            "symbols" | "123" => Ok(Self::Symbols),
            "emoji" => Ok(Self::Emoji),
            other => Err(ParseKeyError {
                tag: other.to_owned(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// KeyCaps
// ---------------------------------------------------------------------------

bitflags! {
    /// Interaction capabilities of a key.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyCaps: u8 {
        /// Holding past the long-press threshold starts an alternate interaction.
        const LONG_PRESS = 0b0000_0001;
        /// Slide events are routed to the cursor collaborator.
        const SLIDE      = 0b0000_0010;
        /// Taps participate in double-tap cadence.
        const DOUBLE_TAP = 0b0000_0100;
    }
}

// ---------------------------------------------------------------------------
// KeyIdentity
// ---------------------------------------------------------------------------

/// Semantic identifier of a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyIdentity {
    /// A character key carrying its text payload (usually one grapheme).
    Char(String),
    /// Shift / caps-lock key.
    Shift,
    /// Deletes backward.
    Backspace,
    /// The spacebar.
    Space,
    /// Editor action (newline or the field's action button).
    Enter,
    /// Switches to the target mode.
    ModeSwitch(KeyboardMode),
    /// An emoji key carrying its codepoint sequence.
    Emoji(String),
}

impl KeyIdentity {
    /// Character key from any string-like payload.
    #[must_use]
    pub fn char(text: impl Into<String>) -> Self {
        Self::Char(text.into())
    }

    /// Emoji key from any string-like payload.
    #[must_use]
    pub fn emoji(text: impl Into<String>) -> Self {
        Self::Emoji(text.into())
    }

    /// Capabilities implied by this identity.
    #[must_use]
    pub fn caps(&self) -> KeyCaps {
        match self {
            Self::Space => KeyCaps::LONG_PRESS | KeyCaps::SLIDE | KeyCaps::DOUBLE_TAP,
            Self::Shift => KeyCaps::DOUBLE_TAP,
            _ => KeyCaps::empty(),
        }
    }

    /// Whether this is a character key whose payload is a single letter.
    #[must_use]
    pub fn is_letter(&self) -> bool {
        matches!(self, Self::Char(text) if is_single_letter(text))
    }

    /// Parse a key tag: `shift`, `backspace`, `space`, `enter`,
    /// `mode:<target>`, `emoji:<codepoint>`, or a literal character payload.
    ///
    /// # Errors
    ///
    /// Returns [`ParseKeyError`] for an empty tag or an unknown mode target.
    pub fn from_tag(tag: &str) -> Result<Self, ParseKeyError> {
        if tag.is_empty() {
            return Err(ParseKeyError { tag: String::new() });
        }
        if let Some(target) = tag.strip_prefix("mode:") {
            return target.parse().map(Self::ModeSwitch);
        }
        if let Some(glyph) = tag.strip_prefix("emoji:")
            && !glyph.is_empty()
        {
            return Ok(Self::Emoji(glyph.to_owned()));
        }
        Ok(match tag {
            "shift" => Self::Shift,
            "backspace" => Self::Backspace,
            "space" => Self::Space,
            "enter" => Self::Enter,
            text => Self::Char(text.to_owned()),
        })
    }
}

impl fmt::Display for KeyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(text) => f.write_str(text),
            Self::Shift => f.write_str("shift"),
            Self::Backspace => f.write_str("backspace"),
            Self::Space => f.write_str("space"),
            Self::Enter => f.write_str("enter"),
            Self::ModeSwitch(mode) => write!(f, "mode:{mode}"),
            Self::Emoji(glyph) => write!(f, "emoji:{glyph}"),
        }
    }
}

/// Whether `text` is exactly one grapheme made only of alphabetic chars.
#[must_use]
pub fn is_single_letter(text: &str) -> bool {
    let mut graphemes = text.graphemes(true);
    match (graphemes.next(), graphemes.next()) {
        (Some(g), None) => g.chars().all(char::is_alphabetic),
        _ => false,
    }
}
