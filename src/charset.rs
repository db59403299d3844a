//! Character set detection for text read from the local filesystem.
//!
//! The locale's codeset is tried first, followed by UTF-8. Only codesets that
//! can be decoded without extra tables are recognised; anything else falls
//! through to UTF-8.

use std::env;

/// Character sets this crate can decode strictly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    Ascii,
    Latin1,
}

impl Charset {
    /// Map a codeset name such as `UTF-8`, `ISO-8859-1` or `ANSI_X3.4-1968`.
    pub fn from_codeset(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric())
            .map(|ch| ch.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "utf8" => Some(Self::Utf8),
            "ascii" | "usascii" | "ansix341968" | "646" => Some(Self::Ascii),
            "iso88591" | "latin1" | "l1" | "cp819" => Some(Self::Latin1),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Ascii => "ascii",
            Self::Latin1 => "iso-8859-1",
        }
    }

    /// Decode `bytes`, returning `None` on the first invalid sequence.
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => String::from_utf8(bytes.to_vec()).ok(),
            Self::Ascii => bytes
                .is_ascii()
                .then(|| bytes.iter().map(|&b| char::from(b)).collect()),
            Self::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }
}

/// Read the codeset component of the active locale (`LC_ALL`, `LC_CTYPE`, `LANG`).
pub fn locale_codeset() -> Option<String> {
    ["LC_ALL", "LC_CTYPE", "LANG"]
        .iter()
        .filter_map(|var| env::var(var).ok())
        .find(|value| !value.is_empty())
        .map(|value| codeset_of(&value))
}

fn codeset_of(locale: &str) -> String {
    let without_modifier = locale.split('@').next().unwrap_or(locale);
    match without_modifier.split_once('.') {
        Some((_, codeset)) => codeset.to_string(),
        // "C" and "POSIX" locales carry no codeset and mean ASCII
        None => "ANSI_X3.4-1968".to_string(),
    }
}

/// The ordered list of charsets to try: the locale's, then UTF-8.
pub fn candidate_charsets() -> Vec<Charset> {
    candidates_for(locale_codeset().as_deref())
}

fn candidates_for(codeset: Option<&str>) -> Vec<Charset> {
    let mut charsets = Vec::with_capacity(2);
    if let Some(charset) = codeset.and_then(Charset::from_codeset) {
        charsets.push(charset);
    }
    if charsets.first() != Some(&Charset::Utf8) {
        charsets.push(Charset::Utf8);
    }
    charsets
}

/// Decode with the first charset that accepts `bytes` strictly.
pub fn decode_with(bytes: &[u8], charsets: &[Charset]) -> Option<String> {
    charsets.iter().find_map(|charset| {
        let decoded = charset.decode(bytes);
        if decoded.is_some() {
            log::debug!("decoded {} bytes as {}", bytes.len(), charset.name());
        }
        decoded
    })
}
