//! Per-version key tables for the theme file format.
//!
//! A [`VersionSchema`] says which keys a format revision knows, how each value
//! is parsed from and rendered to text, and which keys are read-only for that
//! revision. Schemas are assembled with a [`SchemaBuilder`]; a newer revision
//! starts from a clone of its predecessor's builder and layers its own
//! declarations on top, later declarations replacing earlier ones.

mod registry;

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::color::{self, ColorError};
use crate::profile::Value;

pub use registry::{SECTION_PREFIX, SchemaVersion, has_version, newest, section_name, version, versions};

/// Errors raised while translating between profile values and file text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("key '{0}' is not part of this theme format")]
    UnknownKey(String),

    #[error("invalid color for '{key}': {source}")]
    Color {
        key: String,
        #[source]
        source: ColorError,
    },

    #[error("invalid boolean for '{key}': '{value}'")]
    Boolean { key: String, value: String },

    #[error("'{key}' expects a {expected} value, found {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// How a key's value is represented in a theme file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// `#rrggbb`; either hex depth is accepted on read.
    ColorLow,
    /// `#rrrrggggbbbb`; either hex depth is accepted on read.
    ColorHigh,
    /// Pre-1.2 text, copied through untouched.
    LegacyText,
    /// UTF-8 text.
    Text,
    /// `True` / `False`.
    Boolean,
}

impl ValueKind {
    pub fn is_color(self) -> bool {
        matches!(self, Self::ColorLow | Self::ColorHigh)
    }

    fn expected(self) -> &'static str {
        match self {
            Self::ColorLow | Self::ColorHigh => "color",
            Self::LegacyText | Self::Text => "text",
            Self::Boolean => "boolean",
        }
    }

    fn parse(self, key: &str, text: &str) -> Result<Value, SchemaError> {
        match self {
            Self::ColorLow | Self::ColorHigh => color::parse_hex_auto(text)
                .map(Value::Color)
                .map_err(|source| SchemaError::Color {
                    key: key.to_string(),
                    source,
                }),
            Self::LegacyText | Self::Text => Ok(Value::Text(text.to_string())),
            Self::Boolean => match text.chars().next() {
                Some(first) => Ok(Value::Bool(first.eq_ignore_ascii_case(&'t'))),
                None => Err(SchemaError::Boolean {
                    key: key.to_string(),
                    value: text.to_string(),
                }),
            },
        }
    }

    fn marshal(self, key: &str, value: &Value) -> Result<String, SchemaError> {
        match (self, value) {
            (Self::ColorLow, Value::Color(c)) => Ok(color::to_low(*c)),
            (Self::ColorHigh, Value::Color(c)) => Ok(color::to_high(*c)),
            (Self::LegacyText | Self::Text, Value::Text(text)) => Ok(text.clone()),
            (Self::Boolean, Value::Bool(flag)) => {
                Ok(String::from(if *flag { "True" } else { "False" }))
            }
            (kind, other) => Err(SchemaError::TypeMismatch {
                key: key.to_string(),
                expected: kind.expected(),
                found: other.type_name(),
            }),
        }
    }

    fn comment(self, value: &Value) -> Option<String> {
        match (self.is_color(), value) {
            (true, Value::Color(c)) => Some(color::to_decimal(*c)),
            _ => None,
        }
    }
}

/// Accumulates declarations for one format revision.
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    keys: BTreeMap<String, ValueKind>,
    readonly: BTreeSet<String>,
    files: BTreeMap<String, String>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn add<I, S>(mut self, keys: I, kind: ValueKind) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for key in keys {
            self.keys.insert(key.into(), kind);
        }
        self
    }

    pub fn add_color_low<I, S>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add(keys, ValueKind::ColorLow)
    }

    pub fn add_color_high<I, S>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add(keys, ValueKind::ColorHigh)
    }

    pub fn add_legacy_text<I, S>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add(keys, ValueKind::LegacyText)
    }

    pub fn add_text<I, S>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add(keys, ValueKind::Text)
    }

    pub fn add_boolean<I, S>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add(keys, ValueKind::Boolean)
    }

    /// Promote every low depth color key to high depth.
    pub fn upgrade_color_depth(mut self) -> Self {
        for kind in self.keys.values_mut() {
            if *kind == ValueKind::ColorLow {
                *kind = ValueKind::ColorHigh;
            }
        }
        self
    }

    /// Keys that may be read but are never written for this revision.
    pub fn set_readonly<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.readonly.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Declare auxiliary archive entries, e.g. `credits` -> `credits.txt`.
    pub fn add_archive_files<I, K, V>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.files
            .extend(files.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn build(self) -> VersionSchema {
        VersionSchema {
            keys: self.keys,
            readonly: self.readonly,
            files: self.files,
        }
    }
}

/// An immutable key table for one format revision.
#[derive(Debug, Clone)]
pub struct VersionSchema {
    keys: BTreeMap<String, ValueKind>,
    readonly: BTreeSet<String>,
    files: BTreeMap<String, String>,
}

impl VersionSchema {
    pub fn has_key(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    /// Known and not read-only.
    pub fn is_writable(&self, key: &str) -> bool {
        self.has_key(key) && !self.readonly.contains(key)
    }

    pub fn kind_of(&self, key: &str) -> Option<ValueKind> {
        self.keys.get(key).copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = (&str, ValueKind)> + '_ {
        self.keys.iter().map(|(key, kind)| (key.as_str(), *kind))
    }

    fn require(&self, key: &str) -> Result<ValueKind, SchemaError> {
        self.kind_of(key)
            .ok_or_else(|| SchemaError::UnknownKey(key.to_string()))
    }

    pub fn parse_value(&self, key: &str, text: &str) -> Result<Value, SchemaError> {
        self.require(key)?.parse(key, text)
    }

    pub fn marshal_value(&self, key: &str, value: &Value) -> Result<String, SchemaError> {
        self.require(key)?.marshal(key, value)
    }

    /// Human-readable annotation for a value; only colors have one.
    pub fn comment_for(&self, key: &str, value: &Value) -> Option<String> {
        self.kind_of(key)?.comment(value)
    }

    pub fn has_archive_file(&self, file_key: &str) -> bool {
        self.files.contains_key(file_key)
    }

    pub fn archive_file(&self, file_key: &str) -> Option<&str> {
        self.files.get(file_key).map(String::as_str)
    }
}
