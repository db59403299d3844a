//! The backend-neutral terminal theme.
//!
//! A [`Profile`] holds a fixed set of theme keys plus a private namespace per
//! backend. The private namespace carries every backend setting that is not
//! part of the portable theme so that writing a profile back does not reset
//! those settings to their defaults.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::color::Color;

/// Every key a profile accepts, in sorted order.
pub const PROFILE_KEYS: [&str; 27] = [
    "allow_bold",
    "bgbold",
    "bgcolor",
    "bgcursor",
    "color0",
    "color1",
    "color10",
    "color11",
    "color12",
    "color13",
    "color14",
    "color15",
    "color2",
    "color3",
    "color4",
    "color5",
    "color6",
    "color7",
    "color8",
    "color9",
    "cursor_shape",
    "fgbold",
    "fgcolor",
    "fgcursor",
    "font",
    "force_font",
    "use_fgbold",
];

/// Opaque per-backend settings.
pub type PrivateData = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error("key '{0}' is not a valid profile key")]
    InvalidKey(String),
}

/// A typed theme value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Color(Color),
    Text(String),
    Bool(bool),
}

impl Value {
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(color) => Some(*color),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Short name of the variant, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Color(_) => "color",
            Self::Text(_) => "text",
            Self::Bool(_) => "boolean",
        }
    }
}

impl From<Color> for Value {
    fn from(color: Color) -> Self {
        Self::Color(color)
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Self::Bool(flag)
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Look up the canonical static name of a valid key.
fn canonical_key(key: &str) -> Option<&'static str> {
    PROFILE_KEYS
        .binary_search_by(|probe| (*probe).cmp(key))
        .ok()
        .map(|index| PROFILE_KEYS[index])
}

/// One terminal theme.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    name: String,
    values: BTreeMap<&'static str, Value>,
    private: BTreeMap<String, PrivateData>,
}

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Returns `true` if `key` belongs to the fixed theme key set.
    pub fn is_valid_key(key: &str) -> bool {
        canonical_key(key).is_some()
    }

    fn validate(key: &str) -> Result<&'static str, ProfileError> {
        canonical_key(key).ok_or_else(|| ProfileError::InvalidKey(key.to_string()))
    }

    pub fn get(&self, key: &str) -> Result<Option<&Value>, ProfileError> {
        let key = Self::validate(key)?;
        Ok(self.values.get(key))
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<(), ProfileError> {
        let key = Self::validate(key)?;
        self.values.insert(key, value.into());
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Result<Option<Value>, ProfileError> {
        let key = Self::validate(key)?;
        Ok(self.values.remove(key))
    }

    /// Whether a value is present. Unknown keys are simply absent.
    pub fn contains_key(&self, key: &str) -> bool {
        canonical_key(key).is_some_and(|key| self.values.contains_key(key))
    }

    /// Theme values in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> + '_ {
        self.values.iter().map(|(key, value)| (*key, value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Mutable access to a backend's private settings, created on first use.
    pub fn private_data(&mut self, backend: &str) -> &mut PrivateData {
        self.private.entry(backend.to_string()).or_default()
    }

    /// Read-only access to a backend's private settings, if any were recorded.
    pub fn private_data_ref(&self, backend: &str) -> Option<&PrivateData> {
        self.private.get(backend)
    }

    /// Names of every backend with a private namespace.
    pub fn private_backends(&self) -> impl Iterator<Item = &str> + '_ {
        self.private.keys().map(String::as_str)
    }

    /// Copy `other`'s theme values and private settings into this profile.
    ///
    /// Values from `other` win. Private settings are merged per backend, so
    /// settings only this profile knows about survive.
    pub fn update(&mut self, other: &Profile) {
        for (backend, data) in &other.private {
            match self.private.get_mut(backend) {
                Some(existing) => {
                    existing.extend(data.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
                None => {
                    self.private.insert(backend.clone(), data.clone());
                }
            }
        }
        self.values
            .extend(other.values.iter().map(|(k, v)| (*k, v.clone())));
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Profile {}>", self.name)
    }
}
