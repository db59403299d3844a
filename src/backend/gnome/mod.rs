//! gnome-terminal profiles stored in GConf.

mod gconftool;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{BackendError, TerminalBackend};
use crate::color::{self, Color};
use crate::profile::{Profile, Value};
use crate::schema;

pub use gconftool::{GconfTool, is_available};

pub const PRIVATE_NAMESPACE: &str = "gnome-terminal";

const APP_ROOT: &str = "/apps/gnome-terminal";
const DEFAULT_PROFILE_KEY: &str = "/apps/gnome-terminal/global/default_profile";
const PROFILE_LIST_KEY: &str = "/apps/gnome-terminal/global/profile_list";
const PROFILES_DIR: &str = "/apps/gnome-terminal/profiles";
const NAME_KEY: &str = "visible_name";
const PALETTE_KEY: &str = "palette";
const PALETTE_SIZE: usize = 16;
const NEW_PROFILE_PREFIX: &str = "Profile";

/// GConf key, profile key.
const THEME_KEYS: [(&str, &str); 8] = [
    ("allow_bold", "allow_bold"),
    ("background_color", "bgcolor"),
    ("bold_color", "fgbold"),
    ("bold_color_same_as_fg", "use_fgbold"),
    ("cursor_shape", "cursor_shape"),
    ("font", "font"),
    ("foreground_color", "fgcolor"),
    ("use_system_font", "force_font"),
];

/// Profile keys whose GConf boolean has the opposite meaning.
const REVERSED_BOOLS: [&str; 2] = ["force_font", "use_fgbold"];

/// Written on every profile so gnome-terminal honours the stored colors.
const FIXED_SETTINGS: [(&str, bool); 1] = [("use_theme_colors", false)];

/// A typed GConf value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum GconfValue {
    String(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    List(Vec<GconfValue>),
    Pair(Box<GconfValue>, Box<GconfValue>),
}

impl GconfValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            GconfValue::String(text) => Some(text),
            _ => None,
        }
    }
}

/// Access to a GConf tree. Keys are absolute paths.
pub trait GconfStore {
    fn get_string(&self, key: &str) -> Result<Option<String>, BackendError>;

    fn get_string_list(&self, key: &str) -> Result<Vec<String>, BackendError>;

    fn dir_exists(&self, dir: &str) -> Result<bool, BackendError>;

    /// Entries directly under `dir`, keyed by their name relative to `dir`.
    fn all_entries(&self, dir: &str) -> Result<Vec<(String, GconfValue)>, BackendError>;

    fn set(&mut self, key: &str, value: &GconfValue) -> Result<(), BackendError>;

    fn set_string_list(&mut self, key: &str, values: &[String]) -> Result<(), BackendError> {
        let list = values.iter().cloned().map(GconfValue::String).collect();
        self.set(key, &GconfValue::List(list))
    }
}

fn theme_key_for(gconf_key: &str) -> Option<&'static str> {
    THEME_KEYS
        .iter()
        .find(|(gconf, _)| *gconf == gconf_key)
        .map(|(_, profile)| *profile)
}

fn is_reversed(profile_key: &str) -> bool {
    REVERSED_BOOLS.contains(&profile_key)
}

fn parse_palette(text: &str) -> Result<Vec<Color>, BackendError> {
    let colors = text
        .split(':')
        .map(color::parse_hex_auto)
        .collect::<Result<Vec<_>, _>>()?;
    if colors.len() < PALETTE_SIZE {
        return Err(BackendError::InvalidData(format!(
            "palette has {} colors, expected {PALETTE_SIZE}",
            colors.len()
        )));
    }
    Ok(colors)
}

fn theme_value(profile_key: &str, raw: &GconfValue) -> Result<Value, BackendError> {
    let is_color = schema::newest()
        .schema
        .kind_of(profile_key)
        .is_some_and(|kind| kind.is_color());
    match raw {
        GconfValue::String(text) if is_color => Ok(color::parse_hex_auto(text)?.into()),
        GconfValue::String(text) => Ok(Value::Text(text.clone())),
        GconfValue::Bool(flag) => Ok(Value::Bool(*flag != is_reversed(profile_key))),
        other => Err(BackendError::InvalidData(format!(
            "unexpected value for {profile_key}: {other:?}"
        ))),
    }
}

fn gconf_value(profile_key: &str, value: &Value) -> GconfValue {
    match value {
        Value::Color(color) => GconfValue::String(color::to_high(*color)),
        Value::Text(text) => GconfValue::String(text.clone()),
        Value::Bool(flag) => GconfValue::Bool(*flag != is_reversed(profile_key)),
    }
}

/// Profiles of a gnome-terminal installation.
pub struct GnomeTerminalBackend<S> {
    store: S,
    /// Visible name to profile directory (absolute).
    dirs: BTreeMap<String, String>,
    dir_names: Vec<String>,
    next_number: u32,
}

impl<S: GconfStore> GnomeTerminalBackend<S> {
    /// Load the profile list from `store`.
    pub fn new(store: S) -> Result<Self, BackendError> {
        let dir_names = store.get_string_list(PROFILE_LIST_KEY)?;
        let mut dirs = BTreeMap::new();
        let mut next_number = 0;

        for dir_name in &dir_names {
            let dir = format!("{PROFILES_DIR}/{dir_name}");
            match store.get_string(&format!("{dir}/{NAME_KEY}"))? {
                Some(name) => {
                    dirs.insert(name, dir);
                }
                None => log::warn!("profile directory {dir} has no {NAME_KEY}"),
            }

            let number = dir_name
                .strip_prefix(NEW_PROFILE_PREFIX)
                .and_then(|suffix| suffix.parse::<u32>().ok());
            if let Some(number) = number {
                next_number = next_number.max(number + 1);
            }
        }

        log::debug!("found {} gnome-terminal profiles under {APP_ROOT}", dirs.len());
        Ok(Self {
            store,
            dirs,
            dir_names,
            next_number,
        })
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn default_name(&self) -> Result<String, BackendError> {
        let dir_name = self
            .store
            .get_string(DEFAULT_PROFILE_KEY)?
            .ok_or_else(|| BackendError::Store(format!("{DEFAULT_PROFILE_KEY} is not set")))?;
        let dir = format!("{PROFILES_DIR}/{dir_name}");
        self.dirs
            .iter()
            .find(|(_, candidate)| **candidate == dir)
            .map(|(name, _)| name.clone())
            .ok_or(BackendError::ProfileNotFound(dir_name))
    }

    fn allocate_dir(&mut self) -> Result<(String, String), BackendError> {
        loop {
            let dir_name = format!("{NEW_PROFILE_PREFIX}{}", self.next_number);
            self.next_number += 1;
            let dir = format!("{PROFILES_DIR}/{dir_name}");
            if !self.store.dir_exists(&dir)? {
                return Ok((dir_name, dir));
            }
        }
    }
}

impl<S: GconfStore> TerminalBackend for GnomeTerminalBackend<S> {
    fn id(&self) -> &'static str {
        PRIVATE_NAMESPACE
    }

    fn list_profile_names(&self) -> Result<Vec<String>, BackendError> {
        Ok(self.dirs.keys().cloned().collect())
    }

    fn profile_exists(&self, name: &str) -> Result<bool, BackendError> {
        Ok(self.dirs.contains_key(name))
    }

    fn read_profile(&self, name: Option<&str>) -> Result<Profile, BackendError> {
        let name = match name {
            Some(name) => name.to_string(),
            None => self.default_name()?,
        };
        let dir = self
            .dirs
            .get(&name)
            .ok_or_else(|| BackendError::ProfileNotFound(name.clone()))?;

        let mut profile = Profile::new(name.as_str());
        for (key, raw) in self.store.all_entries(dir)? {
            if let Some(profile_key) = theme_key_for(&key) {
                profile.set(profile_key, theme_value(profile_key, &raw)?)?;
            } else {
                let json = serde_json::to_value(&raw)?;
                profile.private_data(PRIVATE_NAMESPACE).insert(key, json);
            }
        }

        let palette = profile
            .private_data(PRIVATE_NAMESPACE)
            .remove(PALETTE_KEY)
            .map(serde_json::from_value::<GconfValue>)
            .transpose()?;
        match palette {
            Some(GconfValue::String(text)) => {
                for (index, color) in parse_palette(&text)?.into_iter().take(PALETTE_SIZE).enumerate() {
                    profile.set(&format!("color{index}"), color)?;
                }
            }
            Some(other) => {
                return Err(BackendError::InvalidData(format!("unexpected palette: {other:?}")));
            }
            None => log::warn!("profile '{name}' has no palette"),
        }

        Ok(profile)
    }

    fn write_profile(&mut self, profile: &Profile) -> Result<(), BackendError> {
        let mut palette = Vec::with_capacity(PALETTE_SIZE);
        for index in 0..PALETTE_SIZE {
            let key = format!("color{index}");
            let color = profile
                .get(&key)?
                .and_then(Value::as_color)
                .ok_or_else(|| BackendError::InvalidData(format!("profile has no {key}")))?;
            palette.push(color::to_high(color));
        }

        let (dir, new_dir_name) = match self.dirs.get(profile.name()) {
            Some(dir) => (dir.clone(), None),
            None => {
                let (dir_name, dir) = self.allocate_dir()?;
                (dir, Some(dir_name))
            }
        };
        log::info!("writing gnome-terminal profile '{}' to {dir}", profile.name());

        if let Some(private) = profile.private_data_ref(PRIVATE_NAMESPACE) {
            for (key, json) in private {
                let value: GconfValue = serde_json::from_value(json.clone())?;
                self.store.set(&format!("{dir}/{key}"), &value)?;
            }
        }

        for (gconf_key, profile_key) in THEME_KEYS {
            if let Some(value) = profile.get(profile_key)? {
                self.store
                    .set(&format!("{dir}/{gconf_key}"), &gconf_value(profile_key, value))?;
            }
        }

        for (key, flag) in FIXED_SETTINGS {
            self.store.set(&format!("{dir}/{key}"), &GconfValue::Bool(flag))?;
        }

        self.store.set(
            &format!("{dir}/{PALETTE_KEY}"),
            &GconfValue::String(palette.join(":")),
        )?;
        self.store.set(
            &format!("{dir}/{NAME_KEY}"),
            &GconfValue::String(profile.name().to_string()),
        )?;

        if let Some(dir_name) = new_dir_name {
            self.dir_names.push(dir_name);
            self.store.set_string_list(PROFILE_LIST_KEY, &self.dir_names)?;
            self.dirs.insert(profile.name().to_string(), dir);
        }
        Ok(())
    }
}
