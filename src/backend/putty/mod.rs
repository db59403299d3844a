//! PuTTY sessions stored in the Windows Registry.

mod reg_exe;

use serde::{Deserialize, Serialize};

use super::{BackendError, TerminalBackend};
use crate::color;
use crate::profile::{Profile, Value};

pub use reg_exe::{RegExe, is_available};

pub const PRIVATE_NAMESPACE: &str = "putty-win";

/// Relative to `HKEY_CURRENT_USER`.
pub const SESSIONS_KEY: &str = r"Software\SimonTatham\PuTTY\Sessions";
pub const DEFAULT_SESSION: &str = "Default Settings";

/// Registry value, profile key.
const COLOUR_KEYS: [(&str, &str); 22] = [
    ("Colour0", "fgcolor"),
    ("Colour1", "fgbold"),
    ("Colour2", "bgcolor"),
    ("Colour3", "bgbold"),
    ("Colour4", "fgcursor"),
    ("Colour5", "bgcursor"),
    ("Colour6", "color0"),
    ("Colour7", "color8"),
    ("Colour8", "color1"),
    ("Colour9", "color9"),
    ("Colour10", "color2"),
    ("Colour11", "color10"),
    ("Colour12", "color3"),
    ("Colour13", "color11"),
    ("Colour14", "color4"),
    ("Colour15", "color12"),
    ("Colour16", "color5"),
    ("Colour17", "color13"),
    ("Colour18", "color6"),
    ("Colour19", "color14"),
    ("Colour20", "color7"),
    ("Colour21", "color15"),
];

const FONT_KEY: (&str, &str) = ("Font", "font");

/// Written on every session so PuTTY uses the stored colours.
const FIXED_VALUES: [(&str, u32); 2] = [("UseSystemColours", 0), ("BoldAsColour", 1)];

/// A registry value as read from or written to a session key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum RegValue {
    #[serde(rename = "REG_SZ")]
    Sz(String),
    #[serde(rename = "REG_DWORD")]
    Dword(u32),
    /// Any other registry type, kept as `reg.exe` prints it.
    Other { kind: String, data: String },
}

/// Access to registry keys below `HKEY_CURRENT_USER`.
pub trait RegistryStore {
    /// Names of the direct subkeys of `path`.
    fn subkeys(&self, path: &str) -> Result<Vec<String>, BackendError>;

    fn key_exists(&self, path: &str) -> Result<bool, BackendError>;

    /// Values of `path`, or `None` when the key does not exist.
    fn values(&self, path: &str) -> Result<Option<Vec<(String, RegValue)>>, BackendError>;

    /// Set a value, creating the key if needed.
    fn set_value(&mut self, path: &str, name: &str, value: &RegValue) -> Result<(), BackendError>;
}

/// Encode a session name as PuTTY does for its registry key names.
pub fn munge_session_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (index, byte) in name.bytes().enumerate() {
        let escape = matches!(byte, b' ' | b'\\' | b'*' | b'?' | b'%')
            || !(b' '..=b'~').contains(&byte)
            || (byte == b'.' && index == 0);
        if escape {
            out.push_str(&format!("%{byte:02X}"));
        } else {
            out.push(char::from(byte));
        }
    }
    out
}

/// Reverse [`munge_session_name`].
pub fn unmunge_session_name(key: &str) -> String {
    let bytes = key.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        let decoded = (bytes[index] == b'%')
            .then(|| key.get(index + 1..index + 3))
            .flatten()
            .and_then(|hex| u8::from_str_radix(hex, 16).ok());
        match decoded {
            Some(byte) => {
                out.push(byte);
                index += 3;
            }
            None => {
                out.push(bytes[index]);
                index += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn session_path(name: &str) -> String {
    format!(r"{SESSIONS_KEY}\{}", munge_session_name(name))
}

fn profile_key_for(value_name: &str) -> Option<&'static str> {
    if value_name == FONT_KEY.0 {
        return Some(FONT_KEY.1);
    }
    COLOUR_KEYS
        .iter()
        .find(|(colour, _)| *colour == value_name)
        .map(|(_, key)| *key)
}

/// Sessions of a PuTTY installation.
pub struct PuttyBackend<R> {
    store: R,
}

impl<R: RegistryStore> PuttyBackend<R> {
    pub fn new(store: R) -> Self {
        Self { store }
    }

    pub fn into_store(self) -> R {
        self.store
    }
}

impl<R: RegistryStore> TerminalBackend for PuttyBackend<R> {
    fn id(&self) -> &'static str {
        PRIVATE_NAMESPACE
    }

    fn list_profile_names(&self) -> Result<Vec<String>, BackendError> {
        let mut names: Vec<String> = self
            .store
            .subkeys(SESSIONS_KEY)?
            .iter()
            .map(|key| unmunge_session_name(key))
            .collect();
        names.sort();
        Ok(names)
    }

    fn profile_exists(&self, name: &str) -> Result<bool, BackendError> {
        self.store.key_exists(&session_path(name))
    }

    fn read_profile(&self, name: Option<&str>) -> Result<Profile, BackendError> {
        let name = name.unwrap_or(DEFAULT_SESSION);
        let mut profile = Profile::new(name);

        let Some(values) = self.store.values(&session_path(name))? else {
            if name == DEFAULT_SESSION {
                log::debug!("no '{DEFAULT_SESSION}' session stored; using an empty profile");
                return Ok(profile);
            }
            return Err(BackendError::ProfileNotFound(name.to_string()));
        };

        for (value_name, value) in values {
            match (profile_key_for(&value_name), value) {
                (Some(key), RegValue::Sz(text)) if key == FONT_KEY.1 => {
                    profile.set(key, text)?;
                }
                (Some(key), RegValue::Sz(text)) => {
                    profile.set(key, color::parse_decimal(&text)?)?;
                }
                (Some(key), other) => {
                    return Err(BackendError::InvalidData(format!(
                        "{value_name} ({key}) should be a string, found {other:?}"
                    )));
                }
                (None, other) => {
                    let json = serde_json::to_value(&other)?;
                    profile.private_data(PRIVATE_NAMESPACE).insert(value_name, json);
                }
            }
        }

        Ok(profile)
    }

    fn write_profile(&mut self, profile: &Profile) -> Result<(), BackendError> {
        let path = session_path(profile.name());
        log::info!("writing PuTTY session '{}' to HKCU\\{path}", profile.name());

        if let Some(private) = profile.private_data_ref(PRIVATE_NAMESPACE) {
            for (value_name, json) in private {
                let value: RegValue = serde_json::from_value(json.clone())?;
                self.store.set_value(&path, value_name, &value)?;
            }
        }

        for (value_name, key) in COLOUR_KEYS {
            let Some(value) = profile.get(key)? else {
                continue;
            };
            let colour = value.as_color().ok_or_else(|| {
                BackendError::InvalidData(format!("{key} is a {}, not a color", value.type_name()))
            })?;
            self.store
                .set_value(&path, value_name, &RegValue::Sz(color::to_decimal(colour)))?;
        }

        if let Some(font) = profile.get(FONT_KEY.1)?.and_then(Value::as_text) {
            self.store
                .set_value(&path, FONT_KEY.0, &RegValue::Sz(font.to_string()))?;
        }

        for (value_name, data) in FIXED_VALUES {
            self.store.set_value(&path, value_name, &RegValue::Dword(data))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::color::Color;

    /// In-memory registry: key path to ordered values.
    #[derive(Default)]
    struct MemoryRegistry {
        keys: BTreeMap<String, Vec<(String, RegValue)>>,
    }

    impl MemoryRegistry {
        fn value(&self, path: &str, name: &str) -> Option<&RegValue> {
            self.keys
                .get(path)?
                .iter()
                .find(|(candidate, _)| candidate == name)
                .map(|(_, value)| value)
        }
    }

    impl RegistryStore for MemoryRegistry {
        fn subkeys(&self, path: &str) -> Result<Vec<String>, BackendError> {
            let prefix = format!(r"{path}\");
            Ok(self
                .keys
                .keys()
                .filter_map(|key| key.strip_prefix(&prefix))
                .filter(|rest| !rest.contains('\\'))
                .map(str::to_string)
                .collect())
        }

        fn key_exists(&self, path: &str) -> Result<bool, BackendError> {
            Ok(self.keys.contains_key(path))
        }

        fn values(&self, path: &str) -> Result<Option<Vec<(String, RegValue)>>, BackendError> {
            Ok(self.keys.get(path).cloned())
        }

        fn set_value(&mut self, path: &str, name: &str, value: &RegValue) -> Result<(), BackendError> {
            let values = self.keys.entry(path.to_string()).or_default();
            match values.iter_mut().find(|(candidate, _)| candidate == name) {
                Some((_, slot)) => *slot = value.clone(),
                None => values.push((name.to_string(), value.clone())),
            }
            Ok(())
        }
    }

    fn seeded() -> MemoryRegistry {
        let mut registry = MemoryRegistry::default();
        let path = session_path("My Server");
        registry.set_value(&path, "HostName", &RegValue::Sz("example.org".into())).expect("set");
        registry.set_value(&path, "Colour0", &RegValue::Sz("187,187,187".into())).expect("set");
        registry.set_value(&path, "Colour6", &RegValue::Sz("0,0,0".into())).expect("set");
        registry.set_value(&path, "Colour7", &RegValue::Sz("85,85,85".into())).expect("set");
        registry.set_value(&path, "Font", &RegValue::Sz("Consolas".into())).expect("set");
        registry.set_value(&path, "PortNumber", &RegValue::Dword(22)).expect("set");
        registry
    }

    #[test]
    fn session_names_are_munged_like_putty() {
        assert_eq!(munge_session_name("My Server"), "My%20Server");
        assert_eq!(munge_session_name(".hidden.name"), "%2Ehidden.name");
        assert_eq!(munge_session_name(r"a\b*c?d%e"), "a%5Cb%2Ac%3Fd%25e");
        assert_eq!(munge_session_name("café"), "caf%C3%A9");
        assert_eq!(unmunge_session_name("caf%C3%A9"), "café");
        assert_eq!(unmunge_session_name("Default%20Settings"), DEFAULT_SESSION);
        assert_eq!(unmunge_session_name("100%"), "100%");
    }

    #[test]
    fn sessions_are_listed_unmunged() {
        let backend = PuttyBackend::new(seeded());
        assert_eq!(backend.list_profile_names().expect("lists"), ["My Server"]);
        assert!(backend.profile_exists("My Server").expect("checks"));
        assert!(!backend.profile_exists("Other").expect("checks"));
    }

    #[test]
    fn colours_map_to_profile_keys() {
        let backend = PuttyBackend::new(seeded());
        let profile = backend.read_profile(Some("My Server")).expect("reads");

        assert_eq!(
            profile.get("fgcolor").expect("valid").and_then(Value::as_color),
            Some(Color::from_bytes([187, 187, 187]))
        );
        assert_eq!(
            profile.get("color8").expect("valid").and_then(Value::as_color),
            Some(Color::from_bytes([85, 85, 85]))
        );
        assert_eq!(
            profile.get("font").expect("valid").and_then(Value::as_text),
            Some("Consolas")
        );

        let private = profile.private_data_ref(PRIVATE_NAMESPACE).expect("private data");
        assert_eq!(private.len(), 2);
        assert!(private.contains_key("HostName"));
    }

    #[test]
    fn missing_default_session_reads_empty() {
        let backend = PuttyBackend::new(MemoryRegistry::default());
        let profile = backend.read_profile(None).expect("reads");
        assert_eq!(profile.name(), DEFAULT_SESSION);
        assert!(profile.is_empty());

        assert!(matches!(
            backend.read_profile(Some("Gone")),
            Err(BackendError::ProfileNotFound(name)) if name == "Gone"
        ));
    }

    #[test]
    fn import_over_session_keeps_connection_settings() {
        let mut backend = PuttyBackend::new(seeded());
        let mut base = backend.read_profile(Some("My Server")).expect("reads");

        let mut theme = Profile::new("My Server");
        theme.set("fgcolor", Color::from_bytes([1, 2, 3])).expect("valid");
        theme.set("color15", Color::new(0xffff, 0xffff, 0xffff)).expect("valid");
        base.update(&theme);
        backend.write_profile(&base).expect("writes");

        let registry = backend.into_store();
        let path = session_path("My Server");
        assert_eq!(registry.value(&path, "HostName"), Some(&RegValue::Sz("example.org".into())));
        assert_eq!(registry.value(&path, "PortNumber"), Some(&RegValue::Dword(22)));
        assert_eq!(registry.value(&path, "Colour0"), Some(&RegValue::Sz("1,2,3".into())));
        assert_eq!(registry.value(&path, "Colour21"), Some(&RegValue::Sz("255,255,255".into())));
        assert_eq!(registry.value(&path, "UseSystemColours"), Some(&RegValue::Dword(0)));
        assert_eq!(registry.value(&path, "BoldAsColour"), Some(&RegValue::Dword(1)));
    }

    #[test]
    fn non_string_colour_is_invalid() {
        let mut registry = seeded();
        registry
            .set_value(&session_path("My Server"), "Colour2", &RegValue::Dword(5))
            .expect("set");
        let backend = PuttyBackend::new(registry);
        assert!(matches!(
            backend.read_profile(Some("My Server")),
            Err(BackendError::InvalidData(_))
        ));
    }
}
