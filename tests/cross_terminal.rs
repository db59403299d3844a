use std::collections::BTreeMap;

use tempfile::tempdir;
use termitheme::backend::gnome::{GconfStore, GconfValue, GnomeTerminalBackend};
use termitheme::backend::putty::{PuttyBackend, RegValue, RegistryStore};
use termitheme::{BackendError, Color, TerminalBackend, ThemeFile, Value};

#[derive(Default)]
struct Gconf(BTreeMap<String, GconfValue>);

impl GconfStore for Gconf {
    fn get_string(&self, key: &str) -> Result<Option<String>, BackendError> {
        Ok(self.0.get(key).and_then(GconfValue::as_str).map(str::to_string))
    }

    fn get_string_list(&self, key: &str) -> Result<Vec<String>, BackendError> {
        Ok(match self.0.get(key) {
            Some(GconfValue::List(items)) => items
                .iter()
                .filter_map(GconfValue::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        })
    }

    fn dir_exists(&self, dir: &str) -> Result<bool, BackendError> {
        let prefix = format!("{dir}/");
        Ok(self.0.keys().any(|key| key.starts_with(&prefix)))
    }

    fn all_entries(&self, dir: &str) -> Result<Vec<(String, GconfValue)>, BackendError> {
        let prefix = format!("{dir}/");
        Ok(self
            .0
            .iter()
            .filter_map(|(key, value)| Some((key.strip_prefix(&prefix)?.to_string(), value.clone())))
            .filter(|(name, _)| !name.contains('/'))
            .collect())
    }

    fn set(&mut self, key: &str, value: &GconfValue) -> Result<(), BackendError> {
        self.0.insert(key.to_string(), value.clone());
        Ok(())
    }
}

#[derive(Default)]
struct Registry(BTreeMap<String, BTreeMap<String, RegValue>>);

impl RegistryStore for Registry {
    fn subkeys(&self, path: &str) -> Result<Vec<String>, BackendError> {
        let prefix = format!("{path}\\");
        Ok(self
            .0
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix))
            .map(str::to_string)
            .collect())
    }

    fn key_exists(&self, path: &str) -> Result<bool, BackendError> {
        Ok(self.0.contains_key(path))
    }

    fn values(&self, path: &str) -> Result<Option<Vec<(String, RegValue)>>, BackendError> {
        Ok(self.0.get(path).map(|values| {
            values
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect()
        }))
    }

    fn set_value(&mut self, path: &str, name: &str, value: &RegValue) -> Result<(), BackendError> {
        self.0
            .entry(path.to_string())
            .or_default()
            .insert(name.to_string(), value.clone());
        Ok(())
    }
}

fn gnome_with_solarized() -> Gconf {
    let root = "/apps/gnome-terminal";
    let dir = format!("{root}/profiles/Default");
    let palette = (0..16u16)
        .map(|index| format!("#{:04x}{:04x}{:04x}", index * 0x1111, 0x2b2b, 0x3636))
        .collect::<Vec<_>>()
        .join(":");

    let mut store = Gconf::default();
    store.0.insert(
        format!("{root}/global/profile_list"),
        GconfValue::List(vec![GconfValue::String("Default".into())]),
    );
    store.0.insert(
        format!("{root}/global/default_profile"),
        GconfValue::String("Default".into()),
    );
    for (key, value) in [
        ("visible_name", GconfValue::String("Solarized".into())),
        ("foreground_color", GconfValue::String("#838394949696".into())),
        ("background_color", GconfValue::String("#00002b2b3636".into())),
        ("font", GconfValue::String("DejaVu Sans Mono 10".into())),
        ("palette", GconfValue::String(palette)),
        ("login_shell", GconfValue::Bool(true)),
    ] {
        store.0.insert(format!("{dir}/{key}"), value);
    }
    store
}

#[test]
fn gnome_profile_becomes_a_putty_session() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("solarized.zip");

    let gnome = GnomeTerminalBackend::new(gnome_with_solarized()).expect("loads");
    let exported = gnome.read_profile(None).expect("default profile");
    assert_eq!(exported.name(), "Solarized");
    ThemeFile::new(&path).write(&exported).expect("writes");

    let theme = ThemeFile::new(&path).read().expect("reads");
    assert!(theme.private_backends().next().is_none());

    let mut putty = PuttyBackend::new(Registry::default());
    let mut session = putty.read_profile(None).expect("empty default");
    session.update(&theme);
    session.set_name(theme.name());
    putty.write_profile(&session).expect("writes");
    assert!(putty.profile_exists("Solarized").expect("checks"));

    let registry = putty.into_store();
    let values = registry
        .0
        .get(r"Software\SimonTatham\PuTTY\Sessions\Solarized")
        .expect("session key");
    assert_eq!(values.get("Colour0"), Some(&RegValue::Sz("131,148,150".into())));
    assert_eq!(values.get("Colour2"), Some(&RegValue::Sz("0,43,54".into())));
    assert_eq!(values.get("Font"), Some(&RegValue::Sz("DejaVu Sans Mono 10".into())));
    assert_eq!(values.get("UseSystemColours"), Some(&RegValue::Dword(0)));
    assert!(!values.contains_key("login_shell"));
}

#[test]
fn theme_imports_into_a_new_gnome_profile() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("copy.zip");

    let mut gnome = GnomeTerminalBackend::new(gnome_with_solarized()).expect("loads");
    let mut exported = gnome.read_profile(Some("Solarized")).expect("reads");
    exported.set_name("Solarized Copy");
    ThemeFile::new(&path).write(&exported).expect("writes");

    let theme = ThemeFile::new(&path).read().expect("reads");
    let mut target = gnome.read_profile(None).expect("base");
    target.update(&theme);
    target.set_name(theme.name());
    gnome.write_profile(&target).expect("writes");

    let names = gnome.list_profile_names().expect("lists");
    assert_eq!(names, ["Solarized", "Solarized Copy"]);

    let copy = gnome.read_profile(Some("Solarized Copy")).expect("reads copy");
    assert_eq!(
        copy.get("bgcolor").expect("valid").and_then(Value::as_color),
        Some(Color::new(0, 0x2b2b, 0x3636))
    );
    assert_eq!(
        copy.private_data_ref("gnome-terminal")
            .and_then(|data| data.get("login_shell"))
            .cloned()
            .map(serde_json::from_value::<GconfValue>)
            .transpose()
            .expect("stored as a GConf value"),
        Some(GconfValue::Bool(true))
    );
}
