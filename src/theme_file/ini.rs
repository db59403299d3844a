//! Section parsing and rendering for `theme.ini`.

use std::collections::BTreeMap;
use std::fmt::Write;

use config::{File, FileFormat, Source};

use crate::profile::{Profile, Value};
use crate::schema::{SchemaError, SchemaVersion};

/// Keys and raw values of one section, keys lowercased.
pub(crate) type Section = BTreeMap<String, String>;

/// Every section of an INI document, names lowercased.
#[derive(Debug, Default)]
pub(crate) struct Sections(BTreeMap<String, Section>);

impl Sections {
    pub(crate) fn get(&self, name: &str) -> Option<&Section> {
        self.0.get(&name.to_ascii_lowercase())
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }
}

/// Parse INI text. Keys outside any section are dropped.
pub(crate) fn parse(text: &str) -> Result<Sections, config::ConfigError> {
    let root = File::from_str(text, FileFormat::Ini).collect()?;
    let mut sections = BTreeMap::new();

    for (name, value) in root {
        let Ok(table) = value.into_table() else {
            log::debug!("ignoring top-level key '{name}' in theme.ini");
            continue;
        };

        let mut section = Section::new();
        for (key, value) in table {
            section.insert(key.to_ascii_lowercase(), value.into_string()?);
        }
        sections.insert(name.to_ascii_lowercase(), section);
    }

    Ok(Sections(sections))
}

/// Render one version's section for `profile`.
pub(crate) fn render_section(
    profile: &Profile,
    version: &SchemaVersion,
) -> Result<String, SchemaError> {
    let schema = &version.schema;
    let mut out = String::new();

    let name = schema.marshal_value("name", &Value::Text(profile.name().to_string()))?;
    let _ = writeln!(out, "[{}]", version.section_name());
    let _ = writeln!(out, "name = {name}");

    for (key, value) in profile.iter() {
        if !schema.is_writable(key) {
            continue;
        }
        if let Some(comment) = schema.comment_for(key, value) {
            let _ = writeln!(out, "; {comment}");
        }
        let _ = writeln!(out, "{key} = {}", schema.marshal_value(key, value)?);
    }

    Ok(out)
}
