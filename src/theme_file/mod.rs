//! The portable theme file.
//!
//! A theme file is a zip archive holding `theme.ini` and, from format 1.2 on,
//! an optional `credits.txt`. `theme.ini` carries one section per registered
//! format version (`[Termitheme1_2]`, `[Termitheme1]`, ...), each complete on
//! its own, so a reader picks the newest section it understands and ignores
//! the rest.

mod archive;
mod ini;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use zip::result::ZipError;

use crate::charset::{self, Charset};
use crate::profile::{Profile, ProfileError};
use crate::schema::{self, SchemaError};

use archive::ArchiveWriter;

/// Name of the required entry inside the archive.
pub const THEME_ENTRY: &str = "theme.ini";

/// Logical key of the embedded credits text.
pub const CREDITS_KEY: &str = "credits";

#[derive(Debug, Error)]
pub enum ThemeFileError {
    #[error("theme file '{}' does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("file '{}' exists", .0.display())]
    AlreadyExists(PathBuf),

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("'{}' is not a valid theme archive: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: ZipError,
    },

    #[error("'{}' has no {entry} entry", path.display())]
    MissingEntry { path: PathBuf, entry: &'static str },

    #[error("malformed theme.ini: {0}")]
    Ini(#[from] config::ConfigError),

    #[error("theme file has no compatible theme version")]
    NoCompatibleVersion,

    #[error("theme file section [{0}] has no 'name' key")]
    MissingName(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error("illegal characters in file '{}'", .0.display())]
    Encoding(PathBuf),

    #[error("no theme format version supports the '{0}' archive file")]
    UnsupportedArchiveFile(String),
}

/// Reads and writes one theme archive on disk.
#[derive(Debug, Clone)]
pub struct ThemeFile {
    path: PathBuf,
    staged: BTreeMap<String, String>,
    charsets: Vec<Charset>,
}

impl ThemeFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            staged: BTreeMap::new(),
            charsets: charset::candidate_charsets(),
        }
    }

    /// Override the charsets tried when staging external text files.
    #[must_use]
    pub fn with_charsets(mut self, charsets: Vec<Charset>) -> Self {
        self.charsets = charsets;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Registered version tags, newest first.
    pub fn versions() -> Vec<&'static str> {
        schema::versions().iter().map(|version| version.tag).collect()
    }

    pub fn has_version(tag: &str) -> bool {
        schema::has_version(tag)
    }

    /// Stage the contents of `source` as the credits entry for the next write.
    pub fn set_credits(&mut self, source: impl AsRef<Path>) -> Result<(), ThemeFileError> {
        let source = source.as_ref();
        let bytes = fs::read(source).map_err(|err| ThemeFileError::Io {
            path: source.to_path_buf(),
            source: err,
        })?;
        let text = charset::decode_with(&bytes, &self.charsets)
            .ok_or_else(|| ThemeFileError::Encoding(source.to_path_buf()))?;
        self.set_credits_text(text);
        Ok(())
    }

    pub fn set_credits_text(&mut self, text: impl Into<String>) {
        self.staged.insert(CREDITS_KEY.to_string(), text.into());
    }

    /// Staged credits, or the credits embedded in the archive.
    ///
    /// Versions are searched newest first and the search ends at the first
    /// version that declares a credits entry, whether or not the archive
    /// contains it. An archive that cannot be opened has no credits.
    pub fn get_credits(&self) -> Result<Option<String>, ThemeFileError> {
        if let Some(text) = self.staged.get(CREDITS_KEY) {
            return Ok(Some(text.clone()));
        }

        let Some(entry) = schema::versions()
            .iter()
            .find_map(|version| version.schema.archive_file(CREDITS_KEY))
        else {
            return Ok(None);
        };

        let mut archive = match archive::open(&self.path) {
            Ok(archive) => archive,
            Err(err) => {
                log::warn!("cannot read credits: {err}");
                return Ok(None);
            }
        };

        let bytes = archive::read_entry(&mut archive, &self.path, entry)?;
        Ok(bytes.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Read the archive and build a profile from its newest known section.
    pub fn read(&self) -> Result<Profile, ThemeFileError> {
        let mut archive = archive::open(&self.path)?;
        let bytes = archive::read_entry(&mut archive, &self.path, THEME_ENTRY)?.ok_or_else(
            || ThemeFileError::MissingEntry {
                path: self.path.clone(),
                entry: THEME_ENTRY,
            },
        )?;
        profile_from_ini(&String::from_utf8_lossy(&bytes))
    }

    /// Write `profile` as a new archive. Existing files are never replaced.
    pub fn write(&self, profile: &Profile) -> Result<(), ThemeFileError> {
        if self.path.exists() {
            return Err(ThemeFileError::AlreadyExists(self.path.clone()));
        }

        let data = render_ini(profile)?;
        let newest = schema::newest();
        let mut extra = Vec::with_capacity(self.staged.len());
        for (key, contents) in &self.staged {
            let name = newest
                .schema
                .archive_file(key)
                .ok_or_else(|| ThemeFileError::UnsupportedArchiveFile(key.clone()))?;
            extra.push((name, contents));
        }

        let mut writer = ArchiveWriter::create(&self.path)?;
        writer.add(THEME_ENTRY, data.as_bytes())?;
        for (name, contents) in extra {
            writer.add(name, contents.as_bytes())?;
        }
        writer.finish()?;

        log::info!(
            "wrote theme '{}' to {}",
            profile.name(),
            self.path.display()
        );
        Ok(())
    }
}

/// Render every registered version's section, newest first.
pub fn render_ini(profile: &Profile) -> Result<String, ThemeFileError> {
    let sections = schema::versions()
        .iter()
        .map(|version| ini::render_section(profile, version))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(sections.join("\n"))
}

/// Build a profile from `theme.ini` text.
///
/// The newest registered version with a section in the text wins. Keys that
/// version does not know are ignored.
pub fn profile_from_ini(text: &str) -> Result<Profile, ThemeFileError> {
    let sections = ini::parse(text)?;

    let (version, section) = schema::versions()
        .iter()
        .find_map(|version| {
            sections
                .get(&version.section_name())
                .map(|section| (version, section))
        })
        .ok_or_else(|| {
            log::debug!(
                "no known version among sections: {}",
                sections.names().collect::<Vec<_>>().join(", ")
            );
            ThemeFileError::NoCompatibleVersion
        })?;
    log::debug!("reading theme format version {}", version.tag);

    let schema = &version.schema;
    let name = section
        .get("name")
        .ok_or_else(|| ThemeFileError::MissingName(version.section_name()))?;
    let name = schema.parse_value("name", name)?;

    let mut profile = Profile::new(name.as_text().unwrap_or_default());
    for (key, raw) in section {
        if key == "name" {
            continue;
        }
        if !schema.has_key(key) {
            log::debug!("ignoring key '{key}' unknown to version {}", version.tag);
            continue;
        }
        profile.set(key, schema.parse_value(key, raw)?)?;
    }

    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::profile::Value;
    use tempfile::tempdir;

    fn night() -> Profile {
        let mut profile = Profile::new("Night");
        profile.set("color0", Color::new(0, 0, 0)).expect("valid");
        profile.set("fgcolor", Color::new(0xd3d3, 0xd7d7, 0xcfcf)).expect("valid");
        profile.set("font", "Monospace 10").expect("valid");
        profile.set("allow_bold", true).expect("valid");
        profile
    }

    #[test]
    fn newest_section_wins() {
        let text = "[Termitheme1]\nname = Old\ncolor0 = #ffffff\n\n\
                    [Termitheme1_2]\nname = New\ncolor0 = #000100020003\n";
        let profile = profile_from_ini(text).expect("parses");
        assert_eq!(profile.name(), "New");
        assert_eq!(
            profile.get("color0").expect("valid"),
            Some(&Value::Color(Color::new(1, 2, 3)))
        );
    }

    #[test]
    fn unknown_versions_are_rejected() {
        let err = profile_from_ini("[Termitheme9]\nname = Future\n").unwrap_err();
        assert!(matches!(err, ThemeFileError::NoCompatibleVersion));
    }

    #[test]
    fn missing_name_is_an_error() {
        let err = profile_from_ini("[Termitheme1]\ncolor0 = #000000\n").unwrap_err();
        assert!(matches!(err, ThemeFileError::MissingName(section) if section == "Termitheme1"));
    }

    #[test]
    fn keys_unknown_to_the_version_are_ignored() {
        let text = "[Termitheme1]\nname = Old\nbgcursor = #ffffff\nsparkle = yes\nallow_bold = t\n";
        let profile = profile_from_ini(text).expect("parses");
        assert!(!profile.contains_key("bgcursor"));
        assert_eq!(profile.get("allow_bold").expect("valid"), Some(&Value::Bool(true)));
        assert_eq!(profile.len(), 1);
    }

    #[test]
    fn malformed_colors_fail_the_read() {
        let err = profile_from_ini("[Termitheme1_2]\nname = X\ncolor3 = teal\n").unwrap_err();
        assert!(matches!(err, ThemeFileError::Schema(SchemaError::Color { .. })));
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("night.zip");
        let theme = ThemeFile::new(&path);

        theme.write(&night()).expect("writes");
        let profile = theme.read().expect("reads");

        assert_eq!(profile.name(), "Night");
        let original = night();
        assert_eq!(profile.iter().collect::<Vec<_>>(), original.iter().collect::<Vec<_>>());
    }

    #[test]
    fn write_refuses_existing_files() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("taken.zip");
        fs::write(&path, b"keep me").expect("seed file");

        let err = ThemeFile::new(&path).write(&night()).unwrap_err();
        assert!(matches!(err, ThemeFileError::AlreadyExists(_)));
        assert_eq!(fs::read(&path).expect("still there"), b"keep me");
    }

    #[test]
    fn reading_garbage_reports_a_corrupt_archive() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("junk.zip");
        fs::write(&path, b"not a zip").expect("seed file");

        let err = ThemeFile::new(&path).read().unwrap_err();
        assert!(matches!(err, ThemeFileError::Archive { .. }));

        let missing = ThemeFile::new(dir.path().join("absent.zip")).read().unwrap_err();
        assert!(matches!(missing, ThemeFileError::NotFound(_)));
    }

    #[test]
    fn credits_are_staged_and_embedded() {
        let dir = tempdir().expect("tempdir");
        let source = dir.path().join("credits.txt");
        fs::write(&source, "Colors by Jos\u{e9}\n").expect("seed credits");

        let path = dir.path().join("credited.zip");
        let mut theme = ThemeFile::new(&path).with_charsets(vec![Charset::Utf8]);
        theme.set_credits(&source).expect("decodes");
        theme.write(&night()).expect("writes");

        let reread = ThemeFile::new(&path);
        assert_eq!(
            reread.get_credits().expect("reads").as_deref(),
            Some("Colors by Jos\u{e9}\n")
        );
    }

    #[test]
    fn undecodable_credits_are_rejected() {
        let dir = tempdir().expect("tempdir");
        let source = dir.path().join("credits.bin");
        fs::write(&source, [0xffu8, 0xfe, 0x00]).expect("seed credits");

        let mut theme = ThemeFile::new(dir.path().join("x.zip")).with_charsets(vec![Charset::Utf8]);
        assert!(matches!(
            theme.set_credits(&source),
            Err(ThemeFileError::Encoding(_))
        ));
    }

    #[test]
    fn archives_without_credits_have_none() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("plain.zip");
        let theme = ThemeFile::new(&path);
        theme.write(&night()).expect("writes");

        assert_eq!(theme.get_credits().expect("reads"), None);
        assert_eq!(
            ThemeFile::new(dir.path().join("absent.zip")).get_credits().expect("no archive"),
            None
        );
    }

    #[test]
    fn version_listing() {
        assert_eq!(ThemeFile::versions(), ["1_2", "1"]);
        assert!(ThemeFile::has_version("1_2"));
        assert!(!ThemeFile::has_version("0"));
    }
}
