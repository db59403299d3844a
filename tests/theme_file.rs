use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use tempfile::tempdir;
use termitheme::{Color, Profile, ThemeFile, ThemeFileError, Value};
use zip::ZipArchive;
use zip::write::SimpleFileOptions;

fn write_archive(path: &Path, entries: &[(&str, &str)]) {
    let file = File::create(path).expect("create archive");
    let mut zip = zip::ZipWriter::new(file);
    for (name, contents) in entries {
        zip.start_file(*name, SimpleFileOptions::default())
            .expect("start entry");
        zip.write_all(contents.as_bytes()).expect("write entry");
    }
    zip.finish().expect("finish archive");
}

fn read_entry(path: &Path, name: &str) -> Option<String> {
    let mut archive = ZipArchive::new(File::open(path).expect("open")).expect("zip");
    let mut entry = archive.by_name(name).ok()?;
    let mut text = String::new();
    entry.read_to_string(&mut text).expect("utf-8 entry");
    Some(text)
}

fn color(profile: &Profile, key: &str) -> Option<Color> {
    profile.get(key).expect("valid key").and_then(Value::as_color)
}

#[test]
fn exported_archive_carries_every_version() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("midnight.zip");

    let mut profile = Profile::new("Midnight");
    profile.set("color0", Color::new(0, 0, 0)).expect("valid");
    profile.set("bgcursor", Color::new(0x1234, 0x5678, 0x9abc)).expect("valid");
    profile.set("font", "Monospace 11").expect("valid");

    let mut theme = ThemeFile::new(&path);
    theme.set_credits_text("Colors by the night shift");
    theme.write(&profile).expect("writes");

    let ini = read_entry(&path, "theme.ini").expect("theme.ini present");
    let newest = ini.find("[Termitheme1_2]").expect("newest section");
    let legacy = ini.find("[Termitheme1]").expect("legacy section");
    assert!(newest < legacy);

    let (newest_text, legacy_text) = ini.split_at(legacy);
    assert!(newest_text.contains("color0 = #000000000000\n"));
    assert!(newest_text.contains("bgcursor = #123456789abc\n"));
    assert!(legacy_text.contains("color0 = #000000\n"));
    assert!(!legacy_text.contains("bgcursor"));
    assert!(legacy_text.contains("font = Monospace 11\n"));

    assert_eq!(
        read_entry(&path, "credits.txt").as_deref(),
        Some("Colors by the night shift")
    );

    let back = ThemeFile::new(&path).read().expect("reads");
    assert_eq!(back.name(), "Midnight");
    assert_eq!(color(&back, "bgcursor"), Some(Color::new(0x1234, 0x5678, 0x9abc)));
}

#[test]
fn legacy_archive_reads_with_low_depth_colors() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("legacy.zip");
    write_archive(
        &path,
        &[(
            "theme.ini",
            "[Termitheme1]\n\
             name = Old School\n\
             fgcolor = #00ff00\n\
             fgbold = #80ff80\n\
             use_fgbold = True\n\
             allow_bold = false\n\
             sparkle = yes\n",
        )],
    );

    let theme = ThemeFile::new(&path);
    let profile = theme.read().expect("reads");
    assert_eq!(profile.name(), "Old School");
    assert_eq!(color(&profile, "fgcolor"), Some(Color::new(0, 0xffff, 0)));
    assert_eq!(color(&profile, "fgbold"), Some(Color::new(0x8080, 0xffff, 0x8080)));
    assert_eq!(profile.get("use_fgbold").expect("valid"), Some(&Value::Bool(true)));
    assert_eq!(profile.get("allow_bold").expect("valid"), Some(&Value::Bool(false)));
    assert_eq!(profile.len(), 4);

    assert_eq!(theme.get_credits().expect("no error"), None);
}

#[test]
fn newest_known_section_wins() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("both.zip");
    write_archive(
        &path,
        &[(
            "theme.ini",
            "[Termitheme9]\n\
             name = From The Future\n\
             \n\
             [Termitheme1]\n\
             name = Legacy\n\
             bgcolor = #000000\n\
             \n\
             [Termitheme1_2]\n\
             name = Current\n\
             bgcolor = #111122223333\n",
        )],
    );

    let profile = ThemeFile::new(&path).read().expect("reads");
    assert_eq!(profile.name(), "Current");
    assert_eq!(color(&profile, "bgcolor"), Some(Color::new(0x1111, 0x2222, 0x3333)));
}

#[test]
fn unknown_versions_only_are_rejected() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("future.zip");
    write_archive(&path, &[("theme.ini", "[Termitheme9]\nname = Later\n")]);

    assert!(matches!(
        ThemeFile::new(&path).read(),
        Err(ThemeFileError::NoCompatibleVersion)
    ));
}

#[test]
fn credits_entry_absent_from_archive_reads_as_none() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("plain.zip");
    write_archive(&path, &[("theme.ini", "[Termitheme1_2]\nname = Plain\n")]);

    let theme = ThemeFile::new(&path);
    assert_eq!(theme.read().expect("reads").name(), "Plain");
    assert_eq!(theme.get_credits().expect("no error"), None);
}

#[test]
fn bad_values_fail_the_read() {
    let dir = tempdir().expect("tempdir");
    let color_path = dir.path().join("color.zip");
    write_archive(
        &color_path,
        &[("theme.ini", "[Termitheme1_2]\nname = Broken\nfgcolor = #12345\n")],
    );
    assert!(matches!(
        ThemeFile::new(&color_path).read(),
        Err(ThemeFileError::Schema(_))
    ));

    let nameless = dir.path().join("nameless.zip");
    write_archive(&nameless, &[("theme.ini", "[Termitheme1_2]\nfgcolor = #123456\n")]);
    assert!(matches!(
        ThemeFile::new(&nameless).read(),
        Err(ThemeFileError::MissingName(_))
    ));

    let empty = dir.path().join("empty.zip");
    write_archive(&empty, &[("readme.txt", "nothing here")]);
    assert!(matches!(
        ThemeFile::new(&empty).read(),
        Err(ThemeFileError::MissingEntry { .. })
    ));
}
