//! Zip container access.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{Datelike, Local, Timelike};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use super::ThemeFileError;

/// `rw-r--r--`, stored in each entry's external attributes.
const ENTRY_MODE: u32 = 0o644;

fn archive_error(path: &Path, source: ZipError) -> ThemeFileError {
    match source {
        ZipError::Io(source) => ThemeFileError::Io {
            path: path.to_path_buf(),
            source,
        },
        source => ThemeFileError::Archive {
            path: path.to_path_buf(),
            source,
        },
    }
}

/// Open an existing archive for reading.
pub(crate) fn open(path: &Path) -> Result<ZipArchive<File>, ThemeFileError> {
    let file = File::open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ThemeFileError::NotFound(path.to_path_buf()),
        _ => ThemeFileError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    ZipArchive::new(file).map_err(|source| archive_error(path, source))
}

/// Read a named entry; `Ok(None)` when the archive has no such entry.
pub(crate) fn read_entry(
    archive: &mut ZipArchive<File>,
    path: &Path,
    name: &str,
) -> Result<Option<Vec<u8>>, ThemeFileError> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(source) => return Err(archive_error(path, source)),
    };

    let mut bytes = Vec::with_capacity(entry.size() as usize);
    entry
        .read_to_end(&mut bytes)
        .map_err(|source| ThemeFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Some(bytes))
}

fn now() -> DateTime {
    let now = Local::now();
    DateTime::from_date_and_time(
        u16::try_from(now.year()).unwrap_or(1980),
        now.month() as u8,
        now.day() as u8,
        now.hour() as u8,
        now.minute() as u8,
        now.second() as u8,
    )
    .unwrap_or_default()
}

/// Writes a new archive; refuses to replace an existing file.
pub(crate) struct ArchiveWriter {
    path: PathBuf,
    zip: ZipWriter<File>,
    options: SimpleFileOptions,
}

impl ArchiveWriter {
    pub(crate) fn create(path: &Path) -> Result<Self, ThemeFileError> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|source| match source.kind() {
                io::ErrorKind::AlreadyExists => ThemeFileError::AlreadyExists(path.to_path_buf()),
                _ => ThemeFileError::Io {
                    path: path.to_path_buf(),
                    source,
                },
            })?;

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(now())
            .unix_permissions(ENTRY_MODE);

        Ok(Self {
            path: path.to_path_buf(),
            zip: ZipWriter::new(file),
            options,
        })
    }

    pub(crate) fn add(&mut self, name: &str, contents: &[u8]) -> Result<(), ThemeFileError> {
        self.zip
            .start_file(name, self.options)
            .map_err(|source| archive_error(&self.path, source))?;
        self.zip
            .write_all(contents)
            .map_err(|source| ThemeFileError::Io {
                path: self.path.clone(),
                source,
            })
    }

    pub(crate) fn finish(self) -> Result<(), ThemeFileError> {
        let file = self
            .zip
            .finish()
            .map_err(|source| archive_error(&self.path, source))?;
        file.sync_all().map_err(|source| ThemeFileError::Io {
            path: self.path,
            source,
        })
    }
}
