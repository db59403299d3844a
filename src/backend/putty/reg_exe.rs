//! Registry access through the Windows `reg.exe` command.

use std::process::{Command, Output};

use super::{RegValue, RegistryStore};
use crate::backend::BackendError;

const PROGRAM: &str = "reg";
const HIVE: &str = r"HKEY_CURRENT_USER";
/// Column separator in `reg query` output.
const COLUMN: &str = "    ";

pub fn is_available() -> bool {
    cfg!(windows)
}

#[derive(Debug, Default)]
pub struct RegExe;

impl RegExe {
    pub fn new() -> Self {
        Self
    }

    fn run(&self, args: &[&str]) -> Result<Output, BackendError> {
        log::trace!("{PROGRAM} {}", args.join(" "));
        Command::new(PROGRAM)
            .args(args)
            .output()
            .map_err(|source| BackendError::Spawn {
                program: PROGRAM,
                source,
            })
    }

    /// `reg query` output for `path`, or `None` when the key is missing.
    fn query(&self, path: &str) -> Result<Option<String>, BackendError> {
        let key = format!(r"{HIVE}\{path}");
        let output = self.run(&["query", key.as_str()])?;
        if !output.status.success() {
            log::debug!(
                "reg query {key}: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
    }
}

fn parse_value(kind: &str, data: &str) -> Result<RegValue, BackendError> {
    match kind {
        "REG_SZ" => Ok(RegValue::Sz(data.to_string())),
        "REG_DWORD" => {
            let digits = data.trim_start_matches("0x");
            u32::from_str_radix(digits, 16)
                .map(RegValue::Dword)
                .map_err(|_| BackendError::Store(format!("malformed REG_DWORD '{data}'")))
        }
        _ => Ok(RegValue::Other {
            kind: kind.to_string(),
            data: data.to_string(),
        }),
    }
}

/// Value lines of a `reg query` listing.
fn parse_values(listing: &str) -> Result<Vec<(String, RegValue)>, BackendError> {
    let mut values = Vec::new();
    for line in listing.lines() {
        let Some(row) = line.strip_prefix(COLUMN) else {
            continue;
        };
        let mut columns = row.splitn(3, COLUMN);
        let (Some(name), Some(kind)) = (columns.next(), columns.next()) else {
            continue;
        };
        let data = columns.next().unwrap_or_default();
        values.push((name.to_string(), parse_value(kind, data)?));
    }
    Ok(values)
}

/// Last path component of every subkey line below `key`.
fn parse_subkeys(listing: &str, key: &str) -> Vec<String> {
    let prefix = format!("{key}\\");
    listing
        .lines()
        .filter_map(|line| line.trim_end().strip_prefix(&prefix))
        .map(str::to_string)
        .collect()
}

fn value_args(value: &RegValue) -> (String, String) {
    match value {
        RegValue::Sz(text) => ("REG_SZ".to_string(), text.clone()),
        RegValue::Dword(number) => ("REG_DWORD".to_string(), number.to_string()),
        RegValue::Other { kind, data } => (kind.clone(), data.clone()),
    }
}

impl RegistryStore for RegExe {
    fn subkeys(&self, path: &str) -> Result<Vec<String>, BackendError> {
        let key = format!(r"{HIVE}\{path}");
        Ok(self
            .query(path)?
            .map(|listing| parse_subkeys(&listing, &key))
            .unwrap_or_default())
    }

    fn key_exists(&self, path: &str) -> Result<bool, BackendError> {
        Ok(self.query(path)?.is_some())
    }

    fn values(&self, path: &str) -> Result<Option<Vec<(String, RegValue)>>, BackendError> {
        self.query(path)?
            .map(|listing| parse_values(&listing))
            .transpose()
    }

    fn set_value(&mut self, path: &str, name: &str, value: &RegValue) -> Result<(), BackendError> {
        let key = format!(r"{HIVE}\{path}");
        let (kind, data) = value_args(value);
        let output = self.run(&[
            "add",
            key.as_str(),
            "/v",
            name,
            "/t",
            kind.as_str(),
            "/d",
            data.as_str(),
            "/f",
        ])?;
        if output.status.success() {
            return Ok(());
        }
        Err(BackendError::Store(format!(
            "reg add {key} /v {name}: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = concat!(
        "\r\n",
        "HKEY_CURRENT_USER\\Software\\SimonTatham\\PuTTY\\Sessions\\Default%20Settings\r\n",
        "    Present    REG_DWORD    0x1\r\n",
        "    HostName    REG_SZ    \r\n",
        "    Font    REG_SZ    Courier New\r\n",
        "    Blob    REG_BINARY    00FF\r\n",
        "\r\n",
        "HKEY_CURRENT_USER\\Software\\SimonTatham\\PuTTY\\Sessions\\Default%20Settings\\Nested\r\n",
    );

    #[test]
    fn values_are_parsed_from_columns() {
        let values = parse_values(LISTING).expect("parses");
        assert_eq!(
            values,
            [
                ("Present".to_string(), RegValue::Dword(1)),
                ("HostName".to_string(), RegValue::Sz(String::new())),
                ("Font".to_string(), RegValue::Sz("Courier New".into())),
                (
                    "Blob".to_string(),
                    RegValue::Other {
                        kind: "REG_BINARY".into(),
                        data: "00FF".into()
                    }
                ),
            ]
        );
    }

    #[test]
    fn subkeys_exclude_the_queried_key() {
        let key = r"HKEY_CURRENT_USER\Software\SimonTatham\PuTTY\Sessions\Default%20Settings";
        assert_eq!(parse_subkeys(LISTING, key), ["Nested"]);
    }

    #[test]
    fn malformed_dword_is_a_store_error() {
        assert!(matches!(
            parse_value("REG_DWORD", "0xzz"),
            Err(BackendError::Store(_))
        ));
        assert_eq!(
            value_args(&RegValue::Dword(1)),
            ("REG_DWORD".to_string(), "1".to_string())
        );
    }
}
