//! GConf access through the `gconftool-2` command.

use std::process::{Command, Output, Stdio};

use super::{GconfStore, GconfValue};
use crate::backend::BackendError;

const PROGRAM: &str = "gconftool-2";
const UNSET_MARKER: &str = "(no value set)";

/// Whether `gconftool-2` can be run on this machine.
pub fn is_available() -> bool {
    cfg!(unix)
        && Command::new(PROGRAM)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
}

#[derive(Debug, Default)]
pub struct GconfTool;

impl GconfTool {
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

    /// Run and return stdout without its trailing newline.
    fn query(&self, args: &[&str]) -> Result<String, BackendError> {
        let output = self.run(args)?;
        if !output.status.success() {
            return Err(BackendError::Store(format!(
                "{PROGRAM} {}: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        if text.ends_with('\n') {
            text.pop();
        }
        Ok(text)
    }

    fn value_type(&self, key: &str) -> Result<String, BackendError> {
        Ok(self.query(&["--get-type", key])?.trim().to_string())
    }

    fn typed_value(&self, key: &str, text: &str) -> Result<GconfValue, BackendError> {
        match self.value_type(key)?.as_str() {
            "list" => {
                let item_type = self.query(&["--get-list-type", key])?;
                let inner = text
                    .strip_prefix('[')
                    .and_then(|rest| rest.strip_suffix(']'))
                    .ok_or_else(|| BackendError::Store(format!("malformed list at {key}: {text}")))?;
                split_escaped(inner)
                    .iter()
                    .map(|item| scalar(item_type.trim(), item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(GconfValue::List)
            }
            "pair" => {
                let car_type = self.query(&["--get-car-type", key])?;
                let cdr_type = self.query(&["--get-cdr-type", key])?;
                let inner = text
                    .strip_prefix('(')
                    .and_then(|rest| rest.strip_suffix(')'))
                    .ok_or_else(|| BackendError::Store(format!("malformed pair at {key}: {text}")))?;
                let parts = split_escaped(inner);
                let [car, cdr] = parts.as_slice() else {
                    return Err(BackendError::Store(format!("malformed pair at {key}: {text}")));
                };
                Ok(GconfValue::Pair(
                    Box::new(scalar(car_type.trim(), car)?),
                    Box::new(scalar(cdr_type.trim(), cdr)?),
                ))
            }
            kind => scalar(kind, text),
        }
    }
}

fn scalar(kind: &str, text: &str) -> Result<GconfValue, BackendError> {
    let invalid = || BackendError::Store(format!("cannot read {kind} value '{text}'"));
    match kind {
        "string" => Ok(GconfValue::String(text.to_string())),
        "bool" => match text {
            "true" => Ok(GconfValue::Bool(true)),
            "false" => Ok(GconfValue::Bool(false)),
            _ => Err(invalid()),
        },
        "int" => text.parse().map(GconfValue::Int).map_err(|_| invalid()),
        "float" => text.parse().map(GconfValue::Float).map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

/// Split on commas not preceded by a backslash, removing the escapes.
fn split_escaped(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let mut items = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => current.extend(chars.next()),
            ',' => items.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    items.push(current);
    items
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace(',', "\\,")
}

fn type_name(value: &GconfValue) -> &'static str {
    match value {
        GconfValue::String(_) => "string",
        GconfValue::Bool(_) => "bool",
        GconfValue::Int(_) => "int",
        GconfValue::Float(_) => "float",
        GconfValue::List(_) => "list",
        GconfValue::Pair(..) => "pair",
    }
}

fn scalar_text(value: &GconfValue) -> Result<String, BackendError> {
    match value {
        GconfValue::String(text) => Ok(text.clone()),
        GconfValue::Bool(flag) => Ok(flag.to_string()),
        GconfValue::Int(number) => Ok(number.to_string()),
        GconfValue::Float(number) => Ok(number.to_string()),
        nested => Err(BackendError::InvalidData(format!(
            "GConf cannot nest {} values",
            type_name(nested)
        ))),
    }
}

/// Arguments that store `value` at `key`.
fn set_args(key: &str, value: &GconfValue) -> Result<Vec<String>, BackendError> {
    let mut args = vec!["--type".to_string(), type_name(value).to_string()];
    let text = match value {
        GconfValue::List(items) => {
            let item_type = items.first().map(type_name).unwrap_or("string");
            args.extend(["--list-type".to_string(), item_type.to_string()]);
            let items = items
                .iter()
                .map(|item| scalar_text(item).map(|text| escape(&text)))
                .collect::<Result<Vec<_>, _>>()?;
            format!("[{}]", items.join(","))
        }
        GconfValue::Pair(car, cdr) => {
            args.extend([
                "--car-type".to_string(),
                type_name(car).to_string(),
                "--cdr-type".to_string(),
                type_name(cdr).to_string(),
            ]);
            format!("({},{})", escape(&scalar_text(car)?), escape(&scalar_text(cdr)?))
        }
        scalar => scalar_text(scalar)?,
    };
    args.extend(["--set".to_string(), key.to_string(), text]);
    Ok(args)
}

impl GconfStore for GconfTool {
    fn get_string(&self, key: &str) -> Result<Option<String>, BackendError> {
        let output = self.run(&["--get", key])?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() || stdout.is_empty() {
            return Ok(None);
        }
        Ok(Some(stdout.trim_end_matches('\n').to_string()))
    }

    fn get_string_list(&self, key: &str) -> Result<Vec<String>, BackendError> {
        let Some(text) = self.get_string(key)? else {
            return Ok(Vec::new());
        };
        let inner = text
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(text.as_str());
        Ok(split_escaped(inner))
    }

    fn dir_exists(&self, dir: &str) -> Result<bool, BackendError> {
        let flag = format!("--dir-exists={dir}");
        Ok(self.run(&[flag.as_str()])?.status.success())
    }

    fn all_entries(&self, dir: &str) -> Result<Vec<(String, GconfValue)>, BackendError> {
        let listing = self.query(&["--all-entries", dir])?;
        let mut entries = Vec::new();
        for line in listing.lines() {
            let Some((key, text)) = line.trim_start().split_once(" = ") else {
                continue;
            };
            if text == UNSET_MARKER {
                continue;
            }
            let value = self.typed_value(&format!("{dir}/{key}"), text)?;
            entries.push((key.to_string(), value));
        }
        Ok(entries)
    }

    fn set(&mut self, key: &str, value: &GconfValue) -> Result<(), BackendError> {
        let args = set_args(key, value)?;
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.query(&args).map(drop)
    }
}
