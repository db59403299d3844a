use log::LevelFilter;
use thiserror::Error;

/// Application-ready configuration derived from user input, config files and
/// defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Requested terminal type; the workflow falls back to the first
    /// available one.
    pub terminal: Option<String>,
    pub log_level: LevelFilter,
    /// Decode credits files as UTF-8 instead of the locale charset.
    pub credits_utf8: bool,
}

#[derive(Debug, Error)]
#[error("invalid value for configuration key `{key}`: {reason} (value: {value})")]
pub(crate) struct ConfigError {
    pub(crate) key: &'static str,
    pub(crate) value: String,
    pub(crate) reason: &'static str,
}
