//! Logger setup for the `termitheme` binary.
//!
//! The library only talks to the `log` facade; the binary installs
//! `env_logger` once at startup. `RUST_LOG` still takes precedence over the
//! level chosen here, so individual modules can be traced on demand.

use log::LevelFilter;

/// Level used when neither flags nor settings ask for one.
pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::Warn;

/// Parse a level name as written in configuration files.
pub fn level_from_name(name: &str) -> Option<LevelFilter> {
    match name.trim().to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

/// Map repeated `-v` flags onto a level; zero means "not requested".
pub fn level_for_verbosity(count: u8) -> Option<LevelFilter> {
    match count {
        0 => None,
        1 => Some(LevelFilter::Info),
        2 => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    }
}

/// Install the global logger writing to stderr.
pub fn initialize(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .try_init()?;
    log::debug!("logger initialized at {level}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(level_from_name("DEBUG"), Some(LevelFilter::Debug));
        assert_eq!(level_from_name(" warning "), Some(LevelFilter::Warn));
        assert_eq!(level_from_name("loud"), None);
    }

    #[test]
    fn verbosity_saturates_at_trace() {
        assert_eq!(level_for_verbosity(0), None);
        assert_eq!(level_for_verbosity(1), Some(LevelFilter::Info));
        assert_eq!(level_for_verbosity(9), Some(LevelFilter::Trace));
    }
}
