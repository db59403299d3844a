use serde::Deserialize;
use termitheme::logging;

use crate::cli::{CliArgs, Command};

use super::resolved::{ConfigError, ResolvedConfig};

/// Mirror of the configuration file representation before CLI overrides and
/// validation are applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct RawConfig {
    terminal: TerminalSection,
    logging: LoggingSection,
    credits: CreditsSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct TerminalSection {
    default: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct LoggingSection {
    level: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct CreditsSection {
    utf8: Option<bool>,
}

impl RawConfig {
    /// Apply CLI overrides on top of the raw configuration values.
    pub(super) fn apply_cli_overrides(&mut self, cli: &CliArgs) {
        if let Some(terminal) = cli.command.as_ref().and_then(Command::terminal) {
            self.terminal.default = Some(terminal.to_string());
        }
        if matches!(&cli.command, Some(Command::Export(args)) if args.utf8) {
            self.credits.utf8 = Some(true);
        }
        if let Some(level) = logging::level_for_verbosity(cli.verbose) {
            self.logging.level = Some(level.to_string());
        }
    }

    /// Validate values and fill defaults.
    pub(super) fn resolve(self) -> Result<ResolvedConfig, ConfigError> {
        let log_level = match self.logging.level {
            Some(name) => logging::level_from_name(&name).ok_or_else(|| ConfigError {
                key: "logging.level",
                value: name.clone(),
                reason: "expected one of off, error, warn, info, debug, trace",
            })?,
            None => logging::DEFAULT_LEVEL,
        };

        let terminal = self
            .terminal
            .default
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        Ok(ResolvedConfig {
            terminal,
            log_level,
            credits_utf8: self.credits.utf8.unwrap_or(false),
        })
    }
}
