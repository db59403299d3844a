use std::path::Path;

use anyhow::{Context, anyhow};
use thiserror::Error;

use termitheme::charset::Charset;
use termitheme::{BackendError, BackendRegistry, Profile, TerminalBackend, ThemeFile};

use crate::cli::{ExportArgs, ImportArgs};
use crate::settings::ResolvedConfig;

/// Failure of a command, split by the exit code it maps to.
#[derive(Debug, Error)]
pub(crate) enum CommandError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl CommandError {
    pub(crate) fn exit_code(&self) -> u8 {
        match self {
            CommandError::Usage(_) => 2,
            CommandError::Failed(_) => 1,
        }
    }
}

fn backend_error(err: BackendError) -> CommandError {
    match err {
        BackendError::UnknownTerminal(_) | BackendError::Unsupported(_) => {
            CommandError::Usage(err.to_string())
        }
        other => CommandError::Failed(other.into()),
    }
}

/// Resolves the terminal backend and runs the export, import and list flows
/// against it.
pub(crate) struct Workflow<'a> {
    registry: &'a BackendRegistry,
    settings: ResolvedConfig,
}

impl<'a> Workflow<'a> {
    pub(crate) fn new(registry: &'a BackendRegistry, settings: ResolvedConfig) -> Self {
        Self { registry, settings }
    }

    /// Terminal type from the command line or settings, else the first usable one.
    pub(crate) fn terminal(&self) -> Result<&str, CommandError> {
        let name = match self.settings.terminal.as_deref() {
            Some(name) => name,
            None => self.registry.default_type().ok_or_else(|| {
                CommandError::Usage("no supported terminal type is available on this system".into())
            })?,
        };

        self.registry.lookup(name).map_err(backend_error)?;
        if !self.registry.supports(name) {
            let available = self.registry.supported_types();
            let available = if available.is_empty() {
                "none".to_string()
            } else {
                available.join(", ")
            };
            return Err(CommandError::Usage(format!(
                "terminal type '{name}' is not available here (available types: {available})"
            )));
        }
        Ok(name)
    }

    pub(crate) fn open(&self) -> Result<Box<dyn TerminalBackend>, CommandError> {
        let name = self.terminal()?;
        log::debug!("using terminal type '{name}'");
        self.registry.open(name).map_err(backend_error)
    }

    pub(crate) fn export(&self, args: &ExportArgs) -> Result<String, CommandError> {
        let backend = self.open()?;
        export_profile(backend.as_ref(), args, self.settings.credits_utf8)
    }

    pub(crate) fn import(&self, args: &ImportArgs) -> Result<String, CommandError> {
        if args.credits {
            return theme_credits(&args.filename);
        }
        let mut backend = self.open()?;
        import_theme(backend.as_mut(), args)
    }

    pub(crate) fn list(&self) -> Result<(String, Vec<String>), CommandError> {
        let terminal = self.terminal()?.to_string();
        let backend = self.open()?;
        let names = backend.list_profile_names().map_err(backend_error)?;
        Ok((terminal, names))
    }
}

/// Read a profile from `backend` and write it as a new theme file.
pub(crate) fn export_profile(
    backend: &dyn TerminalBackend,
    args: &ExportArgs,
    credits_utf8: bool,
) -> Result<String, CommandError> {
    let theme_name = args.theme_name();
    let path = args.output_path();

    let mut profile = match backend.read_profile(Some(&args.profile)) {
        Ok(profile) => profile,
        Err(BackendError::ProfileNotFound(_)) => {
            return Err(anyhow!("the theme '{}' does not exist", args.profile).into());
        }
        Err(err) => return Err(backend_error(err)),
    };
    profile.set_name(theme_name);

    let mut theme_file = ThemeFile::new(&path);
    if credits_utf8 || args.utf8 {
        theme_file = theme_file.with_charsets(vec![Charset::Utf8]);
    }
    if let Some(credits) = &args.credits {
        theme_file
            .set_credits(credits)
            .with_context(|| format!("failed to read credits from '{}'", credits.display()))?;
    }
    theme_file
        .write(&profile)
        .with_context(|| format!("failed to write theme to '{}'", path.display()))?;

    Ok(format!(
        "Exported theme '{}' as '{theme_name}' to {}.",
        args.profile,
        path.display()
    ))
}

fn read_theme(path: &Path) -> Result<(ThemeFile, Profile), CommandError> {
    let theme_file = ThemeFile::new(path);
    let profile = theme_file
        .read()
        .with_context(|| format!("theme file {} does not seem to be valid", path.display()))?;
    Ok((theme_file, profile))
}

/// Text printed by `import --credits`.
pub(crate) fn theme_credits(path: &Path) -> Result<String, CommandError> {
    let (theme_file, _) = read_theme(path)?;
    let credits = theme_file
        .get_credits()
        .context("error reading credits")?;
    Ok(credits.unwrap_or_else(|| "No credits are available for this theme.".to_string()))
}

/// Merge a theme file over a base profile and store the result.
pub(crate) fn import_theme(
    backend: &mut dyn TerminalBackend,
    args: &ImportArgs,
) -> Result<String, CommandError> {
    let (_, theme) = read_theme(&args.filename)?;

    let (mut profile, base) = match args.base.as_deref() {
        Some(base) => {
            let profile = backend
                .read_profile(Some(base))
                .with_context(|| format!("the base theme {base} does not exist"))?;
            (profile, base.to_string())
        }
        None => {
            let profile = backend
                .read_profile(None)
                .context("failed to read the default profile")?;
            (profile, "default profile".to_string())
        }
    };

    let target = args.name.clone().unwrap_or_else(|| theme.name().to_string());
    if backend.profile_exists(&target).map_err(backend_error)? && !args.overwrite {
        return Err(anyhow!("the theme '{target}' exists and --overwrite was not given").into());
    }

    profile.update(&theme);
    profile.set_name(target.as_str());
    backend
        .write_profile(&profile)
        .context("error writing new profile to storage")?;
    log::info!("imported {} into profile '{target}'", args.filename.display());

    Ok(format!(
        "Saved theme '{}' as '{target}' (based on {base})",
        theme.name()
    ))
}
