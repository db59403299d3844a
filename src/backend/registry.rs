use std::sync::OnceLock;

use super::gnome::{self, GconfTool, GnomeTerminalBackend};
use super::putty::{self, PuttyBackend, RegExe};
use super::{BackendError, TerminalBackend};

type OpenFn = fn() -> Result<Box<dyn TerminalBackend>, BackendError>;

/// Static description of a backend the binary knows how to build.
pub struct BackendDescriptor {
    /// Name used on the command line, e.g. `gnome`.
    pub name: &'static str,
    pub label: &'static str,
    available: fn() -> bool,
    open: OpenFn,
}

impl BackendDescriptor {
    pub const fn new(
        name: &'static str,
        label: &'static str,
        available: fn() -> bool,
        open: OpenFn,
    ) -> Self {
        Self {
            name,
            label,
            available,
            open,
        }
    }
}

fn open_gnome() -> Result<Box<dyn TerminalBackend>, BackendError> {
    Ok(Box::new(GnomeTerminalBackend::new(GconfTool::new())?))
}

fn open_putty() -> Result<Box<dyn TerminalBackend>, BackendError> {
    Ok(Box::new(PuttyBackend::new(RegExe::new())))
}

static BUILT_IN: [BackendDescriptor; 2] = [
    BackendDescriptor::new("gnome", "gnome-terminal (GConf)", gnome::is_available, open_gnome),
    BackendDescriptor::new("putty", "PuTTY (Windows Registry)", putty::is_available, open_putty),
];

/// Backends known to this build, with availability checked once.
pub struct BackendRegistry {
    entries: Vec<(&'static BackendDescriptor, bool)>,
}

impl BackendRegistry {
    pub fn from_descriptors(descriptors: &'static [BackendDescriptor]) -> Self {
        let entries = descriptors
            .iter()
            .map(|descriptor| {
                let available = (descriptor.available)();
                log::debug!(
                    "terminal type '{}' {}",
                    descriptor.name,
                    if available { "available" } else { "unavailable" }
                );
                (descriptor, available)
            })
            .collect();
        Self { entries }
    }

    /// The process-wide registry of built-in backends.
    pub fn detect() -> &'static BackendRegistry {
        static REGISTRY: OnceLock<BackendRegistry> = OnceLock::new();
        REGISTRY.get_or_init(|| Self::from_descriptors(&BUILT_IN))
    }

    pub fn lookup(&self, name: &str) -> Result<&'static BackendDescriptor, BackendError> {
        self.entries
            .iter()
            .find(|(descriptor, _)| descriptor.name == name)
            .map(|(descriptor, _)| *descriptor)
            .ok_or_else(|| BackendError::UnknownTerminal(name.to_string()))
    }

    /// Whether `name` is known and usable on this platform.
    pub fn supports(&self, name: &str) -> bool {
        self.entries
            .iter()
            .any(|(descriptor, available)| descriptor.name == name && *available)
    }

    /// Usable terminal types, sorted.
    pub fn supported_types(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, available)| *available)
            .map(|(descriptor, _)| descriptor.name)
            .collect();
        names.sort_unstable();
        names
    }

    pub fn descriptors(&self) -> impl Iterator<Item = (&'static BackendDescriptor, bool)> + '_ {
        self.entries.iter().copied()
    }

    /// The first usable terminal type in declaration order.
    pub fn default_type(&self) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(_, available)| *available)
            .map(|(descriptor, _)| descriptor.name)
    }

    pub fn open(&self, name: &str) -> Result<Box<dyn TerminalBackend>, BackendError> {
        let descriptor = self.lookup(name)?;
        if !self.supports(name) {
            return Err(BackendError::Unsupported(name.to_string()));
        }
        (descriptor.open)()
    }
}
