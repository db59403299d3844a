//! Live configuration stores that hold terminal profiles.
//!
//! Each backend translates between its store's native settings and a
//! [`Profile`]. Settings that are not part of the portable theme are kept in
//! the profile's private namespace under [`TerminalBackend::id`] and written
//! back verbatim, so importing a theme on top of an existing profile leaves
//! unrelated settings alone.

pub mod gnome;
pub mod putty;
mod registry;

use std::io;

use thiserror::Error;

use crate::color::ColorError;
use crate::profile::{Profile, ProfileError};

pub use registry::{BackendDescriptor, BackendRegistry};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("unknown terminal type: '{0}'")]
    UnknownTerminal(String),

    #[error("terminal type '{0}' is not supported on this platform")]
    Unsupported(String),

    #[error("no profile named '{0}' exists")]
    ProfileNotFound(String),

    #[error("configuration store error: {0}")]
    Store(String),

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("invalid profile data: {0}")]
    InvalidData(String),

    #[error(transparent)]
    Color(#[from] ColorError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error("private data could not be converted: {0}")]
    PrivateData(#[from] serde_json::Error),
}

/// A store of terminal profiles.
pub trait TerminalBackend {
    /// Key of this backend's private namespace on a [`Profile`].
    fn id(&self) -> &'static str;

    fn list_profile_names(&self) -> Result<Vec<String>, BackendError>;

    fn profile_exists(&self, name: &str) -> Result<bool, BackendError>;

    /// Read the named profile, or the store's default profile for `None`.
    fn read_profile(&self, name: Option<&str>) -> Result<Profile, BackendError>;

    /// Create the profile if its name is new, otherwise update it in place.
    fn write_profile(&mut self, profile: &Profile) -> Result<(), BackendError>;
}
