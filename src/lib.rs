//! Core crate exports for converting terminal color themes.
//!
//! A [`Profile`] is the neutral in-memory form of a theme. It is read from or
//! written to a live terminal configuration through a
//! [`backend::TerminalBackend`], and to a portable zip archive through a
//! [`ThemeFile`], whose `theme.ini` carries one section per [`schema`]
//! version.

pub mod app_dirs;
pub mod backend;
pub mod charset;
pub mod color;
pub mod logging;
pub mod profile;
pub mod schema;
pub mod theme_file;

pub use backend::{BackendError, BackendRegistry, TerminalBackend};
pub use color::{Color, ColorError};
pub use profile::{PROFILE_KEYS, Profile, ProfileError, Value};
pub use schema::SchemaError;
pub use theme_file::{ThemeFile, ThemeFileError};
