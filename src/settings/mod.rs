//! Configuration loading and resolution.
//!
//! `load` layers configuration files and environment variables with the
//! `config` crate, applies command-line overrides and returns the
//! [`ResolvedConfig`] the workflows run with.

mod loader;
mod raw;
mod resolved;
mod sources;

pub use loader::load;
pub use resolved::ResolvedConfig;
