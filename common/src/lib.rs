//! # Shared Models
//!
//! Everything the other crates agree on lives here: the session [`config`],
//! the scan [`target`], the [`protocol`] identifiers, the raw process
//! vocabulary ([`process`]), the typed [`events`] flowing from scanners to
//! consumers, and the capability traits for the outside world
//! ([`hosts`], [`credentials`], [`reporter`]).

pub mod config;
pub mod credentials;
pub mod error;
pub mod events;
pub mod hosts;
pub mod log;
pub mod process;
pub mod protocol;
pub mod reporter;
pub mod target;

pub use tracing;
