//! Firefox add-on test harness.
//!
//! Three loosely coupled pieces, composed by a test driver:
//! - [`browser`] launches Firefox under test and drives its windows through
//!   an external automation tool (`xdotool`).
//! - [`profile`] materializes a disposable profile whose network is
//!   dead-ended into an unreachable proxy and whose add-on under test is
//!   pre-enabled, behind a scoped `$HOME` redirection.
//! - [`fixture`] serves a single static page over HTTPS from a background
//!   thread and signals when the browser actually fetched it.

pub mod browser;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod fixture;
pub mod profile;

pub use error::{FoxtrapError, Result};
