//! Registrar - course registration CLI
//!
//! Drives the registrar-core services over a `SQLite` store and prints a
//! JSON envelope for every command.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod json;
pub mod logging;

pub use config::{Config, ConfigError};
pub use db::SqliteStore;
pub use error::{CliError, Result};
