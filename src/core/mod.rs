//! core
//!
//! Process-wide settings shared by every layer.
//!
//! # Modules
//!
//! - [`config`] - Configuration schema and loading

pub mod config;
