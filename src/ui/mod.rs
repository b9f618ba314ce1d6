//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`console`] - The [`Console`] trait plus terminal and scripted implementations
//! - [`output`] - Output formatting and styling
//!
//! # Design
//!
//! All output and prompts go through this module so that interactive and
//! one-shot runs, and tests, format messages the same way.

pub mod console;
pub mod output;

pub use console::{Console, Scripted, Terminal, Transcript};
