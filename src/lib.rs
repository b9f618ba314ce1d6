//! cblite - a multi-tool and interactive shell for embedded document databases
//!
//! `cblite` inspects and edits `.cblite2` databases, either one subcommand
//! per process (`cblite ls mydata.cblite2`) or through an interactive shell
//! bound to one open database (`cblite mydata.cblite2`).
//!
//! # Architecture
//!
//! - [`cli`] - Argument cursor, subcommand registry, dispatcher and shell
//! - [`session`] - Run-scoped state: the open database, open flags, mode
//! - [`store`] - The bundled document store behind the [`store::Engine`] seam
//! - [`core`] - Configuration
//! - [`ui`] - Console abstraction and output styling
//!
//! # Invariants
//!
//! 1. At most one database is open per session
//! 2. Open flags are fixed before the first open attempt
//! 3. In the shell, a failing line never ends the session; only fatal errors do
//! 4. Every failure is reported exactly once, by the boundary that catches it

pub mod cli;
pub mod core;
pub mod session;
pub mod store;
pub mod ui;
