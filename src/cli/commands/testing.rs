//! Shared fixtures for subcommand tests.

use std::path::Path;

use serde_json::Value;
use tempfile::TempDir;

use super::Factory;
use crate::cli::args::Args;
use crate::session::{Outcome, Session};
use crate::store::{Engine, FileEngine, OpenConfig, OpenFlags, PutMode};
use crate::ui::{Scripted, Transcript};

/// Placeholder replaced by the fixture's database path.
pub const DB: &str = "@db";

pub struct Fixture {
    pub temp: TempDir,
    pub path: String,
}

impl Fixture {
    /// A database holding `docs`.
    pub fn with_docs(docs: &[(&str, Value)]) -> Self {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("test.cblite2");
        let mut db = FileEngine
            .open(&path, &OpenConfig::new(OpenFlags::CREATE))
            .unwrap();
        for (id, body) in docs {
            let body = body.as_object().cloned().unwrap();
            db.put(id, body, PutMode::Upsert).unwrap();
        }
        db.close().unwrap();
        Self {
            path: path.to_str().unwrap().to_string(),
            temp,
        }
    }

    pub fn empty() -> Self {
        Self::with_docs(&[])
    }

    /// Run a one-shot command; `DB` in `argv` stands for the database path.
    pub fn run(&self, factory: Factory, argv: &[&str]) -> (Outcome, Transcript) {
        let console = Scripted::new();
        let transcript = console.transcript();
        let mut session = Session::new(FileEngine, console);
        let outcome = self.run_in(&mut session, factory, argv);
        (outcome, transcript)
    }

    pub fn run_in(&self, session: &mut Session, factory: Factory, argv: &[&str]) -> Outcome {
        let mut args = Args::new(
            argv.iter()
                .map(|a| if *a == DB { self.path.as_str() } else { *a }),
        );
        let mut command = factory();
        command.run(session, &mut args)
    }

    /// Reopen the database read-only for inspection.
    pub fn reopen(&self) -> crate::store::Database {
        FileEngine
            .open(Path::new(&self.path), &OpenConfig::new(OpenFlags::READ_ONLY))
            .unwrap()
    }
}
