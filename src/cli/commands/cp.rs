//! cli::commands::cp
//!
//! Copy documents between a database and another database or a JSON-lines
//! file. Registered as `cp` (direction inferred from which endpoint is a
//! database), `export` (database to file) and `import` (file to database).
//!
//! # File format
//!
//! One JSON object per line. On export each object carries its ID in `_id`.
//! On import the ID is taken from the `--jsonid` property (default `_id`) and
//! removed from the body; objects without one get a random UUID.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use super::{body_properties, Command, Usage};
use crate::cli::args::{Args, Flag};
use crate::session::{fix_up_path, Interrupt, Outcome, Session};
use crate::store::{is_database_path, Database, OpenConfig, OpenFlags, PutMode};

const JSON_EXTENSION: &str = ".json";

const FLAGS: &[Flag<CopyCommand>] = &[
    ("--existing", |c, _| {
        c.existing = true;
        Ok(())
    }),
    ("--jsonid", |c, args| {
        c.json_id = args.next_arg("JSON property name")?;
        Ok(())
    }),
    ("--careful", |c, _| {
        c.careful = true;
        Ok(())
    }),
];

const FLAG_HELP: &[(&str, &str)] = &[
    ("--existing", "Don't create the destination database if it doesn't exist"),
    ("--jsonid PROPERTY", "Property holding the document ID on import (default _id)"),
    ("--careful", "Stop at the first bad line instead of skipping it"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Either,
    Export,
    Import,
}

#[derive(Debug)]
struct CopyCommand {
    direction: Direction,
    existing: bool,
    careful: bool,
    json_id: String,
}

impl CopyCommand {
    fn new(direction: Direction) -> Self {
        Self {
            direction,
            existing: false,
            careful: false,
            json_id: "_id".into(),
        }
    }
}

pub fn new_copy_command() -> Box<dyn Command> {
    Box::new(CopyCommand::new(Direction::Either))
}

pub fn new_export_command() -> Box<dyn Command> {
    Box::new(CopyCommand::new(Direction::Export))
}

pub fn new_import_command() -> Box<dyn Command> {
    Box::new(CopyCommand::new(Direction::Import))
}

/// Where documents go, relative to the session database.
enum Plan {
    ExportTo(String),
    ImportFrom(String),
}

impl Command for CopyCommand {
    fn usage(&self) -> Usage {
        let mut usage = match self.direction {
            Direction::Either => Usage {
                about: "Copy documents between a database and a database or JSON file",
                takes_db_path: false,
                args: "SOURCE DESTINATION",
                shell_args: Some("DESTINATION"),
                flags: &[],
            },
            Direction::Export => {
                Usage::on_database("Write all documents to a JSON-lines file", "FILE.json")
            }
            Direction::Import => Usage {
                about: "Read documents from a JSON-lines file or another database",
                takes_db_path: false,
                args: "SOURCE DBPATH",
                shell_args: Some("SOURCE"),
                flags: &[],
            },
        };
        usage.flags = FLAG_HELP;
        usage
    }

    fn run(&mut self, session: &mut Session, args: &mut Args) -> Outcome {
        args.process_flags(self, FLAGS)?;
        let plan = self.plan(session, args)?;
        args.end_of_args()?;

        match plan {
            Plan::ExportTo(dst) => self.export(session, &dst),
            Plan::ImportFrom(src) => self.import(session, &src),
        }
    }
}

impl CopyCommand {
    /// Consume the endpoint arguments and open the session database.
    fn plan(&self, session: &mut Session, args: &mut Args) -> Outcome<Plan> {
        if session.has_database() {
            return Ok(match self.direction {
                Direction::Import => {
                    session.open_writeable_database_from_next_arg(args)?;
                    Plan::ImportFrom(args.next_arg("source path")?)
                }
                _ => Plan::ExportTo(args.next_arg("destination path")?),
            });
        }

        match self.direction {
            Direction::Export => {
                session.open_database_from_next_arg(args)?;
                Ok(Plan::ExportTo(args.next_arg("destination path")?))
            }
            Direction::Import => {
                let src = args.next_arg("source path")?;
                if !self.existing {
                    session.enable_create();
                }
                session.open_writeable_database_from_next_arg(args)?;
                Ok(Plan::ImportFrom(src))
            }
            Direction::Either => {
                let src = args.next_arg("source path")?;
                let dst = args.next_arg("destination path")?;
                if is_database_path(&src) {
                    session.open_database(&src)?;
                    Ok(Plan::ExportTo(dst))
                } else if is_database_path(&dst) {
                    if self.existing {
                        session.enable_writes();
                    } else {
                        session.enable_create();
                    }
                    session.open_database(&dst)?;
                    Ok(Plan::ImportFrom(src))
                } else {
                    Err(Interrupt::usage(
                        "One of SOURCE or DESTINATION must be a database path",
                    ))
                }
            }
        }
    }

    fn export(&self, session: &mut Session, dst: &str) -> Outcome {
        let message = if is_database_path(dst) {
            let mut flags = OpenFlags::NONE;
            if !self.existing {
                flags.insert(OpenFlags::CREATE);
            }
            let mut target = open_other(session, dst, flags)?;
            let count = copy_documents(session.db()?, &mut target)?;
            target
                .close()
                .map_err(|e| Interrupt::failed_with("Couldn't close destination", e))?;
            format!("Copied {} documents to {}", count, dst)
        } else if dst.ends_with(JSON_EXTENSION) {
            let count = write_json_lines(session.db()?, &fix_up_path(dst))?;
            format!("Exported {} documents to {}", count, dst)
        } else {
            return Err(Interrupt::usage(format!(
                "Destination must be a database or a {} file",
                JSON_EXTENSION
            )));
        };
        info!(destination = dst, "export finished");
        session.print(message);
        Ok(())
    }

    fn import(&self, session: &mut Session, src: &str) -> Outcome {
        let count = if is_database_path(src) {
            let source = open_other(session, src, OpenFlags::READ_ONLY)?;
            copy_documents(&source, session.db_mut()?)?
        } else {
            let (count, skipped) = self.read_json_lines(session.db_mut()?, &fix_up_path(src))?;
            if skipped > 0 {
                session.warn(format!("Skipped {} invalid lines", skipped));
            }
            count
        };
        info!(source = src, count, "import finished");
        session.print(format!("Imported {} documents from {}", count, src));
        Ok(())
    }

    /// Returns (imported, skipped).
    fn read_json_lines(&self, db: &mut Database, path: &Path) -> Outcome<(usize, usize)> {
        let file = File::open(path)
            .map_err(|e| Interrupt::failed_with(format!("Couldn't open {}", path.display()), e))?;
        let (mut count, mut skipped) = (0, 0);

        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line
                .map_err(|e| Interrupt::failed_with(format!("Couldn't read {}", path.display()), e))?;
            if line.trim().is_empty() {
                continue;
            }
            let mut body = match serde_json::from_str::<Value>(&line) {
                Ok(Value::Object(body)) => body,
                Ok(_) | Err(_) if !self.careful => {
                    debug!(line = index + 1, "skipping line that isn't a JSON object");
                    skipped += 1;
                    continue;
                }
                _ => {
                    return Err(Interrupt::failed(format!(
                        "Line {} of {} is not a JSON object",
                        index + 1,
                        path.display()
                    )));
                }
            };
            let id = match body.remove(&self.json_id) {
                Some(Value::String(id)) => id,
                Some(other) => other.to_string(),
                None => uuid::Uuid::new_v4().to_string(),
            };
            db.put(&id, body, PutMode::Upsert)
                .map_err(|e| Interrupt::failed_with(format!("Couldn't save `{}`", id), e))?;
            count += 1;
        }
        Ok((count, skipped))
    }
}

fn open_other(session: &Session, path: &str, flags: OpenFlags) -> Outcome<Database> {
    let path: PathBuf = fix_up_path(path);
    session
        .engine()
        .open(&path, &OpenConfig::new(flags))
        .map_err(|e| Interrupt::failed_with(format!("Couldn't open database {}", path.display()), e))
}

fn copy_documents(source: &Database, target: &mut Database) -> Outcome<usize> {
    let mut count = 0;
    for (id, doc) in source.documents().filter(|(_, doc)| !doc.deleted) {
        target
            .put(id, doc.body.clone(), PutMode::Upsert)
            .map_err(|e| Interrupt::failed_with(format!("Couldn't copy `{}`", id), e))?;
        count += 1;
    }
    Ok(count)
}

fn write_json_lines(db: &Database, path: &Path) -> Outcome<usize> {
    let write_err = |e: std::io::Error| {
        Interrupt::failed_with(format!("Couldn't write {}", path.display()), e)
    };
    let mut out = BufWriter::new(fs::File::create(path).map_err(write_err)?);
    let mut count = 0;
    for (id, doc) in db.documents().filter(|(_, doc)| !doc.deleted) {
        let mut object = serde_json::Map::with_capacity(doc.body.len() + 1);
        object.insert("_id".into(), Value::String(id.to_string()));
        object.extend(body_properties(&doc.body));
        writeln!(out, "{}", Value::Object(object)).map_err(write_err)?;
        count += 1;
    }
    out.flush().map_err(write_err)?;
    Ok(count)
}
