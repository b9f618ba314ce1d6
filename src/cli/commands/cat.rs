//! cli::commands::cat
//!
//! Print documents as JSON.

use super::{document_json, Command, Usage};
use crate::cli::args::{Args, Flag};
use crate::session::{Interrupt, Outcome, Session};

const FLAGS: &[Flag<CatCommand>] = &[
    ("--raw", |c, _| {
        c.raw = true;
        Ok(())
    }),
    ("--pretty", |c, _| {
        c.pretty = true;
        Ok(())
    }),
];

const FLAG_HELP: &[(&str, &str)] = &[
    ("--raw", "Print only the body, without _id and _rev"),
    ("--pretty", "Indent the JSON"),
];

#[derive(Debug, Default)]
struct CatCommand {
    raw: bool,
    pretty: bool,
}

pub fn new_command() -> Box<dyn Command> {
    Box::new(CatCommand::default())
}

impl Command for CatCommand {
    fn usage(&self) -> Usage {
        Usage::on_database("Display the body of one or more documents", "DOCID [DOCID...]")
            .with_flags(FLAG_HELP)
    }

    fn run(&mut self, session: &mut Session, args: &mut Args) -> Outcome {
        args.process_flags(self, FLAGS)?;
        session.open_database_from_next_arg(args)?;
        let mut ids = vec![args.next_arg("document ID")?];
        while args.has_args() {
            ids.push(args.next_arg("document ID")?);
        }

        let db = session.db()?;
        let mut lines = Vec::with_capacity(ids.len());
        let mut missing = Vec::new();
        for id in &ids {
            match db.get(id).filter(|doc| !doc.deleted) {
                Some(doc) => {
                    let value = if self.raw {
                        serde_json::Value::Object(doc.body.clone())
                    } else {
                        document_json(id, doc)
                    };
                    let text = if self.pretty {
                        serde_json::to_string_pretty(&value)
                    } else {
                        serde_json::to_string(&value)
                    }
                    .map_err(anyhow::Error::from)?;
                    lines.push(text);
                }
                None => missing.push(id.as_str()),
            }
        }

        for line in lines {
            session.print(line);
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Interrupt::failed(format!(
                "Document not found: {}",
                missing.join(", ")
            )))
        }
    }
}
