//! cli::commands::put
//!
//! Create or update a document from a JSON argument.

use super::{parse_json_object, Command, Usage};
use crate::cli::args::{Args, Flag};
use crate::session::{Interrupt, Outcome, Session};
use crate::store::PutMode;

const FLAGS: &[Flag<PutCommand>] = &[
    ("--create", |c, _| {
        c.mode = PutMode::CreateOnly;
        Ok(())
    }),
    ("--update", |c, _| {
        c.mode = PutMode::UpdateOnly;
        Ok(())
    }),
];

const FLAG_HELP: &[(&str, &str)] = &[
    ("--create", "Fail if the document already exists"),
    ("--update", "Fail if the document doesn't exist"),
];

#[derive(Debug)]
struct PutCommand {
    mode: PutMode,
}

pub fn new_command() -> Box<dyn Command> {
    Box::new(PutCommand {
        mode: PutMode::Upsert,
    })
}

impl Command for PutCommand {
    fn usage(&self) -> Usage {
        Usage::on_database("Create or modify a document", "DOCID \"JSON\"").with_flags(FLAG_HELP)
    }

    fn run(&mut self, session: &mut Session, args: &mut Args) -> Outcome {
        args.process_flags(self, FLAGS)?;
        session.open_writeable_database_from_next_arg(args)?;
        let id = args.next_arg("document ID")?;
        let json = args.next_arg("document body as JSON")?;
        args.end_of_args()?;

        let body = parse_json_object(&json, "document body")?;
        let existed = session
            .db()?
            .get(&id)
            .is_some_and(|doc| !doc.deleted);
        let rev = session
            .db_mut()?
            .put(&id, body, self.mode)
            .map_err(|e| Interrupt::failed_with("Couldn't save document", e))?;

        let verb = if existed { "Updated" } else { "Created" };
        session.print(format!("{} `{}` as revision {}", verb, id, rev));
        Ok(())
    }
}
