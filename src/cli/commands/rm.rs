//! cli::commands::rm

use super::{Command, Usage};
use crate::cli::args::Args;
use crate::session::{Interrupt, Outcome, Session};

struct RemoveCommand;

pub fn new_command() -> Box<dyn Command> {
    Box::new(RemoveCommand)
}

impl Command for RemoveCommand {
    fn usage(&self) -> Usage {
        Usage::on_database("Delete a document", "DOCID")
    }

    fn run(&mut self, session: &mut Session, args: &mut Args) -> Outcome {
        session.open_writeable_database_from_next_arg(args)?;
        let id = args.next_arg("document ID")?;
        args.end_of_args()?;

        let rev = session
            .db_mut()?
            .delete(&id)
            .map_err(|e| Interrupt::failed_with("Couldn't delete document", e))?;
        session.print(format!("Deleted `{}`; tombstone revision is {}", id, rev));
        Ok(())
    }
}
