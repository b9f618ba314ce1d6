//! cli::commands::revs
//!
//! Show a document's revision history, newest first.

use super::{Command, Usage};
use crate::cli::args::Args;
use crate::session::{Interrupt, Outcome, Session};

struct RevsCommand;

pub fn new_command() -> Box<dyn Command> {
    Box::new(RevsCommand)
}

impl Command for RevsCommand {
    fn usage(&self) -> Usage {
        Usage::on_database("List the revision history of a document", "DOCID")
    }

    fn run(&mut self, session: &mut Session, args: &mut Args) -> Outcome {
        session.open_database_from_next_arg(args)?;
        let id = args.next_arg("document ID")?;
        args.end_of_args()?;

        let lines: Vec<String> = {
            let doc = session
                .db()?
                .get(&id)
                .ok_or_else(|| Interrupt::failed(format!("Document `{}` not found", id)))?;
            let mut lines = vec![format!(
                "Document `{}`, sequence {}, updated {}{}:",
                id,
                doc.sequence,
                doc.updated.format("%Y-%m-%d %H:%M:%S UTC"),
                if doc.deleted { " (deleted)" } else { "" }
            )];
            lines.extend(doc.revs.iter().enumerate().map(|(i, rev)| {
                let marker = if i == 0 { '*' } else { ' ' };
                format!("  {} {}", marker, rev)
            }));
            lines
        };

        for line in lines {
            session.print(line);
        }
        Ok(())
    }
}
