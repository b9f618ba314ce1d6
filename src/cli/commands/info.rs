//! cli::commands::info
//!
//! Summary of the open database. Registered as both `info` and `file`.

use super::{Command, Usage};
use crate::cli::args::Args;
use crate::session::{Outcome, Session};
use crate::ui::output;

struct InfoCommand;

pub fn new_command() -> Box<dyn Command> {
    Box::new(InfoCommand)
}

impl Command for InfoCommand {
    fn usage(&self) -> Usage {
        Usage::on_database("Show information about the database", "")
    }

    fn run(&mut self, session: &mut Session, args: &mut Args) -> Outcome {
        session.open_database_from_next_arg(args)?;
        args.end_of_args()?;

        let color = session.color();
        let db = session.db()?;
        let rows = [
            ("Database", db.path().display().to_string()),
            ("Size", format!("{} bytes", db.size_on_disk())),
            ("Documents", db.document_count().to_string()),
            ("Last sequence", db.last_sequence().to_string()),
            ("UUID", db.uuid().to_string()),
            ("Encrypted", if db.is_encrypted() { "yes" } else { "no" }.to_string()),
            (
                "Access",
                if db.is_read_only() { "read-only" } else { "writeable" }.to_string(),
            ),
        ];
        let lines: Vec<String> = rows
            .iter()
            .map(|(label, value)| {
                let label = format!("{:<15}", format!("{}:", label));
                format!("{}{}", output::bold(label, color), value)
            })
            .collect();

        for line in lines {
            session.print(line);
        }
        Ok(())
    }
}
