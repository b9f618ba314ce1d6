//! cli::commands::compact

use super::{Command, Usage};
use crate::cli::args::Args;
use crate::session::{Interrupt, Outcome, Session};

struct CompactCommand;

pub fn new_command() -> Box<dyn Command> {
    Box::new(CompactCommand)
}

impl Command for CompactCommand {
    fn usage(&self) -> Usage {
        Usage::on_database(
            "Purge deleted documents and old revisions, then rewrite the file",
            "",
        )
    }

    fn run(&mut self, session: &mut Session, args: &mut Args) -> Outcome {
        session.open_writeable_database_from_next_arg(args)?;
        args.end_of_args()?;

        let db = session.db_mut()?;
        let before = db.size_on_disk();
        let stats = db
            .compact()
            .map_err(|e| Interrupt::failed_with("Couldn't compact database", e))?;
        let after = db.size_on_disk();

        session.print(format!(
            "Compacted: purged {} deleted documents, pruned {} old revisions ({} -> {} bytes)",
            stats.purged_documents, stats.pruned_revisions, before, after
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::testing::{Fixture, DB};
    use crate::store::{Engine, FileEngine, OpenConfig, OpenFlags, PutMode};
    use serde_json::json;
    use std::path::Path;

    #[test]
    fn purges_tombstones_and_history() {
        let f = Fixture::with_docs(&[("keep", json!({"v": 1})), ("gone", json!({}))]);
        {
            let mut db = FileEngine
                .open(Path::new(&f.path), &OpenConfig::new(OpenFlags::NONE))
                .unwrap();
            let body = json!({"v": 2}).as_object().cloned().unwrap();
            db.put("keep", body, PutMode::Upsert).unwrap();
            db.delete("gone").unwrap();
        }

        let (outcome, transcript) = f.run(new_command, &[DB]);
        outcome.unwrap();
        assert!(transcript.out()[0]
            .starts_with("Compacted: purged 1 deleted documents, pruned 1 old revisions"));

        let db = f.reopen();
        assert!(db.get("gone").is_none());
        assert_eq!(db.get("keep").unwrap().revs.len(), 1);
    }
}
