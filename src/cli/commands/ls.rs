//! cli::commands::ls
//!
//! List document IDs, optionally filtered by a glob pattern.
//!
//! The pattern is a glob: `*` matches any run of characters, `?` one
//! character, and `[...]` a character class.
//! Without `-l` only IDs are printed; with it each line carries the current
//! revision, sequence and body size.

use globset::{Glob, GlobMatcher};

use super::{Command, Usage};
use crate::cli::args::{Args, Flag};
use crate::session::{Interrupt, Outcome, Session};
use crate::store::Document;

const FLAGS: &[Flag<ListCommand>] = &[
    ("-l", |c, _| {
        c.long = true;
        Ok(())
    }),
    ("--offset", |c, args| {
        c.offset = args.next_number("offset value")?;
        Ok(())
    }),
    ("--limit", |c, args| {
        c.limit = Some(args.next_number("limit value")?);
        Ok(())
    }),
    ("--desc", |c, _| {
        c.descending = true;
        Ok(())
    }),
    ("--del", |c, _| {
        c.include_deleted = true;
        Ok(())
    }),
];

const FLAG_HELP: &[(&str, &str)] = &[
    ("-l", "Long format: revision, sequence and body size"),
    ("--offset N", "Skip the first N documents"),
    ("--limit N", "Stop after N documents"),
    ("--desc", "List in descending ID order"),
    ("--del", "Include deleted documents"),
];

#[derive(Debug, Default)]
struct ListCommand {
    long: bool,
    offset: usize,
    limit: Option<usize>,
    descending: bool,
    include_deleted: bool,
}

pub fn new_command() -> Box<dyn Command> {
    Box::new(ListCommand::default())
}

impl Command for ListCommand {
    fn usage(&self) -> Usage {
        Usage::on_database("List the IDs of documents in the database", "[PATTERN]")
            .with_flags(FLAG_HELP)
    }

    fn run(&mut self, session: &mut Session, args: &mut Args) -> Outcome {
        args.process_flags(self, FLAGS)?;
        session.open_database_from_next_arg(args)?;
        let pattern = if args.has_args() {
            Some(args.next_arg("ID pattern")?)
        } else {
            None
        };
        args.end_of_args()?;
        let matcher = pattern.as_deref().map(compile_pattern).transpose()?;

        let (lines, truncated) = {
            let db = session.db()?;
            let docs: Box<dyn Iterator<Item = (&str, &Document)> + '_> = if self.descending {
                Box::new(db.documents().rev())
            } else {
                Box::new(db.documents())
            };
            let mut matching = docs
                .filter(|(_, doc)| self.include_deleted || !doc.deleted)
                .filter(|(id, _)| matcher.as_ref().map_or(true, |m| m.is_match(id)))
                .skip(self.offset);

            let mut lines = Vec::new();
            let mut truncated = false;
            loop {
                if self.limit.is_some_and(|limit| lines.len() >= limit) {
                    truncated = matching.next().is_some();
                    break;
                }
                match matching.next() {
                    Some((id, doc)) => lines.push(self.format(id, doc)),
                    None => break,
                }
            }
            (lines, truncated)
        };

        if lines.is_empty() {
            match &pattern {
                Some(p) => session.print(format!("(No documents with IDs matching \"{}\")", p)),
                None => session.print("(No documents)"),
            }
            return Ok(());
        }
        let count = lines.len();
        for line in lines {
            session.print(line);
        }
        if truncated {
            session.print(format!("(Stopping after {} documents)", count));
        }
        Ok(())
    }
}

impl ListCommand {
    fn format(&self, id: &str, doc: &Document) -> String {
        if !self.long {
            return id.to_string();
        }
        let size = serde_json::to_string(&doc.body).map_or(0, |s| s.len());
        format!(
            "{:<24} {:<40} seq {:>5}  {:>7} bytes{}",
            id,
            doc.rev_id(),
            doc.sequence,
            size,
            if doc.deleted { "  (deleted)" } else { "" }
        )
    }
}

/// Compile an ID pattern. A malformed pattern is a usage error.
fn compile_pattern(pattern: &str) -> Outcome<GlobMatcher> {
    Glob::new(pattern)
        .map(|glob| glob.compile_matcher())
        .map_err(|e| Interrupt::usage(format!("Invalid ID pattern '{}': {}", pattern, e.kind())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::testing::{Fixture, DB};
    use crate::store::{Engine, FileEngine, OpenConfig, OpenFlags};
    use serde_json::json;
    use std::path::Path;

    fn fixture() -> Fixture {
        Fixture::with_docs(&[
            ("apple", json!({"k": 1})),
            ("apricot", json!({"k": 2})),
            ("banana", json!({"k": 3})),
            ("cherry", json!({"k": 4})),
        ])
    }

    fn id_matches(pattern: &str, id: &str) -> bool {
        compile_pattern(pattern).unwrap().is_match(id)
    }

    #[test]
    fn glob_patterns() {
        assert!(id_matches("*", ""));
        assert!(id_matches("ap*", "apple"));
        assert!(id_matches("*an*", "banana"));
        assert!(id_matches("a?ple", "apple"));
        assert!(!id_matches("a?ple", "aple"));
        assert!(!id_matches("ap*", "banana"));
        assert!(id_matches("*a", "banana"));
        assert!(!id_matches("cherry", "cherry2"));
        assert!(id_matches("user/*", "user/42"));
        assert!(id_matches("[ab]*", "banana"));
    }

    #[test]
    fn malformed_pattern_is_a_usage_error() {
        assert!(matches!(
            compile_pattern("doc["),
            Err(crate::session::Interrupt::Usage(_))
        ));

        let f = fixture();
        let (outcome, transcript) = f.run(new_command, &[DB, "a[b"]);
        assert!(matches!(outcome, Err(crate::session::Interrupt::Usage(m)) if m.contains("a[b")));
        assert!(transcript.out().is_empty());
    }

    #[test]
    fn lists_all_ids_in_order() {
        let f = fixture();
        let (outcome, transcript) = f.run(new_command, &[DB]);
        outcome.unwrap();
        assert_eq!(transcript.out(), vec!["apple", "apricot", "banana", "cherry"]);
    }

    #[test]
    fn pattern_offset_and_limit() {
        let f = fixture();
        let (outcome, transcript) = f.run(new_command, &["--limit", "1", DB, "ap*"]);
        outcome.unwrap();
        assert_eq!(
            transcript.out(),
            vec!["apple", "(Stopping after 1 documents)"]
        );

        let (outcome, transcript) = f.run(new_command, &["--desc", "--offset", "1", DB]);
        outcome.unwrap();
        assert_eq!(transcript.out(), vec!["banana", "apricot", "apple"]);
    }

    #[test]
    fn deleted_documents_only_with_del() {
        let f = fixture();
        {
            let mut db = FileEngine
                .open(Path::new(&f.path), &OpenConfig::new(OpenFlags::NONE))
                .unwrap();
            db.delete("banana").unwrap();
        }
        let (_, transcript) = f.run(new_command, &[DB, "b*"]);
        assert_eq!(transcript.out(), vec![r#"(No documents with IDs matching "b*")"#]);

        let (_, transcript) = f.run(new_command, &["--del", "-l", DB, "b*"]);
        let out = transcript.out();
        assert_eq!(out.len(), 1);
        assert!(out[0].starts_with("banana"));
        assert!(out[0].ends_with("(deleted)"));
    }

    #[test]
    fn empty_database() {
        let f = Fixture::empty();
        let (outcome, transcript) = f.run(new_command, &[DB]);
        outcome.unwrap();
        assert_eq!(transcript.out(), vec!["(No documents)"]);
    }

    #[test]
    fn trailing_arguments_are_rejected() {
        let f = fixture();
        let (outcome, _) = f.run(new_command, &[DB, "a*", "extra"]);
        assert!(matches!(outcome, Err(crate::session::Interrupt::Usage(_))));
    }
}
