//! cli::commands::query
//!
//! Find documents whose properties equal the values in a JSON template.
//!
//! Keys of the template are property paths; `a.b` descends into nested
//! objects. A document matches when every path resolves to an equal value.

use serde_json::{Map, Value};

use super::{document_json, parse_json_object, Command, Usage};
use crate::cli::args::{Args, Flag};
use crate::session::{Outcome, Session};

const FLAGS: &[Flag<QueryCommand>] = &[
    ("--offset", |c, args| {
        c.offset = args.next_number("offset value")?;
        Ok(())
    }),
    ("--limit", |c, args| {
        c.limit = Some(args.next_number("limit value")?);
        Ok(())
    }),
];

const FLAG_HELP: &[(&str, &str)] = &[
    ("--offset N", "Skip the first N results"),
    ("--limit N", "Stop after N results"),
];

#[derive(Debug, Default)]
struct QueryCommand {
    offset: usize,
    limit: Option<usize>,
}

pub fn new_command() -> Box<dyn Command> {
    Box::new(QueryCommand::default())
}

impl Command for QueryCommand {
    fn usage(&self) -> Usage {
        Usage::on_database(
            "Print documents whose properties match a JSON template",
            "'{\"PROPERTY\": VALUE, ...}'",
        )
        .with_flags(FLAG_HELP)
    }

    fn run(&mut self, session: &mut Session, args: &mut Args) -> Outcome {
        args.process_flags(self, FLAGS)?;
        session.open_database_from_next_arg(args)?;
        let template = parse_json_object(&args.next_arg("query template")?, "query")?;
        args.end_of_args()?;

        let lines: Vec<String> = session
            .db()?
            .documents()
            .filter(|(_, doc)| !doc.deleted && matches(&doc.body, &template))
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .map(|(id, doc)| document_json(id, doc).to_string())
            .collect();

        let count = lines.len();
        for line in lines {
            session.print(line);
        }
        session.print(format!(
            "({} {})",
            count,
            if count == 1 { "result" } else { "results" }
        ));
        Ok(())
    }
}

fn matches(body: &Map<String, Value>, template: &Map<String, Value>) -> bool {
    template
        .iter()
        .all(|(path, expected)| lookup_path(body, path) == Some(expected))
}

fn lookup_path<'a>(body: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let first = body.get(parts.next()?)?;
    parts.try_fold(first, |value, key| value.as_object()?.get(key))
}
