//! cli::commands::serve
//!
//! Serve the database read-only over a line-oriented TCP protocol until
//! Ctrl-C. Only available as a one-shot subcommand.
//!
//! # Protocol
//!
//! Each request is one line; each reply is one line of JSON.
//!
//! | Request | Reply |
//! |---|---|
//! | `INFO` | `{"documents": N, "sequence": N, "uuid": "..."}` |
//! | `LIST` | array of live document IDs |
//! | `GET DOCID` | the document with `_id` and `_rev`, or `{"error": "not_found"}` |
//!
//! Anything else gets `{"error": "bad_request"}`. Clients are handled one at
//! a time on a current-thread runtime.

use anyhow::Context as _;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use super::{document_json, Command, Usage};
use crate::cli::args::{Args, Flag};
use crate::session::{Interrupt, Outcome, Session};
use crate::store::Database;

const FLAGS: &[Flag<ServeCommand>] = &[
    ("--port", |c, args| {
        c.port = Some(args.next_number("port number")?);
        Ok(())
    }),
    ("--host", |c, args| {
        c.host = args.next_arg("host address")?;
        Ok(())
    }),
];

const FLAG_HELP: &[(&str, &str)] = &[
    ("--port N", "TCP port to listen on (default from config, else 59840)"),
    ("--host ADDR", "Address to bind (default 127.0.0.1)"),
];

#[derive(Debug)]
struct ServeCommand {
    port: Option<u16>,
    host: String,
}

pub fn new_command() -> Box<dyn Command> {
    Box::new(ServeCommand {
        port: None,
        host: "127.0.0.1".into(),
    })
}

impl Command for ServeCommand {
    fn usage(&self) -> Usage {
        Usage::on_database("Serve documents read-only over TCP until Ctrl-C", "")
            .with_flags(FLAG_HELP)
    }

    fn run(&mut self, session: &mut Session, args: &mut Args) -> Outcome {
        args.process_flags(self, FLAGS)?;
        session.open_database_from_next_arg(args)?;
        args.end_of_args()?;

        let port = self.port.unwrap_or_else(|| session.config().serve_port());
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("couldn't start async runtime")?;

        let listener = runtime
            .block_on(TcpListener::bind((self.host.as_str(), port)))
            .map_err(|e| {
                Interrupt::failed_with(format!("Couldn't listen on {}:{}", self.host, port), e)
            })?;
        let address = listener.local_addr().context("couldn't read listen address")?;
        session.print(format!(
            "Serving {} on {}; press Ctrl-C to stop",
            session.db()?.path().display(),
            address
        ));

        let served = runtime.block_on(serve(session.db()?, listener))?;
        session.print(format!("Stopped after {} connections", served));
        Ok(())
    }
}

/// Accept clients until Ctrl-C. Returns the number of connections handled.
async fn serve(db: &Database, listener: TcpListener) -> anyhow::Result<usize> {
    let mut served = 0;
    loop {
        let (stream, peer) = tokio::select! {
            _ = tokio::signal::ctrl_c() => return Ok(served),
            accepted = listener.accept() => accepted.context("accept failed")?,
        };
        debug!(%peer, "client connected");
        served += 1;
        tokio::select! {
            _ = tokio::signal::ctrl_c() => return Ok(served),
            result = handle_client(db, stream) => {
                if let Err(e) = result {
                    warn!(%peer, error = %e, "client connection failed");
                }
            }
        }
        info!(%peer, "client disconnected");
    }
}

async fn handle_client(db: &Database, mut stream: TcpStream) -> std::io::Result<()> {
    let (reader, mut writer) = stream.split();
    let mut lines = BufReader::new(reader).lines();
    while let Some(line) = lines.next_line().await? {
        let mut reply = respond(db, line.trim()).to_string();
        reply.push('\n');
        writer.write_all(reply.as_bytes()).await?;
    }
    Ok(())
}

/// Answer one protocol request.
fn respond(db: &Database, request: &str) -> Value {
    let (verb, operand) = match request.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (request, ""),
    };
    match (verb, operand) {
        ("INFO", "") => json!({
            "documents": db.document_count(),
            "sequence": db.last_sequence(),
            "uuid": db.uuid().to_string(),
        }),
        ("LIST", "") => Value::Array(
            db.documents()
                .filter(|(_, doc)| !doc.deleted)
                .map(|(id, _)| Value::String(id.to_string()))
                .collect(),
        ),
        ("GET", id) if !id.is_empty() => match db.get(id).filter(|doc| !doc.deleted) {
            Some(doc) => document_json(id, doc),
            None => json!({"error": "not_found"}),
        },
        _ => json!({"error": "bad_request"}),
    }
}
