//! cblite binary entry point.

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use cblite::cli::{self, args::Args};
use cblite::core::config::Config;
use cblite::session::Session;
use cblite::store::FileEngine;
use cblite::ui::{output, Terminal};

/// Environment variable holding a tracing filter directive.
const LOG_ENV: &str = "CBLITE_LOG";

fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", output::error(e, false));
            return ExitCode::FAILURE;
        }
    };
    init_logging(config.log_level());

    let mut session = Session::new(FileEngine, Terminal::new()).with_config(config);
    let args = Args::new(std::env::args().skip(1));

    match cli::run(&mut session, args) {
        Ok(status) => status.into(),
        Err(e) => {
            eprintln!("{}", output::error(format!("{:#}", e), session.color()));
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr. `CBLITE_LOG` wins over the config file; the default
/// shows warnings only.
fn init_logging(config_level: Option<&str>) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(config_level.unwrap_or("warn")))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
