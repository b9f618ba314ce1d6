//! cli::help
//!
//! Usage text, generated from the registry and each command's [`Usage`].
//!
//! Usage lines adapt to the mode: in the shell the `cblite` prefix and the
//! `DBPATH` argument are omitted, since the database is already open.

use super::args::Args;
use super::commands::Usage;
use super::registry::{self, Resolution};
use super::{GLOBAL_FLAG_HELP, HELP_KEYWORD};
use crate::session::{Interrupt, Outcome, Session};
use crate::ui::output::{bold, italic};

const QUIT_ABOUT: &str = "Close the database and exit the shell";

/// The `help [SUBCOMMAND]` pseudo-command.
pub fn help_command(session: &mut Session, args: &mut Args) -> Outcome {
    let interactive = session.is_interactive();
    let color = session.color();

    if !args.has_args() {
        let text = if interactive {
            shell_help(color)
        } else {
            full_usage(color)
        };
        session.print(text.join("\n"));
        return Ok(());
    }

    let name = args.next_arg("subcommand name")?;
    args.end_of_args()?;
    let lines = match registry::resolve(&name, interactive) {
        Resolution::Command(subcommand) => {
            describe(subcommand.name(), &subcommand.usage(), interactive, color, true)
        }
        Resolution::Quit => vec![bold("quit", color), format!("    {}", QUIT_ABOUT)],
        Resolution::Unknown if name == HELP_KEYWORD => vec![help_line(interactive, color)],
        Resolution::Unknown => {
            return Err(Interrupt::usage(format!("Unknown subcommand '{}'", name)));
        }
    };
    session.print(lines.join("\n"));
    Ok(())
}

/// Printed to stderr when the tool is run with no arguments.
pub fn missing_subcommand_banner(color: bool) -> Vec<String> {
    vec![
        format!(
            "{} {} {} {}",
            bold("Usage: cblite", color),
            italic("[GLOBAL FLAGS]", color),
            italic("SUBCOMMAND", color),
            italic("ARGS...", color)
        ),
        format!(
            "       {} {} {}   (interactive shell)",
            bold("cblite", color),
            italic("[GLOBAL FLAGS]", color),
            italic("DBPATH", color)
        ),
        format!("Run `{}` for the list of subcommands.", bold("cblite help", color)),
    ]
}

/// One usage line for a subcommand.
pub fn usage_line(name: &str, usage: &Usage, interactive: bool, color: bool) -> String {
    let mut parts = Vec::with_capacity(5);
    if !interactive {
        parts.push(bold("cblite", color));
    }
    parts.push(bold(name, color));
    if !usage.flags.is_empty() {
        parts.push(italic("[FLAGS]", color));
    }
    if usage.takes_db_path && !interactive {
        parts.push(italic("DBPATH", color));
    }
    let positional = usage.positional(interactive);
    if !positional.is_empty() {
        parts.push(italic(positional, color));
    }
    parts.join(" ")
}

fn describe(
    name: &str,
    usage: &Usage,
    interactive: bool,
    color: bool,
    with_flags: bool,
) -> Vec<String> {
    let mut lines = vec![
        format!("  {}", usage_line(name, usage, interactive, color)),
        format!("      {}", usage.about),
    ];
    if with_flags {
        lines.extend(flag_lines(usage.flags, "        "));
    }
    lines
}

fn flag_lines(flags: &[(&str, &str)], indent: &str) -> Vec<String> {
    let width = flags.iter().map(|(flag, _)| flag.len()).max().unwrap_or(0);
    flags
        .iter()
        .map(|(flag, about)| format!("{}{:<width$}  {}", indent, flag, about, width = width))
        .collect()
}

fn help_line(interactive: bool, color: bool) -> String {
    let prefix = if interactive { "" } else { "cblite " };
    format!(
        "  {} {}\n      List subcommands, or show one subcommand's flags",
        bold(format!("{}help", prefix), color),
        italic("[SUBCOMMAND]", color)
    )
}

fn full_usage(color: bool) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{} (v{}): inspect and edit document databases",
            bold("cblite", color),
            env!("CARGO_PKG_VERSION")
        ),
        String::new(),
    ];
    lines.extend(missing_subcommand_banner(color).into_iter().take(2));
    lines.push(String::new());
    lines.push(bold("Global flags (before the subcommand or DBPATH):", color));
    lines.extend(flag_lines(GLOBAL_FLAG_HELP, "  "));
    lines.push(String::new());
    lines.push(bold("Subcommands:", color));
    lines.extend(subcommand_lines(false, color, true));
    lines.push(help_line(false, color));
    lines
}

fn shell_help(color: bool) -> Vec<String> {
    let mut lines = vec![bold("Subcommands:", color)];
    lines.extend(subcommand_lines(true, color, false));
    lines.push(help_line(true, color));
    lines.push(format!("  {}\n      {}", bold("quit", color), QUIT_ABOUT));
    lines.push(format!(
        "Type `{}` for a subcommand's flags.",
        bold("help SUBCOMMAND", color)
    ));
    lines
}

fn subcommand_lines(interactive: bool, color: bool, with_flags: bool) -> Vec<String> {
    registry::names(interactive)
        .filter_map(|name| match registry::resolve(name, interactive) {
            Resolution::Command(subcommand) => Some(describe(
                name,
                &subcommand.usage(),
                interactive,
                color,
                with_flags,
            )),
            _ => None,
        })
        .flatten()
        .collect()
}
