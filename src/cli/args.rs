//! cli::args
//!
//! The argument cursor and flag processor shared by the dispatcher and every
//! subcommand.
//!
//! # Design
//!
//! [`Args`] is an ordered list of tokens plus a read position that only moves
//! forward. Flag tables map literal tokens to plain function pointers that
//! receive the caller's state and the cursor, so a flag that takes a value
//! can consume it:
//!
//! ```
//! use cblite::cli::args::{Args, Flag};
//! use cblite::session::Outcome;
//!
//! #[derive(Default)]
//! struct Listing {
//!     long: bool,
//!     limit: Option<usize>,
//! }
//!
//! let flags: &[Flag<Listing>] = &[
//!     ("-l", |l, _| {
//!         l.long = true;
//!         Ok(())
//!     }),
//!     ("--limit", |l, args| {
//!         l.limit = Some(args.next_number("limit value")?);
//!         Ok(())
//!     }),
//! ];
//!
//! let mut args = Args::new(["-l", "--limit", "5", "db.cblite2"]);
//! let mut listing = Listing::default();
//! args.process_flags(&mut listing, flags).unwrap();
//! assert!(listing.long);
//! assert_eq!(listing.limit, Some(5));
//! assert_eq!(args.peek(), Some("db.cblite2"));
//! ```
//!
//! Matching is exact and case-sensitive, with no prefix matching. When two
//! entries share a key only the first is reachable.

use std::str::FromStr;

use crate::session::{Interrupt, Outcome};

/// Action bound to a flag.
pub type FlagAction<T> = fn(&mut T, &mut Args) -> Outcome;

/// One entry of a flag table.
pub type Flag<T> = (&'static str, FlagAction<T>);

/// Ordered command-line tokens with a forward-only read position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    tokens: Vec<String>,
    pos: usize,
}

impl Args {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
            pos: 0,
        }
    }

    /// Tokenize a line typed at the shell prompt.
    ///
    /// Whitespace separates tokens; single and double quotes group, and a
    /// backslash escapes the next character outside single quotes.
    ///
    /// # Errors
    ///
    /// An unterminated quote or a trailing backslash is a usage error.
    pub fn parse_line(line: &str) -> Outcome<Self> {
        Ok(Self::new(split_line(line)?))
    }

    /// The next unconsumed token, without consuming it.
    pub fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    /// True if any token remains.
    pub fn has_args(&self) -> bool {
        self.pos < self.tokens.len()
    }

    /// Number of tokens consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Tokens not yet consumed.
    pub fn remaining(&self) -> &[String] {
        &self.tokens[self.pos..]
    }

    /// Consume the next token.
    ///
    /// # Errors
    ///
    /// A usage error naming `description` if no token remains.
    pub fn next_arg(&mut self, description: &str) -> Outcome<String> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| Interrupt::usage(format!("Missing argument: expected {}", description)))?;
        self.pos += 1;
        Ok(token)
    }

    /// Consume the next token and parse it as a number.
    pub fn next_number<N: FromStr>(&mut self, description: &str) -> Outcome<N> {
        let token = self.next_arg(description)?;
        token
            .parse()
            .map_err(|_| Interrupt::usage(format!("Invalid {}: '{}'", description, token)))
    }

    /// Fail if any token remains.
    ///
    /// # Errors
    ///
    /// A usage error naming the first unexpected token.
    pub fn end_of_args(&self) -> Outcome {
        match self.peek() {
            None => Ok(()),
            Some(extra) => Err(Interrupt::usage(format!(
                "Unexpected extra arguments, starting with '{}'",
                extra
            ))),
        }
    }

    /// Consume leading flags.
    ///
    /// Repeatedly looks at the next token; if it exactly matches a key of
    /// `table`, consumes it and runs the bound action. Stops at the first
    /// token that isn't a recognized flag (leaving it unconsumed) or at the
    /// end of input. An action's interrupt stops processing immediately.
    pub fn process_flags<T>(&mut self, target: &mut T, table: &[Flag<T>]) -> Outcome {
        while let Some(action) = self.peek().and_then(|token| lookup(token, table)).copied() {
            self.pos += 1;
            action(target, self)?;
        }
        Ok(())
    }
}

/// Single-dispatch lookup: the value bound to `name`, first match wins.
pub fn lookup<'t, V>(name: &str, table: &'t [(&'static str, V)]) -> Option<&'t V> {
    table
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Run the action bound to `name`, if any, without consuming input.
///
/// Returns `None` when `name` is not in the table.
pub fn process_flag<T>(
    name: &str,
    target: &mut T,
    args: &mut Args,
    table: &[Flag<T>],
) -> Option<Outcome> {
    lookup(name, table).map(|action| action(target, args))
}

fn split_line(line: &str) -> Outcome<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('\''), c) => current.push(c),
            (_, '\\') => match chars.next() {
                Some(escaped) => {
                    current.push(escaped);
                    in_token = true;
                }
                None => return Err(Interrupt::usage("Line ends with a dangling backslash")),
            },
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                in_token = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(Interrupt::usage(format!("Unterminated {} quote", q)));
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Seen {
        a: u32,
        b: u32,
        value: Option<String>,
    }

    const TABLE: &[Flag<Seen>] = &[
        ("-a", |s, _| {
            s.a += 1;
            Ok(())
        }),
        ("-b", |s, _| {
            s.b += 1;
            Ok(())
        }),
        ("--value", |s, args| {
            s.value = Some(args.next_arg("value")?);
            Ok(())
        }),
    ];

    #[test]
    fn next_arg_consumes_in_order() {
        let mut args = Args::new(["one", "two"]);
        assert_eq!(args.next_arg("first").unwrap(), "one");
        assert_eq!(args.next_arg("second").unwrap(), "two");
        assert!(!args.has_args());
    }

    #[test]
    fn next_arg_names_missing_argument() {
        let mut args = Args::new(Vec::<String>::new());
        match args.next_arg("document ID") {
            Err(Interrupt::Usage(msg)) => assert!(msg.contains("document ID")),
            other => panic!("expected usage error, got {:?}", other),
        }
    }

    #[test]
    fn end_of_args_rejects_trailing_tokens() {
        let mut args = Args::new(["db.cblite2", "ls"]);
        args.next_arg("path").unwrap();
        match args.end_of_args() {
            Err(Interrupt::Usage(msg)) => assert!(msg.contains("'ls'")),
            other => panic!("expected usage error, got {:?}", other),
        }
        args.next_arg("cmd").unwrap();
        assert!(args.end_of_args().is_ok());
    }

    #[test]
    fn next_number_parses_or_reports() {
        let mut args = Args::new(["12", "twelve"]);
        assert_eq!(args.next_number::<usize>("limit").unwrap(), 12);
        assert!(matches!(
            args.next_number::<usize>("limit"),
            Err(Interrupt::Usage(_))
        ));
    }

    #[test]
    fn process_flags_stops_at_first_non_flag() {
        let mut args = Args::new(["-a", "-b", "-a", "path", "-b"]);
        let mut seen = Seen::default();
        args.process_flags(&mut seen, TABLE).unwrap();
        assert_eq!((seen.a, seen.b), (2, 1));
        assert_eq!(args.peek(), Some("path"));
        assert_eq!(args.position(), 3);
    }

    #[test]
    fn process_flags_with_empty_table_consumes_nothing() {
        let mut args = Args::new(["-a", "x"]);
        let mut seen = Seen::default();
        args.process_flags(&mut seen, &[]).unwrap();
        assert_eq!(args.position(), 0);
    }

    #[test]
    fn process_flags_is_exact_and_case_sensitive() {
        let mut args = Args::new(["-A"]);
        let mut seen = Seen::default();
        args.process_flags(&mut seen, TABLE).unwrap();
        assert_eq!(args.position(), 0);

        let mut args = Args::new(["--val", "x"]);
        args.process_flags(&mut seen, TABLE).unwrap();
        assert_eq!(args.position(), 0);
    }

    #[test]
    fn flag_actions_can_consume_values() {
        let mut args = Args::new(["--value", "42", "-a"]);
        let mut seen = Seen::default();
        args.process_flags(&mut seen, TABLE).unwrap();
        assert_eq!(seen.value.as_deref(), Some("42"));
        assert_eq!(seen.a, 1);
        assert!(!args.has_args());
    }

    #[test]
    fn action_interrupt_stops_processing() {
        let table: &[Flag<Seen>] = &[
            ("--stop", |_, _| Err(Interrupt::Exit)),
            ("-a", |s, _| {
                s.a += 1;
                Ok(())
            }),
        ];
        let mut args = Args::new(["--stop", "-a"]);
        let mut seen = Seen::default();
        assert!(matches!(
            args.process_flags(&mut seen, table),
            Err(Interrupt::Exit)
        ));
        assert_eq!(seen.a, 0);
        assert_eq!(args.peek(), Some("-a"));
    }

    #[test]
    fn duplicate_keys_first_wins() {
        let table: &[Flag<Seen>] = &[
            ("-x", |s, _| {
                s.a += 1;
                Ok(())
            }),
            ("-x", |s, _| {
                s.b += 1;
                Ok(())
            }),
        ];
        let mut args = Args::new(["-x"]);
        let mut seen = Seen::default();
        args.process_flags(&mut seen, table).unwrap();
        assert_eq!((seen.a, seen.b), (1, 0));
    }

    #[test]
    fn process_flag_reports_not_found() {
        let mut args = Args::default();
        let mut seen = Seen::default();
        assert!(process_flag("-z", &mut seen, &mut args, TABLE).is_none());
        assert!(matches!(
            process_flag("-b", &mut seen, &mut args, TABLE),
            Some(Ok(()))
        ));
        assert_eq!(seen.b, 1);
    }

    #[test]
    fn parse_line_handles_quotes_and_escapes() {
        let args = Args::parse_line(r#"put doc1 '{"a": 1}' "two words" back\ slash"#).unwrap();
        assert_eq!(
            args.remaining(),
            &["put", "doc1", r#"{"a": 1}"#, "two words", "back slash"]
        );
    }

    #[test]
    fn parse_line_keeps_empty_quoted_token() {
        let args = Args::parse_line(r#"ls """#).unwrap();
        assert_eq!(args.remaining(), &["ls", ""]);
    }

    #[test]
    fn parse_line_of_blank_input_is_empty() {
        assert!(!Args::parse_line("   \t ").unwrap().has_args());
    }

    #[test]
    fn parse_line_rejects_unterminated_quote() {
        assert!(matches!(
            Args::parse_line("cat 'doc"),
            Err(Interrupt::Usage(_))
        ));
    }
}
