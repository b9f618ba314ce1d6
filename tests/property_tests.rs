//! Property-based tests for argument handling and subcommand resolution.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use proptest::prelude::*;

use cblite::cli::args::{Args, Flag};
use cblite::cli::registry::{self, Resolution, REGISTRY};
use cblite::store::{is_database_path, DB_EXTENSION};

#[derive(Default)]
struct Counts {
    a: usize,
    b: usize,
}

const FLAGS: &[Flag<Counts>] = &[
    ("-a", |c, _| {
        c.a += 1;
        Ok(())
    }),
    ("-b", |c, _| {
        c.b += 1;
        Ok(())
    }),
];

/// Tokens that are never flags in the table above.
fn plain_token() -> impl Strategy<Value = String> {
    "[a-z0-9./]{1,12}"
}

fn flag_token() -> impl Strategy<Value = String> {
    prop_oneof![Just("-a".to_string()), Just("-b".to_string())]
}

proptest! {
    #[test]
    fn database_path_iff_extension_suffix(stem in "[a-zA-Z0-9_ -]{0,16}", dir in "[a-z]{0,8}") {
        let with_ext = if dir.is_empty() {
            format!("{}{}", stem, DB_EXTENSION)
        } else {
            format!("{}/{}{}", dir, stem, DB_EXTENSION)
        };
        prop_assert!(is_database_path(&with_ext));
        prop_assert!(!is_database_path(&stem));
        let with_bak = format!("{}{}.bak", stem, DB_EXTENSION);
        prop_assert!(!is_database_path(with_bak));
    }

    #[test]
    fn flags_consume_exactly_the_leading_run(
        flags in prop::collection::vec(flag_token(), 0..8),
        rest in prop::collection::vec(plain_token(), 0..5),
    ) {
        let tokens: Vec<String> = flags.iter().chain(rest.iter()).cloned().collect();
        let mut args = Args::new(tokens);
        let mut counts = Counts::default();
        args.process_flags(&mut counts, FLAGS).unwrap();

        prop_assert_eq!(args.position(), flags.len());
        prop_assert_eq!(counts.a, flags.iter().filter(|f| *f == "-a").count());
        prop_assert_eq!(counts.b, flags.iter().filter(|f| *f == "-b").count());
        prop_assert_eq!(args.remaining(), &rest[..]);
    }

    #[test]
    fn next_arg_then_end_of_args(tokens in prop::collection::vec(plain_token(), 0..6)) {
        let mut args = Args::new(tokens.clone());
        for expected in &tokens {
            prop_assert_eq!(&args.next_arg("token").unwrap(), expected);
        }
        prop_assert!(args.end_of_args().is_ok());
        prop_assert!(args.next_arg("token").is_err());
    }

    #[test]
    fn parse_line_round_trips_simple_words(words in prop::collection::vec("[a-z0-9]{1,8}", 0..6)) {
        let args = Args::parse_line(&words.join("  ")).unwrap();
        prop_assert_eq!(args.remaining(), &words[..]);
    }

    #[test]
    fn resolution_is_pure_and_mode_gated(index in 0..REGISTRY.len(), interactive in any::<bool>()) {
        let (name, entry) = REGISTRY[index];
        let first = registry::resolve(name, interactive);
        let second = registry::resolve(name, interactive);
        prop_assert_eq!(first.is_unknown(), second.is_unknown());
        prop_assert_eq!(first.is_unknown(), !entry.gate.admits(interactive));
        if let Resolution::Command(sub) = first {
            prop_assert_eq!(sub.name(), name);
        }
    }

    #[test]
    fn unregistered_names_never_resolve(name in "[a-z]{1,10}", interactive in any::<bool>()) {
        prop_assume!(!REGISTRY.iter().any(|(n, _)| *n == name));
        prop_assert!(registry::resolve(&name, interactive).is_unknown());
    }
}
