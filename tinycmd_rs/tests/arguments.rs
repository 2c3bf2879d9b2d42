//! Positional-argument binding: order, lists, defaults, leftovers.

use tinycmd::{CommandLine, Outcome, UserError};

fn cli(args: &[&str]) -> CommandLine<'static> {
    CommandLine::new("test", args.iter().copied())
}

#[test]
fn arguments_bind_in_declaration_order() {
    let mut p = cli(&["arg1", "arg2"]);
    let first: String = p.argument(|a| a);
    let second: String = p.argument(|a| a);
    assert_eq!(first, "arg1");
    assert_eq!(second, "arg2");
    assert_eq!(p.finish(), Outcome::Success);
}

#[test]
fn missing_optional_argument_is_the_default() {
    let mut p = cli(&["only"]);
    let first: String = p.argument(|a| a);
    let second: String = p.argument(|a| a.default("fallback".to_string()));
    assert_eq!(first, "only");
    assert_eq!(second, "fallback");
}

#[test]
fn argument_list_is_greedy() {
    let mut p = cli(&["a", "b", "c", "23a", "F_"]);
    let list: Vec<String> = p.argument_list(|a| a);
    assert_eq!(list.len(), 5);
    assert_eq!(p.finish(), Outcome::Success);
}

#[test]
fn scalars_bind_before_the_list() {
    let mut p = cli(&["a1", "b2", "c3", "_1)", "-91"]);
    let first: String = p.argument(|a| a);
    let second: String = p.argument(|a| a);
    let rest: Vec<String> = p.argument_list(|a| a);
    assert_eq!(first, "a1");
    assert_eq!(second, "b2");
    // Dash-prefixed tokens that match no declaration are plain positionals.
    assert_eq!(rest, vec!["c3", "_1)", "-91"]);
    assert_eq!(p.finish(), Outcome::Success);
}

#[test]
fn empty_list_is_not_an_error() {
    for args in [&[][..], &["-v"]] {
        let mut p = cli(args);
        let verbose: bool = p.option('v', |o| o);
        let list: Vec<String> = p.argument_list(|a| a);
        assert!(list.is_empty());
        let _ = verbose;
        assert_eq!(p.finish(), Outcome::Success, "{args:?}");
    }
}

#[test]
fn invalid_argument_value_is_an_error() {
    let mut p = cli(&["aaa"]);
    let value: i32 = p.argument(|a| a);
    assert_eq!(value, 0);
    assert_eq!(
        p.finish(),
        Outcome::Error(UserError::ArgumentValueInvalid {
            name: "argument".to_string()
        })
    );
}

#[test]
fn invalid_list_item_is_an_error_naming_the_placeholder() {
    let mut p = cli(&["1", "bbb"]);
    let list: Vec<i32> = p.argument_list(|a| a.placeholder("num"));
    assert!(list.is_empty());
    assert_eq!(
        p.finish(),
        Outcome::Error(UserError::ArgumentValueInvalid {
            name: "num".to_string()
        })
    );
}

#[test]
fn missing_required_argument_is_an_error() {
    for args in [&[][..], &["-f"]] {
        let mut p = cli(args);
        let flag: bool = p.option('f', |o| o);
        let _ = flag;
        let _: i32 = p.argument(|a| a.placeholder("count").required());
        assert_eq!(
            p.finish(),
            Outcome::Error(UserError::ArgumentMissing {
                name: "count".to_string()
            }),
            "{args:?}"
        );
    }
}

#[test]
fn unbound_tokens_are_leftover_errors() {
    let mut p = cli(&["1", "2", "3"]);
    let _: i32 = p.argument(|a| a);
    assert_eq!(
        p.finish(),
        Outcome::Error(UserError::UnknownOption {
            token: "2".to_string()
        })
    );
}

#[test]
#[should_panic(expected = "before an argument list")]
fn scalar_after_list_is_a_configuration_bug() {
    let mut p = cli(&["a", "b"]);
    let _: Vec<String> = p.argument_list(|a| a);
    let _: String = p.argument(|a| a);
}
