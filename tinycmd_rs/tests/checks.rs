//! `check` predicates: when they run and when they must not.

use std::cell::Cell;
use std::rc::Rc;

use tinycmd::{CommandLine, Outcome, UserError};

fn cli(args: &[&str]) -> CommandLine<'static> {
    CommandLine::new("test", args.iter().copied())
}

#[test]
fn check_runs_on_a_clean_parse() {
    let ran = Rc::new(Cell::new(false));

    let mut p = cli(&["-v", "1"]);
    let value: i32 = p.option('v', |o| o);
    let mark = Rc::clone(&ran);
    p.check(move || { mark.set(true); value > 0 }, "value must be positive");

    assert_eq!(p.finish(), Outcome::Success);
    assert!(ran.get());
}

#[test]
fn failing_check_fails_the_parse_with_its_message() {
    let mut p = cli(&["-v", "0"]);
    let value: i32 = p.option('v', |o| o);
    p.check(move || value > 0, "value must be positive");

    assert_eq!(
        p.finish(),
        Outcome::Error(UserError::CheckFailed {
            message: "value must be positive".to_string()
        })
    );
}

#[test]
fn check_is_skipped_after_a_value_error() {
    let ran = Rc::new(Cell::new(false));

    let mut p = cli(&["-v", "aaa"]);
    let _: i32 = p.option('v', |o| o);
    let mark = Rc::clone(&ran);
    p.check(move || { mark.set(true); true }, "");

    assert!(matches!(p.finish(), Outcome::Error(_)));
    assert!(!ran.get());
}

#[test]
fn check_is_skipped_after_a_missing_required_option() {
    let ran = Rc::new(Cell::new(false));

    let mut p = cli(&[]);
    let _: i32 = p.option('v', |o| o.required());
    let mark = Rc::clone(&ran);
    p.check(move || { mark.set(true); true }, "");

    assert!(matches!(p.finish(), Outcome::Error(_)));
    assert!(!ran.get());
}

#[test]
fn check_is_skipped_when_help_is_requested() {
    let ran = Rc::new(Cell::new(false));

    let mut p = cli(&["--help"]);
    let mark = Rc::clone(&ran);
    p.check(move || { mark.set(true); true }, "");

    assert_eq!(p.finish(), Outcome::HelpRequested);
    assert!(!ran.get());
}

#[test]
fn only_the_matched_commands_check_runs() {
    for (args, expected) in [(&["cmd1"][..], 1), (&["cmd2"], 2), (&[], 10)] {
        let counter = Rc::new(Cell::new(0));

        let mut p = cli(args);
        let c1 = Rc::clone(&counter);
        p.command("cmd1", "", move |c| {
            c.check(move || { c1.set(c1.get() + 1); true }, "");
        });
        let c2 = Rc::clone(&counter);
        p.command("cmd2", "", move |c| {
            c.check(move || { c2.set(c2.get() + 2); true }, "");
        });
        let c10 = Rc::clone(&counter);
        p.check(move || { c10.set(c10.get() + 10); true }, "");

        assert!(p.finish().is_success(), "{args:?}");
        assert_eq!(counter.get(), expected, "{args:?}");
    }
}

#[test]
fn failing_check_inside_a_command_is_the_outcome() {
    let mut p = cli(&["deploy"]);
    p.command("deploy", "", |c| {
        let target: String = c.argument(|a| a);
        c.check(move || !target.is_empty(), "a deploy target is required");
        c.handler(|| {});
    });

    assert_eq!(
        p.finish(),
        Outcome::Error(UserError::CheckFailed {
            message: "a deploy target is required".to_string()
        })
    );
}
