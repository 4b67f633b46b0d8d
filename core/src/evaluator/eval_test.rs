//! Tests for the evaluator state machine.

use pretty_assertions::assert_eq;

use crate::error::ErrorId;
use crate::options::EvalOptions;
use crate::session::{Completion, Session};
use crate::test_utils::{eval, eval_err, eval_ok, init_test_logging};
use crate::values::{Array, Cell, Kind, Series, Value, WordKind};

fn error_id(source: &str) -> String {
    let caught = eval_err(source);
    caught
        .error
        .id()
        .map(|id| id.as_str().to_string())
        .unwrap_or_default()
}

#[test]
fn test_infix_runs_left_to_right() {
    init_test_logging();
    assert_eq!(eval_ok("1 + 2 * 3"), Value::integer(9));
    assert_eq!(eval_ok("1 + (2 * 3)"), Value::integer(7));
}

#[test]
fn test_inert_values_are_themselves() {
    assert_eq!(eval_ok("\"text\""), Value::string("text"));
    assert_eq!(eval_ok("<tag>"), Value::tag("tag"));
    assert_eq!(eval_ok("[a b]").kind(), Kind::Block);
    assert_eq!(eval_ok("_"), Value::blank());
}

#[test]
fn test_last_expression_wins() {
    assert_eq!(eval_ok("1 2 3"), Value::integer(3));
    assert!(eval_ok("").is_void());
}

#[test]
fn test_set_and_get_words() {
    assert_eq!(eval_ok("x: 10 x + 1"), Value::integer(11));
    assert_eq!(eval_ok("x: y: 2 x * y"), Value::integer(4));
}

#[test]
fn test_get_word_of_unset_is_void() {
    assert!(eval_ok(":never-set").is_void());
}

#[test]
fn test_word_of_unset_fails() {
    assert_eq!(error_id("never-set"), "no-value");
}

#[test]
fn test_unbound_word_fails_and_stays_balanced() {
    let mut session = Session::default();
    let before = session.snapshot();
    let code = Array::new(vec![Cell::from(Value::plain_word("loose"))]);
    let caught = session.run_array(&Series::new(code)).unwrap_err();
    assert!(caught.error.is(ErrorId::NotBound));
    assert_eq!(session.snapshot(), before);
}

#[test]
fn test_lit_word_and_lit_path() {
    assert_eq!(eval_ok("'abc"), Value::plain_word("abc"));
    assert_eq!(eval_ok("'a/b").kind(), Kind::Path);
}

#[test]
fn test_groups_evaluate_to_their_last_value() {
    assert_eq!(eval_ok("(1 2) + 3"), Value::integer(5));
    assert!(eval_ok("()").is_void());
}

#[test]
fn test_bar_separates_expressions() {
    assert_eq!(eval_ok("1 | 2"), Value::integer(2));
    assert!(eval_ok("1 | | ").is_void());
    assert_eq!(eval_ok("'|"), Value::bar());
}

#[test]
fn test_set_word_at_end_needs_value() {
    assert_eq!(error_id("x:"), "need-value");
}

#[test]
fn test_void_assignment() {
    assert!(eval_ok("x: () :x").is_void());

    let mut session = Session::new(EvalOptions {
        void_set_is_error: true,
        ..EvalOptions::default()
    });
    let caught = eval(&mut session, "x: ()").unwrap_err();
    assert!(caught.error.is(ErrorId::NeedValue));
}

#[test]
fn test_lit_word_decay() {
    let stored = eval_ok("x: quote 'a x");
    assert_eq!(stored.kind(), Kind::LitWord);

    let mut session = Session::new(EvalOptions {
        lit_word_decay: true,
        ..EvalOptions::default()
    });
    let decayed = eval(&mut session, "x: quote 'a x").unwrap();
    assert_eq!(decayed.kind(), Kind::Word);
}

#[test]
fn test_paths_pick_from_blocks() {
    assert_eq!(eval_ok("b: [10 20 30] b/2"), Value::integer(20));
    assert_eq!(eval_ok("b: [x 1 y 2] b/y"), Value::integer(2));
    assert_eq!(eval_ok("b: [10] b/5"), Value::blank());
    assert_eq!(eval_ok("b: [10 20] n: 2 b/:n"), Value::integer(20));
    assert_eq!(eval_ok("b: [10 20] b/(1 + 1)"), Value::integer(20));
}

#[test]
fn test_set_path_on_block_is_invalid() {
    assert_eq!(error_id("b: [1 2] b/1: 3"), "invalid-path");
}

#[test]
fn test_get_path_does_not_call() {
    assert_eq!(eval_ok(":add").kind(), Kind::Function);
    assert_eq!(error_id("b: [1] :b/1/2"), "invalid-path");
}

#[test]
fn test_punctuator_cannot_be_assigned_or_an_argument() {
    assert_eq!(error_id("x: ||"), "punctuator-hit");
    assert_eq!(error_id("add 1 ||"), "punctuator-hit");
    assert_eq!(eval_ok("1 || 2"), Value::integer(2));
}

#[test]
fn test_punctuator_result_is_no_left_argument() {
    assert_eq!(error_id("1 || + 2"), "infix-left-arg-prohibited");
}

#[test]
fn test_eval_retriggers() {
    assert_eq!(eval_ok("eval :add 1 2"), Value::integer(3));
    assert_eq!(eval_ok("eval 5"), Value::integer(5));
    assert_eq!(eval_ok("f: :multiply eval :f 2 3"), Value::integer(6));
}

#[test]
fn test_eval_only_takes_arguments_literally() {
    assert_eq!(eval_ok("eval/only :add 1 2"), Value::integer(3));
    assert_eq!(error_id("eval/only :add (1) 2"), "expect-arg");
    assert_eq!(error_id("eval/only/only :add 1 2"), "bad-refine");
}

#[test]
fn test_stack_overflow_is_trappable() {
    let mut session = Session::new(EvalOptions {
        max_depth: 40,
        ..EvalOptions::default()
    });
    let before = session.snapshot();
    let caught = eval(&mut session, "f: func [] [f] f").unwrap_err();
    assert!(caught.error.is(ErrorId::StackOverflow));
    assert_eq!(session.snapshot(), before);

    // The session is still usable afterwards.
    assert_eq!(eval(&mut session, "1 + 1").unwrap(), Value::integer(2));
}

#[test]
fn test_default_depth_limit_is_reached_before_native_stack() {
    // Runs on a thread with the usual 2 MiB test stack.
    let handle = std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(|| {
            for source in ["f: func [] [f] f", "f: func [x] [f x + 1] f 1"] {
                let mut session = Session::new(EvalOptions::default());
                let before = session.snapshot();
                let caught = eval(&mut session, source).unwrap_err();
                assert!(
                    caught.error.is(ErrorId::StackOverflow),
                    "{} raised {}",
                    source,
                    caught.error
                );
                assert_eq!(session.snapshot(), before);
            }
        })
        .unwrap();
    handle.join().unwrap();
}

#[test]
fn test_nested_failure_restores_checkpoint() {
    init_test_logging();
    let mut session = Session::default();
    eval(
        &mut session,
        "inner: func [n] [n / 0]  outer: func [n] [inner n + 1]",
    )
    .unwrap();
    let before = session.snapshot();
    let caught = eval(&mut session, "outer 1").unwrap_err();
    assert!(caught.error.is(ErrorId::ZeroDivide));
    assert_eq!(session.snapshot(), before);
    assert_eq!(session.frame_depth(), 0);
}

#[test]
fn test_error_location() {
    let caught = eval_err("f: func [] [1 / 0] f");
    let backtrace: Vec<String> = caught
        .error
        .backtrace()
        .unwrap()
        .iter()
        .map(|label| label.to_string())
        .collect();
    assert_eq!(backtrace, vec!["/", "f"]);

    let near = caught.error.near().unwrap();
    let words: Vec<String> = near.cells().iter().map(|cell| cell.to_string()).collect();
    assert!(words.contains(&"??".to_string()), "{:?}", words);
}

#[test]
fn test_near_shows_cells_up_to_the_read_position() {
    let caught = eval_err("x: 1 y: x + \"a\" z: 3");
    let near: Vec<String> = caught
        .error
        .near()
        .unwrap()
        .cells()
        .iter()
        .map(|cell| cell.to_string())
        .collect();
    assert_eq!(near, vec!["+", "\"a\"", "z:", "??", "3"]);
}

#[test]
fn test_eval_count_advances() {
    let mut session = Session::default();
    eval(&mut session, "1 + 2").unwrap();
    assert!(session.eval_count() > 0);
}

#[test]
fn test_halt_signal_is_reported() {
    let mut session = Session::new(EvalOptions {
        signal_interval: 1,
        ..EvalOptions::default()
    });
    session.interrupt_handle().request_halt();
    let caught = eval(&mut session, "1 + 2").unwrap_err();
    assert!(caught.halted);

    // The request was consumed.
    assert_eq!(eval(&mut session, "1 + 2").unwrap(), Value::integer(3));
}

#[test]
fn test_quit_completes_with_status() {
    let mut session = Session::default();
    assert_eq!(session.run("quit/with 3 1").unwrap(), Completion::Quit(3));
    assert_eq!(session.run("quit").unwrap(), Completion::Quit(0));
}

#[test]
fn test_load_errors_are_reported() {
    let mut session = Session::default();
    let caught = session.run("[1 2").unwrap_err();
    assert!(caught.error.is(ErrorId::NoLoad));
}

#[test]
fn test_refinement_words_are_values() {
    assert_eq!(
        eval_ok("/only").kind(),
        Kind::Refinement,
    );
    assert_eq!(
        eval_ok("quote x:").with_word_kind(WordKind::Word),
        Some(Value::plain_word("x"))
    );
}
