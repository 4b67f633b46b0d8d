#![allow(unused_macros)]

/// Declares a test that runs `input` in a fresh interpreter.
///
/// - `value:` expects the molded result.
/// - `error:` expects a script error, named `category/id`.
/// - `quit:` expects QUIT with that status.
macro_rules! test_case {
    ($name:ident, input: $input:expr, value: $expected:expr $(,)?) => {
        #[test]
        fn $name() {
            let mut interpreter = rivet::Interpreter::new();
            let value = match interpreter.run($input) {
                Ok(value) => value,
                Err(err) => panic!("{:?} failed:\n{}", $input, err),
            };
            pretty_assertions::assert_eq!(interpreter.mold(&value), $expected);
        }
    };
    ($name:ident, input: $input:expr, error: $expected:expr $(,)?) => {
        #[test]
        fn $name() {
            let mut interpreter = rivet::Interpreter::new();
            match interpreter.run($input) {
                Ok(value) => panic!(
                    "{:?} should fail with {}, got {}",
                    $input,
                    $expected,
                    interpreter.mold(&value)
                ),
                Err(err) => pretty_assertions::assert_eq!(
                    err.script_id().as_deref(),
                    Some($expected),
                    "{}",
                    err
                ),
            }
        }
    };
    ($name:ident, input: $input:expr, quit: $status:expr $(,)?) => {
        #[test]
        fn $name() {
            let mut interpreter = rivet::Interpreter::new();
            match interpreter.run($input) {
                Err(rivet::Error::Quit { status }) => pretty_assertions::assert_eq!(status, $status),
                other => panic!("{:?} should quit, got {:?}", $input, other),
            }
        }
    };
}
