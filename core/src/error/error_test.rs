use pretty_assertions::assert_eq;

use super::catalog::{self, ErrorId, USER_CODE};
use super::{ErrorObject, Message, Part};
use crate::session::Session;
use crate::test_utils::init_test_logging;
use crate::values::{Array, Cell, Symbol, Value};

/// Makes an error from `source`, loaded as a block.
fn make(session: &mut Session, source: &str) -> Result<ErrorObject, ErrorObject> {
    let spec = Value::block(session.load(source).unwrap());
    match session.trap(|s| s.make_error(&spec)) {
        Ok(Ok(error)) => Ok(error),
        Ok(Err(caught)) => Err(ErrorObject::clone(&caught.error)),
        Err(escape) => panic!("unexpected throw: {:?}", escape),
    }
}

#[test]
fn test_template_parse() {
    let Message::Template(parts) = Message::parse(":arg1 is missing its :arg2 argument") else {
        panic!("expected a template");
    };
    assert_eq!(parts.len(), 4);
    assert!(matches!(&parts[0], Part::Arg(name) if name.is("arg1")));
    assert!(matches!(&parts[1], Part::Text(text) if text == " is missing its "));
    assert!(matches!(&parts[2], Part::Arg(name) if name.is("arg2")));
    assert!(matches!(&parts[3], Part::Text(text) if text == " argument"));
}

#[test]
fn test_template_keeps_arg_without_digits() {
    let error = ErrorObject::from_fields(
        USER_CODE,
        None,
        None,
        Message::parse("see :argument"),
        Vec::new(),
    );
    assert_eq!(error.message_text(), "see :argument");
}

#[test]
fn test_catalogued_message() {
    let error = ErrorObject::new(
        ErrorId::NoArg,
        &[Value::plain_word("append"), Value::plain_word("value")],
    );
    assert_eq!(error.code(), 303);
    assert_eq!(error.category(), Some(&Symbol::new("script")));
    assert_eq!(error.id(), Some(&Symbol::new("no-arg")));
    assert_eq!(error.message_text(), "append is missing its value argument");
    assert_eq!(
        error.to_string(),
        "** Script Error: append is missing its value argument"
    );
}

#[test]
fn test_missing_argument_keeps_its_name() {
    let error = ErrorObject::new(ErrorId::NoValue, &[]);
    assert_eq!(error.message_text(), "arg1 has no value");
}

#[test]
fn test_display_with_location() {
    let mut error = ErrorObject::new(ErrorId::ZeroDivide, &[]);
    let near = Array::new(vec![
        Cell::from(Value::integer(1)),
        Cell::from(Value::plain_word("/")),
        Cell::from(Value::integer(0)),
        Cell::from(Value::plain_word("??")),
    ]);
    error.set_location(vec![Symbol::new("/"), Symbol::new("f")], Some(near));
    assert!(error.has_location());
    assert_eq!(
        error.to_string(),
        "** Math Error: attempt to divide by zero\n** Where: / f\n** Near: [1 / 0 ??]"
    );
}

#[test]
fn test_user_error_display() {
    let error = ErrorObject::user("disk on fire");
    assert_eq!(error.code(), USER_CODE);
    assert_eq!(error.to_string(), "** User Error: disk on fire");
}

#[test]
fn test_catalog_descriptions() {
    assert_eq!(catalog::description(0), "Throw Error");
    assert_eq!(catalog::description(305), "Script Error");
    assert_eq!(catalog::description(1234), "User Error");
    assert_eq!(catalog::description(700), "Error");
    assert!(catalog::category(&Symbol::new("MATH")).is_some());
    assert!(catalog::category(&Symbol::new("user")).is_none());
}

#[test]
fn test_make_error_from_string() {
    init_test_logging();
    let mut session = Session::default();
    let error = session.make_error(&Value::string("boom")).unwrap();
    assert_eq!(error.code(), USER_CODE);
    assert_eq!(error.id(), Some(&Symbol::new("message")));
    assert_eq!(error.message_text(), "boom");
}

#[test]
fn test_make_error_from_catalog_names() {
    let mut session = Session::default();
    let error = make(&mut session, "type: 'script id: 'no-arg arg1: 'f arg2: 'x").unwrap();
    assert!(error.is(ErrorId::NoArg));
    assert_eq!(error.message_text(), "f is missing its x argument");
}

#[test]
fn test_make_error_from_code() {
    let mut session = Session::default();
    let error = make(&mut session, "code: 400").unwrap();
    assert!(error.is(ErrorId::ZeroDivide));
    assert_eq!(error.category(), Some(&Symbol::new("math")));
}

#[test]
fn test_make_error_rejects_inconsistent_fields() {
    let mut session = Session::default();
    for source in [
        "code: 400 id: 'overflow",
        "code: 400 type: 'script",
        "code: 303 message: \"mine\"",
        "type: 'script id: 'no-such-error",
        "type: 'math id: 'zero-divide message: \"mine\"",
        "code: 777",
        "code: \"303\"",
        "type: \"script\"",
    ] {
        let error = make(&mut session, source).unwrap_err();
        assert!(error.is(ErrorId::InvalidError), "{} gave {}", source, error);
    }
    assert_eq!(session.frame_depth(), 0);
}

#[test]
fn test_make_error_user_category() {
    let mut session = Session::default();
    let error = make(&mut session, "type: 'app id: 'oops message: \"went wrong\"").unwrap();
    assert_eq!(error.code(), USER_CODE);
    assert_eq!(error.category(), Some(&Symbol::new("app")));
    assert_eq!(error.id(), Some(&Symbol::new("oops")));
    assert_eq!(error.to_string(), "** User Error: went wrong");
}

#[test]
fn test_make_error_user_code_with_message_block() {
    let mut session = Session::default();
    let error = make(&mut session, "code: 1001 message: [\"bad value\" arg1] arg1: 5").unwrap();
    assert_eq!(error.code(), 1001);
    assert_eq!(error.message_text(), "bad value 5");
    assert_eq!(error.arg("arg1"), Some(&Value::integer(5)));
}

#[test]
fn test_make_error_without_names_is_user_message() {
    let mut session = Session::default();
    let error = make(&mut session, "message: \"plain\"").unwrap();
    assert_eq!(error.category(), Some(&Symbol::new("user")));
    assert_eq!(error.id(), Some(&Symbol::new("message")));
    assert_eq!(error.message_text(), "plain");
}

#[test]
fn test_make_error_keeps_extra_fields() {
    let mut session = Session::default();
    let error = make(&mut session, "message: \"x\" file: \"a.r\"").unwrap();
    assert_eq!(error.arg("file"), Some(&Value::string("a.r")));
}

#[test]
fn test_make_error_of_error_copies() {
    let mut session = Session::default();
    let original = Value::error(ErrorObject::new(ErrorId::Overflow, &[]));
    let error = session.make_error(&original).unwrap();
    assert!(error.is(ErrorId::Overflow));
}

#[test]
fn test_make_error_rejects_other_values() {
    let mut session = Session::default();
    let result = session.trap(|s| s.make_error(&Value::integer(3))).unwrap();
    let caught = result.unwrap_err();
    assert!(caught.error.is(ErrorId::InvalidError));
    assert_eq!(caught.error.arg("arg1"), Some(&Value::integer(3)));
}
