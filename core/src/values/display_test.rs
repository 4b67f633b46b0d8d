//! Tests for molding values back into source text.

use pretty_assertions::assert_eq;

use crate::session::Session;
use crate::values::{Array, Kind, Series, TypeSet, Value};

fn mold_source(source: &str) -> String {
    let mut session = Session::default();
    let array = session.load(source).unwrap();
    session.mold(&Value::block(array))
}

#[test]
fn test_mold_scalars() {
    assert_eq!(format!("{}", Value::integer(-12)), "-12");
    assert_eq!(format!("{}", Value::decimal(2.5)), "2.5");
    assert_eq!(format!("{}", Value::decimal(3.0)), "3.0");
    assert_eq!(format!("{}", Value::blank()), "_");
    assert_eq!(format!("{}", Value::logic(true)), "true");
    assert_eq!(format!("{}", Value::void()), "");
    assert_eq!(format!("{}", Value::datatype(Kind::Integer)), "integer!");
}

#[test]
fn test_mold_string_escapes() {
    assert_eq!(format!("{}", Value::string("a\"b^c\nd")), "\"a^\"b^^c^/d\"");
}

#[test]
fn test_form_drops_quotes() {
    let mut session = Session::default();
    assert_eq!(session.form(&Value::string("plain")), "plain");
    assert_eq!(session.mold(&Value::string("plain")), "\"plain\"");
}

#[test]
fn test_mold_loaded_source() {
    assert_eq!(
        mold_source("x: 1 :y 'z /only [a (b c)] <tag> | _"),
        "[x: 1 :y 'z /only [a (b c)] <tag> | _]"
    );
}

#[test]
fn test_mold_paths() {
    assert_eq!(mold_source("a/b/1 a/b: :a/b 'a/b"), "[a/b/1 a/b: :a/b 'a/b]");
}

#[test]
fn test_mold_nested_empty() {
    let inner = Value::block(Array::empty());
    let cells: Array = [inner].into_iter().map(Into::into).collect();
    let group = Value::series(Kind::Group, Series::new(cells));
    assert_eq!(format!("{}", group), "([])");
}

#[test]
fn test_mold_typeset() {
    let mut session = Session::default();
    let types = TypeSet::of(Kind::Integer).with(Kind::Decimal);
    let text = session.mold(&Value::new(crate::values::Payload::Typeset(types)));
    assert_eq!(text, "make typeset! [integer! decimal!]");
}

#[test]
fn test_mold_uses_and_restores_scratch_buffer() {
    let mut session = Session::default();
    let before = session.snapshot();
    let _ = session.mold(&Value::string("scratch"));
    assert_eq!(session.snapshot(), before);
}
