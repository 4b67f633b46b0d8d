//! Function spec blocks.
//!
//! A spec lists parameters in order. `word` is a normal parameter, `'word`
//! hard-quotes, `:word` soft-quotes and `/word` is a refinement. A block
//! after a parameter holds its accepted datatypes plus the tags `<opt>`
//! (void allowed), `<end>` (end of input allowed) and `<...>` (variadic).
//! Words after `<local>` are locals. `return:` followed by a block declares
//! the result types of a function with a definitional RETURN. Strings are
//! descriptions and are ignored.

#[cfg(test)]
#[path = "spec_test.rs"]
mod spec_test;

use thiserror::Error;

use crate::values::{Kind, Param, ParamClass, Series, Symbol, TypeSet, Value, WordKind};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpecError {
    #[error("duplicate parameter {0}")]
    Duplicate(Symbol),
    #[error("unexpected {0} in function spec")]
    Unexpected(String),
    #[error("unknown datatype {0}")]
    UnknownType(Symbol),
}

/// Which definitional exit a generated function gets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exit {
    None,
    Return,
    Leave,
}

/// Parses `spec` into parameters, appending the exit slot `exit` asks for.
pub fn parse_spec(spec: &Series, exit: Exit) -> Result<Vec<Param>, SpecError> {
    let mut params: Vec<Param> = Vec::new();
    let mut return_types = TypeSet::ANY;
    let mut locals = false;
    let mut values = spec.values().peekable();

    while let Some(item) = values.next() {
        let word_kind = item.as_word().map(|_| item.kind());
        match (item.kind(), word_kind) {
            (Kind::String, _) => continue,
            (Kind::Tag, _) => match item.as_str() {
                Some("local") => locals = true,
                _ => return Err(SpecError::Unexpected(format!("{}", item))),
            },
            (Kind::Block, _) => {
                let Some(param) = params.last_mut() else {
                    return Err(SpecError::Unexpected(format!("{}", item)));
                };
                apply_types(param, &item)?;
            }
            (Kind::SetWord, _) if item.as_symbol().is_some_and(|symbol| symbol.is("return")) => {
                if exit != Exit::Return {
                    return Err(SpecError::Unexpected(format!("{}", item)));
                }
                if let Some(block) = values.next_if(|next| next.kind() == Kind::Block) {
                    let mut slot = Param::new("return", ParamClass::Return);
                    apply_types(&mut slot, &block)?;
                    return_types = slot.types;
                }
            }
            (_, Some(kind)) => {
                let Some(symbol) = item.as_symbol().cloned() else {
                    continue;
                };
                if params.iter().any(|param| param.symbol == symbol) {
                    return Err(SpecError::Duplicate(symbol));
                }
                let class = match (locals, kind) {
                    (true, Kind::Word) => ParamClass::Local,
                    (false, Kind::Word) => ParamClass::Normal,
                    (false, Kind::LitWord) => ParamClass::HardQuote,
                    (false, Kind::GetWord) => ParamClass::SoftQuote,
                    (false, Kind::Refinement) => ParamClass::Refinement,
                    _ => return Err(SpecError::Unexpected(format!("{}", item))),
                };
                params.push(Param::new(symbol, class));
            }
            _ => return Err(SpecError::Unexpected(format!("{}", item))),
        }
    }

    let slot = match exit {
        Exit::None => None,
        Exit::Return => Some(("return", ParamClass::Return)),
        Exit::Leave => Some(("leave", ParamClass::Leave)),
    };
    if let Some((name, class)) = slot {
        let symbol = Symbol::new(name);
        if params.iter().any(|param| param.symbol == symbol) {
            return Err(SpecError::Duplicate(symbol));
        }
        params.push(Param::new(symbol, class).with_types(return_types));
    }
    Ok(params)
}

fn apply_types(param: &mut Param, block: &Value) -> Result<(), SpecError> {
    let Some(series) = block.as_series() else {
        return Ok(());
    };
    let mut types = TypeSet::EMPTY;
    let mut named_any = false;
    for item in series.values() {
        if item.kind() == Kind::Tag {
            match item.as_str() {
                Some("opt") => types = types.with(Kind::Void),
                Some("end") => param.endable = true,
                Some("...") => param.variadic = true,
                _ => return Err(SpecError::Unexpected(format!("{}", item))),
            }
            continue;
        }
        let Some(symbol) = item
            .with_word_kind(WordKind::Word)
            .and_then(|word| word.as_symbol().cloned())
        else {
            return Err(SpecError::Unexpected(format!("{}", item)));
        };
        let name = symbol.as_str().to_ascii_lowercase();
        let Some(set) = TypeSet::from_name(&name) else {
            return Err(SpecError::UnknownType(symbol));
        };
        named_any = true;
        types = set.iter().fold(types, TypeSet::with);
    }
    if !named_any {
        // Only tags: keep the default types and add what the tags allow.
        types = param.types.iter().fold(types, TypeSet::with);
    }
    param.types = types;
    Ok(())
}
