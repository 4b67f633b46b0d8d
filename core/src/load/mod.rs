//! The loader: source text to cells.
//!
//! Only the lexical forms the evaluator needs are recognized (words in all
//! their flavors, paths, numbers, strings, tags, blocks, groups and bars).
//! Loaded words are bound with [`bind_words`].


use core::ops::Range;

use ecow::EcoString;
use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;
use thiserror::Error;
use tracing::trace;

use crate::context::{Context, rebind};
use crate::values::{Array, Cell, PathKind, Payload, Series, Word, WordKind};

#[derive(Parser)]
#[grammar = "load/rivet.pest"]
struct SourceParser;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("expected {expected}")]
    Syntax { expected: String, span: Range<usize> },
    #[error("invalid number literal '{text}'")]
    InvalidNumber { text: String, span: Range<usize> },
}

impl LoadError {
    /// Byte range of the offending source text.
    pub fn span(&self) -> Range<usize> {
        match self {
            LoadError::Syntax { span, .. } | LoadError::InvalidNumber { span, .. } => span.clone(),
        }
    }
}

/// Scans `source` into an array of unbound cells.
pub fn scan(source: &str) -> Result<Array, LoadError> {
    let mut pairs = SourceParser::parse(Rule::main, source).map_err(convert_pest_error)?;
    let Some(main) = pairs.next() else {
        return Ok(Array::empty());
    };
    let cells = main
        .into_inner()
        .filter(|pair| pair.as_rule() != Rule::EOI)
        .map(cell)
        .collect::<Result<Vec<_>, _>>()?;
    trace!(cells = cells.len(), "scanned");
    Ok(Array::new(cells))
}

fn convert_pest_error(err: pest::error::Error<Rule>) -> LoadError {
    use pest::error::{ErrorVariant, InputLocation};

    let span = match err.location {
        InputLocation::Pos(pos) => pos..pos,
        InputLocation::Span((start, end)) => start..end,
    };
    let expected = match err.variant {
        ErrorVariant::ParsingError { positives, .. } if !positives.is_empty() => {
            let mut names: Vec<&str> = positives.iter().map(describe_rule).collect();
            names.dedup();
            names.join(" or ")
        }
        ErrorVariant::ParsingError { .. } => "a value".to_string(),
        ErrorVariant::CustomError { message } => message,
    };
    LoadError::Syntax { expected, span }
}

fn describe_rule(rule: &Rule) -> &'static str {
    match rule {
        Rule::EOI => "end of input",
        Rule::block => "a block",
        Rule::group => "a group",
        Rule::string | Rule::string_inner => "a closing quote",
        Rule::tag | Rule::tag_inner => "a tag",
        Rule::integer | Rule::integer_segment | Rule::decimal => "a number",
        Rule::path | Rule::path_body | Rule::set_path | Rule::get_path | Rule::lit_path => "a path",
        _ => "a value",
    }
}

fn cell(pair: Pair<'_, Rule>) -> Result<Cell, LoadError> {
    let span = pair.as_span();
    let payload = match pair.as_rule() {
        Rule::block => Payload::Block(Series::new(array(pair)?)),
        Rule::group => Payload::Group(Series::new(array(pair)?)),
        Rule::string => Payload::String(unescape(inner_str(pair))),
        Rule::tag => Payload::Tag(inner_str(pair).into()),
        Rule::integer | Rule::integer_segment => {
            let text = pair.as_str();
            let number = text.parse().map_err(|_| LoadError::InvalidNumber {
                text: text.to_string(),
                span: span.start()..span.end(),
            })?;
            Payload::Integer(number)
        }
        Rule::decimal => {
            let text = pair.as_str();
            let number = text.parse().map_err(|_| LoadError::InvalidNumber {
                text: text.to_string(),
                span: span.start()..span.end(),
            })?;
            Payload::Decimal(number)
        }
        Rule::bar => Payload::Bar,
        Rule::lit_bar => Payload::LitBar,
        Rule::blank => Payload::Blank,
        Rule::word => word(WordKind::Word, pair),
        Rule::set_word => word(WordKind::SetWord, pair),
        Rule::get_word => word(WordKind::GetWord, pair),
        Rule::lit_word => word(WordKind::LitWord, pair),
        Rule::refinement => word(WordKind::Refinement, pair),
        Rule::path => path(PathKind::Path, pair)?,
        Rule::set_path => path(PathKind::SetPath, pair)?,
        Rule::get_path => path(PathKind::GetPath, pair)?,
        Rule::lit_path => path(PathKind::LitPath, pair)?,
        rule => {
            return Err(LoadError::Syntax {
                expected: format!("a value, not {:?}", rule),
                span: span.start()..span.end(),
            });
        }
    };
    Ok(Cell::new(payload))
}

fn array(pair: Pair<'_, Rule>) -> Result<Array, LoadError> {
    pair.into_inner()
        .map(cell)
        .collect::<Result<Vec<_>, _>>()
        .map(Array::new)
}

fn inner_str<'i>(pair: Pair<'i, Rule>) -> &'i str {
    pair.into_inner().next().map_or("", |inner| inner.as_str())
}

fn word(kind: WordKind, pair: Pair<'_, Rule>) -> Payload {
    let spelling = inner_str(pair);
    Payload::Word(kind, Word::unbound(spelling))
}

fn path(kind: PathKind, pair: Pair<'_, Rule>) -> Result<Payload, LoadError> {
    let body = pair.into_inner().next().map(array).transpose()?;
    Ok(Payload::Path(kind, Series::new(body.unwrap_or_default())))
}

/// Resolves `^"`, `^^`, `^/` and `^-`.
fn unescape(text: &str) -> EcoString {
    let mut out = EcoString::new();
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '^' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('/') => out.push('\n'),
            Some('-') => out.push('\t'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

/// Binds loaded code: set-words anywhere in it become variables of `user`,
/// and every other word goes to `user` if defined there, else to `lib`,
/// else to a new variable of `user`.
pub fn bind_words(array: &Array, lib: &Context, user: &Context) -> Array {
    collect_set_words(array, user);
    rebind(array, &mut |kind, word| {
        if kind == WordKind::Refinement {
            return None;
        }
        let symbol = word.symbol.clone();
        if let Some(index) = user.find(&symbol) {
            return Some(Word::bound(symbol, user.clone(), index));
        }
        if let Some(index) = lib.find(&symbol) {
            return Some(Word::bound(symbol, lib.clone(), index));
        }
        let index = user.append(symbol.clone());
        Some(Word::bound(symbol, user.clone(), index))
    })
}

fn collect_set_words(array: &Array, user: &Context) {
    for cell in array.cells() {
        match cell.payload() {
            Payload::Word(WordKind::SetWord, word) => {
                user.append(word.symbol.clone());
            }
            Payload::Block(series) | Payload::Group(series) | Payload::Path(_, series) => {
                collect_set_words(&series.array, user);
            }
            _ => {}
        }
    }
}
