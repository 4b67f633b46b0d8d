use core::fmt;

use static_assertions::const_assert;

use super::Kind;

// Each kind owns one bit.
const_assert!(Kind::ALL.len() <= u64::BITS as usize);

/// Set of datatypes accepted by a parameter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TypeSet(u64);

impl TypeSet {
    pub const EMPTY: TypeSet = TypeSet(0);

    /// Every kind except void.
    pub const ANY_VALUE: TypeSet = TypeSet(!Kind::Void.bit());

    /// Every kind, void included (`<opt> any-value!`).
    pub const ANY: TypeSet = TypeSet(!0);

    pub const fn of(kind: Kind) -> Self {
        TypeSet(kind.bit())
    }

    pub const fn with(self, kind: Kind) -> Self {
        TypeSet(self.0 | kind.bit())
    }

    pub const fn without(self, kind: Kind) -> Self {
        TypeSet(self.0 & !kind.bit())
    }

    pub const fn contains(self, kind: Kind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Expands a typeset name such as `any-word!`.
    pub fn from_name(name: &str) -> Option<TypeSet> {
        let kinds: &[Kind] = match name {
            "any-value!" => return Some(TypeSet::ANY_VALUE),
            "any-word!" => &[
                Kind::Word,
                Kind::SetWord,
                Kind::GetWord,
                Kind::LitWord,
                Kind::Refinement,
            ],
            "any-path!" => &[Kind::Path, Kind::SetPath, Kind::GetPath, Kind::LitPath],
            "any-array!" => &[
                Kind::Block,
                Kind::Group,
                Kind::Path,
                Kind::SetPath,
                Kind::GetPath,
                Kind::LitPath,
            ],
            "any-number!" => &[Kind::Integer, Kind::Decimal],
            "any-string!" => &[Kind::String, Kind::Tag],
            _ => return Kind::from_name(name).map(TypeSet::of),
        };
        Some(kinds.iter().fold(TypeSet::EMPTY, |set, kind| set.with(*kind)))
    }

    pub fn iter(self) -> impl Iterator<Item = Kind> {
        Kind::ALL.iter().copied().filter(move |kind| self.contains(*kind))
    }
}

impl FromIterator<Kind> for TypeSet {
    fn from_iter<I: IntoIterator<Item = Kind>>(iter: I) -> Self {
        iter.into_iter().fold(TypeSet::EMPTY, TypeSet::with)
    }
}

impl fmt::Debug for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == TypeSet::ANY_VALUE {
            return f.write_str("any-value!");
        }
        f.debug_list().entries(self.iter()).finish()
    }
}
