use core::fmt;

macro_rules! kinds {
    ($($variant:ident => $name:literal,)*) => {
        /// The datatype of a value.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum Kind {
            $($variant,)*
        }

        impl Kind {
            pub const ALL: &'static [Kind] = &[$(Kind::$variant,)*];

            /// Datatype name, e.g. `integer!`.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Kind::$variant => $name,)*
                }
            }

            pub fn from_name(name: &str) -> Option<Kind> {
                match name {
                    $($name => Some(Kind::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

kinds! {
    Void => "void!",
    Blank => "blank!",
    Logic => "logic!",
    Bar => "bar!",
    LitBar => "lit-bar!",
    Integer => "integer!",
    Decimal => "decimal!",
    String => "string!",
    Tag => "tag!",
    Word => "word!",
    SetWord => "set-word!",
    GetWord => "get-word!",
    LitWord => "lit-word!",
    Refinement => "refinement!",
    Block => "block!",
    Group => "group!",
    Path => "path!",
    SetPath => "set-path!",
    GetPath => "get-path!",
    LitPath => "lit-path!",
    Function => "function!",
    Error => "error!",
    Object => "object!",
    Varargs => "varargs!",
    Datatype => "datatype!",
    Typeset => "typeset!",
}

impl Kind {
    pub const fn bit(self) -> u64 {
        1u64 << (self as u8)
    }

    /// Kinds that a soft-quoted parameter evaluates instead of quoting.
    pub const fn is_quotably_soft(self) -> bool {
        matches!(self, Kind::Group | Kind::GetWord | Kind::GetPath)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
