//! The built-in error catalog.
//!
//! Codes are grouped by hundreds: `code / 100` selects the category and
//! `code % 100` the error within it. Codes from 1000 up belong to users.

use hashbrown::HashMap;
use lazy_static::lazy_static;

use crate::values::Symbol;

pub const USER_CODE: i64 = 1000;

#[derive(Debug)]
pub struct Category {
    pub name: &'static str,
    pub code: i64,
    pub description: &'static str,
}

pub const CATEGORIES: &[Category] = &[
    Category { name: "throw", code: 0, description: "Throw Error" },
    Category { name: "note", code: 100, description: "Note" },
    Category { name: "syntax", code: 200, description: "Syntax Error" },
    Category { name: "script", code: 300, description: "Script Error" },
    Category { name: "math", code: 400, description: "Math Error" },
    Category { name: "access", code: 500, description: "Access Error" },
    Category { name: "internal", code: 900, description: "Internal Error" },
];

macro_rules! catalog {
    ($($variant:ident = $code:literal, $category:literal, $id:literal, $template:literal;)*) => {
        /// A catalogued error.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum ErrorId {
            $($variant,)*
        }

        impl ErrorId {
            pub const ALL: &'static [ErrorId] = &[$(ErrorId::$variant,)*];

            pub const fn code(self) -> i64 {
                match self {
                    $(ErrorId::$variant => $code,)*
                }
            }

            pub const fn category(self) -> &'static str {
                match self {
                    $(ErrorId::$variant => $category,)*
                }
            }

            pub const fn id(self) -> &'static str {
                match self {
                    $(ErrorId::$variant => $id,)*
                }
            }

            /// Message text; `:argN` marks where the Nth argument goes.
            pub const fn template(self) -> &'static str {
                match self {
                    $(ErrorId::$variant => $template,)*
                }
            }
        }
    };
}

catalog! {
    Break = 0, "throw", "break", "no loop to break";
    Return = 1, "throw", "return", "return or exit not in function";
    Throw = 2, "throw", "throw", "no catch for throw: :arg1";
    NoCatch = 3, "throw", "no-catch", "missing CATCH for THROW of :arg1";
    NoCatchNamed = 4, "throw", "no-catch-named", "missing CATCH for THROW of :arg1 with /NAME: :arg2";
    Halt = 5, "throw", "halt", "halted by user or script";
    Quit = 6, "throw", "quit", "user script quit";

    NoLoad = 100, "note", "no-load", "cannot load: :arg1";
    Exited = 101, "note", "exited", "exit occurred";

    Invalid = 200, "syntax", "invalid", "invalid :arg1 -- :arg2";
    Missing = 201, "syntax", "missing", "missing :arg2 at :arg1";

    NoValue = 300, "script", "no-value", ":arg1 has no value";
    NotBound = 301, "script", "not-bound", ":arg1 word is not bound to a context";
    NeedValue = 302, "script", "need-value", ":arg1 needs a value";
    NoArg = 303, "script", "no-arg", ":arg1 is missing its :arg2 argument";
    ExpectArg = 304, "script", "expect-arg", ":arg1 does not allow :arg3 for its :arg2 argument";
    BadRefine = 305, "script", "bad-refine", "incompatible or duplicate refinement: :arg1";
    BadRefineRevoke = 306, "script", "bad-refine-revoke", ":arg1 refinement revoked by void :arg2, earlier arguments were not void";
    ArgumentRevoked = 307, "script", "argument-revoked", ":arg1 refinement was revoked, but :arg2 is not void";
    NonLogicRefine = 308, "script", "non-logic-refine", ":arg1 refinement must be LOGIC!, not :arg2";
    ExpressionBarrier = 309, "script", "expression-barrier", "expression barrier hit while fulfilling argument";
    InfixQuoteLate = 310, "script", "infix-quote-late", ":arg1 cannot quote a left argument that was already evaluated";
    InfixQuoteSet = 311, "script", "infix-quote-set", ":arg1 cannot soft quote a SET-WORD! or SET-PATH! on its left";
    InfixLeftArgProhibited = 312, "script", "infix-left-arg-prohibited", ":arg1 cannot take the left result of a punctuator";
    PunctuatorHit = 313, "script", "punctuator-hit", ":arg1 punctuator cannot be an argument or assigned";
    InvalidPath = 314, "script", "invalid-path", "cannot access :arg2 in path :arg1";
    BadFuncDef = 315, "script", "bad-func-def", "invalid function definition: :arg1";
    InvalidArg = 316, "script", "invalid-arg", "invalid argument: :arg1";
    InvalidError = 317, "script", "invalid-error", "error object or fields were not valid: :arg1";
    VarargsNoStack = 318, "script", "varargs-no-stack", "call made to VARARGS! after its frame expired";
    DupVars = 319, "script", "dup-vars", "duplicate variable specified: :arg1";

    ZeroDivide = 400, "math", "zero-divide", "attempt to divide by zero";
    Overflow = 401, "math", "overflow", "math or number overflow";

    Expired = 500, "access", "expired", ":arg1 refers to a frame that is no longer available";

    StackOverflow = 900, "internal", "stack-overflow", "stack overflow";
    NoMemory = 901, "internal", "no-memory", "not enough memory: :arg1 bytes";
    Misc = 902, "internal", "misc", "internal error: :arg1";
}

lazy_static! {
    static ref BY_CODE: HashMap<i64, ErrorId> =
        ErrorId::ALL.iter().map(|id| (id.code(), *id)).collect();

    static ref BY_NAME: HashMap<(Symbol, Symbol), ErrorId> = ErrorId::ALL
        .iter()
        .map(|id| ((Symbol::new(id.category()), Symbol::new(id.id())), *id))
        .collect();
}

pub fn by_code(code: i64) -> Option<ErrorId> {
    BY_CODE.get(&code).copied()
}

pub fn by_name(category: &Symbol, id: &Symbol) -> Option<ErrorId> {
    BY_NAME.get(&(category.clone(), id.clone())).copied()
}

/// A reserved category, looked up by name.
pub fn category(name: &Symbol) -> Option<&'static Category> {
    CATEGORIES.iter().find(|category| name.is(category.name))
}

/// Heading used when displaying an error with this code.
pub fn description(code: i64) -> &'static str {
    if code >= USER_CODE {
        return "User Error";
    }
    CATEGORIES
        .iter()
        .find(|category| category.code == code - code % 100)
        .map_or("Error", |category| category.description)
}
