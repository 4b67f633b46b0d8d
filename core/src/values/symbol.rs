use core::fmt;
use core::hash::{Hash, Hasher};

use ecow::EcoString;

/// Spelling of a word.
///
/// Comparison and hashing ignore ASCII case, so `Foo` and `foo` name the
/// same variable. The original spelling is kept for molding.
#[derive(Clone)]
pub struct Symbol(EcoString);

impl Symbol {
    pub fn new(spelling: &str) -> Self {
        Symbol(EcoString::from(spelling))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is(&self, spelling: &str) -> bool {
        self.0.eq_ignore_ascii_case(spelling)
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.0.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
        state.write_u8(0xff);
    }
}

impl From<&str> for Symbol {
    fn from(spelling: &str) -> Self {
        Symbol::new(spelling)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}", self.0)
    }
}
