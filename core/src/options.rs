//! Configuration options for an evaluation session.

/// Limits and compatibility switches for a [`Session`](crate::Session).
///
/// # Example
///
/// ```
/// use rivet_core::EvalOptions;
///
/// let options = EvalOptions {
///     max_depth: 200,
///     ..EvalOptions::default()
/// };
/// assert_eq!(options.signal_interval, 10_000);
/// ```
#[derive(Debug, Clone)]
pub struct EvalOptions {
    /// Maximum frame-stack depth (recursion protection).
    ///
    /// Checked once per frame entry. Exceeding it fails with a trappable
    /// stack-overflow error.
    ///
    /// Default: 1000
    pub max_depth: usize,

    /// Evaluator steps between checks for halt and recycle requests.
    ///
    /// Default: 10_000
    pub signal_interval: usize,

    /// Words holding a LIT-WORD! yield a plain WORD! when fetched.
    ///
    /// Default: false
    pub lit_word_decay: bool,

    /// Assigning void through a SET-WORD! fails instead of unsetting.
    ///
    /// Default: false
    pub void_set_is_error: bool,

    /// Number of cells kept in an error's NEAR snippet.
    ///
    /// Default: 6
    pub near_width: usize,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            max_depth: 1000,
            signal_interval: 10_000,
            lit_word_decay: false,
            void_set_is_error: false,
            near_width: 6,
        }
    }
}
