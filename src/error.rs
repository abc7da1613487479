/// Errors the decoder can report.
///
/// Most of the language-independent design's error kinds ("invalid handle",
/// "null handle") cannot occur in Rust: there is no way to obtain a
/// `ViterbiDecoder224` value without it being fully constructed, and every
/// mutating operation requires a live `&mut self` borrow. Only allocation
/// failure at construction time survives as a recoverable error; caller
/// misuse (traceback depth exceeding the decision buffer length, bit counts
/// that aren't a multiple of 8) is defended against with assertions, not
/// `Result`, matching this crate's existing convention for programmer
/// errors (see `PduParseErr` in `tetra-core` for the analogous split between
/// recoverable parse errors and `assert!`-guarded invariants).
#[derive(Debug, PartialEq, Eq)]
pub enum DecoderError {
    /// `len` would make the decision buffer's byte size overflow `usize`.
    AllocationFailure,
}

impl std::fmt::Display for DecoderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecoderError::AllocationFailure => {
                write!(f, "decision buffer size overflows usize for the requested len")
            }
        }
    }
}

impl std::error::Error for DecoderError {}
