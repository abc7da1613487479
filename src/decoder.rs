//! The decoder handle: owns the branch table, metric arena and decision
//! buffer, and exposes the lifecycle + block-update + chainback API.

use tracing::debug;

use crate::acs;
use crate::branchtable::BranchTable;
use crate::decisions::DecisionBuffer;
use crate::error::DecoderError;
use crate::metrics::MetricArena;
use crate::poly::PolyConfig;
use crate::traceback;

/// A soft-decision Viterbi decoder for a K=24 rate-1/2 convolutional
/// code.
///
/// Owns its metric arrays, decision buffer and branch table outright
/// (`Box<[_]>`, not shared globals — see the design doc's notes on the
/// upstream reference's process-wide branch table). Memory use is
/// dominated by the decision buffer: roughly one mebibyte per slot of
/// `len`, plus a fixed ~32 MiB for the two metric arrays. Expect hundreds
/// of megabytes of working memory for realistic traceback depths.
pub struct ViterbiDecoder224 {
    branch: BranchTable,
    metrics: MetricArena,
    decisions: DecisionBuffer,
    /// Slot the *next* ACS step will write into.
    cursor: usize,
    len: usize,
    /// Number of ACS steps run since the last `init`. Not capped at `len`;
    /// `history()` is what callers actually need (the number of *valid*
    /// retained slots, which can't exceed `len`).
    processed: usize,
}

impl ViterbiDecoder224 {
    /// Creates a decoder with `len` decision-buffer slots for the given
    /// polynomial configuration, initialized with starting state 0.
    ///
    /// `len = 0` is accepted as a degenerate decoder: `update_block` and
    /// `chainback` are no-ops on it (both are no-ops at `nbits = 0`
    /// regardless, and no larger `nbits` can be serviced without any
    /// slots to record into).
    pub fn new(cfg: PolyConfig, len: usize) -> Result<Self, DecoderError> {
        let decisions = DecisionBuffer::new(len)?;
        let branch = BranchTable::build(cfg);
        let mut metrics = MetricArena::new();
        metrics.init(0);
        debug!(len, "ViterbiDecoder224 created");
        Ok(Self { branch, metrics, decisions, cursor: 0, len, processed: 0 })
    }

    /// Resets the decoder for the start of a new frame: metrics reset
    /// (biased toward `starting_state`), slot cursor reset to 0,
    /// renormalization counter reset. Decisions already recorded are not
    /// cleared (the next `update_block` will overwrite each slot it
    /// touches before reading it).
    pub fn init(&mut self, starting_state: u32) {
        self.metrics.init(starting_state);
        self.cursor = 0;
        self.processed = 0;
        debug!(starting_state, "ViterbiDecoder224 reinitialized for new frame");
    }

    /// Number of decision-buffer slots this decoder holds.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of decision records actually holding valid history since
    /// the last `init`, i.e. `min(processed steps, len)`. This, not `len`,
    /// is what bounds how far back `chainback`/`decodebit`/`decodeword`
    /// may legitimately walk: a decoder whose buffer was sized larger than
    /// the number of steps it has processed has no valid decisions beyond
    /// this point.
    fn history(&self) -> usize {
        self.processed.min(self.len)
    }

    /// Processes `nbits` symbol pairs from `syms` (`syms.len() >= 2 *
    /// nbits`), running one ACS step per pair. Returns the number of
    /// renormalizations performed. Infallible once the decoder exists;
    /// panics on caller misuse (see the design doc's error-handling
    /// section) rather than returning a recoverable error.
    pub fn update_block(&mut self, syms: &[u8], nbits: usize) -> usize {
        if nbits == 0 {
            return 0;
        }
        assert!(syms.len() >= 2 * nbits, "update_block: syms too short for nbits");
        assert!(self.len > 0, "update_block: decoder has no decision-buffer slots");

        let mut renormalizations = 0;
        for k in 0..nbits {
            let sym0 = syms[2 * k];
            let sym1 = syms[2 * k + 1];
            if acs::step(&mut self.metrics, &mut self.decisions, &self.branch, self.cursor, sym0, sym1) {
                renormalizations += 1;
            }
            self.cursor = if self.cursor + 1 == self.len { 0 } else { self.cursor + 1 };
        }
        self.processed = self.processed.saturating_add(nbits);
        renormalizations
    }

    /// Walks the valid retained history backward from the current
    /// position, writing `nbits / 8` bytes of decoded data into `data` for
    /// the *oldest* `nbits` steps of it (discarding the newest `history() -
    /// nbits` steps — e.g. trailing flush bits appended after a message).
    /// `endstate = None` triggers an O(S) best-path search over the
    /// current metrics first. `nbits` must not exceed `history()` and must
    /// be a multiple of 8 (caller misuse otherwise).
    ///
    /// Output packing is MSB-first within each byte (see `traceback`
    /// module docs): bit 7 of `data[0]` holds the very first decoded data
    /// bit, not bit 0.
    pub fn chainback(&self, data: &mut [u8], nbits: usize, endstate: Option<u32>) {
        let endstate = endstate.unwrap_or_else(|| self.metrics.argmin());
        traceback::chainback(&self.decisions, self.cursor, self.len, self.history(), nbits, endstate, data);
    }

    /// Walks `delay` steps backward from the current position without
    /// writing output, returning the last decoded bit (or `None` if
    /// `delay == 0`). `endstate = None` triggers a best-path search.
    /// `delay` must not exceed `history()`.
    pub fn decodebit(&self, delay: usize, endstate: Option<u32>) -> Option<u8> {
        let endstate = endstate.unwrap_or_else(|| self.metrics.argmin());
        traceback::decodebit(&self.decisions, self.cursor, self.len, self.history(), delay, endstate)
    }

    /// Same walk as `decodebit`, packing up to 64 decoded bits into a
    /// single integer. `delay` must not exceed `history()`.
    pub fn decodeword(&self, delay: usize, endstate: Option<u32>) -> u64 {
        let endstate = endstate.unwrap_or_else(|| self.metrics.argmin());
        traceback::decodeword(&self.decisions, self.cursor, self.len, self.history(), delay, endstate)
    }

    /// Maximum of the current metrics plus the cumulative renormalization
    /// offset: the true unbiased maximum accumulated path metric.
    pub fn max_metric(&self) -> i64 {
        self.metrics.max_metric()
    }

    /// Minimum of the current metrics plus the cumulative renormalization
    /// offset.
    pub fn min_metric(&self) -> i64 {
        self.metrics.min_metric()
    }

    /// Cumulative renormalization offset accumulated since the last
    /// `init`.
    pub fn renormals(&self) -> i64 {
        self.metrics.renormals()
    }
}
