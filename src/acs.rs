//! The inner Add-Compare-Select recursion: one trellis step per symbol pair.

use crate::branchtable::BranchTable;
use crate::decisions::DecisionBuffer;
use crate::metrics::{Metric, MetricArena};
use crate::NUM_BUTTERFLIES;

/// Runs one ACS step over all `NUM_BUTTERFLIES` butterflies for the
/// symbol pair `(sym0, sym1)`, writing survivors into the metric arena's
/// scratch buffer and decisions into `slot` of the decision buffer.
///
/// Zeroes `slot` first (decisions are write-once per slot per step),
/// conditionally renormalizes, then swaps old/new in the metric arena.
/// Returns whether a renormalization happened this step.
pub fn step(
    metrics: &mut MetricArena,
    decisions: &mut DecisionBuffer,
    branch: &BranchTable,
    slot: usize,
    sym0: u8,
    sym1: u8,
) -> bool {
    decisions.zero_slot(slot);

    let (old, new) = metrics.step_buffers();

    for i in 0..NUM_BUTTERFLIES {
        // Branch metric for this butterfly; both XORs are conditional
        // negations in offset-binary arithmetic since Branchtab is
        // always 0 or 255.
        let m = ((branch.g1(i) ^ sym0) as i32) + ((branch.g2(i) ^ sym1) as i32);
        let m_comp = 510 - m;

        let old_lo = old[i];
        let old_hi = old[i + NUM_BUTTERFLIES];

        let a0 = old_lo.saturating_add(m as Metric);
        let a1 = old_hi.saturating_add(m_comp as Metric);
        let a2 = old_lo.saturating_add(m_comp as Metric);
        let a3 = old_hi.saturating_add(m as Metric);

        // Strict `>` so ties favor the lower-index (i-half) branch,
        // matching the SIMD reference's `cmpgt` semantics.
        let decision0 = a0 > a1;
        let decision1 = a2 > a3;

        new[2 * i] = if decision0 { a1 } else { a0 };
        new[2 * i + 1] = if decision1 { a3 } else { a2 };

        decisions.set_butterfly(slot, i, decision0, decision1);
    }

    let renormalized = metrics.maybe_renormalize();
    metrics.swap();
    renormalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poly::PolyConfig;
    use crate::NUM_STATES;

    #[test]
    fn step_writes_every_decision_bit() {
        let cfg = PolyConfig::new(0b1011, 0b1101, false, false);
        let branch = BranchTable::build(cfg);
        let mut metrics = MetricArena::new();
        metrics.init(0);
        let mut decisions = DecisionBuffer::new(1).unwrap();

        step(&mut metrics, &mut decisions, &branch, 0, 0, 0);

        // Every state's decision bit must have been written (value
        // unconstrained, but every read must be well-defined rather than
        // leftover garbage from an un-zeroed slot).
        for s in (0..NUM_STATES).step_by(4001) {
            let _ = decisions.get_bit(0, s as u32);
        }
    }

    #[test]
    fn step_from_known_start_favors_zero_input_on_clean_symbols() {
        let cfg = PolyConfig::new(0b1011, 0b1101, false, false);
        let branch = BranchTable::build(cfg);
        let mut metrics = MetricArena::new();
        metrics.init(0);
        let mut decisions = DecisionBuffer::new(1).unwrap();

        // Symbols matching the expected output for state 0, input 0.
        let sym0 = branch.g1(0);
        let sym1 = branch.g2(0);
        step(&mut metrics, &mut decisions, &branch, 0, sym0, sym1);

        // State 0 should now be one of the cheapest metrics, since it's
        // reachable from the biased starting state with a perfect-match
        // branch metric of 0.
        let old = metrics.old();
        assert!(old[0] <= old[1..].iter().copied().min().unwrap());
    }
}
