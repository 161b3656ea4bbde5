//! Per-source sequence integrity tracking.
//!
//! Each source id gets an independent state machine that classifies every
//! observed sequence number as FIRST, OK, GAP, REORDER or DUPLICATE. A
//! 64-bit window records which of the most recent sequences have been seen:
//! bit `i` covers sequence `next_expected - 64 + i`, so bit 63 is always the
//! most recently accepted sequence. The OK path (shift, then set the high
//! bit) and the late-arrival path (test/set bit `64 - age`) must agree on
//! that convention.
//!
//! Sequence numbers wrap modulo 2^32; comparisons and subtractions use plain
//! unsigned 32-bit arithmetic.
//!
//! The tracker is not internally synchronized - it is owned by the gateway
//! loop thread.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

const WINDOW_SIZE: u32 = 64;

/// Classification of one observed sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeqResult {
    /// First frame ever seen from this source.
    First,
    /// Exactly the expected sequence.
    Ok,
    /// Jumped ahead; `gap_size` sequences were skipped.
    Gap,
    /// Late arrival not previously seen (or older than the window).
    Reorder,
    /// Late arrival whose window bit was already set.
    Duplicate,
}

/// Outcome of tracking one sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeqEvent {
    pub result: SeqResult,
    pub src_id: u16,
    /// For GAP: the first missing sequence. For REORDER/DUPLICATE: the
    /// current expectation. Zero for FIRST.
    pub expected_seq: u32,
    pub actual_seq: u32,
    /// Number of missing sequences; nonzero only for GAP.
    pub gap_size: u32,
}

#[derive(Debug, Default)]
struct SourceState {
    next_expected: u32,
    // Bit 63 = next_expected - 1, bit 0 = next_expected - 64.
    seen_window: u64,
}

/// Tracks sequence continuity independently for every source id.
#[derive(Debug, Default)]
pub struct SequenceTracker {
    sources: HashMap<u16, SourceState>,
}

impl SequenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify `seq` from `src_id` and advance the source state.
    pub fn track(&mut self, src_id: u16, seq: u32) -> SeqEvent {
        let state = match self.sources.entry(src_id) {
            Entry::Vacant(slot) => {
                // The first sequence arms the tracker without marking its own
                // window bit, so an immediate resend classifies as REORDER.
                slot.insert(SourceState {
                    next_expected: seq.wrapping_add(1),
                    seen_window: 0,
                });
                return SeqEvent {
                    result: SeqResult::First,
                    src_id,
                    expected_seq: 0,
                    actual_seq: seq,
                    gap_size: 0,
                };
            }
            Entry::Occupied(slot) => slot.into_mut(),
        };

        if seq == state.next_expected {
            state.seen_window = (state.seen_window << 1) | (1 << (WINDOW_SIZE - 1));
            state.next_expected = seq.wrapping_add(1);
            return SeqEvent {
                result: SeqResult::Ok,
                src_id,
                expected_seq: seq,
                actual_seq: seq,
                gap_size: 0,
            };
        }

        if seq > state.next_expected {
            let gap = seq - state.next_expected;
            if gap.saturating_add(1) >= WINDOW_SIZE {
                state.seen_window = 0;
            } else {
                state.seen_window <<= gap + 1;
            }
            state.seen_window |= 1 << (WINDOW_SIZE - 1);
            state.next_expected = seq.wrapping_add(1);
            return SeqEvent {
                result: SeqResult::Gap,
                src_id,
                expected_seq: seq - gap,
                actual_seq: seq,
                gap_size: gap,
            };
        }

        // seq < next_expected: a late arrival, a duplicate, or ancient history.
        let age = state.next_expected - seq;
        if age <= WINDOW_SIZE {
            let bit = 1u64 << (WINDOW_SIZE - age);
            if state.seen_window & bit != 0 {
                return SeqEvent {
                    result: SeqResult::Duplicate,
                    src_id,
                    expected_seq: state.next_expected,
                    actual_seq: seq,
                    gap_size: 0,
                };
            }
            state.seen_window |= bit;
            return SeqEvent {
                result: SeqResult::Reorder,
                src_id,
                expected_seq: state.next_expected,
                actual_seq: seq,
                gap_size: 0,
            };
        }

        // Older than the window: no bit to consult, so never DUPLICATE.
        SeqEvent {
            result: SeqResult::Reorder,
            src_id,
            expected_seq: state.next_expected,
            actual_seq: seq,
            gap_size: 0,
        }
    }

    /// Forget one source; its next frame classifies as FIRST again.
    pub fn reset(&mut self, src_id: u16) {
        self.sources.remove(&src_id);
    }

    /// Forget every source.
    pub fn reset_all(&mut self) {
        self.sources.clear();
    }

    /// Number of sources seen since the last reset.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}
